pub mod writer;

pub use writer::{stage_cleaned_workbook, write_cleaned_workbook};
