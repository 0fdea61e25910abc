use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value {value:?} in column {column} (row {row})")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid season choice: {0} (expected R or P)")]
    InvalidSeason(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("{step} failed for: {seasons}")]
    StepFailed { step: String, seasons: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("Could not move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, StatsError>;
