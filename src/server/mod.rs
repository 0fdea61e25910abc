pub mod config;
mod page;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::{make_app, run_server};
