pub mod bootstrap;
pub mod config;
pub mod deploy;
pub mod error;
pub mod outputs;
pub mod paths;
pub mod process;
pub mod prompt;
pub mod report;
pub mod terraform;
pub mod types;

pub use error::{Result, TfopsError};
