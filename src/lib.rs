pub mod buffer;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod overwrite;

pub use error::{Error, Result};
