use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Select files and directories for a later paste", long_about = None)]
pub struct Args {
    /// Paths to select (defaults to the current directory)
    pub paths: Vec<PathBuf>,
}
