use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Copy the selected paths into a directory", long_about = None)]
pub struct Args {
    /// Destination directory (defaults to the current directory)
    pub dest: Vec<PathBuf>,
}
