use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ldfs-shell", about = "Interactive shell over a 64 block logical disk")]
pub struct Cli {
    /// Disk image to restore at start-up. A fresh disk is used when the file
    /// does not exist.
    #[arg(long, short)]
    pub image: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long, short)]
    pub script: Option<PathBuf>,
}
