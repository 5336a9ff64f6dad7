mod cli;
mod parse;
mod shell;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};

use clap::Parser;
use cli::Cli;
use ldfs::{FileSystem, LDisk};
use shell::Shell;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let fs = match &cli.image {
        Some(path) if path.exists() => FileSystem::load_image(path)?,
        _ => FileSystem::fresh(LDisk::new())?,
    };
    let mut shell = Shell::new(fs);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.script {
        Some(path) => shell.run(BufReader::new(File::open(path)?), &mut out)?,
        None => {
            let stdin = io::stdin();
            shell.run(stdin.lock(), &mut out)?
        }
    }
    Ok(())
}
