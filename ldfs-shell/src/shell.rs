use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::parse::{parse_command, Command};
use ldfs::config::MAX_FILE_SIZE;
use ldfs::{FileSystem, Handle, LDisk};

/// Line oriented dispatcher. Owns the mounted file system and replaces it
/// whenever an `in` command brings up another disk.
pub struct Shell {
    fs: FileSystem<LDisk>,
}

impl Shell {
    pub fn new(fs: FileSystem<LDisk>) -> Self {
        Self { fs }
    }

    /// Runs commands from `input` until it ends or a `q` line is read.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match parse_command(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => match self.execute(command) {
                    Ok(lines) => {
                        for text in lines {
                            writeln!(out, "{}", text)?;
                        }
                    }
                    Err(e) => {
                        debug!("{:?} failed: {}", line, e);
                        writeln!(out, "error")?;
                    }
                },
                Ok(None) => (),
                Err(e) => {
                    debug!("could not parse {:?}: {}", line, e);
                    writeln!(out, "error")?;
                }
            }
        }
        out.flush()
    }

    fn execute(&mut self, command: Command) -> ldfs::Result<Vec<String>> {
        let output = match command {
            Command::Create(name) => {
                self.fs.create(&name)?;
                format!("file {} created", name)
            }
            Command::Destroy(name) => {
                self.fs.destroy(&name)?;
                format!("file {} destroyed", name)
            }
            Command::Open(name) => {
                let handle = self.fs.open(&name)?;
                format!("file {} opened, index={}", name, handle)
            }
            Command::Close(index) => {
                self.fs.close(Handle(index))?;
                format!("file {} closed", index)
            }
            Command::Read(index, count) => {
                let bytes = self.fs.read(Handle(index), count)?;
                format!("{} bytes read: {}", bytes.len(), String::from_utf8_lossy(&bytes))
            }
            Command::Write(index, fill, count) => {
                // No file holds more than MAX_FILE_SIZE bytes, so never buffer more.
                let data = vec![fill; std::cmp::min(count, MAX_FILE_SIZE)];
                let written = self.fs.write(Handle(index), &data)?;
                format!("{} bytes written", written)
            }
            Command::Seek(index, pos) => {
                self.fs.seek(Handle(index), pos)?;
                format!("current position is {}", pos)
            }
            Command::Dir => {
                return Ok(self
                    .fs
                    .list_directory()?
                    .into_iter()
                    .map(|(name, length)| format!("{} {}", name, length))
                    .collect());
            }
            Command::Init(path) => {
                if path.exists() {
                    self.fs = FileSystem::load_image(&path)?;
                    "disk restored".to_string()
                } else {
                    self.fs = FileSystem::fresh(LDisk::new())?;
                    info!("{} not found, formatted a new disk", path.display());
                    "disk initialized".to_string()
                }
            }
            Command::Save(path) => {
                self.fs.save_image(&path)?;
                "disk saved".to_string()
            }
            Command::Quit => return Ok(Vec::new()),
        };
        Ok(vec![output])
    }
}
