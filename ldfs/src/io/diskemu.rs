use super::block::{check_access, BlockNumber, BlockStorage};
use crate::config::BLOCK_SIZE;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, SeekFrom};

/// Emulates the logical disk in a host file instead of memory. Transfers go
/// straight to the file so the on-disk bytes always mirror what the file
/// system has written.
pub struct FileBlockEmulator {
    /// The file must be a fixed-size file some exact multiple of the size of a block.
    fd: File,
    /// The total number of blocks available in the file store.
    block_count: usize,
}

impl FileBlockEmulator {
    /// Returns ownership of the underlying file descriptor to the caller.
    pub fn into_file(self) -> File {
        self.fd
    }

    fn seek_to(&mut self, blocknr: BlockNumber) -> std::io::Result<()> {
        self.fd
            .seek(SeekFrom::Start((blocknr * BLOCK_SIZE) as u64))?;
        Ok(())
    }
}

impl BlockStorage for FileBlockEmulator {
    fn block_count(&self) -> usize {
        self.block_count
    }

    fn read_block(&mut self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()> {
        check_access(blocknr, self.block_count, buf.len())?;
        self.seek_to(blocknr)?;
        self.fd.read_exact(buf)
    }

    fn write_block(&mut self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()> {
        check_access(blocknr, self.block_count, buf.len())?;
        self.seek_to(blocknr)?;
        self.fd.write_all(buf)
    }

    fn sync_disk(&mut self) -> std::io::Result<()> {
        self.fd.sync_all()?;
        Ok(())
    }
}

pub struct FileBlockEmulatorBuilder {
    fd: File,
    block_count: usize,
    clear_medium: bool,
}

impl From<File> for FileBlockEmulatorBuilder {
    fn from(fd: File) -> Self {
        FileBlockEmulatorBuilder {
            fd,
            block_count: crate::config::BLOCK_COUNT,
            clear_medium: true,
        }
    }
}

impl FileBlockEmulatorBuilder {
    /// Sets the number of desired blocks in the block store device.
    pub fn with_block_count(mut self, blocks: usize) -> Self {
        self.block_count = blocks;
        self
    }

    /// Whether `build` zero-fills the medium. Turn this off to reattach to a
    /// file that already holds a formatted disk.
    pub fn clear_medium(mut self, clear: bool) -> Self {
        self.clear_medium = clear;
        self
    }

    /// This builder assumed ownership of the file descriptor used and does
    /// destructive things to prepare the file for use. Additionally, ownership
    /// of the file is transfered to the emulator meaning this builder can only
    /// be used to create one emulator.
    pub fn build(mut self) -> std::io::Result<FileBlockEmulator> {
        debug_assert!(self.block_count > 0);
        if self.clear_medium {
            self.zero_blocks()?;
        }
        Ok(FileBlockEmulator {
            fd: self.fd,
            block_count: self.block_count,
        })
    }

    fn zero_blocks(&mut self) -> std::io::Result<()> {
        self.fd.seek(SeekFrom::Start(0))?;
        let mut bfd = BufWriter::new(&self.fd);
        // Zero out the "disk" block, buffering each write to prevent excessive reads.
        for _ in 0..self.block_count {
            bfd.write_all(&[0x00; BLOCK_SIZE])?;
        }
        bfd.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emulator(blocks: usize) -> FileBlockEmulator {
        let fs_block = tempfile::tempfile().unwrap();
        FileBlockEmulatorBuilder::from(fs_block)
            .with_block_count(blocks)
            .build()
            .expect("failed to allocate file block")
    }

    #[test]
    fn file_emulator_allocates_correct_num_bytes() {
        let mut disk_emu = emulator(4);
        disk_emu.sync_disk().unwrap();
        assert_eq!(
            disk_emu.into_file().metadata().unwrap().len(),
            4 * BLOCK_SIZE as u64
        );
    }

    #[test]
    fn can_read_and_write_blocks() {
        let mut disk_emu = emulator(4);

        // Allocate a block with a non-zero character.
        disk_emu.write_block(2, &[0x55; BLOCK_SIZE]).unwrap();
        disk_emu.sync_disk().unwrap();

        let mut read_block = [0x00; BLOCK_SIZE];
        // Read a different block.
        disk_emu.read_block(3, &mut read_block).unwrap();
        assert_eq!(read_block, [0x00; BLOCK_SIZE]);

        // Read the block with data.
        disk_emu.read_block(2, &mut read_block).unwrap();
        assert_eq!(read_block, [0x55; BLOCK_SIZE]);
    }

    #[test]
    fn can_read_and_write_start_and_end_blocks() {
        let mut disk_emu = emulator(2);

        disk_emu.write_block(0, &[0x55; BLOCK_SIZE]).unwrap();
        disk_emu.write_block(1, &[0x66; BLOCK_SIZE]).unwrap();

        let mut read_block = [0x00; BLOCK_SIZE];
        disk_emu.read_block(0, &mut read_block).unwrap();
        assert_eq!(read_block, [0x55; BLOCK_SIZE]);
        disk_emu.read_block(1, &mut read_block).unwrap();
        assert_eq!(read_block, [0x66; BLOCK_SIZE]);
    }

    #[test]
    fn write_block_beyond_range_returns_error() {
        let mut disk_emu = emulator(1);

        // Attempt to write beyond range.
        let wresult = disk_emu.write_block(1, &[0x55; BLOCK_SIZE]);
        if wresult.is_ok() {
            panic!("expected an error, got result instead")
        }
    }

    #[test]
    fn partial_block_writes_are_rejected() {
        let mut disk_emu = emulator(1);

        let wresult = disk_emu.write_block(0, &[0x55; BLOCK_SIZE / 2]);
        assert_eq!(
            wresult.unwrap_err().kind(),
            std::io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn reattaching_without_clearing_keeps_contents() {
        let disk = tempfile::NamedTempFile::new().unwrap();
        let mut first = FileBlockEmulatorBuilder::from(disk.reopen().unwrap())
            .with_block_count(2)
            .build()
            .unwrap();
        first.write_block(1, &[0x77; BLOCK_SIZE]).unwrap();
        first.sync_disk().unwrap();

        let mut second = FileBlockEmulatorBuilder::from(disk.reopen().unwrap())
            .with_block_count(2)
            // Don't reset initialized disk.
            .clear_medium(false)
            .build()
            .unwrap();
        let mut read_block = [0x00; BLOCK_SIZE];
        second.read_block(1, &mut read_block).unwrap();
        assert_eq!(read_block, [0x77; BLOCK_SIZE]);
    }
}
