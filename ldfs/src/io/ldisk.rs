use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;

use log::info;

use super::block::{check_access, BlockNumber, BlockStorage};
use crate::config::{BLOCK_COUNT, BLOCK_SIZE};

/// The logical disk: a fixed array of `BLOCK_COUNT` blocks held in memory.
///
/// Whole-disk persistence is an opaque raw dump of the block array, so an
/// image saved with [`LDisk::save_to`] reloads byte-for-byte.
#[derive(Clone, PartialEq, Eq)]
pub struct LDisk {
    blocks: Vec<[u8; BLOCK_SIZE]>,
}

impl LDisk {
    /// A zero-filled disk.
    pub fn new() -> Self {
        Self {
            blocks: vec![[0; BLOCK_SIZE]; BLOCK_COUNT],
        }
    }

    /// Builds a disk from a raw image. The image must be exactly
    /// `BLOCK_COUNT * BLOCK_SIZE` bytes long.
    pub fn from_image(image: &[u8]) -> std::io::Result<Self> {
        if image.len() != BLOCK_COUNT * BLOCK_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "disk image is {} bytes, expected {}",
                    image.len(),
                    BLOCK_COUNT * BLOCK_SIZE
                ),
            ));
        }
        let mut disk = Self::new();
        for (block, chunk) in disk.blocks.iter_mut().zip(image.chunks_exact(BLOCK_SIZE)) {
            block.copy_from_slice(chunk);
        }
        Ok(disk)
    }

    pub fn to_image(&self) -> Vec<u8> {
        self.blocks.iter().flat_map(|b| b.iter().copied()).collect()
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(path.as_ref(), self.to_image())?;
        info!("saved disk image to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let image = fs::read(path.as_ref())?;
        let disk = Self::from_image(&image)?;
        info!("loaded disk image from {}", path.as_ref().display());
        Ok(disk)
    }
}

impl Default for LDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LDisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LDisk")
            .field("blocks", &self.blocks.len())
            .field("block_size", &BLOCK_SIZE)
            .finish()
    }
}

impl BlockStorage for LDisk {
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn read_block(&mut self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()> {
        check_access(blocknr, self.blocks.len(), buf.len())?;
        buf.copy_from_slice(&self.blocks[blocknr]);
        Ok(())
    }

    fn write_block(&mut self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()> {
        check_access(blocknr, self.blocks.len(), buf.len())?;
        self.blocks[blocknr].copy_from_slice(buf);
        Ok(())
    }

    fn sync_disk(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_and_write_blocks() {
        let mut disk = LDisk::new();
        disk.write_block(2, &[0x55; BLOCK_SIZE]).unwrap();

        let mut read_block = [0xFF; BLOCK_SIZE];
        disk.read_block(3, &mut read_block).unwrap();
        assert_eq!(read_block, [0x00; BLOCK_SIZE]);

        disk.read_block(2, &mut read_block).unwrap();
        assert_eq!(read_block, [0x55; BLOCK_SIZE]);
    }

    #[test]
    fn out_of_range_and_short_buffers_are_rejected() {
        let mut disk = LDisk::new();
        let mut buf = [0; BLOCK_SIZE];
        let err = disk.read_block(BLOCK_COUNT, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = disk.write_block(0, &[0; BLOCK_SIZE / 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn image_survives_a_trip_through_a_host_file() {
        let mut disk = LDisk::new();
        disk.write_block(0, &[0xAB; BLOCK_SIZE]).unwrap();
        disk.write_block(BLOCK_COUNT - 1, &[0x01; BLOCK_SIZE]).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        disk.save_to(file.path()).unwrap();
        let restored = LDisk::load_from(file.path()).unwrap();

        assert_eq!(restored, disk);
        assert_eq!(
            std::fs::metadata(file.path()).unwrap().len(),
            (BLOCK_COUNT * BLOCK_SIZE) as u64
        );
    }

    #[test]
    fn truncated_image_is_invalid_data() {
        let err = LDisk::from_image(&[0; BLOCK_SIZE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
