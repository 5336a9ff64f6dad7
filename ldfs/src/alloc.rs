use log::trace;

use crate::config::{BITMAP_BLOCK, BITMAP_BYTES, BLOCK_COUNT, BLOCK_SIZE, RESERVED_BLOCKS};
use crate::error::{FsError, Result};
use crate::io::{BlockNumber, BlockStorage};
use crate::layout::{RecordReader, RecordWriter};

#[derive(Debug, PartialEq)]
pub enum State {
    Free,
    Used,
}

/// Allocation map of the logical disk, one bit per block. Bit `i` lives in byte
/// `i / 8` at position `i % 8`, least significant bit first.
///
/// Only the first `BITMAP_BYTES` of the bitmap block are ever written; the
/// rest of that block is not ours to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    bits: [u8; BITMAP_BYTES],
}

impl Bitmap {
    pub fn new() -> Self {
        Self {
            bits: [0; BITMAP_BYTES],
        }
    }

    /// The bitmap of a freshly formatted disk: every metadata block is in use.
    pub fn formatted() -> Self {
        let mut bmp = Self::new();
        for blocknr in 0..RESERVED_BLOCKS {
            bmp.set_reserved(blocknr);
        }
        bmp
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let bits = RecordReader::new(buf).read_at(0)?;
        Ok(Self { bits })
    }

    pub fn serialize(&self) -> &[u8] {
        &self.bits
    }

    /// State of `blocknr`, or `None` past the end of the disk.
    pub fn get(&self, blocknr: BlockNumber) -> Option<State> {
        if blocknr >= BLOCK_COUNT {
            return None;
        }
        match (self.bits[blocknr / 8] >> (blocknr % 8)) & 0b01 {
            0 => Some(State::Free),
            _ => Some(State::Used),
        }
    }

    pub(crate) fn set_reserved(&mut self, blocknr: BlockNumber) {
        assert!(blocknr < BLOCK_COUNT);
        self.bits[blocknr / 8] |= 0b01 << (blocknr % 8);
    }

    pub(crate) fn set_free(&mut self, blocknr: BlockNumber) {
        assert!(blocknr < BLOCK_COUNT);
        self.bits[blocknr / 8] &= !(0b01 << (blocknr % 8));
    }

    /// First fit: the lowest numbered free block, scanning the whole map.
    pub fn search_free(&self) -> Option<BlockNumber> {
        (0..BLOCK_COUNT).find(|&blocknr| self.get(blocknr) == Some(State::Free))
    }

    pub fn free_count(&self) -> usize {
        BLOCK_COUNT - self.bits.iter().map(|b| b.count_ones() as usize).sum::<usize>()
    }

    pub(crate) fn load<T: BlockStorage>(dev: &mut T) -> Result<Self> {
        let mut block = [0; BLOCK_SIZE];
        dev.read_block(BITMAP_BLOCK, &mut block)?;
        Self::parse(&block)
    }

    /// Writes the bitmap bytes into the bitmap block, preserving the
    /// remainder of that block.
    pub(crate) fn save<T: BlockStorage>(&self, dev: &mut T) -> Result<()> {
        let mut block = [0; BLOCK_SIZE];
        dev.read_block(BITMAP_BLOCK, &mut block)?;
        RecordWriter::new(&mut block).write_at(0, &self.bits)?;
        dev.write_block(BITMAP_BLOCK, &block)?;
        Ok(())
    }

    /// Marks `blocknr` used and persists the map.
    pub(crate) fn allocate<T: BlockStorage>(&mut self, dev: &mut T, blocknr: BlockNumber) -> Result<()> {
        self.set_reserved(blocknr);
        trace!("allocated block {}", blocknr);
        self.save(dev)
    }

    /// Claims the first free block, failing with `Exhausted` on a full disk.
    pub(crate) fn allocate_next<T: BlockStorage>(&mut self, dev: &mut T) -> Result<BlockNumber> {
        let blocknr = self.search_free().ok_or(FsError::Exhausted("block"))?;
        self.allocate(dev, blocknr)?;
        Ok(blocknr)
    }

    /// Releases `blocknr`, zero-filling its contents so no stale data reaches
    /// the next owner, and persists the map.
    pub(crate) fn free<T: BlockStorage>(&mut self, dev: &mut T, blocknr: BlockNumber) -> Result<()> {
        dev.write_block(blocknr, &[0; BLOCK_SIZE])?;
        self.set_free(blocknr);
        trace!("freed block {}", blocknr);
        self.save(dev)
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}
