use std::convert::TryFrom;

use crate::config::{
    BLOCK_SIZE, DESCRIPTORS_PER_BLOCK, DESCRIPTOR_COUNT, DESCRIPTOR_START, DIRECTORY_DESCRIPTOR,
    MAX_FILE_BLOCKS,
};
use crate::error::Result;
use crate::io::{BlockNumber, BlockStorage};
use crate::layout::{decode_opt, encode_opt, DescriptorRecord, Int, RecordReader, RecordWriter};

/// Per-file metadata: the byte length and the direct block pointers. Pointer
/// `i` holds file-relative block `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub length: usize,
    pub blocks: [Option<BlockNumber>; MAX_FILE_BLOCKS],
}

impl Descriptor {
    /// An empty file owning a single data block.
    pub fn new(first_block: BlockNumber) -> Self {
        let mut blocks = [None; MAX_FILE_BLOCKS];
        blocks[0] = Some(first_block);
        Self { length: 0, blocks }
    }

    pub fn block(&self, index: usize) -> Option<BlockNumber> {
        self.blocks.get(index).copied().flatten()
    }

    /// Every disk block currently held, in file order.
    pub fn allocated(&self) -> impl Iterator<Item = BlockNumber> + '_ {
        self.blocks.iter().filter_map(|b| *b)
    }

    pub fn block_count(&self) -> usize {
        self.allocated().count()
    }

    fn from_record(record: &DescriptorRecord) -> Option<Self> {
        let length = decode_opt(record.length)?;
        let mut blocks = [None; MAX_FILE_BLOCKS];
        for (slot, ptr) in blocks.iter_mut().zip(record.blocks.iter()) {
            *slot = decode_opt(*ptr);
        }
        Some(Self { length, blocks })
    }

    fn to_record(&self) -> DescriptorRecord {
        let mut record = DescriptorRecord::unset();
        record.length = Int::new(i32::try_from(self.length).unwrap_or(i32::MAX));
        for (ptr, block) in record.blocks.iter_mut().zip(self.blocks.iter()) {
            *ptr = encode_opt(*block);
        }
        record
    }
}

/// The fixed array of descriptor slots. A `None` slot is free; on disk it is
/// a record whose length is the unset sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTable {
    slots: [Option<Descriptor>; DESCRIPTOR_COUNT],
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self {
            slots: [None; DESCRIPTOR_COUNT],
        }
    }

    pub fn get(&self, index: usize) -> Option<&Descriptor> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Descriptor> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn insert(&mut self, index: usize, descriptor: Descriptor) {
        self.slots[index] = Some(descriptor);
    }

    /// Frees the slot, returning what it held.
    pub fn clear(&mut self, index: usize) -> Option<Descriptor> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Lowest free slot available to a user file. Slot 0 always belongs to
    /// the directory.
    pub fn find_free(&self) -> Option<usize> {
        (0..DESCRIPTOR_COUNT)
            .filter(|&i| i != DIRECTORY_DESCRIPTOR)
            .find(|&i| self.slots[i].is_none())
    }

    pub fn used_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn load<T: BlockStorage>(dev: &mut T) -> Result<Self> {
        let mut table = Self::new();
        let mut block = [0; BLOCK_SIZE];
        for (i, slots) in table.slots.chunks_mut(DESCRIPTORS_PER_BLOCK).enumerate() {
            dev.read_block(DESCRIPTOR_START + i, &mut block)?;
            let mut reader = RecordReader::new(&block);
            for slot in slots.iter_mut() {
                *slot = Descriptor::from_record(&reader.next::<DescriptorRecord>()?);
            }
        }
        Ok(table)
    }

    /// Writes every slot back. Each descriptor block is rebuilt whole and
    /// written exactly once.
    pub fn save<T: BlockStorage>(&self, dev: &mut T) -> Result<()> {
        for (i, slots) in self.slots.chunks(DESCRIPTORS_PER_BLOCK).enumerate() {
            let mut block = [0; BLOCK_SIZE];
            let mut writer = RecordWriter::new(&mut block);
            for slot in slots {
                let record = match slot {
                    Some(descriptor) => descriptor.to_record(),
                    None => DescriptorRecord::unset(),
                };
                writer.push(&record)?;
            }
            dev.write_block(DESCRIPTOR_START + i, &block)?;
        }
        Ok(())
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}
