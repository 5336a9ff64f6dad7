use std::convert::TryFrom;
use std::io::{Error, ErrorKind};

use log::debug;

use crate::alloc::Bitmap;
use crate::config::{BLOCK_SIZE, DIR_ENTRIES_PER_BLOCK, DIR_ENTRY_SIZE, MAX_FILE_BLOCKS, MAX_NAME_LEN};
use crate::error::{FsError, Result};
use crate::io::BlockStorage;
use crate::layout::{DirRecord, Int, RecordReader, RecordWriter};
use crate::node::Descriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub descriptor: usize,
}

impl DirEntry {
    fn from_record(record: &DirRecord) -> std::io::Result<Self> {
        let len = record
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_NAME_LEN);
        let name = String::from_utf8(record.name[..len].to_vec())
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        let descriptor = usize::try_from(record.descriptor.get())
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        Ok(Self { name, descriptor })
    }

    fn to_record(&self) -> DirRecord {
        let mut name = [0; MAX_NAME_LEN];
        name[..self.name.len()].copy_from_slice(self.name.as_bytes());
        DirRecord {
            name,
            descriptor: Int::new(self.descriptor as i32),
        }
    }
}

/// The single flat directory, kept in insertion order. Its records live in
/// the data blocks of descriptor 0, `DIR_ENTRIES_PER_BLOCK` to a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory blocks required to hold `entries` records. The first block is
    /// kept even when the directory is empty.
    pub fn blocks_needed(entries: usize) -> usize {
        std::cmp::max(1, (entries + DIR_ENTRIES_PER_BLOCK - 1) / DIR_ENTRIES_PER_BLOCK)
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn find(&self, name: &str) -> Option<&DirEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Appends an entry. Callers validate the name and uniqueness first.
    pub fn add(&mut self, name: &str, descriptor: usize) {
        debug_assert!(name.len() <= MAX_NAME_LEN && self.find(name).is_none());
        self.entries.push(DirEntry {
            name: name.to_string(),
            descriptor,
        });
    }

    pub fn remove(&mut self, name: &str) -> Option<DirEntry> {
        let position = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(position))
    }

    /// Decodes the directory from the blocks of `dir_node`. Within each block
    /// records are read until the block runs out or a record starts with NUL.
    pub fn load<T: BlockStorage>(dev: &mut T, dir_node: &Descriptor) -> Result<Self> {
        let mut entries = Vec::new();
        let mut block = [0; BLOCK_SIZE];
        for blocknr in dir_node.allocated() {
            dev.read_block(blocknr, &mut block)?;
            let mut reader = RecordReader::new(&block);
            while reader.has_room_for::<DirRecord>() {
                let record: DirRecord = reader.next()?;
                if record.is_terminator() {
                    break;
                }
                entries.push(DirEntry::from_record(&record)?);
            }
        }
        Ok(Self { entries })
    }

    /// Re-encodes every entry into the blocks of `dir_node`, growing or
    /// shrinking its block list to fit first. Capacity is checked before
    /// anything is allocated.
    pub fn save<T: BlockStorage>(
        &self,
        dev: &mut T,
        bitmap: &mut Bitmap,
        dir_node: &mut Descriptor,
    ) -> Result<()> {
        let needed = Self::blocks_needed(self.entries.len());
        if needed > MAX_FILE_BLOCKS {
            return Err(FsError::Exhausted("directory"));
        }
        let held = dir_node.block_count();
        if needed > held && bitmap.free_count() < needed - held {
            return Err(FsError::Exhausted("block"));
        }

        for index in held..needed {
            let blocknr = bitmap.allocate_next(dev)?;
            dir_node.blocks[index] = Some(blocknr);
            debug!("directory grew into block {}", blocknr);
        }
        for index in (needed..held).rev() {
            if let Some(blocknr) = dir_node.blocks[index].take() {
                bitmap.free(dev, blocknr)?;
                debug!("directory released block {}", blocknr);
            }
        }
        dir_node.length = self.entries.len() * DIR_ENTRY_SIZE;

        for index in 0..needed {
            let start = std::cmp::min(index * DIR_ENTRIES_PER_BLOCK, self.entries.len());
            let end = std::cmp::min(start + DIR_ENTRIES_PER_BLOCK, self.entries.len());
            let mut block = [0; BLOCK_SIZE];
            let mut writer = RecordWriter::new(&mut block);
            for entry in &self.entries[start..end] {
                writer.push(&entry.to_record())?;
            }
            if let Some(blocknr) = dir_node.block(index) {
                dev.write_block(blocknr, &block)?;
            }
        }
        Ok(())
    }
}
