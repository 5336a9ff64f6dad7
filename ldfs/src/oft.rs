use std::fmt;

use crate::config::{BLOCK_SIZE, DIRECTORY_DESCRIPTOR, OFT_CAPACITY};

/// Index of an open file table slot, as handed out by `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub usize);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open file: its descriptor, the cursor, and a one block read/write cache.
#[derive(Debug, Clone)]
pub struct OftEntry {
    pub buffer: [u8; BLOCK_SIZE],
    /// Byte offset of the cursor within the file.
    pub position: usize,
    pub descriptor: usize,
    /// The buffer holds writes not yet flushed to disk.
    pub dirty: bool,
    /// File-relative block currently held in `buffer`.
    pub cached: Option<usize>,
}

impl OftEntry {
    pub fn new(descriptor: usize) -> Self {
        Self {
            buffer: [0; BLOCK_SIZE],
            position: 0,
            descriptor,
            dirty: false,
            cached: None,
        }
    }

    /// File-relative block the cursor falls in.
    pub fn block_index(&self) -> usize {
        self.position / BLOCK_SIZE
    }

    pub fn block_offset(&self) -> usize {
        self.position % BLOCK_SIZE
    }
}

/// Fixed set of open file slots. Slot 0 is bound to the directory for the
/// life of the table and is never handed out or released.
#[derive(Debug)]
pub struct OpenFileTable {
    entries: Vec<Option<OftEntry>>,
}

impl OpenFileTable {
    pub fn new() -> Self {
        let mut entries: Vec<Option<OftEntry>> = (0..OFT_CAPACITY).map(|_| None).collect();
        entries[0] = Some(OftEntry::new(DIRECTORY_DESCRIPTOR));
        Self { entries }
    }

    /// The entry behind a user handle. Slot 0 is not a user handle.
    pub fn get(&self, handle: Handle) -> Option<&OftEntry> {
        if handle.0 == 0 {
            return None;
        }
        self.entries.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut OftEntry> {
        if handle.0 == 0 {
            return None;
        }
        self.entries.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// The slot currently bound to `descriptor`, if any.
    pub fn find_by_descriptor(&self, descriptor: usize) -> Option<Handle> {
        self.entries
            .iter()
            .position(|e| e.as_ref().map(|e| e.descriptor) == Some(descriptor))
            .map(Handle)
    }

    pub fn free_slot(&self) -> Option<Handle> {
        (1..self.entries.len())
            .find(|&i| self.entries[i].is_none())
            .map(Handle)
    }

    /// Binds `entry` to the lowest free user slot.
    pub fn insert(&mut self, entry: OftEntry) -> Option<Handle> {
        let handle = self.free_slot()?;
        self.entries[handle.0] = Some(entry);
        Some(handle)
    }

    pub fn release(&mut self, handle: Handle) -> Option<OftEntry> {
        if handle.0 == 0 {
            return None;
        }
        self.entries.get_mut(handle.0).and_then(Option::take)
    }

    /// Every user handle currently open, lowest first.
    pub fn open_handles(&self) -> Vec<Handle> {
        (1..self.entries.len())
            .filter(|&i| self.entries[i].is_some())
            .map(Handle)
            .collect()
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}
