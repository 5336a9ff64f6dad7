/// Size in bytes of a single logical disk block.
pub const BLOCK_SIZE: usize = 64;
/// Number of blocks on the logical disk.
pub const BLOCK_COUNT: usize = 64;

/// Known locations.
pub const BITMAP_BLOCK: usize = 0;
pub const DESCRIPTOR_START: usize = 1;
pub const DESCRIPTOR_BLOCKS: usize = 6;
/// First data block of the directory, handed to descriptor 0 at format time.
pub const DIRECTORY_START: usize = DESCRIPTOR_START + DESCRIPTOR_BLOCKS;
/// Blocks `[0, RESERVED_BLOCKS)` are marked allocated on a freshly formatted disk.
pub const RESERVED_BLOCKS: usize = DIRECTORY_START + 1;

/// Only the leading `BITMAP_BYTES` of the bitmap block belong to the bitmap.
pub const BITMAP_BYTES: usize = (BLOCK_COUNT + 7) / 8;

/// Direct block pointers per descriptor. A file holds at most
/// `MAX_FILE_BLOCKS * BLOCK_SIZE` bytes.
pub const MAX_FILE_BLOCKS: usize = 3;
pub const MAX_FILE_SIZE: usize = MAX_FILE_BLOCKS * BLOCK_SIZE;
/// `i32` length followed by `MAX_FILE_BLOCKS` `i32` block pointers.
pub const DESCRIPTOR_SIZE: usize = 4 * (1 + MAX_FILE_BLOCKS);
pub const DESCRIPTORS_PER_BLOCK: usize = BLOCK_SIZE / DESCRIPTOR_SIZE;
pub const DESCRIPTOR_COUNT: usize = 24;
/// Descriptor slot holding the directory itself.
pub const DIRECTORY_DESCRIPTOR: usize = 0;

pub const MAX_NAME_LEN: usize = 4;
/// Name bytes followed by an `i32` descriptor index.
pub const DIR_ENTRY_SIZE: usize = MAX_NAME_LEN + 4;
pub const DIR_ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;
pub const MAX_DIR_ENTRIES: usize = DIR_ENTRIES_PER_BLOCK * MAX_FILE_BLOCKS;

/// Slot 0 is bound to the directory, leaving `OFT_CAPACITY - 1` user handles.
pub const OFT_CAPACITY: usize = 4;

/// On-disk encoding of an unset length or block pointer.
pub const UNSET: i32 = -1;

const _: () = assert!(BITMAP_BYTES <= BLOCK_SIZE);
const _: () = assert!(BLOCK_SIZE % DESCRIPTOR_SIZE == 0);
const _: () = assert!(DESCRIPTOR_COUNT <= DESCRIPTORS_PER_BLOCK * DESCRIPTOR_BLOCKS);
const _: () = assert!(BLOCK_SIZE % DIR_ENTRY_SIZE == 0);
const _: () = assert!(MAX_DIR_ENTRIES >= DESCRIPTOR_COUNT - 1);
const _: () = assert!(RESERVED_BLOCKS < BLOCK_COUNT);
