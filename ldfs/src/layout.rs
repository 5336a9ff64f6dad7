//! Fixed on-disk record layouts and a small cursor for placing them inside a
//! block. Integers are stored big endian, matching the rest of the format.
//!
//! ```text
//! descriptor record (16 bytes)      directory record (8 bytes)
//! +--------+----+----+----+         +------------+--------+
//! | length | b0 | b1 | b2 |         | name (NUL) | index  |
//! +--------+----+----+----+         +------------+--------+
//!   i32      i32 x MAX_FILE_BLOCKS    u8 x 4       i32
//! ```

use std::convert::TryFrom;
use std::io::{Error, ErrorKind};
use std::mem::size_of;

use zerocopy::byteorder::{BigEndian, I32};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::config::{DESCRIPTOR_SIZE, DIR_ENTRY_SIZE, MAX_FILE_BLOCKS, MAX_NAME_LEN, UNSET};

pub type Int = I32<BigEndian>;

#[repr(C)]
#[derive(AsBytes, FromBytes, FromZeroes, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorRecord {
    pub length: Int,
    pub blocks: [Int; MAX_FILE_BLOCKS],
}

#[repr(C)]
#[derive(AsBytes, FromBytes, FromZeroes, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirRecord {
    /// NUL padded. A leading NUL marks the unused tail of a directory block.
    pub name: [u8; MAX_NAME_LEN],
    pub descriptor: Int,
}

const _: () = assert!(size_of::<DescriptorRecord>() == DESCRIPTOR_SIZE);
const _: () = assert!(size_of::<DirRecord>() == DIR_ENTRY_SIZE);

impl DescriptorRecord {
    /// The record stored in a free descriptor slot.
    pub fn unset() -> Self {
        Self {
            length: Int::new(UNSET),
            blocks: [Int::new(UNSET); MAX_FILE_BLOCKS],
        }
    }
}

impl DirRecord {
    /// True for the zeroed record that terminates a partially filled block.
    pub fn is_terminator(&self) -> bool {
        self.name[0] == 0
    }
}

/// Encodes an optional non-negative quantity, writing `UNSET` for `None`.
pub fn encode_opt(value: Option<usize>) -> Int {
    match value.and_then(|v| i32::try_from(v).ok()) {
        Some(v) => Int::new(v),
        None => Int::new(UNSET),
    }
}

/// Any negative value decodes as unset.
pub fn decode_opt(value: Int) -> Option<usize> {
    usize::try_from(value.get()).ok()
}

fn out_of_bounds(offset: usize, len: usize, available: usize) -> Error {
    Error::new(
        ErrorKind::UnexpectedEof,
        format!(
            "record of {} bytes at offset {} overruns {} byte buffer",
            len, offset, available
        ),
    )
}

/// Reads fixed-layout values out of a byte buffer, either at explicit offsets
/// or sequentially from the current position.
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn read_at<T: FromBytes>(&self, offset: usize) -> std::io::Result<T> {
        let len = size_of::<T>();
        self.buf
            .get(offset..offset + len)
            .and_then(T::read_from)
            .ok_or_else(|| out_of_bounds(offset, len, self.buf.len()))
    }

    pub fn next<T: FromBytes>(&mut self) -> std::io::Result<T> {
        let value = self.read_at(self.pos)?;
        self.pos += size_of::<T>();
        Ok(value)
    }

    /// Whether another `T` fits between the cursor and the end of the buffer.
    pub fn has_room_for<T>(&self) -> bool {
        self.pos + size_of::<T>() <= self.buf.len()
    }
}

/// Writing counterpart of [`RecordReader`]. Bytes outside the written records
/// are left as they were.
pub struct RecordWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> RecordWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn write_at<T: AsBytes>(&mut self, offset: usize, value: &T) -> std::io::Result<()> {
        let len = size_of::<T>();
        let available = self.buf.len();
        self.buf
            .get_mut(offset..offset + len)
            .and_then(|dst| value.write_to(dst))
            .ok_or_else(|| out_of_bounds(offset, len, available))
    }

    pub fn push<T: AsBytes>(&mut self, value: &T) -> std::io::Result<()> {
        self.write_at(self.pos, value)?;
        self.pos += size_of::<T>();
        Ok(())
    }
}
