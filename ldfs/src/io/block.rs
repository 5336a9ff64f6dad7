/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is number of blocks available.
pub type BlockNumber = usize;

/// Fixed-geometry block device. Every transfer moves exactly one whole block of
/// `config::BLOCK_SIZE` bytes.
pub trait BlockStorage {
    /// The number of blocks the device holds.
    fn block_count(&self) -> usize;
    /// Reads disk block number into provided buffer.
    ///
    /// # Errors
    ///
    /// Attempting to read a block out of range, or into a buffer that is not
    /// exactly one block long, will return an `InvalidInput` error.
    fn read_block(&mut self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()>;
    /// Writes provided buffer into the specified block number.
    ///
    /// # Errors
    ///
    /// Attempting to write a block out of range, or from a buffer that is not
    /// exactly one block long, will return an `InvalidInput` error.
    fn write_block(&mut self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()>;
    /// Flush any buffered disk IO from memory. This is useful if it must guaranteed
    /// the disk writes actually occurred, for instance, if being re-read from
    /// disk.
    fn sync_disk(&mut self) -> std::io::Result<()>;
}

/// Shared bounds and size check for device implementations.
pub(crate) fn check_access(
    blocknr: BlockNumber,
    block_count: usize,
    len: usize,
) -> std::io::Result<()> {
    use crate::config::BLOCK_SIZE;
    use std::io::{Error, ErrorKind};

    if blocknr >= block_count {
        return Err(Error::new(ErrorKind::InvalidInput, "block out of range"));
    }
    if len != BLOCK_SIZE {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "buffer length must equal block size",
        ));
    }
    Ok(())
}
