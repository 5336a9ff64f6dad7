use std::cmp::min;
use std::io::{Error, ErrorKind};
use std::path::Path;

use log::{debug, info, trace};

use crate::alloc::Bitmap;
use crate::config::{
    BLOCK_COUNT, BLOCK_SIZE, DIRECTORY_DESCRIPTOR, DIRECTORY_START, MAX_FILE_BLOCKS, MAX_NAME_LEN,
};
use crate::dir::{DirEntry, Directory};
use crate::error::{FsError, Result};
use crate::io::{BlockStorage, LDisk};
use crate::node::{Descriptor, DescriptorTable};
use crate::oft::{Handle, OftEntry, OpenFileTable};

fn corrupted(what: &str) -> FsError {
    FsError::Fatal(Error::new(ErrorKind::InvalidData, what.to_string()))
}

fn not_open(handle: Handle) -> FsError {
    FsError::InvalidArgument(format!("handle {} is not open", handle))
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(FsError::InvalidArgument(format!(
            "file name must be 1 to {} bytes long",
            MAX_NAME_LEN
        )));
    }
    if name.as_bytes().contains(&0) {
        return Err(FsError::InvalidArgument(
            "file name must not contain NUL".to_string(),
        ));
    }
    Ok(())
}

/// A fixed 64 block file system with a single flat directory.
///
/// Owns the block device together with every in-memory structure describing
/// it. All operations take `&mut self`, so a caller sharing one instance
/// between threads has to wrap it in a single lock.
pub struct FileSystem<T: BlockStorage> {
    dev: T,
    bitmap: Bitmap,
    descriptors: DescriptorTable,
    directory: Directory,
    oft: OpenFileTable,
}

impl<T: BlockStorage> FileSystem<T> {
    /// Formats the device and mounts the empty file system.
    ///
    /// # Layout
    /// ====================================================================
    /// | Bitmap | Descriptor table (6 blocks) | Directory | Data region  |
    /// ====================================================================
    pub fn fresh(mut dev: T) -> Result<Self> {
        Self::check_geometry(&dev)?;

        let mut bitmap = Bitmap::formatted();
        bitmap.save(&mut dev)?;

        let mut descriptors = DescriptorTable::new();
        let mut dir_node = Descriptor::new(DIRECTORY_START);
        let directory = Directory::new();
        directory.save(&mut dev, &mut bitmap, &mut dir_node)?;
        descriptors.insert(DIRECTORY_DESCRIPTOR, dir_node);
        descriptors.save(&mut dev)?;
        dev.sync_disk()?;

        info!(
            "formatted {} blocks of {} bytes, {} free",
            BLOCK_COUNT,
            BLOCK_SIZE,
            bitmap.free_count()
        );
        Ok(Self {
            dev,
            bitmap,
            descriptors,
            directory,
            oft: OpenFileTable::new(),
        })
    }

    /// Mounts a previously formatted device, reading the bitmap, descriptor
    /// table and directory back from their blocks.
    pub fn restore(mut dev: T) -> Result<Self> {
        Self::check_geometry(&dev)?;

        let bitmap = Bitmap::load(&mut dev)?;
        let descriptors = DescriptorTable::load(&mut dev)?;
        let dir_node = descriptors
            .get(DIRECTORY_DESCRIPTOR)
            .ok_or_else(|| corrupted("directory descriptor is unset"))?;
        let directory = Directory::load(&mut dev, dir_node)?;

        info!(
            "restored file system with {} files over {} descriptors, {} free blocks",
            directory.len(),
            descriptors.used_count(),
            bitmap.free_count()
        );
        Ok(Self {
            dev,
            bitmap,
            descriptors,
            directory,
            oft: OpenFileTable::new(),
        })
    }

    fn check_geometry(dev: &T) -> Result<()> {
        if dev.block_count() < BLOCK_COUNT {
            return Err(FsError::Fatal(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "device has {} blocks, need {}",
                    dev.block_count(),
                    BLOCK_COUNT
                ),
            )));
        }
        Ok(())
    }

    pub fn create(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        if self.directory.find(name).is_some() {
            return Err(FsError::Conflict(format!("{} already exists", name)));
        }
        let index = self
            .descriptors
            .find_free()
            .ok_or(FsError::Exhausted("descriptor"))?;

        // Room for the file's first block plus any block the directory grows into.
        let dir_blocks = Directory::blocks_needed(self.directory.len() + 1);
        if dir_blocks > MAX_FILE_BLOCKS {
            return Err(FsError::Exhausted("directory"));
        }
        let dir_held = self
            .descriptors
            .get(DIRECTORY_DESCRIPTOR)
            .map_or(0, Descriptor::block_count);
        if self.bitmap.free_count() < 1 + dir_blocks.saturating_sub(dir_held) {
            return Err(FsError::Exhausted("block"));
        }

        let blocknr = self.bitmap.allocate_next(&mut self.dev)?;
        self.directory.add(name, index);
        self.descriptors.insert(index, Descriptor::new(blocknr));
        self.persist()?;

        debug!("created {} as descriptor {} in block {}", name, index, blocknr);
        Ok(())
    }

    pub fn destroy(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        let index = self
            .directory
            .find(name)
            .map(|e| e.descriptor)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if self.oft.find_by_descriptor(index).is_some() {
            return Err(FsError::Conflict(format!(
                "{} is open, must close before destroy",
                name
            )));
        }

        if let Some(descriptor) = self.descriptors.clear(index) {
            for blocknr in descriptor.allocated() {
                self.bitmap.free(&mut self.dev, blocknr)?;
            }
        }
        self.directory.remove(name);
        self.persist()?;

        debug!("destroyed {} (descriptor {})", name, index);
        Ok(())
    }

    /// Opens `name`, caching its first block when the file has content.
    pub fn open(&mut self, name: &str) -> Result<Handle> {
        let index = self
            .directory
            .find(name)
            .map(|e| e.descriptor)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if self.oft.find_by_descriptor(index).is_some() {
            return Err(FsError::Conflict(format!("{} is already open", name)));
        }
        if self.oft.free_slot().is_none() {
            return Err(FsError::Exhausted("open file table"));
        }

        let descriptor = self
            .descriptors
            .get(index)
            .ok_or_else(|| corrupted("directory entry points at a free descriptor"))?;
        let mut entry = OftEntry::new(index);
        if descriptor.length > 0 {
            if let Some(blocknr) = descriptor.block(0) {
                self.dev.read_block(blocknr, &mut entry.buffer)?;
                entry.cached = Some(0);
            }
        }
        let handle = self
            .oft
            .insert(entry)
            .ok_or(FsError::Exhausted("open file table"))?;

        debug!("opened {} as handle {}", name, handle);
        Ok(handle)
    }

    /// Flushes a dirty buffer and releases the handle.
    pub fn close(&mut self, handle: Handle) -> Result<()> {
        let Self {
            dev,
            descriptors,
            oft,
            ..
        } = self;
        let entry = oft.get_mut(handle).ok_or_else(|| not_open(handle))?;
        Self::flush(dev, descriptors, entry)?;
        oft.release(handle);

        debug!("closed handle {}", handle);
        Ok(())
    }

    /// Reads up to `count` bytes from the cursor. Returns fewer bytes when the
    /// end of the file is reached first.
    pub fn read(&mut self, handle: Handle, count: usize) -> Result<Vec<u8>> {
        if count == 0 {
            return Err(FsError::InvalidArgument(
                "count must be positive".to_string(),
            ));
        }
        let Self {
            dev,
            bitmap,
            descriptors,
            oft,
            ..
        } = self;
        let entry = oft.get_mut(handle).ok_or_else(|| not_open(handle))?;
        let length = descriptors
            .get(entry.descriptor)
            .ok_or_else(|| FsError::InvalidArgument("handle has no descriptor".to_string()))?
            .length;
        if length == 0 {
            return Err(FsError::InvalidArgument("file is empty".to_string()));
        }

        let mut out = Vec::with_capacity(min(count, length.saturating_sub(entry.position)));
        while out.len() < count && entry.position < length {
            let target = entry.block_index();
            Self::swap(dev, bitmap, descriptors, entry, target)?;
            let offset = entry.block_offset();
            let n = min(
                min(count - out.len(), length - entry.position),
                BLOCK_SIZE - offset,
            );
            out.extend_from_slice(&entry.buffer[offset..offset + n]);
            entry.position += n;
        }
        Ok(out)
    }

    /// Writes `data` at the cursor and returns how many bytes made it in. The
    /// count falls short of `data.len()` once the file reaches its maximum
    /// size, or when the disk runs out of blocks after some bytes were written.
    pub fn write(&mut self, handle: Handle, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(FsError::InvalidArgument(
                "count must be positive".to_string(),
            ));
        }
        let written = {
            let Self {
                dev,
                bitmap,
                descriptors,
                oft,
                ..
            } = &mut *self;
            let entry = oft.get_mut(handle).ok_or_else(|| not_open(handle))?;
            if descriptors.get(entry.descriptor).is_none() {
                return Err(FsError::InvalidArgument(
                    "handle has no descriptor".to_string(),
                ));
            }

            let mut written = 0;
            while written < data.len() {
                let target = entry.block_index();
                if target >= MAX_FILE_BLOCKS {
                    break;
                }
                match Self::swap(dev, bitmap, descriptors, entry, target) {
                    Ok(()) => (),
                    Err(FsError::Exhausted(_)) if written > 0 => break,
                    Err(e) => return Err(e),
                }
                let offset = entry.block_offset();
                let n = min(data.len() - written, BLOCK_SIZE - offset);
                entry.buffer[offset..offset + n].copy_from_slice(&data[written..written + n]);
                entry.dirty = true;
                entry.position += n;
                written += n;

                if let Some(descriptor) = descriptors.get_mut(entry.descriptor) {
                    descriptor.length = std::cmp::max(descriptor.length, entry.position);
                }
            }
            written
        };
        self.persist()?;

        trace!("wrote {} of {} bytes to handle {}", written, data.len(), handle);
        Ok(written)
    }

    /// Moves the cursor to `pos`, swapping in the block it lands in. Like a
    /// write, this allocates that block if the file does not own it yet.
    pub fn seek(&mut self, handle: Handle, pos: usize) -> Result<()> {
        {
            let Self {
                dev,
                bitmap,
                descriptors,
                oft,
                ..
            } = &mut *self;
            let entry = oft.get_mut(handle).ok_or_else(|| not_open(handle))?;
            let length = descriptors
                .get(entry.descriptor)
                .ok_or_else(|| FsError::InvalidArgument("handle has no descriptor".to_string()))?
                .length;
            if pos > length {
                return Err(FsError::InvalidArgument(format!(
                    "position {} is past the end of the file ({} bytes)",
                    pos, length
                )));
            }

            let target = pos / BLOCK_SIZE;
            if target < MAX_FILE_BLOCKS {
                Self::swap(dev, bitmap, descriptors, entry, target)?;
            }
            entry.position = pos;
        }
        self.persist()
    }

    /// Re-reads the directory and descriptor table from disk and lists every
    /// file with its length.
    pub fn list_directory(&mut self) -> Result<Vec<(String, usize)>> {
        self.descriptors = DescriptorTable::load(&mut self.dev)?;
        let dir_node = *self
            .descriptors
            .get(DIRECTORY_DESCRIPTOR)
            .ok_or_else(|| corrupted("directory descriptor is unset"))?;
        self.directory = Directory::load(&mut self.dev, &dir_node)?;

        let descriptors = &self.descriptors;
        self.directory
            .entries()
            .iter()
            .map(|e| -> Result<(String, usize)> {
                let descriptor = descriptors
                    .get(e.descriptor)
                    .ok_or_else(|| corrupted("directory entry points at a free descriptor"))?;
                Ok((e.name.clone(), descriptor.length))
            })
            .collect()
    }

    /// Closes every open user handle, leaving no dirty buffers behind.
    pub fn close_all_files(&mut self) -> Result<()> {
        for handle in self.oft.open_handles() {
            self.close(handle)?;
        }
        Ok(())
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn descriptor(&self, index: usize) -> Option<&Descriptor> {
        self.descriptors.get(index)
    }

    pub fn entries(&self) -> &[DirEntry] {
        self.directory.entries()
    }

    /// Cursor position of an open handle.
    pub fn position(&self, handle: Handle) -> Option<usize> {
        self.oft.get(handle).map(|e| e.position)
    }

    pub fn device(&self) -> &T {
        &self.dev
    }

    /// Hands the device back. Buffers of files still open are not flushed.
    pub fn into_device(self) -> T {
        self.dev
    }

    /// Writes the bitmap, directory and descriptor table back to their blocks.
    /// The three writes are independent; nothing makes them atomic as a group.
    fn persist(&mut self) -> Result<()> {
        let Self {
            dev,
            bitmap,
            descriptors,
            directory,
            ..
        } = self;
        bitmap.save(dev)?;
        let dir_node = descriptors
            .get_mut(DIRECTORY_DESCRIPTOR)
            .ok_or_else(|| corrupted("directory descriptor is unset"))?;
        directory.save(dev, bitmap, dir_node)?;
        descriptors.save(dev)?;
        Ok(())
    }

    /// Writes the cached block back if it holds unflushed writes.
    fn flush(dev: &mut T, descriptors: &DescriptorTable, entry: &mut OftEntry) -> Result<()> {
        if !entry.dirty {
            return Ok(());
        }
        let blocknr = entry
            .cached
            .and_then(|index| descriptors.get(entry.descriptor)?.block(index))
            .ok_or_else(|| corrupted("dirty buffer has no backing block"))?;
        dev.write_block(blocknr, &entry.buffer)?;
        entry.dirty = false;
        trace!("flushed block {} of descriptor {}", blocknr, entry.descriptor);
        Ok(())
    }

    /// Makes file-relative block `target` the cached one: flushes the current
    /// buffer, allocates `target` if the file does not own it yet, and loads it.
    fn swap(
        dev: &mut T,
        bitmap: &mut Bitmap,
        descriptors: &mut DescriptorTable,
        entry: &mut OftEntry,
        target: usize,
    ) -> Result<()> {
        if entry.cached == Some(target) {
            return Ok(());
        }
        debug_assert!(target < MAX_FILE_BLOCKS);
        Self::flush(dev, descriptors, entry)?;

        let descriptor = descriptors
            .get_mut(entry.descriptor)
            .ok_or_else(|| corrupted("open file has no descriptor"))?;
        let blocknr = match descriptor.block(target) {
            Some(blocknr) => blocknr,
            None => {
                let blocknr = bitmap.allocate_next(dev)?;
                descriptor.blocks[target] = Some(blocknr);
                debug!(
                    "descriptor {} grew block {} into disk block {}",
                    entry.descriptor, target, blocknr
                );
                blocknr
            }
        };
        dev.read_block(blocknr, &mut entry.buffer)?;
        entry.cached = Some(target);
        trace!("cached block {} of descriptor {}", target, entry.descriptor);
        Ok(())
    }
}

impl FileSystem<LDisk> {
    /// Closes all files and saves the whole disk as a single image at `path`.
    pub fn save_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.close_all_files()?;
        self.dev.save_to(path)?;
        Ok(())
    }

    /// Loads a disk image saved with [`FileSystem::save_image`] and mounts it.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::restore(LDisk::load_from(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::State;
    use crate::config::{MAX_FILE_SIZE, RESERVED_BLOCKS};

    fn create_test_fs() -> FileSystem<LDisk> {
        FileSystem::fresh(LDisk::new()).unwrap()
    }

    fn disk_block(fs: &mut FileSystem<LDisk>, blocknr: usize) -> [u8; BLOCK_SIZE] {
        let mut block = [0; BLOCK_SIZE];
        fs.dev.read_block(blocknr, &mut block).unwrap();
        block
    }

    #[test]
    fn fresh_disk_reserves_metadata_blocks() {
        let fs = create_test_fs();
        for blocknr in 0..RESERVED_BLOCKS {
            assert_eq!(fs.bitmap().get(blocknr), Some(State::Used));
        }
        assert_eq!(fs.bitmap().search_free(), Some(RESERVED_BLOCKS));
        let dir_node = fs.descriptor(DIRECTORY_DESCRIPTOR).unwrap();
        assert_eq!(dir_node.blocks[0], Some(DIRECTORY_START));
        assert_eq!(dir_node.length, 0);
    }

    #[test]
    fn create_takes_the_first_free_block() {
        let mut fs = create_test_fs();
        fs.create("FILE").unwrap();
        assert_eq!(fs.bitmap().search_free(), Some(RESERVED_BLOCKS + 1));
        assert_eq!(fs.descriptor(1).unwrap().blocks[0], Some(RESERVED_BLOCKS));

        fs.destroy("FILE").unwrap();
        assert_eq!(fs.bitmap().search_free(), Some(RESERVED_BLOCKS));
    }

    #[test]
    fn writes_stay_in_the_buffer_until_close() {
        let mut fs = create_test_fs();
        fs.create("BUF").unwrap();
        let handle = fs.open("BUF").unwrap();
        fs.write(handle, b"hello").unwrap();

        let blocknr = fs.descriptor(1).unwrap().blocks[0].unwrap();
        assert_eq!(&disk_block(&mut fs, blocknr)[..5], &[0; 5]);

        fs.close(handle).unwrap();
        assert_eq!(&disk_block(&mut fs, blocknr)[..5], b"hello");
    }

    #[test]
    fn crossing_a_block_boundary_flushes_and_allocates() {
        let mut fs = create_test_fs();
        fs.create("BIG").unwrap();
        let handle = fs.open("BIG").unwrap();

        let data: Vec<u8> = (0..BLOCK_SIZE + 10).map(|i| i as u8).collect();
        assert_eq!(fs.write(handle, &data).unwrap(), data.len());

        let descriptor = *fs.descriptor(1).unwrap();
        assert_eq!(descriptor.length, BLOCK_SIZE + 10);
        assert_eq!(descriptor.block_count(), 2);
        // The first block was flushed on the swap; the second is still cached.
        let first = disk_block(&mut fs, descriptor.blocks[0].unwrap());
        assert_eq!(&first[..], &data[..BLOCK_SIZE]);
        let entry = fs.oft.get(handle).unwrap();
        assert_eq!(entry.cached, Some(1));
        assert!(entry.dirty);
    }

    #[test]
    fn write_stops_at_the_maximum_file_size() {
        let mut fs = create_test_fs();
        fs.create("MAX").unwrap();
        let handle = fs.open("MAX").unwrap();

        let data = vec![b'x'; MAX_FILE_SIZE + 20];
        assert_eq!(fs.write(handle, &data).unwrap(), MAX_FILE_SIZE);
        assert_eq!(fs.write(handle, b"more").unwrap(), 0);
        assert_eq!(fs.descriptor(1).unwrap().length, MAX_FILE_SIZE);
        assert_eq!(fs.descriptor(1).unwrap().block_count(), MAX_FILE_BLOCKS);
    }

    #[test]
    fn seek_to_a_block_boundary_at_end_of_file_allocates_the_next_block() {
        let mut fs = create_test_fs();
        fs.create("EDGE").unwrap();
        let handle = fs.open("EDGE").unwrap();
        fs.write(handle, &[7; BLOCK_SIZE]).unwrap();
        assert_eq!(fs.descriptor(1).unwrap().block_count(), 1);

        let free_before = fs.bitmap().free_count();
        fs.seek(handle, BLOCK_SIZE).unwrap();
        assert_eq!(fs.descriptor(1).unwrap().block_count(), 2);
        assert_eq!(fs.bitmap().free_count(), free_before - 1);
        // Allocation reached the descriptor table on disk as well.
        let on_disk = DescriptorTable::load(&mut fs.dev).unwrap();
        assert_eq!(on_disk.get(1).unwrap().block_count(), 2);
    }

    #[test]
    fn seek_to_a_full_file_end_does_not_allocate() {
        let mut fs = create_test_fs();
        fs.create("FULL").unwrap();
        let handle = fs.open("FULL").unwrap();
        fs.write(handle, &vec![1; MAX_FILE_SIZE]).unwrap();

        fs.seek(handle, MAX_FILE_SIZE).unwrap();
        assert_eq!(fs.position(handle), Some(MAX_FILE_SIZE));
        assert_eq!(fs.write(handle, b"z").unwrap(), 0);
    }

    #[test]
    fn seek_back_reloads_flushed_data() {
        let mut fs = create_test_fs();
        fs.create("BACK").unwrap();
        let handle = fs.open("BACK").unwrap();
        let data: Vec<u8> = (0..2 * BLOCK_SIZE).map(|i| (i % 251) as u8).collect();
        fs.write(handle, &data).unwrap();

        fs.seek(handle, 3).unwrap();
        assert_eq!(fs.oft.get(handle).unwrap().cached, Some(0));
        assert_eq!(fs.read(handle, 4).unwrap(), &data[3..7]);
        assert_eq!(fs.read(handle, 2 * BLOCK_SIZE).unwrap(), &data[7..]);
    }

    #[test]
    fn overwriting_inside_a_file_keeps_its_length() {
        let mut fs = create_test_fs();
        fs.create("OVER").unwrap();
        let handle = fs.open("OVER").unwrap();
        fs.write(handle, b"abcdefgh").unwrap();
        fs.seek(handle, 2).unwrap();
        fs.write(handle, b"XY").unwrap();

        assert_eq!(fs.descriptor(1).unwrap().length, 8);
        fs.seek(handle, 0).unwrap();
        assert_eq!(fs.read(handle, 8).unwrap(), b"abXYefgh");
    }

    #[test]
    fn failed_validation_leaves_metadata_untouched() {
        let mut fs = create_test_fs();
        fs.create("KEEP").unwrap();
        let bitmap = *fs.bitmap();
        let image = fs.dev.to_image();

        assert!(fs.create("KEEP").is_err());
        assert!(fs.create("").is_err());
        assert!(fs.create("TOOLONG").is_err());
        assert!(fs.destroy("NONE").is_err());

        assert_eq!(*fs.bitmap(), bitmap);
        assert_eq!(fs.dev.to_image(), image);
    }

    #[test]
    fn names_with_nul_are_rejected() {
        let mut fs = create_test_fs();
        match fs.create("A\0B") {
            Err(FsError::InvalidArgument(_)) => (),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn directory_handle_cannot_be_closed() {
        let mut fs = create_test_fs();
        match fs.close(Handle(0)) {
            Err(FsError::InvalidArgument(_)) => (),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn reading_an_empty_file_fails() {
        let mut fs = create_test_fs();
        fs.create("NIL").unwrap();
        let handle = fs.open("NIL").unwrap();
        match fs.read(handle, 1) {
            Err(FsError::InvalidArgument(_)) => (),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn zero_counts_are_invalid() {
        let mut fs = create_test_fs();
        fs.create("ZERO").unwrap();
        let handle = fs.open("ZERO").unwrap();
        assert!(matches!(fs.write(handle, b""), Err(FsError::InvalidArgument(_))));
        fs.write(handle, b"a").unwrap();
        assert!(matches!(fs.read(handle, 0), Err(FsError::InvalidArgument(_))));
    }

    #[test]
    fn write_on_a_full_disk_is_short_then_exhausted() {
        let mut fs = create_test_fs();
        fs.create("A").unwrap();
        // Leave exactly one free block on the disk.
        while fs.bitmap().free_count() > 1 {
            let blocknr = fs.bitmap().search_free().unwrap();
            fs.bitmap.allocate(&mut fs.dev, blocknr).unwrap();
        }
        let handle = fs.open("A").unwrap();
        let data = vec![b'q'; MAX_FILE_SIZE];

        assert_eq!(fs.write(handle, &data).unwrap(), 2 * BLOCK_SIZE);
        assert!(matches!(
            fs.write(handle, &data),
            Err(FsError::Exhausted("block"))
        ));
        assert_eq!(fs.descriptor(1).unwrap().length, 2 * BLOCK_SIZE);
    }

    #[test]
    fn listing_an_entry_without_a_descriptor_is_fatal() {
        let mut fs = create_test_fs();
        fs.create("LOST").unwrap();
        // Free the file's descriptor on disk behind the directory's back.
        fs.descriptors.clear(1);
        fs.descriptors.save(&mut fs.dev).unwrap();

        match fs.list_directory() {
            Err(FsError::Fatal(e)) => assert_eq!(e.kind(), ErrorKind::InvalidData),
            other => panic!("expected a fatal error, got {:?}", other),
        }
    }

    #[test]
    fn list_directory_reports_lengths_from_disk() {
        let mut fs = create_test_fs();
        fs.create("ONE").unwrap();
        fs.create("TWO").unwrap();
        let handle = fs.open("TWO").unwrap();
        fs.write(handle, &[3; 70]).unwrap();

        assert_eq!(
            fs.list_directory().unwrap(),
            vec![("ONE".to_string(), 0), ("TWO".to_string(), 70)]
        );
    }
}
