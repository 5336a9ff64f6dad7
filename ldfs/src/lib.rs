//! A small block file system living on a 64 block logical disk.
//!
//! The disk is laid out as one bitmap block, six blocks of file descriptors
//! and a data region. The single flat directory is itself a file, held by
//! descriptor 0. Files are opened through a four slot open file table that
//! caches one block per open file.
mod alloc;
mod dir;
mod error;
mod fs;
mod layout;
mod node;
mod oft;

pub mod config;
pub mod io;

pub use crate::alloc::{Bitmap, State};
pub use crate::dir::DirEntry;
pub use crate::error::{FsError, Result};
pub use crate::fs::FileSystem;
pub use crate::io::{BlockStorage, FileBlockEmulator, FileBlockEmulatorBuilder, LDisk};
pub use crate::node::Descriptor;
pub use crate::oft::Handle;
