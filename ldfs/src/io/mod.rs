mod block;
mod diskemu;
mod ldisk;

pub use block::{BlockNumber, BlockStorage};
pub use diskemu::{FileBlockEmulator, FileBlockEmulatorBuilder};
pub use ldisk::LDisk;
