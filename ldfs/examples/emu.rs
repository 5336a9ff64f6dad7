use tempfile;

use ldfs::{self, FileSystem};

pub fn main() {
    let tmp = tempfile::tempfile().unwrap();
    let dev = ldfs::FileBlockEmulatorBuilder::from(tmp)
        .build()
        .expect("Could not initialize disk emulator.");

    // format the device and write a short file through the open file table
    let mut fs = FileSystem::fresh(dev).expect("should format");
    fs.create("NOTE").unwrap();
    let handle = fs.open("NOTE").unwrap();
    fs.write(handle, b"hello from ldfs").unwrap();
    fs.close(handle).unwrap();

    for (name, length) in fs.list_directory().unwrap() {
        println!("{} {}", name, length);
    }
}
