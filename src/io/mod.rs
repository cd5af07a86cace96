pub mod disk;

pub use disk::DiskController;
pub use disk::IoRequest;
