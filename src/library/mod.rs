//! Local library layout module

pub mod storage;

pub use storage::LibraryStorage;
