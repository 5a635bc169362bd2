//! archive.org manifest and transfer module

pub mod client;
pub mod models;
pub mod transfer;

pub use client::{Archive, ArchiveClient};
pub use models::*;
pub use transfer::{HttpTransfer, Transfer};
