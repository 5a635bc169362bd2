//! Relisten catalog module

pub mod client;
pub mod models;

pub use client::{Catalog, CatalogClient};
pub use models::*;
