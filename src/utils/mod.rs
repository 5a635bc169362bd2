//! Utility functions

mod sanitize;

pub use sanitize::{extension, local_file_name, sanitize_filename};
