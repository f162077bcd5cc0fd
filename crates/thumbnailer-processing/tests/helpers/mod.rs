//! Test helpers: in-memory storage and image fixtures for pipeline tests.
//!
//! Run from workspace root: `cargo test -p thumbnailer-processing --test pipeline_test`.

pub mod fixtures;
pub mod mock_storage;

pub use fixtures::*;
pub use mock_storage::{MockStorage, StorageCall};
