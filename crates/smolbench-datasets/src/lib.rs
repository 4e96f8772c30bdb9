//! smolbench-datasets — Dataset reference resolution and JSONL readers.
//!
//! Benchmark subsets are newline-delimited JSON resources, hosted or local.
//! This crate resolves an opaque dataset reference to a concrete source and
//! implements the `DatasetSource` trait over HTTP and the filesystem.

pub mod reader;
pub mod reference;

pub use reader::{parse_jsonl, FileDataset, HttpDataset};
pub use reference::{DatasetRef, DEFAULT_SUBSET_BASE};
