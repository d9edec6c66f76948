//! GTD Parser Library
//!
//! A Rust library for reading tab-delimited GTD files written by data-logging
//! instruments. Each file carries a `key<TAB>value` header, three channel
//! definition rows (`Ch`, `Unit`, `Kind`) and a `Sampling Data` section whose
//! rows hold the minimum and maximum reading of every channel per interval.
//! The library pairs those readings into per-channel series and exports them.
//!
//! # Features
//!
//! - **`csv`** (default): Enable the tabular (CSV) export
//! - **`json`** (default): Enable JSON export and import of whole datasets
//! - **`cli`** (default): Build the command-line interface binary
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gtd_parser::GtdProcessor;
//! use std::path::Path;
//!
//! let mut processor = GtdProcessor::new();
//! processor.process_file(Path::new("002171_230828_101630.GTD")).unwrap();
//! processor.process_file(Path::new("002172_230828_111630.GTD")).unwrap();
//! for channel in processor.channels().values() {
//!     println!("{channel}");
//! }
//! processor.export_tabular(Path::new("out/combined")).unwrap();
//! processor.export_json(Path::new("out/combined")).unwrap();
//! ```
//!
//! Callers that want to own the aggregation state can use the free functions:
//!
//! ```rust,no_run
//! use gtd_parser::{process_multiple_files, GtdDataset};
//!
//! let mut dataset = GtdDataset::new();
//! let reports = process_multiple_files(&["a.GTD", "b.GTD"], &mut dataset).unwrap();
//! println!("{} files, {} samples", reports.len(), dataset.total_samples());
//! ```
//!
//! # Public API
//!
//! ## Parsing Functions
//! - [`parse_gtd_file`] / [`parse_gtd_str`] - Parse one file without merging it
//! - [`process_gtd_file`] - Parse one file and merge it into a [`GtdDataset`]
//! - [`process_multiple_files`] - Fail-fast batch over several files
//! - [`process_files_keep_going`] - Batch that records failures and continues
//! - [`find_gtd_files_in_dir`] - List `.gtd` files of a directory
//!
//! ## Data Types
//! - [`Channel`] - One channel's aligned timestamp/min/max series
//! - [`ChannelId`] - Numeric or symbolic channel identifier
//! - [`GtdDataset`] - Metadata and channels accumulated across files
//! - [`GtdProcessor`] - Stateful wrapper exposing process/export/import
//!
//! ## Export Functions
//! - [`build_tabular`] - Join channels into one table
//! - [`export_tabular`] - Write data, metadata and channel sheets as CSV
//! - [`export_json`] / [`import_json`] - Whole-dataset JSON round trip
//! - [`export_dataset`] - Export according to [`ExportOptions`]

pub mod error;
pub mod export;
pub mod parser;
pub mod processor;
pub mod types;

pub use error::*;
pub use export::*;
pub use parser::*;
pub use processor::*;
pub use types::*;
