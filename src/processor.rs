//! Stateful front end over the parser and exporters
//!
//! [`GtdProcessor`] owns one aggregation context and the column map of the
//! last file it read. It is the narrow surface meant for dashboards and other
//! callers: process files, read channels and metadata, export, import.

use crate::error::Result;
use crate::export::*;
use crate::parser::*;
use crate::types::*;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Accumulates GTD files into one dataset.
///
/// Not synchronized: share it across threads only behind the caller's own lock.
#[derive(Debug, Clone, Default)]
pub struct GtdProcessor {
    dataset: GtdDataset,
    channel_map: ColumnMap,
}

impl GtdProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing dataset, e.g. one restored from JSON
    pub fn from_dataset(dataset: GtdDataset) -> Self {
        Self {
            dataset,
            channel_map: ColumnMap::new(),
        }
    }

    /// Merge one file; a rejected file leaves the state untouched
    pub fn process_file(&mut self, file_path: &Path) -> Result<SampleStats> {
        let report = process_gtd_file(file_path, &mut self.dataset)?;
        self.channel_map = report.columns;
        Ok(report.stats)
    }

    /// Merge files in order, stopping at the first failure
    pub fn process_multiple_files<P: AsRef<Path>>(
        &mut self,
        file_paths: &[P],
    ) -> Result<Vec<SampleStats>> {
        file_paths
            .iter()
            .map(|path| self.process_file(path.as_ref()))
            .collect()
    }

    pub fn channels(&self) -> &IndexMap<ChannelId, Channel> {
        &self.dataset.channels
    }

    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.dataset.metadata
    }

    /// Column layout of the most recently processed file
    pub fn channel_map(&self) -> &ColumnMap {
        &self.channel_map
    }

    pub fn dataset(&self) -> &GtdDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> GtdDataset {
        self.dataset
    }

    #[cfg(feature = "csv")]
    pub fn export_tabular(&self, path: &Path) -> Result<Option<TabularReport>> {
        export_tabular(&self.dataset, path)
    }

    #[cfg(feature = "json")]
    pub fn export_json(&self, path: &Path) -> Result<PathBuf> {
        export_json(&self.dataset, path)
    }

    #[cfg(feature = "json")]
    pub fn import_json(path: &Path) -> Result<Self> {
        Ok(Self::from_dataset(import_json(path)?))
    }
}

/// Process every `.gtd` file in `dir` (sorted by name) and export the result.
///
/// Exports land in `options.output_dir`, or in `dir` itself when unset.
#[cfg(all(feature = "csv", feature = "json"))]
pub fn process_gtd_directory(
    dir: &Path,
    options: &ExportOptions,
) -> Result<(GtdProcessor, ExportReport)> {
    let gtd_files = find_gtd_files_in_dir(dir)?;
    let mut processor = GtdProcessor::new();

    if gtd_files.is_empty() {
        warn!("No GTD files found in directory: {}", dir.display());
        return Ok((processor, ExportReport::default()));
    }

    processor.process_multiple_files(&gtd_files)?;
    let report = export_dataset(processor.dataset(), options, dir)?;

    info!("Processed {} GTD files", gtd_files.len());
    Ok((processor, report))
}
