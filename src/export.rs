//! Export functionality for GTD datasets
//!
//! Writes a dataset as a joined table (three CSV sheets) and as a structured
//! JSON document, and reads that document back.

use crate::error::Result;
use crate::types::*;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[cfg(feature = "serde")]
use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base name used when none is configured
pub const DEFAULT_BASE_NAME: &str = "GTD_Processed_Data";

/// Format of the `Timestamp` column in the data sheet
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Export options for controlling output formats
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
    pub output_dir: Option<String>,
    pub base_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            csv: true,
            json: true,
            output_dir: None,
            base_name: DEFAULT_BASE_NAME.to_string(),
        }
    }
}

/// Paths of the three sheets written by the tabular export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularPaths {
    pub data: PathBuf,
    pub metadata: PathBuf,
    pub channels: PathBuf,
}

impl TabularPaths {
    /// Derive sheet paths from a base path; a trailing `.csv` is dropped first
    pub fn from_base(path: &Path) -> Self {
        let base = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => path.with_extension(""),
            _ => path.to_path_buf(),
        };
        let with_suffix = |suffix: &str| {
            let mut name = base.clone().into_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };

        Self {
            data: with_suffix(".csv"),
            metadata: with_suffix(".metadata.csv"),
            channels: with_suffix(".channels.csv"),
        }
    }
}

/// Output locations for one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub tabular: TabularPaths,
    pub json: PathBuf,
}

/// Compute output paths, using `fallback_dir` when no output directory is set
pub fn compute_export_paths(options: &ExportOptions, fallback_dir: &Path) -> ExportPaths {
    let output_dir = options
        .output_dir
        .as_deref()
        .map(Path::new)
        .unwrap_or(fallback_dir);
    let base_name = if options.base_name.trim().is_empty() {
        DEFAULT_BASE_NAME
    } else {
        options.base_name.trim()
    };
    let base = output_dir.join(base_name);

    ExportPaths {
        tabular: TabularPaths::from_base(&base),
        json: json_path(&base),
    }
}

/// Append `.json` unless the path already ends with it
pub fn json_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".json");
            PathBuf::from(name)
        }
    }
}

/// Channels joined on the timestamps of the longest one
#[derive(Debug, Clone)]
pub struct TabularTable<'a> {
    pub timestamps: &'a [NaiveDateTime],
    /// Value columns after `Timestamp`, in output order
    pub columns: Vec<(String, &'a [f64])>,
    pub included: Vec<ChannelId>,
    pub omitted: Vec<ChannelId>,
}

impl TabularTable<'_> {
    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn headers(&self) -> Vec<&str> {
        std::iter::once("Timestamp")
            .chain(self.columns.iter().map(|(name, _)| name.as_str()))
            .collect()
    }
}

/// Join channels into one table.
///
/// The channel with the most samples (first one on ties) supplies the
/// `Timestamp` column and the first value columns. Every other channel follows
/// in id order, but only when its sample count equals the table's row count;
/// the rest are left out rather than padded or truncated. Returns `None` when
/// no channel has samples.
pub fn build_tabular(dataset: &GtdDataset) -> Option<TabularTable<'_>> {
    let mut base: Option<&Channel> = None;
    for channel in dataset.channels.values() {
        if channel.sample_count() > base.map_or(0, Channel::sample_count) {
            base = Some(channel);
        }
    }
    let base = base?;

    let base_columns = base.to_tabular_columns();
    let mut table = TabularTable {
        timestamps: base_columns.timestamps,
        columns: vec![
            (base_columns.min_name, base_columns.samples_min),
            (base_columns.max_name, base_columns.samples_max),
        ],
        included: vec![base.channel_id().clone()],
        omitted: Vec::new(),
    };

    for channel in dataset.sorted_channels() {
        if channel.channel_id() == base.channel_id() {
            continue;
        }

        if channel.sample_count() != table.row_count() {
            warn!(
                "Channel {} has {} samples but the table has {} rows; leaving it out",
                channel.channel_id(),
                channel.sample_count(),
                table.row_count()
            );
            table.omitted.push(channel.channel_id().clone());
            continue;
        }

        let columns = channel.to_tabular_columns();
        table.columns.push((columns.min_name, columns.samples_min));
        table.columns.push((columns.max_name, columns.samples_max));
        table.included.push(channel.channel_id().clone());
    }

    Some(table)
}

/// What a tabular export wrote
#[derive(Debug, Clone)]
pub struct TabularReport {
    pub paths: TabularPaths,
    pub rows: usize,
    pub included: Vec<ChannelId>,
    pub omitted: Vec<ChannelId>,
}

/// Write the joined table, the metadata and the channel summary as CSV sheets.
///
/// Nothing is written when no channel has samples.
#[cfg(feature = "csv")]
pub fn export_tabular(dataset: &GtdDataset, path: &Path) -> Result<Option<TabularReport>> {
    let table = match build_tabular(dataset) {
        Some(table) => table,
        None => {
            warn!("No channel has samples; skipping tabular export");
            return Ok(None);
        }
    };

    let paths = TabularPaths::from_base(path);
    if let Some(parent) = paths.data.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    write_data_sheet(&table, &paths.data)?;
    write_metadata_sheet(dataset, &paths.metadata)?;
    write_channel_sheet(dataset, &paths.channels)?;

    info!(
        "Exported {} rows x {} channels to {}",
        table.row_count(),
        table.included.len(),
        paths.data.display()
    );

    Ok(Some(TabularReport {
        paths,
        rows: table.row_count(),
        included: table.included,
        omitted: table.omitted,
    }))
}

#[cfg(feature = "csv")]
fn write_data_sheet(table: &TabularTable<'_>, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.headers())?;

    let mut record = Vec::with_capacity(table.columns.len() + 1);
    for (row, timestamp) in table.timestamps.iter().enumerate() {
        record.clear();
        record.push(timestamp.format(TABLE_TIMESTAMP_FORMAT).to_string());
        record.extend(table.columns.iter().map(|(_, values)| values[row].to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(feature = "csv")]
fn write_metadata_sheet(dataset: &GtdDataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Key", "Value"])?;
    for (key, value) in &dataset.metadata {
        writer.write_record([key, value])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "csv")]
fn write_channel_sheet(dataset: &GtdDataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Channel ID", "Unit", "Samples"])?;
    for channel in dataset.sorted_channels() {
        writer.write_record([
            channel.channel_id().to_string(),
            channel.unit().to_string(),
            channel.sample_count().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Structured document holding a whole dataset
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GtdDocument {
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
    #[serde(default)]
    pub channels: IndexMap<String, ChannelRecord>,
}

#[cfg(feature = "serde")]
impl GtdDocument {
    /// Snapshot a dataset; channels are keyed by their id text
    pub fn from_dataset(dataset: &GtdDataset) -> Self {
        let mut channels = IndexMap::with_capacity(dataset.channels.len());
        for (channel_id, channel) in &dataset.channels {
            let mut key = channel_id.to_string();
            // Numeric(7) and Symbolic("7") print alike.
            let mut n = 1;
            while channels.contains_key(&key) {
                n += 1;
                key = format!("{channel_id}#{n}");
            }
            channels.insert(key, channel.to_record());
        }

        Self {
            metadata: dataset.metadata.clone(),
            channels,
        }
    }

    /// Rebuild the dataset; each channel is keyed by the id stored in its record
    pub fn into_dataset(self) -> Result<GtdDataset> {
        let mut dataset = GtdDataset {
            metadata: self.metadata,
            channels: Default::default(),
        };
        for (key, record) in self.channels {
            let channel = Channel::from_record(record)?;
            if dataset.channels.contains_key(channel.channel_id()) {
                warn!(
                    "Duplicate channel {} under key '{}' replaces earlier record",
                    channel.channel_id(),
                    key
                );
            }
            dataset
                .channels
                .insert(channel.channel_id().clone(), channel);
        }
        Ok(dataset)
    }
}

/// Write the dataset as pretty-printed JSON; `.json` is appended when missing
#[cfg(feature = "json")]
pub fn export_json(dataset: &GtdDataset, path: &Path) -> Result<PathBuf> {
    use std::io::{BufWriter, Write};

    let path = json_path(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(&path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &GtdDocument::from_dataset(dataset))?;
    writer.flush()?;

    info!(
        "Exported {} channels to {}",
        dataset.channels.len(),
        path.display()
    );
    Ok(path)
}

/// Read a dataset previously written by [`export_json`]
#[cfg(feature = "json")]
pub fn import_json(path: &Path) -> Result<GtdDataset> {
    let file = std::fs::File::open(path)?;
    let document: GtdDocument = serde_json::from_reader(std::io::BufReader::new(file))?;
    let dataset = document.into_dataset()?;

    info!(
        "Imported {} channels and {} metadata entries from {}",
        dataset.channels.len(),
        dataset.metadata.len(),
        path.display()
    );
    Ok(dataset)
}

/// Results of one export run
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub tabular: Option<TabularReport>,
    pub json_path: Option<PathBuf>,
}

/// Export according to `options`, writing next to `fallback_dir` when no output directory is set
#[cfg(all(feature = "csv", feature = "json"))]
pub fn export_dataset(
    dataset: &GtdDataset,
    options: &ExportOptions,
    fallback_dir: &Path,
) -> Result<ExportReport> {
    let paths = compute_export_paths(options, fallback_dir);
    let mut report = ExportReport::default();

    if options.csv {
        report.tabular = export_tabular(dataset, &paths.tabular.data)?;
    }
    if options.json {
        report.json_path = Some(export_json(dataset, &paths.json)?);
    }

    Ok(report)
}
