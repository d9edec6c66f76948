use crate::types::channel::{Channel, ChannelId};
use crate::types::columns::ColumnMap;
use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// A complete min/max pair ready to be appended to a channel
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSample {
    pub timestamp: NaiveDateTime,
    pub channel_id: ChannelId,
    pub min: f64,
    pub max: f64,
}

/// Counters collected while walking one file's data section
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleStats {
    pub data_lines: usize,
    pub short_lines: usize,
    pub timestamp_errors: usize,
    pub invalid_cells: usize,
    pub unmapped_cells: usize,
    pub unknown_kind_cells: usize,
    pub pairs_committed: usize,
    pub pairs_incomplete: usize,
}

/// Everything extracted from one file, not yet merged into a dataset
#[derive(Debug, Clone, Default)]
pub struct ParsedGtd {
    pub metadata: IndexMap<String, String>,
    pub columns: ColumnMap,
    pub samples: Vec<PairedSample>,
    pub stats: SampleStats,
}

/// Aggregation context shared by every file of a batch.
///
/// Merge rules: metadata keys are last-write-wins across files; channels are
/// shared by identifier, keep the unit of the file that first defined them, and
/// grow by appending samples in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GtdDataset {
    pub metadata: IndexMap<String, String>,
    pub channels: IndexMap<ChannelId, Channel>,
}

impl GtdDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed file into the dataset
    pub fn merge(&mut self, parsed: ParsedGtd) {
        for (key, value) in parsed.metadata {
            self.metadata.insert(key, value);
        }

        for (_, def) in parsed.columns.iter() {
            self.channels
                .entry(def.channel_id.clone())
                .or_insert_with(|| Channel::new(def.channel_id.clone(), def.unit.clone()));
        }

        for sample in parsed.samples {
            if let Some(channel) = self.channels.get_mut(&sample.channel_id) {
                channel.add_sample(sample.timestamp, sample.min, sample.max);
            }
        }
    }

    pub fn channel(&self, channel_id: &ChannelId) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    pub fn total_samples(&self) -> usize {
        self.channels.values().map(Channel::sample_count).sum()
    }

    /// Channels ordered numeric ids first, then symbolic ids
    pub fn sorted_channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.values().collect();
        channels.sort_by(|a, b| a.channel_id().cmp(b.channel_id()));
        channels
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.channels.is_empty()
    }
}
