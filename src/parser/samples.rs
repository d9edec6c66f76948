use crate::types::{
    parse_gtd_timestamp, ChannelId, ColumnMap, PairedSample, SampleKind, SampleStats,
};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Half-filled sample waiting for its other side
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PendingPair {
    min: Option<f64>,
    max: Option<f64>,
}

/// Walk the data lines after the sentinel and pair min/max readings.
///
/// Readings are buffered per (timestamp, channel) until the whole section has
/// been read; only buffers holding both halves are returned, in the order
/// their key was first seen. Bad timestamps, bad numbers and unmapped columns
/// are skipped and counted.
pub fn parse_samples<S: AsRef<str>>(
    data_lines: &[S],
    columns: &ColumnMap,
) -> (Vec<PairedSample>, SampleStats) {
    let mut stats = SampleStats::default();
    let mut pending: IndexMap<(NaiveDateTime, ChannelId), PendingPair> = IndexMap::new();

    for line in data_lines {
        let line = line.as_ref().trim();
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 {
            stats.short_lines += 1;
            continue;
        }
        stats.data_lines += 1;

        let timestamp = match parse_gtd_timestamp(parts[0]) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                warn!("Skipping line with invalid timestamp '{}': {}", parts[0].trim(), e);
                stats.timestamp_errors += 1;
                continue;
            }
        };

        for (column, raw_value) in parts.iter().enumerate().skip(1) {
            let definition = match columns.get(column) {
                Some(definition) => definition,
                None => {
                    if !raw_value.trim().is_empty() {
                        stats.unmapped_cells += 1;
                    }
                    continue;
                }
            };

            let raw_value = raw_value.trim();
            if raw_value.is_empty() {
                continue;
            }

            let value = match raw_value.parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    debug!("Column {}: ignoring non-numeric value '{}'", column, raw_value);
                    stats.invalid_cells += 1;
                    continue;
                }
            };

            let slot = pending
                .entry((timestamp, definition.channel_id.clone()))
                .or_default();
            match definition.kind {
                SampleKind::Min => slot.min = Some(value),
                SampleKind::Max => slot.max = Some(value),
                SampleKind::Other(_) => stats.unknown_kind_cells += 1,
            }
        }
    }

    let mut samples = Vec::with_capacity(pending.len());
    for ((timestamp, channel_id), pair) in pending {
        match (pair.min, pair.max) {
            (Some(min), Some(max)) => samples.push(PairedSample {
                timestamp,
                channel_id,
                min,
                max,
            }),
            _ => stats.pairs_incomplete += 1,
        }
    }
    stats.pairs_committed = samples.len();

    info!(
        "Paired {} samples ({} incomplete pairs discarded)",
        stats.pairs_committed, stats.pairs_incomplete
    );
    (samples, stats)
}
