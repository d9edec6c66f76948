use crate::error::FormatError;
use crate::types::{ChannelId, ColumnDefinition, ColumnMap, SampleKind};
use tracing::{debug, info};

/// Number of lines before `Sampling Data` searched for the definition rows
pub const DEFINITION_LOOKBACK: usize = 10;

const CH_LABEL: &str = "Ch";
const UNIT_LABEL: &str = "Unit";
const KIND_LABEL: &str = "Kind";

/// Build the column map from the `Ch`, `Unit` and `Kind` rows.
///
/// Only the `DEFINITION_LOOKBACK` lines directly above the sentinel are
/// searched; when a label occurs twice the later line wins. Columns whose `Ch`
/// cell is blank are skipped, and missing `Unit`/`Kind` cells read as empty.
pub fn parse_channel_definitions<S: AsRef<str>>(
    lines: &[S],
    sampling_data_index: usize,
) -> Result<ColumnMap, FormatError> {
    let window_start = sampling_data_index.saturating_sub(DEFINITION_LOOKBACK);
    let window_end = sampling_data_index.min(lines.len());

    let mut ch_row: Option<Vec<&str>> = None;
    let mut unit_row: Option<Vec<&str>> = None;
    let mut kind_row: Option<Vec<&str>> = None;

    for line in lines.iter().take(window_end).skip(window_start) {
        let parts: Vec<&str> = line.as_ref().trim().split('\t').collect();
        match parts.first().map(|label| label.trim()) {
            Some(CH_LABEL) => ch_row = Some(parts),
            Some(UNIT_LABEL) => unit_row = Some(parts),
            Some(KIND_LABEL) => kind_row = Some(parts),
            _ => {}
        }
    }

    let (ch_row, unit_row, kind_row) = match (ch_row, unit_row, kind_row) {
        (Some(ch), Some(unit), Some(kind)) => (ch, unit, kind),
        (ch, unit, kind) => {
            let missing = [
                (CH_LABEL, ch.is_none()),
                (UNIT_LABEL, unit.is_none()),
                (KIND_LABEL, kind.is_none()),
            ]
            .into_iter()
            .filter_map(|(label, absent)| absent.then_some(label))
            .collect();
            return Err(FormatError::MissingDefinitionRows { missing });
        }
    };

    let cell = |row: &[&str], column: usize| -> String {
        row.get(column).map(|c| c.trim().to_string()).unwrap_or_default()
    };

    let mut columns = ColumnMap::new();
    for (column, raw_id) in ch_row.iter().enumerate().skip(1) {
        if raw_id.trim().is_empty() {
            continue;
        }

        let definition = ColumnDefinition {
            channel_id: ChannelId::from_cell(raw_id),
            kind: SampleKind::from_cell(&cell(&kind_row, column)),
            unit: cell(&unit_row, column),
        };
        debug!(
            "Column {}: channel {} {:?} [{}]",
            column, definition.channel_id, definition.kind, definition.unit
        );
        columns.insert(column, definition);
    }

    if columns.is_empty() {
        return Err(FormatError::NoChannelColumns);
    }

    info!(
        "Found {} data columns for {} channels",
        columns.len(),
        columns.channel_ids().len()
    );
    Ok(columns)
}
