use crate::types::channel::ChannelId;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which half of a sample pair a data column carries
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SampleKind {
    Min,
    Max,
    /// Any other `Kind` cell; values in such columns are never paired
    Other(String),
}

impl SampleKind {
    /// Match a `Kind` row cell, case-insensitively for `min`/`max`
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.eq_ignore_ascii_case("min") {
            SampleKind::Min
        } else if trimmed.eq_ignore_ascii_case("max") {
            SampleKind::Max
        } else {
            SampleKind::Other(trimmed.to_string())
        }
    }
}

/// Channel, kind and unit attached to one data column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDefinition {
    pub channel_id: ChannelId,
    pub kind: SampleKind,
    pub unit: String,
}

/// Data column position (1-based; column 0 is the timestamp) to its definition.
/// Rebuilt for every file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: BTreeMap<usize, ColumnDefinition>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: usize, definition: ColumnDefinition) {
        self.columns.insert(column, definition);
    }

    pub fn get(&self, column: usize) -> Option<&ColumnDefinition> {
        self.columns.get(&column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in ascending position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnDefinition)> {
        self.columns.iter().map(|(column, def)| (*column, def))
    }

    /// Distinct channel ids in first-column order
    pub fn channel_ids(&self) -> Vec<&ChannelId> {
        let mut ids: Vec<&ChannelId> = Vec::new();
        for (_, def) in self.iter() {
            if !ids.contains(&&def.channel_id) {
                ids.push(&def.channel_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_kind_case_insensitive() {
        assert_eq!(SampleKind::from_cell("Min"), SampleKind::Min);
        assert_eq!(SampleKind::from_cell(" MAX "), SampleKind::Max);
        assert_eq!(SampleKind::from_cell("mIn"), SampleKind::Min);
        assert_eq!(SampleKind::from_cell("Avg"), SampleKind::Other("Avg".into()));
        assert_eq!(SampleKind::from_cell(""), SampleKind::Other(String::new()));
    }

    #[test]
    fn test_channel_ids_are_distinct_in_column_order() {
        let mut map = ColumnMap::new();
        for (column, id, kind) in [(3, 2u64, "Min"), (1, 1, "Min"), (2, 1, "Max"), (4, 2, "Max")] {
            map.insert(
                column,
                ColumnDefinition {
                    channel_id: ChannelId::Numeric(id),
                    kind: SampleKind::from_cell(kind),
                    unit: "V".into(),
                },
            );
        }
        assert_eq!(map.len(), 4);
        assert_eq!(
            map.channel_ids(),
            vec![&ChannelId::Numeric(1), &ChannelId::Numeric(2)]
        );
    }
}
