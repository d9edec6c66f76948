use crate::error::{GtdError, Result};
use chrono::NaiveDateTime;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timestamp layout of the first column of every GTD data line
pub const GTD_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Text encoding used for timestamps in channel records.
/// `%.f` keeps sub-second precision when present and prints nothing otherwise.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Identifier of a measurement channel.
///
/// Cells that are made only of ASCII digits become `Numeric`; anything else
/// (signs, decimal points, tags) stays `Symbolic`. The two never compare equal,
/// so `Numeric(3)` and `Symbolic("3")` are separate channels. Ordering places
/// every `Numeric` id before every `Symbolic` one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum ChannelId {
    Numeric(u64),
    Symbolic(String),
}

impl ChannelId {
    /// Build an identifier from a `Ch` row cell
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = trimmed.parse::<u64>() {
                return ChannelId::Numeric(number);
            }
        }
        ChannelId::Symbolic(trimmed.to_string())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ChannelId::Numeric(_))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Numeric(number) => write!(f, "{number}"),
            ChannelId::Symbolic(text) => f.write_str(text),
        }
    }
}

impl From<u64> for ChannelId {
    fn from(number: u64) -> Self {
        ChannelId::Numeric(number)
    }
}

impl From<&str> for ChannelId {
    fn from(text: &str) -> Self {
        ChannelId::Symbolic(text.to_string())
    }
}

/// One measurement stream with index-aligned timestamp/min/max sequences
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    channel_id: ChannelId,
    unit: String,
    timestamps: Vec<NaiveDateTime>,
    samples_min: Vec<f64>,
    samples_max: Vec<f64>,
}

impl Channel {
    pub fn new(channel_id: ChannelId, unit: impl Into<String>) -> Self {
        Self {
            channel_id,
            unit: unit.into(),
            timestamps: Vec::new(),
            samples_min: Vec::new(),
            samples_max: Vec::new(),
        }
    }

    /// Append one complete sample
    pub fn add_sample(&mut self, timestamp: NaiveDateTime, min_value: f64, max_value: f64) {
        self.timestamps.push(timestamp);
        self.samples_min.push(min_value);
        self.samples_max.push(max_value);
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn samples_min(&self) -> &[f64] {
        &self.samples_min
    }

    pub fn samples_max(&self) -> &[f64] {
        &self.samples_max
    }

    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Column name of the minimum series in a joined table
    pub fn min_column_name(&self) -> String {
        format!("Ch{}_Min_{}", self.channel_id, self.unit)
    }

    /// Column name of the maximum series in a joined table
    pub fn max_column_name(&self) -> String {
        format!("Ch{}_Max_{}", self.channel_id, self.unit)
    }

    /// Borrow the channel as three named columns ready to be joined into a table
    pub fn to_tabular_columns(&self) -> ChannelColumns<'_> {
        ChannelColumns {
            min_name: self.min_column_name(),
            max_name: self.max_column_name(),
            timestamps: &self.timestamps,
            samples_min: &self.samples_min,
            samples_max: &self.samples_max,
        }
    }

    pub fn to_record(&self) -> ChannelRecord {
        ChannelRecord {
            channel_id: self.channel_id.clone(),
            unit: self.unit.clone(),
            timestamps: self
                .timestamps
                .iter()
                .map(|ts| ts.format(RECORD_TIMESTAMP_FORMAT).to_string())
                .collect(),
            samples_min: self.samples_min.clone(),
            samples_max: self.samples_max.clone(),
        }
    }

    /// Rebuild a channel from a record, rejecting misaligned sequences
    pub fn from_record(record: ChannelRecord) -> Result<Self> {
        let ChannelRecord {
            channel_id,
            unit,
            timestamps,
            samples_min,
            samples_max,
        } = record;

        if timestamps.len() != samples_min.len() || timestamps.len() != samples_max.len() {
            return Err(GtdError::MismatchedRecord {
                channel: channel_id.to_string(),
                timestamps: timestamps.len(),
                min: samples_min.len(),
                max: samples_max.len(),
            });
        }

        let timestamps = timestamps
            .iter()
            .map(|text| {
                parse_record_timestamp(text).ok_or_else(|| GtdError::InvalidTimestamp {
                    channel: channel_id.to_string(),
                    value: text.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            channel_id,
            unit,
            timestamps,
            samples_min,
            samples_max,
        })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Channel {} ({}): {} samples",
            self.channel_id,
            self.unit,
            self.sample_count()
        )
    }
}

/// A channel laid out as `Timestamp`, `Ch<id>_Min_<unit>`, `Ch<id>_Max_<unit>`
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelColumns<'a> {
    pub min_name: String,
    pub max_name: String,
    pub timestamps: &'a [NaiveDateTime],
    pub samples_min: &'a [f64],
    pub samples_max: &'a [f64],
}

/// Plain structured form of a [`Channel`] with text-encoded timestamps
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelRecord {
    pub channel_id: ChannelId,
    pub unit: String,
    pub timestamps: Vec<String>,
    pub samples_min: Vec<f64>,
    pub samples_max: Vec<f64>,
}

/// Parse the record encoding; a space separator is accepted as well as `T`
pub fn parse_record_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, RECORD_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Parse the timestamp column of a GTD data line
pub fn parse_gtd_timestamp(text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), GTD_TIMESTAMP_FORMAT)
}
