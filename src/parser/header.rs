use indexmap::IndexMap;
use tracing::debug;

/// Literal line that separates the header from the sampling data
pub const SAMPLING_DATA_SENTINEL: &str = "Sampling Data";

/// Metadata collected from the header section of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderSection {
    pub metadata: IndexMap<String, String>,
    /// Index of the `Sampling Data` line, or 0 when it was never found
    pub sampling_data_index: usize,
}

/// Scan lines up to the `Sampling Data` sentinel, collecting `key<TAB>value` pairs.
///
/// Only the first two tab-separated fields count; later duplicates of a key
/// overwrite earlier ones. A missing sentinel leaves `sampling_data_index` at 0,
/// which callers treat as a format error.
pub fn parse_header<S: AsRef<str>>(lines: &[S]) -> HeaderSection {
    let mut header = HeaderSection::default();

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if line == SAMPLING_DATA_SENTINEL {
            header.sampling_data_index = index;
            break;
        }

        if line.is_empty() {
            continue;
        }

        let mut parts = line.split('\t');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            debug!("Header {}: {} = {}", index, key.trim(), value.trim());
            header
                .metadata
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_collects_metadata() {
        let lines = [
            "Title\tBench test",
            "Range\t100\textra",
            "",
            "lonely",
            "Range\t200",
            "Sampling Data",
            "After\tignored",
        ];
        let header = parse_header(&lines);

        assert_eq!(header.sampling_data_index, 5);
        assert_eq!(header.metadata.len(), 2);
        assert_eq!(header.metadata["Title"], "Bench test");
        assert_eq!(header.metadata["Range"], "200");
        assert!(!header.metadata.contains_key("After"));
    }

    #[test]
    fn test_sentinel_matches_trimmed_line() {
        let lines = ["A\t1", "  Sampling Data \r"];
        assert_eq!(parse_header(&lines).sampling_data_index, 1);
    }

    #[test]
    fn test_missing_sentinel_returns_zero() {
        let lines = ["A\t1", "B\t2"];
        let header = parse_header(&lines);
        assert_eq!(header.sampling_data_index, 0);
        assert_eq!(header.metadata.len(), 2);
    }

    #[test]
    fn test_sentinel_on_first_line_is_indistinguishable_from_missing() {
        let lines = ["Sampling Data", "2023/08/28 10:16:30\t1"];
        assert_eq!(parse_header(&lines).sampling_data_index, 0);
    }
}
