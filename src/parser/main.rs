use crate::error::{FormatError, GtdError, Result};
use crate::parser::channels::parse_channel_definitions;
use crate::parser::header::parse_header;
use crate::parser::samples::parse_samples;
use crate::types::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of merging one file into a dataset
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub columns: ColumnMap,
    pub stats: SampleStats,
}

/// Parse the lines of one GTD file without touching any dataset
pub fn parse_gtd_lines<S: AsRef<str>>(lines: &[S]) -> Result<ParsedGtd> {
    let header = parse_header(lines);

    // Index 0 also means "not found"; a sentinel on the first line is rejected too.
    if header.sampling_data_index == 0 {
        return Err(FormatError::MissingSamplingData.into());
    }

    let columns = parse_channel_definitions(lines, header.sampling_data_index)?;
    let (samples, stats) = parse_samples(&lines[header.sampling_data_index + 1..], &columns);

    Ok(ParsedGtd {
        metadata: header.metadata,
        columns,
        samples,
        stats,
    })
}

/// Parse GTD text held in memory
pub fn parse_gtd_str(text: &str) -> Result<ParsedGtd> {
    let lines: Vec<&str> = text.lines().collect();
    parse_gtd_lines(&lines)
}

/// Read a GTD file and parse it without touching any dataset
pub fn parse_gtd_file(file_path: &Path) -> Result<ParsedGtd> {
    let bytes = std::fs::read(file_path).map_err(|source| GtdError::Read {
        path: file_path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {:?}", bytes.len(), file_path);

    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!(
            "{:?} is not valid UTF-8; undecodable bytes were replaced",
            file_path
        );
    }
    parse_gtd_str(&text)
}

/// Parse one file and merge it into `dataset`.
///
/// A rejected file leaves `dataset` exactly as it was.
pub fn process_gtd_file(file_path: &Path, dataset: &mut GtdDataset) -> Result<FileReport> {
    info!("Processing GTD file: {}", file_path.display());

    let parsed = parse_gtd_file(file_path)?;
    let columns = parsed.columns.clone();
    let stats = parsed.stats;
    dataset.merge(parsed);

    info!(
        "Added {} samples from {} ({} channels in dataset)",
        stats.pairs_committed,
        file_path.display(),
        dataset.channels.len()
    );

    Ok(FileReport {
        path: file_path.to_path_buf(),
        columns,
        stats,
    })
}

/// Process files in order, stopping at the first failure.
///
/// Files merged before the failing one stay in `dataset`.
pub fn process_multiple_files<P: AsRef<Path>>(
    file_paths: &[P],
    dataset: &mut GtdDataset,
) -> Result<Vec<FileReport>> {
    file_paths
        .iter()
        .map(|path| process_gtd_file(path.as_ref(), dataset))
        .collect()
}

/// Process files in order, recording each failure and moving on
pub fn process_files_keep_going<P: AsRef<Path>>(
    file_paths: &[P],
    dataset: &mut GtdDataset,
) -> Vec<(PathBuf, Result<FileReport>)> {
    file_paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let outcome = process_gtd_file(path, dataset);
            if let Err(ref e) = outcome {
                warn!("Skipping {}: {}", path.display(), e);
            }
            (path.to_path_buf(), outcome)
        })
        .collect()
}

/// True for paths ending in `.gtd`, any case
pub fn has_gtd_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gtd"))
        .unwrap_or(false)
}

/// List the `.gtd` files directly inside `dir`, sorted by path
pub fn find_gtd_files_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut gtd_files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_gtd_extension(&path) {
            gtd_files.push(path);
        }
    }

    gtd_files.sort();
    debug!("Found {} GTD files in {}", gtd_files.len(), dir.display());
    Ok(gtd_files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Model\tGL840\n\
        Range\t100\n\
        Ch\t\t1\t2\t1\t2\n\
        Unit\t\t°C\t°C\t°C\t°C\n\
        Kind\t\tMin\tMax\tMax\tMin\n\
        Sampling Data\n\
        2023/08/28 10:16:30\t\t21.5\t22.0\n\
        2023/08/28 10:16:30\t\t\t\t22.5\t21.0\n";

    #[test]
    fn test_parse_gtd_str() {
        let parsed = parse_gtd_str(SAMPLE).unwrap();
        assert_eq!(parsed.metadata["Model"], "GL840");
        assert_eq!(parsed.metadata["Range"], "100");
        assert_eq!(parsed.columns.len(), 4);
        assert_eq!(parsed.samples.len(), 2);
    }

    #[test]
    fn test_sentinel_on_first_line_is_rejected() {
        let err = parse_gtd_str("Sampling Data\n2023/08/28 10:16:30\t1\n").unwrap_err();
        assert!(matches!(
            err,
            GtdError::Format(FormatError::MissingSamplingData)
        ));
    }

    #[test]
    fn test_has_gtd_extension() {
        assert!(has_gtd_extension(Path::new("a/002171_230828_101630.GTD")));
        assert!(has_gtd_extension(Path::new("b.gtd")));
        assert!(!has_gtd_extension(Path::new("b.gtd.bak")));
        assert!(!has_gtd_extension(Path::new("gtd")));
    }
}
