//! CLI binary for GTD Parser
//!
//! Merges one or more GTD files into a single dataset and writes the joined
//! CSV sheets and the JSON document.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use glob::glob;
use gtd_parser::{
    export_dataset, find_gtd_files_in_dir, has_gtd_extension, ExportOptions, GtdProcessor,
    DEFAULT_BASE_NAME,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn build_command() -> Command {
    Command::new("GTD Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read GTD data-logger files and export paired min/max channel data to CSV and JSON.")
        .arg(
            Arg::new("files")
                .help("GTD files or directories to process (.GTD, case-insensitive, supports globbing)")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: directory of the first input)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .help("Base name for output files")
                .value_name("BASE")
                .default_value(DEFAULT_BASE_NAME),
        )
        .arg(
            Arg::new("no-csv")
                .long("no-csv")
                .help("Skip the CSV export (data, metadata and channel sheets)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-json")
                .long("no-json")
                .help("Skip the JSON export")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("import")
                .long("import")
                .help("Start from a dataset previously exported as JSON")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Report files that fail to parse and continue with the rest")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed parsing information")
                .action(ArgAction::SetTrue),
        )
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Expand patterns and directories into GTD file paths, in argument order
fn collect_input_files(patterns: &[&String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths: Vec<PathBuf> = if pattern.contains('*') || pattern.contains('?') {
            match glob(pattern) {
                Ok(glob_iter) => match glob_iter.collect::<Result<Vec<_>, _>>() {
                    Ok(paths) => {
                        debug!("Glob pattern '{pattern}' matched {} paths", paths.len());
                        paths
                    }
                    Err(e) => {
                        warn!("Error expanding glob pattern '{pattern}': {e}");
                        continue;
                    }
                },
                Err(e) => {
                    warn!("Invalid glob pattern '{pattern}': {e}");
                    continue;
                }
            }
        } else {
            vec![PathBuf::from(pattern)]
        };

        for path in paths {
            if path.is_dir() {
                match find_gtd_files_in_dir(&path) {
                    Ok(found) => files.extend(found),
                    Err(e) => warn!("Cannot read directory {}: {e}", path.display()),
                }
            } else if !path.exists() {
                warn!("File does not exist: {}", path.display());
            } else if !has_gtd_extension(&path) {
                warn!("Skipping file without .GTD extension: {}", path.display());
            } else {
                files.push(path);
            }
        }
    }

    files
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    init_tracing(matches.get_flag("debug"));
    debug!(
        "gtd_parser {} (git {} {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        option_env!("VERGEN_GIT_COMMIT_DATE").unwrap_or("unknown")
    );

    let file_patterns: Vec<&String> = matches
        .get_many::<String>("files")
        .map(|values| values.collect())
        .unwrap_or_default();
    let keep_going = matches.get_flag("keep-going");

    let export_options = ExportOptions {
        csv: !matches.get_flag("no-csv"),
        json: !matches.get_flag("no-json"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
        base_name: matches
            .get_one::<String>("name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string()),
    };

    let input_files = collect_input_files(&file_patterns);
    if input_files.is_empty() {
        eprintln!("Error: No GTD files found to process.");
        eprintln!("Input patterns were: {file_patterns:?}");
        std::process::exit(1);
    }

    let mut processor = match matches.get_one::<String>("import") {
        Some(import_path) => GtdProcessor::import_json(Path::new(import_path))
            .with_context(|| format!("Failed to import dataset from {import_path}"))?,
        None => GtdProcessor::new(),
    };

    let mut processed_files = 0;
    for path in &input_files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        println!("Processing: {filename}");

        match processor.process_file(path) {
            Ok(stats) => {
                println!(
                    "  {} samples added ({} incomplete pairs, {} bad timestamps)",
                    stats.pairs_committed, stats.pairs_incomplete, stats.timestamp_errors
                );
                processed_files += 1;
            }
            Err(e) if keep_going => {
                eprintln!("Error processing {filename}: {e}");
                eprintln!("Continuing with next file...");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to process {}", path.display()));
            }
        }
    }

    if processed_files == 0 {
        eprintln!(
            "Error: No files were successfully processed out of {} files found.",
            input_files.len()
        );
        eprintln!("Use --debug flag for more detailed error information.");
        std::process::exit(1);
    }

    println!();
    for channel in processor.dataset().sorted_channels() {
        println!("{channel}");
    }

    let fallback_dir = input_files[0]
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let report = export_dataset(processor.dataset(), &export_options, &fallback_dir)
        .context("Failed to export dataset")?;

    if let Some(tabular) = &report.tabular {
        println!("Exported table to: {}", tabular.paths.data.display());
        println!("Exported metadata to: {}", tabular.paths.metadata.display());
        println!("Exported channel list to: {}", tabular.paths.channels.display());
        if !tabular.omitted.is_empty() {
            let omitted: Vec<String> = tabular.omitted.iter().map(|id| id.to_string()).collect();
            println!(
                "Channels left out of the table (sample count differs): {}",
                omitted.join(", ")
            );
        }
    }
    if let Some(json_path) = &report.json_path {
        println!("Exported JSON to: {}", json_path.display());
    }

    Ok(())
}
