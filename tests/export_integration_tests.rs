//! Integration tests for export functionality
//!
//! Tests the export layer across different scenarios:
//! - CSV sheets (data, metadata, channel list) with directory creation
//! - Channels left out of the joined table when sample counts differ
//! - JSON export/import round trip
//! - Directory batch processing

use gtd_parser::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_gtd(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write GTD fixture");
    path
}

/// Channel 1 gets `full` samples, channel `T2` only the first `partial`
fn uneven_file(full: u32, partial: u32) -> String {
    let mut body = String::from(
        "Model\tGL840\n\
         Interval\t1s\n\
         Ch\t1\t1\tT2\tT2\n\
         Unit\tV\tV\tmA\tmA\n\
         Kind\tMin\tMax\tMin\tMax\n\
         Sampling Data\n",
    );
    for s in 0..full {
        if s < partial {
            body.push_str(&format!("2025/02/07 07:02:{s:02}\t{s}.5\t{s}.75\t1\t2\n"));
        } else {
            body.push_str(&format!("2025/02/07 07:02:{s:02}\t{s}.5\t{s}.75\n"));
        }
    }
    body
}

fn processed(dir: &Path, body: &str) -> GtdProcessor {
    let path = write_gtd(dir, "run.GTD", body);
    let mut processor = GtdProcessor::new();
    processor.process_file(&path).expect("Fixture should parse");
    processor
}

#[test]
fn test_export_tabular_creates_output_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let processor = processed(temp_dir.path(), &uneven_file(3, 3));
    let out_dir = temp_dir.path().join("nonexistent").join("output");

    let report = processor
        .export_tabular(&out_dir.join("combined.csv"))
        .expect("Export should succeed")
        .expect("Export should write sheets");

    assert!(out_dir.exists(), "Output directory should be created");
    assert_eq!(report.paths.data, out_dir.join("combined.csv"));
    assert!(report.paths.metadata.exists());
    assert!(report.paths.channels.exists());
    assert_eq!(report.rows, 3);

    let data = fs::read_to_string(&report.paths.data).expect("Failed to read data sheet");
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines[0], "Timestamp,Ch1_Min_V,Ch1_Max_V,ChT2_Min_mA,ChT2_Max_mA");
    assert_eq!(lines[1], "2025-02-07 07:02:00,0.5,0.75,1,2");
    assert_eq!(lines.len(), 4);

    // Every row has as many fields as the header
    let header_fields = lines[0].split(',').count();
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), header_fields, "Row: {line}");
    }
}

#[test]
fn test_export_tabular_omits_channels_with_other_counts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let processor = processed(temp_dir.path(), &uneven_file(5, 2));

    let report = processor
        .export_tabular(&temp_dir.path().join("uneven"))
        .expect("Export should succeed")
        .expect("Export should write sheets");

    assert_eq!(report.rows, 5);
    assert_eq!(report.included, vec![ChannelId::Numeric(1)]);
    assert_eq!(report.omitted, vec![ChannelId::from("T2")]);

    let data = fs::read_to_string(&report.paths.data).unwrap();
    assert_eq!(data.lines().next(), Some("Timestamp,Ch1_Min_V,Ch1_Max_V"));

    let channels = fs::read_to_string(&report.paths.channels).unwrap();
    let lines: Vec<&str> = channels.lines().collect();
    assert_eq!(lines, vec!["Channel ID,Unit,Samples", "1,V,5", "T2,mA,2"]);

    let metadata = fs::read_to_string(&report.paths.metadata).unwrap();
    assert!(metadata.starts_with("Key,Value\n"));
    assert!(metadata.contains("Model,GL840"));
    assert!(metadata.contains("Interval,1s"));
}

#[test]
fn test_export_tabular_without_samples_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let processor = processed(temp_dir.path(), &uneven_file(0, 0));
    let base = temp_dir.path().join("empty");

    let report = processor.export_tabular(&base).expect("Export should succeed");
    assert!(report.is_none());
    assert!(!temp_dir.path().join("empty.csv").exists());
}

#[test]
fn test_json_round_trip_restores_dataset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let processor = processed(temp_dir.path(), &uneven_file(4, 2));

    let json_path = processor
        .export_json(&temp_dir.path().join("dataset"))
        .expect("JSON export should succeed");
    assert_eq!(json_path, temp_dir.path().join("dataset.json"));

    let restored = GtdProcessor::import_json(&json_path).expect("JSON import should succeed");
    assert_eq!(restored.metadata(), processor.metadata());
    assert_eq!(restored.channels().len(), processor.channels().len());
    for (id, channel) in processor.channels() {
        let other = &restored.channels()[id];
        assert_eq!(other.channel_id(), channel.channel_id());
        assert_eq!(other.unit(), channel.unit());
        assert_eq!(other.timestamps(), channel.timestamps());
        assert_eq!(other.samples_min(), channel.samples_min());
        assert_eq!(other.samples_max(), channel.samples_max());
    }
}

#[test]
fn test_json_document_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let processor = processed(temp_dir.path(), &uneven_file(1, 1));

    let json_path = processor
        .export_json(&temp_dir.path().join("layout.json"))
        .expect("JSON export should succeed");
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();

    assert_eq!(value["metadata"]["Model"], "GL840");
    let numeric = &value["channels"]["1"];
    assert_eq!(numeric["channel_id"], 1);
    assert_eq!(numeric["unit"], "V");
    assert_eq!(numeric["timestamps"][0], "2025-02-07T07:02:00");
    assert_eq!(numeric["samples_min"][0], 0.5);
    assert_eq!(numeric["samples_max"][0], 0.75);
    assert_eq!(value["channels"]["T2"]["channel_id"], "T2");
}

#[test]
fn test_import_accepts_hand_written_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("manual.json");
    fs::write(
        &path,
        r#"{
            "metadata": {"Range": "100"},
            "channels": {
                "3": {
                    "channel_id": "3",
                    "unit": "°C",
                    "timestamps": ["2023-08-28T10:16:30", "2023-08-28 10:16:31.500000"],
                    "samples_min": [21.5, 21.6],
                    "samples_max": [22.0, 22.1]
                }
            }
        }"#,
    )
    .unwrap();

    let dataset = import_json(&path).expect("Import should succeed");
    let channel = &dataset.channels[&ChannelId::from("3")];
    assert_eq!(channel.sample_count(), 2);
    assert!(!dataset.channels.contains_key(&ChannelId::Numeric(3)));
    assert_eq!(
        channel.to_record().timestamps[1],
        "2023-08-28T10:16:31.500"
    );
}

#[test]
fn test_import_rejects_misaligned_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{"metadata": {}, "channels": {"1": {"channel_id": 1, "unit": "V",
            "timestamps": ["2023-08-28T10:16:30"], "samples_min": [1.0], "samples_max": []}}}"#,
    )
    .unwrap();

    assert!(matches!(
        import_json(&path),
        Err(GtdError::MismatchedRecord { .. })
    ));
}

#[test]
fn test_process_gtd_directory_exports_both_formats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input_dir = temp_dir.path().join("input");
    fs::create_dir(&input_dir).unwrap();
    write_gtd(&input_dir, "002.GTD", &uneven_file(2, 2));
    write_gtd(&input_dir, "001.gtd", &uneven_file(3, 3));
    write_gtd(&input_dir, "readme.txt", "not a gtd file");

    let options = ExportOptions {
        output_dir: Some(temp_dir.path().join("out").to_string_lossy().to_string()),
        base_name: "batch".to_string(),
        ..ExportOptions::default()
    };
    let (processor, report) =
        process_gtd_directory(&input_dir, &options).expect("Directory should process");

    assert_eq!(processor.channels()[&ChannelId::Numeric(1)].sample_count(), 5);
    let tabular = report.tabular.expect("Tabular export should run");
    assert_eq!(tabular.paths.data, temp_dir.path().join("out").join("batch.csv"));
    assert_eq!(
        report.json_path,
        Some(temp_dir.path().join("out").join("batch.json"))
    );
}

#[test]
fn test_process_gtd_directory_empty_is_ok() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (processor, report) = process_gtd_directory(temp_dir.path(), &ExportOptions::default())
        .expect("Empty directory is not an error");

    assert!(processor.channels().is_empty());
    assert!(report.tabular.is_none());
    assert!(report.json_path.is_none());
}
