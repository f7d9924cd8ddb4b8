//! Dataset discovery and schema resolution.
//!
//! This stage is responsible for turning "somewhere there should be a training
//! CSV" into a concrete, validated schema for the rest of the pipeline:
//!
//! - probe the candidate paths in priority order (first existing path wins)
//! - validate that the fixed feature columns and the target column exist
//! - report which target values actually occur, without ever letting them
//!   shrink the class-label enumeration
//!
//! The feature list and label set are configuration constants, not inferences:
//! see `domain::FEATURE_NAMES` and `domain::CLASS_LABELS`.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{CLASS_LABELS, GenConfig, PREDICTED_LABEL_NAME, ResolvedSchema, TARGET_COLUMN, feature_specs};
use crate::error::{AppError, ErrorKind};

/// Resolve the dataset and schema for a run.
///
/// Fails with `DatasetNotFound` before any graph construction when no
/// candidate path exists; no partial artifact is ever produced.
pub fn resolve_schema(config: &GenConfig) -> Result<ResolvedSchema, AppError> {
    let csv_path = probe_candidates(&config.csv_candidates)?;
    let scan = scan_dataset(&csv_path)?;

    Ok(ResolvedSchema {
        csv_path,
        features: feature_specs(),
        target_column: TARGET_COLUMN.to_string(),
        label_field: PREDICTED_LABEL_NAME.to_string(),
        // Always the full enumeration, regardless of what the scan observed.
        class_labels: CLASS_LABELS.to_vec(),
        rows_read: scan.rows_read,
        rows_skipped: scan.rows_skipped,
        observed_labels: scan.observed_labels,
    })
}

/// Return the first candidate path that exists.
fn probe_candidates(candidates: &[PathBuf]) -> Result<PathBuf, AppError> {
    for candidate in candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }

    let listed: Vec<String> = candidates
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect();
    Err(AppError::new(
        ErrorKind::DatasetNotFound,
        format!("Could not find dataset at any of: {}.", listed.join(", ")),
    ))
}

#[derive(Debug, Clone)]
struct DatasetScan {
    rows_read: usize,
    rows_skipped: usize,
    observed_labels: Vec<i64>,
}

/// Read the dataset once: validate columns, count rows, collect the distinct
/// target values.
///
/// Rows with a missing or non-integer target are skipped and counted rather
/// than treated as fatal; the model schema does not depend on row contents.
fn scan_dataset(path: &Path) -> Result<DatasetScan, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::DatasetNotFound,
            format!("Failed to open dataset '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(ErrorKind::Usage, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let target_idx = header_map[TARGET_COLUMN];

    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;
    let mut observed = BTreeSet::new();

    for result in reader.records() {
        rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                rows_skipped += 1;
                continue;
            }
        };
        match parse_target(&record, target_idx) {
            Some(label) => {
                observed.insert(label);
            }
            None => rows_skipped += 1,
        }
    }

    Ok(DatasetScan {
        rows_read,
        rows_skipped,
        observed_labels: observed.into_iter().collect(),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing column.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for feature in crate::domain::FEATURE_NAMES {
        if !header_map.contains_key(feature) {
            return Err(AppError::new(
                ErrorKind::Usage,
                format!("Dataset is missing required feature column: `{feature}`"),
            ));
        }
    }
    if !header_map.contains_key(TARGET_COLUMN) {
        return Err(AppError::new(
            ErrorKind::Usage,
            format!("Dataset is missing required target column: `{TARGET_COLUMN}`"),
        ));
    }
    Ok(())
}

fn parse_target(record: &StringRecord, target_idx: usize) -> Option<i64> {
    let raw = record.get(target_idx).map(str::trim).filter(|s| !s.is_empty())?;
    // Accept both `3` and `3.0` since spreadsheet exports often float-ify
    // integer columns.
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}
