//! Append-only CSV statistics sinks

use camino::Utf8Path;
use std::fs::OpenOptions;
use std::io::Write;

use apiprobe_utils::error::SinkError;

use crate::test_case::{TestCase, escape_csv};

/// Header of the nominal/faulty CSV
pub const NOMINAL_FAULTY_HEADER: &str = "testClassName,nominal,faulty";

/// Append one record per test case, writing the header on first use
///
/// # Errors
/// Returns `SinkError::Write` if the file cannot be created or appended.
pub fn append_test_cases(path: &Utf8Path, cases: &[TestCase]) -> Result<usize, SinkError> {
    let mut out = String::new();
    for case in cases {
        out.push_str(&case.to_csv_record());
        out.push('\n');
    }
    append(path, TestCase::csv_header(), &out)?;
    Ok(cases.len())
}

/// Append the nominal/faulty counts of one run
///
/// # Errors
/// Returns `SinkError::Write` if the file cannot be created or appended.
pub fn append_nominal_faulty(
    path: &Utf8Path,
    test_class_name: &str,
    nominal: usize,
    faulty: usize,
) -> Result<(), SinkError> {
    let row = format!("{},{nominal},{faulty}\n", escape_csv(test_class_name));
    append(path, NOMINAL_FAULTY_HEADER, &row)
}

fn append(path: &Utf8Path, header: &str, rows: &str) -> Result<(), SinkError> {
    let sink_err = |e: std::io::Error| SinkError::Write {
        path: path.to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(sink_err)?;
    }

    let write_header = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(sink_err)?;

    let mut out = String::with_capacity(header.len() + rows.len() + 1);
    if write_header {
        out.push_str(header);
        out.push('\n');
    }
    out.push_str(rows);
    file.write_all(out.as_bytes()).map_err(sink_err)
}
