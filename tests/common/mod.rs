//! Shell fixtures shared by the unit and end-to-end tests
//!
//! A worker is faked with `sh <script> <region id> stdout`: the script path is
//! passed as the data source, so `$1` inside the script is the region id.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `body` to `worker.sh` in `dir`
pub fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("worker.sh");
    fs::write(&path, body).unwrap();
    path
}

/// A shell `printf` statement writing `bytes` verbatim in one call
pub fn printf_bytes(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        write!(escaped, "\\{:03o}", byte).unwrap();
    }
    format!("printf '{}'", escaped)
}

/// A script that emits `records[i]` when invoked for region `i + 1`
pub fn case_script<B: AsRef<[u8]>>(records: &[B]) -> String {
    let mut script = String::from("case \"$1\" in\n");
    for (i, bytes) in records.iter().enumerate() {
        writeln!(script, "  {}) {} ;;", i + 1, printf_bytes(bytes.as_ref())).unwrap();
    }
    script.push_str("esac\n");
    script
}
