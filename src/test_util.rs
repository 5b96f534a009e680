//! Helpers for tests that run real worker processes

use crate::protocol::{encode, RegionRecord};
use crate::shell_fixtures::write_script;
use crate::worker::WorkerCommand;
use tempfile::TempDir;

pub use crate::shell_fixtures::printf_bytes;

/// Write `body` to a script in `dir` and return a command that runs it per region
pub fn sh_worker(dir: &TempDir, body: &str) -> WorkerCommand {
    WorkerCommand::new("sh", write_script(dir, body))
}

/// A shell `printf` statement that writes `record` in one call
pub fn printf_record(record: &RegionRecord) -> String {
    printf_bytes(&encode(record))
}

/// A script that emits `records[i]` when invoked for region `i + 1`
pub fn case_script(records: &[RegionRecord]) -> String {
    let encoded: Vec<_> = records.iter().map(encode).collect();
    crate::shell_fixtures::case_script(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printf_bytes_uses_octal_escapes() {
        assert_eq!(printf_bytes(&[0, 7, 255]), "printf '\\000\\007\\377'");
    }

    #[test]
    fn test_case_script_numbers_regions_from_one() {
        let record = RegionRecord { region_id: 1, median: 0, average: 0.0, max: 0, min: 0 };
        let script = case_script(&[record, record]);

        assert!(script.starts_with("case \"$1\" in\n  1) printf '"));
        assert!(script.contains("\n  2) printf '"));
        assert!(script.ends_with("esac\n"));
    }
}
