//! Process memory accounting for the report line

use std::fs;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Peak resident set size of this process in bytes.
///
/// Read from `VmHWM` in `/proc/self/status`. Returns 0 where that is unavailable, so the
/// value never exceeds the true peak.
pub fn peak_resident_bytes() -> u64 {
    fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| status_field_kb(&status, "VmHWM"))
        .map_or(0, |kb| kb.saturating_mul(1024))
}

/// Whole megabytes, rounded down
pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

fn status_field_kb(status: &str, field: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim() != field {
            return None;
        }
        value.split_whitespace().next()?.parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Name:\tmocklambda\nVmPeak:\t   20480 kB\nVmHWM:\t    4096 kB\nVmRSS:\t    3072 kB\n";

    #[test]
    fn test_status_field_parsing() {
        assert_eq!(status_field_kb(STATUS, "VmHWM"), Some(4096));
        assert_eq!(status_field_kb(STATUS, "VmRSS"), Some(3072));
        assert_eq!(status_field_kb(STATUS, "VmSwap"), None);
        assert_eq!(status_field_kb("VmHWM:\tlots kB", "VmHWM"), None);
    }

    #[test]
    fn test_bytes_to_mb_rounds_down() {
        assert_eq!(bytes_to_mb(0), 0);
        assert_eq!(bytes_to_mb(BYTES_PER_MB - 1), 0);
        assert_eq!(bytes_to_mb(BYTES_PER_MB), 1);
        assert_eq!(bytes_to_mb(5 * BYTES_PER_MB + 17), 5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_peak_resident_bytes_on_linux() {
        assert!(peak_resident_bytes() > 0);
    }
}
