//! Process resource usage read from procfs.
//!
//! Collection is best-effort: on hosts without `/proc`, or when a file
//! cannot be parsed, the affected values are `None` and their gauges are
//! left out of the metrics payload.

use std::fs;

/// Clock ticks per second as exposed to user space (`USER_HZ`).
const USER_HZ: f64 = 100.0;

/// One snapshot of this process's resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessStats {
    pub cpu_user_seconds: f64,
    pub cpu_system_seconds: f64,
    pub virtual_memory_bytes: u64,
    pub resident_memory_bytes: Option<u64>,
    pub open_fds: Option<u64>,
    pub max_fds: Option<u64>,
}

impl ProcessStats {
    /// Read the current process's stats. `None` when `/proc/self/stat` is
    /// unavailable, as on non-Linux hosts.
    pub fn collect() -> Option<Self> {
        let stat = fs::read_to_string("/proc/self/stat").ok()?;
        let (cpu_user_seconds, cpu_system_seconds, virtual_memory_bytes) = parse_stat(&stat)?;

        let resident_memory_bytes = fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| parse_vm_rss(&s));
        let max_fds = fs::read_to_string("/proc/self/limits")
            .ok()
            .and_then(|s| parse_max_fds(&s));
        let open_fds = fs::read_dir("/proc/self/fd")
            .ok()
            .map(|entries| entries.count() as u64);

        Some(Self {
            cpu_user_seconds,
            cpu_system_seconds,
            virtual_memory_bytes,
            resident_memory_bytes,
            open_fds,
            max_fds,
        })
    }

    pub fn cpu_seconds(&self) -> f64 {
        self.cpu_user_seconds + self.cpu_system_seconds
    }
}

/// `(utime, stime, vsize)` from `/proc/<pid>/stat`, times in seconds.
///
/// The command name is parenthesised and may itself contain spaces or
/// parentheses, so fields are counted from the last `)`.
fn parse_stat(stat: &str) -> Option<(f64, f64, u64)> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // fields[0] is field 3 (state) of proc(5).
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    let vsize: u64 = fields.get(20)?.parse().ok()?;
    Some((utime as f64 / USER_HZ, stime as f64 / USER_HZ, vsize))
}

/// Resident set size in bytes from the `VmRSS:` line of `/proc/<pid>/status`.
fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

/// Soft open-file limit from `/proc/<pid>/limits`. `None` when unlimited.
fn parse_max_fds(limits: &str) -> Option<u64> {
    let line = limits.lines().find(|l| l.starts_with("Max open files"))?;
    line.trim_start_matches("Max open files")
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}
