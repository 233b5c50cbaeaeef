// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError, Protection};
use std::fmt;
use std::fs;

/// One line of `/proc/<pid>/maps`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcMap {
    pub pid: i32,
    pub start: Address,
    pub end: Address,
    pub length: u64,
    pub protection: Protection,
    pub offset: u64,
    pub dev: String,
    pub inode: u64,
    pub pathname: String,
}

impl ProcMap {
    /// `start-end perms offset dev inode [pathname]`
    pub fn parse_line(pid: i32, line: &str) -> Option<Self> {
        let (range, rest) = next_field(line)?;
        let (perms, rest) = next_field(rest)?;
        let (offset, rest) = next_field(rest)?;
        let (dev, rest) = next_field(rest)?;
        let (inode, rest) = next_field(rest)?;
        // The pathname may contain spaces, so it is the rest of the line.
        let pathname = rest.trim().to_string();

        let (start, end) = range.split_once('-')?;
        let start = u64::from_str_radix(start, 16).ok()?;
        let end = u64::from_str_radix(end, 16).ok()?;
        if end < start {
            return None;
        }

        Some(Self {
            pid,
            start: Address::new(start),
            end: Address::new(end),
            length: end - start,
            protection: Protection::from_perms(perms)?,
            offset: u64::from_str_radix(offset, 16).ok()?,
            dev: dev.to_string(),
            inode: inode.parse().ok()?,
            pathname,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.pid != 0 && !self.start.is_null() && !self.end.is_null() && self.length != 0
    }

    /// Anonymous mapping with no backing path.
    pub fn is_unknown(&self) -> bool {
        self.pathname.is_empty()
    }

    pub fn readable(&self) -> bool {
        self.protection.can_read()
    }

    pub fn writable(&self) -> bool {
        self.protection.can_write()
    }

    pub fn executable(&self) -> bool {
        self.protection.can_execute()
    }

    pub fn is_private(&self) -> bool {
        self.protection.contains(Protection::PRIVATE)
    }

    pub fn is_shared(&self) -> bool {
        self.protection.contains(Protection::SHARED)
    }

    pub fn is_ro(&self) -> bool {
        self.readable() && !self.writable() && !self.executable()
    }

    pub fn is_rw(&self) -> bool {
        self.readable() && self.writable() && !self.executable()
    }

    pub fn is_rx(&self) -> bool {
        self.readable() && !self.writable() && self.executable()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }
}

impl fmt::Display for ProcMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}-{:x} {} {:08x} {} {} {}",
            self.start, self.end, self.protection, self.offset, self.dev, self.inode, self.pathname
        )
    }
}

fn next_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], &text[end..]))
}

pub fn all_maps(pid: i32) -> Result<Vec<ProcMap>, MemoryError> {
    let contents = fs::read_to_string(format!("/proc/{}/maps", pid))?;
    let mut maps = Vec::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        match ProcMap::parse_line(pid, line) {
            Some(map) => maps.push(map),
            None => return Err(MemoryError::MapsParse(line.to_string())),
        }
    }
    Ok(maps)
}

pub fn maps_equal(pid: i32, name: &str) -> Result<Vec<ProcMap>, MemoryError> {
    filter_maps(pid, |path| path == name)
}

pub fn maps_contain(pid: i32, name: &str) -> Result<Vec<ProcMap>, MemoryError> {
    filter_maps(pid, |path| path.contains(name))
}

pub fn maps_end_with(pid: i32, name: &str) -> Result<Vec<ProcMap>, MemoryError> {
    filter_maps(pid, |path| path.ends_with(name))
}

pub fn address_map(pid: i32, address: Address) -> Result<Option<ProcMap>, MemoryError> {
    Ok(all_maps(pid)?.into_iter().find(|m| m.contains(address)))
}

fn filter_maps<F>(pid: i32, predicate: F) -> Result<Vec<ProcMap>, MemoryError>
where
    F: Fn(&str) -> bool,
{
    if pid == 0 {
        return Ok(Vec::new());
    }
    Ok(all_maps(pid)?
        .into_iter()
        .filter(|m| !m.pathname.is_empty() && predicate(&m.pathname))
        .collect())
}

/// First NUL-separated field of `/proc/<pid>/cmdline`.
pub fn process_name(pid: i32) -> Result<String, MemoryError> {
    let cmdline = fs::read(format!("/proc/{}/cmdline", pid))?;
    let end = cmdline.iter().position(|&b| b == 0).unwrap_or(cmdline.len());
    Ok(String::from_utf8_lossy(&cmdline[..end]).into_owned())
}

pub fn find_pid(name: &str) -> Result<Option<i32>, MemoryError> {
    if name.is_empty() {
        return Ok(None);
    }

    for entry in fs::read_dir("/proc")? {
        let entry = entry?;
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
            continue;
        };
        // Processes may exit while we walk /proc.
        if let Ok(cmd) = process_name(pid) {
            if cmd == name {
                return Ok(Some(pid));
            }
        }
    }
    Ok(None)
}

/// Integer field from `/proc/<pid>/status`, e.g. `TracerPid`.
pub fn status_integer(pid: i32, key: &str) -> Result<Option<i64>, MemoryError> {
    let status = fs::read_to_string(format!("/proc/{}/status", pid))?;
    Ok(parse_status_integer(&status, key))
}

fn parse_status_integer(status: &str, key: &str) -> Option<i64> {
    status.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        value.split_ascii_whitespace().next()?.parse().ok()
    })
}
