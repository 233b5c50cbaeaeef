// Mon Oct 19 2026 - Alex

use crate::config::Config;
use crate::elf::{ElfScanner, ElfScannerFactory};
use crate::memory::{maps, open_remote, Address, MemoryError, ProcMap, RemoteMemory};
use crate::pattern::PatternScanner;
use crate::utils;
use goblin::elf::header::{ELFMAG, SELFMAG};
use std::fs::{self, File};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::Arc;

/// A mapping paired with the ELF image found at its start.
#[derive(Debug, Clone)]
pub struct ElfBaseMap {
    pub map: ProcMap,
    pub elf: ElfScanner,
}

impl ElfBaseMap {
    pub fn is_valid(&self) -> bool {
        self.map.is_valid() && self.elf.is_valid()
    }
}

/// Session over one target process: a memory backend plus the scanners built on it.
pub struct MemoryManager {
    pid: i32,
    process_name: String,
    mem: Arc<dyn RemoteMemory>,
    config: Config,
}

impl MemoryManager {
    pub fn initialize(pid: i32, config: &Config) -> Result<Self, MemoryError> {
        let mem = open_remote(pid, config.mem_op)?;
        let process_name = maps::process_name(pid).unwrap_or_else(|e| {
            log::warn!("could not read name of pid {}: {}", pid, e);
            String::new()
        });
        log::info!("attached to pid {} ({})", pid, process_name);
        Ok(Self::with_memory(pid, mem, config).with_process_name(process_name))
    }

    pub fn with_memory(pid: i32, mem: Arc<dyn RemoteMemory>, config: &Config) -> Self {
        Self {
            pid,
            process_name: String::new(),
            mem,
            config: config.clone(),
        }
    }

    fn with_process_name(mut self, name: String) -> Self {
        self.process_name = name;
        self
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn memory(&self) -> Arc<dyn RemoteMemory> {
        Arc::clone(&self.mem)
    }

    pub fn read_mem(&self, address: Address, buffer: &mut [u8]) -> usize {
        self.mem.read(address, buffer)
    }

    pub fn write_mem(&self, address: Address, data: &[u8]) -> usize {
        self.mem.write(address, data)
    }

    pub fn read_mem_str(&self, address: Address, max_len: usize) -> String {
        self.mem.read_cstring(address, max_len)
    }

    /// Writes `text` followed by a NUL terminator.
    pub fn write_mem_str(&self, address: Address, text: &str) -> bool {
        let mut data = Vec::with_capacity(text.len() + 1);
        data.extend_from_slice(text.as_bytes());
        data.push(0);
        self.mem.write_all(address, &data)
    }

    pub fn scanner(&self) -> PatternScanner {
        PatternScanner::new(self.memory())
    }

    pub fn elf_scanner(&self) -> ElfScannerFactory {
        ElfScannerFactory::new(self.memory(), self.config.elf_options())
    }

    pub fn maps(&self) -> Result<Vec<ProcMap>, MemoryError> {
        maps::all_maps(self.pid)
    }

    pub fn is_valid_elf(&self, base: Address) -> bool {
        let mut magic = [0u8; SELFMAG];
        self.mem.read_exact(base, &mut magic) && magic[..] == ELFMAG[..]
    }

    /// First mapping whose path ends with `name` and that starts with an ELF header.
    pub fn elf_base_map(&self, name: &str) -> Result<Option<ElfBaseMap>, MemoryError> {
        let maps = maps::maps_end_with(self.pid, name)?;
        Ok(self.elf_base_map_in(&maps, name))
    }

    pub fn elf_base_map_in(&self, maps: &[ProcMap], name: &str) -> Option<ElfBaseMap> {
        if name.is_empty() {
            return None;
        }

        let map = maps
            .iter()
            .filter(|m| !m.is_unknown() && m.pathname.ends_with(name))
            .find(|m| self.is_valid_elf(m.start))?;

        log::debug!("ELF base map for {}: {}", name, map);
        Some(ElfBaseMap {
            map: map.clone(),
            elf: self.elf_scanner().create_with_map(map),
        })
    }

    /// Copies `[start, end)` to `path` after one bulk read.
    pub fn dump_mem_range<P: AsRef<Path>>(&self, start: Address, end: Address, path: P) -> Result<(), MemoryError> {
        if start >= end {
            return Err(MemoryError::InvalidRange(start, end));
        }

        let buffer = self.read_region(start, end.as_u64() - start.as_u64())?;
        fs::write(path.as_ref(), &buffer)?;
        log::info!("dumped {} bytes [{}, {}) to {}", buffer.len(), start, end, path.as_ref().display());
        Ok(())
    }

    fn read_region(&self, start: Address, len: u64) -> Result<Vec<u8>, MemoryError> {
        let invalid = || MemoryError::InvalidRange(start, start + len);
        let size = usize::try_from(len).map_err(|_| invalid())?;
        let mut buffer = utils::try_zeroed(size).ok_or_else(invalid)?;
        let read = self.mem.read(start, &mut buffer);
        if read != size {
            return Err(MemoryError::ReadFailed {
                address: start,
                expected: size,
                actual: read,
            });
        }
        Ok(buffer)
    }

    /// Dumps the loaded span of the ELF image at `base`.
    pub fn dump_mem_elf<P: AsRef<Path>>(&self, base: Address, path: P) -> Result<(), MemoryError> {
        let elf = self.elf_scanner().create_with_base(base);
        if elf.loads() == 0 || elf.load_size() == 0 {
            return Err(MemoryError::InvalidElf(base));
        }
        self.dump_mem_range(base, elf.end(), path)
    }

    /// Rebuilds the file mapped under `name` from its readable mappings.
    pub fn dump_mem_file<P: AsRef<Path>>(&self, name: &str, path: P) -> Result<(), MemoryError> {
        let maps = maps::maps_end_with(self.pid, name)?;
        self.dump_mem_file_in(&maps, name, path)
    }

    /// Each mapping of the first matching file (same device and inode) is
    /// written at its file offset; unreadable mappings leave holes.
    pub fn dump_mem_file_in<P: AsRef<Path>>(&self, maps: &[ProcMap], name: &str, path: P) -> Result<(), MemoryError> {
        let mut file_maps = maps
            .iter()
            .filter(|m| !name.is_empty() && !m.is_unknown() && m.pathname.ends_with(name));
        let Some(first) = file_maps.next() else {
            return Err(MemoryError::MapNotFound(name.to_string()));
        };

        let file = File::create(path.as_ref())?;
        let mut written = 0usize;
        for map in std::iter::once(first).chain(file_maps) {
            if map.inode != first.inode || map.dev != first.dev {
                continue;
            }
            if !map.readable() {
                log::debug!("skipping unreadable mapping {}", map);
                continue;
            }
            let data = self.read_region(map.start, map.length)?;
            file.write_all_at(&data, map.offset)?;
            written += data.len();
        }

        log::info!("dumped {} bytes of {} to {}", written, first.pathname, path.as_ref().display());
        Ok(())
    }

    /// Resolves the target's address of a symbol defined in a library that
    /// this process also has loaded at `local_address`.
    pub fn find_remote_of(&self, symbol_name: &str, local_address: Address) -> Result<Option<Address>, MemoryError> {
        let local_maps = maps::all_maps(std::process::id() as i32)?;
        let remote_maps = self.maps()?;
        Ok(self.find_remote_of_in(&local_maps, &remote_maps, symbol_name, local_address))
    }

    pub fn find_remote_of_in(
        &self,
        local_maps: &[ProcMap],
        remote_maps: &[ProcMap],
        symbol_name: &str,
        local_address: Address,
    ) -> Option<Address> {
        if symbol_name.is_empty() || local_address.is_null() {
            return None;
        }

        let local_map = local_maps
            .iter()
            .find(|m| !m.is_unknown() && m.contains(local_address))?;
        let remote = self.elf_base_map_in(remote_maps, &local_map.pathname)?;
        if !remote.is_valid() {
            log::debug!("remote ELF for {} is not resolvable", local_map.pathname);
            return None;
        }
        remote.elf.find_symbol(symbol_name)
    }
}
