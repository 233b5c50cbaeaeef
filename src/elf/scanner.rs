// Mon Oct 19 2026 - Alex

use crate::elf::types::{DynamicEntry, ElfClass, ElfHeader, ProgramHeader, RawSymbol};
use crate::memory::{Address, ProcMap, RemoteMemory};
use crate::symbol::SymbolTable;
use crate::utils::{page_end, page_start, system_page_size};
use goblin::elf::dynamic::{DT_STRSZ, DT_STRTAB, DT_SYMENT, DT_SYMTAB};
use goblin::elf::program_header::{PT_DYNAMIC, PT_LOAD};
use std::sync::Arc;

pub const DEFAULT_NAME_MAX_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfScanOptions {
    pub page_size: u64,
    pub name_max_len: usize,
    pub class: ElfClass,
}

impl ElfScanOptions {
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_name_max_len(mut self, len: usize) -> Self {
        self.name_max_len = len;
        self
    }

    pub fn with_class(mut self, class: ElfClass) -> Self {
        self.class = class;
        self
    }
}

impl Default for ElfScanOptions {
    fn default() -> Self {
        Self {
            page_size: system_page_size(),
            name_max_len: DEFAULT_NAME_MAX_LEN,
            class: ElfClass::native(),
        }
    }
}

/// Snapshot of a loaded ELF image, read once from remote memory.
///
/// Construction never fails outright: each step that cannot proceed logs and
/// leaves the remaining fields empty, so [`ElfScanner::is_valid`] must be
/// checked before trusting symbol lookups.
#[derive(Debug, Clone, Default)]
pub struct ElfScanner {
    base: Address,
    class: ElfClass,
    header: ElfHeader,
    program_headers: Vec<ProgramHeader>,
    loads: usize,
    load_bias: u64,
    load_size: u64,
    dynamics: Vec<DynamicEntry>,
    string_table: u64,
    symbol_table: u64,
    string_table_size: u64,
    symbol_entry_size: u64,
    symbols: SymbolTable,
}

impl ElfScanner {
    pub fn new(mem: Option<&dyn RemoteMemory>, base: Address, options: ElfScanOptions) -> Self {
        let mut elf = Self {
            base,
            class: options.class,
            ..Self::default()
        };

        let Some(mem) = mem else {
            log::debug!("ElfScanner: no memory backend");
            return elf;
        };
        if base.is_null() {
            log::debug!("ElfScanner: null base address");
            return elf;
        }

        elf.scan(mem, &options);
        elf
    }

    pub fn from_map(mem: Option<&dyn RemoteMemory>, map: &ProcMap, options: ElfScanOptions) -> Self {
        Self::new(mem, map.start, options)
    }

    fn scan(&mut self, mem: &dyn RemoteMemory, options: &ElfScanOptions) {
        let class = options.class;
        let base = self.base;

        let mut raw = vec![0u8; class.header_size()];
        if !mem.read_exact(base, &mut raw) {
            log::debug!("ElfScanner: failed to read ELF header at {}", base);
            return;
        }
        self.header = ElfHeader::parse(&raw, class);

        if !self.header.has_magic() {
            log::debug!("ElfScanner: bad ELF magic at {}", base);
            return;
        }
        if self.header.class() != Some(class) {
            log::debug!(
                "ElfScanner: ELF class {:?} at {} does not match expected {:?}",
                self.header.class(),
                base,
                class
            );
            return;
        }

        let h = self.header;
        if h.phnum == 0 || h.phentsize == 0 || h.shnum == 0 || h.shentsize == 0 {
            log::debug!(
                "ElfScanner: empty header tables at {} (phnum={}, phentsize={}, shnum={}, shentsize={})",
                base,
                h.phnum,
                h.phentsize,
                h.shnum,
                h.shentsize
            );
            return;
        }

        let entry_size = h.phentsize as usize;
        let table_size = h.phnum as usize * entry_size;
        let Some(table) = mem.read_bytes(base + h.phoff, table_size) else {
            log::debug!("ElfScanner: failed to read {} bytes of program headers at {}", table_size, base + h.phoff);
            return;
        };

        let mut min_vaddr = u64::MAX;
        let mut max_vaddr = 0u64;
        for entry in table.chunks_exact(entry_size) {
            let phdr = ProgramHeader::parse(entry, class);
            if phdr.p_type == PT_LOAD {
                self.loads += 1;
                min_vaddr = min_vaddr.min(phdr.vaddr);
                max_vaddr = max_vaddr.max(phdr.vaddr.wrapping_add(phdr.memsz));
            }
            self.program_headers.push(phdr);
        }

        if self.loads == 0 {
            log::debug!("ElfScanner: no PT_LOAD segments at {}", base);
            return;
        }
        if max_vaddr == 0 {
            log::debug!("ElfScanner: PT_LOAD segments at {} end at 0", base);
            return;
        }

        let min_vaddr = page_start(min_vaddr, options.page_size);
        let max_vaddr = page_end(max_vaddr, options.page_size);
        self.load_bias = base.as_u64().wrapping_sub(min_vaddr);
        self.load_size = max_vaddr.wrapping_sub(min_vaddr);

        self.read_dynamics(mem);

        if self.string_table == 0 || self.symbol_table == 0 || self.string_table_size == 0 || self.symbol_entry_size == 0 {
            log::debug!(
                "ElfScanner: incomplete dynamic info at {} (strtab={:#x}, symtab={:#x}, strsz={}, syment={})",
                base,
                self.string_table,
                self.symbol_table,
                self.string_table_size,
                self.symbol_entry_size
            );
            return;
        }

        self.string_table = self.fix_address(self.string_table);
        self.symbol_table = self.fix_address(self.symbol_table);

        self.read_symbols(mem, options.name_max_len);
    }

    fn read_dynamics(&mut self, mem: &dyn RemoteMemory) {
        let class = self.class;
        let dynamic_headers: Vec<ProgramHeader> = self
            .program_headers
            .iter()
            .filter(|p| p.p_type == PT_DYNAMIC)
            .copied()
            .collect();

        for phdr in dynamic_headers {
            let address = Address::new(self.load_bias.wrapping_add(phdr.vaddr));
            let Some(raw) = usize::try_from(phdr.memsz)
                .ok()
                .and_then(|len| mem.read_bytes(address, len))
            else {
                log::debug!("ElfScanner: failed to read PT_DYNAMIC at {} ({} bytes)", address, phdr.memsz);
                continue;
            };

            for entry in DynamicEntry::parse_table(&raw, class) {
                if entry.is(DT_STRTAB) {
                    self.string_table = entry.value;
                } else if entry.is(DT_SYMTAB) {
                    self.symbol_table = entry.value;
                } else if entry.is(DT_STRSZ) {
                    self.string_table_size = entry.value;
                } else if entry.is(DT_SYMENT) {
                    self.symbol_entry_size = entry.value;
                }
                self.dynamics.push(entry);
            }
        }
    }

    /// Walks `.dynsym` until a read fails or a name offset falls outside the
    /// string table; the table carries no entry count of its own.
    fn read_symbols(&mut self, mem: &dyn RemoteMemory, name_max_len: usize) {
        let stride = self.symbol_entry_size;
        let read_len = (stride as usize).min(self.class.symbol_size());
        let mut entry = vec![0u8; read_len];
        let mut cursor = self.symbol_table;

        loop {
            if !mem.read_exact(Address::new(cursor), &mut entry) {
                log::trace!("ElfScanner: symbol walk stopped at unreadable {:#x}", cursor);
                break;
            }
            let sym = RawSymbol::parse(&entry, self.class);
            if sym.name as u64 >= self.string_table_size {
                break;
            }

            if sym.name != 0 && sym.value != 0 {
                let address = Address::new(self.fix_address(sym.value));
                let name_address = Address::new(self.string_table.wrapping_add(sym.name as u64));
                let name = mem.read_cstring(name_address, name_max_len);
                if !name.is_empty() {
                    self.symbols.add(address, name);
                }
            }

            match cursor.checked_add(stride) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        log::debug!("ElfScanner: {} symbols at {}", self.symbols.len(), self.base);
    }

    /// Values below the load bias are link-time addresses and get rebased.
    fn fix_address(&self, value: u64) -> u64 {
        if value != 0 && value < self.load_bias {
            self.load_bias.wrapping_add(value)
        } else {
            value
        }
    }

    pub fn is_valid(&self) -> bool {
        self.loads > 0
            && !self.program_headers.is_empty()
            && self.load_bias != 0
            && self.load_size != 0
            && !self.dynamics.is_empty()
            && self.string_table != 0
            && self.symbol_table != 0
            && self.string_table_size != 0
            && self.symbol_entry_size != 0
    }

    /// First symbol with exactly this name.
    pub fn find_symbol(&self, name: &str) -> Option<Address> {
        self.symbols.find(name)
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn class(&self) -> ElfClass {
        self.class
    }

    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    pub fn program_headers(&self) -> &[ProgramHeader] {
        &self.program_headers
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn load_bias(&self) -> u64 {
        self.load_bias
    }

    pub fn load_size(&self) -> u64 {
        self.load_size
    }

    pub fn end(&self) -> Address {
        self.base + self.load_size
    }

    pub fn dynamics(&self) -> &[DynamicEntry] {
        &self.dynamics
    }

    pub fn string_table(&self) -> Address {
        Address::new(self.string_table)
    }

    pub fn symbol_table(&self) -> Address {
        Address::new(self.symbol_table)
    }

    pub fn string_table_size(&self) -> u64 {
        self.string_table_size
    }

    pub fn symbol_entry_size(&self) -> u64 {
        self.symbol_entry_size
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

/// Builds [`ElfScanner`]s against one memory backend with shared options.
#[derive(Clone, Default)]
pub struct ElfScannerFactory {
    mem: Option<Arc<dyn RemoteMemory>>,
    options: ElfScanOptions,
}

impl ElfScannerFactory {
    pub fn new(mem: Arc<dyn RemoteMemory>, options: ElfScanOptions) -> Self {
        Self {
            mem: Some(mem),
            options,
        }
    }

    pub fn unbound(options: ElfScanOptions) -> Self {
        Self { mem: None, options }
    }

    pub fn options(&self) -> &ElfScanOptions {
        &self.options
    }

    pub fn create_with_base(&self, base: Address) -> ElfScanner {
        ElfScanner::new(self.mem.as_deref(), base, self.options)
    }

    pub fn create_with_map(&self, map: &ProcMap) -> ElfScanner {
        ElfScanner::from_map(self.mem.as_deref(), map, self.options)
    }
}
