// Mon Oct 19 2026 - Alex

use goblin::elf::dynamic::DT_NULL;
use goblin::elf::header::{EI_CLASS, ELFCLASS32, ELFCLASS64, ELFMAG, SELFMAG};
use serde::Serialize;

pub const EI_NIDENT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    /// Class matching this process's pointer width.
    pub const fn native() -> Self {
        #[cfg(target_pointer_width = "64")]
        {
            ElfClass::Elf64
        }
        #[cfg(not(target_pointer_width = "64"))]
        {
            ElfClass::Elf32
        }
    }

    pub fn from_ident(class: u8) -> Option<Self> {
        match class {
            ELFCLASS32 => Some(ElfClass::Elf32),
            ELFCLASS64 => Some(ElfClass::Elf64),
            _ => None,
        }
    }

    pub const fn header_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 52,
            ElfClass::Elf64 => 64,
        }
    }

    pub const fn program_header_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 56,
        }
    }

    pub const fn dynamic_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 8,
            ElfClass::Elf64 => 16,
        }
    }

    pub const fn symbol_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 16,
            ElfClass::Elf64 => 24,
        }
    }
}

impl Default for ElfClass {
    fn default() -> Self {
        Self::native()
    }
}

fn u16_at(buf: &[u8], off: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&buf[off..off + 2]);
    u16::from_ne_bytes(raw)
}

fn u32_at(buf: &[u8], off: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[off..off + 4]);
    u32::from_ne_bytes(raw)
}

fn u64_at(buf: &[u8], off: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[off..off + 8]);
    u64::from_ne_bytes(raw)
}

/// Word-sized field: 4 bytes for ELF32, 8 for ELF64.
fn word_at(buf: &[u8], off: usize, class: ElfClass) -> u64 {
    match class {
        ElfClass::Elf32 => u32_at(buf, off) as u64,
        ElfClass::Elf64 => u64_at(buf, off),
    }
}

/// Copies at most `N` bytes of `entry`, zero-filling the rest.
fn known_prefix<const N: usize>(entry: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = entry.len().min(N);
    out[..n].copy_from_slice(&entry[..n]);
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElfHeader {
    pub ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub machine: u16,
    pub version: u32,
    pub entry: u64,
    pub phoff: u64,
    pub shoff: u64,
    pub flags: u32,
    pub ehsize: u16,
    pub phentsize: u16,
    pub phnum: u16,
    pub shentsize: u16,
    pub shnum: u16,
    pub shstrndx: u16,
}

impl ElfHeader {
    /// Decodes a header laid out for `class`. Missing trailing bytes read as zero.
    pub fn parse(raw: &[u8], class: ElfClass) -> Self {
        let buf: [u8; 64] = known_prefix(raw);
        let mut ident = [0u8; EI_NIDENT];
        ident.copy_from_slice(&buf[..EI_NIDENT]);

        let (entry, phoff, shoff, rest) = match class {
            ElfClass::Elf32 => (
                u32_at(&buf, 24) as u64,
                u32_at(&buf, 28) as u64,
                u32_at(&buf, 32) as u64,
                36,
            ),
            ElfClass::Elf64 => (u64_at(&buf, 24), u64_at(&buf, 32), u64_at(&buf, 40), 48),
        };

        Self {
            ident,
            e_type: u16_at(&buf, 16),
            machine: u16_at(&buf, 18),
            version: u32_at(&buf, 20),
            entry,
            phoff,
            shoff,
            flags: u32_at(&buf, rest),
            ehsize: u16_at(&buf, rest + 4),
            phentsize: u16_at(&buf, rest + 6),
            phnum: u16_at(&buf, rest + 8),
            shentsize: u16_at(&buf, rest + 10),
            shnum: u16_at(&buf, rest + 12),
            shstrndx: u16_at(&buf, rest + 14),
        }
    }

    pub fn has_magic(&self) -> bool {
        self.ident[..SELFMAG] == ELFMAG[..]
    }

    pub fn class(&self) -> Option<ElfClass> {
        ElfClass::from_ident(self.ident[EI_CLASS])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub flags: u32,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
}

impl ProgramHeader {
    /// Decodes the known prefix of one table entry; the entry may be larger
    /// or smaller than the layout for `class`.
    pub fn parse(entry: &[u8], class: ElfClass) -> Self {
        let buf: [u8; 56] = known_prefix(entry);
        match class {
            ElfClass::Elf32 => Self {
                p_type: u32_at(&buf, 0),
                offset: u32_at(&buf, 4) as u64,
                vaddr: u32_at(&buf, 8) as u64,
                paddr: u32_at(&buf, 12) as u64,
                filesz: u32_at(&buf, 16) as u64,
                memsz: u32_at(&buf, 20) as u64,
                flags: u32_at(&buf, 24),
                align: u32_at(&buf, 28) as u64,
            },
            ElfClass::Elf64 => Self {
                p_type: u32_at(&buf, 0),
                flags: u32_at(&buf, 4),
                offset: u64_at(&buf, 8),
                vaddr: u64_at(&buf, 16),
                paddr: u64_at(&buf, 24),
                filesz: u64_at(&buf, 32),
                memsz: u64_at(&buf, 40),
                align: u64_at(&buf, 48),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DynamicEntry {
    pub tag: i64,
    pub value: u64,
}

impl DynamicEntry {
    pub fn parse(entry: &[u8], class: ElfClass) -> Self {
        let buf: [u8; 16] = known_prefix(entry);
        match class {
            ElfClass::Elf32 => Self {
                tag: u32_at(&buf, 0) as i32 as i64,
                value: u32_at(&buf, 4) as u64,
            },
            ElfClass::Elf64 => Self {
                tag: u64_at(&buf, 0) as i64,
                value: u64_at(&buf, 8),
            },
        }
    }

    pub fn is(&self, tag: u64) -> bool {
        self.tag as u64 == tag
    }

    /// Entries up to, not including, the first `DT_NULL`.
    pub fn parse_table(raw: &[u8], class: ElfClass) -> Vec<Self> {
        raw.chunks_exact(class.dynamic_size())
            .map(|chunk| Self::parse(chunk, class))
            .take_while(|entry| !entry.is(DT_NULL))
            .collect()
    }
}

/// One `.dynsym` entry, before any address fix-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSymbol {
    pub name: u32,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
    pub value: u64,
    pub size: u64,
}

impl RawSymbol {
    pub fn parse(entry: &[u8], class: ElfClass) -> Self {
        let buf: [u8; 24] = known_prefix(entry);
        match class {
            ElfClass::Elf32 => Self {
                name: u32_at(&buf, 0),
                value: word_at(&buf, 4, class),
                size: word_at(&buf, 8, class),
                info: buf[12],
                other: buf[13],
                shndx: u16_at(&buf, 14),
            },
            ElfClass::Elf64 => Self {
                name: u32_at(&buf, 0),
                info: buf[4],
                other: buf[5],
                shndx: u16_at(&buf, 6),
                value: word_at(&buf, 8, class),
                size: word_at(&buf, 16, class),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goblin::elf::dynamic::{DT_STRSZ, DT_STRTAB};
    use goblin::elf::program_header::PT_LOAD;

    #[test]
    fn test_header_32_and_64() {
        let mut raw = vec![0u8; 64];
        raw[..4].copy_from_slice(b"\x7fELF");
        raw[EI_CLASS] = ELFCLASS64;
        raw[32..40].copy_from_slice(&64u64.to_ne_bytes());
        raw[54..56].copy_from_slice(&56u16.to_ne_bytes());
        raw[56..58].copy_from_slice(&3u16.to_ne_bytes());
        let h = ElfHeader::parse(&raw, ElfClass::Elf64);
        assert!(h.has_magic());
        assert_eq!(h.class(), Some(ElfClass::Elf64));
        assert_eq!((h.phoff, h.phentsize, h.phnum), (64, 56, 3));

        let mut raw = vec![0u8; 52];
        raw[..4].copy_from_slice(b"\x7fELF");
        raw[EI_CLASS] = ELFCLASS32;
        raw[28..32].copy_from_slice(&52u32.to_ne_bytes());
        raw[42..44].copy_from_slice(&32u16.to_ne_bytes());
        raw[44..46].copy_from_slice(&2u16.to_ne_bytes());
        let h = ElfHeader::parse(&raw, ElfClass::Elf32);
        assert_eq!(h.class(), Some(ElfClass::Elf32));
        assert_eq!((h.phoff, h.phentsize, h.phnum), (52, 32, 2));

        assert!(!ElfHeader::parse(b"\x7fELx", ElfClass::Elf64).has_magic());
    }

    #[test]
    fn test_program_header_prefix() {
        let mut raw = vec![0u8; 64];
        raw[0..4].copy_from_slice(&PT_LOAD.to_ne_bytes());
        raw[16..24].copy_from_slice(&0x1000u64.to_ne_bytes());
        raw[40..48].copy_from_slice(&0x2000u64.to_ne_bytes());
        raw[56..64].copy_from_slice(&[0xFF; 8]);

        let ph = ProgramHeader::parse(&raw, ElfClass::Elf64);
        assert_eq!(ph.p_type, PT_LOAD);
        assert_eq!(ph.vaddr, 0x1000);
        assert_eq!(ph.memsz, 0x2000);

        // Shorter entries read as zero past their end.
        let short = ProgramHeader::parse(&raw[..20], ElfClass::Elf64);
        assert_eq!(short.p_type, PT_LOAD);
        assert_eq!(short.memsz, 0);
    }

    #[test]
    fn test_dynamic_table_stops_at_null() {
        let mut raw = Vec::new();
        for (tag, value) in [(DT_STRTAB, 0x400u64), (DT_STRSZ, 9), (DT_NULL, 0), (DT_STRTAB, 0x999)] {
            raw.extend_from_slice(&tag.to_ne_bytes());
            raw.extend_from_slice(&value.to_ne_bytes());
        }
        let entries = DynamicEntry::parse_table(&raw, ElfClass::Elf64);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is(DT_STRTAB));
        assert_eq!(entries[1].value, 9);
    }

    #[test]
    fn test_symbol_32() {
        let mut raw = [0u8; 16];
        raw[0..4].copy_from_slice(&5u32.to_ne_bytes());
        raw[4..8].copy_from_slice(&0x8000u32.to_ne_bytes());
        raw[12] = 0x12;
        let sym = RawSymbol::parse(&raw, ElfClass::Elf32);
        assert_eq!((sym.name, sym.value, sym.info), (5, 0x8000, 0x12));
    }
}
