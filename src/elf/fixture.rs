// Mon Oct 19 2026 - Alex

//! Synthetic in-memory ELF images for tests.

use crate::elf::types::ElfClass;
use crate::memory::{Address, SnapshotMemory};
use goblin::elf::dynamic::{DT_NULL, DT_STRSZ, DT_STRTAB, DT_SYMENT, DT_SYMTAB};
use goblin::elf::header::{EI_CLASS, ELFCLASS32, ELFCLASS64};
use goblin::elf::program_header::{PT_DYNAMIC, PT_LOAD, PT_NULL};

pub(crate) const IMAGE_BASE: u64 = 0x7000_0000;
pub(crate) const IMAGE_SIZE: usize = 0x2000;

const DYNAMIC_OFFSET: usize = 0x200;
const SYMTAB_OFFSET: usize = 0x300;
const STRTAB_OFFSET: usize = 0x400;

/// One `PT_LOAD` at vaddr 0 spanning the image, one `PT_DYNAMIC`, and a
/// `.dynsym` holding `foo` and `bar`. Built in the native class unless
/// [`ImageBuilder::with_class`] says otherwise.
pub(crate) struct ImageBuilder {
    class: ElfClass,
    phentsize: usize,
    magic: [u8; 4],
    loads: bool,
    load_memsz: u64,
    dynamic_memsz: Option<u64>,
    tags: Vec<(u64, u64)>,
    symbols: Vec<(u32, u64)>,
    strings: Vec<u8>,
}

impl ImageBuilder {
    pub(crate) fn new() -> Self {
        let class = ElfClass::native();
        let strings = b"\0foo\0bar\0".to_vec();
        Self {
            class,
            phentsize: class.program_header_size(),
            magic: *b"\x7fELF",
            loads: true,
            load_memsz: IMAGE_SIZE as u64,
            dynamic_memsz: None,
            tags: vec![
                (DT_STRTAB, STRTAB_OFFSET as u64),
                (DT_SYMTAB, SYMTAB_OFFSET as u64),
                (DT_STRSZ, strings.len() as u64),
                (DT_SYMENT, class.symbol_size() as u64),
            ],
            symbols: vec![(0, 0), (1, 0x1000), (5, 0x1100), (u32::MAX, 0)],
            strings,
        }
    }

    /// Switches the layout and resets `DT_SYMENT` and `e_phentsize` to match.
    pub(crate) fn with_class(mut self, class: ElfClass) -> Self {
        self.class = class;
        self.phentsize = class.program_header_size();
        for (tag, value) in self.tags.iter_mut() {
            if *tag == DT_SYMENT {
                *value = class.symbol_size() as u64;
            }
        }
        self
    }

    /// Program header stride; bytes past the known layout are filled with 0xFF.
    pub(crate) fn with_phentsize(mut self, phentsize: usize) -> Self {
        self.phentsize = phentsize;
        self
    }

    pub(crate) fn with_load_memsz(mut self, memsz: u64) -> Self {
        self.load_memsz = memsz;
        self
    }

    pub(crate) fn with_dynamic_memsz(mut self, memsz: u64) -> Self {
        self.dynamic_memsz = Some(memsz);
        self
    }

    pub(crate) fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub(crate) fn without_tag(mut self, tag: u64) -> Self {
        self.tags.retain(|&(t, _)| t != tag);
        self
    }

    pub(crate) fn without_loads(mut self) -> Self {
        self.loads = false;
        self
    }

    /// `(name offset, value)` pairs written in order.
    pub(crate) fn with_symbols(mut self, symbols: Vec<(u32, u64)>) -> Self {
        self.symbols = symbols;
        self
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        let class = self.class;
        let wide = class == ElfClass::Elf64;
        let mut image = vec![0u8; IMAGE_SIZE];

        image[..4].copy_from_slice(&self.magic);
        image[EI_CLASS] = if wide { ELFCLASS64 } else { ELFCLASS32 };

        let phoff = class.header_size();
        let (phoff_at, counts_at) = if wide { (32, 54) } else { (28, 42) };
        put_word(&mut image, phoff_at, phoff as u64, class);
        put_u16(&mut image, counts_at, self.phentsize as u16);
        put_u16(&mut image, counts_at + 2, 2);
        put_u16(&mut image, counts_at + 4, if wide { 64 } else { 40 });
        put_u16(&mut image, counts_at + 6, 1);

        let dynamic_size = (self.tags.len() + 1) * class.dynamic_size();
        let load_type = if self.loads { PT_LOAD } else { PT_NULL };
        let phdrs = [
            (load_type, 0u64, self.load_memsz),
            (PT_DYNAMIC, DYNAMIC_OFFSET as u64, self.dynamic_memsz.unwrap_or(dynamic_size as u64)),
        ];
        let known = class.program_header_size();
        for (i, (p_type, vaddr, memsz)) in phdrs.into_iter().enumerate() {
            let at = phoff + i * self.phentsize;
            if self.phentsize > known {
                image[at + known..at + self.phentsize].fill(0xFF);
            }
            put_u32(&mut image, at, p_type);
            let (vaddr_at, memsz_at) = if wide { (16, 40) } else { (8, 20) };
            put_word(&mut image, at + vaddr_at, vaddr, class);
            put_word(&mut image, at + memsz_at, memsz, class);
        }

        let word = if wide { 8 } else { 4 };
        let tags = self.tags.iter().copied().chain(std::iter::once((DT_NULL, 0)));
        for (i, (tag, value)) in tags.enumerate() {
            let at = DYNAMIC_OFFSET + i * class.dynamic_size();
            put_word(&mut image, at, tag, class);
            put_word(&mut image, at + word, value, class);
        }

        let value_at = if wide { 8 } else { 4 };
        for (i, &(name, value)) in self.symbols.iter().enumerate() {
            let at = SYMTAB_OFFSET + i * class.symbol_size();
            put_u32(&mut image, at, name);
            put_word(&mut image, at + value_at, value, class);
        }

        image[STRTAB_OFFSET..STRTAB_OFFSET + self.strings.len()].copy_from_slice(&self.strings);
        image
    }

    pub(crate) fn build(&self) -> SnapshotMemory {
        SnapshotMemory::new(Address::new(IMAGE_BASE), self.bytes())
    }
}

fn put_u16(image: &mut [u8], at: usize, value: u16) {
    image[at..at + 2].copy_from_slice(&value.to_ne_bytes());
}

fn put_u32(image: &mut [u8], at: usize, value: u32) {
    image[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn put_word(image: &mut [u8], at: usize, value: u64, class: ElfClass) {
    match class {
        ElfClass::Elf32 => put_u32(image, at, value as u32),
        ElfClass::Elf64 => image[at..at + 8].copy_from_slice(&value.to_ne_bytes()),
    }
}
