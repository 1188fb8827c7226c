//! ELF structures and the input-file model. Object-file parsing happens upstream; by the time a
//! `File` reaches the section engine its tables have been located and its symbols resolved.

use crate::error;
use crate::error::Result;
use crate::input_section::InputSection;
use crate::symbol::SymbolId;
use object::LittleEndian;
use std::fmt::Display;
use std::sync::atomic::AtomicU64;

pub type Shdr = object::elf::SectionHeader64<LittleEndian>;
pub type Sym = object::elf::Sym64<LittleEndian>;
pub type Chdr = object::elf::CompressionHeader64<LittleEndian>;
pub type Rela = object::elf::Rela64<LittleEndian>;

/// A relocation in parsed form. For REL-style inputs `r_addend` is zero and the addend lives in
/// the bytes being relocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rel {
    pub r_offset: u64,
    pub r_type: u32,
    pub r_sym: u32,
    pub r_addend: i64,
}

/// Builds a dynamic relocation record for the output file.
pub fn make_rela(offset: u64, r_type: u32, dynsym_index: u32, addend: i64) -> Rela {
    Rela {
        r_offset: object::U64::new(LittleEndian, offset),
        r_info: object::U64::new(
            LittleEndian,
            u64::from(dynsym_index) << 32 | u64::from(r_type),
        ),
        r_addend: object::I64::new(LittleEndian, addend),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// One input object file.
pub struct File<'data> {
    /// Identifier used in diagnostics, e.g. `crt1.o` or `libc.a(exit.o)`.
    pub input_name: &'data str,

    /// The file's memory-mapped bytes. The map outlives every section view taken from it.
    data: &'data [u8],

    pub elf_sections: &'data [Shdr],
    shstrtab: &'data [u8],
    pub elf_syms: &'data [Sym],
    pub symbol_strtab: &'data [u8],

    /// Local symbol index -> resolved global symbol.
    pub symbols: Vec<SymbolId>,

    /// The file's contributory sections, filled in as they're ingested.
    pub input_sections: Vec<InputSection<'data>>,

    /// Number of dynamic relocations the output will carry on behalf of this file's sections.
    pub num_dynrel: AtomicU64,
}

impl<'data> File<'data> {
    pub fn new(
        input_name: &'data str,
        data: &'data [u8],
        elf_sections: &'data [Shdr],
        shstrtab: &'data [u8],
        elf_syms: &'data [Sym],
        symbol_strtab: &'data [u8],
        symbols: Vec<SymbolId>,
    ) -> Self {
        Self {
            input_name,
            data,
            elf_sections,
            shstrtab,
            elf_syms,
            symbol_strtab,
            symbols,
            input_sections: Vec::new(),
            num_dynrel: AtomicU64::new(0),
        }
    }

    pub fn section(&self, index: usize) -> Result<&'data Shdr> {
        self.elf_sections
            .get(index)
            .ok_or_else(|| error!("{self}: no section with index {index}"))
    }

    pub fn section_name(&self, shdr: &Shdr) -> Result<&'data [u8]> {
        null_terminated(self.shstrtab, shdr.sh_name.get(LittleEndian) as usize)
            .ok_or_else(|| error!("{self}: invalid section name offset"))
    }

    /// Returns the section's stored bytes. Doesn't handle decompression.
    pub fn raw_section_data(&self, shdr: &Shdr) -> Result<&'data [u8]> {
        if shdr.sh_type.get(LittleEndian) == object::elf::SHT_NOBITS {
            return Ok(&[]);
        }
        let offset = shdr.sh_offset.get(LittleEndian) as usize;
        let size = shdr.sh_size.get(LittleEndian) as usize;
        self.data
            .get(offset..offset + size)
            .ok_or_else(|| error!("{self}: section data out of bounds"))
    }

    pub fn symbol_name(&self, sym: &Sym) -> Result<&'data [u8]> {
        null_terminated(self.symbol_strtab, sym.st_name.get(LittleEndian) as usize)
            .ok_or_else(|| error!("{self}: invalid symbol name offset"))
    }

    /// The source file name the compiler recorded, if any.
    pub fn source_name(&self) -> Option<&'data [u8]> {
        self.elf_syms
            .iter()
            .find(|sym| sym.st_info & 0xf == object::elf::STT_FILE)
            .and_then(|sym| self.symbol_name(sym).ok())
            .filter(|name| !name.is_empty())
    }
}

impl Display for File<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.input_name)
    }
}

fn null_terminated(strtab: &[u8], offset: usize) -> Option<&[u8]> {
    let rest = strtab.get(offset..)?;
    let len = rest.iter().position(|b| *b == 0)?;
    Some(&rest[..len])
}
