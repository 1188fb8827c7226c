//! One `InputSection` per contributory section of each input object. Sections are created during
//! ingestion, scanned for the demands their relocations place on the dynamic linker, and finally
//! written to the output image with relocations applied. Compressed debug sections (both the
//! legacy `.zdebug` format and `SHF_COMPRESSED`) are materialised on the way through.

use crate::arch::Arch;
use crate::arch::RelocationKind;
use crate::args::Args;
use crate::args::OutputKind;
use crate::bail;
use crate::context::LinkContext;
use crate::elf::Chdr;
use crate::elf::File;
use crate::elf::FileId;
use crate::elf::Rel;
use crate::elf::Rela;
use crate::elf::make_rela;
use crate::ensure;
use crate::error;
use crate::error::Result;
use crate::output_section_id::OutputSectionId;
use crate::symbol::Symbol;
use crate::symbol::SymbolDb;
use crate::value_flags::ValueFlags;
use object::LittleEndian;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use std::fmt::Write as _;
use std::sync::atomic::Ordering;

/// Converts an ELF `sh_addralign` value to a power-of-two exponent. The field is documented to
/// hold zero or a power of two.
pub fn to_p2align(alignment: u64) -> u8 {
    if alignment == 0 {
        return 0;
    }
    alignment.trailing_zeros() as u8
}

/// What a relocation demands once the output mode and the referenced symbol are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Resolved fully at link time.
    None,
    /// Cannot be satisfied in this output mode.
    Error,
    /// Reserve space in our BSS and have the loader copy the symbol's data into it.
    CopyRel,
    /// Route the reference through a PLT entry.
    Plt,
    /// Route the reference through a canonical PLT entry that also serves as the function's
    /// address.
    Cplt,
    /// Emit a symbolic dynamic relocation.
    DynRel,
    /// Emit a base-relative dynamic relocation.
    BaseRel,
}

/// Rows are indexed by output mode (shared object, PIE, position-dependent executable), columns
/// by symbol kind (absolute, local, imported data, imported code).
type ActionTable = [[Action; 4]; 3];

fn rel_action(args: &Args, table: &ActionTable, sym: &Symbol) -> Action {
    let output = match args.output_kind {
        OutputKind::SharedObject => 0,
        OutputKind::PositionIndependentExecutable => 1,
        OutputKind::PositionDependentExecutable => 2,
    };
    let symbol = if sym.is_absolute() {
        0
    } else if !sym.is_imported {
        1
    } else if !sym.is_func() {
        2
    } else {
        3
    };
    table[output][symbol]
}

pub struct InputSection<'data> {
    pub file_id: FileId,

    /// Index of this section in the input file's section header table.
    pub shndx: usize,

    name: &'data [u8],

    /// Current logical bytes: a view into the file's memory map, or into the decompression arena
    /// once `uncompressed` is set.
    contents: &'data [u8],

    pub sh_type: u32,
    pub sh_flags: u64,

    /// Logical (uncompressed) size in bytes.
    pub sh_size: u64,

    /// Alignment as a power-of-two exponent.
    pub p2align: u8,

    compressed: bool,
    uncompressed: bool,

    pub output_section: OutputSectionId,

    /// Output address of the section, assigned by layout before the write phase.
    pub address: u64,

    /// Relocations applying to this section, in input order.
    pub rels: Vec<Rel>,

    /// RISC-V size-reduction deltas: (input offset, bytes deleted there), ascending.
    pub relax_deltas: Vec<(u64, u32)>,
}

impl<'data> InputSection<'data> {
    pub fn new<A: Arch>(
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        file_id: FileId,
        shndx: usize,
        rels: Vec<Rel>,
    ) -> Result<Self> {
        let shdr = file.section(shndx)?;
        let name = file.section_name(shdr)?;
        let contents = file.raw_section_data(shdr)?;
        let sh_type = shdr.sh_type.get(LittleEndian);
        let sh_flags = shdr.sh_flags.get(LittleEndian);

        let (sh_size, p2align, compressed) = if name.starts_with(b".zdebug") {
            // Legacy format: "ZLIB" magic, big-endian uncompressed size, zlib stream.
            let Some(size) = contents.get(4..12) else {
                bail!(
                    "{file}:({}): corrupted compressed section",
                    String::from_utf8_lossy(name)
                );
            };
            let sh_size = u64::from_be_bytes(size.try_into().unwrap());
            (sh_size, to_p2align(shdr.sh_addralign.get(LittleEndian)), true)
        } else if sh_flags & u64::from(object::elf::SHF_COMPRESSED) != 0 {
            let Ok((chdr, _)) = object::pod::from_bytes::<Chdr>(contents) else {
                bail!(
                    "{file}:({}): corrupted compressed section",
                    String::from_utf8_lossy(name)
                );
            };
            let sh_size = chdr.ch_size.get(LittleEndian);
            let p2align = to_p2align(chdr.ch_addralign.get(LittleEndian));
            (sh_size, p2align, true)
        } else {
            let sh_size = shdr.sh_size.get(LittleEndian);
            (sh_size, to_p2align(shdr.sh_addralign.get(LittleEndian)), false)
        };

        let output_section = ctx.output_sections.id_for(name, sh_type, sh_flags);

        let mut section = Self {
            file_id,
            shndx,
            name,
            contents,
            sh_type,
            sh_flags,
            sh_size,
            p2align,
            compressed,
            uncompressed: false,
            output_section,
            address: 0,
            rels,
            relax_deltas: Vec::new(),
        };

        // REL-style relocations keep their addends in the section bytes, so the scan needs the
        // real contents up front. RELA inputs decompress later, usually straight into the output
        // file.
        if !A::IS_RELA {
            section.uncompress(ctx, file)?;
        }

        Ok(section)
    }

    pub fn name(&self) -> &'data [u8] {
        self.name
    }

    pub fn contents(&self) -> &'data [u8] {
        self.contents
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn is_uncompressed(&self) -> bool {
        self.uncompressed
    }

    /// `file.o:(.section)`, the identifier used in diagnostics.
    pub fn identifier(&self, file: &File) -> String {
        format!("{file}:({})", String::from_utf8_lossy(self.name))
    }

    /// Materialises the logical bytes into the link-wide arena. Idempotent; later calls are
    /// no-ops.
    pub fn uncompress(&mut self, ctx: &LinkContext<'data>, file: &File<'data>) -> Result {
        if !self.compressed || self.uncompressed {
            return Ok(());
        }
        let mut buf = vec![0u8; self.sh_size as usize];
        self.uncompress_to(file, &mut buf)?;
        self.contents = ctx.herd.get().alloc_slice_copy(&buf);
        self.uncompressed = true;
        Ok(())
    }

    /// Writes the logical bytes into `buf`, decompressing if they're still compressed. `buf` must
    /// hold at least `sh_size` bytes.
    pub fn uncompress_to(&self, file: &File<'data>, buf: &mut [u8]) -> Result {
        if !self.compressed || self.uncompressed {
            buf[..self.contents.len()].copy_from_slice(self.contents);
            return Ok(());
        }

        if self.name.starts_with(b".zdebug") {
            ensure!(
                self.contents.starts_with(b"ZLIB") && self.contents.len() >= 12,
                "{}: corrupted compressed section",
                self.identifier(file)
            );
            if self.contents.len() == 12 {
                // Nothing after the header is only valid for an empty payload.
                ensure!(
                    self.sh_size == 0,
                    "{}: corrupted compressed section",
                    self.identifier(file)
                );
                return Ok(());
            }
            return self.inflate(file, &self.contents[12..], buf);
        }

        debug_assert!(self.sh_flags & u64::from(object::elf::SHF_COMPRESSED) != 0);
        let Ok((chdr, compressed)) = object::pod::from_bytes::<Chdr>(self.contents) else {
            bail!("{}: corrupted compressed section", self.identifier(file));
        };
        let ch_type = chdr.ch_type.get(LittleEndian);
        ensure!(
            ch_type == object::elf::ELFCOMPRESS_ZLIB,
            "{}: unsupported compression type: {:#x}",
            self.identifier(file),
            ch_type
        );
        self.inflate(file, compressed, buf)
    }

    fn inflate(&self, file: &File<'data>, data: &[u8], buf: &mut [u8]) -> Result {
        let mut stream = flate2::Decompress::new(true);
        let status = stream
            .decompress(data, buf, flate2::FlushDecompress::Finish)
            .map_err(|_| error!("{}: uncompress failed", self.identifier(file)))?;
        ensure!(
            status == flate2::Status::StreamEnd && stream.total_out() == self.sh_size,
            "{}: uncompress failed",
            self.identifier(file)
        );
        Ok(())
    }

    /// The relocation's addend: from the relocation record for RELA inputs, from the bytes being
    /// relocated for REL inputs.
    pub fn get_addend<A: Arch>(&self, rel: &Rel) -> i64 {
        if A::IS_RELA {
            return rel.r_addend;
        }
        let offset = rel.r_offset as usize;
        let Some(bytes) = self.contents.get(offset..offset + A::WORD_SIZE) else {
            return 0;
        };
        let raw = A::read_word(bytes);
        if A::WORD_SIZE == 4 {
            i64::from(raw as u32 as i32)
        } else {
            raw as i64
        }
    }

    /// Whether a base-relative relocation at `rel` can be packed into the RELR section instead of
    /// costing a full dynamic relocation record.
    pub fn is_relr_reloc<A: Arch>(&self, ctx: &LinkContext, rel: &Rel) -> bool {
        ctx.args.pack_dyn_relocs_relr
            && u32::from(self.p2align) >= A::WORD_SIZE.trailing_zeros()
            && rel.r_offset % A::WORD_SIZE as u64 == 0
    }

    /// Classifies and dispatches every relocation of this section. References to undefined
    /// symbols are recorded for the batched report and otherwise skipped.
    pub fn scan_relocations<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        symbols: &SymbolDb<'data>,
    ) -> Result {
        for rel in &self.rels {
            let symbol_id = *file.symbols.get(rel.r_sym as usize).ok_or_else(|| {
                error!(
                    "{}: relocation references out-of-range symbol {}",
                    self.identifier(file),
                    rel.r_sym
                )
            })?;
            let sym = symbols.symbol(symbol_id);
            if sym.is_undefined() {
                self.record_undef_error(ctx, file, sym, rel);
                continue;
            }
            match A::relocation_kind(rel.r_type)? {
                RelocationKind::AbsoluteNarrow => self.scan_abs_rel::<A>(ctx, file, sym, rel),
                RelocationKind::Absolute => self.scan_abs_dyn_rel::<A>(ctx, file, sym, rel),
                RelocationKind::Relative => self.scan_pcrel_rel::<A>(ctx, file, sym, rel),
            }
        }
        Ok(())
    }

    /// Absolute relocations narrower than the machine word, e.g. R_X86_64_32. Dynamic loaders
    /// generally can't apply relocations below word size, so anything not resolvable at link time
    /// is an error.
    pub fn scan_abs_rel<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        sym: &Symbol<'data>,
        rel: &Rel,
    ) {
        const TABLE: ActionTable = [
            // Absolute      Local          Imported data    Imported code
            [Action::None, Action::Error, Action::Error, Action::Error], // Shared object
            [Action::None, Action::Error, Action::Error, Action::Error], // Position-independent exec
            [Action::None, Action::None, Action::CopyRel, Action::Cplt], // Position-dependent exec
        ];
        let action = rel_action(&ctx.args, &TABLE, sym);
        self.dispatch::<A>(ctx, file, action, sym, rel);
    }

    fn abs_dyn_action<A: Arch>(&self, args: &Args, sym: &Symbol<'data>) -> Action {
        if A::supports_toc() && self.name == b".toc".as_slice() {
            // .toc is compiler-generated GOT-like storage. No user code reads its raw link-time
            // values, so every slot can be resolved by the loader; copy relocations and
            // canonical PLTs would only cost start-up time.
            const TABLE: ActionTable = [
                // Absolute      Local            Imported data   Imported code
                [Action::None, Action::BaseRel, Action::DynRel, Action::DynRel], // Shared object
                [Action::None, Action::BaseRel, Action::DynRel, Action::DynRel], // Position-independent exec
                [Action::None, Action::None, Action::DynRel, Action::DynRel], // Position-dependent exec
            ];
            return rel_action(args, &TABLE, sym);
        }

        // Word-size absolute relocations, e.g. R_X86_64_64. Unlike the narrow case, anything not
        // resolvable at link time can be deferred to the loader with a dynamic relocation.
        const TABLE: ActionTable = [
            // Absolute      Local            Imported data    Imported code
            [Action::None, Action::BaseRel, Action::DynRel, Action::DynRel], // Shared object
            [Action::None, Action::BaseRel, Action::DynRel, Action::DynRel], // Position-independent exec
            [Action::None, Action::None, Action::CopyRel, Action::Cplt], // Position-dependent exec
        ];
        rel_action(args, &TABLE, sym)
    }

    /// Word-size absolute relocations.
    pub fn scan_abs_dyn_rel<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        sym: &Symbol<'data>,
        rel: &Rel,
    ) {
        let action = self.abs_dyn_action::<A>(&ctx.args, sym);
        self.dispatch::<A>(ctx, file, action, sym, rel);
    }

    /// PC-relative relocations, e.g. R_X86_64_PC32. These can't be deferred to the loader, which
    /// generally doesn't support PC-relative dynamic relocations.
    pub fn scan_pcrel_rel<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        sym: &Symbol<'data>,
        rel: &Rel,
    ) {
        const TABLE: ActionTable = [
            // Absolute       Local          Imported data     Imported code
            [Action::Error, Action::None, Action::Error, Action::Plt], // Shared object
            [Action::Error, Action::None, Action::CopyRel, Action::Plt], // Position-independent exec
            [Action::None, Action::None, Action::CopyRel, Action::Cplt], // Position-dependent exec
        ];
        let action = rel_action(&ctx.args, &TABLE, sym);
        self.dispatch::<A>(ctx, file, action, sym, rel);
    }

    fn dispatch<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        action: Action,
        sym: &Symbol<'data>,
        rel: &Rel,
    ) {
        let error = || {
            let advice = if sym.is_absolute() {
                "-fno-PIC"
            } else {
                "-fPIC"
            };
            ctx.report_error(error!(
                "{}: {} relocation at offset {:#x} against symbol `{}' cannot be used; \
                 recompile with {advice}",
                self.identifier(file),
                A::rel_type_to_string(rel.r_type),
                rel.r_offset,
                sym.name_for_display(ctx.args.demangle),
            ));
        };

        let check_textrel = || {
            if self.sh_flags & u64::from(object::elf::SHF_WRITE) != 0 {
                return;
            }
            if ctx.args.z_text {
                error();
            } else if ctx.args.warn_textrel {
                crate::error::warning(&format!(
                    "{}: relocation against symbol `{}' in read-only section",
                    self.identifier(file),
                    sym.name_for_display(ctx.args.demangle),
                ));
            }
            ctx.set_has_textrel();
        };

        match action {
            Action::None => {}
            Action::Error => error(),
            Action::CopyRel => {
                if !ctx.args.z_copyreloc {
                    error();
                } else if sym.visibility() == object::elf::STV_PROTECTED {
                    ctx.report_error(error!(
                        "{}: cannot make copy relocation for protected symbol `{}'; \
                         recompile with -fPIC",
                        self.identifier(file),
                        sym.name_for_display(ctx.args.demangle),
                    ));
                }
                sym.flags
                    .fetch_or(ValueFlags::NEEDS_COPYREL | ValueFlags::NEEDS_DYNSYM);
            }
            Action::Plt => {
                sym.flags
                    .fetch_or(ValueFlags::NEEDS_PLT | ValueFlags::NEEDS_DYNSYM);
            }
            Action::Cplt => {
                sym.flags
                    .fetch_or(ValueFlags::NEEDS_CPLT | ValueFlags::NEEDS_DYNSYM);
            }
            Action::DynRel => {
                debug_assert!(sym.is_imported);
                check_textrel();
                sym.flags.fetch_or(ValueFlags::NEEDS_DYNSYM);
                file.num_dynrel.fetch_add(1, Ordering::Relaxed);
            }
            Action::BaseRel => {
                check_textrel();
                if !self.is_relr_reloc::<A>(ctx, rel) {
                    file.num_dynrel.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Applies a word-size absolute relocation, emitting a dynamic relocation where the scan
    /// decided one is needed. S, A and P follow the ELF specification's naming.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_abs_dyn_rel<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        sym: &Symbol<'data>,
        rel: &Rel,
        loc: &mut [u8],
        s: u64,
        a: i64,
        p: u64,
        dynrel: &mut Vec<Rela>,
    ) {
        match self.abs_dyn_action::<A>(&ctx.args, sym) {
            Action::None | Action::CopyRel | Action::Cplt => {
                A::write_word(loc, s.wrapping_add_signed(a));
            }
            Action::BaseRel => {
                if !self.is_relr_reloc::<A>(ctx, rel) {
                    dynrel.push(make_rela(
                        p,
                        A::R_RELATIVE,
                        0,
                        s.wrapping_add_signed(a) as i64,
                    ));
                }
                A::write_word(loc, s.wrapping_add_signed(a));
            }
            Action::DynRel => {
                dynrel.push(make_rela(p, A::R_ABS, sym.get_dynsym_idx(), a));
                A::write_word(loc, a as u64);
            }
            Action::Error | Action::Plt => unreachable!(),
        }
    }

    /// Copies this section's bytes into `buf` and applies its relocations. `buf` is the section's
    /// slice of the output image.
    pub fn write_to<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        symbols: &SymbolDb<'data>,
        buf: &mut [u8],
        dynrel: &mut Vec<Rela>,
    ) -> Result {
        if self.sh_type == object::elf::SHT_NOBITS || self.sh_size == 0 {
            return Ok(());
        }

        // Copy data.
        if A::IS_RISCV {
            A::copy_section_contents(self, file, buf)?;
        } else if self.compressed {
            self.uncompress_to(file, buf)?;
        } else {
            buf[..self.contents.len()].copy_from_slice(self.contents);
        }

        // Apply relocations.
        if self.sh_flags & u64::from(object::elf::SHF_ALLOC) != 0 {
            self.apply_reloc_alloc::<A>(ctx, file, symbols, buf, dynrel)
        } else {
            self.apply_reloc_nonalloc::<A>(ctx, file, symbols, buf)
        }
    }

    fn apply_reloc_alloc<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        symbols: &SymbolDb<'data>,
        buf: &mut [u8],
        dynrel: &mut Vec<Rela>,
    ) -> Result {
        for rel in &self.rels {
            let symbol_id = *file.symbols.get(rel.r_sym as usize).ok_or_else(|| {
                error!(
                    "{}: relocation references out-of-range symbol {}",
                    self.identifier(file),
                    rel.r_sym
                )
            })?;
            let sym = symbols.symbol(symbol_id);
            let offset = rel.r_offset as usize;
            let s = sym.address;
            let a = self.get_addend::<A>(rel);
            let p = self.address + rel.r_offset;

            match A::relocation_kind(rel.r_type)? {
                RelocationKind::AbsoluteNarrow => {
                    let value = s.wrapping_add_signed(a);
                    let loc = self.narrow_loc(file, buf, offset)?;
                    if !narrow_value_fits(value) {
                        ctx.report_error(error!(
                            "{}: relocation {} out of range: {value:#x}",
                            self.identifier(file),
                            A::rel_type_to_string(rel.r_type),
                        ));
                    }
                    loc.copy_from_slice(&(value as u32).to_le_bytes());
                }
                RelocationKind::Absolute => {
                    let loc = buf.get_mut(offset..offset + A::WORD_SIZE).ok_or_else(|| {
                        error!(
                            "{}: relocation offset {offset:#x} out of bounds",
                            self.identifier(file)
                        )
                    })?;
                    self.apply_abs_dyn_rel::<A>(ctx, sym, rel, loc, s, a, p, dynrel);
                }
                RelocationKind::Relative => {
                    let value = s.wrapping_add_signed(a).wrapping_sub(p);
                    let loc = self.narrow_loc(file, buf, offset)?;
                    if !pcrel_value_fits(value) {
                        ctx.report_error(error!(
                            "{}: relocation {} out of range: {value:#x}",
                            self.identifier(file),
                            A::rel_type_to_string(rel.r_type),
                        ));
                    }
                    loc.copy_from_slice(&(value as u32).to_le_bytes());
                }
            }
        }
        Ok(())
    }

    /// Non-allocated sections (debug info) never get dynamic relocations: absolute references
    /// resolve to the symbol's address, or zero if the symbol didn't make it into the output.
    fn apply_reloc_nonalloc<A: Arch>(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        symbols: &SymbolDb<'data>,
        buf: &mut [u8],
    ) -> Result {
        for rel in &self.rels {
            let symbol_id = *file.symbols.get(rel.r_sym as usize).ok_or_else(|| {
                error!(
                    "{}: relocation references out-of-range symbol {}",
                    self.identifier(file),
                    rel.r_sym
                )
            })?;
            let sym = symbols.symbol(symbol_id);
            let offset = rel.r_offset as usize;
            let s = if sym.is_undefined() { 0 } else { sym.address };
            let a = self.get_addend::<A>(rel);
            let value = s.wrapping_add_signed(a);

            match A::relocation_kind(rel.r_type)? {
                RelocationKind::AbsoluteNarrow => {
                    let loc = self.narrow_loc(file, buf, offset)?;
                    if !narrow_value_fits(value) {
                        ctx.report_error(error!(
                            "{}: relocation {} out of range: {value:#x}",
                            self.identifier(file),
                            A::rel_type_to_string(rel.r_type),
                        ));
                    }
                    loc.copy_from_slice(&(value as u32).to_le_bytes());
                }
                RelocationKind::Absolute => {
                    let loc = buf.get_mut(offset..offset + A::WORD_SIZE).ok_or_else(|| {
                        error!(
                            "{}: relocation offset {offset:#x} out of bounds",
                            self.identifier(file)
                        )
                    })?;
                    A::write_word(loc, value);
                }
                RelocationKind::Relative => {
                    ctx.report_error(error!(
                        "{}: invalid relocation {} in non-allocated section",
                        self.identifier(file),
                        A::rel_type_to_string(rel.r_type),
                    ));
                }
            }
        }
        Ok(())
    }

    fn narrow_loc<'buf>(
        &self,
        file: &File,
        buf: &'buf mut [u8],
        offset: usize,
    ) -> Result<&'buf mut [u8]> {
        buf.get_mut(offset..offset + 4).ok_or_else(|| {
            error!(
                "{}: relocation offset {offset:#x} out of bounds",
                self.identifier(file)
            )
        })
    }

    /// Name of the function containing `offset`, for diagnostics.
    pub fn get_func_name(
        &self,
        ctx: &LinkContext,
        file: &File<'data>,
        offset: u64,
    ) -> Option<String> {
        for esym in file.elf_syms {
            let st_value = esym.st_value.get(LittleEndian);
            if usize::from(esym.st_shndx.get(LittleEndian)) == self.shndx
                && esym.st_info & 0xf == object::elf::STT_FUNC
                && st_value <= offset
                && offset < st_value + esym.st_size.get(LittleEndian)
            {
                let name = file.symbol_name(esym).ok()?;
                let name = String::from_utf8_lossy(name);
                return Some(if ctx.args.demangle {
                    format!("{:#}", rustc_demangle::demangle(&name))
                } else {
                    name.into_owned()
                });
            }
        }
        None
    }

    /// Records one reference to an undefined symbol for the batched report.
    pub fn record_undef_error(
        &self,
        ctx: &LinkContext<'data>,
        file: &File<'data>,
        sym: &Symbol<'data>,
        rel: &Rel,
    ) {
        let mut site = String::new();
        if let Some(source) = file.source_name() {
            let _ = writeln!(site, ">>> referenced by {}", String::from_utf8_lossy(source));
        } else {
            let _ = writeln!(site, ">>> referenced by {}", self.identifier(file));
        }
        let _ = write!(site, ">>>               {file}");
        if let Some(func) = self.get_func_name(ctx, file, rel.r_offset) {
            let _ = write!(site, ":({func})");
        }
        site.push('\n');
        ctx.undef_errors.record(sym.name(), site);
    }
}

fn narrow_value_fits(value: u64) -> bool {
    let signed = value as i64;
    (0..=i64::from(u32::MAX)).contains(&signed) || (i64::from(i32::MIN)..0).contains(&signed)
}

fn pcrel_value_fits(value: u64) -> bool {
    let signed = value as i64;
    (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&signed)
}

/// Scans the relocations of every section of every input file. Files fan out across the thread
/// pool; within one file, sections and their relocations are visited in input order.
pub fn scan_relocations<'data, A: Arch>(
    ctx: &LinkContext<'data>,
    files: &[File<'data>],
    symbols: &SymbolDb<'data>,
) -> Result {
    files.par_iter().try_for_each(|file| {
        file.input_sections
            .iter()
            .try_for_each(|section| section.scan_relocations::<A>(ctx, file, symbols))
    })
}
