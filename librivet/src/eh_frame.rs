//! Exception-frame records. During `.eh_frame` processing, identical CIEs from different
//! translation units are merged; `CieRecord::equals` decides whether two of them really are the
//! same record.

use crate::arch::Arch;
use crate::elf::File;
use crate::elf::Rel;
use crate::input_section::InputSection;
use smallvec::SmallVec;

/// One Common Information Entry within an `.eh_frame` input section.
pub struct CieRecord<'a, 'data> {
    pub file: &'a File<'data>,
    pub section: &'a InputSection<'data>,

    /// Byte offset of the CIE within its section.
    pub input_offset: u64,

    /// Relocations applying to this CIE, in input order. Most CIEs have at most a personality
    /// routine reference.
    pub rels: SmallVec<[Rel; 2]>,
}

impl<'data> CieRecord<'_, 'data> {
    /// The CIE's bytes: its length field plus the payload the length covers.
    pub fn contents(&self) -> &'data [u8] {
        let data = self.section.contents();
        let start = self.input_offset as usize;
        let length = u32::from_le_bytes(data[start..start + 4].try_into().unwrap()) as usize;
        &data[start..start + 4 + length]
    }

    /// Structural equality for deduplication: same bytes, and relocation lists that agree on
    /// position (relative to the CIE), type, resolved symbol identity and addend.
    pub fn equals<A: Arch>(&self, other: &CieRecord<'_, 'data>) -> bool {
        if self.contents() != other.contents() {
            return false;
        }

        if self.rels.len() != other.rels.len() {
            return false;
        }

        for (x, y) in self.rels.iter().zip(other.rels.iter()) {
            if x.r_offset - self.input_offset != y.r_offset - other.input_offset
                || x.r_type != y.r_type
                || self.file.symbols[x.r_sym as usize] != other.file.symbols[y.r_sym as usize]
                || self.section.get_addend::<A>(x) != other.section.get_addend::<A>(y)
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use crate::elf::FileId;
    use crate::elf::Sym;
    use crate::elf_x86_64::ElfX86_64;
    use crate::input_section::tests::SectionSpec;
    use crate::input_section::tests::build_file;
    use crate::input_section::tests::static_ctx;
    use crate::symbol::Symbol;
    use crate::symbol::SymbolDb;
    use crate::symbol::SymbolId;
    use object::LittleEndian;
    use smallvec::smallvec;

    fn cie_bytes() -> Vec<u8> {
        // Length 12, then 12 payload bytes.
        let mut data = 12u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0, 0, 0, 0, 1, 0x7a, 0x52, 0, 1, 0x78, 0x10, 1]);
        data
    }

    fn personality_symbol() -> Symbol<'static> {
        let esym = Sym {
            st_name: object::U32::new(LittleEndian, 0),
            st_info: object::elf::STT_FUNC,
            st_other: 0,
            st_shndx: object::U16::new(LittleEndian, 1),
            st_value: object::U64::new(LittleEndian, 0),
            st_size: object::U64::new(LittleEndian, 0),
        };
        Symbol::new(b"__gxx_personality_v0", esym, Some(FileId::new(0)), false)
    }

    fn eh_frame_section(
        ctx: &'static crate::context::LinkContext<'static>,
        symbols: Vec<SymbolId>,
    ) -> (&'static File<'static>, &'static InputSection<'static>) {
        let file = build_file(
            &[SectionSpec {
                name: ".eh_frame",
                sh_type: object::elf::SHT_PROGBITS,
                sh_flags: u64::from(object::elf::SHF_ALLOC),
                sh_addralign: 8,
                data: cie_bytes(),
            }],
            Vec::new(),
            Vec::new(),
            symbols,
        );
        let section = Box::leak(Box::new(
            InputSection::new::<ElfX86_64>(ctx, file, FileId::new(0), 0, Vec::new()).unwrap(),
        ));
        (file, section)
    }

    fn personality_rel(r_offset: u64, r_addend: i64) -> Rel {
        Rel {
            r_offset,
            r_type: object::elf::R_X86_64_PC32,
            r_sym: 0,
            r_addend,
        }
    }

    #[test]
    fn equality_is_an_equivalence() {
        let ctx = static_ctx(Args::default());
        let mut db = SymbolDb::new();
        let id = db.add(personality_symbol());

        let (file_a, section_a) = eh_frame_section(ctx, vec![id]);
        let (file_b, section_b) = eh_frame_section(ctx, vec![id]);

        let a = CieRecord {
            file: file_a,
            section: section_a,
            input_offset: 0,
            rels: smallvec![personality_rel(9, -4)],
        };
        let b = CieRecord {
            file: file_b,
            section: section_b,
            input_offset: 0,
            rels: smallvec![personality_rel(9, -4)],
        };

        assert!(a.equals::<ElfX86_64>(&a));
        assert!(a.equals::<ElfX86_64>(&b));
        assert!(b.equals::<ElfX86_64>(&a));
    }

    #[test]
    fn different_addend_or_symbol_breaks_equality() {
        let ctx = static_ctx(Args::default());
        let mut db = SymbolDb::new();
        let personality = db.add(personality_symbol());
        let other = db.add(personality_symbol());

        let (file_a, section_a) = eh_frame_section(ctx, vec![personality]);
        let (file_b, section_b) = eh_frame_section(ctx, vec![other]);
        let (file_c, section_c) = eh_frame_section(ctx, vec![personality]);

        let a = CieRecord {
            file: file_a,
            section: section_a,
            input_offset: 0,
            rels: smallvec![personality_rel(9, -4)],
        };

        // Same position and type but resolving to a different symbol.
        let b = CieRecord {
            file: file_b,
            section: section_b,
            input_offset: 0,
            rels: smallvec![personality_rel(9, -4)],
        };
        assert!(!a.equals::<ElfX86_64>(&b));

        // Same symbol, different addend.
        let c = CieRecord {
            file: file_c,
            section: section_c,
            input_offset: 0,
            rels: smallvec![personality_rel(9, 0)],
        };
        assert!(!a.equals::<ElfX86_64>(&c));

        // Different relocation count.
        let d = CieRecord {
            file: file_c,
            section: section_c,
            input_offset: 0,
            rels: smallvec![],
        };
        assert!(!a.equals::<ElfX86_64>(&d));
    }
}
