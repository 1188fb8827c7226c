use crate::arch::Arch;
use crate::arch::RelocationKind;
use crate::bail;
use crate::error::Result;
use std::borrow::Cow;

pub struct ElfPpc64;

impl Arch for ElfPpc64 {
    const NAME: &'static str = "ppc64le";
    const IS_RELA: bool = true;
    const WORD_SIZE: usize = 8;
    const R_RELATIVE: u32 = object::elf::R_PPC64_RELATIVE;
    const R_ABS: u32 = object::elf::R_PPC64_ADDR64;

    fn relocation_kind(r_type: u32) -> Result<RelocationKind> {
        match r_type {
            object::elf::R_PPC64_ADDR64 => Ok(RelocationKind::Absolute),
            object::elf::R_PPC64_ADDR32 => Ok(RelocationKind::AbsoluteNarrow),
            object::elf::R_PPC64_REL32 => Ok(RelocationKind::Relative),
            _ => bail!(
                "Unsupported relocation type {}",
                Self::rel_type_to_string(r_type)
            ),
        }
    }

    fn rel_type_to_string(r_type: u32) -> Cow<'static, str> {
        match r_type {
            object::elf::R_PPC64_NONE => "R_PPC64_NONE".into(),
            object::elf::R_PPC64_ADDR64 => "R_PPC64_ADDR64".into(),
            object::elf::R_PPC64_ADDR32 => "R_PPC64_ADDR32".into(),
            object::elf::R_PPC64_REL32 => "R_PPC64_REL32".into(),
            object::elf::R_PPC64_RELATIVE => "R_PPC64_RELATIVE".into(),
            _ => format!("UNKNOWN({r_type:#x})").into(),
        }
    }

    fn supports_toc() -> bool {
        true
    }
}
