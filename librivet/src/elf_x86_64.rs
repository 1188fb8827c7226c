use crate::arch::Arch;
use crate::arch::RelocationKind;
use crate::bail;
use crate::error::Result;
use std::borrow::Cow;

pub struct ElfX86_64;

impl Arch for ElfX86_64 {
    const NAME: &'static str = "x86_64";
    const IS_RELA: bool = true;
    const WORD_SIZE: usize = 8;
    const R_RELATIVE: u32 = object::elf::R_X86_64_RELATIVE;
    const R_ABS: u32 = object::elf::R_X86_64_64;

    fn relocation_kind(r_type: u32) -> Result<RelocationKind> {
        match r_type {
            object::elf::R_X86_64_64 => Ok(RelocationKind::Absolute),
            object::elf::R_X86_64_32 | object::elf::R_X86_64_32S => {
                Ok(RelocationKind::AbsoluteNarrow)
            }
            object::elf::R_X86_64_PC32 => Ok(RelocationKind::Relative),
            _ => bail!(
                "Unsupported relocation type {}",
                Self::rel_type_to_string(r_type)
            ),
        }
    }

    fn rel_type_to_string(r_type: u32) -> Cow<'static, str> {
        match r_type {
            object::elf::R_X86_64_NONE => "R_X86_64_NONE".into(),
            object::elf::R_X86_64_64 => "R_X86_64_64".into(),
            object::elf::R_X86_64_32 => "R_X86_64_32".into(),
            object::elf::R_X86_64_32S => "R_X86_64_32S".into(),
            object::elf::R_X86_64_PC32 => "R_X86_64_PC32".into(),
            object::elf::R_X86_64_RELATIVE => "R_X86_64_RELATIVE".into(),
            _ => format!("UNKNOWN({r_type:#x})").into(),
        }
    }
}
