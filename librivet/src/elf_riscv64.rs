use crate::arch::Arch;
use crate::arch::RelocationKind;
use crate::bail;
use crate::elf::File;
use crate::error::Result;
use crate::input_section::InputSection;
use std::borrow::Cow;

pub struct ElfRiscV64;

impl Arch for ElfRiscV64 {
    const NAME: &'static str = "riscv64";
    const IS_RELA: bool = true;
    const IS_RISCV: bool = true;
    const WORD_SIZE: usize = 8;
    const R_RELATIVE: u32 = object::elf::R_RISCV_RELATIVE;
    const R_ABS: u32 = object::elf::R_RISCV_64;

    fn relocation_kind(r_type: u32) -> Result<RelocationKind> {
        match r_type {
            object::elf::R_RISCV_64 => Ok(RelocationKind::Absolute),
            object::elf::R_RISCV_32 => Ok(RelocationKind::AbsoluteNarrow),
            object::elf::R_RISCV_32_PCREL => Ok(RelocationKind::Relative),
            _ => bail!(
                "Unsupported relocation type {}",
                Self::rel_type_to_string(r_type)
            ),
        }
    }

    fn rel_type_to_string(r_type: u32) -> Cow<'static, str> {
        match r_type {
            object::elf::R_RISCV_NONE => "R_RISCV_NONE".into(),
            object::elf::R_RISCV_32 => "R_RISCV_32".into(),
            object::elf::R_RISCV_64 => "R_RISCV_64".into(),
            object::elf::R_RISCV_32_PCREL => "R_RISCV_32_PCREL".into(),
            object::elf::R_RISCV_RELATIVE => "R_RISCV_RELATIVE".into(),
            _ => format!("UNKNOWN({r_type:#x})").into(),
        }
    }

    /// Copies section contents, dropping the byte ranges that size-reducing relaxations deleted.
    fn copy_section_contents(section: &InputSection, file: &File, out: &mut [u8]) -> Result {
        if section.relax_deltas.is_empty() {
            return section.uncompress_to(file, out);
        }

        // Relaxed sections are executable code and therefore never compressed.
        let contents = section.contents();
        let mut in_pos = 0;
        let mut out_pos = 0;
        for &(offset, deleted) in &section.relax_deltas {
            let chunk = &contents[in_pos..offset as usize];
            out[out_pos..out_pos + chunk.len()].copy_from_slice(chunk);
            out_pos += chunk.len();
            in_pos = offset as usize + deleted as usize;
        }
        let tail = &contents[in_pos..];
        out[out_pos..out_pos + tail.len()].copy_from_slice(tail);
        Ok(())
    }
}
