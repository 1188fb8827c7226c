//! Abstraction over the CPU architectures we can link for. The section engine's policy code is
//! architecture-independent; everything it needs from a target is behind this trait.

use crate::elf::File;
use crate::error::Result;
use crate::input_section::InputSection;
use std::borrow::Cow;

/// The shapes of data relocation the engine applies itself. Anything else (GOT-forming, TLS,
/// instruction-patching relocations) is handled by per-architecture code above this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelocationKind {
    /// Absolute relocation narrower than the machine word, e.g. a 32-bit store in a 64-bit link.
    AbsoluteNarrow,
    /// Absolute relocation of full word size.
    Absolute,
    /// PC-relative relocation.
    Relative,
}

pub trait Arch: Send + Sync + 'static {
    const NAME: &'static str;

    /// Whether relocation addends come from the relocation entries (RELA) rather than from the
    /// bytes being relocated (REL).
    const IS_RELA: bool;

    const IS_RISCV: bool = false;

    /// Size in bytes of the machine word relocations operate on.
    const WORD_SIZE: usize;

    /// Relocation code for a base-relative dynamic relocation.
    const R_RELATIVE: u32;

    /// Relocation code for a symbolic absolute dynamic relocation.
    const R_ABS: u32;

    // Classify a raw relocation type into one of the shapes the engine handles.
    fn relocation_kind(r_type: u32) -> Result<RelocationKind>;

    // Get string representation of a relocation specific for the architecture.
    fn rel_type_to_string(r_type: u32) -> Cow<'static, str>;

    /// Whether the architecture routes data addresses through a `.toc` section.
    fn supports_toc() -> bool {
        false
    }

    fn write_word(out: &mut [u8], value: u64) {
        out[..Self::WORD_SIZE].copy_from_slice(&value.to_le_bytes()[..Self::WORD_SIZE]);
    }

    fn read_word(bytes: &[u8]) -> u64 {
        let mut word = [0u8; 8];
        word[..Self::WORD_SIZE].copy_from_slice(&bytes[..Self::WORD_SIZE]);
        u64::from_le_bytes(word)
    }

    /// Copies a section's contents into the output image with architecture-specific rewriting.
    fn copy_section_contents(_section: &InputSection, _file: &File, _out: &mut [u8]) -> Result {
        // This function should not be called unless `IS_RISCV` is true, in which case this
        // function should be implemented.
        unreachable!();
    }
}
