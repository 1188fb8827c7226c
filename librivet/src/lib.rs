//! Ingests the sections of input object files, scans their relocations to decide what each
//! reference demands of the dynamic linker (PLT entries, copy relocations, dynamic relocations),
//! then writes the finished section bytes with relocations applied. Compressed debug sections are
//! materialised on the way through. Undefined-reference diagnostics are aggregated per symbol and
//! reported in one batch.

pub mod arch;
pub mod args;
pub mod context;
pub mod diagnostics;
pub mod eh_frame;
pub mod elf;
pub mod elf_ppc64;
pub mod elf_riscv64;
pub mod elf_x86_64;
pub mod error;
pub mod input_section;
pub mod output_section_id;
pub mod symbol;
pub mod value_flags;

pub use crate::error::Error;
pub use crate::error::Result;
