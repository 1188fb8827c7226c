//! Link-mode and policy switches consumed by the section engine. Command-line parsing lives in the
//! driver; by the time these reach us they're plain data.

/// What kind of output file we're producing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    SharedObject,
    PositionIndependentExecutable,
    PositionDependentExecutable,
}

impl OutputKind {
    /// Returns whether the output can be loaded at an arbitrary base address.
    pub fn is_relocatable(self) -> bool {
        !matches!(self, OutputKind::PositionDependentExecutable)
    }
}

/// How references to symbols that no input file defines should be treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnresolvedSymbols {
    Error,
    Warn,
    Ignore,
}

#[derive(Debug)]
pub struct Args {
    pub output_kind: OutputKind,

    /// `-z text`: reject dynamic relocations in read-only sections.
    pub z_text: bool,

    /// `-z copyreloc` (on by default): permit copy relocations for direct references to imported
    /// data from a position-dependent executable.
    pub z_copyreloc: bool,

    pub warn_textrel: bool,

    pub demangle: bool,

    /// `--pack-dyn-relocs=relr`: emit eligible relative relocations in the compact RELR format.
    pub pack_dyn_relocs_relr: bool,

    pub unresolved_symbols: UnresolvedSymbols,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::PositionDependentExecutable,
            z_text: false,
            z_copyreloc: true,
            warn_textrel: false,
            demangle: true,
            pack_dyn_relocs_relr: false,
            unresolved_symbols: UnresolvedSymbols::Error,
        }
    }
}
