//! Interning of output sections. Each input section resolves, once, at construction, to the ID of
//! the output section that will absorb it; the ID is stable for the rest of the link.

use foldhash::fast::RandomState;
use hashbrown::HashMap;
use std::fmt::Display;
use std::sync::Mutex;

/// An ID for an output section. It's independent of section ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputSectionId(u32);

impl OutputSectionId {
    fn from_usize(raw: usize) -> Self {
        Self(raw as u32)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for OutputSectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.as_usize(), f)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct SectionKey<'data> {
    name: &'data [u8],
    sh_type: u32,
    sh_flags: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct SectionInfo<'data> {
    pub name: &'data [u8],
    pub sh_type: u32,
    pub sh_flags: u64,
}

#[derive(Default)]
struct Inner<'data> {
    ids: HashMap<SectionKey<'data>, OutputSectionId, RandomState>,
    infos: Vec<SectionInfo<'data>>,
}

/// The set of output sections, grown concurrently as input sections are ingested.
#[derive(Default)]
pub struct OutputSections<'data> {
    inner: Mutex<Inner<'data>>,
}

impl<'data> OutputSections<'data> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the output section that absorbs an input section with the given name, type and
    /// flags, creating it on first sight.
    pub fn id_for(&self, name: &'data [u8], sh_type: u32, sh_flags: u64) -> OutputSectionId {
        let name = output_section_name(name);
        // Flags that only describe the input encoding don't split output sections.
        let sh_flags = sh_flags
            & !u64::from(object::elf::SHF_COMPRESSED)
            & !u64::from(object::elf::SHF_GROUP);

        let mut inner = self.inner.lock().unwrap();
        let key = SectionKey {
            name,
            sh_type,
            sh_flags,
        };
        if let Some(id) = inner.ids.get(&key) {
            return *id;
        }
        let id = OutputSectionId::from_usize(inner.infos.len());
        inner.infos.push(SectionInfo {
            name,
            sh_type,
            sh_flags,
        });
        inner.ids.insert(key, id);
        id
    }

    pub fn name(&self, id: OutputSectionId) -> &'data [u8] {
        self.inner.lock().unwrap().infos[id.as_usize()].name
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Prefixes whose input sections all merge into the unsuffixed output section, e.g. `.text.foo`
/// into `.text`.
const MERGE_PREFIXES: &[&[u8]] = &[
    b".text.",
    b".data.rel.ro.",
    b".data.",
    b".rodata.",
    b".bss.rel.ro.",
    b".bss.",
    b".init_array.",
    b".fini_array.",
    b".tdata.",
    b".tbss.",
    b".gcc_except_table.",
    b".ctors.",
    b".dtors.",
];

/// Maps an input section name onto the name of the output section that absorbs it.
pub(crate) fn output_section_name(name: &[u8]) -> &[u8] {
    // Legacy compressed debug sections lose their z once decompressed.
    match name {
        b".zdebug_abbrev" => return b".debug_abbrev",
        b".zdebug_aranges" => return b".debug_aranges",
        b".zdebug_frame" => return b".debug_frame",
        b".zdebug_info" => return b".debug_info",
        b".zdebug_line" => return b".debug_line",
        b".zdebug_loc" => return b".debug_loc",
        b".zdebug_macinfo" => return b".debug_macinfo",
        b".zdebug_pubnames" => return b".debug_pubnames",
        b".zdebug_pubtypes" => return b".debug_pubtypes",
        b".zdebug_ranges" => return b".debug_ranges",
        b".zdebug_str" => return b".debug_str",
        b".zdebug_types" => return b".debug_types",
        _ => {}
    }
    for prefix in MERGE_PREFIXES {
        if name.starts_with(prefix) {
            return &prefix[..prefix.len() - 1];
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_merging() {
        let check: &[(&[u8], &[u8])] = &[
            (b".text.hot.foo", b".text"),
            (b".data.rel.ro.bar", b".data.rel.ro"),
            (b".data.baz", b".data"),
            (b".rodata.str1.1", b".rodata"),
            (b".zdebug_info", b".debug_info"),
            (b".toc", b".toc"),
            (b".mycustom", b".mycustom"),
        ];
        for (input, expected) in check {
            assert_eq!(output_section_name(input), *expected);
        }
    }

    #[test]
    fn interning_is_stable() {
        let sections = OutputSections::new();
        let a = sections.id_for(b".text.foo", object::elf::SHT_PROGBITS, 6);
        let b = sections.id_for(b".text.bar", object::elf::SHT_PROGBITS, 6);
        let c = sections.id_for(b".data", object::elf::SHT_PROGBITS, 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(sections.name(a), b".text");
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn compression_flag_does_not_split_sections() {
        let sections = OutputSections::new();
        let compressed = sections.id_for(
            b".zdebug_info",
            object::elf::SHT_PROGBITS,
            u64::from(object::elf::SHF_COMPRESSED),
        );
        let plain = sections.id_for(b".debug_info", object::elf::SHT_PROGBITS, 0);
        assert_eq!(compressed, plain);
    }
}
