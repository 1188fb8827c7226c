//! Per-symbol demand flags recorded during the relocation scan and consumed by the later passes
//! that lay out the PLT, copy-relocation BSS and dynamic symbol table.

use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ValueFlags: u8 {
        /// The symbol needs a PLT entry.
        const NEEDS_PLT = 1 << 0;

        /// The symbol needs a canonical PLT: its address, as observed by all objects, is the PLT
        /// entry in the executable.
        const NEEDS_CPLT = 1 << 1;

        /// The symbol's data is copied into our BSS at load time.
        const NEEDS_COPYREL = 1 << 2;

        /// The symbol must appear in the dynamic symbol table.
        const NEEDS_DYNSYM = 1 << 3;
    }
}

/// Demand flags shared between scan tasks. Updates are monotone: bits are only ever added.
#[derive(Debug, Default)]
pub struct AtomicValueFlags(AtomicU8);

impl AtomicValueFlags {
    pub fn new(flags: ValueFlags) -> Self {
        Self(AtomicU8::new(flags.bits()))
    }

    pub fn get(&self) -> ValueFlags {
        ValueFlags::from_bits_retain(self.0.load(Ordering::Relaxed))
    }

    /// ORs `flags` in and returns the previous value.
    pub fn fetch_or(&self, flags: ValueFlags) -> ValueFlags {
        ValueFlags::from_bits_retain(self.0.fetch_or(flags.bits(), Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_updates_are_monotone() {
        let flags = AtomicValueFlags::default();
        assert_eq!(flags.fetch_or(ValueFlags::NEEDS_PLT), ValueFlags::empty());
        assert_eq!(
            flags.fetch_or(ValueFlags::NEEDS_COPYREL),
            ValueFlags::NEEDS_PLT
        );
        assert_eq!(
            flags.get(),
            ValueFlags::NEEDS_PLT | ValueFlags::NEEDS_COPYREL
        );

        // ORing a bit that's already set changes nothing.
        let before = flags.get();
        flags.fetch_or(ValueFlags::NEEDS_PLT);
        assert_eq!(flags.get(), before);
    }
}
