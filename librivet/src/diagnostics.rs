//! Aggregation of undefined-reference diagnostics. References are recorded from scan tasks as they
//! run, then reported in one batch, grouped by symbol, so a symbol that's missing everywhere shows
//! up as one block instead of thousands of lines.

use crate::args::UnresolvedSymbols;
use crate::context::LinkContext;
use crate::error;
use crate::error::Result;
use foldhash::fast::RandomState;
use hashbrown::HashMap;
use itertools::Itertools;
use std::fmt::Write;
use std::sync::Mutex;

/// How many reference sites are printed per undefined symbol; the rest are summarised as a count.
pub(crate) const MAX_REPORTED_SITES: usize = 3;

/// Reference sites of undefined symbols, keyed by symbol name. Recorded concurrently; per-symbol
/// site order is the order the references were recorded in.
#[derive(Default)]
pub struct UndefErrors<'data> {
    map: Mutex<HashMap<&'data [u8], Vec<String>, RandomState>>,
}

impl<'data> UndefErrors<'data> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, symbol_name: &'data [u8], site: String) {
        self.map
            .lock()
            .unwrap()
            .entry(symbol_name)
            .or_default()
            .push(site);
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().unwrap().is_empty()
    }

    fn take(&self) -> HashMap<&'data [u8], Vec<String>, RandomState> {
        std::mem::take(&mut *self.map.lock().unwrap())
    }
}

/// Reports all undefined symbols recorded during the scan, then checkpoints. Keys are sorted so
/// the output doesn't depend on scan scheduling.
pub fn report_undef_errors(ctx: &LinkContext) -> Result {
    for (name, sites) in ctx
        .undef_errors
        .take()
        .into_iter()
        .sorted_by_key(|(name, _)| *name)
    {
        let name = String::from_utf8_lossy(name);
        let name = if ctx.args.demangle {
            format!("{:#}", rustc_demangle::demangle(&name))
        } else {
            name.into_owned()
        };

        let mut message = format!("undefined symbol: {name}\n");
        for site in sites.iter().take(MAX_REPORTED_SITES) {
            message.push_str(site);
        }
        if sites.len() > MAX_REPORTED_SITES {
            let _ = writeln!(
                message,
                ">>> referenced {} more times",
                sites.len() - MAX_REPORTED_SITES
            );
        }

        match ctx.args.unresolved_symbols {
            UnresolvedSymbols::Error => ctx.report_error(error!("{}", message.trim_end())),
            UnresolvedSymbols::Warn => crate::error::warning(message.trim_end()),
            UnresolvedSymbols::Ignore => {}
        }
    }

    ctx.checkpoint()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use bumpalo_herd::Herd;

    fn ctx_with(unresolved_symbols: UnresolvedSymbols) -> LinkContext<'static> {
        let herd = Box::leak(Box::new(Herd::new()));
        LinkContext::new(
            Args {
                unresolved_symbols,
                ..Args::default()
            },
            herd,
        )
    }

    fn record_sites(ctx: &LinkContext<'static>, name: &'static [u8], count: usize) {
        for i in 0..count {
            ctx.undef_errors.record(
                name,
                format!(">>> referenced by a{i}.c\n>>>               a{i}.o\n"),
            );
        }
    }

    #[test]
    fn report_truncates_to_three_sites() {
        let ctx = ctx_with(UnresolvedSymbols::Error);
        record_sites(&ctx, b"foo", 5);

        let message = format!("{:#}", report_undef_errors(&ctx).unwrap_err());
        assert!(message.starts_with("undefined symbol: foo\n"));
        assert_eq!(message.matches(">>> referenced by").count(), 3);
        assert!(message.contains(">>> referenced 2 more times"));
    }

    #[test]
    fn report_without_truncation() {
        let ctx = ctx_with(UnresolvedSymbols::Error);
        record_sites(&ctx, b"bar", 2);

        let message = format!("{:#}", report_undef_errors(&ctx).unwrap_err());
        assert_eq!(message.matches(">>> referenced by").count(), 2);
        assert!(!message.contains("more times"));
    }

    #[test]
    fn symbols_are_reported_in_name_order() {
        let ctx = ctx_with(UnresolvedSymbols::Error);
        record_sites(&ctx, b"zeta", 1);
        record_sites(&ctx, b"alpha", 1);

        let message = format!("{:#}", report_undef_errors(&ctx).unwrap_err());
        let alpha = message.find("undefined symbol: alpha").unwrap();
        let zeta = message.find("undefined symbol: zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn warn_and_ignore_modes_do_not_fail_the_link() {
        for mode in [UnresolvedSymbols::Warn, UnresolvedSymbols::Ignore] {
            let ctx = ctx_with(mode);
            record_sites(&ctx, b"foo", 4);
            assert!(report_undef_errors(&ctx).is_ok());
        }
    }

    #[test]
    fn demangles_rust_symbols() {
        let ctx = ctx_with(UnresolvedSymbols::Error);
        record_sites(&ctx, b"_ZN3std2io5stdio6_print17h1234567890abcdefE", 1);

        let message = format!("{:#}", report_undef_errors(&ctx).unwrap_err());
        assert!(message.contains("undefined symbol: std::io::stdio::_print"));
    }
}
