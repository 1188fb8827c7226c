//! Process-wide link state shared by every scan and write task. Passed explicitly; nothing here is
//! a global.

use crate::args::Args;
use crate::diagnostics::UndefErrors;
use crate::error;
use crate::error::Error;
use crate::error::Result;
use crate::output_section_id::OutputSections;
use bumpalo_herd::Herd;
use crossbeam_queue::SegQueue;
use itertools::Itertools;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

pub struct LinkContext<'data> {
    pub args: Args,

    /// Arena that owns decompressed section contents. It outlives every section; sections hold
    /// plain views into it.
    pub herd: &'data Herd,

    pub output_sections: OutputSections<'data>,

    /// Set when a dynamic relocation lands in read-only memory; drives the DT_TEXTREL entry.
    pub has_textrel: AtomicBool,

    pub undef_errors: UndefErrors<'data>,

    /// Diagnostics buffered for the next checkpoint. Errors here don't stop in-flight tasks; the
    /// link aborts at the end of the phase.
    errors: SegQueue<Error>,
}

impl<'data> LinkContext<'data> {
    pub fn new(args: Args, herd: &'data Herd) -> Self {
        Self {
            args,
            herd,
            output_sections: OutputSections::new(),
            has_textrel: AtomicBool::new(false),
            undef_errors: UndefErrors::new(),
            errors: SegQueue::new(),
        }
    }

    pub fn report_error(&self, error: Error) {
        self.errors.push(error);
    }

    pub fn has_reported_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn set_has_textrel(&self) {
        self.has_textrel.store(true, Ordering::Relaxed);
    }

    /// Flushes buffered diagnostics, failing the link if any errors accumulated since the last
    /// checkpoint.
    pub fn checkpoint(&self) -> Result {
        let mut errors = Vec::new();
        while let Some(error) = self.errors.pop() {
            errors.push(error);
        }
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(error!(
                "{}",
                errors.iter().map(|error| format!("{error:#}")).join("\n")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_drains_buffered_errors() {
        let herd = Herd::new();
        let ctx = LinkContext::new(Args::default(), &herd);
        assert!(ctx.checkpoint().is_ok());

        ctx.report_error(error!("first"));
        ctx.report_error(error!("second"));
        let combined = format!("{:#}", ctx.checkpoint().unwrap_err());
        assert!(combined.contains("first"));
        assert!(combined.contains("second"));

        // The queue is empty again afterwards.
        assert!(ctx.checkpoint().is_ok());
    }
}
