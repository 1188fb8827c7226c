pub use anyhow::Context;

pub type Error = anyhow::Error;

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Constructs an `Error` from a format string.
#[macro_export]
macro_rules! error {
    ($($args:tt)*) => { ::anyhow::anyhow!($($args)*) };
}

/// Returns early with an `Error` built from a format string.
#[macro_export]
macro_rules! bail {
    ($($args:tt)*) => { ::anyhow::bail!($($args)*) };
}

/// Returns early with an error if a condition isn't satisfied.
#[macro_export]
macro_rules! ensure {
    ($($args:tt)*) => { ::anyhow::ensure!($($args)*) };
}

/// Emits a non-fatal diagnostic. Warnings don't stop the link.
pub fn warning(message: &str) {
    tracing::warn!("{message}");
}
