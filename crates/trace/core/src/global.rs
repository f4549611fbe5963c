//! Process-wide interceptor
//!
//! A library installs its interceptor once at startup. `#[traced]` entry
//! points without an explicit `tracer` argument use [`global`].

use std::sync::{LazyLock, OnceLock};

use tracing::debug;

use crate::error::TraceError;
use crate::interceptor::TraceInterceptor;

static INSTALLED: OnceLock<TraceInterceptor> = OnceLock::new();
static NOOP: LazyLock<TraceInterceptor> = LazyLock::new(TraceInterceptor::noop);

/// Install the process-wide interceptor
///
/// Only the first call succeeds; the interceptor and its configuration are
/// fixed from then on.
pub fn install(interceptor: TraceInterceptor) -> Result<(), TraceError> {
    let root = interceptor.root().map(ToString::to_string);
    let enabled = interceptor.is_enabled();
    INSTALLED
        .set(interceptor)
        .map_err(|_| TraceError::AlreadyInstalled)?;
    debug!(?root, enabled, "Installed process-wide trace interceptor");
    Ok(())
}

/// The installed interceptor, or a no-op one if none was installed
pub fn global() -> &'static TraceInterceptor {
    INSTALLED.get().unwrap_or_else(|| &*NOOP)
}

/// Whether [`install`] has succeeded
pub fn is_installed() -> bool {
    INSTALLED.get().is_some()
}
