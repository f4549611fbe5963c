//! Configuration options for trace interceptors

/// Configuration for a trace interceptor
///
/// The value is fixed once the interceptor is built; there is no way to flip
/// `debug_enabled` on a running interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Emit a trace line for each outermost call
    pub debug_enabled: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::from_build()
    }
}

impl TraceConfig {
    /// Create a new configuration from the build-time default
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration baked in at compile time by the `library-debug` feature
    pub const fn from_build() -> Self {
        Self {
            debug_enabled: cfg!(feature = "library-debug"),
        }
    }

    /// Configuration with tracing switched on
    pub const fn enabled() -> Self {
        Self {
            debug_enabled: true,
        }
    }

    /// Configuration with tracing switched off
    pub const fn disabled() -> Self {
        Self {
            debug_enabled: false,
        }
    }

    /// Set whether trace lines are emitted
    pub const fn with_debug_enabled(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }
}
