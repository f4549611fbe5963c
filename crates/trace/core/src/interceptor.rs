//! The trace interceptor
//!
//! A [`TraceInterceptor`] watches entry into the public operations of one
//! library namespace. Only the outermost call on each thread is reported;
//! calls the library makes into itself while that call runs stay silent.
//!
//! Excluded sub-namespaces are filtered at the call site only. A call into an
//! excluded namespace still counts as being inside the library, so anything
//! it calls back into the library is suppressed as nested. Utility code that
//! is reached without passing through a wrapped entry point is never seen at
//! all. The exclusion is therefore best-effort, not a guarantee.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::call::{CallEvent, CallSite};
use crate::config::TraceConfig;
use crate::depth::{self, EntryGuard};
use crate::error::TraceError;
use crate::namespace::Namespace;
use crate::sink::{DiagnosticSink, TracingSink};

/// Namespace a live interceptor watches
#[derive(Debug)]
struct Scope {
    root: Namespace,
    /// Key for the per-thread depth map
    root_key: Arc<str>,
    excluded: Vec<Namespace>,
}

impl Scope {
    fn contains(&self, call: &CallSite<'_>) -> bool {
        self.root.is_prefix_of(call.qualified_segments())
    }

    fn is_excluded(&self, call: &CallSite<'_>) -> bool {
        self.excluded
            .iter()
            .any(|ns| ns.is_prefix_of(call.qualified_segments()))
    }
}

/// Outermost-call tracer for a library namespace
pub struct TraceInterceptor {
    scope: Option<Scope>,
    config: TraceConfig,
    sink: Box<dyn DiagnosticSink>,
    dropped: AtomicU64,
    warned: AtomicBool,
}

impl fmt::Debug for TraceInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceInterceptor")
            .field("scope", &self.scope)
            .field("config", &self.config)
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

impl TraceInterceptor {
    /// Start building an interceptor for the namespace rooted at `root`
    pub fn builder(root: impl Into<String>) -> TraceInterceptorBuilder {
        TraceInterceptorBuilder::new(root)
    }

    /// Interceptor that watches no namespace and never emits
    pub fn noop() -> Self {
        Self {
            scope: None,
            config: TraceConfig::disabled(),
            sink: Box::new(TracingSink),
            dropped: AtomicU64::new(0),
            warned: AtomicBool::new(false),
        }
    }

    /// Root namespace, `None` for [`noop`](Self::noop)
    pub fn root(&self) -> Option<&Namespace> {
        self.scope.as_ref().map(|scope| &scope.root)
    }

    /// Excluded sub-namespaces
    pub fn excluded(&self) -> &[Namespace] {
        self.scope
            .as_ref()
            .map(|scope| scope.excluded.as_slice())
            .unwrap_or_default()
    }

    /// Configuration this interceptor was built with
    pub const fn config(&self) -> TraceConfig {
        self.config
    }

    /// Whether trace lines are emitted at all
    pub const fn is_enabled(&self) -> bool {
        self.config.debug_enabled
    }

    /// Number of lines lost to sink failures
    pub fn dropped_lines(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Whether `call` should produce a trace line if entered now
    ///
    /// True when the call's declaring type is inside the root namespace, is
    /// not inside an excluded sub-namespace, and the current thread is not
    /// already inside another call to this namespace.
    pub fn should_intercept(&self, call: &CallSite<'_>) -> bool {
        self.scope.as_ref().is_some_and(|scope| {
            scope.contains(call)
                && !scope.is_excluded(call)
                && depth::current(&scope.root_key) == 0
        })
    }

    /// Emit the trace line for `call` when tracing is enabled
    ///
    /// Sink failures, including panics, are swallowed and counted. A
    /// panicking sink still goes through the process panic hook, so the
    /// default hook prints its message to stderr on every failed write.
    pub fn on_intercept(&self, call: &CallSite<'_>) {
        if !self.config.debug_enabled {
            return;
        }

        let event = CallEvent::from_call(call);
        let message = event.message();
        let written = panic::catch_unwind(AssertUnwindSafe(|| {
            self.sink.write_debug_line(event.tag(), &message)
        }));

        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.record_drop(&err),
            Err(_) => self.record_drop(&"sink panicked"),
        }
    }

    /// Enter `call`, tracing it if it is an outermost call into the namespace
    ///
    /// Hold the returned guard for the duration of the call. Calls outside
    /// the namespace get a guard that tracks nothing.
    pub fn enter(&self, call: &CallSite<'_>) -> EntryGuard {
        let Some(scope) = &self.scope else {
            return EntryGuard::inert();
        };
        if !scope.contains(call) {
            return EntryGuard::inert();
        }

        let outermost = depth::current(&scope.root_key) == 0;
        // Depth goes up before the sink runs, so a sink that calls back into
        // the namespace is seen as nested.
        let guard = EntryGuard::enter(&scope.root_key);
        if outermost && !scope.is_excluded(call) {
            self.on_intercept(call);
        }
        guard
    }

    /// Run `f` as the body of `call`
    ///
    /// The value `f` returns (or the panic it raises) reaches the caller
    /// unchanged.
    pub fn intercept<R>(&self, call: &CallSite<'_>, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter(call);
        f()
    }

    fn record_drop(&self, reason: &dyn fmt::Display) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!(
                error = %reason,
                "Trace sink failed, dropping trace lines (panicking sinks still reach the panic hook)"
            );
        }
    }
}

enum Exclusion {
    Relative(String),
    Absolute(String),
}

/// Builder for [`TraceInterceptor`]
pub struct TraceInterceptorBuilder {
    root: String,
    excluded: Vec<Exclusion>,
    config: TraceConfig,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl fmt::Debug for TraceInterceptorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceInterceptorBuilder")
            .field("root", &self.root)
            .field("excluded", &self.excluded.len())
            .field("config", &self.config)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

impl TraceInterceptorBuilder {
    /// Create a builder for the namespace rooted at `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            excluded: Vec::new(),
            config: TraceConfig::default(),
            sink: None,
        }
    }

    /// Exclude a sub-namespace given relative to the root, e.g. `"utils"`
    pub fn exclude(mut self, relative: impl Into<String>) -> Self {
        self.excluded.push(Exclusion::Relative(relative.into()));
        self
    }

    /// Exclude a sub-namespace given as a full path
    ///
    /// [`build`](Self::build) fails if the path is not inside the root.
    pub fn exclude_absolute(mut self, path: impl Into<String>) -> Self {
        self.excluded.push(Exclusion::Absolute(path.into()));
        self
    }

    /// Set the configuration
    pub const fn config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set whether trace lines are emitted
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.config = self.config.with_debug_enabled(enabled);
        self
    }

    /// Send trace lines to `sink` instead of [`TracingSink`]
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validate the namespaces and build the interceptor
    pub fn build(self) -> Result<TraceInterceptor, TraceError> {
        let root = Namespace::parse(&self.root)?;

        let excluded = self
            .excluded
            .iter()
            .map(|exclusion| match exclusion {
                Exclusion::Relative(relative) => root.join(relative),
                Exclusion::Absolute(path) => {
                    let ns = Namespace::parse(path)?;
                    if root.contains(&ns) {
                        Ok(ns)
                    } else {
                        Err(TraceError::ExcludedOutsideRoot {
                            root: root.to_string(),
                            excluded: ns.to_string(),
                        })
                    }
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let excluded_paths: Vec<&str> = excluded.iter().map(Namespace::as_str).collect();
        debug!(
            root = %root,
            excluded = ?excluded_paths,
            enabled = self.config.debug_enabled,
            "Built trace interceptor"
        );

        let root_key = Arc::from(root.as_str());
        Ok(TraceInterceptor {
            scope: Some(Scope {
                root,
                root_key,
                excluded,
            }),
            config: self.config,
            sink: self.sink.unwrap_or_else(|| Box::new(TracingSink)),
            dropped: AtomicU64::new(0),
            warned: AtomicBool::new(false),
        })
    }
}
