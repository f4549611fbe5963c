//! Method-boundary tracing for library namespaces
//!
//! This crate emits one debug line per user-initiated call into a library,
//! such as an APDU transport or card executor crate. Calls the library makes
//! into itself while serving that call are not reported, and a designated
//! utility sub-namespace is skipped.
//!
//! ## Overview
//!
//! - [`TraceInterceptor`] decides whether a call is traced and writes the line
//! - [`CallSite`] names the entry point: module, declaring type and method
//! - [`DiagnosticSink`] receives `tag` / `--> method` lines; [`TracingSink`]
//!   forwards them to `tracing`
//! - [`TraceConfig`] carries the debug flag, defaulting to the
//!   `library-debug` cargo feature
//! - [`traced`] applies the interceptor to every public method of an impl
//!
//! Outermost-call detection uses a thread-local depth counter, so each
//! thread is tracked on its own. Async functions are not supported.
//!
//! ## Example
//!
//! ```
//! use nexum_trace::{CallSite, MemorySink, TraceInterceptor};
//!
//! let sink = MemorySink::new();
//! let tracer = TraceInterceptor::builder("nexum_apdu_core")
//!     .exclude("util")
//!     .debug(true)
//!     .sink(sink.clone())
//!     .build()?;
//!
//! let transmit = CallSite::new("nexum_apdu_core::card", "CardExecutor", "transmit");
//! let reset = CallSite::new("nexum_apdu_core::card", "CardExecutor", "reset");
//!
//! tracer.intercept(&transmit, || {
//!     // Nested call into the same library: not traced
//!     tracer.intercept(&reset, || ());
//! });
//!
//! assert_eq!(sink.lines().len(), 1);
//! assert_eq!(sink.lines()[0].to_string(), "CardExecutor --> transmit");
//! # Ok::<(), nexum_trace::TraceError>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod call;
pub mod config;
pub mod depth;
pub mod error;
pub mod global;
pub mod interceptor;
pub mod namespace;
pub mod sink;

pub use call::{CallEvent, CallSite};
pub use config::TraceConfig;
pub use depth::EntryGuard;
pub use error::{SinkError, TraceError};
pub use global::{global, install, is_installed};
pub use interceptor::{TraceInterceptor, TraceInterceptorBuilder};
pub use namespace::Namespace;
pub use sink::{DiagnosticSink, MemorySink, TraceLine, TracingSink};

#[cfg(feature = "macros")]
pub use nexum_trace_macros::traced;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        CallSite, DiagnosticSink, TraceConfig, TraceError, TraceInterceptor, global, install,
    };

    #[cfg(feature = "macros")]
    pub use crate::traced;
}
