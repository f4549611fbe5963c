//! Procedural macros for method-boundary tracing
//!
//! `#[traced]` is the compile-time half of `nexum-trace`: it prepends a call
//! to `TraceInterceptor::enter` to each public entry point of a library so
//! the interceptor can report the outermost call.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use proc_macro::TokenStream;
use syn::{Item, parse_macro_input};

mod args;
mod expand;
mod utils;

use args::TracedArgs;

/// Trace entry into a function or into the public methods of an impl block
///
/// - On an inherent `impl`, every `pub` method is traced. The impl's self
///   type (without generics) is the tag of each trace line.
/// - On a trait `impl`, every method is traced.
/// - On a free function, the enclosing module's name is the tag.
///
/// Arguments:
///
/// - `tracer = <expr>`: interceptor to use, any expression yielding
///   `&TraceInterceptor`. Defaults to `nexum_trace::global()`.
/// - `skip`: on a method inside a traced impl, leave that method alone.
///
/// `const fn` methods are never traced and `async fn` is rejected.
///
/// # Example
///
/// ```ignore
/// use std::sync::LazyLock;
/// use nexum_trace::{MemorySink, TraceInterceptor, traced};
///
/// static SINK: LazyLock<MemorySink> = LazyLock::new(MemorySink::new);
/// static TRACER: LazyLock<TraceInterceptor> = LazyLock::new(|| {
///     TraceInterceptor::builder(module_path!())
///         .debug(true)
///         .sink(SINK.clone())
///         .build()
///         .expect("valid namespace")
/// });
///
/// struct Reader;
///
/// #[traced(tracer = &TRACER)]
/// impl Reader {
///     pub fn connect(&self) -> bool {
///         self.status()
///     }
///
///     pub fn status(&self) -> bool {
///         true
///     }
/// }
///
/// assert!(Reader.connect());
/// assert_eq!(SINK.lines()[0].to_string(), "Reader --> connect");
/// assert_eq!(SINK.len(), 1);
/// ```
#[proc_macro_attribute]
pub fn traced(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as TracedArgs);
    let item = parse_macro_input!(item as Item);

    match expand::expand_item(args, item) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
