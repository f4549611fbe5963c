//! Call sites and the events emitted for them

use core::fmt;
use std::time::SystemTime;

use crate::namespace::segments;

/// Static description of a traced entry point
///
/// `#[traced]` builds these from `module_path!()` and the declaring type's
/// simple name. Hand-written call sites may use `.` separated paths as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite<'a> {
    module: &'a str,
    type_name: &'a str,
    method: &'a str,
    free: bool,
}

impl<'a> CallSite<'a> {
    /// Call site for a method declared on `type_name` inside `module`
    pub const fn new(module: &'a str, type_name: &'a str, method: &'a str) -> Self {
        Self {
            module,
            type_name,
            method,
            free: false,
        }
    }

    /// Call site for a free function; the module's last segment names it
    pub fn free_fn(module: &'a str, function: &'a str) -> Self {
        let type_name = segments(module).last().unwrap_or(module);
        Self {
            module,
            type_name,
            method: function,
            free: true,
        }
    }

    /// Module path the declaring type lives in
    pub const fn module(&self) -> &'a str {
        self.module
    }

    /// Simple name of the declaring type
    pub const fn type_name(&self) -> &'a str {
        self.type_name
    }

    /// Name of the method being entered
    pub const fn method(&self) -> &'a str {
        self.method
    }

    /// Whether this call site is a free function rather than a method
    pub const fn is_free_fn(&self) -> bool {
        self.free
    }

    /// Segments of the declaring type's fully qualified name
    pub(crate) fn qualified_segments(&self) -> impl Iterator<Item = &'a str> {
        let declaring = (!self.free).then_some(self.type_name);
        segments(self.module).chain(declaring)
    }

    /// Fully qualified name of the declaring type, `::` separated
    pub fn qualified_type(&self) -> String {
        self.qualified_segments().collect::<Vec<_>>().join("::")
    }
}

impl fmt::Display for CallSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.qualified_type(), self.method)
    }
}

/// A single trace record, consumed immediately by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEvent<'a> {
    /// Simple name of the declaring type; used as the sink tag
    pub type_name: &'a str,
    /// Method that was entered
    pub method: &'a str,
    /// When the call was intercepted
    pub timestamp: SystemTime,
}

impl<'a> CallEvent<'a> {
    /// Build the event for `call`, stamped with the current time
    pub fn from_call(call: &CallSite<'a>) -> Self {
        Self {
            type_name: call.type_name(),
            method: call.method(),
            timestamp: SystemTime::now(),
        }
    }

    /// Tag used to categorise the line
    pub const fn tag(&self) -> &'a str {
        self.type_name
    }

    /// Message body, `--> <method>`
    pub fn message(&self) -> String {
        format!("--> {}", self.method)
    }
}

impl fmt::Display for CallEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.type_name, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_call_site() {
        let call = CallSite::new("com.example.lib", "Foo", "bar");
        assert_eq!(call.type_name(), "Foo");
        assert_eq!(call.qualified_type(), "com::example::lib::Foo");
        assert_eq!(call.to_string(), "com::example::lib::Foo::bar");
        assert!(!call.is_free_fn());
    }

    #[test]
    fn test_free_fn_uses_module_name() {
        let call = CallSite::free_fn("nexum_apdu_core::transport", "connect");
        assert_eq!(call.type_name(), "transport");
        assert_eq!(call.qualified_type(), "nexum_apdu_core::transport");
        assert!(call.is_free_fn());
    }

    #[test]
    fn test_event_line() {
        let call = CallSite::new("com.example.lib", "Reader", "connect");
        let event = CallEvent::from_call(&call);
        assert_eq!(event.tag(), "Reader");
        assert_eq!(event.message(), "--> connect");
        assert_eq!(event.to_string(), "Reader --> connect");
    }
}
