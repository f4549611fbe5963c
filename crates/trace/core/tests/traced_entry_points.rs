//! `#[traced]` applied to a small card-reader style library

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Barrier};
use std::thread;

use nexum_trace::{DiagnosticSink, MemorySink, SinkError, TraceInterceptor, traced};

mod card {
    use std::sync::{Arc, Barrier, OnceLock};

    use nexum_trace::{DiagnosticSink, MemorySink, SinkError, TraceInterceptor, traced};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CardError(pub u16);

    pub trait Transport {
        fn transmit(&mut self, command: &[u8]) -> Vec<u8>;
    }

    #[derive(Debug)]
    pub struct Reader {
        pub tracer: Arc<TraceInterceptor>,
        pub sent: usize,
    }

    #[traced(tracer = &self.tracer)]
    impl Reader {
        pub fn connect(&self) -> &'static str {
            self.status();
            self.private_status()
        }

        pub fn status(&self) -> &'static str {
            "present"
        }

        fn private_status(&self) -> &'static str {
            "present"
        }

        pub fn select(&self, aid: &[u8]) -> Result<u8, CardError> {
            if aid.is_empty() {
                return Err(CardError(0x6A82));
            }
            let status = self.status();
            Ok(status.len() as u8)
        }

        pub fn explode(&self) {
            self.status();
            panic!("card removed");
        }

        pub fn wait_then_status(&self, barrier: &Barrier) -> &'static str {
            barrier.wait();
            self.status()
        }

        #[traced(skip)]
        pub fn raw(&self) -> usize {
            self.sent
        }
    }

    #[traced(tracer = &self.tracer)]
    impl Transport for Reader {
        fn transmit(&mut self, command: &[u8]) -> Vec<u8> {
            self.sent += 1;
            let mut response = command.to_vec();
            response.extend_from_slice(&[0x90, 0x00]);
            response
        }
    }

    /// Library-owned sink; its trait methods are traced like any other.
    #[derive(Debug, Default)]
    pub struct CardLog {
        pub tracer: OnceLock<Arc<TraceInterceptor>>,
        pub lines: MemorySink,
    }

    #[traced(tracer = self.tracer.get().expect("tracer set before use"))]
    impl DiagnosticSink for CardLog {
        fn write_debug_line(&self, tag: &str, message: &str) -> Result<(), SinkError> {
            self.lines.write_debug_line(tag, message)
        }
    }

    pub mod utils {
        use std::sync::Arc;

        use nexum_trace::{TraceInterceptor, traced};

        use super::Reader;

        #[derive(Debug)]
        pub struct Helper {
            pub tracer: Arc<TraceInterceptor>,
        }

        #[traced(tracer = &self.tracer)]
        impl Helper {
            pub fn hex(&self, bytes: &[u8]) -> String {
                bytes.iter().map(|b| format!("{b:02X}")).collect()
            }

            pub fn check_presence(&self, reader: &Reader) -> &'static str {
                reader.status()
            }
        }
    }
}

mod other {
    use std::sync::Arc;

    use nexum_trace::{TraceInterceptor, traced};

    #[derive(Debug)]
    pub struct Wallet {
        pub tracer: Arc<TraceInterceptor>,
    }

    #[traced(tracer = &self.tracer)]
    impl Wallet {
        pub fn sign(&self) -> u8 {
            1
        }
    }
}

fn tracer(enabled: bool) -> (Arc<TraceInterceptor>, MemorySink) {
    let sink = MemorySink::new();
    let tracer = TraceInterceptor::builder("traced_entry_points::card")
        .exclude("utils")
        .debug(enabled)
        .sink(sink.clone())
        .build()
        .unwrap();
    (Arc::new(tracer), sink)
}

fn reader(tracer: &Arc<TraceInterceptor>) -> card::Reader {
    card::Reader {
        tracer: Arc::clone(tracer),
        sent: 0,
    }
}

fn rendered(sink: &MemorySink) -> Vec<String> {
    sink.lines().iter().map(ToString::to_string).collect()
}

#[test]
fn test_outermost_call_only() {
    let (tracer, sink) = tracer(true);
    let reader = reader(&tracer);

    assert_eq!(reader.connect(), "present");
    assert_eq!(rendered(&sink), ["Reader --> connect"]);

    reader.status();
    assert_eq!(rendered(&sink), ["Reader --> connect", "Reader --> status"]);
}

#[test]
fn test_disabled_emits_nothing() {
    let (tracer, sink) = tracer(false);
    let reader = reader(&tracer);

    reader.connect();
    reader.status();
    assert!(sink.is_empty());
}

#[test]
fn test_trait_impl_methods_are_traced() {
    let (tracer, sink) = tracer(true);
    let mut reader = reader(&tracer);

    use card::Transport;
    assert_eq!(reader.transmit(&[0x00, 0xA4]), [0x00, 0xA4, 0x90, 0x00]);
    assert_eq!(rendered(&sink), ["Reader --> transmit"]);
}

#[test]
fn test_skipped_method_is_not_traced() {
    let (tracer, sink) = tracer(true);
    let reader = reader(&tracer);

    assert_eq!(reader.raw(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_utils_not_traced_and_suppress_nested_calls() {
    let (tracer, sink) = tracer(true);
    let reader = reader(&tracer);
    let helper = card::utils::Helper {
        tracer: Arc::clone(&tracer),
    };

    assert_eq!(helper.hex(&[0xA0, 0x00]), "A000");
    assert_eq!(helper.check_presence(&reader), "present");
    assert!(sink.is_empty());
}

#[test]
fn test_outside_namespace_not_traced() {
    let (tracer, sink) = tracer(true);
    let wallet = other::Wallet {
        tracer: Arc::clone(&tracer),
    };

    assert_eq!(wallet.sign(), 1);
    assert!(sink.is_empty());
}

#[test]
fn test_results_unchanged_by_tracing() {
    for enabled in [false, true] {
        let (tracer, _sink) = tracer(enabled);
        let reader = reader(&tracer);

        assert_eq!(reader.select(&[0xA0]), Ok(7));
        assert_eq!(reader.select(&[]), Err(card::CardError(0x6A82)));
    }
}

#[test]
fn test_panic_propagates_and_depth_recovers() {
    for enabled in [false, true] {
        let (tracer, sink) = tracer(enabled);
        let reader = reader(&tracer);

        let result = panic::catch_unwind(AssertUnwindSafe(|| reader.explode()));
        assert!(result.is_err());

        reader.status();
        if enabled {
            assert_eq!(rendered(&sink), ["Reader --> explode", "Reader --> status"]);
        } else {
            assert!(sink.is_empty());
        }
    }
}

#[test]
fn test_concurrent_threads_trace_independently() {
    let (tracer, sink) = tracer(true);
    let reader = reader(&tracer);
    let barrier = Barrier::new(2);

    thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(|| reader.wait_then_status(&barrier));
        }
    });

    assert_eq!(
        rendered(&sink),
        ["Reader --> wait_then_status", "Reader --> wait_then_status"]
    );
}

struct Session {
    tracer: Arc<TraceInterceptor>,
}

// The test crate root is outside the traced namespace, so wrapping user code
// does not count as being inside the library.
#[traced(tracer = &self.tracer)]
impl Session {
    pub fn run(&self, reader: &card::Reader) -> &'static str {
        reader.connect()
    }
}

#[test]
fn test_user_wrapper_does_not_suppress_library_call() {
    let (tracer, sink) = tracer(true);
    let session = Session {
        tracer: Arc::clone(&tracer),
    };

    assert_eq!(session.run(&reader(&tracer)), "present");
    assert_eq!(rendered(&sink), ["Reader --> connect"]);
}

#[test]
fn test_traced_library_sink_does_not_recurse() {
    let log = Arc::new(card::CardLog::default());
    let tracer = Arc::new(
        TraceInterceptor::builder("traced_entry_points::card")
            .debug(true)
            .sink({
                let log = Arc::clone(&log);
                move |tag: &str, message: &str| -> Result<(), SinkError> {
                    log.write_debug_line(tag, message)
                }
            })
            .build()
            .unwrap(),
    );
    log.tracer.set(Arc::clone(&tracer)).unwrap();
    let reader = reader(&tracer);

    assert_eq!(reader.connect(), "present");
    assert_eq!(rendered(&log.lines), ["Reader --> connect"]);
    assert_eq!(tracer.dropped_lines(), 0);

    // Writing through the sink directly is an outermost library call.
    log.write_debug_line("Manual", "--> entry").unwrap();
    assert_eq!(
        rendered(&log.lines),
        ["Reader --> connect", "CardLog --> write_debug_line", "Manual --> entry"]
    );
}
