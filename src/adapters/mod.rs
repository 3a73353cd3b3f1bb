//! External sink adapters and their registry
//!
//! An adapter forwards log records to a platform or third-party logging
//! system. Delivery is best-effort and fire-and-forget: dispatch runs
//! synchronously in registration order, a misbehaving adapter is isolated,
//! and nothing is retried.

use crate::core::record::LogRecord;
use parking_lot::Mutex;
use std::sync::Arc;

/// Capability interface for an external log sink
///
/// Implementations are registered at runtime; the pipeline treats them all
/// alike.
///
/// # Example
///
/// ```
/// use diaglog::adapters::{AdapterRegistry, LogAdapter};
/// use diaglog::core::LogRecord;
///
/// struct StderrAdapter;
///
/// impl LogAdapter for StderrAdapter {
///     fn log(&self, record: &LogRecord) {
///         eprintln!("{}: {}", record.category, record.message);
///     }
/// }
///
/// let registry = AdapterRegistry::new();
/// registry.register(StderrAdapter);
/// ```
pub trait LogAdapter: Send + Sync {
    fn log(&self, record: &LogRecord);
}

/// Mutation-guarded registry of adapter instances
///
/// Cloneable handle with a defined lifecycle: create it at process start,
/// pass clones to the loggers that should dispatch through it, drop it at
/// shutdown. Not a process-wide static.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Arc<Mutex<Vec<Arc<dyn LogAdapter>>>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter; it receives records after all earlier ones
    pub fn register<A: LogAdapter + 'static>(&self, adapter: A) {
        self.adapters.lock().push(Arc::new(adapter));
    }

    /// Remove every registered adapter
    pub fn clear(&self) {
        self.adapters.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.lock().is_empty()
    }

    /// Deliver a record to every adapter in registration order
    ///
    /// **Per-adapter panic isolation**: each call is wrapped in
    /// `catch_unwind` so one failing adapter cannot abort dispatch to the
    /// adapters registered after it.
    pub fn dispatch(&self, record: &LogRecord) {
        // Snapshot under the lock, dispatch outside it, so an adapter that
        // logs (or registers) cannot deadlock the registry.
        let adapters: Vec<Arc<dyn LogAdapter>> = self.adapters.lock().clone();

        for (idx, adapter) in adapters.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                adapter.log(record)
            }));

            if let Err(panic_info) = result {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER WARNING] Adapter #{} panicked: {}. \
                     Other adapters continue to function.",
                    idx, panic_msg
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record() -> LogRecord {
        LogRecord::new("com.example", "Test", Level::Info, "hello", "test.rs", 1)
    }

    struct CountingAdapter(Arc<AtomicUsize>);

    impl LogAdapter for CountingAdapter {
        fn log(&self, _record: &LogRecord) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingAdapter;

    impl LogAdapter for PanickingAdapter {
        fn log(&self, _record: &LogRecord) {
            panic!("adapter blew up");
        }
    }

    #[test]
    fn test_register_and_dispatch() {
        let registry = AdapterRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.register(CountingAdapter(count.clone()));

        registry.dispatch(&record());
        registry.dispatch(&record());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_adapter_is_isolated() {
        let registry = AdapterRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.register(PanickingAdapter);
        registry.register(CountingAdapter(count.clone()));

        registry.dispatch(&record());

        // The adapter registered after the panicking one still ran
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = AdapterRegistry::new();
        registry.register(PanickingAdapter);
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());

        // Dispatch against an empty registry is a no-op
        registry.dispatch(&record());
    }

    #[test]
    fn test_clone_shares_registrations() {
        let registry = AdapterRegistry::new();
        let clone = registry.clone();
        let count = Arc::new(AtomicUsize::new(0));

        registry.register(CountingAdapter(count.clone()));
        clone.dispatch(&record());

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
