// ── Event multiplexer ──
//
// One pull loop per client. Each message is decoded, its `type` read, and
// delivered to the global listeners followed by the listeners registered
// for that type, all in registration order. A listener that fails or
// panics is logged and skipped; nothing a listener does can stop the loop.
// The only exit is end-of-stream from the message source.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use stasis_api::MessageSource;
use tracing::{debug, error, warn};

use crate::client::Client;
use crate::error::CoreError;

/// What a listener reports back. Errors are logged, never propagated.
pub type ListenerResult = Result<(), CoreError>;

/// A registered callback, type-erased.
pub type EventListener =
    Arc<dyn Fn(Arc<Value>) -> BoxFuture<'static, ListenerResult> + Send + Sync>;

// ── Listener table ──────────────────────────────────────────────────

/// Registration-ordered listeners. Only ever grows.
#[derive(Default)]
pub(crate) struct ListenerTable {
    global: Vec<EventListener>,
    by_type: HashMap<String, Vec<EventListener>>,
}

impl ListenerTable {
    pub(crate) fn add_global(&mut self, listener: EventListener) {
        self.global.push(listener);
    }

    pub(crate) fn add_typed(&mut self, event_type: &str, listener: EventListener) {
        self.by_type
            .entry(event_type.to_owned())
            .or_default()
            .push(listener);
    }

    /// Snapshot of everything that should see an event of `event_type`:
    /// globals first, then type listeners.
    fn delivery_list(&self, event_type: &str) -> Vec<EventListener> {
        let typed = self.by_type.get(event_type).map_or(&[][..], Vec::as_slice);
        self.global.iter().chain(typed).cloned().collect()
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// Result of handling one raw message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a JSON object with a string `type`; discarded.
    Malformed,
    Delivered { listeners: usize, failures: u64 },
}

/// Counters for one `run`, returned at end-of-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub messages: u64,
    pub malformed: u64,
    pub listener_failures: u64,
}

impl Client {
    // ── Registration ─────────────────────────────────────────────────

    /// Listen for one event type. The callback receives the decoded event.
    ///
    /// Registration during dispatch takes effect from the next message.
    pub fn on_event<F, Fut>(&self, event_type: &str, listener: F)
    where
        F: Fn(Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.add_listener(event_type, Arc::new(move |event: Arc<Value>| listener(event).boxed()));
    }

    /// Listen for every event, regardless of type.
    pub fn on_any_event<F, Fut>(&self, listener: F)
    where
        F: Fn(Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_global(Arc::new(move |event: Arc<Value>| listener(event).boxed()));
    }

    pub(crate) fn add_listener(&self, event_type: &str, listener: EventListener) {
        debug!(event_type, "registering listener");
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_typed(event_type, listener);
    }

    // ── Dispatch loop ────────────────────────────────────────────────

    /// Pull from `source` until it reports end-of-stream.
    pub async fn run_with<S: MessageSource>(&self, mut source: S) -> RunStats {
        let mut stats = RunStats::default();
        while let Some(raw) = source.next_message().await {
            stats.messages += 1;
            match self.dispatch(&raw).await {
                Dispatch::Malformed => stats.malformed += 1,
                Dispatch::Delivered { failures, .. } => {
                    stats.listener_failures += failures;
                }
            }
        }
        debug!(messages = stats.messages, "message source exhausted");
        stats
    }

    /// Decode one raw message and deliver it.
    pub async fn dispatch(&self, raw: &str) -> Dispatch {
        let Some((event_type, event)) = decode(raw) else {
            return Dispatch::Malformed;
        };

        // Snapshot before delivery; the lock is never held across an await.
        let listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .delivery_list(&event_type);

        if listeners.is_empty() {
            debug!(event_type = %event_type, "no listeners");
        }

        let mut failures = 0_u64;
        for listener in &listeners {
            let call = AssertUnwindSafe(async { listener(Arc::clone(&event)).await });
            match call.catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!(event_type = %event_type, error = %e, event = %event, "event listener failed");
                }
                Err(panic) => {
                    failures += 1;
                    error!(
                        event_type = %event_type,
                        panic = panic_message(panic.as_ref()),
                        event = %event,
                        "event listener panicked"
                    );
                }
            }
        }

        Dispatch::Delivered {
            listeners: listeners.len(),
            failures,
        }
    }
}

/// `(type, event)` for a well-formed message, `None` (logged) otherwise.
fn decode(raw: &str) -> Option<(String, Arc<Value>)> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, message = raw, "discarding undecodable event message");
            return None;
        }
    };
    if !value.is_object() {
        warn!(message = raw, "discarding event message that is not a JSON object");
        return None;
    }
    let Some(event_type) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        warn!(message = raw, "discarding event message without a type");
        return None;
    };
    Some((event_type, Arc::new(value)))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
