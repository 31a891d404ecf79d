//! The event subscription substrate: keyed broadcasts with three ways to
//! receive them, as spec §4.5 describes — a persistent handler, a one-shot
//! blocking wait, and a bounded (here: unbounded `tokio::sync::mpsc`) queue.
//!
//! The source's re-entrant subscriber lock becomes, per design note §9, a
//! copy-on-broadcast snapshot: [`EventBus::broadcast`] clones the handler
//! list out of the lock before calling any of them, so a handler is free to
//! (un)register — including itself — without deadlocking or corrupting the
//! iteration. Ordering (handlers, then the one-shot waiter, then queues, all
//! before the call returns) is exactly the order `broadcast` iterates in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};

use crate::error::Error;
use crate::registry::{PacketKind, WatchEvent};
use crate::transport::{TransportEvent, TransportOrigin, TransportPayloadKind};

/// Compile-time event key, replacing the source's duck-typed tuples (design
/// note §9): a watch-bound packet kind, a non-watch transport event tagged
/// by its origin and payload kind, or one of the two raw byte taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    Watch(PacketKind),
    Transport(TransportOrigin, TransportPayloadKind),
    RawInbound,
    RawOutbound,
}

/// The payload carried by one broadcast.
#[derive(Debug, Clone)]
pub enum Event {
    Watch(WatchEvent),
    Transport(TransportEvent),
    RawInbound(Arc<[u8]>),
    RawOutbound(Arc<[u8]>),
}

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Opaque handle returned by [`EventBus::register_handler`]; pass back to
/// [`EventBus::unregister`] to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct Subscribers {
    handlers: Vec<(HandlerId, Handler)>,
    waiters: Vec<oneshot::Sender<Event>>,
    queues: Vec<mpsc::UnboundedSender<Event>>,
}

pub struct EventBus {
    subscribers: Mutex<HashMap<EventKey, Subscribers>>,
    next_handler_id: std::sync::atomic::AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_handler_id: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Registers a persistent handler, invoked synchronously on the
    /// broadcaster's thread for every future matching event. A handler
    /// registered while a broadcast for `key` is in progress only takes
    /// effect for the *next* broadcast, since `broadcast` already snapshot
    /// the handler list before calling anything.
    pub fn register_handler<F>(&self, key: EventKey, f: F) -> HandlerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = HandlerId(
            self.next_handler_id
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        );
        self.subscribers
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .handlers
            .push((id, Arc::new(f)));
        id
    }

    /// Removes a handler by its id, wherever it's registered. Safe to call
    /// from inside that handler's own callback — the removal only affects
    /// the snapshot used by the *next* broadcast.
    pub fn unregister(&self, id: HandlerId) {
        let mut subs = self.subscribers.lock().unwrap();
        for bucket in subs.values_mut() {
            bucket.handlers.retain(|(h, _)| *h != id);
        }
    }

    /// Blocks until one broadcast matches `key`, then atomically
    /// unregisters. Must not be called from within a handler for the same
    /// key — the handler runs with the lock held indirectly by `broadcast`
    /// and nothing will ever satisfy the wait (documented deadlock hazard
    /// per spec §4.5).
    pub async fn wait_for_event(&self, key: EventKey, wait_timeout: Duration) -> Result<Event, Error> {
        let (tx, rx) = oneshot::channel();
        self.subscribers
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .waiters
            .push(tx);

        match timeout(wait_timeout, rx).await {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(_)) => Err(Error::Timeout),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Returns a queue that receives every future broadcast matching `key`.
    /// A queue only ever sees events broadcast after it was created.
    pub fn queue_events(&self, key: EventKey) -> EventQueue {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .queues
            .push(tx);
        EventQueue { rx }
    }

    /// Delivers `event` to every handler, then the one waiter (if any), then
    /// every queue registered for `key`, all synchronously before returning
    /// — spec §5's "all before the next frame is processed" ordering.
    pub fn broadcast(&self, key: EventKey, event: Event) {
        let (handlers, waiter, queues) = {
            let mut subs = self.subscribers.lock().unwrap();
            let Some(bucket) = subs.get_mut(&key) else {
                return;
            };
            let handlers = bucket.handlers.clone();
            let waiter = if bucket.waiters.is_empty() {
                None
            } else {
                Some(bucket.waiters.remove(0))
            };
            bucket.queues.retain(|q| !q.is_closed());
            let queues = bucket.queues.clone();
            (handlers, waiter, queues)
        };

        for (_, handler) in &handlers {
            handler(&event);
        }
        if let Some(waiter) = waiter {
            let _ = waiter.send(event.clone());
        }
        for queue in &queues {
            let _ = queue.send(event.clone());
        }
    }
}

/// Drain handle returned by [`EventBus::queue_events`]. `close` is
/// idempotent: dropping the handle (or calling it explicitly) simply stops
/// the channel from accepting further sends.
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventQueue {
    pub async fn get(&mut self, wait_timeout: Duration) -> Result<Event, Error> {
        match timeout(wait_timeout, self.rx.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(Error::Timeout),
            Err(_) => Err(Error::Timeout),
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn raw_event() -> Event {
        Event::RawInbound(Arc::from(&b"hi"[..]))
    }

    #[tokio::test]
    async fn one_shot_wait_fires_once_and_auto_unsubscribes() {
        let bus = Arc::new(EventBus::new());
        let key = EventKey::RawInbound;

        let waiter_bus = bus.clone();
        let waiter = tokio::spawn(async move {
            waiter_bus.wait_for_event(key, Duration::from_secs(1)).await
        });
        // Let the spawned task reach its registration and suspend on the
        // oneshot receive before we broadcast.
        tokio::task::yield_now().await;

        bus.broadcast(key, raw_event());
        assert!(waiter.await.unwrap().is_ok());

        // A second broadcast with no new waiter goes to no one.
        bus.broadcast(key, raw_event());
    }

    #[test]
    fn handler_unregistering_itself_is_safe() {
        let bus = EventBus::new();
        let key = EventKey::RawOutbound;
        let calls = Arc::new(AtomicUsize::new(0));

        // Registered, then removed before any broadcast: never called.
        let calls2 = calls.clone();
        let id = bus.register_handler(key, move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
        });
        bus.unregister(id);
        bus.broadcast(key, raw_event());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn queue_created_after_broadcast_does_not_see_it() {
        let bus = EventBus::new();
        let key = EventKey::RawInbound;
        bus.broadcast(key, raw_event());
        let queue = bus.queue_events(key);
        drop(queue);
    }
}
