//! Typed notification channel between the coordinator and its subscribers.
//!
//! Completions emit from worker threads. `emit()` invokes subscriber callbacks
//! immediately and also queues the event, so the owning control context can
//! consume updates on its own thread via `poll()` — one logical thread of
//! control sees all state changes in initiation order.
//!
//! Listener registration is explicit; ownership of whatever the callback
//! captures is the caller's responsibility.

use log::warn;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::Error;

/// Maximum queued events before the oldest half is evicted.
const MAX_QUEUE_SIZE: usize = 1000;

/// Coordinator state-change notifications.
#[derive(Debug, Clone)]
pub enum GalleryEvent {
    /// An initial fetch or refresh replaced the whole page list.
    DataReplaced,
    /// A load-more appended the page now at `section`.
    SectionAppended { section: usize },
    /// A page fetch failed. Loaded pages are unchanged.
    RequestFailed { error: Error },
}

type Callback = Arc<dyn Fn(&GalleryEvent) + Send + Sync>;

/// Notification channel handle. Cloning shares the subscriber list and queue.
#[derive(Clone, Default)]
pub struct GalleryEvents {
    subscribers: Arc<RwLock<Vec<Callback>>>,
    queue: Arc<Mutex<Vec<GalleryEvent>>>,
}

impl GalleryEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously on every emit.
    ///
    /// Callbacks run on whatever thread the fetch completion arrives on; use
    /// `poll()` instead when updates must land on one thread.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&GalleryEvent) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    /// Invoke subscriber callbacks and queue the event for `poll()`.
    pub fn emit(&self, event: GalleryEvent) {
        let subscribers = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        for callback in subscribers.iter() {
            callback(&event);
        }
        drop(subscribers);

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!(
                "Event queue full ({} events), evicting oldest {}",
                queue.len(),
                evict_count
            );
            queue.drain(0..evict_count);
        }
        queue.push(event);
    }

    /// Drain all queued events, in emit order.
    pub fn poll(&self) -> Vec<GalleryEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl std::fmt::Debug for GalleryEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryEvents")
            .field(
                "subscribers",
                &self.subscribers.read().map(|s| s.len()).unwrap_or(0),
            )
            .field("queue_len", &self.queue_len())
            .finish()
    }
}
