//! Pagination coordinator.
//!
//! Owns the ordered page list, the next-page cursor, and the image cache;
//! drives fetches through the gateway and notifies subscribers with typed
//! events. Fetch completions arrive on worker threads and mutate state under
//! one mutex, so updates stay serialized no matter where they complete.
//!
//! A generation counter guards against the refresh race: `refresh()` bumps it,
//! and every page completion compares the generation it captured at initiation
//! before touching state. A stale load-more can no longer append to a freshly
//! cleared page list.

use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::events::{GalleryEvent, GalleryEvents};
use crate::core::image_cache::{CachedImage, ImageCache};
use crate::decode::ImageDecoder;
use crate::error::Result;
use crate::gateway::{FetchGateway, FetchHandle, PageRequest};
use crate::photo::{PhotoRecord, SizeVariant};

#[derive(Debug, Default)]
struct GalleryState {
    /// Index 0 is the first page fetched since the last reset. Pages are
    /// appended, never reordered, never mutated after creation.
    pages: Vec<Vec<PhotoRecord>>,
    /// `None` means nothing fetched yet (the feed never exhausts).
    cursor: Option<PageRequest>,
}

/// Coordinates the paginated feed and the image cache.
pub struct GalleryCoordinator {
    state: Arc<Mutex<GalleryState>>,
    gateway: Arc<dyn FetchGateway>,
    cache: Arc<ImageCache>,
    decoder: Arc<dyn ImageDecoder>,
    events: GalleryEvents,
    generation: Arc<AtomicU64>,
}

impl GalleryCoordinator {
    pub fn new(
        gateway: Arc<dyn FetchGateway>,
        cache: Arc<ImageCache>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(GalleryState::default())),
            gateway,
            cache,
            decoder,
            events: GalleryEvents::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Notification channel: subscribe for immediate callbacks or poll from
    /// the owning control context.
    pub fn events(&self) -> &GalleryEvents {
        &self.events
    }

    pub fn image_cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Snapshot of the loaded pages, in fetch order.
    pub fn pages(&self) -> Vec<Vec<PhotoRecord>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pages
            .clone()
    }

    pub fn page_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pages
            .len()
    }

    /// Aspect ratios grouped per page, ready for the grid layout engine.
    pub fn aspect_ratios(&self) -> Vec<Vec<f32>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pages
            .iter()
            .map(|page| page.iter().map(PhotoRecord::aspect_ratio).collect())
            .collect()
    }

    /// Fetch page 1. On success the page list is replaced wholesale and
    /// `DataReplaced` fires; on failure pages are unchanged (empty on a failed
    /// first load) and `RequestFailed` fires.
    pub fn fetch_initial(&self) {
        self.fetch(PageRequest::Number(1), true);
    }

    /// Fetch the page identified by the cursor and append it. With no cursor
    /// yet this behaves exactly like `fetch_initial()` (defensive fallback).
    /// On success `SectionAppended` fires with the new page's index.
    pub fn fetch_next(&self) {
        let cursor = self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cursor
            .clone();
        match cursor {
            Some(request) => self.fetch(request, false),
            None => self.fetch_initial(),
        }
    }

    /// Clear the image cache and all pages, then fetch page 1 again. Any
    /// in-flight page fetch started before the refresh is dropped when it
    /// completes (stale generation).
    pub fn refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.pages.clear();
            state.cursor = None;
        }
        self.cache.clear();
        debug!("Refresh: cleared pages and image cache");
        self.fetch_initial();
    }

    fn fetch(&self, request: PageRequest, replace: bool) {
        let generation = self.generation.load(Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        let current_generation = Arc::clone(&self.generation);
        let events = self.events.clone();

        self.gateway.fetch_page(
            request,
            Box::new(move |result| match result {
                Ok(page) => {
                    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                    if current_generation.load(Ordering::SeqCst) != generation {
                        debug!("Dropping stale page completion (generation changed)");
                        return;
                    }
                    let event = if replace {
                        state.pages = vec![page.photos];
                        GalleryEvent::DataReplaced
                    } else {
                        state.pages.push(page.photos);
                        GalleryEvent::SectionAppended {
                            section: state.pages.len() - 1,
                        }
                    };
                    state.cursor = Some(PageRequest::Url(page.next_page));
                    drop(state);
                    events.emit(event);
                }
                Err(error) => {
                    if current_generation.load(Ordering::SeqCst) != generation {
                        debug!("Dropping stale page failure (generation changed)");
                        return;
                    }
                    events.emit(GalleryEvent::RequestFailed { error });
                }
            }),
        );
    }

    /// Resolve the image for `variant` of `photo`.
    ///
    /// Cache hits complete synchronously with `from_cache == true` and return
    /// no handle (nothing to cancel). Misses fetch the bytes, decode, store in
    /// the cache keyed by the canonical URL, and complete with
    /// `from_cache == false`.
    pub fn request_image<F>(
        &self,
        photo: &PhotoRecord,
        variant: SizeVariant,
        completion: F,
    ) -> Option<FetchHandle>
    where
        F: FnOnce(Result<CachedImage>, bool) + Send + 'static,
    {
        let url = variant.url_for(photo).to_string();

        if let Some(image) = self.cache.get(&url) {
            completion(Ok(image), true);
            return None;
        }

        let cache = Arc::clone(&self.cache);
        let decoder = Arc::clone(&self.decoder);
        let cache_url = url.clone();
        let handle = self.gateway.fetch_bytes(
            &url,
            Box::new(move |result| {
                match result.and_then(|bytes| decoder.decode(&bytes)) {
                    Ok(image) => {
                        let image: CachedImage = Arc::new(image);
                        cache.put(&cache_url, Arc::clone(&image));
                        completion(Ok(image), false);
                    }
                    Err(error) => completion(Err(error), false),
                }
            }),
        );
        Some(handle)
    }
}
