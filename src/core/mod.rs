//! Core engine modules - coordinator, events, image cache, workers
//!
//! These modules form the fetch-and-cache pipeline, independent of any
//! presentation layer.

pub mod coordinator;
pub mod events;
pub mod image_cache;
pub mod workers;

// Re-exports for convenience
pub use coordinator::GalleryCoordinator;
pub use events::{GalleryEvent, GalleryEvents};
pub use image_cache::{CacheStats, CachedImage, ImageCache};
pub use workers::Workers;
