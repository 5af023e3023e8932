//! PHOTOWALL - paginated photo-feed client core
//!
//! Two subsystems:
//! - a pure masonry grid layout engine ([`layout`]), and
//! - a paginated fetch-and-cache pipeline ([`core`], [`gateway`]) that pages a
//!   remote photo feed, caches decoded images, and notifies a subscriber with
//!   typed events.
//!
//! Rendering, gestures, and the socket-level HTTP transport are external
//! collaborators; the pipeline only needs a [`gateway::Transport`]
//! implementation and a [`decode::ImageDecoder`].

// Core engine (coordinator, cache, events, workers)
pub mod core;

// Model, layout, and fetch plumbing
pub mod decode;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod photo;

// Demo binary support
pub mod cli;
pub mod demo;

// Re-export commonly used types from core
pub use core::coordinator::GalleryCoordinator;
pub use core::events::{GalleryEvent, GalleryEvents};
pub use core::image_cache::{CacheStats, CachedImage, ImageCache};
pub use core::workers::Workers;

pub use decode::{ImageDecoder, StdDecoder};
pub use error::{ApiError, Error, Result};
pub use gateway::{
    FetchGateway, FetchHandle, GatewayConfig, HttpGateway, HttpResponse, PageRequest, Transport,
    UrlFactory,
};
pub use layout::{GridLayout, GridLayoutEngine, ItemAttributes, Rect};
pub use photo::{PageResponse, PhotoRecord, PhotoSource, SizeVariant};
