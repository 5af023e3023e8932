//! Photo model and the wire contract of the paginated feed.
//!
//! A page response carries the photos plus a `next_page` URL that becomes the
//! cursor for the following fetch. Records are immutable once decoded and are
//! only dropped when their owning page is cleared on reset.

use serde::{Deserialize, Serialize};

/// URLs of the four stored renditions of a photo.
///
/// Distinct renditions of the same photo are distinct cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSource {
    pub small: String,
    pub medium: String,
    pub large: String,
    pub original: String,
}

/// One photo as returned by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Server-assigned unique id.
    pub id: u64,
    /// Pixel width of the original image.
    pub width: u32,
    /// Pixel height of the original image.
    pub height: u32,
    /// Photo page URL (attribution link).
    pub url: String,
    pub photographer: String,
    pub src: PhotoSource,
}

impl PhotoRecord {
    /// Height/width ratio consumed by the grid layout.
    ///
    /// Degenerate dimensions fall back to 1 (square) instead of failing.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.height as f32 / self.width as f32
    }
}

/// Which rendition an image request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeVariant {
    Small,
    Medium,
    /// The rendition the gallery grid displays.
    Large,
    Original,
}

impl SizeVariant {
    /// Canonical image URL for this rendition of `photo`.
    pub fn url_for<'a>(&self, photo: &'a PhotoRecord) -> &'a str {
        match self {
            SizeVariant::Small => &photo.src.small,
            SizeVariant::Medium => &photo.src.medium,
            SizeVariant::Large => &photo.src.large,
            SizeVariant::Original => &photo.src.original,
        }
    }
}

/// One page of the feed.
///
/// The feed in scope always returns `next_page`, so exhaustion is not modeled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageResponse {
    pub next_page: String,
    pub photos: Vec<PhotoRecord>,
}
