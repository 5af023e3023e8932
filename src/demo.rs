//! Offline fixture feed for the demo binary.
//!
//! Serves deterministic JSON pages shaped like the production wire contract
//! and tiny synthesized PNG images, so the full pipeline runs without a
//! network. Page fetches require a non-empty `Authorization` header and get a
//! structured 401 body otherwise, mirroring the real feed.

use crate::gateway::{HttpResponse, Transport};
use image::ImageFormat;
use serde_json::json;
use std::io::Cursor;

const FEED_HOST: &str = "https://feed.photowall.invalid/curated";
const IMAGE_HOST: &str = "https://images.photowall.invalid";

/// Dimension table cycled by photo id, for aspect-ratio variety in the grid.
const DIMENSIONS: [(u32, u32); 5] = [
    (800, 600),
    (600, 900),
    (1000, 500),
    (700, 700),
    (500, 1200),
];

/// Deterministic in-process feed.
pub struct FixtureTransport {
    per_page: u32,
}

impl FixtureTransport {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Endpoint the demo gateway should be configured with.
    pub fn base_url() -> &'static str {
        FEED_HOST
    }

    fn page_body(&self, page: u32) -> Vec<u8> {
        let photos: Vec<_> = (0..self.per_page)
            .map(|i| {
                let id = u64::from(page) * 1000 + u64::from(i);
                let (width, height) = DIMENSIONS[id as usize % DIMENSIONS.len()];
                json!({
                    "id": id,
                    "width": width,
                    "height": height,
                    "url": format!("{}/photo/{}/", FEED_HOST, id),
                    "photographer": format!("Fixture Author {}", id % 7),
                    "src": {
                        "small": format!("{}/{}.png?h=130", IMAGE_HOST, id),
                        "medium": format!("{}/{}.png?h=350", IMAGE_HOST, id),
                        "large": format!("{}/{}.png?h=650", IMAGE_HOST, id),
                        "original": format!("{}/{}.png", IMAGE_HOST, id),
                    }
                })
            })
            .collect();

        let body = json!({
            "page": page,
            "per_page": self.per_page,
            "next_page": format!("{}?page={}&per_page={}", FEED_HOST, page + 1, self.per_page),
            "photos": photos,
        });
        body.to_string().into_bytes()
    }

    fn image_body() -> Vec<u8> {
        let image = image::DynamicImage::new_rgba8(4, 4);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("in-memory PNG encode");
        bytes
    }

    fn query_param(url: &str, name: &str) -> Option<u32> {
        let query = url.split_once('?')?.1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .and_then(|value| value.parse().ok())
    }
}

impl Transport for FixtureTransport {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, String> {
        if url.starts_with(IMAGE_HOST) {
            return Ok(HttpResponse {
                status: 200,
                body: Self::image_body(),
            });
        }

        let authorized = headers
            .iter()
            .any(|(name, value)| *name == "Authorization" && !value.is_empty());
        if !authorized {
            return Ok(HttpResponse {
                status: 401,
                body: br#"{"status": 401, "code": "unauthorized"}"#.to_vec(),
            });
        }

        let page = Self::query_param(url, "page").unwrap_or(1);
        Ok(HttpResponse {
            status: 200,
            body: self.page_body(page),
        })
    }
}
