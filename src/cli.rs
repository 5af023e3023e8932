use clap::Parser;

/// Photo feed browser core - demo runner
///
/// Drives the full pipeline (pagination, image cache, masonry layout) against
/// a deterministic offline fixture feed and prints the computed grid.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of feed pages to load (1 initial + N-1 load-mores)
    #[arg(short = 'n', long = "pages", value_name = "N", default_value = "3")]
    pub pages: usize,

    /// Photos per feed page
    #[arg(long = "per-page", value_name = "N", default_value = "20")]
    pub per_page: u32,

    /// Viewport width in points (column count: 5 if wider than tall, else 3)
    #[arg(long = "width", value_name = "PTS", default_value = "390")]
    pub viewport_width: f32,

    /// Viewport height in points
    #[arg(long = "height", value_name = "PTS", default_value = "844")]
    pub viewport_height: f32,

    /// API key forwarded to the gateway (the fixture feed accepts any
    /// non-empty key and returns 401 otherwise)
    #[arg(short = 'k', long = "api-key", value_name = "KEY", default_value = "demo-key")]
    pub api_key: String,

    /// Refresh after loading (clears pages + cache, refetches page 1)
    #[arg(long = "refresh")]
    pub refresh: bool,
}
