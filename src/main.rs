use anyhow::{Context, bail};
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use photowall::cli::Args;
use photowall::core::workers::{DEFAULT_WORKER_THREADS, Workers};
use photowall::demo::FixtureTransport;
use photowall::{
    GalleryCoordinator, GalleryEvent, GatewayConfig, GridLayoutEngine, HttpGateway, ImageCache,
    SizeVariant, StdDecoder,
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll the coordinator's event queue until one event arrives.
fn next_event(coordinator: &GalleryCoordinator) -> anyhow::Result<GalleryEvent> {
    let deadline = Instant::now() + EVENT_TIMEOUT;
    loop {
        if let Some(event) = coordinator.events().poll().into_iter().next() {
            return Ok(event);
        }
        if Instant::now() >= deadline {
            bail!("timed out waiting for a gallery event");
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.pages == 0 {
        bail!("--pages must be at least 1");
    }

    let workers = Arc::new(Workers::new(DEFAULT_WORKER_THREADS));
    let transport = Arc::new(FixtureTransport::new(args.per_page));
    let config = GatewayConfig {
        base_url: FixtureTransport::base_url().to_string(),
        api_key: Some(args.api_key.clone()),
        per_page: args.per_page,
    };
    let gateway = Arc::new(HttpGateway::new(transport, workers, config));
    let cache = Arc::new(ImageCache::new(256));
    let coordinator = GalleryCoordinator::new(gateway, Arc::clone(&cache), Arc::new(StdDecoder));

    // Page 1, then load-more for the rest.
    coordinator.fetch_initial();
    match next_event(&coordinator)? {
        GalleryEvent::DataReplaced => info!("Initial page loaded"),
        GalleryEvent::RequestFailed { error } => bail!("initial fetch failed: {}", error),
        other => bail!("unexpected event: {:?}", other),
    }

    for _ in 1..args.pages {
        coordinator.fetch_next();
        match next_event(&coordinator)? {
            GalleryEvent::SectionAppended { section } => {
                info!("Section {} appended", section);
            }
            GalleryEvent::RequestFailed { error } => bail!("load more failed: {}", error),
            other => bail!("unexpected event: {:?}", other),
        }
    }

    if args.refresh {
        coordinator.refresh();
        match next_event(&coordinator)? {
            GalleryEvent::DataReplaced => info!("Refreshed: back to a single page"),
            GalleryEvent::RequestFailed { error } => bail!("refresh failed: {}", error),
            other => bail!("unexpected event: {:?}", other),
        }
    }

    // Fetch one image twice to show the cache round trip.
    let pages = coordinator.pages();
    if let Some(photo) = pages.first().and_then(|page| page.first()) {
        for attempt in 0..2 {
            let (tx, rx) = crossbeam_channel::bounded(1);
            coordinator.request_image(photo, SizeVariant::Large, move |result, from_cache| {
                tx.send(result.map(|image| (image.width(), from_cache))).ok();
            });
            match rx.recv_timeout(EVENT_TIMEOUT).context("image fetch timed out")? {
                Ok((width, from_cache)) => info!(
                    "Image fetch {}: {}px wide, from_cache={}",
                    attempt, width, from_cache
                ),
                Err(error) => warn!("Image fetch {} failed: {}", attempt, error),
            }
        }
    }

    // Lay the loaded photos out and print the grid.
    let columns =
        GridLayoutEngine::column_count_for(args.viewport_width, args.viewport_height);
    let engine = GridLayoutEngine::default();
    let layout = engine.compute(&coordinator.aspect_ratios(), columns, args.viewport_width);

    println!(
        "{} pages, {} photos, {} columns, viewport {}x{}",
        pages.len(),
        layout.items.len(),
        columns,
        args.viewport_width,
        args.viewport_height
    );
    for attrs in layout.items.iter().take(12) {
        println!(
            "  [{}:{:>2}] x={:7.1} y={:8.1} {}x{:.0}",
            attrs.section,
            attrs.item,
            attrs.frame.x,
            attrs.frame.y,
            attrs.frame.width.round(),
            attrs.frame.height
        );
    }
    if layout.items.len() > 12 {
        println!("  ... {} more", layout.items.len() - 12);
    }
    println!(
        "content height {:.1} (footer {} at y={:.1})",
        layout.content_height, layout.footer.height, layout.footer.y
    );

    let stats = cache.stats();
    println!(
        "image cache: {} entries, {} hits / {} misses",
        cache.len(),
        stats.hits(),
        stats.misses()
    );

    Ok(())
}
