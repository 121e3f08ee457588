use anyhow::Result;
use reqwest::Client;
use ridingmap::{
    boundary::load_boundaries,
    config::Config,
    fetch::fetch_page,
    map::{GeoJsonRenderer, Renderer},
    pipeline::build_map,
};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ridingmap=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;
    let palette = config.palette()?;
    let url = config.source_url()?;
    info!(
        url = %url,
        boundaries = %config.boundaries.display(),
        parties = palette.parties().len(),
        "configured"
    );

    // ─── 3) fetch projection page ────────────────────────────────────
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let page = fetch_page(&client, &url, &config.retry).await?;
    let timestamp = page.requested_at.format("%Y-%m-%d %H:%M:%S").to_string();

    // ─── 4) load boundaries ──────────────────────────────────────────
    let boundaries = load_boundaries(&config.boundaries, &config.name_field)?;

    // ─── 5) join + color ─────────────────────────────────────────────
    let output = build_map(&page.body, boundaries, &palette, &config, page.requested_at)?;
    if output.report.matched == 0 {
        warn!("no projection row matched any boundary; the map is all grey");
    }

    // ─── 6) write outputs ────────────────────────────────────────────
    let renderer = GeoJsonRenderer::new(&config.out_dir, &config.output_stem);
    for path in renderer.render(&output.map)? {
        info!(path = %path.display(), "wrote");
    }

    info!("Map generated successfully at {}", timestamp);
    Ok(())
}
