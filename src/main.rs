use anyhow::{Context, Result};
use devicefeed::{config::Config, fetch, registry, store};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env().context("reading configuration")?;
    info!(url = %config.feed_url, output = %config.output_dir.display(), "configured");
    let client = fetch::build_client(&config)?;

    // ─── 3) fetch, decode & publish ──────────────────────────────────
    let registry = registry::global();
    let report = fetch::refresh(registry, &client, &config).await?;
    if report.dropped() > 0 {
        warn!(
            malformed = report.malformed,
            blank = report.blank,
            "dropped rows while decoding"
        );
    }

    let index = registry.snapshot();
    info!("{} devices", index.len());
    info!("{} brands", index.brands().len());

    // ─── 4) persist sidecars ─────────────────────────────────────────
    store::write_index(&config.output_dir, &index)?;

    info!("all done");
    Ok(())
}
