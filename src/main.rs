use anyhow::{Context, Result};
use dottraffic::{cache, DatasetPaths, LoadOutcome};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve paths: optional YAML file, else defaults ─────────
    let paths = match env::args().nth(1) {
        Some(cfg) => DatasetPaths::from_yaml_file(&cfg)
            .with_context(|| format!("reading path config {}", cfg))?,
        None => DatasetPaths::default(),
    };
    info!(?paths, "dataset paths");

    // ─── 3) load, rebuilding the cache if needed ─────────────────────
    let outcome = cache::load(&paths).context("loading traffic dataset")?;
    if let LoadOutcome::Rebuilt { cause, .. } = &outcome {
        info!(%cause, "cache was rebuilt from raw source");
    }
    let data = outcome.into_data();

    // ─── 4) summary ──────────────────────────────────────────────────
    info!(
        rows = data.traffic.num_rows(),
        columns = data.traffic.num_columns(),
        "traffic table"
    );
    info!(
        rows = data.station.num_rows(),
        columns = data.station.num_columns(),
        "station table"
    );
    for (feature, map) in data.mappings.iter() {
        info!(feature, entries = map.len(), "mapping");
    }

    info!("all done");
    Ok(())
}
