use anyhow::{Context, Result};
use devicefeed::{config::Config, store, DeviceField};
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: device-lookup <brand|name|device|model> <value>\n       device-lookup brands\n       device-lookup devices";

fn main() -> Result<()> {
    // logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("reading configuration")?;

    let mut args = env::args().skip(1);
    let command = args.next().context(USAGE)?;

    let index = store::load_index(&config.output_dir)
        .with_context(|| format!("loading sidecars from {}", config.output_dir.display()))?;
    debug!(devices = index.len(), brands = index.brands().len(), "index loaded");

    let json = match command.as_str() {
        "brands" => serde_json::to_string_pretty(index.brands())?,
        "devices" => serde_json::to_string_pretty(index.devices())?,
        field => {
            let field: DeviceField = field.parse().context(USAGE)?;
            let query = args.next();
            let matches = index.lookup(field, query.as_deref())?;
            serde_json::to_string_pretty(&matches)?
        }
    };

    println!("{}", json);
    Ok(())
}
