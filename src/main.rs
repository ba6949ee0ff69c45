//! roster entry point.
//!
//! Loads configuration, initializes logging, builds the resource service and
//! serves it until SIGTERM or Ctrl-C.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use roster::resource::{self, Collection, ResourceService};
use roster::{Config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(&config.logging.level);

    info!(
        prefix = %config.api.prefix,
        resource = %config.api.names.plural,
        seed = config.seed,
        "starting roster v{}",
        env!("CARGO_PKG_VERSION")
    );

    let collection = if config.seed {
        Collection::seeded(["John Doe", "Jane Doe"])
    } else {
        Collection::new()
    };
    let service = ResourceService::new(config.api.names.clone(), config.api.pagination, collection);
    let app = resource::routes(&config.api.prefix, service);

    Server::bind(config.server_addr()).serve(app).await?;

    Ok(())
}

/// `RUST_LOG` directives win; the configured level fills in the default.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
