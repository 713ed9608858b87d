//! Flash feed binary entrypoint.
//! Builds the request client, fetcher (with offline fallback), engine and
//! change detector, then runs the periodic refresh session until interrupted.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flash_feed::client::RequestClient;
use flash_feed::config;
use flash_feed::fallback::WithFallback;
use flash_feed::fetch::FlashFetcher;
use flash_feed::notify::{AlertPolicy, NotifierMux};
use flash_feed::session::FeedSession;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flash_feed=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(
        base_url = %cfg.api_base_url,
        page_size = cfg.page_size,
        refresh_ms = cfg.refresh_interval_ms,
        "starting feed session"
    );

    let client = RequestClient::new(cfg.api_base_url.clone(), cfg.request_config());
    let fetcher = FlashFetcher::new(client, cfg.feed_path.clone());
    let source = WithFallback::new(fetcher);

    let session = FeedSession::new(
        source,
        cfg.page_size,
        cfg.refresh_interval(),
        AlertPolicy::default(),
        NotifierMux::from_env(),
    );

    session.run().await;
    Ok(())
}
