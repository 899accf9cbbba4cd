use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rankwatch_api::{router, AppState};
use rankwatch_common::Config;
use rankwatch_tracker::{
    CheckSettings, CheckTrigger, MemoryStore, PgRankStore, RankChecker, RankStore,
    ScrapingdogFetcher,
};
use scrapingdog_client::ScrapingdogClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rankwatch=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn RankStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pg = PgRankStore::connect(url).await?;
            pg.migrate().await?;
            info!("Connected to Postgres, migrations applied");
            Arc::new(pg)
        }
        None => {
            warn!("DATABASE_URL not set, rank data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.provider_key().is_none() {
        warn!("SCRAPINGDOG_API_KEY missing or placeholder, rank checks will be refused");
    }
    let client = ScrapingdogClient::with_timeout(
        config.provider_key().unwrap_or_default().to_string(),
        config.serp_timeout,
    )?
    .country(config.serp_country.clone());

    let checker = Arc::new(RankChecker::new(
        store.clone(),
        Arc::new(ScrapingdogFetcher::new(client)),
        CheckSettings {
            pacing: config.pacing,
            match_policy: config.match_policy,
        },
    ));
    let (trigger, _worker) = CheckTrigger::spawn(checker);

    let app = router(Arc::new(AppState::new(store, trigger)));

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Rank tracker API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
