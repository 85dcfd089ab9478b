use dealramp::gateway::ShopifyGateway;
use dealramp::{CatalogGateway, Config, DealScanner, DealTracker, PollLoop};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let gateway: Arc<dyn CatalogGateway> = Arc::new(ShopifyGateway::new(
        config.shop_domain.clone(),
        config.admin_api_token.clone(),
    ));
    let scanner = DealScanner::new(gateway, config.price_increment, config.start_marker_mode);
    let poll_loop = PollLoop::new(scanner, config.poll_interval);

    // Stop the loop cleanly on ctrl-c
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        "Step-down recovery engine started for {}",
        config.shop_domain
    );

    poll_loop.run(DealTracker::new(), shutdown_rx).await;
}
