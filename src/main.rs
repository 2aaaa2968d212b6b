use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twscan::{Config, Scanner, YahooFinanceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    info!(
        "Scanning {} symbols ({} / {})",
        config.watch_list.len(),
        config.scan.lookback,
        config.scan.interval
    );

    let source = Arc::new(YahooFinanceClient::with_fetch_budget(config.scan.fetch_timeout)?);
    let scanner = Scanner::new(source, config.scan.clone());

    let cancel = tokio_util::sync::CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let result = scanner
        .scan_until_cancelled(&config.watch_list, cancel)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
