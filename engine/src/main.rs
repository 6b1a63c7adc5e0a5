//! Wholesale pipeline - batch runner
//!
//! Fetches the marketplace snapshot, fulfills NEW orders, prints the order
//! metrics and the next-month demand forecast per region.

use chrono::Utc;
use shared::{sales_by_option, YearMonth};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wholesale_pipeline::external::{load_snapshot, DryRunRequests, MarketplaceClient};
use wholesale_pipeline::services::{
    ForecastOrchestrator, FulfillmentEngine, MetricsAggregator, SalesSeriesBuilder, VarModel,
};
use wholesale_pipeline::{Config, LogFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let (text, json) = match config.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wholesale_pipeline=info,wfp_run=info,reqwest=warn".into()),
        )
        .with(text)
        .with(json)
        .init();

    tracing::info!("Starting wholesale pipeline run");
    tracing::info!("Environment: {}", config.environment);

    let mut client = MarketplaceClient::new(&config.api);
    let (catalog, orders) = load_snapshot(&client, config.brand_id.as_deref()).await?;

    let engine = FulfillmentEngine::new(config.fulfillment.unresolved_item_policy);
    let outcome = if config.dry_run {
        tracing::info!("Dry run: requests are recorded, not sent");
        let mut sink = DryRunRequests::new();
        engine.process(catalog, orders, &mut sink).await
    } else {
        engine.process(catalog, orders, &mut client).await
    };
    let run = outcome?;

    let metrics = MetricsAggregator::new(&run.catalog, &run.orders).report();
    println!("{}", metrics);

    let as_of = config.forecast.as_of(YearMonth::of(&Utc::now().date_naive()))?;
    let sales = sales_by_option(&run.orders);
    let matrices = SalesSeriesBuilder::new(as_of).build(&sales);
    let forecasts = ForecastOrchestrator::new(VarModel::new()).forecast_all(&matrices);
    print!("{}", forecasts);

    tracing::info!(
        groups = matrices.len(),
        forecast = forecasts.available().count(),
        "Run completed"
    );
    Ok(())
}
