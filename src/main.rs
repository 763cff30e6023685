use alpaca_daily::cli::{Cli, Commands};
use alpaca_daily::config::Config;
use alpaca_daily::store::CsvBarStore;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = alpaca_daily::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Check(args) => {
            tracing::info!("Running broker connectivity check");
            args.execute(&config).await?;
        }
        Commands::Run(args) => {
            tracing::info!("Starting pipeline run");
            args.execute(&config).await?;
        }
        Commands::Status => {
            let store = CsvBarStore::new(&config.data.data_dir);
            let portfolio = &config.strategy.default_portfolio;

            println!("alpaca-daily status");
            println!("  Data dir: {}", config.data.data_dir.display());
            println!("  Portfolio: {portfolio}");
            if let Some(symbols) = config.portfolio(portfolio) {
                for symbol in symbols {
                    match store.last_timestamp(symbol) {
                        Ok(Some(ts)) => println!("  {symbol}: last bar {ts}"),
                        Ok(None) => println!("  {symbol}: no local data"),
                        Err(e) => println!("  {symbol}: unreadable store ({e})"),
                    }
                }
            }
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Trading API: {}", config.broker.trading_url);
            println!("  Data API: {}", config.broker.data_url);
            println!(
                "  Window: lookback={}d, end buffer={}d",
                config.data.lookback_days_if_missing, config.data.end_buffer_days
            );
            println!(
                "  Thresholds: up={}, down={}",
                config.strategy.up_threshold, config.strategy.down_threshold
            );
            println!(
                "  Trading: notional=${}, allow_short={}",
                config.trading.notional_usd, config.trading.allow_short
            );
            println!("  Portfolios: {:?}", config.portfolios.keys());
        }
    }

    Ok(())
}
