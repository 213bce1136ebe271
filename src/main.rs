use clap::{Parser, Subcommand, builder::styling};
use eyre::{Context, Result, eyre};
use medallion_etl::{
    LoadResult, PipelineConfig,
    cli::{self, Stores},
    silver::parse_timestamp,
};
use owo_colors::OwoColorize;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Medallion: moves task events from the raw landing zone through a clean silver layer into the gold table, at most once per watermark
#[derive(Parser)]
#[command(name = "medallion", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the silver layer from raw events
    Silver,

    /// Incrementally load the silver layer into the gold table
    Gold,

    /// Run the silver and gold jobs back to back
    Run,

    /// Inspect or bootstrap the pipeline watermark
    Watermark {
        #[command(subcommand)]
        action: WatermarkAction,
    },
}

#[derive(Subcommand)]
enum WatermarkAction {
    /// Print the current watermark
    Show,

    /// Create the watermark row for a pipeline that has never been loaded
    Init {
        /// Timestamp to start from, e.g. 2023-12-31T00:00:00
        timestamp: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = dotenvy::from_filename(&cli.env) {
        if !e.not_found() {
            return Err(e).with_context(|| format!("Failed to load {}", cli.env));
        }
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let config = PipelineConfig::from_env().context("Failed to load pipeline configuration")?;
    let stores = Stores::local(&config);
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Silver => {
            silver(&config, &stores).await?;
        }
        Commands::Gold => {
            gold(&config, &stores).await?;
        }
        Commands::Run => {
            silver(&config, &stores).await?;
            gold(&config, &stores).await?;
        }
        Commands::Watermark { action } => match action {
            WatermarkAction::Show => match cli::show_watermark(&config, &stores).await? {
                Some(watermark) => log::info!(
                    "Watermark for {}: {}",
                    config.pipeline_name.bright_black(),
                    watermark.cyan()
                ),
                None => log::warn!(
                    "No watermark for {}, run `medallion watermark init <timestamp>`",
                    config.pipeline_name.bright_black()
                ),
            },
            WatermarkAction::Init { timestamp } => {
                let watermark = parse_timestamp(&timestamp)
                    .ok_or_else(|| eyre!("Invalid timestamp: {}", timestamp))?;
                cli::init_watermark(&config, &stores, watermark)
                    .await
                    .context("Failed to initialize watermark")?;
                log::info!(
                    "✓ Watermark for {} set to {}",
                    config.pipeline_name.bright_black(),
                    watermark.cyan()
                );
            }
        },
    }

    Ok(())
}

async fn silver(config: &PipelineConfig, stores: &Stores) -> Result<()> {
    let count = cli::run_silver(config, stores)
        .await
        .context("Silver job failed")?;
    log::info!(
        "✓ Silver layer created with {} event(s) in {}",
        count.cyan(),
        format!("{}/{}", config.silver_container, config.silver_object).bright_black()
    );
    Ok(())
}

async fn gold(config: &PipelineConfig, stores: &Stores) -> Result<()> {
    let result = cli::run_gold(config, stores)
        .await
        .context("Gold job failed")?;
    match result {
        LoadResult::UpToDate { watermark } => log::info!(
            "✓ No new data to load, watermark stays at {}",
            watermark.cyan()
        ),
        LoadResult::Loaded { rows, watermark } => log::info!(
            "✓ Loaded {} row(s) into {}, watermark updated to {}",
            rows.cyan(),
            config.gold_table.bright_black(),
            watermark.cyan()
        ),
    }
    Ok(())
}
