use anyhow::Context;
use clap::Parser;
use region_series::core::aggregation::available_keys;
use region_series::core::ingest;
use region_series::domain::ports::{ConfigProvider, Storage};
use region_series::utils::{logger, validation::Validate};
use region_series::{ChartEngine, FileSink, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-series")]
#[command(about = "Derive chart series for every chart in a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "charts.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override `output.all_keys` from config
    #[arg(long)]
    all_keys: Option<bool>,

    /// Dry run - load the data and list charts and keys without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_cli_logger(verbose);

    tracing::info!("🚀 Starting TOML-based chart derivation");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(all_keys) = args.all_keys {
        config.output.all_keys = Some(all_keys);
        tracing::info!("🔧 all_keys overridden to: {}", all_keys);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        return perform_dry_run(&config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let sink = FileSink::new(
        LocalStorage::new(config.output_path().to_string()),
        config.output_formats().to_vec(),
    );
    let output_path = config.output_path().to_string();
    let engine = ChartEngine::new_with_monitoring(LocalStorage::working_dir(), sink, config, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ Rendered {} series for {} charts ({} issues)",
                summary.rendered, summary.charts, summary.issues
            );
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Chart derivation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  📥 Source: {}", config.data_path());
    tracing::info!("  📁 Output: {}", config.output_path());
    tracing::info!(
        "  📄 Formats: {}",
        config
            .output_formats()
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("  🔁 All keys: {}", config.render_all_keys());
    for chart in config.charts() {
        tracing::info!(
            "  📈 {} ({:?}): average {} by {}, selected {}",
            chart.name,
            chart.kind,
            chart.metric,
            chart.dimension,
            chart.selected.as_deref().unwrap_or("<first key>")
        );
    }
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let path = config.data_path();
    let data = LocalStorage::working_dir()
        .read_file(path)
        .await
        .with_context(|| format!("failed to read dataset '{}'", path))?;
    let records = ingest::read_records(&data, ingest::delimiter_for(path))
        .with_context(|| format!("failed to parse dataset '{}'", path))?;

    println!("🔍 Dry run: {} records in {}", records.len(), path);
    for chart in config.charts() {
        let keys: Vec<String> = available_keys(&records, chart.dimension)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "  📈 {} → {} keys by {}: [{}]",
            chart.name,
            keys.len(),
            chart.dimension,
            keys.join(", ")
        );
    }

    Ok(())
}
