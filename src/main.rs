use clap::Parser;
use region_series::domain::ports::ConfigProvider;
use region_series::utils::{logger, validation::Validate};
use region_series::{ChartEngine, CliConfig, FileSink, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting region-series CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
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
            tracing::info!("📁 Output saved to: {}", output_path);
            println!(
                "✅ Derived {} series from {} records ({} issues)",
                summary.rendered, summary.records, summary.issues
            );
            for output in &summary.outputs {
                println!("📁 {}/{}", output_path, output);
            }
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
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
