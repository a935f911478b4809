use case_distributor::core::ConfigProvider;
use case_distributor::utils::{logger, validation::Validate};
use case_distributor::{
    AssignmentEngine, DistributionPipeline, DistributionRunner, LocalStorage, RuleStore, TomlConfig,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-distributor")]
#[command(about = "Case distribution driven by a TOML run configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "distribution.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override the handler filter from the config
    #[arg(long)]
    handler: Option<String>,

    /// Extract and assign without writing any file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_logger(args.verbose, args.log_json);

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(handler) = args.handler.clone() {
        tracing::info!("🔧 Handler filter overridden to: {}", handler);
        config.load.handler_filter = Some(handler);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let prepared = config
        .load_rules()
        .and_then(|rules| Ok((rules, config.case_source()?)));
    let (rules, source) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    let engine = AssignmentEngine::new(RuleStore::new(rules));
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = DistributionPipeline::new(storage, config, source, engine);
    let runner = DistributionRunner::new(pipeline);

    let outcome = if args.dry_run {
        runner.dry_run().await
    } else {
        runner.run().await
    };

    match outcome {
        Ok(report) => {
            println!("{}", report.summary);
            for output in &report.outputs {
                println!("📁 Output saved to: {}", output);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Distribution failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    let strict = if config.rules.strict.unwrap_or(false) {
        " [strict]"
    } else {
        ""
    };
    println!(
        "  Rules: {}{}",
        config.rules.path.as_deref().unwrap_or("(embedded)"),
        strict
    );
    let source = if config.is_api_source() {
        config.source.endpoint.as_deref()
    } else {
        config.source.path.as_deref()
    };
    println!("  Source: {}", source.unwrap_or_default());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(handler) = config.handler_filter() {
        println!("  Handler filter: {}", handler);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
