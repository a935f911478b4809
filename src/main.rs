use case_distributor::utils::{logger, validation::Validate};
use case_distributor::{
    AssignmentEngine, CliConfig, DistributionPipeline, DistributionRunner, DistributorError,
    LocalStorage, RuleStore,
};
use clap::Parser;

fn fail(e: &DistributorError) -> ! {
    tracing::error!(
        "❌ Distribution failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

async fn run(config: CliConfig) -> Result<(), DistributorError> {
    config.validate()?;

    let rules = config.load_rules()?;
    let source = config.case_source()?;
    let engine = AssignmentEngine::new(RuleStore::new(rules));
    tracing::info!(
        "Loaded {} rule(s) for {} handler(s)",
        engine.store().rule_count(),
        engine.store().known_handlers().len()
    );

    let dry_run = config.dry_run;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DistributionPipeline::new(storage, config, source, engine);
    let runner = DistributionRunner::new(pipeline);

    let report = if dry_run {
        runner.dry_run().await?
    } else {
        runner.run().await?
    };

    println!("{}", report.summary);
    for output in &report.outputs {
        println!("📁 Output saved to: {}", output);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting case-distributor");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        fail(&e);
    }
}
