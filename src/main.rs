use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use symptom_triage::core::specialization::is_emergency;
use symptom_triage::utils::error::ErrorSeverity;
use symptom_triage::utils::{logger, validation::Validate};
use symptom_triage::{build_aggregator, load_store, ApiEnvelope, CliArgs, TriageConfig, TriageError, TriageResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting symptom-triage");

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let request = args.request();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no service will be contacted");
        print_dry_run(&config, &request.message, request.coordinate().is_some());
        return Ok(());
    }

    let store = match load_store(&config) {
        Ok(store) => Arc::new(store),
        Err(e) => exit_with(&e),
    };
    let aggregator = match build_aggregator(&config, store) {
        Ok(aggregator) => aggregator,
        Err(e) => exit_with(&e),
    };

    let result = aggregator.process(&request).await;
    if result.emergency {
        eprintln!("⚠️  Your message suggests a possible medical emergency.");
        eprintln!("🚨 Call your local emergency number or go to the nearest emergency room now.");
    }

    let envelope = ApiEnvelope::ok(TriageResponse::from(result));
    let output = serde_json::to_string_pretty(&envelope).context("failed to render response")?;
    println!("{}", output);

    Ok(())
}

fn load_config(path: &str) -> symptom_triage::Result<TriageConfig> {
    if Path::new(path).exists() {
        tracing::info!("📁 Loading configuration from: {}", path);
        TriageConfig::from_file(path)
    } else {
        tracing::info!("📁 {} not found, using built-in defaults", path);
        Ok(TriageConfig::default())
    }
}

fn exit_with(e: &TriageError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    let envelope: ApiEnvelope<()> = ApiEnvelope::failure(e.user_friendly_message());
    if let Ok(output) = serde_json::to_string_pretty(&envelope) {
        println!("{}", output);
    }
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_dry_run(config: &TriageConfig, message: &str, located: bool) {
    let detector = config.detector();
    println!("📋 Configuration Summary:");
    println!("  Chat provider: {:?}", config.chat.provider);
    println!("  Facility endpoint: {}", config.facilities.endpoint);
    println!(
        "  Doctor radius: {} km (max {})",
        config.search.doctor_radius_km, config.search.max_doctors
    );
    println!(
        "  Facility radius: {} km (max {})",
        config.facilities.radius_km, config.facilities.max_results
    );
    println!("  Keyword rules: {}", detector.rules().len());
    println!("  Branch timeout: {}s", config.aggregator.branch_timeout_seconds);
    println!();
    println!("🩺 Detected specialization: {}", detector.detect(message));
    println!("🚨 Emergency: {}", is_emergency(message));
    println!(
        "📍 Location lookups: {}",
        if located { "enabled" } else { "skipped (no coordinate)" }
    );
}
