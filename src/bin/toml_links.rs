use clap::Parser;
use wa_linkgen::core::phone::strict_backend_available;
use wa_linkgen::core::qr::QrEncoder;
use wa_linkgen::core::template::{missing_placeholders, placeholders, substitutes};
use wa_linkgen::core::{ConfigProvider, Pipeline};
use wa_linkgen::domain::model::PHONE_COLUMN;
use wa_linkgen::utils::{logger, report, validation::Validate};
use wa_linkgen::{BulkPipeline, LinkEngine, LinkGenError, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-links")]
#[command(about = "Generate campaign links from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "campaign.toml")]
    config: String,

    /// Override the contacts CSV from the config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Check the input against the template without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based link generation");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(input) = &args.input {
        config.input.path = Some(input.clone());
        tracing::info!("🔧 Input overridden to: {}", input);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    if !args.json {
        display_config_summary(&config, &args);
    }

    let sink = LocalStorage::new(config.output_path().to_string());
    let pipeline = BulkPipeline::new(LocalStorage::working_dir(), sink, config.clone());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        if let Err(e) = perform_dry_run(&pipeline, &config).await {
            std::process::exit(report::report_failure(&e).max(1));
        }
        return Ok(());
    }

    let engine = LinkEngine::new(pipeline);
    match engine.run().await {
        Ok(load_report) => {
            tracing::info!("✅ Link generation completed successfully!");
            report::print_report(&load_report, args.json)?;
        }
        Err(e) => {
            let exit_code = report::report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Campaign: {}", config.campaign.name);
    if let Some(description) = &config.campaign.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Region: {}", config.region());
    println!("  Provider: {}", config.provider());
    println!(
        "  Phone validation: {:?} (backend {})",
        config.phone_validation(),
        if strict_backend_available() { "available" } else { "missing" }
    );

    match config.qr_settings() {
        Some(settings) => println!(
            "  QR: box {} / border {}{}",
            settings.box_size,
            settings.border,
            if QrEncoder::is_available() { "" } else { " (backend missing)" }
        ),
        None => println!("  QR: disabled"),
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run<P: Pipeline>(
    pipeline: &P,
    config: &TomlConfig,
) -> wa_linkgen::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let table = pipeline.extract().await?;
    println!("📥 Input: {} rows", table.len());
    println!("  Columns: {}", table.headers.join(", "));

    if !table.has_column(PHONE_COLUMN) {
        return Err(LinkGenError::MissingRequiredColumn {
            column: PHONE_COLUMN.to_string(),
        });
    }

    println!();
    println!("✉️ Template placeholders:");
    let options = config.render_options();
    let mut names = placeholders(config.template());
    let missing = missing_placeholders(config.template(), &table.headers, &options);
    if names.is_empty() {
        println!("  (none, the message is sent as written)");
    } else if !substitutes(config.template(), &options) {
        println!("  (no {{NOMBRE}} marker, the message is sent as written)");
        names.clear();
    }
    for name in &names {
        if missing.contains(name) {
            println!("  ❌ {} (no such column)", name);
        } else {
            println!("  ✅ {}", name);
        }
    }

    println!();
    if missing.is_empty() {
        println!("✅ Dry run analysis complete. Every placeholder has a column.");
    } else {
        println!(
            "⚠️ Dry run found {} placeholder(s) without a column: {}",
            missing.len(),
            missing.join(", ")
        );
    }

    Ok(())
}
