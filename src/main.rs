use clap::Parser;
use wa_linkgen::core::sample::sample_contacts_csv;
use wa_linkgen::utils::{logger, report, validation::Validate};
use wa_linkgen::{BulkPipeline, CliConfig, LinkEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    if config.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wa-linkgen");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Some(path) = &config.write_sample {
        std::fs::write(path, sample_contacts_csv()?)?;
        println!("📄 Plantilla escrita en {}", path);
        return Ok(());
    }

    if let Err(e) = config.resolve_template().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let json = config.json;
    let sink = LocalStorage::new(config.output_path.clone());
    let pipeline = BulkPipeline::new(LocalStorage::working_dir(), sink, config);
    let engine = LinkEngine::new(pipeline);

    match engine.run().await {
        Ok(load_report) => {
            tracing::info!("✅ Link generation completed successfully!");
            report::print_report(&load_report, json)?;
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
