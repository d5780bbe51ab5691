use clap::Parser;
use wa_linkgen::core::batch::{single_contact, BatchOptions, BatchProcessor};
use wa_linkgen::core::phone::{select_validator, ValidationMode};
use wa_linkgen::core::qr::{QrEncoder, QrSettings};
use wa_linkgen::core::sample::DEFAULT_MESSAGE;
use wa_linkgen::core::template::{RenderOptions, SubstitutionTrigger};
use wa_linkgen::utils::{logger, report, validation::Validate};
use wa_linkgen::{LinkGenError, Provider, Region};

#[derive(Parser, Debug)]
#[command(name = "single-link")]
#[command(about = "Generate one WhatsApp link, and optionally its QR code")]
struct Args {
    /// Recipient phone, with country code or in the default region's format
    phone: String,

    #[arg(long, default_value = "CO")]
    region: Region,

    #[arg(long, default_value = "wa.me")]
    provider: Provider,

    #[arg(short, long, default_value = DEFAULT_MESSAGE)]
    message: String,

    /// Value for {NOMBRE}; overrides `--var NOMBRE=...`
    #[arg(short, long)]
    name: Option<String>,

    /// Extra template variable, KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_key_val)]
    vars: Vec<(String, String)>,

    #[arg(long)]
    no_newlines: bool,

    #[arg(long, default_value = "any-placeholder")]
    substitution: SubstitutionTrigger,

    #[arg(long)]
    permissive_phones: bool,

    /// Write the QR code as PNG to this path
    #[arg(long)]
    qr_out: Option<String>,

    #[arg(long, default_value_t = 10)]
    box_size: u32,

    #[arg(long, default_value_t = 4)]
    border: u32,

    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn run(args: &Args) -> wa_linkgen::Result<()> {
    let mode = if args.permissive_phones {
        ValidationMode::Permissive
    } else {
        ValidationMode::Strict
    };
    let processor = BatchProcessor::new(
        select_validator(mode),
        BatchOptions {
            region: args.region,
            provider: args.provider,
            render: RenderOptions {
                trigger: args.substitution,
                insert_newlines: !args.no_newlines,
            },
            ..BatchOptions::default()
        },
    );

    let contact = single_contact(&args.phone, args.name.as_deref(), args.vars.iter().cloned());

    let record = processor.process_single(&contact, &args.message)?;
    tracing::debug!("Message: {:?}", record.message);
    println!("{}", record.link);

    if let Some(path) = &args.qr_out {
        let settings = QrSettings {
            box_size: args.box_size,
            border: args.border,
        };
        settings.validate()?;

        match QrEncoder::new(settings).encode(&record.link)? {
            Some(image) => {
                std::fs::write(path, image.to_png()?)?;
                tracing::info!("🧩 QR ({}x{}) saved to {}", image.width(), image.height(), path);
            }
            None => {
                let unavailable = LinkGenError::CapabilityUnavailable {
                    capability: "qr".to_string(),
                };
                tracing::warn!("⚠️ {}", unavailable);
                eprintln!("ℹ️ {}", unavailable.user_friendly_message());
            }
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args) {
        let exit_code = report::report_failure(&e);
        std::process::exit(exit_code.max(1));
    }
}
