#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::core::batch::MissingVariablePolicy;
    use crate::core::phone::ValidationMode;
    use crate::core::qr::QrSettings;
    use crate::core::sample::{DEFAULT_MESSAGE, SAMPLE_FILE_NAME};
    use crate::core::template::{RenderOptions, SubstitutionTrigger};
    use crate::core::ConfigProvider;
    use crate::domain::model::{Provider, Region};
    use crate::utils::error::Result;
    use crate::utils::validation::*;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "wa-linkgen")]
    #[command(about = "Generate WhatsApp links and QR codes from a contacts CSV")]
    pub struct CliConfig {
        /// Contacts CSV with a TELEFONO column
        #[arg(short, long)]
        pub input: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Default region for numbers without a country prefix (CO, US, MX, PE, EC, AR, CL, VE, BR, ES)
        #[arg(long, default_value = "CO")]
        pub region: Region,

        /// Link provider: wa.me or api
        #[arg(long, default_value = "wa.me")]
        pub provider: Provider,

        /// Message template; columns are referenced as {COLUMN}
        #[arg(long, conflicts_with = "template_file")]
        pub template: Option<String>,

        #[arg(long)]
        pub template_file: Option<String>,

        /// Keep literal \n sequences instead of turning them into line breaks
        #[arg(long)]
        pub no_newlines: bool,

        /// When to substitute placeholders: any-placeholder or nombre-marker
        #[arg(long, default_value = "any-placeholder")]
        pub substitution: SubstitutionTrigger,

        /// Also write a ZIP with one QR image per link
        #[arg(long)]
        pub qr: bool,

        #[arg(long, default_value_t = 10)]
        pub box_size: u32,

        #[arg(long, default_value_t = 4)]
        pub border: u32,

        /// Accept any digits as a phone number, without number-plan checks
        #[arg(long)]
        pub permissive_phones: bool,

        /// What a row with an unknown placeholder does: abort or skip-row
        #[arg(long, default_value = "abort")]
        pub on_missing_variable: MissingVariablePolicy,

        /// Print the run summary as JSON
        #[arg(long)]
        pub json: bool,

        /// Write a sample contacts CSV and exit
        #[arg(long, num_args = 0..=1, default_missing_value = SAMPLE_FILE_NAME)]
        pub write_sample: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Loads `--template-file` into `template`.
        pub fn resolve_template(&mut self) -> Result<()> {
            if let Some(path) = &self.template_file {
                let content = std::fs::read_to_string(path)?;
                self.template = Some(content.trim_end_matches(['\r', '\n']).to_string());
            }
            Ok(())
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            self.input.as_deref().unwrap_or_default()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn region(&self) -> Region {
            self.region
        }

        fn provider(&self) -> Provider {
            self.provider
        }

        fn template(&self) -> &str {
            self.template.as_deref().unwrap_or(DEFAULT_MESSAGE)
        }

        fn render_options(&self) -> RenderOptions {
            RenderOptions {
                trigger: self.substitution,
                insert_newlines: !self.no_newlines,
            }
        }

        fn qr_settings(&self) -> Option<QrSettings> {
            self.qr.then_some(QrSettings {
                box_size: self.box_size,
                border: self.border,
            })
        }

        fn phone_validation(&self) -> ValidationMode {
            if self.permissive_phones {
                ValidationMode::Permissive
            } else {
                ValidationMode::Strict
            }
        }

        fn missing_variable_policy(&self) -> MissingVariablePolicy {
            self.on_missing_variable
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if self.write_sample.is_some() {
                return Ok(());
            }

            let input = validate_required_field("input", &self.input)?;
            validate_path("input", input)?;
            validate_file_extension("input", input, &["csv"])?;
            validate_path("output_path", &self.output_path)?;
            validate_non_empty_string("template", self.template())?;
            if let Some(settings) = self.qr_settings() {
                settings.validate()?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> CliConfig {
            let mut argv = vec!["wa-linkgen"];
            argv.extend_from_slice(args);
            CliConfig::try_parse_from(argv).unwrap()
        }

        #[test]
        fn test_defaults() {
            let config = parse(&["--input", "contacts.csv"]);
            assert_eq!(config.region(), Region::CO);
            assert_eq!(config.provider(), Provider::WaMe);
            assert_eq!(config.template(), DEFAULT_MESSAGE);
            assert!(config.render_options().insert_newlines);
            assert_eq!(config.qr_settings(), None);
            assert_eq!(config.phone_validation(), ValidationMode::Strict);
            assert_eq!(config.missing_variable_policy(), MissingVariablePolicy::Abort);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_overrides() {
            let config = parse(&[
                "-i",
                "c.csv",
                "--region",
                "mx",
                "--provider",
                "api",
                "--qr",
                "--box-size",
                "6",
                "--border",
                "2",
                "--substitution",
                "nombre-marker",
                "--on-missing-variable",
                "skip-row",
                "--permissive-phones",
                "--no-newlines",
            ]);
            assert_eq!(config.region(), Region::MX);
            assert_eq!(config.provider(), Provider::Api);
            assert_eq!(
                config.qr_settings(),
                Some(QrSettings {
                    box_size: 6,
                    border: 2
                })
            );
            assert_eq!(
                config.render_options().trigger,
                SubstitutionTrigger::NombreMarker
            );
            assert!(!config.render_options().insert_newlines);
            assert_eq!(config.missing_variable_policy(), MissingVariablePolicy::SkipRow);
            assert_eq!(config.phone_validation(), ValidationMode::Permissive);
        }

        #[test]
        fn test_validation_rejects_out_of_range_qr() {
            let config = parse(&["-i", "c.csv", "--qr", "--box-size", "30"]);
            assert!(config.validate().is_err());
            // Out of range values are ignored when no QR output is requested.
            let config = parse(&["-i", "c.csv", "--box-size", "30"]);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_validation_requires_csv_input() {
            assert!(parse(&[]).validate().is_err());
            assert!(parse(&["-i", "contacts.xlsx"]).validate().is_err());
            assert!(parse(&["--write-sample", "sample.csv"]).validate().is_ok());
            assert_eq!(
                parse(&["--write-sample"]).write_sample.as_deref(),
                Some(SAMPLE_FILE_NAME)
            );
        }

        #[test]
        fn test_unknown_region_is_rejected() {
            assert!(CliConfig::try_parse_from(["wa-linkgen", "--region", "FR"]).is_err());
        }
    }
}
