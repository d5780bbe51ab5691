use crate::core::batch::MissingVariablePolicy;
use crate::core::phone::ValidationMode;
use crate::core::qr::QrSettings;
use crate::core::sample::DEFAULT_MESSAGE;
use crate::core::template::{RenderOptions, SubstitutionTrigger};
use crate::core::ConfigProvider;
use crate::domain::model::{Provider, Region};
use crate::utils::error::{LinkGenError, Result};
use crate::utils::validation::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

/// A campaign described in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub campaign: CampaignConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub link: LinkConfig,
    pub qr: Option<QrConfig>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    pub template: Option<String>,
    pub template_file: Option<String>,
    #[serde(default = "default_true")]
    pub insert_newlines: bool,
    #[serde(default)]
    pub substitution: SubstitutionTrigger,
    #[serde(default)]
    pub on_missing_variable: MissingVariablePolicy,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            template: None,
            template_file: None,
            insert_newlines: true,
            substitution: SubstitutionTrigger::default(),
            on_missing_variable: MissingVariablePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub phone_validation: ValidationMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub box_size: Option<u32>,
    pub border: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

fn default_true() -> bool {
    true
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LinkGenError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;

        // Template files are relative to the config file.
        if let (Some(file), Some(dir)) = (&config.message.template_file, path.as_ref().parent()) {
            let template = std::fs::read_to_string(dir.join(file))?;
            config.message.template = Some(template.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LinkGenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown names are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("campaign.name", &self.campaign.name)?;

        let input = validate_required_field("input.path", &self.input.path)?;
        validate_path("input.path", input)?;
        validate_file_extension("input.path", input, &["csv"])?;

        validate_path("output.path", &self.output.path)?;
        validate_non_empty_string("message.template", self.template())?;

        if let Some(settings) = self.qr_settings() {
            settings.validate()?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.input.path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn region(&self) -> Region {
        self.link.region
    }

    fn provider(&self) -> Provider {
        self.link.provider
    }

    fn template(&self) -> &str {
        self.message.template.as_deref().unwrap_or(DEFAULT_MESSAGE)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            trigger: self.message.substitution,
            insert_newlines: self.message.insert_newlines,
        }
    }

    fn qr_settings(&self) -> Option<QrSettings> {
        let qr = self.qr.as_ref().filter(|q| q.enabled)?;
        let defaults = QrSettings::default();
        Some(QrSettings {
            box_size: qr.box_size.unwrap_or(defaults.box_size),
            border: qr.border.unwrap_or(defaults.border),
        })
    }

    fn phone_validation(&self) -> ValidationMode {
        self.link.phone_validation
    }

    fn missing_variable_policy(&self) -> MissingVariablePolicy {
        self.message.on_missing_variable
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_parse_full_campaign() {
        let toml_content = r#"
[campaign]
name = "rompiendo-el-techo"
description = "Invitación del 27"

[input]
path = "contacts.csv"

[message]
template = "Hola {NOMBRE}\\nTe esperamos"
insert_newlines = true
substitution = "nombre_marker"
on_missing_variable = "skip_row"

[link]
region = "EC"
provider = "api"
phone_validation = "permissive"

[qr]
box_size = 8
border = 3

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.campaign.name, "rompiendo-el-techo");
        assert_eq!(config.input_path(), "contacts.csv");
        assert_eq!(config.template(), "Hola {NOMBRE}\\nTe esperamos");
        assert_eq!(config.region(), Region::EC);
        assert_eq!(config.provider(), Provider::Api);
        assert_eq!(config.phone_validation(), ValidationMode::Permissive);
        assert_eq!(config.missing_variable_policy(), MissingVariablePolicy::SkipRow);
        assert_eq!(
            config.render_options().trigger,
            SubstitutionTrigger::NombreMarker
        );
        assert_eq!(
            config.qr_settings(),
            Some(QrSettings {
                box_size: 8,
                border: 3
            })
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_campaign_uses_defaults() {
        let toml_content = r#"
[campaign]
name = "minimal"

[input]
path = "contacts.csv"

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.region(), Region::CO);
        assert_eq!(config.provider(), Provider::WaMe);
        assert_eq!(config.template(), DEFAULT_MESSAGE);
        assert!(config.render_options().insert_newlines);
        assert_eq!(config.qr_settings(), None);
        assert_eq!(config.phone_validation(), ValidationMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("WA_LINKGEN_TEST_INPUT", "/data/contactos.csv");

        let toml_content = r#"
[campaign]
name = "env"

[input]
path = "${WA_LINKGEN_TEST_INPUT}"

[message]
template = "Hola {NOMBRE}, ${WA_LINKGEN_UNSET_VAR}"

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), "/data/contactos.csv");
        assert_eq!(config.template(), "Hola {NOMBRE}, ${WA_LINKGEN_UNSET_VAR}");

        std::env::remove_var("WA_LINKGEN_TEST_INPUT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[campaign]
name = "bad"

[input]
path = "contacts.xlsx"

[qr]
box_size = 40

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_region_fails_parsing() {
        let toml_content = r#"
[campaign]
name = "bad"

[link]
region = "FR"

[output]
path = "./out"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(LinkGenError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_missing_input_path() {
        let toml_content = r#"
[campaign]
name = "no-input"

[output]
path = "./out"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LinkGenError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[campaign]
name = "file-test"

[input]
path = "contacts.csv"

[output]
path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.campaign.name, "file-test");
    }

    #[test]
    fn test_template_file_is_relative_to_config() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("mensaje.txt"), "Hola {NOMBRE}\n").unwrap();
        let config_path = temp_dir.path().join("campaign.toml");
        std::fs::write(
            &config_path,
            r#"
[campaign]
name = "file-template"

[input]
path = "contacts.csv"

[message]
template_file = "mensaje.txt"

[output]
path = "./output"
"#,
        )
        .unwrap();

        let config = TomlConfig::from_file(&config_path).unwrap();
        assert_eq!(config.template(), "Hola {NOMBRE}");
    }
}
