use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkGenError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "qr")]
    #[error("Image encoding failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[cfg(feature = "qr")]
    #[error("QR encoding failed: {0}")]
    QrError(#[from] qrcode::types::QrError),

    #[error("Invalid phone number: {raw:?}")]
    InvalidPhone { raw: String },

    #[error("Missing template variable {name:?}{}", at_row(.row))]
    MissingTemplateVariable { name: String, row: Option<usize> },

    #[error("Required column {column:?} is missing from the input")]
    MissingRequiredColumn { column: String },

    #[error("Unreadable input: {message}")]
    UnreadableInput { message: String },

    #[error("Capability unavailable: {capability}")]
    CapabilityUnavailable { capability: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

fn at_row(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Template,
    Configuration,
    Capability,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LinkGenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkGenError::CsvError(_)
            | LinkGenError::InvalidPhone { .. }
            | LinkGenError::MissingRequiredColumn { .. }
            | LinkGenError::UnreadableInput { .. } => ErrorCategory::Input,
            LinkGenError::MissingTemplateVariable { .. } => ErrorCategory::Template,
            LinkGenError::ConfigValidationError { .. }
            | LinkGenError::InvalidConfigValueError { .. }
            | LinkGenError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LinkGenError::CapabilityUnavailable { .. } => ErrorCategory::Capability,
            #[cfg(feature = "qr")]
            LinkGenError::ImageError(_) | LinkGenError::QrError(_) => ErrorCategory::Output,
            LinkGenError::ZipError(_)
            | LinkGenError::IoError(_)
            | LinkGenError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LinkGenError::CapabilityUnavailable { .. } => ErrorSeverity::Low,
            LinkGenError::InvalidPhone { .. } => ErrorSeverity::Medium,
            LinkGenError::IoError(_) | LinkGenError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Fatal errors abort the whole operation; the rest are collected and reported.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            LinkGenError::InvalidPhone { .. } | LinkGenError::CapabilityUnavailable { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LinkGenError::InvalidPhone { .. } => {
                "Include the country code or pick the right default region"
            }
            LinkGenError::MissingTemplateVariable { .. } => {
                "Add the missing column to the CSV or remove the placeholder from the template"
            }
            LinkGenError::MissingRequiredColumn { .. } => {
                "Add a TELEFONO column header to the CSV file"
            }
            LinkGenError::UnreadableInput { .. } | LinkGenError::CsvError(_) => {
                "Check that the file is a UTF-8 comma-separated file with a header row"
            }
            LinkGenError::CapabilityUnavailable { .. } => {
                "Rebuild with the `qr` and `strict-phone` features enabled"
            }
            LinkGenError::ConfigValidationError { .. }
            | LinkGenError::InvalidConfigValueError { .. }
            | LinkGenError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            LinkGenError::IoError(_) | LinkGenError::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            _ => "Retry the operation; if it keeps failing report the input that triggers it",
        }
    }

    /// Message shown to the staff running the campaign.
    pub fn user_friendly_message(&self) -> String {
        match self {
            LinkGenError::InvalidPhone { raw } => format!(
                "Ingresa un teléfono válido (con indicativo o selecciona el país correcto): {}",
                raw
            ),
            LinkGenError::MissingTemplateVariable {
                name,
                row: Some(row),
            } => format!("Falta la variable '{}' en el CSV para la fila {}.", name, row),
            LinkGenError::MissingTemplateVariable { name, row: None } => {
                format!("Falta la variable '{}' para el mensaje.", name)
            }
            LinkGenError::MissingRequiredColumn { column } => {
                format!("La columna {} es obligatoria.", column)
            }
            LinkGenError::UnreadableInput { message } => {
                format!("No se pudo leer el CSV: {}", message)
            }
            LinkGenError::CsvError(e) => format!("No se pudo leer el CSV: {}", e),
            LinkGenError::CapabilityUnavailable { capability } => {
                format!("Función no disponible en esta instalación: {}", capability)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_message_names_row() {
        let err = LinkGenError::MissingTemplateVariable {
            name: "CIUDAD".to_string(),
            row: Some(4),
        };
        assert_eq!(err.to_string(), "Missing template variable \"CIUDAD\" at row 4");
        assert!(err.user_friendly_message().contains("fila 4"));
        assert_eq!(err.category(), ErrorCategory::Template);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_fatal_errors() {
        let invalid = LinkGenError::InvalidPhone {
            raw: "abc".to_string(),
        };
        let unavailable = LinkGenError::CapabilityUnavailable {
            capability: "qr".to_string(),
        };
        assert!(!invalid.is_fatal());
        assert!(!unavailable.is_fatal());
        assert_eq!(unavailable.severity(), ErrorSeverity::Low);
    }
}
