use crate::core::link::build_link;
use crate::core::sample::DEFAULT_PREVIEW_NAME;
use crate::core::template::{render_with, RenderOptions};
use crate::domain::model::{
    BatchResult, ContactTable, LinkRecord, Provider, RawContact, Region, SkippedRow, NAME_COLUMN,
    PHONE_COLUMN,
};
use crate::domain::ports::PhoneValidator;
use crate::utils::error::{LinkGenError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a row with an unresolvable placeholder does to the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVariablePolicy {
    /// Stop the whole batch at the first such row; nothing is emitted.
    Abort,
    /// Record the row in `skipped_rows` and keep going.
    SkipRow,
}

pub const DEFAULT_MISSING_VARIABLE_POLICY: MissingVariablePolicy = MissingVariablePolicy::Abort;

impl Default for MissingVariablePolicy {
    fn default() -> Self {
        DEFAULT_MISSING_VARIABLE_POLICY
    }
}

impl FromStr for MissingVariablePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(MissingVariablePolicy::Abort),
            "skip_row" | "skip" => Ok(MissingVariablePolicy::SkipRow),
            other => Err(format!(
                "unknown missing-variable policy '{}', expected abort or skip-row",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub region: Region,
    pub provider: Provider,
    pub render: RenderOptions,
    pub on_missing_variable: MissingVariablePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Linked(LinkRecord),
    InvalidPhone,
    MissingVariable(String),
}

/// Builds the contact behind a single-link request. An explicit `name`
/// beats a `NOMBRE` entry in `vars`; the preview name is used only when
/// neither is given. `phone` always wins over a `TELEFONO` var.
pub fn single_contact<I>(phone: &str, name: Option<&str>, vars: I) -> RawContact
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut contact: RawContact = vars.into_iter().collect();
    match name {
        Some(name) => contact = contact.with_field(NAME_COLUMN, name),
        None if contact.get(NAME_COLUMN).is_none() => {
            contact = contact.with_field(NAME_COLUMN, DEFAULT_PREVIEW_NAME)
        }
        None => {}
    }
    contact.with_field(PHONE_COLUMN, phone)
}

pub struct BatchProcessor {
    validator: Box<dyn PhoneValidator>,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(validator: Box<dyn PhoneValidator>, options: BatchOptions) -> Self {
        Self { validator, options }
    }

    /// Render, normalize, link, for one contact. `row` is 1-based.
    pub fn process_contact(
        &self,
        row: usize,
        contact: &RawContact,
        template: &str,
    ) -> Result<RowOutcome> {
        let message = match render_with(template, &contact.fields, &self.options.render) {
            Ok(message) => message,
            Err(LinkGenError::MissingTemplateVariable { name, .. }) => {
                return Ok(RowOutcome::MissingVariable(name))
            }
            Err(e) => return Err(e),
        };

        let phone = self.validator.normalize(contact.phone(), self.options.region);
        if !phone.is_valid() {
            return Ok(RowOutcome::InvalidPhone);
        }

        let link = build_link(&phone, &message, self.options.provider);
        Ok(RowOutcome::Linked(LinkRecord {
            row,
            phone,
            message,
            link,
        }))
    }

    /// Single form submission: an invalid phone is reported as an error.
    pub fn process_single(&self, contact: &RawContact, template: &str) -> Result<LinkRecord> {
        match self.process_contact(1, contact, template)? {
            RowOutcome::Linked(record) => Ok(record),
            RowOutcome::InvalidPhone => Err(LinkGenError::InvalidPhone {
                raw: contact.phone().to_string(),
            }),
            RowOutcome::MissingVariable(name) => {
                Err(LinkGenError::MissingTemplateVariable { name, row: None })
            }
        }
    }

    pub fn process(&self, table: &ContactTable, template: &str) -> Result<BatchResult> {
        if !table.has_column(PHONE_COLUMN) {
            return Err(LinkGenError::MissingRequiredColumn {
                column: PHONE_COLUMN.to_string(),
            });
        }

        tracing::info!(
            "📋 Processing {} rows (region {}, provider {}, validator {})",
            table.len(),
            self.options.region,
            self.options.provider,
            self.validator.name()
        );

        let mut result = BatchResult {
            total_rows: table.len(),
            ..BatchResult::default()
        };

        for (index, contact) in table.rows.iter().enumerate() {
            let row = index + 1;
            match self.process_contact(row, contact, template)? {
                RowOutcome::Linked(record) => {
                    tracing::debug!("Row {}: {}", row, record.link);
                    result.links.push(record);
                }
                RowOutcome::InvalidPhone => {
                    tracing::debug!("Row {}: invalid phone {:?}", row, contact.phone());
                    result.invalid_phone_rows.push(row);
                }
                RowOutcome::MissingVariable(name) => match self.options.on_missing_variable {
                    MissingVariablePolicy::Abort => {
                        tracing::error!("❌ Row {} references missing variable {:?}", row, name);
                        return Err(LinkGenError::MissingTemplateVariable {
                            name,
                            row: Some(row),
                        });
                    }
                    MissingVariablePolicy::SkipRow => {
                        tracing::warn!("Row {} skipped, missing variable {:?}", row, name);
                        result.skipped_rows.push(SkippedRow {
                            row,
                            variable: name,
                        });
                    }
                },
            }
        }

        tracing::info!("✅ Links generated: {}", result.links.len());
        if !result.invalid_phone_rows.is_empty() {
            tracing::warn!(
                "⚠️ {} rows with invalid phone: {:?}",
                result.invalid_phone_rows.len(),
                result.invalid_phone_rows
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::phone::{select_validator, PermissiveFallback, ValidationMode};

    fn contact(pairs: &[(&str, &str)]) -> RawContact {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn processor(policy: MissingVariablePolicy) -> BatchProcessor {
        BatchProcessor::new(
            select_validator(ValidationMode::Strict),
            BatchOptions {
                on_missing_variable: policy,
                ..BatchOptions::default()
            },
        )
    }

    #[test]
    fn test_partition_preserves_order() {
        let table = ContactTable::from_rows(vec![
            contact(&[("TELEFONO", "3105226770")]),
            contact(&[("TELEFONO", "not-a-phone")]),
            contact(&[("TELEFONO", "+573101234567")]),
        ]);

        let result = processor(MissingVariablePolicy::Abort)
            .process(&table, "Hola")
            .unwrap();

        assert_eq!(result.total_rows, 3);
        let rows: Vec<usize> = result.links.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
        assert_eq!(result.invalid_phone_rows, vec![2]);
        assert!(result.skipped_rows.is_empty());
    }

    #[test]
    fn test_missing_phone_column_aborts() {
        let table = ContactTable::new(
            vec!["NOMBRE".to_string()],
            vec![contact(&[("NOMBRE", "Ana")])],
        );
        let err = processor(MissingVariablePolicy::Abort)
            .process(&table, "Hola")
            .unwrap_err();
        assert!(matches!(
            err,
            LinkGenError::MissingRequiredColumn { ref column } if column == "TELEFONO"
        ));
    }

    #[test]
    fn test_missing_variable_aborts_with_row_number() {
        let table = ContactTable::from_rows(vec![
            contact(&[("TELEFONO", "3105226770"), ("NOMBRE", "Ana")]),
            contact(&[("TELEFONO", "3105226771")]),
        ]);
        // Schema comes from the rows, so NOMBRE exists but row 2 lacks it.
        let err = processor(MissingVariablePolicy::Abort)
            .process(&table, "Hola {NOMBRE}")
            .unwrap_err();
        match err {
            LinkGenError::MissingTemplateVariable { name, row } => {
                assert_eq!(name, "NOMBRE");
                assert_eq!(row, Some(2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_variable_is_checked_before_phone() {
        let table = ContactTable::from_rows(vec![contact(&[("TELEFONO", "bad")])]);
        let err = processor(MissingVariablePolicy::Abort)
            .process(&table, "Hola {NOMBRE}")
            .unwrap_err();
        assert!(matches!(err, LinkGenError::MissingTemplateVariable { .. }));
    }

    #[test]
    fn test_skip_row_policy_keeps_going() {
        let table = ContactTable::from_rows(vec![
            contact(&[("TELEFONO", "3105226770"), ("CIUDAD", "Orito")]),
            contact(&[("TELEFONO", "3105226771")]),
            contact(&[("TELEFONO", "x"), ("CIUDAD", "Mocoa")]),
        ]);
        let result = processor(MissingVariablePolicy::SkipRow)
            .process(&table, "Nos vemos en {CIUDAD}")
            .unwrap();

        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].message, "Nos vemos en Orito");
        assert_eq!(
            result.skipped_rows,
            vec![SkippedRow {
                row: 2,
                variable: "CIUDAD".to_string()
            }]
        );
        assert_eq!(result.invalid_phone_rows, vec![3]);
    }

    #[test]
    fn test_empty_table_with_schema() {
        let table = ContactTable::new(vec!["TELEFONO".to_string()], vec![]);
        let result = processor(MissingVariablePolicy::Abort)
            .process(&table, "Hola")
            .unwrap();
        assert_eq!(result, BatchResult::default());
    }

    #[test]
    fn test_permissive_validator_passes_digits_through() {
        let processor = BatchProcessor::new(Box::new(PermissiveFallback), BatchOptions::default());
        let record = processor
            .process_single(&contact(&[("TELEFONO", "+57 310 522 6770")]), "Hola")
            .unwrap();
        assert_eq!(record.link, "https://wa.me/573105226770?text=Hola");
    }

    #[test]
    fn test_single_invalid_phone_is_error() {
        let err = processor(MissingVariablePolicy::Abort)
            .process_single(&contact(&[("TELEFONO", "")]), "Hola")
            .unwrap_err();
        assert!(matches!(err, LinkGenError::InvalidPhone { .. }));
    }

    #[test]
    fn test_single_contact_keeps_name_var() {
        let vars = vec![("NOMBRE".to_string(), "Ana".to_string())];
        let contact = single_contact("3105226770", None, vars);
        assert_eq!(contact.get("NOMBRE"), Some("Ana"));
        assert_eq!(contact.phone(), "3105226770");

        let record = BatchProcessor::new(Box::new(PermissiveFallback), BatchOptions::default())
            .process_single(&contact, "Hola {NOMBRE}")
            .unwrap();
        assert_eq!(record.link, "https://wa.me/3105226770?text=Hola%20Ana");
    }

    #[test]
    fn test_single_contact_name_precedence() {
        let vars = || {
            vec![
                ("NOMBRE".to_string(), "Ana".to_string()),
                ("TELEFONO".to_string(), "999".to_string()),
                ("CIUDAD".to_string(), "Orito".to_string()),
            ]
        };

        let explicit = single_contact("3105226770", Some("Luis"), vars());
        assert_eq!(explicit.get("NOMBRE"), Some("Luis"));
        assert_eq!(explicit.phone(), "3105226770");
        assert_eq!(explicit.get("CIUDAD"), Some("Orito"));

        let fallback = single_contact("3105226770", None, Vec::new());
        assert_eq!(fallback.get("NOMBRE"), Some(DEFAULT_PREVIEW_NAME));
    }

    #[cfg(feature = "strict-phone")]
    #[test]
    fn test_end_to_end_single_contact() {
        let record = processor(MissingVariablePolicy::Abort)
            .process_single(
                &contact(&[("NOMBRE", "Ana"), ("TELEFONO", "3105226770")]),
                "Hola {NOMBRE}",
            )
            .unwrap();
        assert_eq!(record.phone.as_str(), "573105226770");
        assert_eq!(record.link, "https://wa.me/573105226770?text=Hola%20Ana");
    }

    #[cfg(feature = "strict-phone")]
    #[test]
    fn test_api_provider_in_batch() {
        let processor = BatchProcessor::new(
            select_validator(ValidationMode::Strict),
            BatchOptions {
                provider: Provider::Api,
                ..BatchOptions::default()
            },
        );
        let table = ContactTable::from_rows(vec![contact(&[("TELEFONO", "310 522 6770")])]);
        let result = processor.process(&table, "Hola").unwrap();
        assert_eq!(
            result.links[0].link,
            "https://api.whatsapp.com/send?phone=573105226770&text=Hola"
        );
    }
}
