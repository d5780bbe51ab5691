use crate::core::batch::{BatchOptions, BatchProcessor};
use crate::core::export::{archive_file_name, build_archive, links_csv, LINKS_CSV_NAME};
use crate::core::phone::select_validator;
use crate::core::qr::QrEncoder;
use crate::core::{BatchResult, ConfigProvider, ContactTable, Pipeline, Storage};
use crate::domain::model::LoadReport;
use crate::utils::error::{LinkGenError, Result};

/// Contacts CSV in, `links.csv` (and optionally a QR archive) out.
pub struct BulkPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> BulkPipeline<S, C> {
    /// `source` resolves the input path, `sink` receives the output files.
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    fn processor(&self) -> BatchProcessor {
        BatchProcessor::new(
            select_validator(self.config.phone_validation()),
            BatchOptions {
                region: self.config.region(),
                provider: self.config.provider(),
                render: self.config.render_options(),
                on_missing_variable: self.config.missing_variable_policy(),
            },
        )
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path(), name)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BulkPipeline<S, C> {
    async fn extract(&self) -> Result<ContactTable> {
        let path = self.config.input_path();
        tracing::debug!("Reading contacts from: {}", path);

        let data = self
            .source
            .read_file(path)
            .await
            .map_err(|e| LinkGenError::UnreadableInput {
                message: format!("{}: {}", path, e),
            })?;

        let table = ContactTable::from_csv_bytes(&data)?;
        tracing::debug!("Columns: {:?}", table.headers);
        Ok(table)
    }

    async fn transform(&self, table: ContactTable) -> Result<BatchResult> {
        self.processor().process(&table, self.config.template())
    }

    async fn load(&self, result: BatchResult) -> Result<LoadReport> {
        let mut summary = result.summary();
        let csv = links_csv(&result.links)?;

        tracing::debug!("Writing {} ({} bytes)", LINKS_CSV_NAME, csv.len());
        self.sink.write_file(LINKS_CSV_NAME, &csv).await?;

        let archive_path = match self.config.qr_settings() {
            Some(settings) => {
                let archive = build_archive(&result.links, &csv, &QrEncoder::new(settings))?;
                if !archive.qr_available {
                    tracing::info!(
                        "ℹ️ Install a build with QR support to export QR images in bulk"
                    );
                }
                summary.qr_images = archive.qr_images;

                let name = archive_file_name(chrono::Local::now().naive_local());
                tracing::debug!("Writing {} ({} bytes)", name, archive.bytes.len());
                self.sink.write_file(&name, &archive.bytes).await?;
                Some(self.output_file(&name))
            }
            None => None,
        };

        Ok(LoadReport {
            links_csv_path: self.output_file(LINKS_CSV_NAME),
            archive_path,
            summary,
        })
    }
}
