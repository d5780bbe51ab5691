use crate::core::Pipeline;
use crate::domain::model::LoadReport;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a pipeline through extract, transform and load, in that order.
pub struct LinkEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> LinkEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadReport> {
        let started = Instant::now();
        tracing::info!("🚀 Starting link generation");

        tracing::info!("📥 Reading contacts...");
        let table = self.pipeline.extract().await?;
        tracing::info!("Read {} rows", table.len());

        tracing::info!("🔗 Building links...");
        let result = self.pipeline.transform(table).await?;

        tracing::info!("💾 Writing output...");
        let report = self.pipeline.load(result).await?;

        tracing::info!(
            "Finished in {:?}: {} links, {} invalid phones",
            started.elapsed(),
            report.summary.generated,
            report.summary.invalid_phone_rows.len()
        );
        Ok(report)
    }
}
