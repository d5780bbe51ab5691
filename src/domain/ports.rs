use crate::core::batch::MissingVariablePolicy;
use crate::core::phone::ValidationMode;
use crate::core::qr::QrSettings;
use crate::core::template::RenderOptions;
use crate::domain::model::{BatchResult, CanonicalPhone, ContactTable, LoadReport, Provider, Region};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn region(&self) -> Region;
    fn provider(&self) -> Provider;
    fn template(&self) -> &str;
    fn render_options(&self) -> RenderOptions;
    /// `None` when no QR archive was requested.
    fn qr_settings(&self) -> Option<QrSettings>;
    fn phone_validation(&self) -> ValidationMode;
    fn missing_variable_policy(&self) -> MissingVariablePolicy;
}

/// Turns raw phone text into a canonical number for a default region.
/// Implementations never fail; rejection is the empty `CanonicalPhone`.
pub trait PhoneValidator: Send + Sync {
    fn normalize(&self, raw: &str, region: Region) -> CanonicalPhone;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ContactTable>;
    async fn transform(&self, table: ContactTable) -> Result<BatchResult>;
    async fn load(&self, result: BatchResult) -> Result<LoadReport>;
}
