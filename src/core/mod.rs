pub mod batch;
pub mod engine;
pub mod export;
pub mod link;
pub mod phone;
pub mod qr;
pub mod sample;
pub mod template;

pub use crate::app::pipelines::bulk_pipeline::BulkPipeline;
pub use crate::domain::model::{BatchResult, ContactTable, LinkRecord, RawContact};
pub use crate::domain::ports::{ConfigProvider, PhoneValidator, Pipeline, Storage};
pub use crate::utils::error::Result;
