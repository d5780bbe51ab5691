pub mod bulk_pipeline;
