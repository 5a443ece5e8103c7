pub mod converter;
pub mod etl;
pub mod fallback;
pub mod fetcher;
pub mod filter;
pub mod pipeline;
pub mod writer;

pub use crate::domain::model::{ConfigDocument, DocumentOrigin, LoadReport, TransformResult};
pub use crate::domain::ports::{Pipeline, Publisher, Storage};
pub use crate::utils::error::Result;
