pub mod aggregate;
pub mod etl;
pub mod export;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod storage;

pub use crate::domain::model::{Evaluation, RunOptions, TextTable};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
