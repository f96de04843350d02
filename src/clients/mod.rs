pub mod classifier_client;

use async_trait::async_trait;

use crate::error::ClassifyError;
use crate::models::{BreedPrediction, SourceAsset};

pub use classifier_client::{ClassifierClient, ServiceHealth, ServiceInfo};

/// 远端分类服务契约
///
/// 每次调用只发一次请求，不做重试也不设超时，由调用方决定。
/// 耗时由调用方测量。
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, asset: &SourceAsset) -> Result<BreedPrediction, ClassifyError>;
}
