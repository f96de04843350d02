//! 分类报告
//!
//! 批量分析结束后把每张图片的结果和汇总统计写成 JSON 文件
use std::path::Path;

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{Item, RankedPrediction};
use crate::stats::{summarize, BatchStats};

/// 单张图片的报告条目
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub id: u64,
    pub file_name: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_predictions: Vec<RankedPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Item> for ItemReport {
    fn from(item: &Item) -> Self {
        let result = item.result();
        Self {
            id: item.id.0,
            file_name: item.source_asset.file_name.clone(),
            state: item.state.name(),
            label: result.map(|r| r.label.clone()),
            confidence: result.map(|r| r.confidence),
            top_predictions: result
                .map(|r| r.ranked_predictions.clone())
                .unwrap_or_default(),
            latency_seconds: result.map(|r| r.measured_latency_seconds),
            error: item.error_message().map(str::to_string),
        }
    }
}

/// 完整报告
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub generated_at: String,
    pub stats: BatchStats,
    pub items: Vec<ItemReport>,
}

impl ClassificationReport {
    /// 基于条目快照生成报告
    pub fn build(items: &[Item]) -> Self {
        Self {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            stats: summarize(items),
            items: items.iter().map(ItemReport::from).collect(),
        }
    }

    /// 写入 JSON 文件
    pub fn write_to(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
