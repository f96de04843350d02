//! 统计汇总
//!
//! 纯函数，每次读取都基于当前存储重新计算，不做缓存。

use std::collections::HashSet;

use serde::Serialize;

use crate::models::classification::round_to;
use crate::models::{Item, LifecycleState};
use crate::store::ItemStore;

/// 批次统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    /// 已完成分析的数量
    pub analyzed: usize,
    pub failed: usize,
    pub unique_labels: usize,
    /// 已完成条目的平均置信度，保留 1 位小数
    pub average_confidence: f64,
}

/// 基于存储计算统计
pub fn compute_stats(store: &ItemStore) -> BatchStats {
    summarize(store.list_in_order())
}

/// 基于任意条目序列计算统计
pub fn summarize<'a, I>(items: I) -> BatchStats
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut stats = BatchStats::default();
    let mut labels = HashSet::new();
    let mut confidence_sum = 0.0;

    for item in items {
        stats.total += 1;
        match &item.state {
            LifecycleState::Completed(result) => {
                stats.analyzed += 1;
                labels.insert(result.label.as_str());
                confidence_sum += result.confidence;
            }
            LifecycleState::Failed(_) => stats.failed += 1,
            LifecycleState::Queued | LifecycleState::Analyzing => {}
        }
    }

    stats.unique_labels = labels.len();
    if stats.analyzed > 0 {
        stats.average_confidence = round_to(confidence_sum / stats.analyzed as f64, 1);
    }

    stats
}
