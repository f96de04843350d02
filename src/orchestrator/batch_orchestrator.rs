//! 批量分类编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个核心的状态机，负责单张图片的分析流程和批量分析调度。
//!
//! ## 核心功能
//!
//! 1. **单张分析**：`Queued/Failed → Analyzing → Completed/Failed`
//! 2. **重入保护**：同一条目同一时间最多只有一个请求在途
//! 3. **批量分析**：按存储顺序逐张处理，并发度固定为 1
//! 4. **失败继续**：单张失败不会中断批量分析
//! 5. **迟到丢弃**：请求在途时条目被移除，结果返回后直接丢弃
//!
//! ## 设计特点
//!
//! - 存储锁只在状态切换时短暂持有，调用分类服务期间不持锁
//! - 会话级批量锁与条目级重入保护相互独立，批量分析期间允许手动分析单张
//! - 沉淀延迟和阶段推进只影响展示字段，读取结果不依赖定时器

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clients::Classifier;
use crate::config::TimingSettings;
use crate::error::OrchestratorError;
use crate::models::{
    ClassificationResult, Item, ItemId, LifecycleState, PreviewHandle, SourceAsset,
};
use crate::orchestrator::stage_driver;
use crate::stats::{compute_stats, BatchStats};
use crate::store::{ItemStore, SharedStore};
use crate::utils::logging::truncate_text;

/// 单张分析的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    /// 分析成功
    Completed { label: String, confidence: f64 },
    /// 分析失败，错误信息已写回条目
    Failed { message: String },
    /// 请求在途时条目被移除，结果已丢弃
    Discarded,
}

/// 批量分析统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 开始时选中的条目数
    pub selected: usize,
    pub completed: usize,
    pub failed: usize,
    /// 被移除或正在被手动分析而跳过的条目
    pub skipped: usize,
}

/// 批量锁，离开作用域时自动释放
struct SweepGuard {
    flag: Arc<AtomicBool>,
}

impl SweepGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 批量分类编排器
///
/// 克隆开销很小，所有克隆共享同一个存储和批量锁。
#[derive(Clone)]
pub struct BatchOrchestrator {
    classifier: Arc<dyn Classifier>,
    store: SharedStore,
    sweep_active: Arc<AtomicBool>,
    timing: TimingSettings,
}

impl BatchOrchestrator {
    /// 创建新的编排器（空会话）
    pub fn new(classifier: Arc<dyn Classifier>, timing: TimingSettings) -> Self {
        Self {
            classifier,
            store: Arc::new(Mutex::new(ItemStore::new())),
            sweep_active: Arc::new(AtomicBool::new(false)),
            timing,
        }
    }

    /// 共享存储（预览图解码等外部协作方使用）
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    /// 加入一批图片，返回按提交顺序分配的 id
    pub async fn add_items(&self, assets: Vec<SourceAsset>) -> Vec<ItemId> {
        let ids = self.store.lock().await.add_items(assets);
        info!("✓ 新增 {} 张图片", ids.len());
        ids
    }

    /// 移除条目；不存在时什么也不做
    pub async fn remove_item(&self, id: ItemId) -> bool {
        let removed = self.store.lock().await.remove_item(id);
        if removed {
            info!("[图片 {}] 已移除", id);
        }
        removed
    }

    /// 清空会话
    pub async fn reset(&self) {
        self.store.lock().await.reset();
        info!("🧹 会话已清空");
    }

    pub async fn get(&self, id: ItemId) -> Option<Item> {
        self.store.lock().await.get(id).cloned()
    }

    /// 按创建顺序返回所有条目的拷贝
    pub async fn snapshot(&self) -> Vec<Item> {
        self.store.lock().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    /// 写入预览图，条目已被移除时丢弃
    pub async fn attach_preview(&self, id: ItemId, preview: PreviewHandle) -> bool {
        self.store.lock().await.attach_preview(id, preview)
    }

    /// 基于当前存储重新计算统计
    pub async fn stats(&self) -> BatchStats {
        compute_stats(&*self.store.lock().await)
    }

    pub fn is_sweep_active(&self) -> bool {
        self.sweep_active.load(Ordering::Acquire)
    }

    /// 分析单张图片
    ///
    /// 失败的条目再次调用即为手动重试。分类失败不算错误，写回条目后以
    /// `AnalyzeOutcome::Failed` 返回；`Err` 只表示本次调用被拒绝。
    pub async fn analyze(&self, id: ItemId) -> Result<AnalyzeOutcome, OrchestratorError> {
        let asset = self.begin_analysis(id).await?;

        info!("[图片 {}] 🔍 开始分析: {}", id, asset.file_name);
        let started = Instant::now();
        let response = self.classifier.classify(&asset).await;
        let latency = started.elapsed();

        let mut store = self.store.lock().await;

        let outcome = match response {
            Ok(prediction) => {
                let result = ClassificationResult::from_prediction(prediction, latency);
                let outcome = AnalyzeOutcome::Completed {
                    label: result.label.clone(),
                    confidence: result.confidence,
                };
                let written = store.update(id, move |item| {
                    item.state = LifecycleState::Completed(result);
                    item.visual_stage_index = 0;
                });
                if written.is_some() {
                    self.start_cosmetic_cycle(&mut store, id);
                }
                written.map(|_| outcome)
            }
            Err(err) => {
                let message = err.to_string();
                let outcome = AnalyzeOutcome::Failed {
                    message: message.clone(),
                };
                store
                    .update(id, move |item| {
                        item.state = LifecycleState::Failed(message);
                        item.actively_analyzing = false;
                        item.visual_stage_index = 0;
                    })
                    .map(|_| outcome)
            }
        };
        drop(store);

        match outcome {
            Some(AnalyzeOutcome::Completed { label, confidence }) => {
                info!(
                    "[图片 {}] ✓ 识别为 {} (置信度: {:.2}%, 耗时 {:.2}s)",
                    id,
                    label,
                    confidence,
                    latency.as_secs_f64()
                );
                Ok(AnalyzeOutcome::Completed { label, confidence })
            }
            Some(AnalyzeOutcome::Failed { message }) => {
                warn!("[图片 {}] ❌ 分析失败: {}", id, truncate_text(&message, 120));
                Ok(AnalyzeOutcome::Failed { message })
            }
            Some(AnalyzeOutcome::Discarded) | None => {
                debug!("[图片 {}] 条目已移除，丢弃迟到的分析结果", id);
                Ok(AnalyzeOutcome::Discarded)
            }
        }
    }

    /// 批量分析所有尚无结果的条目
    ///
    /// 严格顺序执行：等上一张进入终态后才发起下一张请求。
    /// 同一时间只允许一次批量分析，重复调用返回 `SweepInProgress`。
    pub async fn analyze_all(&self) -> Result<SweepReport, OrchestratorError> {
        let _guard = SweepGuard::acquire(&self.sweep_active).ok_or_else(|| {
            warn!("⚠️ 批量分析正在进行中，忽略本次请求");
            OrchestratorError::SweepInProgress
        })?;

        let selected: Vec<ItemId> = self
            .store
            .lock()
            .await
            .list_in_order()
            .filter(|item| !item.has_result())
            .map(|item| item.id)
            .collect();

        let mut report = SweepReport {
            selected: selected.len(),
            ..Default::default()
        };

        for (index, id) in selected.into_iter().enumerate() {
            debug!("批量分析进度: {}/{}", index + 1, report.selected);

            match self.analyze(id).await {
                Ok(AnalyzeOutcome::Completed { .. }) => report.completed += 1,
                Ok(AnalyzeOutcome::Failed { .. }) => report.failed += 1,
                Ok(AnalyzeOutcome::Discarded) => report.skipped += 1,
                Err(e) => {
                    info!("[图片 {}] 跳过: {}", id, e);
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// 重入检查并切换到 `Analyzing`，在同一个临界区内完成
    async fn begin_analysis(&self, id: ItemId) -> Result<SourceAsset, OrchestratorError> {
        let mut store = self.store.lock().await;

        let asset = store
            .update(id, |item| {
                if item.is_analyzing() {
                    return Err(OrchestratorError::AlreadyAnalyzing(id));
                }
                if item.has_result() {
                    return Err(OrchestratorError::AlreadyCompleted(id));
                }
                item.state = LifecycleState::Analyzing;
                item.actively_analyzing = true;
                item.visual_stage_index = 0;
                Ok(item.source_asset.clone())
            })
            .ok_or(OrchestratorError::ItemNotFound(id))??;

        store.cancel_cosmetic_task(id);
        Ok(asset)
    }

    fn start_cosmetic_cycle(&self, store: &mut ItemStore, id: ItemId) {
        let token = CancellationToken::new();
        if store.register_cosmetic_task(id, token.clone()) {
            stage_driver::spawn_cosmetic_cycle(self.store.clone(), id, self.timing, token);
        }
    }
}
