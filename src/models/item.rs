use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::models::classification::ClassificationResult;

/// 条目标识
///
/// 由 `ItemStore` 的单调计数器分配，生命周期内不变且永不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 原始图片数据，由外部持有，核心逻辑只读
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAsset {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl SourceAsset {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// 解码后的预览图
#[derive(Clone)]
pub struct PreviewHandle {
    /// 原图宽度
    pub width: u32,
    /// 原图高度
    pub height: u32,
    pub thumbnail: Arc<image::DynamicImage>,
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("thumbnail_width", &self.thumbnail.width())
            .field("thumbnail_height", &self.thumbnail.height())
            .finish()
    }
}

/// 条目生命周期状态
///
/// 结果和错误信息挂在状态上，二者天然互斥，排队和分析中时都不存在。
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState {
    Queued,
    Analyzing,
    Completed(ClassificationResult),
    Failed(String),
}

impl LifecycleState {
    /// 状态名（日志和报告用）
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Queued => "queued",
            LifecycleState::Analyzing => "analyzing",
            LifecycleState::Completed(_) => "completed",
            LifecycleState::Failed(_) => "failed",
        }
    }
}

/// 一张提交的图片及其分类生命周期记录
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub source_asset: SourceAsset,
    pub preview: Option<PreviewHandle>,
    pub state: LifecycleState,
    /// 展示用标记：成功后要等沉淀延迟结束才清除
    pub actively_analyzing: bool,
    pub visual_stage_index: usize,
}

impl Item {
    /// 新建排队中的条目
    pub fn queued(id: ItemId, source_asset: SourceAsset) -> Self {
        Self {
            id,
            source_asset,
            preview: None,
            state: LifecycleState::Queued,
            actively_analyzing: false,
            visual_stage_index: 0,
        }
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        match &self.state {
            LifecycleState::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            LifecycleState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, LifecycleState::Analyzing)
    }

    pub fn has_result(&self) -> bool {
        self.result().is_some()
    }
}
