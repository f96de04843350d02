//! # Breed Batch Classifier
//!
//! 批量提交牛品种图片到远端推理服务并跟踪每张图片的识别进度
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models / Store）
//! - `models/` - 条目、分类结果、品种目录
//! - `store/` - `ItemStore`，生命周期状态的唯一记录来源
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - `Classifier` 契约与基于 reqwest 的 `ClassifierClient`
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_orchestrator` - 单张分析状态机、批量顺序分析
//! - `orchestrator/stage_driver` - 成功后的阶段推进与沉淀延迟
//!
//! ### ④ 派生与外围（Stats / Ingest / App）
//! - `stats` - 纯函数统计汇总
//! - `ingest/` - 读取图片目录、异步解码预览图
//! - `app` - 命令行应用入口
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod stats;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use clients::{Classifier, ClassifierClient};
pub use config::{Config, TimingSettings};
pub use error::{AppError, AppResult, ClassifyError, OrchestratorError};
pub use models::{ClassificationResult, Item, ItemId, LifecycleState, SourceAsset};
pub use orchestrator::{AnalyzeOutcome, BatchOrchestrator, SweepReport};
pub use stats::{compute_stats, BatchStats};
pub use store::ItemStore;
