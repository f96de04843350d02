//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_orchestrator` - 批量分类编排器
//! - 单张分析的状态机与重入保护
//! - 批量分析（顺序执行、失败继续、会话级互斥）
//! - 迟到结果的丢弃
//!
//! ### `stage_driver` - 阶段推进
//! - 成功后的可视化阶段推进与沉淀延迟
//! - 每个条目一个可取消的任务
//!
//! ## 层次关系
//!
//! ```text
//! batch_orchestrator (处理整个会话)
//!     ↓
//! clients::Classifier (单次远端调用)
//!     ↓
//! store::ItemStore (状态写回)
//!     ↓
//! stage_driver / stats (只读派生)
//! ```

pub mod batch_orchestrator;
pub mod stage_driver;

pub use batch_orchestrator::{AnalyzeOutcome, BatchOrchestrator, SweepReport};
