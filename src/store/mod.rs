pub mod item_store;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use item_store::ItemStore;

/// 在编排器、阶段推进任务和调用方之间共享的存储
pub type SharedStore = Arc<Mutex<ItemStore>>;
