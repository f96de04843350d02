//! 条目存储
//!
//! 生命周期状态的唯一记录来源。所有写入都按 id 作用在当前状态上，
//! 条目被移除后到达的迟到写入会因为查不到 id 而被丢弃。

use std::collections::{BTreeMap, HashMap};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::{Item, ItemId, PreviewHandle, SourceAsset};

/// 有序条目存储
///
/// id 单调递增，所以按 id 排序的 `BTreeMap` 迭代顺序就是创建顺序。
#[derive(Debug, Default)]
pub struct ItemStore {
    items: BTreeMap<ItemId, Item>,
    next_id: u64,
    /// 每个条目当前的展示类定时任务（沉淀延迟、阶段推进）
    cosmetic_tasks: HashMap<ItemId, CancellationToken>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一批排队中的条目，返回按提交顺序分配的 id
    pub fn add_items<I>(&mut self, assets: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = SourceAsset>,
    {
        assets
            .into_iter()
            .map(|asset| {
                let id = self.allocate_id();
                debug!("[图片 {}] 加入队列: {}", id, asset.file_name);
                self.items.insert(id, Item::queued(id, asset));
                id
            })
            .collect()
    }

    /// 移除条目并取消它的展示定时任务；id 不存在时什么也不做
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        self.cancel_cosmetic_task(id);
        self.items.remove(&id).is_some()
    }

    /// 清空所有条目，计数器不回退
    pub fn reset(&mut self) {
        for (_, token) in self.cosmetic_tasks.drain() {
            token.cancel();
        }
        self.items.clear();
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// 按创建顺序遍历
    pub fn list_in_order(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.values()
    }

    /// 当前所有条目的拷贝
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按 id 修改当前条目，条目不存在时返回 `None`
    pub fn update<R>(&mut self, id: ItemId, f: impl FnOnce(&mut Item) -> R) -> Option<R> {
        self.items.get_mut(&id).map(f)
    }

    /// 写入预览图，条目已被移除时丢弃
    pub fn attach_preview(&mut self, id: ItemId, preview: PreviewHandle) -> bool {
        let attached = self
            .update(id, |item| item.preview = Some(preview))
            .is_some();
        if !attached {
            debug!("[图片 {}] 条目已移除，丢弃预览图", id);
        }
        attached
    }

    /// 登记条目的展示定时任务，旧任务会被取消
    ///
    /// 条目不存在时立即取消传入的 token 并返回 `false`。
    pub fn register_cosmetic_task(&mut self, id: ItemId, token: CancellationToken) -> bool {
        if !self.items.contains_key(&id) {
            token.cancel();
            return false;
        }
        if let Some(previous) = self.cosmetic_tasks.insert(id, token) {
            previous.cancel();
        }
        true
    }

    /// 取消条目的展示定时任务
    pub fn cancel_cosmetic_task(&mut self, id: ItemId) {
        if let Some(token) = self.cosmetic_tasks.remove(&id) {
            token.cancel();
        }
    }

    /// 展示周期正常结束后注销 token
    ///
    /// token 已被取消说明登记项已换成了新周期（或条目已移除），此时保持不动。
    pub fn release_cosmetic_task(&mut self, id: ItemId, token: &CancellationToken) {
        if !token.is_cancelled() {
            self.cosmetic_tasks.remove(&id);
        }
    }

    pub fn cosmetic_task_count(&self) -> usize {
        self.cosmetic_tasks.len()
    }

    fn allocate_id(&mut self) -> ItemId {
        self.next_id += 1;
        ItemId(self.next_id)
    }
}
