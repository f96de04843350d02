//! 阶段推进 - 纯展示逻辑
//!
//! 条目分析成功后启动一个独立任务：
//! - 每个 tick 把 `visual_stage_index` 加一，最多到最后一个阶段
//! - 到达最后阶段、超过总时长或离开"分析中"窗口后停止
//! - 沉淀延迟结束后清除 `actively_analyzing`
//!
//! 任务持有 `CancellationToken`，条目被移除、会话重置或重新分析时取消；
//! 正常结束时从存储中注销自己的 token。
//! 所有写入都按 id 作用在当前存储上，与分类结果的正确性无关。

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::TimingSettings;
use crate::models::ItemId;
use crate::store::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageStep {
    Continue,
    Stop,
}

/// 启动条目的展示周期（阶段推进 + 沉淀延迟）
///
/// token 需要事先在存储中登记，移除条目时才能被取消。
pub fn spawn_cosmetic_cycle(
    store: SharedStore,
    id: ItemId,
    timing: TimingSettings,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("[图片 {}] 展示周期已取消", id);
            }
            _ = async {
                tokio::join!(
                    drive_stages(&store, id, timing.stage_tick, timing.stage_total),
                    settle(&store, id, timing.settle_delay),
                )
            } => {
                store.lock().await.release_cosmetic_task(id, &token);
                debug!("[图片 {}] 展示周期结束", id);
            }
        }
    })
}

/// 按固定间隔推进阶段索引
pub async fn drive_stages(store: &SharedStore, id: ItemId, tick: Duration, total: Duration) {
    let deadline = Instant::now() + total;
    let mut ticker = time::interval_at(Instant::now() + tick, tick);

    loop {
        tokio::select! {
            biased;
            _ = time::sleep_until(deadline) => break,
            _ = ticker.tick() => {}
        }

        let step = store.lock().await.update(id, advance_stage);
        if step != Some(StageStep::Continue) {
            break;
        }
    }
}

/// 沉淀延迟结束后清除"分析中"展示标记
async fn settle(store: &SharedStore, id: ItemId, delay: Duration) {
    time::sleep(delay).await;
    store.lock().await.update(id, |item| {
        if item.has_result() {
            item.actively_analyzing = false;
        }
    });
}

fn advance_stage(item: &mut crate::models::Item) -> StageStep {
    if !item.actively_analyzing {
        return StageStep::Stop;
    }
    let last = match item.result() {
        Some(result) => result.last_stage_index(),
        None => return StageStep::Stop,
    };

    if item.visual_stage_index < last {
        item.visual_stage_index += 1;
    }

    if item.visual_stage_index >= last {
        StageStep::Stop
    } else {
        StageStep::Continue
    }
}
