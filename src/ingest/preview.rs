//! 预览图解码
//!
//! 在阻塞线程池中解码，完成时间与分析无关，可能晚于条目被移除；
//! 写回时按 id 查找，条目不在则丢弃。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ItemId, PreviewHandle, SourceAsset};
use crate::store::SharedStore;

/// 缩略图最长边
pub const THUMBNAIL_SIZE: u32 = 256;

/// 同步解码预览图
pub fn decode_preview(asset: &SourceAsset) -> AppResult<PreviewHandle> {
    let img = image::load_from_memory(&asset.data)
        .map_err(|e| AppError::ingest(asset.file_name.clone(), e))?;

    let thumbnail = img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);

    Ok(PreviewHandle {
        width: img.width(),
        height: img.height(),
        thumbnail: Arc::new(thumbnail),
    })
}

/// 在阻塞线程池中解码预览图
pub async fn decode_preview_async(asset: SourceAsset) -> AppResult<PreviewHandle> {
    let file_name = asset.file_name.clone();
    tokio::task::spawn_blocking(move || decode_preview(&asset))
        .await
        .map_err(|e| AppError::ingest(file_name, e))?
}

/// 异步解码并写回存储，返回是否写入成功
pub fn spawn_preview(store: SharedStore, id: ItemId, asset: SourceAsset) -> JoinHandle<bool> {
    tokio::spawn(async move {
        match decode_preview_async(asset).await {
            Ok(preview) => {
                debug!(
                    "[图片 {}] 预览图就绪 ({}x{})",
                    id, preview.width, preview.height
                );
                store.lock().await.attach_preview(id, preview)
            }
            Err(e) => {
                warn!("[图片 {}] 预览图解码失败: {}", id, e);
                false
            }
        }
    })
}
