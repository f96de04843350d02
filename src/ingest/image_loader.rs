use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::SourceAsset;

/// 支持的图片扩展名（小写）及对应的 MIME 类型
pub const IMAGE_EXTENSIONS: [(&str, &str); 6] = [
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
];

/// 根据扩展名推断 MIME 类型，不支持的格式返回 `None`
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|&(_, mime)| mime)
}

/// 读取单张图片
pub async fn load_image_file(path: &Path) -> AppResult<SourceAsset> {
    let mime_type = mime_for_path(path)
        .ok_or_else(|| AppError::ingest(path.display().to_string(), "不支持的图片格式"))?;

    let data = fs::read(path)
        .await
        .map_err(|e| AppError::ingest(path.display().to_string(), e))?;

    if data.is_empty() {
        return Err(AppError::ingest(path.display().to_string(), "文件为空"));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(SourceAsset::new(file_name, mime_type, data))
}

/// 从文件夹中加载所有图片（不递归，按文件名排序）
///
/// 读取失败的文件记录警告后跳过。
pub async fn load_image_folder(folder_path: &str) -> AppResult<Vec<SourceAsset>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(AppError::ingest(folder_path, "文件夹不存在"));
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && mime_for_path(&path).is_some() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        match load_image_file(&path).await {
            Ok(asset) => {
                tracing::debug!("已读取: {} ({} 字节)", asset.file_name, asset.data.len());
                assets.push(asset);
            }
            Err(e) => {
                tracing::warn!("加载图片失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(assets)
}
