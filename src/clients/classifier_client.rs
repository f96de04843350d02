//! 品种分类 API 客户端
//!
//! 封装与远端推理服务 `/`、`/predict`、`/health` 的 HTTP 交互
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clients::Classifier;
use crate::config::Config;
use crate::error::{AppResult, ClassifyError};
use crate::models::{is_known_breed, BreedPrediction, RankedPrediction, SourceAsset};

/// 单次响应最多携带的候选数
const MAX_RANKED: usize = 5;

/// 推理服务健康状态
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub model_loaded: bool,
    pub num_classes: usize,
}

/// 推理服务基本信息（`GET /`）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: String,
    pub total_classes: usize,
    pub class_names: Vec<String>,
}

/// `/predict` 成功响应
#[derive(Debug, Deserialize)]
struct PredictResponse {
    predicted_breed: String,
    confidence: f64,
    top_5_predictions: Vec<TopPrediction>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopPrediction {
    breed: String,
    confidence: f64,
}

/// 品种分类客户端
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
    /// 服务端类别列表，调用 `service_info` 之后才有
    class_names: RwLock<Option<Arc<HashSet<String>>>>,
}

impl ClassifierClient {
    /// 创建新的分类客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_base_url(&config.api_base_url)
    }

    /// 使用指定服务地址创建
    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            class_names: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 查询推理服务健康状态
    pub async fn health(&self) -> Result<ServiceHealth, ClassifyError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClassifyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClassifyError::MalformedResponse(e.to_string()))
    }

    /// 查询服务端类别列表，之后的响应按该列表校验品种
    pub async fn service_info(&self) -> Result<ServiceInfo, ClassifyError> {
        let url = format!("{}/", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClassifyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let info: ServiceInfo = serde_json::from_str(&body)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;

        if info.total_classes != info.class_names.len() {
            warn!(
                "⚠️ 服务端类别数不一致: total_classes={}, class_names={}",
                info.total_classes,
                info.class_names.len()
            );
        }

        let labels: HashSet<String> = info.class_names.iter().cloned().collect();
        info!("✓ 已获取服务端类别列表: {} 个", labels.len());
        *self.class_names.write().await = Some(Arc::new(labels));

        Ok(info)
    }

    /// 构建上传表单
    fn build_form(asset: &SourceAsset) -> Form {
        let part = Part::bytes(asset.data.to_vec()).file_name(asset.file_name.clone());
        let part = match part.mime_str(&asset.mime_type) {
            Ok(part) => part,
            Err(e) => {
                warn!("无效的 MIME 类型 '{}': {}，按未知类型上传", asset.mime_type, e);
                Part::bytes(asset.data.to_vec()).file_name(asset.file_name.clone())
            }
        };
        Form::new().part("file", part)
    }
}

#[async_trait]
impl Classifier for ClassifierClient {
    async fn classify(&self, asset: &SourceAsset) -> Result<BreedPrediction, ClassifyError> {
        let url = format!("{}/predict", self.base_url);
        debug!(
            "上传图片 {} ({} 字节) 到 {}",
            asset.file_name,
            asset.data.len(),
            url
        );

        let response = self
            .http
            .post(&url)
            .multipart(Self::build_form(asset))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("分类服务返回 {}: {}", status, body);
            return Err(ClassifyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = serde_json::from_str(&body)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;

        if let Some(echo) = &parsed.filename {
            debug!("服务端回显文件名: {}", echo);
        }

        let labels = self.class_names.read().await.clone();
        validate_prediction(parsed, labels.as_deref())
    }
}

/// 校验品种标签
///
/// 有服务端类别列表时严格按列表校验；没有时只要求非空，
/// 本地目录之外的标签记一条调试日志后照常接受。
fn check_label(label: &str, labels: Option<&HashSet<String>>) -> Result<(), String> {
    if label.trim().is_empty() {
        return Err("品种为空".to_string());
    }
    match labels {
        Some(labels) if !labels.contains(label) => Err(format!("未知品种: {}", label)),
        Some(_) => Ok(()),
        None => {
            if !is_known_breed(label) {
                debug!("品种 {} 不在本地目录中", label);
            }
            Ok(())
        }
    }
}

/// 校验响应并转换为预测结果
fn validate_prediction(
    response: PredictResponse,
    labels: Option<&HashSet<String>>,
) -> Result<BreedPrediction, ClassifyError> {
    let malformed = |msg: String| Err(ClassifyError::MalformedResponse(msg));

    if let Err(msg) = check_label(&response.predicted_breed, labels) {
        return malformed(msg);
    }
    if !is_valid_confidence(response.confidence) {
        return malformed(format!("置信度超出范围: {}", response.confidence));
    }
    if response.top_5_predictions.is_empty() || response.top_5_predictions.len() > MAX_RANKED {
        return malformed(format!(
            "候选数量应为 1..={}，实际为 {}",
            MAX_RANKED,
            response.top_5_predictions.len()
        ));
    }

    let mut ranked = Vec::with_capacity(response.top_5_predictions.len());
    for candidate in response.top_5_predictions {
        if let Err(msg) = check_label(&candidate.breed, labels) {
            return malformed(format!("候选中的{}", msg));
        }
        if !is_valid_confidence(candidate.confidence) {
            return malformed(format!("候选置信度超出范围: {}", candidate.confidence));
        }
        ranked.push(RankedPrediction::new(candidate.breed, candidate.confidence));
    }

    // 服务端保留 2 位小数，低置信度候选可能并列，只要求不升序
    if ranked.windows(2).any(|w| w[0].confidence < w[1].confidence) {
        return malformed("候选未按置信度降序排列".to_string());
    }
    if ranked[0].label != response.predicted_breed {
        return malformed(format!(
            "首个候选 {} 与预测品种 {} 不一致",
            ranked[0].label, response.predicted_breed
        ));
    }

    Ok(BreedPrediction {
        label: response.predicted_breed,
        confidence: response.confidence,
        ranked,
    })
}

fn is_valid_confidence(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}
