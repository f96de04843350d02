use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 可视化阶段数量
pub const STAGE_COUNT: usize = 4;

/// 前三个阶段的示意耗时（秒），最后一个阶段使用实测延迟
const ILLUSTRATIVE_STAGES: [(&str, &str, f64); STAGE_COUNT - 1] = [
    ("图像预处理", "缩放至 224×224 并归一化到 [-1, 1]", 0.12),
    ("特征提取", "MobileNetV2 主干网络提取视觉特征", 0.35),
    ("品种分类", "对 50 个品种计算 softmax 概率", 0.08),
];

const FINAL_STAGE: (&str, &str) = ("结果返回", "远端推理服务返回 Top-5 预测");

/// 单个候选品种及其置信度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub label: String,
    /// 置信度，范围 [0, 100]
    pub confidence: f64,
}

impl RankedPrediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// 分类客户端返回的原始预测（尚未附加延迟）
#[derive(Debug, Clone, PartialEq)]
pub struct BreedPrediction {
    pub label: String,
    pub confidence: f64,
    /// 按置信度降序，最多 5 个，首项即 `label`
    pub ranked: Vec<RankedPrediction>,
}

impl BreedPrediction {
    /// 只有一个候选的预测，测试和演示用
    pub fn single(label: impl Into<String>, confidence: f64) -> Self {
        let label = label.into();
        Self {
            ranked: vec![RankedPrediction::new(label.clone(), confidence)],
            label,
            confidence,
        }
    }
}

/// 可视化阶段描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub elapsed_seconds: f64,
}

/// 单张图片的分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
    pub ranked_predictions: Vec<RankedPrediction>,
    pub stage_timeline: Vec<StageDescriptor>,
    pub measured_latency_seconds: f64,
}

impl ClassificationResult {
    /// 由客户端预测和调用方实测的耗时构建结果
    pub fn from_prediction(prediction: BreedPrediction, latency: Duration) -> Self {
        let measured_latency_seconds = round_to(latency.as_secs_f64(), 2);

        Self {
            label: prediction.label,
            confidence: prediction.confidence,
            ranked_predictions: prediction.ranked,
            stage_timeline: build_stage_timeline(measured_latency_seconds),
            measured_latency_seconds,
        }
    }

    /// 最后一个可视化阶段的索引
    pub fn last_stage_index(&self) -> usize {
        self.stage_timeline.len().saturating_sub(1)
    }
}

fn build_stage_timeline(latency_seconds: f64) -> Vec<StageDescriptor> {
    let mut timeline: Vec<StageDescriptor> = ILLUSTRATIVE_STAGES
        .iter()
        .map(|&(name, description, elapsed_seconds)| StageDescriptor {
            name,
            description,
            elapsed_seconds,
        })
        .collect();

    timeline.push(StageDescriptor {
        name: FINAL_STAGE.0,
        description: FINAL_STAGE.1,
        elapsed_seconds: latency_seconds,
    });

    timeline
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
