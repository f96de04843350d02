//! 应用入口 - 批量识别一个目录中的所有图片
//!
//! 初始化 → 健康检查 → 加载图片 → 预览图解码 → 批量分析 → 统计与报告

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::clients::ClassifierClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::ingest::{load_image_folder, spawn_preview};
use crate::models::{compare_with_catalogue, BREED_COUNT};
use crate::orchestrator::BatchOrchestrator;
use crate::stats::BatchStats;
use crate::utils::logging::{
    log_images_loaded, log_startup, log_sweep_complete, log_sweep_start, print_final_stats,
};
use crate::utils::report::ClassificationReport;

/// 应用主结构
pub struct App {
    config: Config,
    client: Arc<ClassifierClient>,
    orchestrator: BatchOrchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config.api_base_url, &config.image_folder);

        let client = Arc::new(ClassifierClient::new(&config)?);
        let orchestrator = BatchOrchestrator::new(client.clone(), config.timing());

        Ok(Self {
            config,
            client,
            orchestrator,
        })
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// 运行应用主逻辑，返回最终统计
    pub async fn run(&self) -> AppResult<BatchStats> {
        if self.config.check_health {
            self.check_health().await;
        }

        info!("\n📁 正在扫描待识别的图片...");
        let assets = load_image_folder(&self.config.image_folder).await?;

        if assets.is_empty() {
            warn!("⚠️ 没有找到待识别的图片，程序结束");
            return Ok(self.orchestrator.stats().await);
        }
        log_images_loaded(assets.len());

        let ids = self.orchestrator.add_items(assets.clone()).await;

        // 预览图解码与分析互不依赖
        let previews: Vec<_> = ids
            .iter()
            .zip(assets)
            .map(|(&id, asset)| spawn_preview(self.orchestrator.store(), id, asset))
            .collect();

        log_sweep_start(ids.len());
        let report = self.orchestrator.analyze_all().await?;
        log_sweep_complete(&report);

        let attached = join_all(previews)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(true)))
            .count();
        info!("🖼️ 预览图就绪: {}/{}", attached, ids.len());

        let snapshot = self.orchestrator.snapshot().await;
        let classification_report = ClassificationReport::build(&snapshot);
        classification_report.write_to(&self.config.report_file)?;

        let stats = self.orchestrator.stats().await;
        print_final_stats(&stats, &self.config.report_file);

        Ok(stats)
    }

    /// 检查推理服务状态并获取类别列表，失败只记录不中断
    async fn check_health(&self) {
        match self.client.health().await {
            Ok(health) if health.model_loaded => {
                info!(
                    "✓ 推理服务就绪: status={}, 类别数={}",
                    health.status, health.num_classes
                );
                if health.num_classes != BREED_COUNT {
                    warn!(
                        "⚠️ 服务端类别数 {} 与本地品种目录 {} 不一致",
                        health.num_classes, BREED_COUNT
                    );
                }
            }
            Ok(health) => {
                warn!("⚠️ 推理服务模型未加载: status={}", health.status);
            }
            Err(e) => {
                error!("❌ 推理服务健康检查失败 ({}): {}", self.client.base_url(), e);
                return;
            }
        }

        match self.client.service_info().await {
            Ok(info) => {
                let diff = compare_with_catalogue(&info.class_names);
                if !diff.is_empty() {
                    warn!(
                        "⚠️ 服务端类别与本地目录不同，以服务端为准: 缺少 {:?}，新增 {:?}",
                        diff.missing, diff.unexpected
                    );
                }
            }
            Err(e) => {
                warn!("⚠️ 获取服务端类别列表失败，只校验品种非空: {}", e);
            }
        }
    }
}
