use anyhow::Result;
use breed_batch_classifier::utils::logging;
use breed_batch_classifier::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（命令行第一个参数可覆盖图片目录）
    let mut config = Config::load()?;
    if let Some(folder) = std::env::args().nth(1) {
        config.image_folder = folder;
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
