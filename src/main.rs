//! Vocalis - 文本转语音服务
//!
//! - Domain: speech/ (值对象), 文本分割
//! - Application: commands, queries, ports, performer
//! - Infrastructure: http, adapters

use vocalis::config::{load_config, print_config, LogConfig};
use vocalis::infrastructure::build_performer;
use vocalis::infrastructure::http::{AppState, HttpServer};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},vocalis={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Vocalis - 文本转语音服务");
    print_config(&config);

    // 创建合成引擎与门面
    let performer = build_performer(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create synthesizer: {}", e))?;

    let state = AppState::new(performer, config.engine.backend.as_str());
    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
