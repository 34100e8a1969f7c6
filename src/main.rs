//! capmap service binary
//!
//! 起動時にワークブックを取り込み、能力マップの照会APIをHTTPで公開する。
//! ワークブックが存在しない場合も空キャッシュのまま稼働を続ける（非致命）。

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capmap::server::AppState;
use capmap::{DataCache, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ初期化
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capmap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    tracing::info!("Starting capmap service");

    // 起動時ロード: 失敗は非致命（空キャッシュのまま稼働を続ける）
    let cache = Arc::new(DataCache::new());
    if !cache.reload_from(&settings.workbook_path) {
        tracing::warn!(
            "serving with empty cache until a valid workbook is provided at {}",
            settings.workbook_path.display()
        );
    }

    let app = capmap::server::router(AppState { cache });

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("capmap API listening on http://{}", addr);
    tracing::info!("  /health");
    tracing::info!("  /api/applications");
    tracing::info!("  /api/capabilities");
    tracing::info!("  /api/applications/by-capability");
    tracing::info!("  /api/domains");
    tracing::info!("  /api/verticals");
    tracing::info!("  /api/functions");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
