//! capmap - エンタープライズ能力マップのETLとインメモリ照会API
//!
//! このクレートは、エンタープライズの「能力マップ」（アプリケーション、
//! ビジネス能力、ドメイン、縦割り、機能、アプリケーション別成熟度スコア）を
//! 記述したスプレッドシートを取り込み、照会可能なインメモリ読み取りAPIとして
//! 公開します。
//!
//! 中核は、横持ちで非正規化されたシート行を4つのインデックス付きコレクション
//! （アプリケーション、Capability、ドメイン → 縦割り、縦割り → 機能）へ
//! 正規化するETLステージと、リクエストごとにそれらを横断して
//! フィルター・結合する照会レイヤーです。
//!
//! # 処理フロー
//!
//! SheetReader → CapabilityBuilder → IndexBuilder が起動時（または明示的な
//! リロード時）に1回実行され、DataCacheへ原子的に公開されます。
//! 各リクエストは現在のスナップショットに対してのみ照会を行い、
//! リロードを誘発することはありません。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use capmap::{query, DataCache};
//!
//! // ワークブックを取り込む（失敗しても空キャッシュのまま継続できる）
//! let cache = DataCache::new();
//! cache.reload_from(Path::new("capability-map.xlsx"));
//!
//! // スナップショットに対して照会する
//! let snapshot = cache.snapshot();
//! for domain in query::list_domains(&snapshot) {
//!     println!("{}: {:?}", domain, query::verticals_for(&snapshot, domain));
//! }
//! ```
//!
//! HTTPサーフェスとして公開する場合は[`server::router`]を使用します:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use capmap::{server::AppState, DataCache};
//!
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(DataCache::new());
//! let app = capmap::server::router(AppState { cache });
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod capability;
pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod reader;
pub mod server;
pub mod types;

// 公開API
pub use cache::{DataCache, Snapshot, APPLICATIONS_SHEET, MATRIX_SHEET};
pub use config::Settings;
pub use error::CapMapError;
pub use reader::SheetReader;
pub use types::{Application, Capability, CellValue, FunctionEntry, Row};
