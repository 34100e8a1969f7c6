//! Configuration Module
//!
//! 環境変数からの設定読み込み。ワークブックの所在とHTTPバインドポートのみを扱う。

use std::path::PathBuf;

/// ワークブックパスを指定する環境変数名
pub const WORKBOOK_ENV: &str = "CAPMAP_WORKBOOK";

/// バインドポートを指定する環境変数名
pub const PORT_ENV: &str = "PORT";

/// デフォルトのワークブックパス
const DEFAULT_WORKBOOK: &str = "capability-map.xlsx";

/// デフォルトのバインドポート
const DEFAULT_PORT: u16 = 8080;

/// サービス設定
#[derive(Debug, Clone)]
pub struct Settings {
    /// 取り込むワークブックファイルのパス
    pub workbook_path: PathBuf,

    /// HTTPサーバーのバインドポート
    pub port: u16,
}

impl Settings {
    /// 環境変数から設定を読み込む（未設定・不正値はデフォルトへフォールバック）
    pub fn from_env() -> Self {
        let workbook_path = std::env::var(WORKBOOK_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORKBOOK));
        let port = std::env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            workbook_path,
            port,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK),
            port: DEFAULT_PORT,
        }
    }
}
