//! Data Cache Module
//!
//! 4つの派生コレクション（アプリケーション、Capability、ドメイン → 縦割り、
//! 縦割り → 機能）を保持するプロセス全体のキャッシュ。
//!
//! スナップショットは1回のロードパスで原子的に構築され、読み手は常に
//! 一貫した1世代のみを観測する。部分更新は存在しない（Capability列と
//! 派生インデックスの間の相互参照が不整合になるのを避けるため）。

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::capability::build_capabilities;
use crate::error::CapMapError;
use crate::index::{build_domains, build_functions_by_vertical, build_verticals_by_domain};
use crate::reader::SheetReader;
use crate::types::{Application, Capability, FunctionEntry, Row};

/// アプリケーション一覧シートの名前
pub const APPLICATIONS_SHEET: &str = "Applications";

/// 能力マトリクスシートの名前
pub const MATRIX_SHEET: &str = "Matrix";

/// 1回のロードパスで構築される、内部的に一貫した1世代のデータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Applicationsシート由来のアプリケーション一覧（格納順 = シート行順）
    pub applications: Vec<Application>,

    /// Matrixシート由来のCapability一覧（格納順 = シート行順）
    pub capabilities: Vec<Capability>,

    /// 重複のないドメイン一覧（初出順）
    pub domains: Vec<String>,

    /// ドメイン → 縦割り一覧
    pub verticals_by_domain: BTreeMap<String, Vec<String>>,

    /// 縦割り → 機能エントリ一覧
    pub functions_by_vertical: BTreeMap<String, Vec<FunctionEntry>>,

    /// ワークブックのロードに成功した世代かどうか
    pub loaded: bool,
}

impl Snapshot {
    /// 生の行レコードからスナップショットを構築する
    ///
    /// CapabilityBuilder → IndexBuilder を順に実行し、4つのコレクションを
    /// 1パスで同時に導出します。
    pub fn build(application_rows: &[Row], matrix_rows: &[Row]) -> Self {
        let applications = application_rows.iter().map(Application::from_row).collect();
        let capabilities = build_capabilities(matrix_rows);
        let domains = build_domains(&capabilities);
        let verticals_by_domain = build_verticals_by_domain(&capabilities);
        let functions_by_vertical = build_functions_by_vertical(&capabilities);

        Self {
            applications,
            capabilities,
            domains,
            verticals_by_domain,
            functions_by_vertical,
            loaded: true,
        }
    }

    /// ワークブックファイルからスナップショットを構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Snapshot)` - 取り込みに成功した場合
    /// * `Err(CapMapError::SourceUnavailable)` - ファイルが取得できない場合
    /// * `Err(CapMapError::SheetNotFound)` - 必要なシートが存在しない場合
    pub fn load(path: &Path) -> Result<Self, CapMapError> {
        let mut reader = SheetReader::open(path)?;
        let application_rows = reader.read_rows(APPLICATIONS_SHEET)?;
        let matrix_rows = reader.read_rows(MATRIX_SHEET)?;
        Ok(Self::build(&application_rows, &matrix_rows))
    }
}

/// プロセス全体のデータキャッシュ
///
/// 状態は`Empty`（初期、全コレクション空）と`Loaded`（1回のロードパスで
/// 一貫して構築済み）の2つのみ。遷移はフルリロードによってのみ発生します。
///
/// 読み手はリクエスト開始時に[`DataCache::snapshot`]で不変スナップショットへの
/// 参照を1回取得します。リロードは脇で次世代を構築し、`Arc`の差し替えのみを
/// 唯一の変更点として原子的に公開します。進行中のリクエストは直前の世代に
/// 対して完了してよく、読み取りパスに同期コストはありません。
#[derive(Debug)]
pub struct DataCache {
    current: RwLock<Arc<Snapshot>>,
}

impl DataCache {
    /// 空（未ロード）状態のキャッシュを生成する
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// 現在の世代への不変参照を取得する
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// ワークブックからリロードし、成功時に新世代を原子的に公開する
    ///
    /// すべての取り込み失敗はこの境界で捕捉され、成否のbool値とログ出力へ
    /// 格下げされます。失敗時はキャッシュは直前の世代を保持したままとなり、
    /// プロセスも個々のリクエストもクラッシュしません。
    ///
    /// # 戻り値
    ///
    /// * `true` - 新しい世代を公開した場合
    /// * `false` - 取り込みに失敗し、直前の世代を維持した場合
    pub fn reload_from(&self, path: &Path) -> bool {
        match Snapshot::load(path) {
            Ok(next) => {
                tracing::info!(
                    applications = next.applications.len(),
                    capabilities = next.capabilities.len(),
                    domains = next.domains.len(),
                    "capability map loaded from {}",
                    path.display()
                );
                self.publish(next);
                true
            }
            Err(e) => {
                tracing::warn!("capability map load failed, keeping previous cache: {}", e);
                false
            }
        }
    }

    /// 次世代スナップショットを原子的に公開する
    fn publish(&self, next: Snapshot) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(next);
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new()
    }
}
