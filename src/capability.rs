//! Capability Builder Module
//!
//! Matrixシートの横持ち（非正規化）行を、正規化されたCapabilityレコードへ
//! 変換するモジュール。可変幅の`appName<N>`／`appName<N>_score`列ペアを
//! Capabilityごとのスコアマップへ畳み込む。

use std::collections::BTreeMap;

use crate::types::{row_text, Capability, CellValue, Row};

/// アプリケーション名列のヘッダー接頭辞
const APP_COLUMN_PREFIX: &str = "appName";

/// スコア列のヘッダー接尾辞
const SCORE_COLUMN_SUFFIX: &str = "_score";

/// Matrixの行レコード列からCapability列を構築する
///
/// 入力行順は保持されます。domain/verticalが空の行もCapabilityを生成します
/// （派生インデックス側の非空フィルターで除外されるため、ここではエラーにしない）。
pub fn build_capabilities(rows: &[Row]) -> Vec<Capability> {
    rows.iter().map(build_capability).collect()
}

/// 1行からCapabilityを組み立てる
fn build_capability(row: &Row) -> Capability {
    // 1. 固定列の転記（欠落は空文字列、エラーにはしない）
    let domain = row_text(row, "domain");
    let vertical = row_text(row, "vertical");
    let function_name = row_text(row, "functionname");
    let desc_de = row_text(row, "functiondescriptionDE");
    let desc_en = row_text(row, "functiondescriptionEN");

    // 2. アプリケーション列ペアの走査
    let mut applications = BTreeMap::new();
    for (key, value) in row {
        if !key.starts_with(APP_COLUMN_PREFIX) || key.ends_with(SCORE_COLUMN_SUFFIX) {
            continue;
        }
        let app_name = value.as_text();
        if app_name.is_empty() {
            continue;
        }

        // 対となるスコア列を読み、整数へベストエフォートで解析する
        let score_key = format!("{}{}", key, SCORE_COLUMN_SUFFIX);
        let score = row.get(&score_key).map(parse_score).unwrap_or(0);
        applications.insert(app_name, score);
    }

    Capability {
        domain,
        vertical,
        function_name,
        desc_de,
        desc_en,
        applications,
    }
}

/// スコアセルを整数へ解析する
///
/// 解析に失敗した場合は0を返します（サイレント劣化ポリシー。
/// 解析不能なスコアは「欠落」ではなく「最低スコア」として扱われます）。
pub(crate) fn parse_score(value: &CellValue) -> i64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n as i64,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
