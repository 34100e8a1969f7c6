//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! シートから取り込んだ生の行レコードと、正規化後のドメインレコード
//! （Application / Capability / FunctionEntry）の両方を含む。

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// セルの値を表す列挙型
///
/// セルの内容から型（数値／文字列）を推論した結果を保持します。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),

    /// 論理値
    Bool(bool),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値を文字列として取得（空セルは空文字列）
    ///
    /// 整数値の数値セルは小数点なしで出力されます（`"4.0"`ではなく`"4"`）。
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// JSON値へ変換（Application属性のパススルー用）
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Number(n) => {
                // 整数値はJSON上でも整数として表現する
                if n.fract() == 0.0 && n.is_finite() && *n >= i64::MIN as f64 && *n <= i64::MAX as f64
                {
                    Value::Number(Number::from(*n as i64))
                } else {
                    Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
                }
            }
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Empty => Value::Null,
        }
    }
}

/// シートの1行を表す行レコード（列名 → セル値）
///
/// 空セルはマップに含まれません。列の集合は行ごとに可変です。
pub type Row = BTreeMap<String, CellValue>;

/// 行レコードから指定列の文字列値を取得する（列が無い場合は空文字列）
pub(crate) fn row_text(row: &Row, key: &str) -> String {
    row.get(key).map(CellValue::as_text).unwrap_or_default()
}

/// Applicationsシートの1行を正規化したレコード
///
/// スキーマは強制されません。シートに現れたすべての列がそのまま属性となり、
/// JSONレスポンスにはフラットに展開されます。識別キーは`appName`列です。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    /// 識別キー（`appName`列の値、欠落時は空文字列）
    #[serde(skip)]
    pub name: String,

    /// 列名 → スカラー値のフラットなマップ
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Application {
    /// 行レコードからApplicationを構築する
    pub fn from_row(row: &Row) -> Self {
        let mut attributes = Map::new();
        for (key, value) in row {
            attributes.insert(key.clone(), value.to_json());
        }
        Self {
            name: row_text(row, "appName"),
            attributes,
        }
    }

    /// 属性を文字列として取得する（フィルター照合用）
    ///
    /// 属性が存在しない場合は`None`を返します。
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.attributes.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }
}

/// Matrixシートの1行を正規化したCapabilityレコード
///
/// 1つのdomain/vertical/functionの組み合わせと、アプリケーションごとの
/// 成熟度スコアのマップを保持します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    /// ドメイン名（欠落時は空文字列）
    pub domain: String,

    /// 縦割り名（欠落時は空文字列）
    pub vertical: String,

    /// 機能名（縦割り内で一意が期待されるが、全体では強制されない）
    #[serde(rename = "functionName")]
    pub function_name: String,

    /// 機能説明（ドイツ語）
    #[serde(rename = "functionDescDE")]
    pub desc_de: String,

    /// 機能説明（英語）
    #[serde(rename = "functionDescEN")]
    pub desc_en: String,

    /// アプリケーション名 → 整数スコア（解析不能なスコアは0）
    pub applications: BTreeMap<String, i64>,
}

/// 縦割り（vertical）配下の機能エントリ
///
/// Matrixの行1つにつき1エントリ。重複は排除されません
/// （各行は機能の「型」ではなく「インスタンス」を表すため）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionEntry {
    /// 機能名
    pub name: String,

    /// 機能説明（ドイツ語）
    #[serde(rename = "descDE")]
    pub desc_de: String,

    /// 機能説明（英語）
    #[serde(rename = "descEN")]
    pub desc_en: String,
}
