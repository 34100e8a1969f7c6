//! Sheet Reader Module
//!
//! calamineを使用して、ワークブックの表形式シートを順序付きの行レコード列へ
//! 解析するモジュール。1行目をヘッダーとして扱い、2行目以降を
//! 列名 → セル値のマップへ変換する。型（数値／文字列）はセルの内容から推論する。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::Cursor;
use std::path::Path;

use crate::error::CapMapError;
use crate::types::{CellValue, Row};

/// ワークブックリーダー
///
/// calamineのラッパーとして、シート単位の行レコード抽出を提供します。
/// ワークブック全体をメモリ上のバッファへ読み込んでから解析します
/// （スプレッドシートはメモリに収まる前提）。
pub struct SheetReader {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl SheetReader {
    /// ファイルパスからワークブックを開く
    ///
    /// # 引数
    ///
    /// * `path` - ワークブックファイルのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetReader)` - 読み込みに成功した場合
    /// * `Err(CapMapError::SourceUnavailable)` - ファイルが存在しない、
    ///   または破損している場合。呼び出し側（ローダー）はこれを非致命として
    ///   扱い、直前のキャッシュのまま稼働を続けなければならない。
    pub fn open(path: &Path) -> Result<Self, CapMapError> {
        let buffer = std::fs::read(path)
            .map_err(|e| CapMapError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(buffer)
    }

    /// メモリ上のバイト列からワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetReader)` - 解析に成功した場合
    /// * `Err(CapMapError::SourceUnavailable)` - ワークブック形式として解析できない場合
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self, CapMapError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))
            .map_err(|e| CapMapError::SourceUnavailable(e.to_string()))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シートを行レコード列へ解析する
    ///
    /// 1行目のセル文字列をヘッダーとして扱い、各データ行をヘッダー → セル値の
    /// マップへ変換します。空セルはマップに含まれません。行順は入力順を保持します。
    ///
    /// # 引数
    ///
    /// * `sheet_name` - 解析するシート名
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Row>)` - 行レコードの列（ヘッダー行は含まない）
    /// * `Err(CapMapError::SheetNotFound)` - シートが存在しない場合
    pub fn read_rows(&mut self, sheet_name: &str) -> Result<Vec<Row>, CapMapError> {
        // 1. シートの存在確認
        if !self.workbook.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(CapMapError::SheetNotFound(sheet_name.to_string()));
        }

        // 2. シート範囲の取得
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|_| CapMapError::SheetNotFound(sheet_name.to_string()))?;

        // 3. ヘッダー行の抽出
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(|c| convert_cell(c).as_text()).collect(),
            None => return Ok(Vec::new()), // 空シート
        };

        // 4. データ行の変換
        let mut records = Vec::new();
        for row in rows {
            let mut record = Row::new();
            for (col_idx, cell) in row.iter().enumerate() {
                let Some(header) = headers.get(col_idx) else {
                    continue;
                };
                // ヘッダーの無い列は無視
                if header.is_empty() {
                    continue;
                }
                let value = convert_cell(cell);
                if !value.is_empty() {
                    record.insert(header.clone(), value);
                }
            }
            records.push(record);
        }

        Ok(records)
    }
}

/// calamineのセルをCellValueへ変換する（数値／文字列の型推論）
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        _ => CellValue::Empty,
    }
}
