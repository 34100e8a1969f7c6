//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// capmapクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `SourceUnavailable`: ワークブックのソースが取得できない（取り込み境界で非致命として扱う）
/// - `SheetNotFound`: ワークブックに必要なシートが存在しない（同じく非致命）
/// - `MissingParameter`: 必須クエリパラメータの欠落（HTTP 400として公開される）
/// - `FunctionNotFound`: 存在しない機能名の参照（HTTP 404として公開される）
///
/// スコアセルの解析失敗はエラーとして表面化せず、常に0へ黙って丸められます。
///
/// # 使用例
///
/// ```rust,no_run
/// use capmap::CapMapError;
/// use std::fs::File;
///
/// fn read_workbook(path: &str) -> Result<(), CapMapError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CapMapError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックのソースが取得できない（ファイル欠落・破損アーカイブなど）
    ///
    /// 取り込み境界で捕捉され、キャッシュは直前の世代を保持したまま
    /// プロセスは稼働を続けます。
    #[error("Workbook source unavailable: {0}")]
    SourceUnavailable(String),

    /// 指定された名前のシートがワークブックに存在しない
    ///
    /// ワークブックの構造が不正な場合に発生します。`SourceUnavailable`と
    /// 同様に、取り込み境界で非致命として扱われます。
    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// 必須クエリパラメータが指定されていない
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// 指定された機能名に一致するCapabilityが存在しない
    #[error("Function '{0}' not found")]
    FunctionNotFound(String),
}
