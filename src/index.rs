//! Index Builder Module
//!
//! 正規化済みCapability列から3つの二次インデックス（ドメイン一覧、
//! ドメイン → 縦割り、縦割り → 機能）を導出するモジュール。
//! いずれも単一パスで独立に構築される。
//!
//! Applicationsシートのエントリと、Capabilityのスコアマップに現れる
//! アプリケーション名との突合は行わない。存在しないアプリケーションへの
//! 参照（ダングリング参照）は許容され、パイプラインのどこでもエラーにしない。

use std::collections::BTreeMap;

use crate::types::{Capability, FunctionEntry};

/// 重複のないドメイン一覧を導出する
///
/// 空文字列のドメインは除外し、初出順を保持します（ソートしない）。
pub fn build_domains(capabilities: &[Capability]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for cap in capabilities {
        if cap.domain.is_empty() {
            continue;
        }
        if !domains.contains(&cap.domain) {
            domains.push(cap.domain.clone());
        }
    }
    domains
}

/// ドメイン → 縦割り一覧のインデックスを導出する
///
/// 各ドメイン配下の縦割り一覧は、空文字列を除外した初出順・重複なしです。
pub fn build_verticals_by_domain(capabilities: &[Capability]) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for cap in capabilities {
        if cap.domain.is_empty() || cap.vertical.is_empty() {
            continue;
        }
        let verticals = index.entry(cap.domain.clone()).or_default();
        if !verticals.contains(&cap.vertical) {
            verticals.push(cap.vertical.clone());
        }
    }
    index
}

/// 縦割り → 機能エントリ一覧のインデックスを導出する
///
/// 追記専用であり、同一縦割りに対する重複行は意図的に保持されます
/// （各行は機能の「型」ではなく「インスタンス」を表すため）。
pub fn build_functions_by_vertical(
    capabilities: &[Capability],
) -> BTreeMap<String, Vec<FunctionEntry>> {
    let mut index: BTreeMap<String, Vec<FunctionEntry>> = BTreeMap::new();
    for cap in capabilities {
        if cap.vertical.is_empty() {
            continue;
        }
        index
            .entry(cap.vertical.clone())
            .or_default()
            .push(FunctionEntry {
                name: cap.function_name.clone(),
                desc_de: cap.desc_de.clone(),
                desc_en: cap.desc_en.clone(),
            });
    }
    index
}
