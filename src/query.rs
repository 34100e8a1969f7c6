//! Query Service Module
//!
//! 現在のスナップショットとリクエストパラメータのみに依存する、
//! 5系統の独立した読み取り操作を提供するモジュール。いずれも純粋関数であり、
//! 照合は注記がない限り大文字小文字を区別する完全一致で行う。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::Snapshot;
use crate::error::CapMapError;
use crate::types::{Application, Capability, FunctionEntry};

/// アプリケーション一覧のフィルター条件
///
/// スカラーフィルターはAND結合されます。`domain`は結合フィルターであり、
/// そのドメインのCapabilityが参照するアプリケーション名の和集合へ絞り込みます。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    /// `appLifecycleStatus`属性との完全一致
    pub lifecycle: Option<String>,

    /// `appBusinessOwner`属性との完全一致
    #[serde(rename = "businessOwner")]
    pub business_owner: Option<String>,

    /// ドメイン経由の結合フィルター
    pub domain: Option<String>,
}

/// アプリケーション一覧のレスポンス
#[derive(Debug, Serialize)]
pub struct ApplicationList {
    pub count: usize,
    pub applications: Vec<Application>,
}

/// アプリケーション一覧を取得する
///
/// フィルター未指定時は全件を格納順で返します。
pub fn list_applications(snapshot: &Snapshot, filter: &ApplicationFilter) -> ApplicationList {
    // ドメインフィルター: 該当ドメインのCapabilityが参照する全アプリ名の和集合
    let domain_members: Option<BTreeSet<&str>> = filter.domain.as_deref().map(|domain| {
        snapshot
            .capabilities
            .iter()
            .filter(|cap| cap.domain == domain)
            .flat_map(|cap| cap.applications.keys().map(String::as_str))
            .collect()
    });

    let applications: Vec<Application> = snapshot
        .applications
        .iter()
        .filter(|app| matches_attribute(app, "appLifecycleStatus", filter.lifecycle.as_deref()))
        .filter(|app| matches_attribute(app, "appBusinessOwner", filter.business_owner.as_deref()))
        .filter(|app| {
            domain_members
                .as_ref()
                .map_or(true, |members| members.contains(app.name.as_str()))
        })
        .cloned()
        .collect();

    ApplicationList {
        count: applications.len(),
        applications,
    }
}

/// 属性値とフィルター値の完全一致判定（フィルター未指定時は常に一致）
fn matches_attribute(app: &Application, key: &str, expected: Option<&str>) -> bool {
    match expected {
        Some(value) => app.attribute_text(key).as_deref() == Some(value),
        None => true,
    }
}

/// Capability一覧のフィルター条件（AND結合）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilityFilter {
    /// `domain`との完全一致
    pub domain: Option<String>,

    /// `vertical`との完全一致
    pub vertical: Option<String>,
}

/// Capability一覧のレスポンス
#[derive(Debug, Serialize)]
pub struct CapabilityList {
    pub count: usize,
    pub capabilities: Vec<Capability>,
}

/// Capability一覧を取得する（格納順を保持）
pub fn list_capabilities(snapshot: &Snapshot, filter: &CapabilityFilter) -> CapabilityList {
    let capabilities: Vec<Capability> = snapshot
        .capabilities
        .iter()
        .filter(|cap| filter.domain.as_deref().map_or(true, |d| cap.domain == d))
        .filter(|cap| filter.vertical.as_deref().map_or(true, |v| cap.vertical == v))
        .cloned()
        .collect();

    CapabilityList {
        count: capabilities.len(),
        capabilities,
    }
}

/// 機能別アプリケーション照会のパラメータ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ByCapabilityQuery {
    /// 機能名（必須）
    pub function: Option<String>,

    /// スコアの完全一致フィルター（指定時は範囲フィルターより優先）
    pub score: Option<i64>,

    /// スコアの下限（含む）
    #[serde(rename = "minScore")]
    pub min_score: Option<i64>,

    /// スコアの上限（含む）
    #[serde(rename = "maxScore")]
    pub max_score: Option<i64>,
}

/// 機能別アプリケーション照会のレスポンス
#[derive(Debug, Serialize)]
pub struct CapabilityApplications {
    pub function: String,

    /// 適用されたスコアフィルター（完全一致値、未指定時は`"all"`）
    #[serde(rename = "filterScore")]
    pub filter_score: Value,

    pub count: usize,

    /// Application属性に`capabilityScore`をマージしたレコード群
    pub applications: Vec<Value>,
}

/// 指定機能のCapabilityに紐づくアプリケーション詳細を取得する
///
/// 機能名が重複する場合は最初に見つかったCapabilityのみを使用します
/// （既知の曖昧さであり、重複排除は行いません）。スコアマップ中の
/// 参照先が存在しないアプリケーション（ダングリング参照）は黙って除外されます。
///
/// # 戻り値
///
/// * `Err(CapMapError::MissingParameter)` - `function`が未指定の場合
/// * `Err(CapMapError::FunctionNotFound)` - 一致するCapabilityが無い場合
pub fn applications_by_capability(
    snapshot: &Snapshot,
    query: &ByCapabilityQuery,
) -> Result<CapabilityApplications, CapMapError> {
    // 1. 必須パラメータの検証
    let function = query
        .function
        .as_deref()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| CapMapError::MissingParameter("function".to_string()))?;

    // 2. 機能名に一致する最初のCapabilityを検索
    let capability = snapshot
        .capabilities
        .iter()
        .find(|cap| cap.function_name == function)
        .ok_or_else(|| CapMapError::FunctionNotFound(function.to_string()))?;

    // 3. スコアフィルターの適用とApplication詳細の結合
    let mut applications = Vec::new();
    for (app_name, &score) in &capability.applications {
        if !score_matches(score, query) {
            continue;
        }

        // ダングリング参照は黙って除外
        let Some(app) = snapshot.applications.iter().find(|a| &a.name == app_name) else {
            continue;
        };

        let mut merged = app.attributes.clone();
        merged.insert("capabilityScore".to_string(), Value::from(score));
        applications.push(Value::Object(merged));
    }

    Ok(CapabilityApplications {
        function: function.to_string(),
        filter_score: query.score.map(Value::from).unwrap_or_else(|| json!("all")),
        count: applications.len(),
        applications,
    })
}

/// スコアフィルターの判定
///
/// 完全一致（`score`）が範囲指定より優先されます。範囲は両端を含み、
/// 下限のみの指定は下限未満を、上限のみの指定は上限超過を除外します。
fn score_matches(score: i64, query: &ByCapabilityQuery) -> bool {
    if let Some(exact) = query.score {
        return score == exact;
    }
    if let Some(min) = query.min_score {
        if score < min {
            return false;
        }
    }
    if let Some(max) = query.max_score {
        if score > max {
            return false;
        }
    }
    true
}

/// ドメイン一覧を導出順で返す
pub fn list_domains(snapshot: &Snapshot) -> &[String] {
    &snapshot.domains
}

/// 指定ドメインの縦割り一覧を返す（未知のドメインは空、エラーにしない）
pub fn verticals_for(snapshot: &Snapshot, domain: &str) -> Vec<String> {
    snapshot
        .verticals_by_domain
        .get(domain)
        .cloned()
        .unwrap_or_default()
}

/// 指定縦割りの機能一覧を返す（未知の縦割りは空、エラーにしない）
pub fn functions_for(snapshot: &Snapshot, vertical: &str) -> Vec<FunctionEntry> {
    snapshot
        .functions_by_vertical
        .get(vertical)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, Row};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::Text(v.to_string())))
            .collect()
    }

    /// クエリテスト用の小さなスナップショットを構築する
    fn sample_snapshot() -> Snapshot {
        let app_rows = vec![
            row(&[
                ("appName", "SAP"),
                ("appLifecycleStatus", "Active"),
                ("appBusinessOwner", "Finance IT"),
            ]),
            row(&[
                ("appName", "Coupa"),
                ("appLifecycleStatus", "Active"),
                ("appBusinessOwner", "Procurement"),
            ]),
            row(&[
                ("appName", "Legacy AP"),
                ("appLifecycleStatus", "Sunset"),
                ("appBusinessOwner", "Finance IT"),
            ]),
        ];
        let matrix_rows = vec![
            row(&[
                ("domain", "Finance"),
                ("vertical", "AP"),
                ("functionname", "Invoice Match"),
                ("appName1", "SAP"),
                ("appName1_score", "4"),
                ("appName2", "Legacy AP"),
                ("appName2_score", "1"),
            ]),
            row(&[
                ("domain", "Finance"),
                ("vertical", "AP"),
                ("functionname", "Payment Run"),
                ("appName1", "SAP"),
                ("appName1_score", "3"),
            ]),
            row(&[
                ("domain", "Procurement"),
                ("vertical", "Sourcing"),
                ("functionname", "Supplier Onboarding"),
                ("appName1", "Coupa"),
                ("appName1_score", "5"),
                ("appName2", "Ghost"),
                ("appName2_score", "2"),
            ]),
        ];
        Snapshot::build(&app_rows, &matrix_rows)
    }

    // list_applications のテスト
    #[test]
    fn test_list_applications_no_filter_returns_all_in_order() {
        let snapshot = sample_snapshot();
        let result = list_applications(&snapshot, &ApplicationFilter::default());

        assert_eq!(result.count, 3);
        let names: Vec<&str> = result.applications.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["SAP", "Coupa", "Legacy AP"]);
    }

    #[test]
    fn test_list_applications_lifecycle_filter() {
        let snapshot = sample_snapshot();
        let filter = ApplicationFilter {
            lifecycle: Some("Sunset".to_string()),
            ..Default::default()
        };

        let result = list_applications(&snapshot, &filter);
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0].name, "Legacy AP");
    }

    #[test]
    fn test_list_applications_filters_are_and_combined() {
        let snapshot = sample_snapshot();
        let filter = ApplicationFilter {
            lifecycle: Some("Active".to_string()),
            business_owner: Some("Finance IT".to_string()),
            ..Default::default()
        };

        let result = list_applications(&snapshot, &filter);
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0].name, "SAP");
    }

    #[test]
    fn test_list_applications_filter_is_case_sensitive() {
        let snapshot = sample_snapshot();
        let filter = ApplicationFilter {
            lifecycle: Some("active".to_string()),
            ..Default::default()
        };

        assert_eq!(list_applications(&snapshot, &filter).count, 0);
    }

    #[test]
    fn test_list_applications_domain_join() {
        // Financeドメインが参照するのはSAPとLegacy APのみ
        let snapshot = sample_snapshot();
        let filter = ApplicationFilter {
            domain: Some("Finance".to_string()),
            ..Default::default()
        };

        let result = list_applications(&snapshot, &filter);
        let names: Vec<&str> = result.applications.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["SAP", "Legacy AP"]);
    }

    #[test]
    fn test_list_applications_unknown_domain_yields_empty() {
        let snapshot = sample_snapshot();
        let filter = ApplicationFilter {
            domain: Some("Unknown".to_string()),
            ..Default::default()
        };

        assert_eq!(list_applications(&snapshot, &filter).count, 0);
    }

    // list_capabilities のテスト
    #[test]
    fn test_list_capabilities_no_filter() {
        let snapshot = sample_snapshot();
        let result = list_capabilities(&snapshot, &CapabilityFilter::default());
        assert_eq!(result.count, 3);
    }

    #[test]
    fn test_list_capabilities_domain_and_vertical() {
        let snapshot = sample_snapshot();
        let filter = CapabilityFilter {
            domain: Some("Finance".to_string()),
            vertical: Some("AP".to_string()),
        };

        let result = list_capabilities(&snapshot, &filter);
        assert_eq!(result.count, 2);
        assert!(result
            .capabilities
            .iter()
            .all(|c| c.domain == "Finance" && c.vertical == "AP"));
    }

    // applications_by_capability のテスト
    #[test]
    fn test_by_capability_missing_function_parameter() {
        let snapshot = sample_snapshot();
        let result = applications_by_capability(&snapshot, &ByCapabilityQuery::default());

        assert!(matches!(result, Err(CapMapError::MissingParameter(_))));
    }

    #[test]
    fn test_by_capability_empty_function_is_missing() {
        let snapshot = sample_snapshot();
        let query = ByCapabilityQuery {
            function: Some(String::new()),
            ..Default::default()
        };

        let result = applications_by_capability(&snapshot, &query);
        assert!(matches!(result, Err(CapMapError::MissingParameter(_))));
    }

    #[test]
    fn test_by_capability_unknown_function() {
        let snapshot = sample_snapshot();
        let query = ByCapabilityQuery {
            function: Some("Unknown".to_string()),
            ..Default::default()
        };

        let result = applications_by_capability(&snapshot, &query);
        match result {
            Err(CapMapError::FunctionNotFound(name)) => assert_eq!(name, "Unknown"),
            _ => panic!("Expected FunctionNotFound error"),
        }
    }

    #[test]
    fn test_by_capability_merges_score_into_application() {
        let snapshot = sample_snapshot();
        let query = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            ..Default::default()
        };

        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.function, "Invoice Match");
        assert_eq!(result.filter_score, json!("all"));
        assert_eq!(result.count, 2);

        let sap = result
            .applications
            .iter()
            .find(|a| a["appName"] == "SAP")
            .unwrap();
        assert_eq!(sap["capabilityScore"], 4);
        assert_eq!(sap["appLifecycleStatus"], "Active");
    }

    #[test]
    fn test_by_capability_exact_score_filter() {
        let snapshot = sample_snapshot();
        let query = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            score: Some(4),
            ..Default::default()
        };

        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.filter_score, json!(4));
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0]["appName"], "SAP");
    }

    #[test]
    fn test_by_capability_score_range_filters() {
        let snapshot = sample_snapshot();

        // 下限のみ: 下限未満を除外
        let query = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            min_score: Some(2),
            ..Default::default()
        };
        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0]["appName"], "SAP");

        // 上限のみ: 上限超過を除外
        let query = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            max_score: Some(1),
            ..Default::default()
        };
        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0]["appName"], "Legacy AP");
    }

    #[test]
    fn test_by_capability_min_max_equal_matches_exact_score() {
        // 境界条件: minScore=maxScore=s は score=s と等価
        let snapshot = sample_snapshot();

        let ranged = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            min_score: Some(4),
            max_score: Some(4),
            ..Default::default()
        };
        let exact = ByCapabilityQuery {
            function: Some("Invoice Match".to_string()),
            score: Some(4),
            ..Default::default()
        };

        let ranged = applications_by_capability(&snapshot, &ranged).unwrap();
        let exact = applications_by_capability(&snapshot, &exact).unwrap();
        assert_eq!(ranged.applications, exact.applications);
    }

    #[test]
    fn test_by_capability_drops_dangling_references() {
        // "Ghost"はApplicationsシートに存在しないため黙って除外される
        let snapshot = sample_snapshot();
        let query = ByCapabilityQuery {
            function: Some("Supplier Onboarding".to_string()),
            ..Default::default()
        };

        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.applications[0]["appName"], "Coupa");
    }

    #[test]
    fn test_by_capability_uses_first_matching_capability() {
        // 機能名が重複する場合は最初のCapabilityのみを使用する
        let matrix_rows = vec![
            row(&[
                ("functionname", "Dup"),
                ("appName1", "SAP"),
                ("appName1_score", "1"),
            ]),
            row(&[
                ("functionname", "Dup"),
                ("appName1", "SAP"),
                ("appName1_score", "5"),
            ]),
        ];
        let app_rows = vec![row(&[("appName", "SAP")])];
        let snapshot = Snapshot::build(&app_rows, &matrix_rows);

        let query = ByCapabilityQuery {
            function: Some("Dup".to_string()),
            ..Default::default()
        };
        let result = applications_by_capability(&snapshot, &query).unwrap();
        assert_eq!(result.applications[0]["capabilityScore"], 1);
    }

    // ドメイン・縦割り・機能のテスト
    #[test]
    fn test_list_domains_in_derivation_order() {
        let snapshot = sample_snapshot();
        assert_eq!(list_domains(&snapshot), &["Finance", "Procurement"]);
    }

    #[test]
    fn test_verticals_for_known_and_unknown_domain() {
        let snapshot = sample_snapshot();
        assert_eq!(verticals_for(&snapshot, "Finance"), vec!["AP"]);
        assert!(verticals_for(&snapshot, "Unknown").is_empty());
    }

    #[test]
    fn test_functions_for_known_and_unknown_vertical() {
        let snapshot = sample_snapshot();
        let functions = functions_for(&snapshot, "AP");
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "Invoice Match");
        assert_eq!(functions[1].name, "Payment Run");
        assert!(functions_for(&snapshot, "Unknown").is_empty());
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// 任意のsについて minScore=maxScore=s は score=s と等価
            #[test]
            fn test_min_max_equal_is_equivalent_to_exact(s in -2i64..8) {
                let snapshot = sample_snapshot();
                let ranged = ByCapabilityQuery {
                    function: Some("Invoice Match".to_string()),
                    min_score: Some(s),
                    max_score: Some(s),
                    ..Default::default()
                };
                let exact = ByCapabilityQuery {
                    function: Some("Invoice Match".to_string()),
                    score: Some(s),
                    ..Default::default()
                };

                let ranged = applications_by_capability(&snapshot, &ranged).unwrap();
                let exact = applications_by_capability(&snapshot, &exact).unwrap();
                prop_assert_eq!(ranged.applications, exact.applications);
            }
        }
    }
}
