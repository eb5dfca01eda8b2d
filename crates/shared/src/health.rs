//! # ヘルスチェックのレスポンス本文
//!
//! `GET /health` は稼働中であることだけを返し、`GET /health/ready` は
//! 依存先（PostgreSQL）ごとの確認結果をまとめて返す。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `GET /health` の本文
///
/// ```
/// use sendportal_shared::HealthResponse;
///
/// let body = serde_json::to_string(&HealthResponse {
///     status:  "healthy".to_string(),
///     version: "0.1.0".to_string(),
/// })
/// .unwrap();
/// assert_eq!(body, r#"{"status":"healthy","version":"0.1.0"}"#);
/// ```
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:  String,
    /// サービスのクレートバージョン
    pub version: String,
}

/// 依存先 1 つ分の確認結果（`"ok"` / `"error"`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// リクエストを受け付けられるか（`"ready"` / `"not_ready"`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// `GET /health/ready` の本文
///
/// `checks` のキーは依存先の名前（現状は `"database"` のみ）。
/// 1 つでも `Error` なら `status` は `NotReady` になる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: HashMap<String, CheckStatus>,
}
