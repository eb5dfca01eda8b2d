//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（DB の接続状態を確認）
//!
//! レスポンス型は [`sendportal_shared::HealthResponse`] / [`sendportal_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sendportal_infra::db::DatabaseProbe;
use sendportal_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub database: Arc<dyn DatabaseProbe>,
}

/// Readiness Check エンドポイント
///
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = check_database(state.database.as_ref()).await;

    let checks = HashMap::from([("database".to_string(), database)]);

    let all_ok = checks.values().all(|s| matches!(s, CheckStatus::Ok));
    let (http_status, status) = if all_ok {
        (StatusCode::OK, ReadinessStatus::Ready)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ReadinessStatus::NotReady)
    };

    (http_status, Json(ReadinessResponse { status, checks }))
}

/// DB への接続を確認する（タイムアウト: 5 秒）
async fn check_database(probe: &dyn DatabaseProbe) -> CheckStatus {
    match tokio::time::timeout(Duration::from_secs(5), probe.ping()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}
