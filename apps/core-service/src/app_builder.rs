//! # アプリケーション構築
//!
//! ルーター構築を担当する。`main.rs` は依存コンポーネントの初期化とサーバー起動に集中し、
//! 統合テストはモックを注入した State で同じルーターを組み立てる。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sendportal_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        CampaignState,
        ReadinessState,
        delete_campaign,
        dispatch_campaign,
        duplicate_campaign,
        get_campaign,
        health_check,
        list_campaigns,
        readiness_check,
    },
    middleware::{AuthState, require_api_token},
};

/// ルーターを構築する
///
/// - `/health`, `/health/ready`: 認証なし
/// - `/api/{workspace_id}/...`: API トークン認証 + ワークスペース所属確認
pub fn build_app(
    campaign_state: Arc<CampaignState>,
    auth_state: AuthState,
    readiness_state: Arc<ReadinessState>,
) -> Router {
    let api = Router::new()
        .route("/api/{workspace_id}/campaigns", get(list_campaigns))
        .route(
            "/api/{workspace_id}/campaigns/{campaign_id}",
            get(get_campaign).delete(delete_campaign),
        )
        .route(
            "/api/{workspace_id}/campaigns/{campaign_id}/send",
            post(dispatch_campaign),
        )
        .route(
            "/api/{workspace_id}/campaigns/{campaign_id}/duplicate",
            post(duplicate_campaign),
        )
        .route_layer(from_fn_with_state(auth_state, require_api_token))
        .with_state(campaign_state);

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state);

    Router::new()
        .merge(health)
        .merge(api)
        // 下に書いたものが外側: Request ID 生成 → スパン → レスポンスヘッダーへの複写
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
