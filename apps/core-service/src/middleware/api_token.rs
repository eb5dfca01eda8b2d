//! # API トークン認証ミドルウェア
//!
//! `/api/{workspace_id}/...` へのリクエストを API トークンで認証し、
//! トークンの持ち主がワークスペースのメンバーであることを確認する。
//!
//! ## トークンの受け取り方
//!
//! 1. `Authorization: Bearer <token>` ヘッダー
//! 2. `api_token` クエリパラメータ（ヘッダーがない場合）
//!
//! ## 判定
//!
//! | 状況 | レスポンス |
//! |------|-----------|
//! | トークンなし・不明なトークン | 401 |
//! | ワークスペース ID が UUID でない | 404 |
//! | ワークスペースのメンバーではない | 403 |
//!
//! パスパラメータを読むため、`Router::route_layer` で適用すること。
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/api/{workspace_id}/campaigns", get(list_campaigns))
//!     .route_layer(from_fn_with_state(auth_state, require_api_token))
//! ```

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sendportal_domain::{user::UserId, workspace::WorkspaceId};
use sendportal_infra::repository::ApiTokenRepository;
use uuid::Uuid;

use crate::error::CoreError;

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
    pub api_tokens: Arc<dyn ApiTokenRepository>,
}

/// 認証済みユーザー
///
/// 認証に成功したリクエストの extensions に格納される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id:      UserId,
    pub workspace_id: WorkspaceId,
}

/// API トークン認証ミドルウェア
pub async fn require_api_token(
    State(state): State<AuthState>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let authenticated = authenticate(&state, &params, &query, request.headers()).await;
    match authenticated {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authenticate(
    state: &AuthState,
    params: &HashMap<String, String>,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, CoreError> {
    let token = bearer_token(headers)
        .or_else(|| query.get("api_token").map(String::as_str))
        .filter(|token| !token.is_empty())
        .ok_or(CoreError::Unauthenticated)?;

    let user_id = state
        .api_tokens
        .find_user_by_token(token)
        .await?
        .ok_or(CoreError::Unauthenticated)?;

    let workspace_id = params
        .get("workspace_id")
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(WorkspaceId::from_uuid)
        .ok_or_else(|| CoreError::NotFound("Workspace not found.".to_string()))?;

    if !state
        .api_tokens
        .is_workspace_member(&workspace_id, &user_id)
        .await?
    {
        return Err(CoreError::Forbidden(format!(
            "ユーザー {user_id} はワークスペース {workspace_id} のメンバーではありません"
        )));
    }

    Ok(AuthenticatedUser {
        user_id,
        workspace_id,
    })
}

/// `Authorization: Bearer <token>` からトークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
