//! # キャンペーンハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/{workspace_id}/campaigns` - キャンペーン一覧（新しい順、カーソル）
//! - `GET /api/{workspace_id}/campaigns/{campaign_id}` - キャンペーン詳細
//! - `POST /api/{workspace_id}/campaigns/{campaign_id}/send` - キャンペーン配信
//! - `POST /api/{workspace_id}/campaigns/{campaign_id}/duplicate` - キャンペーン複製
//! - `DELETE /api/{workspace_id}/campaigns/{campaign_id}` - キャンペーン削除（DRAFT のみ）
//!
//! 認証とワークスペースの所属確認は [`crate::middleware::require_api_token`] で済んでいる前提。
//! ワークスペース ID はミドルウェアが検証した [`AuthenticatedUser`] から取る。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sendportal_domain::campaign::{Campaign, CampaignId};
use sendportal_shared::{ApiResponse, PaginatedResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    middleware::AuthenticatedUser,
    usecase::{CampaignDispatchUseCaseImpl, CampaignManageUseCaseImpl, CampaignQueryUseCaseImpl},
};

/// キャンペーン API の共有状態
pub struct CampaignState {
    pub dispatch: CampaignDispatchUseCaseImpl,
    pub query:    CampaignQueryUseCaseImpl,
    pub manage:   CampaignManageUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
    pub cursor: Option<String>,
    pub limit:  Option<i64>,
}

/// キャンペーン DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CampaignDto {
    pub id:               Uuid,
    pub workspace_id:     Uuid,
    pub email_service_id: Uuid,
    pub name:             String,
    pub status_id:        i16,
    pub status:           String,
    pub send_to_all:      bool,
    pub sent_count:       i64,
    pub open_count:       i64,
    pub click_count:      i64,
    pub open_ratio:       f64,
    pub click_ratio:      f64,
    pub created_at:       String,
    pub updated_at:       String,
}

impl From<&Campaign> for CampaignDto {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id:               *campaign.id().as_uuid(),
            workspace_id:     *campaign.workspace_id().as_uuid(),
            email_service_id: *campaign.email_service_id().as_uuid(),
            name:             campaign.name().as_str().to_string(),
            status_id:        campaign.status().id(),
            status:           campaign.status().as_str().to_string(),
            send_to_all:      campaign.send_to_all(),
            sent_count:       campaign.sent_count(),
            open_count:       campaign.open_count(),
            click_count:      campaign.click_count(),
            open_ratio:       campaign.open_ratio(),
            click_ratio:      campaign.click_ratio(),
            created_at:       campaign.created_at().to_rfc3339(),
            updated_at:       campaign.updated_at().to_rfc3339(),
        }
    }
}

/// パスの ID をパースする。UUID でなければ存在しないものとして扱う。
fn parse_id(raw: &str, entity_name: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(raw).map_err(|_| CoreError::NotFound(format!("{entity_name} not found.")))
}

// --- ハンドラ ---

/// GET /api/{workspace_id}/campaigns
///
/// ## レスポンス
///
/// - `200 OK`: `{ "data": [...], "next_cursor": "..." | null }`
/// - `422 Unprocessable Entity`: 不正なカーソル
#[tracing::instrument(skip_all)]
pub async fn list_campaigns(
    State(state): State<Arc<CampaignState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<impl IntoResponse, CoreError> {
    let cursor = query
        .cursor
        .as_deref()
        .map(|raw| {
            Uuid::parse_str(raw)
                .map(CampaignId::from_uuid)
                .map_err(|_| CoreError::Validation {
                    field:   "cursor",
                    message: "The cursor is invalid.".to_string(),
                })
        })
        .transpose()?;

    let page = state
        .query
        .list_campaigns(&user.workspace_id, cursor.as_ref(), query.limit)
        .await?;

    let response = PaginatedResponse {
        data:        page.campaigns.iter().map(CampaignDto::from).collect(),
        next_cursor: page.next_cursor.map(|id| id.to_string()),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// GET /api/{workspace_id}/campaigns/{campaign_id}
#[tracing::instrument(skip_all)]
pub async fn get_campaign(
    State(state): State<Arc<CampaignState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((_, campaign_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, CoreError> {
    let campaign_id = CampaignId::from_uuid(parse_id(&campaign_id, "Campaign")?);

    let campaign = state
        .query
        .get_campaign(&user.workspace_id, &campaign_id)
        .await?;

    let response = ApiResponse::new(CampaignDto::from(&campaign));
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/{workspace_id}/campaigns/{campaign_id}/send
///
/// DRAFT のキャンペーンを配信キューに投入する。
///
/// ## レスポンス
///
/// - `200 OK`: QUEUED になったキャンペーン（`status_id: 2`）
/// - `404 Not Found`: ワークスペース内にキャンペーンがない
/// - `422 Unprocessable Entity`: DRAFT ではない（`errors.status_id`）、または送信クォータ超過
/// - `503 Service Unavailable`: 送信クォータを照会できなかった
#[tracing::instrument(skip_all)]
pub async fn dispatch_campaign(
    State(state): State<Arc<CampaignState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((_, campaign_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, CoreError> {
    let campaign_id = CampaignId::from_uuid(parse_id(&campaign_id, "Campaign")?);

    let campaign = state
        .dispatch
        .dispatch(&user.workspace_id, &campaign_id)
        .await?;

    let response = ApiResponse::new(CampaignDto::from(&campaign));
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/{workspace_id}/campaigns/{campaign_id}/duplicate
///
/// ## レスポンス
///
/// - `201 Created`: 複製された DRAFT のキャンペーン
/// - `404 Not Found`: ワークスペース内にキャンペーンがない
#[tracing::instrument(skip_all)]
pub async fn duplicate_campaign(
    State(state): State<Arc<CampaignState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((_, campaign_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, CoreError> {
    let campaign_id = CampaignId::from_uuid(parse_id(&campaign_id, "Campaign")?);

    let copy = state
        .manage
        .duplicate_campaign(&user.workspace_id, &campaign_id)
        .await?;

    let response = ApiResponse::new(CampaignDto::from(&copy));
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/{workspace_id}/campaigns/{campaign_id}
///
/// ## レスポンス
///
/// - `204 No Content`: 削除成功
/// - `404 Not Found`: ワークスペース内にキャンペーンがない
/// - `422 Unprocessable Entity`: DRAFT ではない（`errors.status_id`）
#[tracing::instrument(skip_all)]
pub async fn delete_campaign(
    State(state): State<Arc<CampaignState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((_, campaign_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, CoreError> {
    let campaign_id = CampaignId::from_uuid(parse_id(&campaign_id, "Campaign")?);

    state
        .manage
        .delete_campaign(&user.workspace_id, &campaign_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
