//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシード投入ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sendportal_domain::{
    campaign::{Campaign, CampaignId, CampaignName, NewCampaign},
    email_service::{EmailServiceId, EmailServiceType},
    user::UserId,
    workspace::WorkspaceId,
};
use sendportal_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{CampaignRepository, PostgresCampaignRepository},
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// テスト用の固定時刻
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap()
}

/// ワークスペースを作成する
pub async fn insert_workspace(pool: &PgPool) -> WorkspaceId {
    let id = WorkspaceId::new();
    sqlx::query("INSERT INTO workspaces (id, name) VALUES ($1, $2)")
        .bind(id.as_uuid())
        .bind(format!("workspace-{id}"))
        .execute(pool)
        .await
        .unwrap();
    id
}

/// API トークンを持つユーザーを作成する
pub async fn insert_user(pool: &PgPool, api_token: &str) -> UserId {
    let id = UserId::new();
    sqlx::query("INSERT INTO users (id, email, api_token) VALUES ($1, $2, $3)")
        .bind(id.as_uuid())
        .bind(format!("{id}@example.com"))
        .bind(api_token)
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn add_member(pool: &PgPool, workspace_id: &WorkspaceId, user_id: &UserId) {
    sqlx::query("INSERT INTO workspace_users (workspace_id, user_id) VALUES ($1, $2)")
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(pool)
        .await
        .unwrap();
}

/// SES のメールサービスを作成する
pub async fn insert_ses_service(pool: &PgPool, workspace_id: &WorkspaceId) -> EmailServiceId {
    let id = EmailServiceId::new();
    sqlx::query(
        "INSERT INTO email_services (id, workspace_id, name, type_id, settings) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id.as_uuid())
    .bind(workspace_id.as_uuid())
    .bind("Amazon SES")
    .bind(EmailServiceType::Ses.id())
    .bind(json!({"key": "AKIAEXAMPLE", "secret": "secret", "region": "eu-west-1"}))
    .execute(pool)
    .await
    .unwrap();
    id
}

/// DRAFT のキャンペーンを作成して保存する
pub async fn insert_draft_campaign(
    pool: &PgPool,
    workspace_id: &WorkspaceId,
    email_service_id: &EmailServiceId,
    send_to_all: bool,
) -> Campaign {
    let campaign = Campaign::new(NewCampaign {
        id: CampaignId::new(),
        workspace_id: workspace_id.clone(),
        email_service_id: email_service_id.clone(),
        name: CampaignName::new("Monthly newsletter").unwrap(),
        send_to_all,
        now: test_now(),
    });

    let tx_manager = PgTransactionManager::new(pool.clone());
    let repo = PostgresCampaignRepository::new(pool.clone());
    let mut tx = tx_manager.begin().await.unwrap();
    repo.insert(&mut tx, &campaign).await.unwrap();
    tx.commit().await.unwrap();

    campaign
}

/// 購読者を作成する。`unsubscribed` なら配信停止済みにする。
pub async fn insert_subscriber(pool: &PgPool, workspace_id: &WorkspaceId, unsubscribed: bool) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO subscribers (id, workspace_id, email, unsubscribed_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(workspace_id.as_uuid())
    .bind(format!("{id}@example.com"))
    .bind(unsubscribed.then(test_now))
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn insert_tag(pool: &PgPool, workspace_id: &WorkspaceId) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO tags (id, workspace_id, name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(workspace_id.as_uuid())
        .bind(format!("tag-{id}"))
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn tag_subscriber(pool: &PgPool, tag_id: Uuid, subscriber_id: Uuid) {
    sqlx::query("INSERT INTO tag_subscriber (tag_id, subscriber_id) VALUES ($1, $2)")
        .bind(tag_id)
        .bind(subscriber_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn tag_campaign(pool: &PgPool, campaign_id: &CampaignId, tag_id: Uuid) {
    sqlx::query("INSERT INTO campaign_tag (campaign_id, tag_id) VALUES ($1, $2)")
        .bind(campaign_id.as_uuid())
        .bind(tag_id)
        .execute(pool)
        .await
        .unwrap();
}

/// キャンペーンの送信ジョブ件数
pub async fn count_send_jobs(pool: &PgPool, campaign_id: &CampaignId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM campaign_send_jobs WHERE campaign_id = $1")
        .bind(campaign_id.as_uuid())
        .fetch_one(pool)
        .await
        .unwrap()
}
