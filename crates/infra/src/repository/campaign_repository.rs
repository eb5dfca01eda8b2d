//! # CampaignRepository
//!
//! キャンペーンの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **ワークスペース分離**: すべてのクエリで `workspace_id` を条件に含める
//! - **条件付き更新**: ステータス更新は `WHERE status_id = <期待値>` 付きで行い、
//!   0 行なら [`InfraError::conflict`] を返す。同時に 2 つの配信要求が来ても、
//!   DRAFT を観測して更新できるのは 1 つだけになる
//! - **条件付き削除**: 削除も同じく `WHERE status_id = <期待値>` 付きで行う

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sendportal_domain::{
    campaign::{Campaign, CampaignId, CampaignName, CampaignRecord, CampaignStatus},
    email_service::EmailServiceId,
    workspace::WorkspaceId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// キャンペーンリポジトリトレイト
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// ワークスペース内のキャンペーンを ID で取得する
    ///
    /// 別ワークスペースのキャンペーンは `Ok(None)` になる。
    async fn find_by_id(
        &self,
        id: &CampaignId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<Campaign>, InfraError>;

    /// ワークスペース内のキャンペーンを新しい順に取得する
    ///
    /// # 引数
    ///
    /// - `before`: この ID より古いものだけを返す（カーソル）
    /// - `limit`: 最大件数
    async fn find_page(
        &self,
        workspace_id: &WorkspaceId,
        before: Option<&CampaignId>,
        limit: i64,
    ) -> Result<Vec<Campaign>, InfraError>;

    /// キャンペーンを新規作成する
    async fn insert(&self, tx: &mut TxContext, campaign: &Campaign) -> Result<(), InfraError>;

    /// ステータスを条件付きで更新する
    ///
    /// DB 上のステータスが `expected` の場合に限り、`campaign` のステータスと
    /// `updated_at` を書き込む。
    ///
    /// # 戻り値
    ///
    /// - `Ok(())`: 更新成功
    /// - `Err(Conflict)`: DB 上のステータスが `expected` ではなかった
    /// - `Err(_)`: データベースエラー
    async fn update_status(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError>;

    /// キャンペーンを条件付きで削除する
    ///
    /// DB 上のステータスが `expected` でなければ `Err(Conflict)`。
    /// 配信対象タグの紐付けは外部キーの CASCADE で消える。
    async fn delete(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError>;

    /// `source` の配信対象タグを `target` にも紐付ける
    async fn copy_tags(
        &self,
        tx: &mut TxContext,
        source: &CampaignId,
        target: &CampaignId,
    ) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の CampaignRepository
#[derive(Debug, Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id:               Uuid,
    workspace_id:     Uuid,
    email_service_id: Uuid,
    name:             String,
    status_id:        i16,
    send_to_all:      bool,
    sent_count:       i64,
    open_count:       i64,
    click_count:      i64,
    created_at:       DateTime<Utc>,
    updated_at:       DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = InfraError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign::from_db(CampaignRecord {
            id:               CampaignId::from_uuid(row.id),
            workspace_id:     WorkspaceId::from_uuid(row.workspace_id),
            email_service_id: EmailServiceId::from_uuid(row.email_service_id),
            name:             CampaignName::new(row.name)?,
            status:           CampaignStatus::try_from(row.status_id)?,
            send_to_all:      row.send_to_all,
            sent_count:       row.sent_count,
            open_count:       row.open_count,
            click_count:      row.click_count,
            created_at:       row.created_at,
            updated_at:       row.updated_at,
        })?)
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, workspace_id, email_service_id, name, status_id, send_to_all,
           sent_count, open_count, click_count, created_at, updated_at
    FROM campaigns
"#;

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id, %workspace_id))]
    async fn find_by_id(
        &self,
        id: &CampaignId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<Campaign>, InfraError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1 AND workspace_id = $2");
        let row: Option<CampaignRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(workspace_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Campaign::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%workspace_id, limit))]
    async fn find_page(
        &self,
        workspace_id: &WorkspaceId,
        before: Option<&CampaignId>,
        limit: i64,
    ) -> Result<Vec<Campaign>, InfraError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE workspace_id = $1 AND ($2::uuid IS NULL OR id < $2) \
             ORDER BY id DESC LIMIT $3"
        );
        let rows: Vec<CampaignRow> = sqlx::query_as(&sql)
            .bind(workspace_id.as_uuid())
            .bind(before.map(|id| *id.as_uuid()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Campaign::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(campaign_id = %campaign.id()))]
    async fn insert(&self, tx: &mut TxContext, campaign: &Campaign) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, workspace_id, email_service_id, name, status_id, send_to_all,
                sent_count, open_count, click_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(campaign.id().as_uuid())
        .bind(campaign.workspace_id().as_uuid())
        .bind(campaign.email_service_id().as_uuid())
        .bind(campaign.name().as_str())
        .bind(campaign.status().id())
        .bind(campaign.send_to_all())
        .bind(campaign.sent_count())
        .bind(campaign.open_count())
        .bind(campaign.click_count())
        .bind(campaign.created_at())
        .bind(campaign.updated_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(campaign_id = %campaign.id(), ?expected))]
    async fn update_status(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status_id = $1,
                updated_at = $2
            WHERE id = $3 AND workspace_id = $4 AND status_id = $5
            "#,
        )
        .bind(campaign.status().id())
        .bind(campaign.updated_at())
        .bind(campaign.id().as_uuid())
        .bind(campaign.workspace_id().as_uuid())
        .bind(expected.id())
        .execute(tx.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Campaign", campaign.id().to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(campaign_id = %campaign.id(), ?expected))]
    async fn delete(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError> {
        let result = sqlx::query(
            "DELETE FROM campaigns WHERE id = $1 AND workspace_id = $2 AND status_id = $3",
        )
        .bind(campaign.id().as_uuid())
        .bind(campaign.workspace_id().as_uuid())
        .bind(expected.id())
        .execute(tx.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Campaign", campaign.id().to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%source, %target))]
    async fn copy_tags(
        &self,
        tx: &mut TxContext,
        source: &CampaignId,
        target: &CampaignId,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_tag (campaign_id, tag_id)
            SELECT $2, tag_id FROM campaign_tag WHERE campaign_id = $1
            "#,
        )
        .bind(source.as_uuid())
        .bind(target.as_uuid())
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
