//! # RecipientCounter
//!
//! キャンペーンの配信対象件数を数える。クォータ判定の `required` に使われる。
//!
//! - `send_to_all` のキャンペーン: ワークスペースの配信停止していない購読者すべて
//! - それ以外: キャンペーンに紐づくタグのいずれかを持つ購読者（重複除外）

use async_trait::async_trait;
use sendportal_domain::campaign::Campaign;
use sqlx::PgPool;

use crate::error::InfraError;

/// 配信対象件数の算出
#[async_trait]
pub trait RecipientCounter: Send + Sync {
    async fn count_recipients(&self, campaign: &Campaign) -> Result<u64, InfraError>;
}

/// PostgreSQL 実装の RecipientCounter
#[derive(Debug, Clone)]
pub struct PostgresRecipientCounter {
    pool: PgPool,
}

impl PostgresRecipientCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientCounter for PostgresRecipientCounter {
    #[tracing::instrument(skip_all, level = "debug", fields(campaign_id = %campaign.id()))]
    async fn count_recipients(&self, campaign: &Campaign) -> Result<u64, InfraError> {
        let count: i64 = if campaign.send_to_all() {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM subscribers
                WHERE workspace_id = $1 AND unsubscribed_at IS NULL
                "#,
            )
            .bind(campaign.workspace_id().as_uuid())
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(DISTINCT s.id)
                FROM subscribers s
                JOIN tag_subscriber ts ON ts.subscriber_id = s.id
                JOIN campaign_tag ct ON ct.tag_id = ts.tag_id
                WHERE ct.campaign_id = $1
                  AND s.workspace_id = $2
                  AND s.unsubscribed_at IS NULL
                "#,
            )
            .bind(campaign.id().as_uuid())
            .bind(campaign.workspace_id().as_uuid())
            .fetch_one(&self.pool)
            .await?
        };

        u64::try_from(count)
            .map_err(|_| InfraError::unexpected(format!("配信対象件数が負数です: {count}")))
    }
}
