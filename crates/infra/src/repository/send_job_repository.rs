//! # SendJobQueue
//!
//! キャンペーン送信ジョブのキュー投入。
//!
//! PostgreSQL 実装はトランザクショナルアウトボックスで、`campaign_send_jobs` への
//! INSERT を呼び出し元のトランザクションに相乗りさせる。ステータス更新と
//! 同時にコミットされるため、「QUEUED なのにジョブがない」状態は起こらない。

use async_trait::async_trait;
use sendportal_domain::send_job::SendCampaignJob;

use crate::{db::TxContext, error::InfraError};

/// 送信ジョブキュー
#[async_trait]
pub trait SendJobQueue: Send + Sync {
    /// ジョブを登録する（コミットは呼び出し側）
    async fn enqueue(&self, tx: &mut TxContext, job: &SendCampaignJob) -> Result<(), InfraError>;
}

/// `campaign_send_jobs` テーブルを使うアウトボックス実装
#[derive(Debug, Clone, Default)]
pub struct PostgresSendJobQueue;

impl PostgresSendJobQueue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SendJobQueue for PostgresSendJobQueue {
    #[tracing::instrument(skip_all, level = "debug", fields(job_id = %job.id, campaign_id = %job.campaign_id))]
    async fn enqueue(&self, tx: &mut TxContext, job: &SendCampaignJob) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_send_jobs (id, workspace_id, campaign_id, status, enqueued_at)
            VALUES ($1, $2, $3, 'pending', $4)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.workspace_id.as_uuid())
        .bind(job.campaign_id.as_uuid())
        .bind(job.enqueued_at)
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
