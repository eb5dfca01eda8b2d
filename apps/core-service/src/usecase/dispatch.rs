//! # キャンペーン配信ユースケース
//!
//! DRAFT のキャンペーンを QUEUED に遷移させ、送信ジョブを登録する。
//!
//! ## 処理の流れ
//!
//! ```text
//! 1. キャンペーン取得（ワークスペース内）     → なければ NotFound
//! 2. ステータスが DRAFT か                    → でなければ Validation(status_id)
//! 3. 配信対象件数の算出
//! 4. 送信クォータ判定                         → 超過なら Unprocessable
//!                                             → 照会失敗なら QuotaCheckFailed
//! 5. トランザクション
//!    ├─ UPDATE ... WHERE status_id = DRAFT    → 0 行なら Validation(status_id)
//!    ├─ 送信ジョブ INSERT
//!    └─ COMMIT
//! ```
//!
//! 1〜4 は読み取りのみで、失敗してもキャンペーンは変更されない。
//! 5 はステータス更新とジョブ登録がともに確定するか、ともに破棄される。
//!
//! ## 同時実行
//!
//! 同じキャンペーンへの配信要求が同時に来た場合、両方が 2 を通過しうる。
//! 5 の条件付き UPDATE で DRAFT を観測できるのは 1 つだけなので、
//! もう一方は「DRAFT ではない」として 2 と同じエラーになる。

use std::sync::Arc;

use sendportal_domain::{
    campaign::{Campaign, CampaignId, CampaignStatus},
    clock::Clock,
    send_job::SendCampaignJob,
    workspace::WorkspaceId,
};
use sendportal_infra::{
    db::TransactionManager,
    quota::QuotaChecker,
    repository::{CampaignRepository, EmailServiceRepository, RecipientCounter, SendJobQueue},
};

use super::helpers::FindResultExt;
use crate::error::CoreError;

/// DRAFT 以外のキャンペーンを配信しようとした場合のメッセージ
pub const NOT_DRAFT_MESSAGE: &str = "The campaign must have a status of draft to be dispatched.";

/// 配信対象件数が送信クォータを超える場合のメッセージ
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "The number of subscribers for this campaign exceeds your SES quota";

fn not_draft() -> CoreError {
    CoreError::Validation {
        field:   "status_id",
        message: NOT_DRAFT_MESSAGE.to_string(),
    }
}

/// キャンペーン配信ユースケース
pub struct CampaignDispatchUseCaseImpl {
    campaign_repo:      Arc<dyn CampaignRepository>,
    email_service_repo: Arc<dyn EmailServiceRepository>,
    recipient_counter:  Arc<dyn RecipientCounter>,
    send_job_queue:     Arc<dyn SendJobQueue>,
    quota_checker:      Arc<dyn QuotaChecker>,
    tx_manager:         Arc<dyn TransactionManager>,
    clock:              Arc<dyn Clock>,
}

impl CampaignDispatchUseCaseImpl {
    pub fn new(
        campaign_repo: Arc<dyn CampaignRepository>,
        email_service_repo: Arc<dyn EmailServiceRepository>,
        recipient_counter: Arc<dyn RecipientCounter>,
        send_job_queue: Arc<dyn SendJobQueue>,
        quota_checker: Arc<dyn QuotaChecker>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaign_repo,
            email_service_repo,
            recipient_counter,
            send_job_queue,
            quota_checker,
            tx_manager,
            clock,
        }
    }

    /// キャンペーンを配信キューに投入する
    ///
    /// 成功時は QUEUED になったキャンペーンを返す。
    #[tracing::instrument(skip_all, fields(%workspace_id, %campaign_id))]
    pub async fn dispatch(
        &self,
        workspace_id: &WorkspaceId,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, CoreError> {
        let campaign = self
            .campaign_repo
            .find_by_id(campaign_id, workspace_id)
            .await
            .or_not_found("Campaign")?;

        if !campaign.is_draft() {
            tracing::debug!(status = %campaign.status(), "DRAFT ではないため配信しません");
            return Err(not_draft());
        }

        let email_service = self
            .email_service_repo
            .find_by_id(campaign.email_service_id(), workspace_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "キャンペーンのメールサービスが見つかりません: {}",
                    campaign.email_service_id()
                ))
            })?;

        let required = self.recipient_counter.count_recipients(&campaign).await?;

        let exceeded = self
            .quota_checker
            .exceeds_quota(&email_service, required)
            .await
            .map_err(|e| CoreError::QuotaCheckFailed(e.to_string()))?;
        if exceeded {
            tracing::info!(required, "配信対象件数が送信クォータを超えています");
            return Err(CoreError::Unprocessable(QUOTA_EXCEEDED_MESSAGE.to_string()));
        }

        let now = self.clock.now();
        let queued = campaign
            .queued(now)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        let job = SendCampaignJob::for_campaign(&queued, now);

        let mut tx = self.tx_manager.begin().await?;
        self.campaign_repo
            .update_status(&mut tx, &queued, CampaignStatus::Draft)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    tracing::info!("同時に配信されたため DRAFT ではなくなりました");
                    not_draft()
                } else {
                    CoreError::Database(e)
                }
            })?;
        self.send_job_queue.enqueue(&mut tx, &job).await?;
        tx.commit().await?;

        tracing::info!(job_id = %job.id, required, "キャンペーンを配信キューに投入しました");
        Ok(queued)
    }
}
