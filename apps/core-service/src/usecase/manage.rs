//! # キャンペーン管理ユースケース
//!
//! キャンペーンの削除と複製。
//!
//! - 削除できるのは DRAFT のみ。判定は配信と同じく条件付き DELETE で行い、
//!   同時に配信されたキャンペーンを消すことはない
//! - 複製は元のステータスを問わず、新しい DRAFT を作る。配信対象タグも引き継ぐ

use std::sync::Arc;

use sendportal_domain::{
    campaign::{Campaign, CampaignId, CampaignStatus},
    clock::Clock,
    workspace::WorkspaceId,
};
use sendportal_infra::{db::TransactionManager, repository::CampaignRepository};

use super::helpers::FindResultExt;
use crate::error::CoreError;

/// DRAFT 以外のキャンペーンを削除しようとした場合のメッセージ
pub const NOT_DRAFT_DELETE_MESSAGE: &str =
    "The campaign must have a status of draft to be deleted.";

fn not_draft() -> CoreError {
    CoreError::Validation {
        field:   "status_id",
        message: NOT_DRAFT_DELETE_MESSAGE.to_string(),
    }
}

/// キャンペーン管理ユースケース
pub struct CampaignManageUseCaseImpl {
    campaign_repo: Arc<dyn CampaignRepository>,
    tx_manager:    Arc<dyn TransactionManager>,
    clock:         Arc<dyn Clock>,
}

impl CampaignManageUseCaseImpl {
    pub fn new(
        campaign_repo: Arc<dyn CampaignRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaign_repo,
            tx_manager,
            clock,
        }
    }

    /// DRAFT のキャンペーンを削除する
    #[tracing::instrument(skip_all, fields(%workspace_id, %campaign_id))]
    pub async fn delete_campaign(
        &self,
        workspace_id: &WorkspaceId,
        campaign_id: &CampaignId,
    ) -> Result<(), CoreError> {
        let campaign = self
            .campaign_repo
            .find_by_id(campaign_id, workspace_id)
            .await
            .or_not_found("Campaign")?;

        if !campaign.is_draft() {
            return Err(not_draft());
        }

        let mut tx = self.tx_manager.begin().await?;
        self.campaign_repo
            .delete(&mut tx, &campaign, CampaignStatus::Draft)
            .await
            .map_err(|e| if e.is_conflict() { not_draft() } else { CoreError::Database(e) })?;
        tx.commit().await?;

        tracing::info!("キャンペーンを削除しました");
        Ok(())
    }

    /// キャンペーンを複製し、新しい DRAFT を返す
    #[tracing::instrument(skip_all, fields(%workspace_id, %campaign_id))]
    pub async fn duplicate_campaign(
        &self,
        workspace_id: &WorkspaceId,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, CoreError> {
        let source = self
            .campaign_repo
            .find_by_id(campaign_id, workspace_id)
            .await
            .or_not_found("Campaign")?;

        let copy = source.duplicated(CampaignId::new(), self.clock.now());

        let mut tx = self.tx_manager.begin().await?;
        self.campaign_repo.insert(&mut tx, &copy).await?;
        self.campaign_repo
            .copy_tags(&mut tx, source.id(), copy.id())
            .await?;
        tx.commit().await?;

        tracing::info!(new_campaign_id = %copy.id(), "キャンペーンを複製しました");
        Ok(copy)
    }
}
