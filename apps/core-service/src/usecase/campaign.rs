//! キャンペーン参照ユースケース

use std::sync::Arc;

use sendportal_domain::{
    campaign::{Campaign, CampaignId},
    workspace::WorkspaceId,
};
use sendportal_infra::repository::CampaignRepository;

use super::helpers::FindResultExt;
use crate::error::CoreError;

/// 1 ページあたりの既定件数
pub const DEFAULT_PAGE_SIZE: i64 = 25;
/// 1 ページあたりの最大件数
pub const MAX_PAGE_SIZE: i64 = 100;

/// キャンペーン一覧の 1 ページ
#[derive(Debug)]
pub struct CampaignPage {
    pub campaigns:   Vec<Campaign>,
    /// 次ページのカーソル（最後のページなら `None`）
    pub next_cursor: Option<CampaignId>,
}

/// キャンペーン参照ユースケース
pub struct CampaignQueryUseCaseImpl {
    campaign_repo: Arc<dyn CampaignRepository>,
}

impl CampaignQueryUseCaseImpl {
    pub fn new(campaign_repo: Arc<dyn CampaignRepository>) -> Self {
        Self { campaign_repo }
    }

    /// ワークスペース内のキャンペーンを取得する
    pub async fn get_campaign(
        &self,
        workspace_id: &WorkspaceId,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, CoreError> {
        self.campaign_repo
            .find_by_id(campaign_id, workspace_id)
            .await
            .or_not_found("Campaign")
    }

    /// キャンペーンを新しい順に取得する
    ///
    /// `limit` は 1..=100 に丸める（未指定は 25）。次ページの有無は
    /// `limit + 1` 件取得して判定する。
    pub async fn list_campaigns(
        &self,
        workspace_id: &WorkspaceId,
        cursor: Option<&CampaignId>,
        limit: Option<i64>,
    ) -> Result<CampaignPage, CoreError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let mut campaigns = self
            .campaign_repo
            .find_page(workspace_id, cursor, limit + 1)
            .await?;

        let has_more = campaigns.len() > usize::try_from(limit).unwrap_or(usize::MAX);
        if has_more {
            campaigns.pop();
        }
        let next_cursor = has_more
            .then(|| campaigns.last().map(|c| c.id().clone()))
            .flatten();

        Ok(CampaignPage {
            campaigns,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use sendportal_domain::{
        campaign::{CampaignName, NewCampaign},
        email_service::EmailServiceId,
    };
    use sendportal_infra::mock::MockCampaignRepository;

    use super::*;

    fn add_campaigns(repo: &MockCampaignRepository, workspace_id: &WorkspaceId, n: usize) -> Vec<CampaignId> {
        let now = DateTime::from_timestamp(1_767_225_600, 0).unwrap();
        (0..n)
            .map(|i| {
                let campaign = Campaign::new(NewCampaign {
                    id: CampaignId::new(),
                    workspace_id: workspace_id.clone(),
                    email_service_id: EmailServiceId::new(),
                    name: CampaignName::new(format!("Campaign {i}")).unwrap(),
                    send_to_all: true,
                    now,
                });
                let id = campaign.id().clone();
                repo.add_campaign(campaign);
                id
            })
            .collect()
    }

    #[tokio::test]
    async fn test_別ワークスペースのキャンペーンはnot_found() {
        let repo = MockCampaignRepository::new();
        let owner = WorkspaceId::new();
        let ids = add_campaigns(&repo, &owner, 1);
        let sut = CampaignQueryUseCaseImpl::new(Arc::new(repo));

        let result = sut.get_campaign(&WorkspaceId::new(), &ids[0]).await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_一覧は新しい順でカーソルをたどれる() {
        let repo = MockCampaignRepository::new();
        let workspace_id = WorkspaceId::new();
        let ids = add_campaigns(&repo, &workspace_id, 3);
        let sut = CampaignQueryUseCaseImpl::new(Arc::new(repo));

        let first = sut.list_campaigns(&workspace_id, None, Some(2)).await.unwrap();
        let second = sut
            .list_campaigns(&workspace_id, first.next_cursor.as_ref(), Some(2))
            .await
            .unwrap();

        let first_ids: Vec<_> = first.campaigns.iter().map(|c| c.id().clone()).collect();
        assert_eq!(first_ids, vec![ids[2].clone(), ids[1].clone()]);
        assert_eq!(first.next_cursor, Some(ids[1].clone()));
        assert_eq!(second.campaigns.len(), 1);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn test_limitは上限に丸められる() {
        let repo = MockCampaignRepository::new();
        let workspace_id = WorkspaceId::new();
        add_campaigns(&repo, &workspace_id, 3);
        let sut = CampaignQueryUseCaseImpl::new(Arc::new(repo));

        let page = sut.list_campaigns(&workspace_id, None, Some(0)).await.unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert!(page.next_cursor.is_some());
    }
}
