//! # キャンペーン送信ジョブ
//!
//! 配信確定時に送信キューへ積むジョブ。実際の一斉送信は外部ワーカーが行う。

use chrono::{DateTime, Utc};

use crate::{
    campaign::{Campaign, CampaignId},
    workspace::WorkspaceId,
};

define_uuid_id! {
    /// 送信ジョブ ID
    pub struct SendJobId;
}

/// キャンペーン送信ジョブ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCampaignJob {
    pub id:           SendJobId,
    pub workspace_id: WorkspaceId,
    pub campaign_id:  CampaignId,
    pub enqueued_at:  DateTime<Utc>,
}

impl SendCampaignJob {
    /// キャンペーンを送信するジョブを作成する
    pub fn for_campaign(campaign: &Campaign, now: DateTime<Utc>) -> Self {
        Self {
            id:           SendJobId::new(),
            workspace_id: campaign.workspace_id().clone(),
            campaign_id:  campaign.id().clone(),
            enqueued_at:  now,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        campaign::{CampaignName, NewCampaign},
        email_service::EmailServiceId,
    };

    #[test]
    fn test_for_campaignはキャンペーンとワークスペースを参照する() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let campaign = Campaign::new(NewCampaign {
            id: CampaignId::new(),
            workspace_id: WorkspaceId::new(),
            email_service_id: EmailServiceId::new(),
            name: CampaignName::new("Weekly").unwrap(),
            send_to_all: false,
            now,
        });

        let job = SendCampaignJob::for_campaign(&campaign, now);

        assert_eq!(&job.campaign_id, campaign.id());
        assert_eq!(&job.workspace_id, campaign.workspace_id());
        assert_eq!(job.enqueued_at, now);
    }
}
