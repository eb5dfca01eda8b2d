//! 統合テスト用ヘルパー
//!
//! モックリポジトリを注入した本番と同じルーターを組み立て、
//! `oneshot` でリクエストを送る。

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
   Router,
   body::Body,
   http::{Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use sendportal_core_service::{
   app_builder::build_app,
   handler::{CampaignState, ReadinessState},
   middleware::AuthState,
   usecase::{CampaignDispatchUseCaseImpl, CampaignManageUseCaseImpl, CampaignQueryUseCaseImpl},
};
use sendportal_domain::{
   campaign::{Campaign, CampaignId, CampaignName, CampaignStatus, NewCampaign},
   clock::FixedClock,
   email_service::{EmailService, EmailServiceId, EmailServiceType},
   user::UserId,
   workspace::WorkspaceId,
};
use sendportal_infra::{
   db::{DatabaseProbe, TxContext},
   mock::{
      MockApiTokenRepository,
      MockCampaignRepository,
      MockDatabaseProbe,
      MockEmailServiceRepository,
      MockRecipientCounter,
      MockSendJobQueue,
      MockTransactionManager,
      StubQuotaChecker,
   },
   quota::QuotaChecker,
   repository::CampaignRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// ワークスペースメンバーのトークン
pub const MEMBER_TOKEN: &str = "member-token";
/// 有効だがワークスペースに所属していないユーザーのトークン
pub const OUTSIDER_TOKEN: &str = "outsider-token";

pub fn now() -> DateTime<Utc> {
   DateTime::from_timestamp(1_767_225_600, 0).unwrap()
}

/// モックで組み立てたテスト用アプリケーション
///
/// モックは `Arc` で状態を共有しているため、ルーター構築後も検証に使える。
pub struct TestApp {
   pub workspace_id: WorkspaceId,
   pub campaigns:    MockCampaignRepository,
   pub services:     MockEmailServiceRepository,
   pub recipients:   MockRecipientCounter,
   pub queue:        MockSendJobQueue,
   quota_checker:    Arc<dyn QuotaChecker>,
   database:         Arc<dyn DatabaseProbe>,
   tokens:           MockApiTokenRepository,
   email_service_id: EmailServiceId,
}

impl TestApp {
   /// SES のメールサービスを 1 つ持つワークスペースと、そのメンバーを用意する
   pub fn new() -> Self {
      let workspace_id = WorkspaceId::new();

      let service = EmailService::new(
         EmailServiceId::new(),
         workspace_id.clone(),
         "Amazon SES",
         EmailServiceType::Ses,
         json!({"key": "AKIA", "secret": "s", "region": "eu-west-1"}),
      );
      let email_service_id = service.id().clone();
      let services = MockEmailServiceRepository::new();
      services.add_email_service(service);

      let tokens = MockApiTokenRepository::new();
      let member = UserId::new();
      tokens.add_token(MEMBER_TOKEN, member.clone());
      tokens.add_member(workspace_id.clone(), member);
      tokens.add_token(OUTSIDER_TOKEN, UserId::new());

      Self {
         workspace_id,
         campaigns: MockCampaignRepository::new(),
         services,
         recipients: MockRecipientCounter::new(),
         queue: MockSendJobQueue::new(),
         quota_checker: Arc::new(StubQuotaChecker::within_quota()),
         database: Arc::new(MockDatabaseProbe::healthy()),
         tokens,
         email_service_id,
      }
   }

   /// クォータ判定を差し替える
   pub fn with_quota_checker(mut self, quota_checker: impl QuotaChecker + 'static) -> Self {
      self.quota_checker = Arc::new(quota_checker);
      self
   }

   /// 送信ジョブキューを差し替える
   pub fn with_queue(mut self, queue: MockSendJobQueue) -> Self {
      self.queue = queue;
      self
   }

   /// Readiness Check の DB 確認を差し替える
   pub fn with_database(mut self, database: MockDatabaseProbe) -> Self {
      self.database = Arc::new(database);
      self
   }

   /// 配信対象 `recipients` 件の DRAFT キャンペーンを追加する
   pub fn add_draft_campaign(&self, name: &str, recipients: u64) -> CampaignId {
      let campaign = Campaign::new(NewCampaign {
         id: CampaignId::new(),
         workspace_id: self.workspace_id.clone(),
         email_service_id: self.email_service_id.clone(),
         name: CampaignName::new(name).unwrap(),
         send_to_all: true,
         now: now(),
      });
      let id = campaign.id().clone();
      self.campaigns.add_campaign(campaign);
      self.recipients.set_count(&id, recipients);
      id
   }

   /// 指定ステータスのキャンペーンを追加する
   pub async fn add_campaign_in(&self, status: CampaignStatus) -> CampaignId {
      let id = self.add_draft_campaign("Already dispatched", 10);
      let mut campaign = self.campaigns.get(&id).unwrap();
      while campaign.status() != status {
         campaign = match campaign.status().next().unwrap() {
            CampaignStatus::Queued => campaign.queued(now()),
            CampaignStatus::Sending => campaign.sending(now()),
            CampaignStatus::Sent => campaign.sent(now()),
            CampaignStatus::Draft => unreachable!(),
         }
         .unwrap();
      }
      let mut tx = TxContext::mock();
      self
         .campaigns
         .update_status(&mut tx, &campaign, CampaignStatus::Draft)
         .await
         .unwrap();
      tx.commit().await.unwrap();
      id
   }

   pub fn stored_status(&self, id: &CampaignId) -> CampaignStatus {
      self.campaigns.get(id).unwrap().status()
   }

   /// 本番と同じ構成のルーターを組み立てる
   pub fn router(&self) -> Router {
      let campaign_repo: Arc<dyn CampaignRepository> = Arc::new(self.campaigns.clone());
      let dispatch = CampaignDispatchUseCaseImpl::new(
         Arc::clone(&campaign_repo),
         Arc::new(self.services.clone()),
         Arc::new(self.recipients.clone()),
         Arc::new(self.queue.clone()),
         Arc::clone(&self.quota_checker),
         Arc::new(MockTransactionManager::new()),
         Arc::new(FixedClock::new(now())),
      );
      let manage = CampaignManageUseCaseImpl::new(
         Arc::clone(&campaign_repo),
         Arc::new(MockTransactionManager::new()),
         Arc::new(FixedClock::new(now())),
      );
      let query = CampaignQueryUseCaseImpl::new(campaign_repo);

      build_app(
         Arc::new(CampaignState {
            dispatch,
            query,
            manage,
         }),
         AuthState {
            api_tokens: Arc::new(self.tokens.clone()),
         },
         Arc::new(ReadinessState {
            database: Arc::clone(&self.database),
         }),
      )
   }

   pub fn send_uri(&self, campaign_id: &CampaignId) -> String {
      format!("/api/{}/campaigns/{}/send", self.workspace_id, campaign_id)
   }

   pub fn campaign_uri(&self, campaign_id: &CampaignId) -> String {
      format!("/api/{}/campaigns/{}", self.workspace_id, campaign_id)
   }
}

/// リクエストを送り、ステータスコードと JSON 本文を返す
pub async fn call(
   router: Router,
   method: &str,
   uri: &str,
   token: Option<&str>,
) -> (StatusCode, Value) {
   let mut builder = Request::builder().method(method).uri(uri);
   if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
   }
   let response = router
      .oneshot(builder.body(Body::empty()).unwrap())
      .await
      .unwrap();

   let status = response.status();
   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   let body = if bytes.is_empty() {
      Value::Null
   } else {
      serde_json::from_slice(&bytes).unwrap()
   };
   (status, body)
}
