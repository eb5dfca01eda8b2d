//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! sendportal-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 書き込み系のモックは [`TxContext::on_rollback`] に取り消し処理を登録するため、
//! コミットせずに終わったトランザクションの変更は残らない。

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use sendportal_domain::{
    campaign::{Campaign, CampaignId, CampaignStatus},
    email_service::{EmailService, EmailServiceId},
    quota::QuotaError,
    send_job::SendCampaignJob,
    user::UserId,
    workspace::WorkspaceId,
};

use crate::{
    db::{DatabaseProbe, TransactionManager, TxContext},
    error::InfraError,
    quota::QuotaChecker,
    repository::{
        ApiTokenRepository,
        CampaignRepository,
        EmailServiceRepository,
        RecipientCounter,
        SendJobQueue,
    },
};

// ===== MockTransactionManager =====

#[derive(Clone, Default)]
pub struct MockTransactionManager;

impl MockTransactionManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}

// ===== MockCampaignRepository =====

#[derive(Clone, Default)]
pub struct MockCampaignRepository {
    campaigns:  Arc<Mutex<Vec<Campaign>>>,
    tag_copies: Arc<Mutex<Vec<(CampaignId, CampaignId)>>>,
}

impl MockCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_campaign(&self, campaign: Campaign) {
        self.campaigns.lock().unwrap().push(campaign);
    }

    /// ワークスペースを問わず ID で取得する（検証用）
    pub fn get(&self, id: &CampaignId) -> Option<Campaign> {
        self.campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    /// `copy_tags` で記録された `(source, target)`（検証用）
    pub fn tag_copies(&self) -> Vec<(CampaignId, CampaignId)> {
        self.tag_copies.lock().unwrap().clone()
    }
}

#[async_trait]
impl CampaignRepository for MockCampaignRepository {
    async fn find_by_id(
        &self,
        id: &CampaignId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<Campaign>, InfraError> {
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id && c.workspace_id() == workspace_id)
            .cloned())
    }

    async fn find_page(
        &self,
        workspace_id: &WorkspaceId,
        before: Option<&CampaignId>,
        limit: i64,
    ) -> Result<Vec<Campaign>, InfraError> {
        let mut page: Vec<Campaign> = self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.workspace_id() == workspace_id)
            .filter(|c| before.is_none_or(|b| c.id().as_uuid() < b.as_uuid()))
            .cloned()
            .collect();
        page.sort_by(|a, b| b.id().as_uuid().cmp(a.id().as_uuid()));
        page.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(page)
    }

    async fn insert(&self, tx: &mut TxContext, campaign: &Campaign) -> Result<(), InfraError> {
        self.campaigns.lock().unwrap().push(campaign.clone());

        let campaigns = Arc::clone(&self.campaigns);
        let id = campaign.id().clone();
        tx.on_rollback(move || campaigns.lock().unwrap().retain(|c| c.id() != &id));
        Ok(())
    }

    async fn update_status(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError> {
        // 判定と書き込みを同じロック内で行い、DB の条件付き UPDATE と同じ振る舞いにする
        let mut campaigns = self.campaigns.lock().unwrap();
        let Some(slot) = campaigns.iter_mut().find(|c| {
            c.id() == campaign.id()
                && c.workspace_id() == campaign.workspace_id()
                && c.status() == expected
        }) else {
            return Err(InfraError::conflict("Campaign", campaign.id().to_string()));
        };
        let previous = std::mem::replace(slot, campaign.clone());
        drop(campaigns);

        let campaigns = Arc::clone(&self.campaigns);
        tx.on_rollback(move || {
            if let Some(slot) = campaigns
                .lock()
                .unwrap()
                .iter_mut()
                .find(|c| c.id() == previous.id())
            {
                *slot = previous;
            }
        });
        Ok(())
    }

    async fn delete(
        &self,
        tx: &mut TxContext,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> Result<(), InfraError> {
        let mut campaigns = self.campaigns.lock().unwrap();
        let Some(index) = campaigns.iter().position(|c| {
            c.id() == campaign.id()
                && c.workspace_id() == campaign.workspace_id()
                && c.status() == expected
        }) else {
            return Err(InfraError::conflict("Campaign", campaign.id().to_string()));
        };
        let removed = campaigns.remove(index);
        drop(campaigns);

        let campaigns = Arc::clone(&self.campaigns);
        tx.on_rollback(move || campaigns.lock().unwrap().push(removed));
        Ok(())
    }

    async fn copy_tags(
        &self,
        tx: &mut TxContext,
        source: &CampaignId,
        target: &CampaignId,
    ) -> Result<(), InfraError> {
        self.tag_copies
            .lock()
            .unwrap()
            .push((source.clone(), target.clone()));

        let tag_copies = Arc::clone(&self.tag_copies);
        let target = target.clone();
        tx.on_rollback(move || tag_copies.lock().unwrap().retain(|(_, t)| t != &target));
        Ok(())
    }
}

// ===== MockEmailServiceRepository =====

#[derive(Clone, Default)]
pub struct MockEmailServiceRepository {
    services: Arc<Mutex<Vec<EmailService>>>,
}

impl MockEmailServiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_email_service(&self, service: EmailService) {
        self.services.lock().unwrap().push(service);
    }
}

#[async_trait]
impl EmailServiceRepository for MockEmailServiceRepository {
    async fn find_by_id(
        &self,
        id: &EmailServiceId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<EmailService>, InfraError> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id() == id && s.workspace_id() == workspace_id)
            .cloned())
    }
}

// ===== MockRecipientCounter =====

/// キャンペーンごとの配信対象件数を返す。未登録のキャンペーンは 0 件。
#[derive(Clone, Default)]
pub struct MockRecipientCounter {
    counts: Arc<Mutex<HashMap<CampaignId, u64>>>,
}

impl MockRecipientCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&self, campaign_id: &CampaignId, count: u64) {
        self.counts
            .lock()
            .unwrap()
            .insert(campaign_id.clone(), count);
    }
}

#[async_trait]
impl RecipientCounter for MockRecipientCounter {
    async fn count_recipients(&self, campaign: &Campaign) -> Result<u64, InfraError> {
        Ok(self
            .counts
            .lock()
            .unwrap()
            .get(campaign.id())
            .copied()
            .unwrap_or(0))
    }
}

// ===== MockSendJobQueue =====

#[derive(Clone, Default)]
pub struct MockSendJobQueue {
    jobs:    Arc<Mutex<Vec<SendCampaignJob>>>,
    failing: bool,
}

impl MockSendJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に DB エラーで失敗するキュー
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// 登録されたジョブ（コミット済み・未ロールバックのもの）
    pub fn jobs(&self) -> Vec<SendCampaignJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SendJobQueue for MockSendJobQueue {
    async fn enqueue(&self, tx: &mut TxContext, job: &SendCampaignJob) -> Result<(), InfraError> {
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut.into());
        }

        self.jobs.lock().unwrap().push(job.clone());

        let jobs = Arc::clone(&self.jobs);
        let id = job.id.clone();
        tx.on_rollback(move || jobs.lock().unwrap().retain(|j| j.id != id));
        Ok(())
    }
}

// ===== StubQuotaChecker =====

#[derive(Clone)]
enum QuotaOutcome {
    Exceeded(bool),
    Fail(QuotaError),
}

/// 固定の判定結果を返す QuotaChecker
///
/// 呼び出し時の `required` を記録する。
#[derive(Clone)]
pub struct StubQuotaChecker {
    outcome: QuotaOutcome,
    calls:   Arc<Mutex<Vec<u64>>>,
}

impl StubQuotaChecker {
    fn with(outcome: QuotaOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::default(),
        }
    }

    /// クォータ内（超過なし）
    pub fn within_quota() -> Self {
        Self::with(QuotaOutcome::Exceeded(false))
    }

    /// クォータ超過
    pub fn exceeded() -> Self {
        Self::with(QuotaOutcome::Exceeded(true))
    }

    /// 照会失敗
    pub fn failing(error: QuotaError) -> Self {
        Self::with(QuotaOutcome::Fail(error))
    }

    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuotaChecker for StubQuotaChecker {
    async fn exceeds_quota(&self, _: &EmailService, required: u64) -> Result<bool, QuotaError> {
        self.calls.lock().unwrap().push(required);
        match &self.outcome {
            QuotaOutcome::Exceeded(exceeded) => Ok(*exceeded),
            QuotaOutcome::Fail(error) => Err(error.clone()),
        }
    }
}

// ===== MockApiTokenRepository =====

#[derive(Clone, Default)]
pub struct MockApiTokenRepository {
    tokens:  Arc<Mutex<HashMap<String, UserId>>>,
    members: Arc<Mutex<HashSet<(WorkspaceId, UserId)>>>,
}

impl MockApiTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens.lock().unwrap().insert(token.into(), user_id);
    }

    pub fn add_member(&self, workspace_id: WorkspaceId, user_id: UserId) {
        self.members.lock().unwrap().insert((workspace_id, user_id));
    }
}

#[async_trait]
impl ApiTokenRepository for MockApiTokenRepository {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserId>, InfraError> {
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }

    async fn is_workspace_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<bool, InfraError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .contains(&(workspace_id.clone(), user_id.clone())))
    }
}

// ===== MockDatabaseProbe =====

#[derive(Clone, Copy)]
pub struct MockDatabaseProbe {
    healthy: bool,
}

impl MockDatabaseProbe {
    pub fn healthy() -> Self {
        Self { healthy: true }
    }

    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl DatabaseProbe for MockDatabaseProbe {
    async fn ping(&self) -> Result<(), InfraError> {
        if self.healthy {
            Ok(())
        } else {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }
}
