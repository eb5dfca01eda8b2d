//! # キャンペーン
//!
//! 1 回分の一斉配信の定義と、そのライフサイクル。
//!
//! ## ステータス遷移
//!
//! ```text
//! DRAFT(1) → QUEUED(2) → SENDING(3) → SENT(4)
//! ```
//!
//! 遷移は前進のみで、後退や飛び越しは許可しない。
//! 配信（dispatch）が行うのは DRAFT → QUEUED のみで、以降は送信ワーカーが進める。
//!
//! 数値 ID は API の `status_id` としてそのまま公開される。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, email_service::EmailServiceId, workspace::WorkspaceId};

define_uuid_id! {
    /// キャンペーン ID
    pub struct CampaignId;
}

define_validated_string! {
    /// キャンペーン名
    pub struct CampaignName {
        label: "キャンペーン名",
        max_length: 255,
    }
}

/// キャンペーンステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Queued,
    Sending,
    Sent,
}

impl CampaignStatus {
    /// API・DB で使う数値 ID
    pub fn id(self) -> i16 {
        match self {
            Self::Draft => 1,
            Self::Queued => 2,
            Self::Sending => 3,
            Self::Sent => 4,
        }
    }

    /// 文字列表現（`"draft"` など）
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// 直後のステータス。SENT は終端なので `None`。
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Queued),
            Self::Queued => Some(Self::Sending),
            Self::Sending => Some(Self::Sent),
            Self::Sent => None,
        }
    }
}

impl TryFrom<i16> for CampaignStatus {
    type Error = DomainError;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Draft),
            2 => Ok(Self::Queued),
            3 => Ok(Self::Sending),
            4 => Ok(Self::Sent),
            _ => Err(DomainError::Validation(format!(
                "不正なキャンペーンステータス: {id}"
            ))),
        }
    }
}

/// キャンペーンエンティティ
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    id:               CampaignId,
    workspace_id:     WorkspaceId,
    email_service_id: EmailServiceId,
    name:             CampaignName,
    status:           CampaignStatus,
    send_to_all:      bool,
    sent_count:       i64,
    open_count:       i64,
    click_count:      i64,
    created_at:       DateTime<Utc>,
    updated_at:       DateTime<Utc>,
}

/// 新規キャンペーンのパラメータ
pub struct NewCampaign {
    pub id:               CampaignId,
    pub workspace_id:     WorkspaceId,
    pub email_service_id: EmailServiceId,
    pub name:             CampaignName,
    pub send_to_all:      bool,
    pub now:              DateTime<Utc>,
}

/// DB から復元する際のレコード
pub struct CampaignRecord {
    pub id:               CampaignId,
    pub workspace_id:     WorkspaceId,
    pub email_service_id: EmailServiceId,
    pub name:             CampaignName,
    pub status:           CampaignStatus,
    pub send_to_all:      bool,
    pub sent_count:       i64,
    pub open_count:       i64,
    pub click_count:      i64,
    pub created_at:       DateTime<Utc>,
    pub updated_at:       DateTime<Utc>,
}

impl Campaign {
    /// 下書き状態のキャンペーンを作成する
    pub fn new(params: NewCampaign) -> Self {
        Self {
            id:               params.id,
            workspace_id:     params.workspace_id,
            email_service_id: params.email_service_id,
            name:             params.name,
            status:           CampaignStatus::Draft,
            send_to_all:      params.send_to_all,
            sent_count:       0,
            open_count:       0,
            click_count:      0,
            created_at:       params.now,
            updated_at:       params.now,
        }
    }

    /// DB レコードから復元する
    pub fn from_db(record: CampaignRecord) -> Result<Self, DomainError> {
        if record.sent_count < 0 || record.open_count < 0 || record.click_count < 0 {
            return Err(DomainError::Validation(format!(
                "キャンペーンの集計値が負数です: {}",
                record.id
            )));
        }

        Ok(Self {
            id:               record.id,
            workspace_id:     record.workspace_id,
            email_service_id: record.email_service_id,
            name:             record.name,
            status:           record.status,
            send_to_all:      record.send_to_all,
            sent_count:       record.sent_count,
            open_count:       record.open_count,
            click_count:      record.click_count,
            created_at:       record.created_at,
            updated_at:       record.updated_at,
        })
    }

    // Getter メソッド

    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    pub fn email_service_id(&self) -> &EmailServiceId {
        &self.email_service_id
    }

    pub fn name(&self) -> &CampaignName {
        &self.name
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn send_to_all(&self) -> bool {
        self.send_to_all
    }

    pub fn sent_count(&self) -> i64 {
        self.sent_count
    }

    pub fn open_count(&self) -> i64 {
        self.open_count
    }

    pub fn click_count(&self) -> i64 {
        self.click_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_draft(&self) -> bool {
        self.status == CampaignStatus::Draft
    }

    /// 開封率（送信 0 件なら 0.0）
    pub fn open_ratio(&self) -> f64 {
        ratio(self.open_count, self.sent_count)
    }

    /// クリック率（送信 0 件なら 0.0）
    pub fn click_ratio(&self) -> f64 {
        ratio(self.click_count, self.sent_count)
    }

    /// 同じ設定の下書きを新しい ID で作る
    ///
    /// ステータスは DRAFT、集計値は 0 に戻る。元のステータスは問わない。
    pub fn duplicated(&self, id: CampaignId, now: DateTime<Utc>) -> Self {
        Self::new(NewCampaign {
            id,
            workspace_id: self.workspace_id.clone(),
            email_service_id: self.email_service_id.clone(),
            name: self.name.clone(),
            send_to_all: self.send_to_all,
            now,
        })
    }

    // 状態遷移メソッド

    /// 配信キューに投入した新しいキャンペーンを返す
    ///
    /// DRAFT からのみ遷移可能。
    pub fn queued(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.advance(CampaignStatus::Queued, now)
    }

    /// 送信ワーカーが送信を開始した新しいキャンペーンを返す
    pub fn sending(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.advance(CampaignStatus::Sending, now)
    }

    /// 送信完了した新しいキャンペーンを返す
    pub fn sent(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.advance(CampaignStatus::Sent, now)
    }

    fn advance(self, to: CampaignStatus, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.status.next() != Some(to) {
            return Err(DomainError::Validation(format!(
                "{} から {} へは遷移できません",
                self.status, to
            )));
        }

        Ok(Self {
            status: to,
            updated_at: now,
            ..self
        })
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
