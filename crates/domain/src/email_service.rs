//! # メールサービス
//!
//! ワークスペースに登録された送信プロバイダの設定。
//!
//! プロバイダ種別は数値 ID で永続化される（`email_service_types` テーブルと対応）。
//! 送信クォータを課すのは SES のみで、それ以外の種別はクォータ判定の対象外になる。
//!
//! ## 認証情報
//!
//! プロバイダごとの認証情報は `settings`（JSON）に格納される。
//! SES の場合は `key` / `secret` / `region` を持つ。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::IntoStaticStr;

use crate::{DomainError, workspace::WorkspaceId};

define_uuid_id! {
    /// メールサービス ID
    pub struct EmailServiceId;
}

/// メールサービス種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailServiceType {
    Ses,
    Sendgrid,
    Mailgun,
    Postmark,
    Mailjet,
    Smtp,
    Postal,
}

impl EmailServiceType {
    /// 永続化用の数値 ID
    pub fn id(self) -> i16 {
        match self {
            Self::Ses => 1,
            Self::Sendgrid => 2,
            Self::Mailgun => 3,
            Self::Postmark => 4,
            Self::Mailjet => 5,
            Self::Smtp => 6,
            Self::Postal => 7,
        }
    }

    /// プロバイダ側で送信クォータが課されるか
    pub fn enforces_quota(self) -> bool {
        matches!(self, Self::Ses)
    }
}

impl TryFrom<i16> for EmailServiceType {
    type Error = DomainError;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Ses),
            2 => Ok(Self::Sendgrid),
            3 => Ok(Self::Mailgun),
            4 => Ok(Self::Postmark),
            5 => Ok(Self::Mailjet),
            6 => Ok(Self::Smtp),
            7 => Ok(Self::Postal),
            _ => Err(DomainError::Validation(format!(
                "不正なメールサービス種別: {id}"
            ))),
        }
    }
}

/// SES の認証情報
///
/// `secret` はログに出さないよう Debug でマスクする。
#[derive(Clone, PartialEq, Eq)]
pub struct SesCredentials {
    pub key:    String,
    pub secret: String,
    pub region: String,
}

impl fmt::Debug for SesCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SesCredentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

/// メールサービス
///
/// `settings` には認証情報が含まれるため、Debug では中身を出さない。
#[derive(Clone, PartialEq)]
pub struct EmailService {
    id:           EmailServiceId,
    workspace_id: WorkspaceId,
    name:         String,
    service_type: EmailServiceType,
    settings:     JsonValue,
}

impl fmt::Debug for EmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailService")
            .field("id", &self.id)
            .field("workspace_id", &self.workspace_id)
            .field("name", &self.name)
            .field("service_type", &self.service_type)
            .field("settings", &"[REDACTED]")
            .finish()
    }
}

impl EmailService {
    pub fn new(
        id: EmailServiceId,
        workspace_id: WorkspaceId,
        name: impl Into<String>,
        service_type: EmailServiceType,
        settings: JsonValue,
    ) -> Self {
        Self {
            id,
            workspace_id,
            name: name.into(),
            service_type,
            settings,
        }
    }

    pub fn id(&self) -> &EmailServiceId {
        &self.id
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_type(&self) -> EmailServiceType {
        self.service_type
    }

    pub fn settings(&self) -> &JsonValue {
        &self.settings
    }

    /// `settings` から SES の認証情報を取り出す
    ///
    /// SES 以外の種別や、必須キーが欠けている場合は `Validation` を返す。
    pub fn ses_credentials(&self) -> Result<SesCredentials, DomainError> {
        if self.service_type != EmailServiceType::Ses {
            return Err(DomainError::Validation(format!(
                "SES 以外のメールサービスです: {}",
                self.service_type
            )));
        }

        let field = |name: &str| -> Result<String, DomainError> {
            self.settings
                .get(name)
                .and_then(JsonValue::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    DomainError::Validation(format!("SES の設定に {name} がありません"))
                })
        };

        Ok(SesCredentials {
            key:    field("key")?,
            secret: field("secret")?,
            region: field("region")?,
        })
    }
}
