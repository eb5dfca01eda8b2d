//! # 送信クォータ照会
//!
//! メールサービス種別ごとのクォータ取得と、配信可否の判定を提供する。
//!
//! ## 構成
//!
//! ```text
//! QuotaChecker (配信ユースケースが依存する窓口)
//!   └─ ProviderQuotaChecker ── タイムアウト付きで実行
//!        └─ QuotaResolver ── 種別 → QuotaAware の対応付け
//!             ├─ SesQuota        (SES: GetAccount)
//!             └─ UnlimitedQuota  (SES 以外: 常に制限なし)
//! ```
//!
//! 種別による分岐は [`DefaultQuotaResolver`] の 1 か所に閉じ込める。
//! 認証情報はメールサービスの `settings` から、エンドポイントなどは
//! [`SesClientOptions`] から明示的に渡し、プロセス全体の環境には依存しない。

pub mod ses;
pub mod unlimited;

use std::time::Duration;

use async_trait::async_trait;
use sendportal_domain::{
    email_service::{EmailService, EmailServiceType},
    quota::{QuotaError, SendQuota},
};

pub use self::{
    ses::{SesClientOptions, SesQuota},
    unlimited::UnlimitedQuota,
};

/// プロバイダ種別ごとのクォータ取得能力
#[async_trait]
pub trait QuotaAware: Send + Sync {
    /// 現在のクォータ。クォータの概念がなければ `None`。
    async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError>;

    /// `required` 件の送信がクォータを超えるか
    async fn exceeds_quota(&self, required: u64) -> Result<bool, QuotaError> {
        Ok(self
            .current_quota()
            .await?
            .is_some_and(|quota| quota.would_exceed(required)))
    }
}

/// メールサービスから [`QuotaAware`] 実装を選ぶ
#[async_trait]
pub trait QuotaResolver: Send + Sync {
    async fn resolve(
        &self,
        email_service: &EmailService,
    ) -> Result<Box<dyn QuotaAware>, QuotaError>;
}

/// 標準の種別対応
///
/// SES のみ実際にクォータを照会し、それ以外は [`UnlimitedQuota`]。
#[derive(Debug, Clone, Default)]
pub struct DefaultQuotaResolver {
    ses_options: SesClientOptions,
}

impl DefaultQuotaResolver {
    pub fn new(ses_options: SesClientOptions) -> Self {
        Self { ses_options }
    }
}

#[async_trait]
impl QuotaResolver for DefaultQuotaResolver {
    async fn resolve(
        &self,
        email_service: &EmailService,
    ) -> Result<Box<dyn QuotaAware>, QuotaError> {
        match email_service.service_type() {
            EmailServiceType::Ses => {
                let credentials = email_service
                    .ses_credentials()
                    .map_err(|e| QuotaError::InvalidCredentials(e.to_string()))?;
                let quota = SesQuota::from_credentials(&credentials, &self.ses_options);
                Ok(Box::new(quota))
            }
            other => {
                debug_assert!(!other.enforces_quota());
                Ok(Box::new(UnlimitedQuota))
            }
        }
    }
}

/// 配信ユースケースから見たクォータ判定の窓口
///
/// テストでは [`crate::mock::StubQuotaChecker`] に差し替える。
#[async_trait]
pub trait QuotaChecker: Send + Sync {
    /// `required` 件の送信が `email_service` のクォータを超えるか
    ///
    /// 照会できなかった場合は `Err` を返し、`false` には読み替えない。
    async fn exceeds_quota(
        &self,
        email_service: &EmailService,
        required: u64,
    ) -> Result<bool, QuotaError>;
}

/// プロバイダに問い合わせる QuotaChecker
///
/// 照会全体（クライアント構築 + API 呼び出し）に `timeout` を設ける。
pub struct ProviderQuotaChecker<R> {
    resolver: R,
    timeout:  Duration,
}

impl<R: QuotaResolver> ProviderQuotaChecker<R> {
    pub fn new(resolver: R, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }
}

#[async_trait]
impl<R: QuotaResolver> QuotaChecker for ProviderQuotaChecker<R> {
    #[tracing::instrument(
        skip_all,
        fields(email_service_id = %email_service.id(), service_type = %email_service.service_type(), required)
    )]
    async fn exceeds_quota(
        &self,
        email_service: &EmailService,
        required: u64,
    ) -> Result<bool, QuotaError> {
        let check = async {
            let quota_aware = self.resolver.resolve(email_service).await?;
            quota_aware.exceeds_quota(required).await
        };

        let result = match tokio::time::timeout(self.timeout, check).await {
            Ok(result) => result,
            Err(_) => Err(QuotaError::Timeout(self.timeout)),
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, "送信クォータの照会に失敗しました");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sendportal_domain::{email_service::EmailServiceId, workspace::WorkspaceId};
    use serde_json::json;

    use super::*;

    /// 固定のクォータを返す
    struct FixedQuota(Option<SendQuota>);

    #[async_trait]
    impl QuotaAware for FixedQuota {
        async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
            Ok(self.0)
        }
    }

    /// 応答しないプロバイダ
    struct HangingQuota;

    #[async_trait]
    impl QuotaAware for HangingQuota {
        async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    struct FailingQuota;

    #[async_trait]
    impl QuotaAware for FailingQuota {
        async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
            Err(QuotaError::ProviderFailed("AccessDenied".to_string()))
        }
    }

    enum Provider {
        Fixed(Option<SendQuota>),
        Hanging,
        Failing,
    }

    struct TestResolver(Provider);

    #[async_trait]
    impl QuotaResolver for TestResolver {
        async fn resolve(&self, _: &EmailService) -> Result<Box<dyn QuotaAware>, QuotaError> {
            let quota_aware: Box<dyn QuotaAware> = match &self.0 {
                Provider::Fixed(quota) => Box::new(FixedQuota(*quota)),
                Provider::Hanging => Box::new(HangingQuota),
                Provider::Failing => Box::new(FailingQuota),
            };
            Ok(quota_aware)
        }
    }

    fn ses_service(settings: serde_json::Value) -> EmailService {
        EmailService::new(
            EmailServiceId::new(),
            WorkspaceId::new(),
            "SES",
            EmailServiceType::Ses,
            settings,
        )
    }

    fn quota(max: f64, sent: f64) -> SendQuota {
        SendQuota {
            max_24_hour_send:   max,
            max_send_rate:      14.0,
            sent_last_24_hours: sent,
        }
    }

    fn checker(provider: Provider) -> ProviderQuotaChecker<TestResolver> {
        ProviderQuotaChecker::new(TestResolver(provider), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_残り枠を超えるとtrue() {
        let sut = checker(Provider::Fixed(Some(quota(200.0, 150.0))));

        let result = sut.exceeds_quota(&ses_service(json!({})), 51).await;

        assert_eq!(result, Ok(true));
    }

    #[tokio::test]
    async fn test_残り枠ちょうどはfalse() {
        let sut = checker(Provider::Fixed(Some(quota(200.0, 150.0))));

        let result = sut.exceeds_quota(&ses_service(json!({})), 50).await;

        assert_eq!(result, Ok(false));
    }

    #[tokio::test]
    async fn test_クォータなしのプロバイダは常にfalse() {
        let sut = checker(Provider::Fixed(None));

        let result = sut.exceeds_quota(&ses_service(json!({})), u64::MAX).await;

        assert_eq!(result, Ok(false));
    }

    #[tokio::test]
    async fn test_応答しないプロバイダはタイムアウトエラー() {
        let sut = checker(Provider::Hanging);

        let result = sut.exceeds_quota(&ses_service(json!({})), 1).await;

        assert_eq!(result, Err(QuotaError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn test_プロバイダの失敗はfalseに読み替えない() {
        let sut = checker(Provider::Failing);

        let result = sut.exceeds_quota(&ses_service(json!({})), 1).await;

        assert!(matches!(result, Err(QuotaError::ProviderFailed(_))));
    }

    #[tokio::test]
    async fn test_ses以外はunlimitedに解決される() {
        let resolver = DefaultQuotaResolver::default();
        let smtp = EmailService::new(
            EmailServiceId::new(),
            WorkspaceId::new(),
            "Mailpit",
            EmailServiceType::Smtp,
            json!({}),
        );

        let quota_aware = resolver.resolve(&smtp).await.unwrap();

        assert_eq!(quota_aware.current_quota().await, Ok(None));
    }

    #[tokio::test]
    async fn test_認証情報が欠けたsesはinvalid_credentials() {
        let resolver = DefaultQuotaResolver::default();

        let result = resolver.resolve(&ses_service(json!({"key": "AKIA"}))).await;

        assert!(matches!(result, Err(QuotaError::InvalidCredentials(_))));
    }
}
