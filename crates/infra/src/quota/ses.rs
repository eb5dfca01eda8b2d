//! SES 送信クォータ照会
//!
//! AWS SES v2 の `GetAccount` で 24 時間あたりの送信上限と送信済み件数を取得する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
};
use sendportal_domain::{
    email_service::SesCredentials,
    quota::{QuotaError, SendQuota},
};

use super::QuotaAware;

/// SES クライアント構築時の追加設定
///
/// 認証情報はメールサービスごとに異なるため含めない。
#[derive(Debug, Clone, Default)]
pub struct SesClientOptions {
    /// エンドポイント URL（LocalStack 使用時に設定、未設定で AWS デフォルト）
    pub endpoint_url: Option<String>,
}

/// SES のクォータ照会
///
/// `aws_sdk_sesv2::Client` をラップする。
pub struct SesQuota {
    client: Client,
}

impl SesQuota {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// メールサービスの認証情報からクライアントを構築する
    ///
    /// 設定はすべて引数から組み立てる。環境変数・プロファイル・デフォルト認証チェーンは読まない。
    pub fn from_credentials(credentials: &SesCredentials, options: &SesClientOptions) -> Self {
        let mut builder = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(Credentials::new(
                credentials.key.clone(),
                credentials.secret.clone(),
                None,
                None,
                "sendportal-email-service",
            ));

        if let Some(endpoint_url) = &options.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl QuotaAware for SesQuota {
    async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
        let output = self.client.get_account().send().await.map_err(|e| {
            QuotaError::ProviderFailed(format!("SES GetAccount 失敗: {}", DisplayErrorContext(&e)))
        })?;

        let quota = output.send_quota().ok_or_else(|| {
            QuotaError::ProviderFailed("SES がクォータを返しませんでした".to_string())
        })?;

        Ok(Some(SendQuota {
            max_24_hour_send:   quota.max24_hour_send(),
            max_send_rate:      quota.max_send_rate(),
            sent_last_24_hours: quota.sent_last24_hours(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesQuota>();
    }

    #[test]
    fn test_認証情報とオプションだけでクライアントを構築する() {
        let credentials = SesCredentials {
            key:    "AKIAEXAMPLE".to_string(),
            secret: "secret".to_string(),
            region: "eu-west-1".to_string(),
        };
        let options = SesClientOptions {
            endpoint_url: Some("http://localhost:4566".to_string()),
        };

        let sut = SesQuota::from_credentials(&credentials, &options);

        let config = sut.client.config();
        let region = config.region().map(ToString::to_string);
        assert_eq!(region.as_deref(), Some("eu-west-1"));
        assert!(config.credentials_provider().is_some());
    }
}
