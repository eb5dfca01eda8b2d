//! # Core Service 設定
//!
//! 環境変数から Core Service サーバーの設定を読み込む。

use std::{env, time::Duration};

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Core Service サーバーの設定
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 接続プールの最大接続数
    pub database_max_connections: u32,
    /// 起動時にマイグレーションを適用するか
    pub run_migrations: bool,
    /// プロバイダへのクォータ照会のタイムアウト
    pub quota_check_timeout: Duration,
    /// SES エンドポイント URL（LocalStack 使用時に設定、未設定で AWS デフォルト）
    pub ses_endpoint_url: Option<String>,
}

impl CoreConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセスの環境変数を書き換えずに済むよう分離している。
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            host: lookup("CORE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse("CORE_PORT", required("CORE_PORT")?)?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .map_or(Ok(10), |v| parse("DATABASE_MAX_CONNECTIONS", v))?,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map_or(Ok(true), |v| parse("RUN_MIGRATIONS", v))?,
            quota_check_timeout: Duration::from_millis(
                lookup("QUOTA_CHECK_TIMEOUT_MS")
                    .map_or(Ok(5000), |v| parse("QUOTA_CHECK_TIMEOUT_MS", v))?,
            ),
            ses_endpoint_url: lookup("SES_ENDPOINT_URL").filter(|v| !v.is_empty()),
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_必須項目のみでデフォルト値が入る() {
        let config = load(&[("CORE_PORT", "13001"), ("DATABASE_URL", "postgres://localhost/sp")])
            .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 13001);
        assert_eq!(config.database_max_connections, 10);
        assert!(config.run_migrations);
        assert_eq!(config.quota_check_timeout, Duration::from_secs(5));
        assert_eq!(config.ses_endpoint_url, None);
    }

    #[test]
    fn test_任意項目を上書きできる() {
        let config = load(&[
            ("CORE_PORT", "13001"),
            ("DATABASE_URL", "postgres://localhost/sp"),
            ("QUOTA_CHECK_TIMEOUT_MS", "250"),
            ("RUN_MIGRATIONS", "false"),
            ("SES_ENDPOINT_URL", "http://localhost:4566"),
        ])
        .unwrap();

        assert_eq!(config.quota_check_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);
        assert_eq!(config.ses_endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_database_urlがないとmissing() {
        let result = load(&[("CORE_PORT", "13001")]);

        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_不正なポート番号はinvalid() {
        let result = load(&[("CORE_PORT", "http"), ("DATABASE_URL", "postgres://x")]);

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                name:  "CORE_PORT",
                value: "http".to_string(),
            }
        );
    }
}
