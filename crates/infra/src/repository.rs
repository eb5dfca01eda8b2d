//! # リポジトリ実装
//!
//! - **ワークスペース分離**: 取得系はすべて `workspace_id` を条件に含める
//! - **書き込みは TxContext 必須**: トランザクション外の書き込みを型で禁止する
//! - **テスタビリティ**: トレイト経由でモック可能（[`crate::mock`]）

pub mod api_token_repository;
pub mod campaign_repository;
pub mod email_service_repository;
pub mod recipient_repository;
pub mod send_job_repository;

pub use api_token_repository::{ApiTokenRepository, PostgresApiTokenRepository};
pub use campaign_repository::{CampaignRepository, PostgresCampaignRepository};
pub use email_service_repository::{EmailServiceRepository, PostgresEmailServiceRepository};
pub use recipient_repository::{PostgresRecipientCounter, RecipientCounter};
pub use send_job_repository::{PostgresSendJobQueue, SendJobQueue};
