//! # SendPortal ドメイン層
//!
//! キャンペーン配信のビジネスルールを担うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: キャンペーン、メールサービス、ワークスペース
//! - **値オブジェクト**: 各種 ID、キャンペーン名、送信クォータ
//! - **状態遷移**: キャンペーンステータスは前進のみ（DRAFT → QUEUED → SENDING → SENT）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層は DB や外部 API（SES など）に一切依存しない。
//! クォータの取得はインフラ層の責務で、ここでは判定ロジックのみを持つ。
//!
//! ## モジュール構成
//!
//! - [`campaign`] - キャンペーンとステータス遷移
//! - [`email_service`] - 送信プロバイダ設定
//! - [`quota`] - 送信クォータと判定
//! - [`send_job`] - 非同期送信ジョブ
//! - [`workspace`] - テナント境界
//!
//! ## 使用例
//!
//! ```rust
//! use sendportal_domain::{DomainError, workspace::WorkspaceId};
//!
//! let workspace_id = WorkspaceId::new();
//!
//! let error = DomainError::NotFound {
//!     entity_type: "Campaign",
//!     id:          workspace_id.to_string(),
//! };
//! assert!(error.to_string().contains("Campaign"));
//! ```

#[macro_use]
mod macros;

pub mod campaign;
pub mod clock;
pub mod email_service;
pub mod error;
pub mod quota;
pub mod send_job;
pub mod user;
pub mod workspace;

pub use error::DomainError;
