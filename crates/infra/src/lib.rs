//! # SendPortal インフラ層
//!
//! 外部システム（PostgreSQL, AWS SES）との接続・通信を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: 接続プール、マイグレーション、トランザクション境界
//! - **リポジトリ実装**: キャンペーン・メールサービス・送信ジョブ・API トークン
//! - **クォータ照会**: プロバイダ種別ごとの送信クォータ取得
//!
//! ## 依存関係
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続管理と [`TxContext`](db::TxContext)
//! - [`error`] - インフラ層エラー定義
//! - [`quota`] - 送信クォータ照会
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod quota;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
