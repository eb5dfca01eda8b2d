//! # ユースケース層
//!
//! Core Service のビジネスロジックを実装する。
//!
//! - [`dispatch`]: キャンペーン配信（DRAFT → QUEUED + 送信ジョブ登録）
//! - [`campaign`]: キャンペーンの参照
//! - [`manage`]: キャンペーンの削除・複製

pub mod campaign;
pub mod dispatch;
mod helpers;
pub mod manage;

pub use campaign::{CampaignPage, CampaignQueryUseCaseImpl};
pub use dispatch::CampaignDispatchUseCaseImpl;
pub use manage::CampaignManageUseCaseImpl;
