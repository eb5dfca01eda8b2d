//! # ハンドラ層
//!
//! HTTP リクエストを受け取り、ユースケースを呼び出してレスポンスを返す。
//!
//! - [`campaign`]: キャンペーンの参照・配信・複製・削除（`/api/{workspace_id}/campaigns/...`）
//! - [`health`]: ヘルスチェック（`/health`, `/health/ready`）

pub mod campaign;
pub mod health;

pub use campaign::{
    CampaignDto,
    CampaignState,
    delete_campaign,
    dispatch_campaign,
    duplicate_campaign,
    get_campaign,
    list_campaigns,
};
pub use health::{ReadinessState, health_check, readiness_check};
