//! クォータを課さないプロバイダ用の実装
//!
//! SMTP・Postmark などはプロバイダ側の送信上限を照会できないため、常に制限なしとする。

use async_trait::async_trait;
use sendportal_domain::quota::{QuotaError, SendQuota};

use super::QuotaAware;

/// 常に「クォータなし」を返す
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedQuota;

#[async_trait]
impl QuotaAware for UnlimitedQuota {
    async fn current_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
        Ok(None)
    }
}
