//! # 送信クォータ
//!
//! プロバイダが報告する送信枠と、キャンペーン配信がそれを超えるかの判定。
//!
//! SES の `GetAccount` は以下を返す:
//!
//! | 項目 | 意味 |
//! |------|------|
//! | `Max24HourSend` | 24 時間あたりの送信上限（`-1` は無制限） |
//! | `SentLast24Hours` | 直近 24 時間の送信数 |
//! | `MaxSendRate` | 1 秒あたりの送信上限 |
//!
//! 判定は「必要件数 > 残り枠」で、残り枠ちょうどは超過とみなさない。

use std::time::Duration;

use thiserror::Error;

/// プロバイダから取得した送信クォータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendQuota {
    pub max_24_hour_send:   f64,
    pub max_send_rate:      f64,
    pub sent_last_24_hours: f64,
}

impl SendQuota {
    /// 上限なし（`Max24HourSend = -1`）か
    pub fn is_unlimited(&self) -> bool {
        self.max_24_hour_send < 0.0
    }

    /// 残り送信可能数（無制限なら `None`）
    pub fn remaining(&self) -> Option<u64> {
        if self.is_unlimited() {
            return None;
        }
        let remaining = (self.max_24_hour_send - self.sent_last_24_hours).floor();
        if remaining <= 0.0 {
            return Some(0);
        }
        Some(remaining as u64)
    }

    /// `required` 件の送信が残り枠を超えるか
    pub fn would_exceed(&self, required: u64) -> bool {
        match self.remaining() {
            Some(remaining) => required > remaining,
            None => false,
        }
    }
}

/// クォータ照会の失敗
///
/// 判定不能な状態で配信を進めないよう、呼び出し側はこれを「超過なし」と
/// 読み替えてはならない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// プロバイダ API 呼び出しの失敗（ネットワーク・認証など）
    #[error("クォータの取得に失敗しました: {0}")]
    ProviderFailed(String),

    /// 所定時間内に応答がなかった
    #[error("クォータの取得がタイムアウトしました（{}ms）", .0.as_millis())]
    Timeout(Duration),

    /// メールサービスの認証情報が不正
    #[error("メールサービスの認証情報が不正です: {0}")]
    InvalidCredentials(String),
}
