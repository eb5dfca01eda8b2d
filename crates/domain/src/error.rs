//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 422 Unprocessable Entity | 入力値・状態の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//! | `Conflict` | 409 / 422 | 条件付き更新の失敗 |
//! | `Forbidden` | 403 Forbidden | ワークスペース外へのアクセス |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値や現在の状態がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Campaign", "EmailService" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    ///
    /// 同時更新により前提とした状態が失われた場合に使用する。
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// 権限エラー
    ///
    /// 認証済みだが対象ワークスペースへの権限がない場合に使用する。
    #[error("権限がありません: {0}")]
    Forbidden(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_foundのメッセージにエンティティ種別とidが含まれる() {
        let err = DomainError::NotFound {
            entity_type: "Campaign",
            id:          "c-1".to_string(),
        };

        assert_eq!(err.to_string(), "Campaign が見つかりません: c-1");
    }

    #[test]
    fn test_validationのメッセージに詳細が含まれる() {
        let err = DomainError::Validation("キャンペーン名は必須です".to_string());

        assert_eq!(
            err.to_string(),
            "バリデーションエラー: キャンペーン名は必須です"
        );
    }
}
