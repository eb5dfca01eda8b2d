//! # Core Service エラー定義
//!
//! Core Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス | 本文 |
//! |------------|-----------|------|
//! | `NotFound` | 404 | `message` |
//! | `Unauthenticated` | 401 | `message` |
//! | `Forbidden` | 403 | `message` |
//! | `Validation` | 422 | `message` + `errors.<field>` |
//! | `Unprocessable` | 422 | `message` |
//! | `QuotaCheckFailed` | 503 | `message` |
//! | `Database` / `Internal` | 500 | 固定 `message` |

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use sendportal_shared::ErrorResponse;
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
   /// リソースが見つからない
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// API トークンがない、または無効
   #[error("認証されていません")]
   Unauthenticated,

   /// 権限不足
   #[error("権限がありません: {0}")]
   Forbidden(String),

   /// フィールド単位のバリデーションエラー
   #[error("バリデーションエラー: {field}: {message}")]
   Validation {
      field:   &'static str,
      message: String,
   },

   /// 処理できないリクエスト（フィールドに紐づかない）
   #[error("処理できません: {0}")]
   Unprocessable(String),

   /// 送信クォータを照会できなかった
   #[error("送信クォータの照会に失敗しました: {0}")]
   QuotaCheckFailed(String),

   /// データベースエラー
   #[error("データベースエラー: {0}")]
   Database(#[from] sendportal_infra::InfraError),

   /// 内部エラー
   #[error("内部エラー: {0}")]
   Internal(String),
}

impl IntoResponse for CoreError {
   fn into_response(self) -> Response {
      let (status, body) = match self {
         CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
         CoreError::Unauthenticated => (StatusCode::UNAUTHORIZED, ErrorResponse::unauthenticated()),
         CoreError::Forbidden(msg) => {
            tracing::debug!("アクセス拒否: {}", msg);
            (StatusCode::FORBIDDEN, ErrorResponse::forbidden())
         }
         CoreError::Validation { field, message } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::validation(field, message),
         ),
         CoreError::Unprocessable(msg) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorResponse::new(msg))
         }
         CoreError::QuotaCheckFailed(msg) => {
            tracing::error!("送信クォータの照会に失敗しました: {}", msg);
            (
               StatusCode::SERVICE_UNAVAILABLE,
               ErrorResponse::service_unavailable(
                  "The sending quota could not be checked. Please try again later.",
               ),
            )
         }
         CoreError::Database(e) => {
            tracing::error!(span_trace = %e.span_trace(), "データベースエラー: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
         }
         CoreError::Internal(msg) => {
            tracing::error!("内部エラー: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
         }
      };

      (status, Json(body)).into_response()
   }
}
