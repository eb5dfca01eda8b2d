//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 形式
//!
//! ```json
//! {
//!   "message": "The given data was invalid.",
//!   "errors": { "status_id": ["..."] }
//! }
//! ```
//!
//! `errors` はフィールド単位のバリデーションエラーがある場合のみ出力する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub message: String,
   #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
   pub errors:  BTreeMap<String, Vec<String>>,
}

impl ErrorResponse {
   /// メッセージのみのエラー
   pub fn new(message: impl Into<String>) -> Self {
      Self {
         message: message.into(),
         errors:  BTreeMap::new(),
      }
   }

   /// 単一フィールドのバリデーションエラー
   ///
   /// `message` はトップレベルと `errors.<field>[0]` の両方に入る。
   pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
      let message = message.into();
      Self {
         errors: BTreeMap::from([(field.into(), vec![message.clone()])]),
         message,
      }
   }

   /// 401 Unauthenticated
   pub fn unauthenticated() -> Self {
      Self::new("Unauthenticated.")
   }

   /// 403 Forbidden
   pub fn forbidden() -> Self {
      Self::new("This action is unauthorized.")
   }

   /// 404 Not Found
   pub fn not_found(message: impl Into<String>) -> Self {
      Self::new(message)
   }

   /// 500 Internal Server Error
   ///
   /// メッセージは固定値（内部情報を漏らさないため）。
   pub fn internal_error() -> Self {
      Self::new("Server Error")
   }

   /// 503 Service Unavailable
   pub fn service_unavailable(message: impl Into<String>) -> Self {
      Self::new(message)
   }
}
