//! # ミドルウェア
//!
//! Core Service 用のミドルウェアを提供する。

mod api_token;

pub use api_token::{AuthState, AuthenticatedUser, require_api_token};
