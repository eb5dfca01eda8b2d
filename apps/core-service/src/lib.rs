//! # Core Service ライブラリ
//!
//! Core Service の設定・ユースケース・ハンドラ・ルーター構築を公開する。
//! 統合テスト（`tests/`）はここからルーターを組み立てる。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
