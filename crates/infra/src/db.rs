//! # PostgreSQL データベース接続管理
//!
//! 接続プール、マイグレーション、トランザクション境界を提供する。
//!
//! ## トランザクション境界
//!
//! キャンペーン配信は「ステータスを QUEUED に更新」と「送信ジョブの登録」を
//! 同一トランザクションで確定させる必要がある。書き込み系リポジトリメソッドは
//! [`TxContext`] を必須引数に取り、トランザクション外の書き込みを型で禁止する。
//!
//! ```rust,ignore
//! let mut tx = tx_manager.begin().await?;
//! campaign_repo.update_status(&mut tx, &queued, CampaignStatus::Draft).await?;
//! send_queue.enqueue(&mut tx, &job).await?;
//! tx.commit().await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction, postgres::PgPoolOptions};

use crate::error::InfraError;

/// データベースマイグレーションを実行する
///
/// `migrations/` 配下の SQL を順に適用する。適用済みのものはスキップされる。
/// sqlx が advisory lock を取るため、複数プロセスから同時に呼んでも安全。
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、アプリケーション全体で共有する。
///
/// # 設定値
///
/// - `max_connections`: 最大接続数（`DATABASE_MAX_CONNECTIONS`）
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

// =============================================================================
// DatabaseProbe
// =============================================================================

/// Readiness Check 用の疎通確認
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), InfraError>;
}

/// `SELECT 1` で疎通を確認する PostgreSQL 実装
pub struct PgDatabaseProbe {
    pool: PgPool,
}

impl PgDatabaseProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseProbe for PgDatabaseProbe {
    async fn ping(&self) -> Result<(), InfraError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// TxContext
// =============================================================================

/// トランザクションコンテキスト
///
/// # ライフサイクル
///
/// 1. `TransactionManager::begin()` で作成
/// 2. 書き込みメソッドに `&mut TxContext` として渡す
/// 3. `commit()` でコミット、またはドロップでロールバック
pub struct TxContext(TxContextInner);

enum TxContextInner {
    Pg(Transaction<'static, Postgres>),
    #[cfg(any(test, feature = "test-utils"))]
    Mock(MockTx),
}

/// モックリポジトリ用のトランザクション
///
/// コミットされずにドロップされた場合、登録された取り消し処理を逆順に実行する。
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
struct MockTx {
    undo: Vec<Box<dyn FnOnce() + Send>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl Drop for MockTx {
    fn drop(&mut self) {
        while let Some(undo) = self.undo.pop() {
            undo();
        }
    }
}

impl TxContext {
    pub(crate) async fn begin_pg(pool: &PgPool) -> Result<Self, InfraError> {
        Ok(Self(TxContextInner::Pg(pool.begin().await?)))
    }

    /// テスト用のモック TxContext を作成する
    ///
    /// インメモリのモックリポジトリは `conn()` を使用しない。
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mock() -> Self {
        Self(TxContextInner::Mock(MockTx::default()))
    }

    /// ロールバック時の取り消し処理を登録する（モック専用）
    ///
    /// Postgres トランザクションでは何もしない。
    #[cfg(any(test, feature = "test-utils"))]
    pub fn on_rollback(&mut self, undo: impl FnOnce() + Send + 'static) {
        if let TxContextInner::Mock(tx) = &mut self.0 {
            tx.undo.push(Box::new(undo));
        }
    }

    /// トランザクションをコミットする
    ///
    /// 呼ばずにドロップすると、sqlx が自動的にロールバックする。
    pub async fn commit(self) -> Result<(), InfraError> {
        match self.0 {
            TxContextInner::Pg(tx) => {
                tx.commit().await?;
                Ok(())
            }
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock(mut tx) => {
                tx.undo.clear();
                Ok(())
            }
        }
    }

    /// トランザクション内の DB コネクションを取得する
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        match &mut self.0 {
            TxContextInner::Pg(tx) => tx,
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock(_) => {
                panic!("BUG: conn() called on Mock TxContext. Mock repos should not call conn().")
            }
        }
    }
}

// =============================================================================
// TransactionManager
// =============================================================================

/// トランザクション管理 trait
///
/// ユースケース層は PgPool に直接依存せず、この trait 経由で
/// トランザクションを開始する。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<TxContext, InfraError>;
}

/// Postgres 用 TransactionManager 実装
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        TxContext::begin_pg(&self.pool).await
    }
}
