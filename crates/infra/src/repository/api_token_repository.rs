//! # ApiTokenRepository
//!
//! API トークンからユーザーを特定し、ワークスペースへの所属を確認する。

use async_trait::async_trait;
use sendportal_domain::{user::UserId, workspace::WorkspaceId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// API トークン認証の照会
#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    /// トークンの持ち主を返す。未登録なら `None`。
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserId>, InfraError>;

    /// ユーザーがワークスペースのメンバーか
    async fn is_workspace_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の ApiTokenRepository
#[derive(Debug, Clone)]
pub struct PostgresApiTokenRepository {
    pool: PgPool,
}

impl PostgresApiTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiTokenRepository for PostgresApiTokenRepository {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserId>, InfraError> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE api_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(UserId::from_uuid))
    }

    async fn is_workspace_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<bool, InfraError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM workspace_users
                WHERE workspace_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
