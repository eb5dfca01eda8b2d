//! # EmailServiceRepository
//!
//! ワークスペースに登録されたメールサービス設定の読み取り。

use async_trait::async_trait;
use sendportal_domain::{
    email_service::{EmailService, EmailServiceId, EmailServiceType},
    workspace::WorkspaceId,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// メールサービスリポジトリトレイト
#[async_trait]
pub trait EmailServiceRepository: Send + Sync {
    /// ワークスペース内のメールサービスを ID で取得する
    async fn find_by_id(
        &self,
        id: &EmailServiceId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<EmailService>, InfraError>;
}

/// PostgreSQL 実装の EmailServiceRepository
#[derive(Debug, Clone)]
pub struct PostgresEmailServiceRepository {
    pool: PgPool,
}

impl PostgresEmailServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EmailServiceRow {
    id:           Uuid,
    workspace_id: Uuid,
    name:         String,
    type_id:      i16,
    settings:     JsonValue,
}

#[async_trait]
impl EmailServiceRepository for PostgresEmailServiceRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id, %workspace_id))]
    async fn find_by_id(
        &self,
        id: &EmailServiceId,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<EmailService>, InfraError> {
        let row: Option<EmailServiceRow> = sqlx::query_as(
            r#"
            SELECT id, workspace_id, name, type_id, settings
            FROM email_services
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(workspace_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(EmailService::new(
            EmailServiceId::from_uuid(row.id),
            WorkspaceId::from_uuid(row.workspace_id),
            row.name,
            EmailServiceType::try_from(row.type_id)?,
            row.settings,
        )))
    }
}
