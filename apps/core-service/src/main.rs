//! # Core Service サーバー
//!
//! キャンペーン配信 API を提供するサービス。
//!
//! ## 役割
//!
//! - **キャンペーン配信**: DRAFT のキャンペーンを送信クォータ内で QUEUED に遷移させ、送信ジョブを登録
//! - **キャンペーン参照**: ワークスペース内のキャンペーン一覧・詳細
//! - **キャンペーン管理**: 複製、DRAFT の削除
//! - **ヘルスチェック**: Liveness / Readiness
//!
//! 実際のメール送信は `campaign_send_jobs` を取り出す外部ワーカーが行う。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CORE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CORE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DATABASE_MAX_CONNECTIONS` | No | 接続プールの最大接続数（デフォルト: `10`） |
//! | `RUN_MIGRATIONS` | No | 起動時にマイグレーションを適用するか（デフォルト: `true`） |
//! | `QUOTA_CHECK_TIMEOUT_MS` | No | 送信クォータ照会のタイムアウト（デフォルト: `5000`） |
//! | `SES_ENDPOINT_URL` | No | SES エンドポイント（LocalStack 使用時） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p sendportal-core-service
//!
//! # 本番環境
//! CORE_PORT=3001 DATABASE_URL=postgres://... LOG_FORMAT=json cargo run -p sendportal-core-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use sendportal_core_service::{
   app_builder::build_app,
   config::CoreConfig,
   handler::{CampaignState, ReadinessState},
   middleware::AuthState,
   usecase::{CampaignDispatchUseCaseImpl, CampaignManageUseCaseImpl, CampaignQueryUseCaseImpl},
};
use sendportal_domain::clock::{Clock, SystemClock};
use sendportal_infra::{
   db::{self, PgDatabaseProbe, PgTransactionManager, TransactionManager},
   quota::{DefaultQuotaResolver, ProviderQuotaChecker, SesClientOptions},
   repository::{
      CampaignRepository,
      PostgresApiTokenRepository,
      PostgresCampaignRepository,
      PostgresEmailServiceRepository,
      PostgresRecipientCounter,
      PostgresSendJobQueue,
   },
};
use sendportal_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Core Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   init_tracing(TracingConfig::from_env());

   let config = CoreConfig::from_env()?;

   tracing::info!(
      "Core Service サーバーを起動します: {}:{}",
      config.host,
      config.port
   );

   // データベース接続プールを作成
   let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
   tracing::info!("データベースに接続しました");

   if config.run_migrations {
      db::run_migrations(&pool).await?;
      tracing::info!("マイグレーションを適用しました");
   }

   // 送信クォータ照会（SES の認証情報はメールサービスごとに settings から取得する）
   let quota_checker = ProviderQuotaChecker::new(
      DefaultQuotaResolver::new(SesClientOptions {
         endpoint_url: config.ses_endpoint_url.clone(),
      }),
      config.quota_check_timeout,
   );

   // キャンペーン関連の依存コンポーネント
   let campaign_repo: Arc<dyn CampaignRepository> =
      Arc::new(PostgresCampaignRepository::new(pool.clone()));
   let tx_manager: Arc<dyn TransactionManager> = Arc::new(PgTransactionManager::new(pool.clone()));
   let clock: Arc<dyn Clock> = Arc::new(SystemClock);
   let dispatch = CampaignDispatchUseCaseImpl::new(
      Arc::clone(&campaign_repo),
      Arc::new(PostgresEmailServiceRepository::new(pool.clone())),
      Arc::new(PostgresRecipientCounter::new(pool.clone())),
      Arc::new(PostgresSendJobQueue::new()),
      Arc::new(quota_checker),
      Arc::clone(&tx_manager),
      Arc::clone(&clock),
   );
   let manage = CampaignManageUseCaseImpl::new(Arc::clone(&campaign_repo), tx_manager, clock);
   let query = CampaignQueryUseCaseImpl::new(campaign_repo);
   let campaign_state = Arc::new(CampaignState {
      dispatch,
      query,
      manage,
   });

   let auth_state = AuthState {
      api_tokens: Arc::new(PostgresApiTokenRepository::new(pool.clone())),
   };
   let readiness_state = Arc::new(ReadinessState {
      database: Arc::new(PgDatabaseProbe::new(pool)),
   });

   let app = build_app(campaign_state, auth_state, readiness_state);

   // サーバー起動
   let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("Core Service サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
