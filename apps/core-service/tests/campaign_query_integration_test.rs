//! キャンペーン参照 API とヘルスチェックの統合テスト

mod helpers;

use axum::http::StatusCode;
use helpers::{MEMBER_TOKEN, TestApp, call};
use pretty_assertions::assert_eq;
use sendportal_infra::mock::MockDatabaseProbe;
use serde_json::json;

#[tokio::test]
async fn test_キャンペーン詳細を取得できる() {
   let app = TestApp::new();
   let campaign_id = app.add_draft_campaign("Newsletter", 3);
   let uri = format!("/api/{}/campaigns/{}", app.workspace_id, campaign_id);

   let (status, body) = call(app.router(), "GET", &uri, Some(MEMBER_TOKEN)).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["data"]["name"], json!("Newsletter"));
   assert_eq!(body["data"]["status_id"], json!(1));
   assert_eq!(body["data"]["status"], json!("draft"));
}

#[tokio::test]
async fn test_api_tokenクエリでも認証できる() {
   let app = TestApp::new();
   let campaign_id = app.add_draft_campaign("Newsletter", 3);
   let uri = format!(
      "/api/{}/campaigns/{}?api_token={MEMBER_TOKEN}",
      app.workspace_id, campaign_id
   );

   let (status, _) = call(app.router(), "GET", &uri, None).await;

   assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_一覧をカーソルでたどれる() {
   let app = TestApp::new();
   for name in ["First", "Second", "Third"] {
      app.add_draft_campaign(name, 1);
   }
   let base = format!("/api/{}/campaigns", app.workspace_id);

   let (status, page1) = call(app.router(), "GET", &format!("{base}?limit=2"), Some(MEMBER_TOKEN)).await;
   let cursor = page1["next_cursor"].as_str().unwrap().to_string();
   let (_, page2) = call(
      app.router(),
      "GET",
      &format!("{base}?limit=2&cursor={cursor}"),
      Some(MEMBER_TOKEN),
   )
   .await;

   assert_eq!(status, StatusCode::OK);
   let names = |page: &serde_json::Value| {
      page["data"]
         .as_array()
         .unwrap()
         .iter()
         .map(|c| c["name"].as_str().unwrap().to_string())
         .collect::<Vec<_>>()
   };
   assert_eq!(names(&page1), vec!["Third", "Second"]);
   assert_eq!(names(&page2), vec!["First"]);
   assert_eq!(page2["next_cursor"], json!(null));
}

#[tokio::test]
async fn test_不正なカーソルは422() {
   let app = TestApp::new();
   let uri = format!("/api/{}/campaigns?cursor=zzz", app.workspace_id);

   let (status, body) = call(app.router(), "GET", &uri, Some(MEMBER_TOKEN)).await;

   assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
   assert_eq!(body["errors"]["cursor"], json!(["The cursor is invalid."]));
}

#[tokio::test]
async fn test_ヘルスチェックは認証なしで200() {
   let app = TestApp::new();

   let (status, body) = call(app.router(), "GET", "/health", None).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn test_dbに接続できなければreadinessは503() {
   let app = TestApp::new().with_database(MockDatabaseProbe::unhealthy());

   let (status, body) = call(app.router(), "GET", "/health/ready", None).await;

   assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
   assert_eq!(body["status"], json!("not_ready"));
   assert_eq!(body["checks"]["database"], json!("error"));
}

#[tokio::test]
async fn test_dbに接続できればreadinessは200() {
   let app = TestApp::new();

   let (status, body) = call(app.router(), "GET", "/health/ready", None).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["status"], json!("ready"));
}
