//! # ワークスペース
//!
//! キャンペーン・購読者・メールサービスを分離するテナント境界。
//!
//! 配信リクエストは常に `(workspace_id, campaign_id)` の組で解決され、
//! 別ワークスペースのキャンペーンやメールサービスは「存在しない」ものとして扱う。

define_uuid_id! {
    /// ワークスペースの一意識別子
    pub struct WorkspaceId;
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_workspace_idは生成ごとに異なる() {
        assert_ne!(WorkspaceId::new(), WorkspaceId::new());
    }

    #[test]
    fn test_workspace_idのdisplayはuuid文字列になる() {
        let uuid = Uuid::parse_str("0190a0e4-1234-7abc-8def-0123456789ab").unwrap();
        let id = WorkspaceId::from_uuid(uuid);

        assert_eq!(id.to_string(), "0190a0e4-1234-7abc-8def-0123456789ab");
    }
}
