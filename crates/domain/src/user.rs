//! # ユーザー
//!
//! API トークンの持ち主。ワークスペースへの所属はインフラ層で照会する。

define_uuid_id! {
    /// ユーザーの一意識別子
    pub struct UserId;
}
