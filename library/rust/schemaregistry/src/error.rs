/// SchemaRegistryError は Schema Registry 操作に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum SchemaRegistryError {
    /// HTTP リクエストが失敗した。
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 指定したサブジェクトまたはバージョンが見つからない。
    #[error("Schema not found: subject={subject}, version={version:?}")]
    SchemaNotFound {
        /// スキーマのサブジェクト名。
        subject: String,
        /// スキーマのバージョン（None の場合は latest またはサブジェクト全体を指す）。
        version: Option<i32>,
    },

    /// Schema Registry がエラーボディ付きでリクエストを拒否した。
    #[error("Schema Registry rejected request: status={status}, error_code={error_code}, message={message}")]
    Api {
        /// HTTP ステータスコード。
        status: u16,
        /// Confluent 形式のエラーコード（例: 42201 = スキーマ不正）。
        error_code: i32,
        /// レジストリが返したメッセージ。
        message: String,
    },

    /// JSON シリアライズ／デシリアライズに失敗した。
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schema Registry サービスが利用不可。
    #[error("Schema Registry unavailable: {0}")]
    Unavailable(String),
}

/// サブジェクトがソフト削除済みであることを示すエラーコード。
pub const SUBJECT_SOFT_DELETED: i32 = 40404;
/// バージョンがソフト削除済みであることを示すエラーコード。
pub const VERSION_SOFT_DELETED: i32 = 40406;

impl SchemaRegistryError {
    /// ソフト削除済みの対象に対する応答かどうか。
    pub fn is_soft_deleted(&self) -> bool {
        matches!(
            self,
            SchemaRegistryError::Api { error_code, .. }
                if *error_code == SUBJECT_SOFT_DELETED || *error_code == VERSION_SOFT_DELETED
        )
    }
}
