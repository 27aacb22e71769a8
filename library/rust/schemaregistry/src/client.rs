use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, error};

use crate::{
    config::SchemaRegistryConfig,
    error::{SchemaRegistryError, SUBJECT_SOFT_DELETED, VERSION_SOFT_DELETED},
    schema::{
        CompatibilityResult, ErrorResponse, RegisterSchemaResponse, RegisteredSchema,
        SchemaRequest, SchemaType, SchemaVersionResponse,
    },
};

/// Confluent Schema Registry の REST API が受け付けるコンテンツタイプ。
const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Schema Registry クライアントのインターフェース。
///
/// サブジェクトの列挙、スキーマの登録・取得・削除、互換性チェックを提供する。
/// `mock` feature を有効にすると `MockSchemaRegistryClient` が生成される。
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SchemaRegistryClient: Send + Sync {
    /// 登録されているすべてのサブジェクト名をレジストリの返却順で返す。
    async fn list_subjects(&self) -> Result<Vec<String>, SchemaRegistryError>;

    /// スキーマをサブジェクトに登録し、割り当てられた ID とバージョンを返す。
    ///
    /// サブジェクトが存在しなければ最初のバージョンが作成され、存在すれば互換性を満たす
    /// 新しいバージョンが追加される。同一スキーマが既に存在する場合は既存のものを返す。
    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
    ) -> Result<RegisteredSchema, SchemaRegistryError>;

    /// サブジェクトの最新バージョンのスキーマを取得する。
    async fn get_latest_schema(
        &self,
        subject: &str,
    ) -> Result<RegisteredSchema, SchemaRegistryError>;

    /// サブジェクトの指定バージョンのスキーマを取得する。
    async fn get_schema_version(
        &self,
        subject: &str,
        version: i32,
    ) -> Result<RegisteredSchema, SchemaRegistryError>;

    /// サブジェクトに登録されているすべてのバージョン番号を返す。
    async fn list_versions(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError>;

    /// サブジェクト全体を削除し、削除されたバージョン番号のリストを返す。
    ///
    /// `permanent` が `true` の場合はソフト削除の後にメタデータごと完全削除する。
    async fn delete_subject(
        &self,
        subject: &str,
        permanent: bool,
    ) -> Result<Vec<i32>, SchemaRegistryError>;

    /// サブジェクトの指定バージョンのみを削除し、削除されたバージョン番号を返す。
    async fn delete_schema_version(
        &self,
        subject: &str,
        version: i32,
        permanent: bool,
    ) -> Result<i32, SchemaRegistryError>;

    /// 候補スキーマがサブジェクトの指定バージョン（`"latest"` または番号）と互換か確認する。
    async fn check_compatibility(
        &self,
        subject: &str,
        schema: &str,
        version: &str,
        schema_type: SchemaType,
    ) -> Result<CompatibilityResult, SchemaRegistryError>;
}

/// HTTP 経由で Confluent Schema Registry と通信する実装。
pub struct HttpSchemaRegistryClient {
    config: SchemaRegistryConfig,
    http_client: reqwest::Client,
}

impl HttpSchemaRegistryClient {
    /// 設定から HTTP クライアントを構築する。
    ///
    /// タイムアウトは `config.timeout_secs` の値を使用する。
    pub fn new(config: SchemaRegistryConfig) -> Result<Self, SchemaRegistryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchemaRegistryError::Unavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// ベース URL にパスセグメントを連結したエンドポイント URL を返す。
    ///
    /// 各セグメントはパーセントエンコードされるため、サブジェクトに含まれる
    /// `/` `#` `?` もひとつのセグメントとして送られる。
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SchemaRegistryError> {
        let mut url = Url::parse(&self.config.url).map_err(|e| {
            SchemaRegistryError::Unavailable(format!(
                "invalid schema registry url {}: {}",
                self.config.url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                SchemaRegistryError::Unavailable(format!(
                    "schema registry url can not be a base: {}",
                    self.config.url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn subject_url(&self, subject: &str) -> Result<Url, SchemaRegistryError> {
        self.endpoint(&["subjects", subject])
    }

    fn version_url(&self, subject: &str, version: &str) -> Result<Url, SchemaRegistryError> {
        self.endpoint(&["subjects", subject, "versions", version])
    }

    fn permanent(mut url: Url) -> Url {
        url.query_pairs_mut().append_pair("permanent", "true");
        url
    }

    /// HTTP レスポンスのステータスコードを検査してエラーに変換する。
    ///
    /// - 404（ソフト削除済みを除く） → `SchemaNotFound`
    /// - Confluent 形式のエラーボディ付き → `Api`
    /// - その他の 4xx/5xx → `Unavailable`
    async fn check_response(
        response: reqwest::Response,
        subject: Option<&str>,
        version: Option<i32>,
    ) -> Result<reqwest::Response, SchemaRegistryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        let api_error = serde_json::from_str::<ErrorResponse>(&body).ok();

        let soft_deleted = api_error.as_ref().is_some_and(|e| {
            e.error_code == SUBJECT_SOFT_DELETED || e.error_code == VERSION_SOFT_DELETED
        });
        if status == reqwest::StatusCode::NOT_FOUND && !soft_deleted {
            return Err(SchemaRegistryError::SchemaNotFound {
                subject: subject.unwrap_or("unknown").to_string(),
                version,
            });
        }

        error!("Schema Registry returned error {}: {}", status, body);
        match api_error {
            Some(e) => Err(SchemaRegistryError::Api {
                status: status.as_u16(),
                error_code: e.error_code,
                message: e.message,
            }),
            None => Err(SchemaRegistryError::Unavailable(format!(
                "status={}, body={}",
                status, body
            ))),
        }
    }

    async fn fetch_schema(
        &self,
        subject: &str,
        version: Option<i32>,
    ) -> Result<RegisteredSchema, SchemaRegistryError> {
        let token = version.map_or_else(|| "latest".to_string(), |v| v.to_string());
        let url = self.version_url(subject, &token)?;

        debug!("Fetching schema: subject={}, version={}", subject, token);

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE)
            .send()
            .await?;
        let response = Self::check_response(response, Some(subject), version).await?;
        let data: SchemaVersionResponse = response.json().await?;
        Ok(data.into())
    }

    async fn send_delete(
        &self,
        url: Url,
        subject: &str,
        version: Option<i32>,
    ) -> Result<reqwest::Response, SchemaRegistryError> {
        let response = self
            .http_client
            .delete(url)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE)
            .send()
            .await?;
        Self::check_response(response, Some(subject), version).await
    }
}

#[async_trait]
impl SchemaRegistryClient for HttpSchemaRegistryClient {
    async fn list_subjects(&self) -> Result<Vec<String>, SchemaRegistryError> {
        let url = self.endpoint(&["subjects"])?;

        debug!("Listing all subjects");

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE)
            .send()
            .await?;
        let response = Self::check_response(response, None, None).await?;
        let subjects: Vec<String> = response.json().await?;

        debug!("Found {} subjects", subjects.len());
        Ok(subjects)
    }

    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
    ) -> Result<RegisteredSchema, SchemaRegistryError> {
        let body = SchemaRequest {
            schema,
            schema_type: schema_type.as_str(),
        };

        debug!(
            "Registering schema: subject={}, type={}",
            subject, schema_type
        );

        let response = self
            .http_client
            .post(self.endpoint(&["subjects", subject, "versions"])?)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response, Some(subject), None).await?;
        let reg: RegisterSchemaResponse = response.json().await?;

        // 登録 API は ID しか返さないため、同一スキーマを lookup してバージョンを得る。
        let response = self
            .http_client
            .post(self.subject_url(subject)?)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;
        let mut registered = match Self::check_response(response, Some(subject), None).await {
            Ok(response) => RegisteredSchema::from(response.json::<SchemaVersionResponse>().await?),
            // 正規化の差で lookup が一致しない場合は最新バージョンを採用する
            Err(SchemaRegistryError::SchemaNotFound { .. }) => {
                self.fetch_schema(subject, None).await?
            }
            Err(e) => return Err(e),
        };
        registered.id = reg.id;

        debug!(
            "Schema registered: subject={}, id={}, version={}",
            subject, registered.id, registered.version
        );
        Ok(registered)
    }

    async fn get_latest_schema(
        &self,
        subject: &str,
    ) -> Result<RegisteredSchema, SchemaRegistryError> {
        self.fetch_schema(subject, None).await
    }

    async fn get_schema_version(
        &self,
        subject: &str,
        version: i32,
    ) -> Result<RegisteredSchema, SchemaRegistryError> {
        self.fetch_schema(subject, Some(version)).await
    }

    async fn list_versions(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError> {
        let url = self.endpoint(&["subjects", subject, "versions"])?;

        debug!("Listing versions: subject={}", subject);

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE)
            .send()
            .await?;
        let response = Self::check_response(response, Some(subject), None).await?;
        let versions: Vec<i32> = response.json().await?;

        debug!("Subject {} has {} versions", subject, versions.len());
        Ok(versions)
    }

    async fn delete_subject(
        &self,
        subject: &str,
        permanent: bool,
    ) -> Result<Vec<i32>, SchemaRegistryError> {
        let url = self.subject_url(subject)?;

        debug!("Deleting subject={}, permanent={}", subject, permanent);

        let versions: Vec<i32> = match self.send_delete(url.clone(), subject, None).await {
            Ok(response) => response.json().await?,
            Err(e) if permanent && e.is_soft_deleted() => {
                debug!("Subject {} already soft deleted", subject);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        if !permanent {
            debug!("Soft deleted subject {}: {} versions", subject, versions.len());
            return Ok(versions);
        }

        let response = self
            .send_delete(Self::permanent(url), subject, None)
            .await?;
        let versions: Vec<i32> = response.json().await?;

        debug!("Permanently deleted subject {}: {} versions", subject, versions.len());
        Ok(versions)
    }

    async fn delete_schema_version(
        &self,
        subject: &str,
        version: i32,
        permanent: bool,
    ) -> Result<i32, SchemaRegistryError> {
        let url = self.version_url(subject, &version.to_string())?;

        debug!(
            "Deleting schema version: subject={}, version={}, permanent={}",
            subject, version, permanent
        );

        let deleted: i32 = match self.send_delete(url.clone(), subject, Some(version)).await {
            Ok(response) => response.json().await?,
            Err(e) if permanent && e.is_soft_deleted() => {
                debug!("Version {} of {} already soft deleted", version, subject);
                version
            }
            Err(e) => return Err(e),
        };
        if !permanent {
            return Ok(deleted);
        }

        let response = self
            .send_delete(Self::permanent(url), subject, Some(version))
            .await?;
        let deleted: i32 = response.json().await?;
        Ok(deleted)
    }

    async fn check_compatibility(
        &self,
        subject: &str,
        schema: &str,
        version: &str,
        schema_type: SchemaType,
    ) -> Result<CompatibilityResult, SchemaRegistryError> {
        let mut url = self.endpoint(&["compatibility", "subjects", subject, "versions", version])?;
        url.query_pairs_mut().append_pair("verbose", "true");
        let body = SchemaRequest {
            schema,
            schema_type: schema_type.as_str(),
        };

        debug!(
            "Checking compatibility: subject={}, version={}, type={}",
            subject, version, schema_type
        );

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response, Some(subject), None).await?;
        let result: CompatibilityResult = response.json().await?;

        debug!(
            "Compatibility check result: subject={}, is_compatible={}",
            subject, result.is_compatible
        );
        Ok(result)
    }
}
