use serde::{Deserialize, Serialize};

/// Schema Registry に登録されたスキーマを表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    /// Schema Registry が割り当てたグローバルスキーマ ID。
    pub id: i32,
    /// サブジェクト名（例: `rates-usd_eur-value`）。
    pub subject: String,
    /// サブジェクト内のバージョン番号。
    pub version: i32,
    /// スキーマ定義文字列（Protobuf の場合は .proto ファイルの内容）。
    pub schema: String,
    /// スキーマのフォーマット種別。
    pub schema_type: SchemaType,
    /// このスキーマが import している他サブジェクトへの参照。
    #[serde(default)]
    pub references: Vec<SchemaReference>,
}

/// 他サブジェクトに登録されたスキーマへの参照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// import 文に書かれた名前（例: `google/type/money.proto`）。
    pub name: String,
    /// 参照先のサブジェクト名。
    pub subject: String,
    /// 参照先のバージョン番号。
    pub version: i32,
}

/// スキーマのフォーマット種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    /// Apache Avro 形式。
    Avro,
    /// JSON Schema 形式。
    Json,
    /// Protocol Buffers 形式。
    Protobuf,
}

impl SchemaType {
    /// Confluent Schema Registry API で使用する文字列表現を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Json => "JSON",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 互換性チェックの結果。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// 互換性がある場合は `true`。
    pub is_compatible: bool,
    /// 非互換時にレジストリが返した理由（verbose モード）。
    #[serde(default)]
    pub messages: Vec<String>,
}

/// `/subjects/{subject}/versions` などへのスキーマ送信ペイロード。
#[derive(Debug, Serialize)]
pub(crate) struct SchemaRequest<'a> {
    /// スキーマ定義文字列。
    pub schema: &'a str,
    /// スキーマフォーマット種別文字列。
    #[serde(rename = "schemaType")]
    pub schema_type: &'a str,
}

/// スキーマ登録レスポンス。
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterSchemaResponse {
    /// 割り当てられたスキーマ ID。
    pub id: i32,
}

/// `/subjects/{subject}/versions/{version}` および `/subjects/{subject}` lookup のレスポンス。
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaVersionResponse {
    pub subject: String,
    pub version: i32,
    pub id: i32,
    pub schema: String,
    /// AVRO の場合レジストリはこのフィールドを省略する。
    #[serde(rename = "schemaType", default = "default_schema_type_str")]
    pub schema_type: String,
    #[serde(default)]
    pub references: Vec<SchemaReference>,
}

impl From<SchemaVersionResponse> for RegisteredSchema {
    fn from(data: SchemaVersionResponse) -> Self {
        RegisteredSchema {
            id: data.id,
            schema_type: parse_schema_type(&data.schema_type),
            subject: data.subject,
            version: data.version,
            schema: data.schema,
            references: data.references,
        }
    }
}

/// Confluent 形式のエラーボディ。
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error_code: i32,
    pub message: String,
}

fn default_schema_type_str() -> String {
    "AVRO".to_string()
}

/// 文字列から SchemaType へ変換する。
///
/// 大文字小文字を区別しない。不明な文字列の場合は Avro を返す。
pub(crate) fn parse_schema_type(s: &str) -> SchemaType {
    match s.to_uppercase().as_str() {
        "PROTOBUF" => SchemaType::Protobuf,
        "JSON" => SchemaType::Json,
        _ => SchemaType::Avro,
    }
}
