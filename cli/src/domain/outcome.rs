use serde::Serialize;

/// ワークフローの正常終了結果。
///
/// 失敗は `Err(WorkflowError)` で返し、ここには含めない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// 何もしなかったことを示す情報メッセージ。CI では失敗として扱わない。
    Info(String),
    /// 操作が完了し、結果を持つ。
    Done(Payload),
}

impl WorkflowOutcome {
    pub fn info(message: impl Into<String>) -> Self {
        WorkflowOutcome::Info(message.into())
    }
}

/// 表示層に渡す結果の形。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Message(String),
    Registered(Registration),
    Deleted(Deletion),
    Versions(Vec<i32>),
    Subjects(Vec<String>),
    Inspection(SchemaReport),
    /// ファイルにそのまま書き出すスキーマ本文。
    Document(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub subject: String,
    pub id: i32,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deletion {
    pub subject: String,
    pub versions: Vec<i32>,
    pub permanent: bool,
}

/// inspect の結果。`references` は参照リストを JSON 文字列にしたもの。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub subject: String,
    pub id: i32,
    pub version: i32,
    pub references: String,
    pub schema: String,
}
