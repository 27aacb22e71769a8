use std::fmt;

use protoreg_protoschema::TopicRecord;
use regex::Regex;

use crate::domain::error::WorkflowError;

/// レコード名が指定されなかった場合に使う名前。
pub const DEFAULT_RECORD: &str = "default";

/// `{topic}-{record}-value` 形式のサブジェクト名を組み立てる。
pub fn subject_name(topic: &str, record: &str) -> String {
    format!("{topic}-{record}-value")
}

/// トピック配下の全レコードのサブジェクトに一致する正規表現を返す。
///
/// レコード部分は ASCII の英数字とアンダースコアに限る。
pub fn topic_pattern(topic: &str) -> Result<Regex, WorkflowError> {
    Ok(Regex::new(&format!(
        r"^{}-(?-u:\w)+-value$",
        regex::escape(topic)
    ))?)
}

/// Schema Registry 上のサブジェクト名。空でないトピックからのみ生成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSubject(String);

impl SchemaSubject {
    /// トピックが空の場合は `TopicUnset`。レコードが空の場合は `default` を使う。
    pub fn new(identity: &TopicRecord) -> Result<Self, WorkflowError> {
        if identity.topic.is_empty() {
            return Err(WorkflowError::TopicUnset);
        }
        let record = if identity.record.is_empty() {
            DEFAULT_RECORD
        } else {
            identity.record.as_str()
        };
        Ok(Self(subject_name(&identity.topic, record)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
