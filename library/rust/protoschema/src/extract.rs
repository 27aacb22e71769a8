use tracing::debug;

use crate::ast::ProtoFile;
use crate::error::{ExtractError, ParseError};
use crate::parser::parse;
use crate::walk::walk_options;

/// トピック名を宣言するメッセージオプション名。
pub const TOPIC_OPTION: &str = "(topic)";
/// レコード名を宣言するメッセージオプション名。
pub const RECORD_OPTION: &str = "(record)";

/// proto 定義から読み取ったトピックとレコード。宣言がなければ空文字列。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicRecord {
    pub topic: String,
    pub record: String,
}

impl TopicRecord {
    pub fn new(topic: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            record: record.into(),
        }
    }
}

/// .proto ソースのバイト列から `(topic)` / `(record)` オプションを抽出する。
///
/// 同じオプションが複数回現れた場合は、宣言順で最後のものを採用する。
/// 文字列以外の値を持つ場合は無視する。
pub fn extract(proto: &[u8]) -> Result<TopicRecord, ExtractError> {
    let source = std::str::from_utf8(proto).map_err(|e| utf8_error(proto, e.valid_up_to()))?;
    let file = parse(source)?;
    let identity = extract_from_file(&file);

    debug!(
        topic = %identity.topic,
        record = %identity.record,
        "Extracted topic and record from proto definition"
    );
    Ok(identity)
}

/// 構文解析済みのファイルから `(topic)` / `(record)` オプションを抽出する。
pub fn extract_from_file(file: &ProtoFile) -> TopicRecord {
    let mut identity = TopicRecord::default();
    walk_options(file, |option| {
        let Some(value) = option.value.as_str() else {
            return;
        };
        match option.name.as_str() {
            TOPIC_OPTION => identity.topic = value.to_string(),
            RECORD_OPTION => identity.record = value.to_string(),
            _ => {}
        }
    });
    identity
}

fn utf8_error(proto: &[u8], valid_up_to: usize) -> ParseError {
    // valid_up_to までは UTF-8 として正しいことが保証されている
    let valid = String::from_utf8_lossy(&proto[..valid_up_to]);
    let line = valid.matches('\n').count() + 1;
    let column = valid
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    ParseError::new(line, column, "invalid UTF-8 sequence")
}
