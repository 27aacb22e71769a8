//! コンパイル済みメッセージ記述子からの抽出。
//!
//! 生成コードやファイル記述子セットを持つ呼び出し元向けに、
//! `MessageOptions` に設定された拡張値を `prost-reflect` 経由で読み出す。

use prost_reflect::{DynamicMessage, ExtensionDescriptor, MessageDescriptor, ReflectMessage, Value};

use crate::error::ExtractError;
use crate::extract::TopicRecord;

/// メッセージ記述子のオプションからトピックとレコードを読み出す。
///
/// `record_ext` が `None` の場合、レコードは空文字列になる。
/// オプションが設定されていない拡張も空文字列として扱う。
pub fn extract_from_descriptor(
    descriptor: &MessageDescriptor,
    topic_ext: &ExtensionDescriptor,
    record_ext: Option<&ExtensionDescriptor>,
) -> Result<TopicRecord, ExtractError> {
    let options = descriptor.options();
    let topic = read_string_option(&options, topic_ext)?;
    let record = match record_ext {
        Some(extension) => read_string_option(&options, extension)?,
        None => String::new(),
    };
    Ok(TopicRecord { topic, record })
}

/// 生成済みメッセージ型の記述子からトピックとレコードを読み出す。
pub fn extract_from_message<M: ReflectMessage>(
    message: &M,
    topic_ext: &ExtensionDescriptor,
    record_ext: Option<&ExtensionDescriptor>,
) -> Result<TopicRecord, ExtractError> {
    extract_from_descriptor(&message.descriptor(), topic_ext, record_ext)
}

fn read_string_option(
    options: &DynamicMessage,
    extension: &ExtensionDescriptor,
) -> Result<String, ExtractError> {
    if !options.has_extension(extension) {
        return Ok(String::new());
    }
    match options.get_extension(extension).as_ref() {
        Value::String(value) => Ok(value.clone()),
        _ => Err(ExtractError::OptionType {
            name: extension.full_name().to_string(),
            kind: format!("{:?}", extension.kind()),
        }),
    }
}
