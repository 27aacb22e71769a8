//! protoreg-protoschema: Protocol Buffers 定義からトピック・レコード注釈を抽出するライブラリ。
//!
//! メッセージに付けた独自オプションでスキーマの送信先を宣言する。
//!
//! ```proto
//! message Currency {
//!   option (topic) = "rates";
//!   option (record) = "usd_eur";
//!   string left = 1;
//! }
//! ```
//!
//! # 使用例
//!
//! ```rust
//! use protoreg_protoschema::extract;
//!
//! let proto = br#"message Currency { option (topic) = "rates"; option (record) = "usd_eur"; }"#;
//! let identity = extract(proto).unwrap();
//! assert_eq!(identity.topic, "rates");
//! assert_eq!(identity.record, "usd_eur");
//! ```

pub mod ast;
pub mod descriptor;
pub mod error;
pub mod extract;
mod lexer;
pub mod parser;
pub mod walk;

pub use descriptor::{extract_from_descriptor, extract_from_message};
pub use error::{ExtractError, ParseError};
pub use extract::{extract, extract_from_file, TopicRecord, RECORD_OPTION, TOPIC_OPTION};
pub use parser::parse;
pub use walk::walk_options;
