/// .proto ソースの構文エラー。行・列は 1 始まり。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// ExtractError はトピック・レコード抽出に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid proto definition at {0}")]
    Parse(#[from] ParseError),

    #[error("option {name} must be a string, got {kind}")]
    OptionType { name: String, kind: String },
}
