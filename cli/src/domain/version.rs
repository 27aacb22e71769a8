use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::domain::error::WorkflowError;

/// 操作対象のスキーマバージョン。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSpec {
    /// 最新バージョン。
    #[default]
    Latest,
    /// 1 以上の明示的なバージョン番号。
    Explicit(NonZeroU32),
}

/// Schema Registry が最新バージョンを表すトークン。
const LATEST_TOKEN: &str = "latest";

impl VersionSpec {
    /// Schema Registry の URL に埋め込むトークンを返す。
    pub fn as_token(&self) -> String {
        match self {
            VersionSpec::Latest => LATEST_TOKEN.to_string(),
            VersionSpec::Explicit(n) => n.to_string(),
        }
    }

    /// 明示的なバージョン番号を Schema Registry の整数型で返す。
    pub fn number(&self) -> Option<i32> {
        match self {
            VersionSpec::Latest => None,
            VersionSpec::Explicit(n) => Some(i32::try_from(n.get()).unwrap_or(i32::MAX)),
        }
    }
}

impl FromStr for VersionSpec {
    type Err = WorkflowError;

    /// `latest` は最新。`0` も未指定扱いで最新になる。負数や数値以外は `InvalidVersion`。
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token == LATEST_TOKEN {
            return Ok(VersionSpec::Latest);
        }
        let invalid = || WorkflowError::InvalidVersion {
            token: token.to_string(),
        };
        let number = token.parse::<i32>().map_err(|_| invalid())?;
        if number == 0 {
            return Ok(VersionSpec::Latest);
        }
        u32::try_from(number)
            .ok()
            .and_then(NonZeroU32::new)
            .map(VersionSpec::Explicit)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_token())
    }
}
