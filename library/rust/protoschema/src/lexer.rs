//! .proto ソースの字句解析。

use std::fmt;

use crate::error::ParseError;

/// 字句の種類。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    /// 符号なし整数リテラル（10 進・16 進・8 進）。符号は構文解析側で扱う。
    Int(u64),
    Float(f64),
    /// エスケープ解除済みの文字列リテラル。
    Str(String),
    Symbol(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier {name:?}"),
            Token::Int(value) => write!(f, "integer {value}"),
            Token::Float(value) => write!(f, "float {value}"),
            Token::Str(value) => write!(f, "string {value:?}"),
            Token::Symbol(c) => write!(f, "'{c}'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// 位置情報付きの字句。行・列は 1 始まり。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        // 先頭の BOM は読み飛ばす（列番号は BOM の直後を 1 とする）
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// 入力全体を字句列に変換する。末尾には必ず `Token::Eof` が入る。
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let (line, column) = (self.line, self.column);
            let Some(ch) = self.peek_char() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let token = if ch.is_ascii_alphabetic() || ch == '_' {
                Token::Ident(self.read_identifier())
            } else if ch.is_ascii_digit()
                || (ch == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
            {
                self.read_number(line, column)?
            } else if ch == '"' || ch == '\'' {
                Token::Str(self.read_string(line, column)?)
            } else if "=;{}[]()<>,.:-+/".contains(ch) {
                self.next_char();
                Token::Symbol(ch)
            } else {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character {ch:?}"),
                ));
            };
            tokens.push(Spanned {
                token,
                line,
                column,
            });
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek_char(), self.peek_char_at(1)) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.next_char();
                }
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.next_char() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.next_char();
                    self.next_char();
                    loop {
                        match self.next_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.next_char();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(ParseError::new(
                                    line,
                                    column,
                                    "unterminated block comment",
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_digits(&mut self, radix: u32) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_digit(radix) {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        let invalid = |message: &str| ParseError::new(line, column, message);

        if self.peek_char() == Some('0') && matches!(self.peek_char_at(1), Some('x' | 'X')) {
            self.next_char();
            self.next_char();
            let digits = self.read_digits(16);
            if digits.is_empty() {
                return Err(invalid("invalid hexadecimal literal"));
            }
            self.reject_trailing_identifier(line, column)?;
            return u64::from_str_radix(&digits, 16)
                .map(Token::Int)
                .map_err(|_| invalid("integer literal out of range"));
        }

        let mut text = self.read_digits(10);
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.next_char();
            text.push('.');
            text.push_str(&self.read_digits(10));
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            is_float = true;
            self.next_char();
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek_char() {
                self.next_char();
                text.push(sign);
            }
            let exponent = self.read_digits(10);
            if exponent.is_empty() {
                return Err(invalid("invalid float literal"));
            }
            text.push_str(&exponent);
        }
        self.reject_trailing_identifier(line, column)?;

        if is_float {
            return text
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| invalid("invalid float literal"));
        }
        if text.len() > 1 && text.starts_with('0') {
            return u64::from_str_radix(&text[1..], 8)
                .map(Token::Int)
                .map_err(|_| invalid("invalid octal literal"));
        }
        text.parse::<u64>()
            .map(Token::Int)
            .map_err(|_| invalid("integer literal out of range"))
    }

    fn reject_trailing_identifier(&self, line: usize, column: usize) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => Err(ParseError::new(
                line,
                column,
                format!("invalid number literal followed by {ch:?}"),
            )),
            _ => Ok(()),
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let unterminated = || ParseError::new(line, column, "unterminated string literal");
        let Some(quote) = self.next_char() else {
            return Err(unterminated());
        };

        // \x や 8 進エスケープは任意のバイトを表すため、バイト列として組み立てる
        let mut bytes = Vec::new();
        loop {
            match self.next_char() {
                None | Some('\n') => return Err(unterminated()),
                Some(ch) if ch == quote => break,
                Some('\\') => self.read_escape(&mut bytes)?,
                Some(ch) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_escape(&mut self, bytes: &mut Vec<u8>) -> Result<(), ParseError> {
        let (line, column) = (self.line, self.column);
        let invalid = |message: &str| ParseError::new(line, column, message);

        let Some(ch) = self.next_char() else {
            return Err(invalid("unterminated escape sequence"));
        };
        let simple = match ch {
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'n' => Some(b'\n'),
            'r' => Some(b'\r'),
            't' => Some(b'\t'),
            'v' => Some(0x0b),
            '\\' => Some(b'\\'),
            '\'' => Some(b'\''),
            '"' => Some(b'"'),
            '?' => Some(b'?'),
            _ => None,
        };
        if let Some(byte) = simple {
            bytes.push(byte);
            return Ok(());
        }

        match ch {
            'x' | 'X' => {
                let digits = self.read_bounded_digits(16, 2);
                if digits.is_empty() {
                    return Err(invalid("invalid hexadecimal escape"));
                }
                let value =
                    u8::from_str_radix(&digits, 16).map_err(|_| invalid("invalid hexadecimal escape"))?;
                bytes.push(value);
            }
            '0'..='7' => {
                let mut digits = ch.to_string();
                digits.push_str(&self.read_bounded_digits(8, 2));
                let value =
                    u8::from_str_radix(&digits, 8).map_err(|_| invalid("octal escape out of range"))?;
                bytes.push(value);
            }
            'u' | 'U' => {
                let width = if ch == 'u' { 4 } else { 8 };
                let digits = self.read_bounded_digits(16, width);
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid("invalid unicode escape"))?;
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
            }
            other => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("invalid escape sequence \\{other}"),
                ))
            }
        }
        Ok(())
    }

    fn read_bounded_digits(&mut self, radix: u32, max: usize) -> String {
        let mut digits = String::new();
        while digits.len() < max {
            match self.peek_char() {
                Some(ch) if ch.is_digit(radix) => {
                    digits.push(ch);
                    self.next_char();
                }
                _ => break,
            }
        }
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_leading_byte_order_mark_is_skipped() {
        let spanned = Lexer::new("\u{FEFF}syntax").tokenize().unwrap();
        assert_eq!(spanned[0].token, Token::Ident("syntax".to_string()));
        assert_eq!((spanned[0].line, spanned[0].column), (1, 1));
    }

    #[test]
    fn test_byte_order_mark_after_start_is_rejected() {
        let err = Lexer::new("syntax \u{FEFF}").tokenize().unwrap_err();
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_option_statement() {
        assert_eq!(
            tokens(r#"option (topic) = "rates";"#),
            vec![
                Token::Ident("option".to_string()),
                Token::Symbol('('),
                Token::Ident("topic".to_string()),
                Token::Symbol(')'),
                Token::Symbol('='),
                Token::Str("rates".to_string()),
                Token::Symbol(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "// line comment\n/* block\n comment */ message";
        assert_eq!(
            tokens(input),
            vec![Token::Ident("message".to_string()), Token::Eof]
        );
    }

    #[test]
    fn test_positions_track_lines() {
        let spanned = Lexer::new("syntax\n  = \"proto3\";").tokenize().unwrap();
        assert_eq!((spanned[0].line, spanned[0].column), (1, 1));
        assert_eq!((spanned[1].line, spanned[1].column), (2, 3));
        assert_eq!((spanned[2].line, spanned[2].column), (2, 5));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("42 0x1F 017 1.5 .25 1e3 2.5E-1"),
            vec![
                Token::Int(42),
                Token::Int(31),
                Token::Int(15),
                Token::Float(1.5),
                Token::Float(0.25),
                Token::Float(1000.0),
                Token::Float(0.25),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#"'it\'s' "a\tb\n" "\x41\101é""#),
            vec![
                Token::Str("it's".to_string()),
                Token::Str("a\tb\n".to_string()),
                Token::Str("AAé".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("option (topic) = \"rates;\n").tokenize().unwrap_err();
        assert_eq!((err.line, err.column), (1, 18));
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("message A {}\n/* open").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("block comment"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("message A { @ }").tokenize().unwrap_err();
        assert_eq!(err.column, 13);
    }

    #[test]
    fn test_number_followed_by_letters_is_rejected() {
        assert!(Lexer::new("12abc").tokenize().is_err());
    }
}
