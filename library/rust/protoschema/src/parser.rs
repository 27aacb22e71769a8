//! .proto ソースの構文解析。
//!
//! proto2 / proto3 / editions の宣言を受け付け、意味検証は行わない。

use crate::ast::{
    Constant, Enum, EnumElement, EnumValue, Extend, ExtendElement, Extensions, Field, FieldLabel,
    FileElement, Group, Import, ImportKind, MapField, Message, MessageElement, Oneof,
    OneofElement, OptionDecl, ProtoFile, Range, RangeEnd, Reserved, Rpc, Service, ServiceElement,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Spanned, Token};

/// .proto ソースを構文木に変換する。
pub fn parse(source: &str) -> Result<ProtoFile, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser { tokens, pos: 0 }.parse_file()
}

enum FieldOrGroup {
    Field(Field),
    Group(Group),
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Spanned {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Spanned {
        // tokenize は末尾に必ず Eof を置く
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Spanned {
        let token = self.peek().clone();
        if token.token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn is_symbol_at(&self, offset: usize, symbol: char) -> bool {
        self.peek_at(offset).token == Token::Symbol(symbol)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().token, Token::Ident(name) if name == keyword)
    }

    fn is_ident_at(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset).token, Token::Ident(_))
    }

    /// `keyword Name {` の形で宣言ブロックが始まるか。
    fn starts_block(&self) -> bool {
        self.is_ident_at(1) && self.is_symbol_at(2, '{')
    }

    /// 先頭のキーワードが実はフィールド型名で、`Type name =` と続くか。
    fn is_field_named_after_keyword(&self) -> bool {
        self.is_ident_at(1) && self.is_symbol_at(2, '=')
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.is_symbol_at(0, symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), ParseError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{symbol}'")))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.peek();
        ParseError::new(
            found.line,
            found.column,
            format!("expected {expected}, found {}", found.token),
        )
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek().token.clone() {
            Token::Ident(name) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.is_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("\"{keyword}\"")))
        }
    }

    fn full_ident(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident("identifier")?;
        while self.is_symbol_at(0, '.') && self.is_ident_at(1) {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_ident("identifier")?);
        }
        Ok(name)
    }

    /// 先頭の `.` による完全修飾を含む型名。
    fn type_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        if self.eat_symbol('.') {
            name.push('.');
        }
        name.push_str(&self.full_ident()?);
        Ok(name)
    }

    /// 隣接する文字列リテラルは連結する。
    fn string_literal(&mut self) -> Result<String, ParseError> {
        let Token::Str(mut value) = self.peek().token.clone() else {
            return Err(self.unexpected("string literal"));
        };
        self.pos += 1;
        while let Token::Str(next) = &self.peek().token {
            value.push_str(next);
            self.pos += 1;
        }
        Ok(value)
    }

    fn signed_int(&mut self) -> Result<i128, ParseError> {
        let negative = self.eat_symbol('-');
        if !negative {
            self.eat_symbol('+');
        }
        match self.peek().token {
            Token::Int(value) => {
                self.pos += 1;
                let value = i128::from(value);
                Ok(if negative { -value } else { value })
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    fn field_number(&mut self) -> Result<u32, ParseError> {
        let start = self.peek().clone();
        let value = self.signed_int()?;
        u32::try_from(value).map_err(|_| {
            ParseError::new(
                start.line,
                start.column,
                format!("field number {value} out of range"),
            )
        })
    }

    fn constant(&mut self) -> Result<Constant, ParseError> {
        match self.peek().token.clone() {
            Token::Str(_) => Ok(Constant::Str(self.string_literal()?)),
            Token::Symbol('{') => {
                self.pos += 1;
                Ok(Constant::Aggregate(self.aggregate_body('}')?))
            }
            Token::Symbol(sign @ ('-' | '+')) => {
                self.pos += 1;
                self.numeric_constant(sign == '-')
            }
            Token::Int(_) | Token::Float(_) => self.numeric_constant(false),
            Token::Ident(name) => match name.as_str() {
                "true" | "false" => {
                    self.pos += 1;
                    Ok(Constant::Bool(name == "true"))
                }
                "inf" | "nan" => self.numeric_constant(false),
                _ => Ok(Constant::Ident(self.full_ident()?)),
            },
            _ => Err(self.unexpected("constant")),
        }
    }

    fn numeric_constant(&mut self, negative: bool) -> Result<Constant, ParseError> {
        let sign = if negative { -1.0 } else { 1.0 };
        let constant = match &self.peek().token {
            Token::Int(value) => {
                let value = i128::from(*value);
                Constant::Int(if negative { -value } else { value })
            }
            Token::Float(value) => Constant::Float(sign * value),
            Token::Ident(name) if name == "inf" => Constant::Float(sign * f64::INFINITY),
            Token::Ident(name) if name == "nan" => Constant::Float(f64::NAN),
            _ => return Err(self.unexpected("number")),
        };
        self.pos += 1;
        Ok(constant)
    }

    /// テキストフォーマットの集約値 `{ a: 1 b { c: "x" } d: [1, 2] }` を読む。
    fn aggregate_body(&mut self, close: char) -> Result<Vec<(String, Constant)>, ParseError> {
        let mut fields = Vec::new();
        loop {
            if self.eat_symbol(close) {
                return Ok(fields);
            }
            let name = if self.eat_symbol('[') {
                let mut name = String::from("[");
                name.push_str(&self.type_name()?);
                // Any 型の型 URL
                while self.eat_symbol('/') {
                    name.push('/');
                    name.push_str(&self.type_name()?);
                }
                self.expect_symbol(']')?;
                name.push(']');
                name
            } else {
                self.expect_ident("field name")?
            };
            let has_colon = self.eat_symbol(':');
            let value = self.aggregate_value(has_colon)?;
            fields.push((name, value));
            if !self.eat_symbol(',') {
                self.eat_symbol(';');
            }
        }
    }

    fn aggregate_value(&mut self, has_colon: bool) -> Result<Constant, ParseError> {
        if self.eat_symbol('{') {
            return Ok(Constant::Aggregate(self.aggregate_body('}')?));
        }
        if self.eat_symbol('<') {
            return Ok(Constant::Aggregate(self.aggregate_body('>')?));
        }
        if !has_colon {
            return Err(self.unexpected("':'"));
        }
        if self.eat_symbol('[') {
            let mut items = Vec::new();
            if self.eat_symbol(']') {
                return Ok(Constant::List(items));
            }
            loop {
                items.push(self.aggregate_value(true)?);
                if self.eat_symbol(']') {
                    return Ok(Constant::List(items));
                }
                if !self.eat_symbol(',') {
                    return Err(self.unexpected("',' or ']'"));
                }
            }
        }
        self.constant()
    }

    fn option_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.option_name_part()?;
        while self.eat_symbol('.') {
            name.push('.');
            name.push_str(&self.option_name_part()?);
        }
        Ok(name)
    }

    fn option_name_part(&mut self) -> Result<String, ParseError> {
        if self.eat_symbol('(') {
            let mut part = String::from("(");
            part.push_str(&self.type_name()?);
            self.expect_symbol(')')?;
            part.push(')');
            Ok(part)
        } else {
            self.expect_ident("option name")
        }
    }

    fn option_assignment(&mut self, line: usize, column: usize) -> Result<OptionDecl, ParseError> {
        let name = self.option_name()?;
        self.expect_symbol('=')?;
        let value = self.constant()?;
        Ok(OptionDecl {
            name,
            value,
            line,
            column,
        })
    }

    fn option_statement(&mut self) -> Result<OptionDecl, ParseError> {
        let start = self.advance();
        let option = self.option_assignment(start.line, start.column)?;
        self.expect_symbol(';')?;
        Ok(option)
    }

    fn inline_options(&mut self) -> Result<Vec<OptionDecl>, ParseError> {
        let mut options = Vec::new();
        if !self.eat_symbol('[') {
            return Ok(options);
        }
        loop {
            let start = self.peek().clone();
            options.push(self.option_assignment(start.line, start.column)?);
            if self.eat_symbol(']') {
                return Ok(options);
            }
            if !self.eat_symbol(',') {
                return Err(self.unexpected("',' or ']'"));
            }
        }
    }

    fn parse_file(mut self) -> Result<ProtoFile, ParseError> {
        let mut elements = Vec::new();
        loop {
            let element = match self.peek().token.clone() {
                Token::Eof => return Ok(ProtoFile { elements }),
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(keyword) => match keyword.as_str() {
                    "syntax" => FileElement::Syntax(self.string_assignment()?),
                    "edition" => FileElement::Edition(self.string_assignment()?),
                    "package" => {
                        self.pos += 1;
                        let name = self.full_ident()?;
                        self.expect_symbol(';')?;
                        FileElement::Package(name)
                    }
                    "import" => FileElement::Import(self.import()?),
                    "option" => FileElement::Option(self.option_statement()?),
                    "message" => FileElement::Message(self.message()?),
                    "enum" => FileElement::Enum(self.enum_decl()?),
                    "service" => FileElement::Service(self.service()?),
                    "extend" => FileElement::Extend(self.extend()?),
                    _ => return Err(self.unexpected("top-level declaration")),
                },
                _ => return Err(self.unexpected("top-level declaration")),
            };
            elements.push(element);
        }
    }

    fn string_assignment(&mut self) -> Result<String, ParseError> {
        self.pos += 1;
        self.expect_symbol('=')?;
        let value = self.string_literal()?;
        self.expect_symbol(';')?;
        Ok(value)
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        self.pos += 1;
        let kind = if self.is_keyword("weak") {
            ImportKind::Weak
        } else if self.is_keyword("public") {
            ImportKind::Public
        } else {
            ImportKind::Default
        };
        if kind != ImportKind::Default {
            self.pos += 1;
        }
        let path = self.string_literal()?;
        self.expect_symbol(';')?;
        Ok(Import { path, kind })
    }

    fn message(&mut self) -> Result<Message, ParseError> {
        self.pos += 1;
        let name = self.expect_ident("message name")?;
        self.expect_symbol('{')?;
        let elements = self.message_body()?;
        Ok(Message { name, elements })
    }

    /// `{` の直後から対応する `}` までを読む。
    fn message_body(&mut self) -> Result<Vec<MessageElement>, ParseError> {
        let mut elements = Vec::new();
        loop {
            let keyword = match self.peek().token.clone() {
                Token::Symbol('}') => {
                    self.pos += 1;
                    return Ok(elements);
                }
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(keyword) => keyword,
                Token::Symbol('.') => String::new(),
                _ => return Err(self.unexpected("message element or '}'")),
            };
            let element = match keyword.as_str() {
                "option" => MessageElement::Option(self.option_statement()?),
                "message" if self.starts_block() => MessageElement::Message(self.message()?),
                "enum" if self.starts_block() => MessageElement::Enum(self.enum_decl()?),
                "oneof" if self.starts_block() => MessageElement::Oneof(self.oneof()?),
                "extend" if !self.is_field_named_after_keyword() => {
                    MessageElement::Extend(self.extend()?)
                }
                "map" if self.is_symbol_at(1, '<') => MessageElement::MapField(self.map_field()?),
                "reserved" if !self.is_field_named_after_keyword() => {
                    MessageElement::Reserved(self.reserved()?)
                }
                "extensions" if !self.is_field_named_after_keyword() => {
                    MessageElement::Extensions(self.extensions()?)
                }
                _ => match self.field_or_group()? {
                    FieldOrGroup::Field(field) => MessageElement::Field(field),
                    FieldOrGroup::Group(group) => MessageElement::Group(group),
                },
            };
            elements.push(element);
        }
    }

    fn field_or_group(&mut self) -> Result<FieldOrGroup, ParseError> {
        let label = match &self.peek().token {
            Token::Ident(keyword) => FieldLabel::from_keyword(keyword),
            _ => None,
        };
        // `optional foo = 1;` は型名 optional のフィールド
        let label = label.filter(|_| !self.is_field_named_after_keyword());
        if label.is_some() {
            self.pos += 1;
        }

        let type_name = self.type_name()?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.field_number()?;
        let options = self.inline_options()?;

        if type_name == "group" && self.eat_symbol('{') {
            let elements = self.message_body()?;
            return Ok(FieldOrGroup::Group(Group {
                label,
                name,
                number,
                options,
                elements,
            }));
        }
        self.expect_symbol(';')?;
        Ok(FieldOrGroup::Field(Field {
            label,
            type_name,
            name,
            number,
            options,
        }))
    }

    fn map_field(&mut self) -> Result<MapField, ParseError> {
        self.pos += 1;
        self.expect_symbol('<')?;
        let key_type = self.type_name()?;
        self.expect_symbol(',')?;
        let value_type = self.type_name()?;
        self.expect_symbol('>')?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.field_number()?;
        let options = self.inline_options()?;
        self.expect_symbol(';')?;
        Ok(MapField {
            key_type,
            value_type,
            name,
            number,
            options,
        })
    }

    fn oneof(&mut self) -> Result<Oneof, ParseError> {
        self.pos += 1;
        let name = self.expect_ident("oneof name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            let element = match self.peek().token.clone() {
                Token::Symbol('}') => {
                    self.pos += 1;
                    return Ok(Oneof { name, elements });
                }
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(keyword) if keyword == "option" => {
                    OneofElement::Option(self.option_statement()?)
                }
                Token::Ident(_) | Token::Symbol('.') => match self.field_or_group()? {
                    FieldOrGroup::Field(field) => OneofElement::Field(field),
                    FieldOrGroup::Group(group) => OneofElement::Group(group),
                },
                _ => return Err(self.unexpected("oneof field or '}'")),
            };
            elements.push(element);
        }
    }

    fn enum_decl(&mut self) -> Result<Enum, ParseError> {
        self.pos += 1;
        let name = self.expect_ident("enum name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            let element = match self.peek().token.clone() {
                Token::Symbol('}') => {
                    self.pos += 1;
                    return Ok(Enum { name, elements });
                }
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(keyword) if keyword == "option" && !self.is_symbol_at(1, '=') => {
                    EnumElement::Option(self.option_statement()?)
                }
                Token::Ident(keyword) if keyword == "reserved" && !self.is_symbol_at(1, '=') => {
                    EnumElement::Reserved(self.reserved()?)
                }
                Token::Ident(_) => EnumElement::Value(self.enum_value()?),
                _ => return Err(self.unexpected("enum value or '}'")),
            };
            elements.push(element);
        }
    }

    fn enum_value(&mut self) -> Result<EnumValue, ParseError> {
        let name = self.expect_ident("enum value name")?;
        self.expect_symbol('=')?;
        let start = self.peek().clone();
        let number = self.signed_int()?;
        let number = i32::try_from(number).map_err(|_| {
            ParseError::new(
                start.line,
                start.column,
                format!("enum value {number} out of range"),
            )
        })?;
        let options = self.inline_options()?;
        self.expect_symbol(';')?;
        Ok(EnumValue {
            name,
            number,
            options,
        })
    }

    fn reserved(&mut self) -> Result<Reserved, ParseError> {
        self.pos += 1;
        let reserved = match self.peek().token.clone() {
            Token::Str(_) => {
                let mut names = vec![self.string_literal()?];
                while self.eat_symbol(',') {
                    names.push(self.string_literal()?);
                }
                Reserved::Names(names)
            }
            // editions では予約名を識別子で書く
            Token::Ident(_) => {
                let mut names = vec![self.expect_ident("reserved name")?];
                while self.eat_symbol(',') {
                    names.push(self.expect_ident("reserved name")?);
                }
                Reserved::Names(names)
            }
            _ => Reserved::Ranges(self.ranges()?),
        };
        self.expect_symbol(';')?;
        Ok(reserved)
    }

    fn extensions(&mut self) -> Result<Extensions, ParseError> {
        self.pos += 1;
        let ranges = self.ranges()?;
        let options = self.inline_options()?;
        self.expect_symbol(';')?;
        Ok(Extensions { ranges, options })
    }

    fn ranges(&mut self) -> Result<Vec<Range>, ParseError> {
        let mut ranges = vec![self.range()?];
        while self.eat_symbol(',') {
            ranges.push(self.range()?);
        }
        Ok(ranges)
    }

    fn range(&mut self) -> Result<Range, ParseError> {
        let start = self.range_bound()?;
        let end = if self.is_keyword("to") {
            self.pos += 1;
            if self.is_keyword("max") {
                self.pos += 1;
                RangeEnd::Max
            } else {
                RangeEnd::Number(self.range_bound()?)
            }
        } else {
            RangeEnd::Single
        };
        Ok(Range { start, end })
    }

    fn range_bound(&mut self) -> Result<i64, ParseError> {
        let start = self.peek().clone();
        let value = self.signed_int()?;
        i64::try_from(value).map_err(|_| {
            ParseError::new(
                start.line,
                start.column,
                format!("range bound {value} out of range"),
            )
        })
    }

    fn service(&mut self) -> Result<Service, ParseError> {
        self.pos += 1;
        let name = self.expect_ident("service name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            let element = match self.peek().token.clone() {
                Token::Symbol('}') => {
                    self.pos += 1;
                    return Ok(Service { name, elements });
                }
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(keyword) if keyword == "option" => {
                    ServiceElement::Option(self.option_statement()?)
                }
                Token::Ident(keyword) if keyword == "rpc" => ServiceElement::Rpc(self.rpc()?),
                _ => return Err(self.unexpected("\"rpc\", \"option\" or '}'")),
            };
            elements.push(element);
        }
    }

    fn rpc(&mut self) -> Result<Rpc, ParseError> {
        self.pos += 1;
        let name = self.expect_ident("rpc name")?;
        let (request_stream, request_type) = self.rpc_type()?;
        self.expect_keyword("returns")?;
        let (response_stream, response_type) = self.rpc_type()?;

        let mut options = Vec::new();
        if self.eat_symbol('{') {
            loop {
                match self.peek().token.clone() {
                    Token::Symbol('}') => {
                        self.pos += 1;
                        break;
                    }
                    Token::Symbol(';') => self.pos += 1,
                    Token::Ident(keyword) if keyword == "option" => {
                        options.push(self.option_statement()?);
                    }
                    _ => return Err(self.unexpected("\"option\" or '}'")),
                }
            }
        } else {
            self.expect_symbol(';')?;
        }

        Ok(Rpc {
            name,
            request_type,
            request_stream,
            response_type,
            response_stream,
            options,
        })
    }

    fn rpc_type(&mut self) -> Result<(bool, String), ParseError> {
        self.expect_symbol('(')?;
        // `(stream)` は stream という名前の型
        let stream = self.is_keyword("stream") && !self.is_symbol_at(1, ')');
        if stream {
            self.pos += 1;
        }
        let type_name = self.type_name()?;
        self.expect_symbol(')')?;
        Ok((stream, type_name))
    }

    fn extend(&mut self) -> Result<Extend, ParseError> {
        self.pos += 1;
        let extendee = self.type_name()?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            let element = match self.peek().token.clone() {
                Token::Symbol('}') => {
                    self.pos += 1;
                    return Ok(Extend { extendee, elements });
                }
                Token::Symbol(';') => {
                    self.pos += 1;
                    continue;
                }
                Token::Ident(_) | Token::Symbol('.') => match self.field_or_group()? {
                    FieldOrGroup::Field(field) => ExtendElement::Field(field),
                    FieldOrGroup::Group(group) => ExtendElement::Group(group),
                },
                _ => return Err(self.unexpected("extension field or '}'")),
            };
            elements.push(element);
        }
    }
}
