//! .proto ファイルの構文木。
//!
//! 各本体要素は宣言順に保持する。オプションの「後勝ち」判定はこの順序に依存する。

/// 1 つの .proto ファイル。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    pub elements: Vec<FileElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileElement {
    Syntax(String),
    Edition(String),
    Package(String),
    Import(Import),
    Option(OptionDecl),
    Message(Message),
    Enum(Enum),
    Service(Service),
    Extend(Extend),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Weak,
    Public,
}

/// `option` 文、またはフィールド末尾の `[...]` 内の 1 項目。
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDecl {
    /// 空白を除いた正規化済みの名前（例: `(topic)`、`(foo.bar).baz`、`java_package`）。
    pub name: String,
    pub value: Constant,
    pub line: usize,
    pub column: usize,
}

/// オプションに与えられた定数値。
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    /// 列挙値名などの識別子。
    Ident(String),
    /// `{ key: value ... }` 形式の集約値。
    Aggregate(Vec<(String, Constant)>),
    /// 集約値内の `[a, b]` 形式のリスト。
    List(Vec<Constant>),
}

impl Constant {
    /// 文字列定数であればその値を返す。
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::Str(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub elements: Vec<MessageElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageElement {
    Field(Field),
    MapField(MapField),
    Group(Group),
    Oneof(Oneof),
    Option(OptionDecl),
    Message(Message),
    Enum(Enum),
    Extend(Extend),
    Reserved(Reserved),
    Extensions(Extensions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Optional,
    Required,
    Repeated,
}

impl FieldLabel {
    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "optional" => Some(FieldLabel::Optional),
            "required" => Some(FieldLabel::Required),
            "repeated" => Some(FieldLabel::Repeated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: Option<FieldLabel>,
    pub type_name: String,
    pub name: String,
    pub number: u32,
    /// `[...]` 内のフィールドオプション。文レベルのオプションではない。
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub key_type: String,
    pub value_type: String,
    pub name: String,
    pub number: u32,
    pub options: Vec<OptionDecl>,
}

/// proto2 の group フィールド。本体はメッセージと同じ構造を持つ。
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: Option<FieldLabel>,
    pub name: String,
    pub number: u32,
    pub options: Vec<OptionDecl>,
    pub elements: Vec<MessageElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    pub name: String,
    pub elements: Vec<OneofElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OneofElement {
    Option(OptionDecl),
    Field(Field),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub elements: Vec<EnumElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumElement {
    Option(OptionDecl),
    Value(EnumValue),
    Reserved(Reserved),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub elements: Vec<ServiceElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceElement {
    Option(OptionDecl),
    Rpc(Rpc),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rpc {
    pub name: String,
    pub request_type: String,
    pub request_stream: bool,
    pub response_type: String,
    pub response_stream: bool,
    /// `{ ... }` 本体内の option 文。
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extend {
    pub extendee: String,
    pub elements: Vec<ExtendElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtendElement {
    Field(Field),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reserved {
    Ranges(Vec<Range>),
    Names(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extensions {
    pub ranges: Vec<Range>,
    pub options: Vec<OptionDecl>,
}

/// `start` または `start to end` の番号範囲。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub end: RangeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// 単一番号の範囲（`start` と同じ）。
    Single,
    Number(i64),
    Max,
}
