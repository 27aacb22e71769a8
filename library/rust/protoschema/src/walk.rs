use crate::ast::{
    Enum, EnumElement, Extend, ExtendElement, FileElement, MessageElement, OneofElement,
    OptionDecl, ProtoFile, Service, ServiceElement,
};

/// ファイル内の option 文を宣言順に訪問する。
///
/// ネストしたメッセージ・列挙・サービス・rpc・oneof・extend・group の本体にも、
/// 出現位置で降りていく。フィールド末尾の `[...]` オプションは訪問しない。
pub fn walk_options<'a>(file: &'a ProtoFile, mut visit: impl FnMut(&'a OptionDecl)) {
    for element in &file.elements {
        match element {
            FileElement::Option(option) => visit(option),
            FileElement::Message(message) => walk_message(&message.elements, &mut visit),
            FileElement::Enum(decl) => walk_enum(decl, &mut visit),
            FileElement::Service(service) => walk_service(service, &mut visit),
            FileElement::Extend(extend) => walk_extend(extend, &mut visit),
            FileElement::Syntax(_)
            | FileElement::Edition(_)
            | FileElement::Package(_)
            | FileElement::Import(_) => {}
        }
    }
}

fn walk_message<'a, F>(elements: &'a [MessageElement], visit: &mut F)
where
    F: FnMut(&'a OptionDecl),
{
    for element in elements {
        match element {
            MessageElement::Option(option) => visit(option),
            MessageElement::Message(message) => walk_message(&message.elements, visit),
            MessageElement::Group(group) => walk_message(&group.elements, visit),
            MessageElement::Enum(decl) => walk_enum(decl, visit),
            MessageElement::Extend(extend) => walk_extend(extend, visit),
            MessageElement::Oneof(oneof) => {
                for element in &oneof.elements {
                    match element {
                        OneofElement::Option(option) => visit(option),
                        OneofElement::Group(group) => walk_message(&group.elements, visit),
                        OneofElement::Field(_) => {}
                    }
                }
            }
            MessageElement::Field(_)
            | MessageElement::MapField(_)
            | MessageElement::Reserved(_)
            | MessageElement::Extensions(_) => {}
        }
    }
}

fn walk_enum<'a, F>(decl: &'a Enum, visit: &mut F)
where
    F: FnMut(&'a OptionDecl),
{
    for element in &decl.elements {
        if let EnumElement::Option(option) = element {
            visit(option);
        }
    }
}

fn walk_service<'a, F>(service: &'a Service, visit: &mut F)
where
    F: FnMut(&'a OptionDecl),
{
    for element in &service.elements {
        match element {
            ServiceElement::Option(option) => visit(option),
            ServiceElement::Rpc(rpc) => {
                for option in &rpc.options {
                    visit(option);
                }
            }
        }
    }
}

fn walk_extend<'a, F>(extend: &'a Extend, visit: &mut F)
where
    F: FnMut(&'a OptionDecl),
{
    for element in &extend.elements {
        if let ExtendElement::Group(group) = element {
            walk_message(&group.elements, visit);
        }
    }
}
