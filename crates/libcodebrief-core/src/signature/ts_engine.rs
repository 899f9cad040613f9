use tree_sitter::{Language, Node, Parser};
use tree_sitter_language::LanguageFn;

use super::go::{Decl, FuncSig, Param, TypeBody, ValueKeyword};

/// Why a structural parse was rejected
#[derive(Debug)]
pub enum ParseFailure {
    Grammar,
    NoTree,
    Syntax { row: usize },
}

const GO_LANGUAGE: LanguageFn = tree_sitter_go::LANGUAGE;

/// Parse a Go file into its top-level declarations, in source order.
///
/// Any syntax error anywhere in the tree rejects the whole parse so the
/// caller can fall back to the regex extractor.
pub fn parse_go(content: &str) -> Result<Vec<Decl>, ParseFailure> {
    let lang: Language = Language::from(GO_LANGUAGE);

    let mut parser = Parser::new();
    parser.set_language(&lang).map_err(|_| ParseFailure::Grammar)?;

    let tree = parser.parse(content, None).ok_or(ParseFailure::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseFailure::Syntax {
            row: first_error_row(root).unwrap_or(0) + 1,
        });
    }

    let src = content.as_bytes();
    let mut decls = Vec::new();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "package_clause" => {
                if let Some(name) = first_named_child_of_kind(node, "package_identifier") {
                    decls.push(Decl::Package(text(name, src)));
                }
            }
            "import_declaration" => decls.push(Decl::Imports),
            "type_declaration" => collect_types(node, src, &mut decls),
            "const_declaration" => collect_values(node, src, ValueKeyword::Const, &mut decls),
            "var_declaration" => collect_values(node, src, ValueKeyword::Var, &mut decls),
            "function_declaration" | "method_declaration" => {
                if let Some(sig) = func_signature(node, src) {
                    decls.push(Decl::Func(sig));
                }
            }
            _ => {}
        }
    }

    Ok(decls)
}

fn first_error_row(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_row)
}

fn first_named_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Node text with interior whitespace runs collapsed to single spaces
fn text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn collect_types(decl: Node, src: &[u8], out: &mut Vec<Decl>) {
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        match spec.kind() {
            "type_spec" | "type_alias" => {
                let Some(name) = spec.child_by_field_name("name") else {
                    continue;
                };
                let type_params = spec.child_by_field_name("type_parameters").map(|n| text(n, src));
                let body = if spec.kind() == "type_alias" {
                    TypeBody::Alias
                } else {
                    match spec.child_by_field_name("type") {
                        Some(ty) if ty.kind() == "struct_type" => TypeBody::Struct {
                            fields: count_struct_fields(ty),
                        },
                        Some(ty) if ty.kind() == "interface_type" => TypeBody::Interface {
                            methods: count_interface_elems(ty),
                        },
                        _ => TypeBody::Other,
                    }
                };
                out.push(Decl::Type {
                    name: text(name, src),
                    type_params,
                    body,
                });
            }
            // Grouped form: `type ( ... )` wraps specs one level down in some grammar versions
            "type_spec_list" => collect_types(spec, src, out),
            _ => {}
        }
    }
}

fn count_struct_fields(struct_type: Node) -> usize {
    first_named_child_of_kind(struct_type, "field_declaration_list")
        .map(|list| {
            let mut cursor = list.walk();
            let count = list
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "field_declaration")
                .count();
            count
        })
        .unwrap_or(0)
}

fn count_interface_elems(interface_type: Node) -> usize {
    let mut cursor = interface_type.walk();
    let count = interface_type
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .count();
    count
}

fn collect_values(decl: Node, src: &[u8], keyword: ValueKeyword, out: &mut Vec<Decl>) {
    let spec_kind = match keyword {
        ValueKeyword::Const => "const_spec",
        ValueKeyword::Var => "var_spec",
    };
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if child.kind() == spec_kind {
            let names = spec_names(child, src);
            if !names.is_empty() {
                out.push(Decl::Value { keyword, names });
            }
        } else if child.kind() == "var_spec_list" || child.kind() == "const_spec_list" {
            collect_values(child, src, keyword, out);
        }
    }
}

fn spec_names(spec: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = spec.walk();
    let names = spec
        .children_by_field_name("name", &mut cursor)
        .map(|n| text(n, src))
        .collect();
    names
}

fn func_signature(node: Node, src: &[u8]) -> Option<FuncSig> {
    let name = text(node.child_by_field_name("name")?, src);

    let receiver = node
        .child_by_field_name("receiver")
        .map(|r| parameter_list(r, src))
        .and_then(|mut params| if params.is_empty() { None } else { Some(params.remove(0)) });

    let type_params = node.child_by_field_name("type_parameters").map(|n| text(n, src));

    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameter_list(p, src))
        .unwrap_or_default();

    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => parameter_list(result, src),
        Some(result) => vec![Param {
            names: Vec::new(),
            ty: text(result, src),
        }],
        None => Vec::new(),
    };

    Some(FuncSig {
        receiver,
        name,
        type_params,
        params,
        results,
    })
}

fn parameter_list(list: Node, src: &[u8]) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" | "variadic_parameter_declaration" => {
                let mut name_cursor = child.walk();
                let names: Vec<String> = child
                    .children_by_field_name("name", &mut name_cursor)
                    .map(|n| text(n, src))
                    .collect();
                let ty = child
                    .child_by_field_name("type")
                    .map(|t| text(t, src))
                    .unwrap_or_default();
                let ty = if child.kind() == "variadic_parameter_declaration" {
                    format!("...{}", ty)
                } else {
                    ty
                };
                params.push(Param { names, ty });
            }
            _ => {}
        }
    }
    params
}
