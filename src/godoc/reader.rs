//! Declaration reader
//!
//! Walks the top-level declarations of a package and collects its exported
//! API. Constructors, methods and typed constants/variables are attached to
//! the type they belong to; everything else stays at package level.

use std::collections::{BTreeMap, HashMap};

use tree_sitter::Node;

use super::comments::{doc_comment_nodes, to_html};
use super::constants::*;
use super::examples::{RawExample, examples_for, method_prefix};
use super::parser::{ParsedFile, children_by_field, format_range, is_exported};
use crate::doc::{Field, Func, Type, Value};

/// Share of specs that must name the same type for a value declaration to
/// be listed under that type
const VALUE_TYPE_THRESHOLD: f64 = 0.75;

/// Exported declarations of one package
#[derive(Debug, Default)]
pub struct PackageDecls {
    pub constants: Vec<Value>,
    pub variables: Vec<Value>,
    pub funcs: Vec<Func>,
    pub types: Vec<Type>,
}

/// A value declaration and the key it sorts by
#[derive(Debug)]
struct SortedValue {
    key: String,
    value: Value,
}

#[derive(Debug, Default)]
struct Members {
    constants: Vec<SortedValue>,
    variables: Vec<SortedValue>,
    funcs: Vec<Func>,
    methods: Vec<Func>,
}

impl Members {
    fn push_value(&mut self, is_const: bool, value: SortedValue) {
        if is_const {
            self.constants.push(value);
        } else {
            self.variables.push(value);
        }
    }
}

/// Read the exported declarations of the parsed package files
pub fn read_package(files: &[ParsedFile], examples: &[RawExample]) -> PackageDecls {
    let mut reader = Reader {
        examples,
        types: BTreeMap::new(),
        members: HashMap::new(),
        package: Members::default(),
    };

    // types first so values and functions in any file can find them
    for file in files {
        for decl in file.declarations() {
            if decl.kind() == TYPE_DECLARATION {
                reader.read_type_decl(file, decl);
            }
        }
    }
    for file in files {
        for decl in file.declarations() {
            match decl.kind() {
                CONST_DECLARATION | VAR_DECLARATION => reader.read_value_decl(file, decl),
                FUNCTION_DECLARATION => reader.read_function(file, decl),
                METHOD_DECLARATION => reader.read_method(file, decl),
                _ => {}
            }
        }
    }
    reader.finish()
}

struct Reader<'a> {
    examples: &'a [RawExample],
    /// Exported types declared in the package, by name
    types: BTreeMap<String, Type>,
    members: HashMap<String, Members>,
    package: Members,
}

impl Reader<'_> {
    fn members_of(&mut self, owner: Option<String>) -> &mut Members {
        match owner {
            Some(name) => self.members.entry(name).or_default(),
            None => &mut self.package,
        }
    }

    fn read_type_decl(&mut self, file: &ParsedFile, decl: Node) {
        let mut cursor = decl.walk();
        let specs: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|n| n.kind() == TYPE_SPEC || n.kind() == TYPE_ALIAS)
            .collect();

        for spec in specs {
            let Some(name_node) = spec.child_by_field_name(NAME_FIELD) else {
                continue;
            };
            let name = file.text(name_node).to_string();
            if !is_exported(&name) {
                continue;
            }

            let mut doc = file.doc_text(spec);
            if doc.is_empty() {
                doc = file.doc_text(decl);
            }

            let type_node = spec.child_by_field_name(TYPE_FIELD);
            let (type_, fields) = match type_node {
                Some(node) if node.kind() == STRUCT_TYPE && spec.kind() == TYPE_SPEC => {
                    ("struct".to_string(), read_fields(file, node))
                }
                _ => (file.format(spec), Vec::new()),
            };

            let signature_string = format!("type {}", render_type_spec(file, spec, type_node));
            let examples = examples_for(&name, self.examples);
            self.types.insert(
                name.clone(),
                Type {
                    name,
                    doc: to_html(&doc),
                    type_,
                    signature_string,
                    fields,
                    examples,
                    ..Default::default()
                },
            );
        }
    }

    fn read_value_decl(&mut self, file: &ParsedFile, decl: Node) {
        let is_const = decl.kind() == CONST_DECLARATION;
        let specs = value_specs(decl);

        let mut all_exported = true;
        let mut kept: Vec<(Node, Vec<Node>)> = Vec::new();
        for spec in specs {
            let names = children_by_field(spec, NAME_FIELD);
            let exported: Vec<Node> = names
                .iter()
                .copied()
                .filter(|name| is_exported(file.text(*name)))
                .collect();
            if exported.len() != names.len() {
                all_exported = false;
            }
            if !exported.is_empty() {
                kept.push((spec, exported));
            }
        }
        if kept.is_empty() {
            return;
        }

        let owner = self.value_owner(file, is_const, &kept);
        let name_count: usize = kept.iter().map(|(_, names)| names.len()).sum();
        let doc = to_html(&file.doc_text(decl));
        let signature_string = if all_exported {
            file.format(decl)
        } else {
            render_value_decl(file, decl, is_const, &kept)
        };

        let value = if name_count > 1 {
            let values = kept
                .iter()
                .flat_map(|(spec, names)| names.iter().map(move |name| (*spec, *name)))
                .map(|(spec, name)| {
                    let mut child = leaf_value(file, spec, file.text(name));
                    child.doc = file.doc_text(spec);
                    child
                })
                .collect();
            Value {
                signature_string,
                doc,
                is_group: true,
                values,
                ..Default::default()
            }
        } else {
            let (spec, names) = &kept[0];
            let mut leaf = leaf_value(file, *spec, file.text(names[0]));
            leaf.signature_string = signature_string;
            leaf.doc = doc;
            leaf
        };

        let key = if kept.len() == 1 {
            file.text(kept[0].1[0]).to_string()
        } else {
            String::new()
        };
        self.members_of(owner).push_value(is_const, SortedValue { key, value });
    }

    /// The exported local type a value declaration belongs to, if any.
    ///
    /// Only explicit spec types count; a const spec without type and values
    /// repeats the type of the spec above it.
    fn value_owner(&self, file: &ParsedFile, is_const: bool, specs: &[(Node, Vec<Node>)]) -> Option<String> {
        let mut dominant: Option<String> = None;
        let mut frequency = 0usize;
        let mut previous: Option<String> = None;

        for (spec, _) in specs {
            let name = match spec.child_by_field_name(TYPE_FIELD) {
                Some(ty) => match base_type_name(file, ty) {
                    Some((name, false)) => Some(name),
                    _ => None,
                },
                None if is_const && spec.child_by_field_name(VALUE_FIELD).is_none() => previous.clone(),
                None => None,
            };
            if let Some(name) = &name {
                if dominant.as_ref().map(|d| d != name).unwrap_or(false) {
                    return None;
                }
                dominant = Some(name.clone());
                frequency += 1;
            }
            previous = name;
        }

        let dominant = dominant?;
        let required = (specs.len() as f64 * VALUE_TYPE_THRESHOLD) as usize;
        if is_exported(&dominant) && frequency >= required && self.types.contains_key(&dominant) {
            Some(dominant)
        } else {
            None
        }
    }

    fn read_function(&mut self, file: &ParsedFile, decl: Node) {
        let Some(name_node) = decl.child_by_field_name(NAME_FIELD) else {
            return;
        };
        let name = file.text(name_node).to_string();
        if !is_exported(&name) {
            return;
        }

        let owner = self.constructor_type(file, decl);
        let func = Func {
            id: name.clone(),
            examples: examples_for(&name, self.examples),
            name,
            signature_string: func_signature(file, decl),
            doc: to_html(&file.doc_text(decl)),
            method_receiver_string: String::new(),
        };
        self.members_of(owner).funcs.push(func);
    }

    /// The type a function constructs: the only exported local type among
    /// its results, looking through pointers and slices
    fn constructor_type(&self, file: &ParsedFile, decl: Node) -> Option<String> {
        let result = decl.child_by_field_name(RESULT_FIELD)?;
        let type_params = type_parameter_names(file, decl);

        let result_types: Vec<Node> = if result.kind() == PARAMETER_LIST {
            let mut cursor = result.walk();
            let types = result
                .named_children(&mut cursor)
                .filter(|n| n.kind() == PARAMETER_DECLARATION)
                .filter_map(|n| n.child_by_field_name(TYPE_FIELD))
                .collect();
            types
        } else {
            vec![result]
        };

        let mut found: Option<String> = None;
        let mut count = 0;
        for ty in result_types {
            let ty = match ty.kind() {
                SLICE_TYPE | ARRAY_TYPE => ty.child_by_field_name(ELEMENT_FIELD).unwrap_or(ty),
                _ => ty,
            };
            let Some((name, false)) = base_type_name(file, ty) else {
                continue;
            };
            if !is_exported(&name) || PREDECLARED_TYPES.contains(&name.as_str()) || type_params.contains(&name) {
                continue;
            }
            if self.types.contains_key(&name) {
                found = Some(name);
                count += 1;
                if count > 1 {
                    break;
                }
            }
        }
        if count == 1 { found } else { None }
    }

    fn read_method(&mut self, file: &ParsedFile, decl: Node) {
        let Some(name_node) = decl.child_by_field_name(NAME_FIELD) else {
            return;
        };
        let name = file.text(name_node).to_string();
        if !is_exported(&name) {
            return;
        }
        let Some(receiver_type) = receiver_type(decl) else {
            return;
        };
        let Some((type_name, false)) = base_type_name(file, receiver_type) else {
            return;
        };
        if !self.types.contains_key(&type_name) {
            return;
        }

        let prefix = method_prefix(&name, &type_name);
        let method = Func {
            id: format!("{}.{}", type_name, name),
            examples: examples_for(&prefix, self.examples),
            name,
            signature_string: func_signature(file, decl),
            doc: to_html(&file.doc_text(decl)),
            method_receiver_string: file.text(receiver_type).to_string(),
        };
        self.members_of(Some(type_name)).methods.push(method);
    }

    fn finish(mut self) -> PackageDecls {
        let mut types = Vec::with_capacity(self.types.len());
        for (name, mut ty) in std::mem::take(&mut self.types) {
            let members = self.members.remove(&name).unwrap_or_default();
            ty.constants = sorted_values(members.constants);
            ty.variables = sorted_values(members.variables);
            ty.funcs = sorted_funcs(members.funcs);
            ty.methods = sorted_funcs(members.methods);
            types.push(ty);
        }

        PackageDecls {
            constants: sorted_values(self.package.constants),
            variables: sorted_values(self.package.variables),
            funcs: sorted_funcs(self.package.funcs),
            types,
        }
    }
}

fn sorted_values(mut values: Vec<SortedValue>) -> Vec<Value> {
    values.sort_by(|a, b| a.key.cmp(&b.key));
    values.into_iter().map(|v| v.value).collect()
}

fn sorted_funcs(mut funcs: Vec<Func>) -> Vec<Func> {
    funcs.sort_by(|a, b| a.name.cmp(&b.name));
    funcs
}

/// Name of the type at the root of a type expression, and whether it is
/// imported from another package
pub fn base_type_name(file: &ParsedFile, node: Node) -> Option<(String, bool)> {
    match node.kind() {
        TYPE_IDENTIFIER | IDENTIFIER => Some((file.text(node).to_string(), false)),
        POINTER_TYPE | PARENTHESIZED_TYPE => base_type_name(file, node.named_child(0)?),
        GENERIC_TYPE => base_type_name(file, node.child_by_field_name(TYPE_FIELD)?),
        QUALIFIED_TYPE => {
            let name = node.child_by_field_name(NAME_FIELD)?;
            Some((file.text(name).to_string(), true))
        }
        _ => None,
    }
}

/// Type of a method's receiver parameter
fn receiver_type(decl: Node) -> Option<Node> {
    let receiver = decl.child_by_field_name(RECEIVER_FIELD)?;
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == PARAMETER_DECLARATION)?;
    param.child_by_field_name(TYPE_FIELD)
}

fn type_parameter_names(file: &ParsedFile, decl: Node) -> Vec<String> {
    let Some(params) = decl.child_by_field_name(TYPE_PARAMETERS_FIELD) else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let declarations: Vec<Node> = params.named_children(&mut cursor).collect();
    declarations
        .into_iter()
        .flat_map(|d| children_by_field(d, NAME_FIELD))
        .map(|n| file.text(n).to_string())
        .collect()
}

/// Function or method declaration without its body
fn func_signature(file: &ParsedFile, decl: Node) -> String {
    match decl.child_by_field_name(BODY_FIELD) {
        Some(body) => format_range(&file.source, decl.start_byte(), body.start_byte()),
        None => file.format(decl),
    }
}

/// Specs of a const or var declaration, grouped or not
fn value_specs(decl: Node) -> Vec<Node> {
    let mut specs = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            CONST_SPEC | VAR_SPEC => specs.push(child),
            VAR_SPEC_LIST => {
                let mut inner = child.walk();
                specs.extend(child.named_children(&mut inner).filter(|n| n.kind() == VAR_SPEC));
            }
            _ => {}
        }
    }
    specs
}

/// A single named value with the initializer and type of its spec
fn leaf_value(file: &ParsedFile, spec: Node, name: &str) -> Value {
    let initializers: Vec<Node> = match spec.child_by_field_name(VALUE_FIELD) {
        Some(list) => {
            let mut cursor = list.walk();
            let exprs = list.named_children(&mut cursor).filter(|n| n.kind() != COMMENT).collect();
            exprs
        }
        None => Vec::new(),
    };
    let value = if initializers.len() == 1 {
        file.format(initializers[0])
    } else {
        String::new()
    };
    let type_ = spec
        .child_by_field_name(TYPE_FIELD)
        .map(|ty| file.format(ty))
        .unwrap_or_default();

    Value {
        name: name.to_string(),
        value,
        type_,
        ..Default::default()
    }
}

/// Node text preceded by its doc comment lines and followed by a comment
/// trailing it on the same line
fn with_comments(file: &ParsedFile, node: Node, text: String) -> String {
    let mut out = String::new();
    for comment in doc_comment_nodes(node) {
        out.push_str(file.text(comment));
        out.push('\n');
    }
    out.push_str(&text);
    if let Some(next) = node.next_named_sibling() {
        if next.kind() == COMMENT && next.start_position().row == node.end_position().row {
            out.push(' ');
            out.push_str(file.text(next));
        }
    }
    out
}

/// `names` followed by whatever the node declares after its last name
fn rename(file: &ParsedFile, node: Node, names: &[&str]) -> Option<String> {
    let all = children_by_field(node, NAME_FIELD);
    let last = all.last()?;
    let rest = format_range(&file.source, last.end_byte(), node.end_byte());
    Some(format!("{}{}", names.join(", "), rest))
}

fn indent_block(out: &mut String, text: &str) {
    for line in text.split('\n') {
        if !line.is_empty() {
            out.push('\t');
        }
        out.push_str(line);
        out.push('\n');
    }
}

/// Re-render a const/var declaration with unexported names removed
fn render_value_decl(file: &ParsedFile, decl: Node, is_const: bool, kept: &[(Node, Vec<Node>)]) -> String {
    let keyword = if is_const { "const" } else { "var" };
    let items: Vec<String> = kept
        .iter()
        .map(|(spec, names)| {
            let total = children_by_field(*spec, NAME_FIELD).len();
            let text = if names.len() == total {
                file.format(*spec)
            } else {
                let names: Vec<&str> = names.iter().map(|n| file.text(*n)).collect();
                rename(file, *spec, &names).unwrap_or_else(|| file.format(*spec))
            };
            with_comments(file, *spec, text)
        })
        .collect();

    let parenthesized = file.text(decl)[keyword.len()..].trim_start().starts_with('(');
    if !parenthesized && items.len() == 1 {
        return format!("{} {}", keyword, items[0]);
    }
    let mut out = format!("{} (\n", keyword);
    for item in &items {
        indent_block(&mut out, item);
    }
    out.push(')');
    out
}

/// Type spec text with unexported struct fields or interface methods removed
fn render_type_spec(file: &ParsedFile, spec: Node, type_node: Option<Node>) -> String {
    let Some(type_node) = type_node else {
        return file.format(spec);
    };
    if spec.kind() != TYPE_SPEC {
        return file.format(spec);
    }
    let (keyword, note, list) = match type_node.kind() {
        STRUCT_TYPE => {
            let mut cursor = type_node.walk();
            let list = type_node
                .named_children(&mut cursor)
                .find(|n| n.kind() == FIELD_DECLARATION_LIST);
            match list {
                Some(list) => ("struct", "fields", list),
                None => return file.format(spec),
            }
        }
        INTERFACE_TYPE => ("interface", "methods", type_node),
        _ => return file.format(spec),
    };

    let mut cursor = list.walk();
    let members: Vec<Node> = list.named_children(&mut cursor).filter(|n| n.kind() != COMMENT).collect();
    let mut lines = Vec::new();
    let mut filtered = false;
    for member in members {
        match render_member(file, member) {
            Some(text) => lines.push(with_comments(file, member, text)),
            None => filtered = true,
        }
    }
    if !filtered {
        return file.format(spec);
    }

    let header = format_range(&file.source, spec.start_byte(), type_node.start_byte());
    let mut out = format!("{} {} {{\n", header, keyword);
    for line in &lines {
        indent_block(&mut out, line);
    }
    out.push_str(&format!("\t// contains filtered or unexported {}\n}}", note));
    out
}

/// Text of an exported struct field or interface element, `None` when the
/// member is unexported
fn render_member(file: &ParsedFile, member: Node) -> Option<String> {
    match member.kind() {
        FIELD_DECLARATION => {
            let names = children_by_field(member, NAME_FIELD);
            if names.is_empty() {
                let (embedded, _) = base_type_name(file, member.child_by_field_name(TYPE_FIELD)?)?;
                return is_exported(&embedded).then(|| file.format(member));
            }
            let exported: Vec<&str> = names
                .iter()
                .map(|n| file.text(*n))
                .filter(|name| is_exported(name))
                .collect();
            if exported.is_empty() {
                None
            } else if exported.len() == names.len() {
                Some(file.format(member))
            } else {
                rename(file, member, &exported)
            }
        }
        METHOD_ELEM => {
            let name = member.child_by_field_name(NAME_FIELD)?;
            is_exported(file.text(name)).then(|| file.format(member))
        }
        _ => Some(file.format(member)),
    }
}

/// Fields of a struct with exactly one exported name; embedded fields and
/// multi-name declarations are skipped
fn read_fields(file: &ParsedFile, struct_node: Node) -> Vec<Field> {
    let mut cursor = struct_node.walk();
    let Some(list) = struct_node
        .named_children(&mut cursor)
        .find(|n| n.kind() == FIELD_DECLARATION_LIST)
    else {
        return Vec::new();
    };

    let mut list_cursor = list.walk();
    let declarations: Vec<Node> = list
        .named_children(&mut list_cursor)
        .filter(|n| n.kind() == FIELD_DECLARATION)
        .collect();

    let mut fields = Vec::new();
    for declaration in declarations {
        let names = children_by_field(declaration, NAME_FIELD);
        if names.len() != 1 {
            continue;
        }
        let name = file.text(names[0]);
        if !is_exported(name) {
            continue;
        }
        fields.push(Field {
            name: name.to_string(),
            type_: declaration
                .child_by_field_name(TYPE_FIELD)
                .map(|ty| file.format(ty))
                .unwrap_or_default(),
            doc: file.doc_text(declaration),
            struct_tag: declaration
                .child_by_field_name(TAG_FIELD)
                .map(|tag| file.text(tag).to_string())
                .unwrap_or_default(),
        });
    }
    fields
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
