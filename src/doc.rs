//! Documentation model
//!
//! The data structure handed to page templates. Everything here is a plain
//! owned tree that serializes with the field names the templates expect.

use serde::{Deserialize, Serialize};

/// A full module page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Documentation {
    pub package_name: String,
    pub module_version: String,
    pub versions: Vec<String>,
    pub module_root: String,
    pub import_path: String,
    /// Package doc comment rendered to HTML
    pub package_doc: String,
    pub constants: Vec<Value>,
    pub variables: Vec<Value>,
    pub funcs: Vec<Func>,
    pub types: Vec<Type>,
    pub files: Vec<File>,
    pub subdirs: Vec<Subdir>,
    pub examples: Vec<Example>,
    /// Closest go.mod rendered to HTML, empty when the archive has none
    pub go_mod: String,
    pub nav_links: Vec<String>,
}

/// One or a group of constants/variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Value {
    pub signature_string: String,
    pub name: String,
    pub value: String,
    #[serde(rename = "Type")]
    pub type_: String,
    pub doc: String,
    pub is_group: bool,
    pub values: Vec<Value>,
}

/// A function or a method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Func {
    /// Name for funcs; TypeName.FuncName for methods
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub signature_string: String,
    pub doc: String,
    pub method_receiver_string: String,
    pub examples: Vec<Example>,
}

/// A runnable example attached to the package, a type or a function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Example {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub doc: String,
    pub code: String,
    pub output: String,
}

/// A type declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Type {
    pub name: String,
    pub doc: String,
    /// "struct" for struct types, otherwise the formatted type spec
    #[serde(rename = "Type")]
    pub type_: String,
    pub signature_string: String,
    pub fields: Vec<Field>,
    pub examples: Vec<Example>,
    pub methods: Vec<Func>,
    pub funcs: Vec<Func>,
    pub constants: Vec<Value>,
    pub variables: Vec<Value>,
}

/// A struct field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_: String,
    pub doc: String,
    pub struct_tag: String,
}

/// A go file inside the package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct File {
    pub name: String,
}

/// A potential sub package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subdir {
    pub name: String,
    pub synopsis: String,
    pub link: String,
}
