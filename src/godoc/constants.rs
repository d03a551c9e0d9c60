//! Tree-sitter node kind constants for Go parsing
//!
//! String constants for the tree-sitter-go node kinds and field names used
//! when reading declarations out of a syntax tree.

/// Example: `package zap`
pub const PACKAGE_CLAUSE: &str = "package_clause";

/// The name inside a package clause
pub const PACKAGE_IDENTIFIER: &str = "package_identifier";

/// Example: `func New() *Logger { ... }`
pub const FUNCTION_DECLARATION: &str = "function_declaration";

/// Example: `func (l *Logger) Info(msg string) { ... }`
pub const METHOD_DECLARATION: &str = "method_declaration";

/// Example: `type Level int8` or a parenthesized group of type specs
pub const TYPE_DECLARATION: &str = "type_declaration";

/// Example: `Level int8` inside a type declaration
pub const TYPE_SPEC: &str = "type_spec";

/// Example: `Alias = Level` inside a type declaration
pub const TYPE_ALIAS: &str = "type_alias";

/// Example: `const DebugLevel Level = iota - 1`
pub const CONST_DECLARATION: &str = "const_declaration";

pub const CONST_SPEC: &str = "const_spec";

/// Example: `var ErrClosed = errors.New("closed")`
pub const VAR_DECLARATION: &str = "var_declaration";

pub const VAR_SPEC: &str = "var_spec";

/// Parenthesized list of var specs (newer grammar versions wrap them)
pub const VAR_SPEC_LIST: &str = "var_spec_list";

pub const STRUCT_TYPE: &str = "struct_type";

pub const FIELD_DECLARATION_LIST: &str = "field_declaration_list";

/// Example: `Name string `json:"name"``
pub const FIELD_DECLARATION: &str = "field_declaration";

pub const PARAMETER_LIST: &str = "parameter_list";

pub const PARAMETER_DECLARATION: &str = "parameter_declaration";

pub const VARIADIC_PARAMETER_DECLARATION: &str = "variadic_parameter_declaration";

pub const POINTER_TYPE: &str = "pointer_type";

pub const SLICE_TYPE: &str = "slice_type";

pub const ARRAY_TYPE: &str = "array_type";

/// Example: `Set[T]`
pub const GENERIC_TYPE: &str = "generic_type";

/// Example: `io.Reader`
pub const QUALIFIED_TYPE: &str = "qualified_type";

pub const PARENTHESIZED_TYPE: &str = "parenthesized_type";

pub const INTERFACE_TYPE: &str = "interface_type";

/// Example: `Write(p []byte) (int, error)` inside an interface
pub const METHOD_ELEM: &str = "method_elem";

pub const TYPE_IDENTIFIER: &str = "type_identifier";

pub const IDENTIFIER: &str = "identifier";

pub const COMMENT: &str = "comment";

// Field names
pub const NAME_FIELD: &str = "name";
pub const TYPE_FIELD: &str = "type";
pub const VALUE_FIELD: &str = "value";
pub const TAG_FIELD: &str = "tag";
pub const BODY_FIELD: &str = "body";
pub const RECEIVER_FIELD: &str = "receiver";
pub const PARAMETERS_FIELD: &str = "parameters";
pub const RESULT_FIELD: &str = "result";
pub const TYPE_PARAMETERS_FIELD: &str = "type_parameters";
pub const ELEMENT_FIELD: &str = "element";

/// Types every Go package can refer to without declaring them
pub const PREDECLARED_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
    "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];
