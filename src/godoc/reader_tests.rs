use super::*;
use crate::godoc::parser::GoParser;

const SHAPES: &str = r#"// Package shapes draws things.
package shapes

import (
	"errors"
	"io"
)

// Kind of shape.
type Kind int

// Shape kinds.
const (
	Circle Kind = iota
	Square
	hidden
)

// Max is the biggest size.
const Max = 10

const (
	A = 1
	B = 2
)

var ErrBad = errors.New("bad")

// Shape is drawable.
type Shape struct {
	// Name of the shape.
	Name string `json:"name"`
	X, Y int
	io.Reader
	size int
}

// NewShape makes one.
func NewShape(name string) *Shape { return &Shape{Name: name} }

// All lists shapes.
func All() []Shape { return nil }

func Pair() (*Shape, Kind) { return nil, 0 }

// Area computes area.
func (s *Shape) Area() float64 {
	return 0
}

func (s *Shape) grow() {}

func helper() {}

type hiddenType struct{}

func (h hiddenType) Visible() {}
"#;

fn parse(name: &str, src: &str) -> ParsedFile {
    GoParser::new().unwrap().parse_file(name, src.as_bytes()).unwrap()
}

fn read(src: &str) -> PackageDecls {
    read_package(&[parse("shapes.go", src)], &[])
}

fn find_type<'a>(decls: &'a PackageDecls, name: &str) -> &'a Type {
    decls
        .types
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("type {} not found", name))
}

#[test]
fn test_only_exported_types_are_listed() {
    let decls = read(SHAPES);
    let names: Vec<&str> = decls.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Kind", "Shape"]);

    let kind = find_type(&decls, "Kind");
    assert_eq!(kind.type_, "Kind int");
    assert_eq!(kind.signature_string, "type Kind int");
    assert_eq!(kind.doc, "<p>\nKind of shape.\n</p>\n");
    assert!(kind.fields.is_empty());
}

#[test]
fn test_grouped_constants() {
    let decls = read(SHAPES);

    // A and B are declared together: one group with two children
    assert_eq!(decls.constants.len(), 2);
    let group = &decls.constants[0];
    assert!(group.is_group);
    assert!(group.name.is_empty());
    let names: Vec<&str> = group.values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(group.values[1].value, "2");
    assert_eq!(group.signature_string, "const (\n\tA = 1\n\tB = 2\n)");

    // Max is a leaf
    let max = &decls.constants[1];
    assert!(!max.is_group);
    assert!(max.values.is_empty());
    assert_eq!(max.name, "Max");
    assert_eq!(max.value, "10");
    assert_eq!(max.signature_string, "const Max = 10");
    assert_eq!(max.doc, "<p>\nMax is the biggest size.\n</p>\n");
}

#[test]
fn test_typed_constants_attach_to_their_type() {
    let decls = read(SHAPES);
    let kind = find_type(&decls, "Kind");
    assert_eq!(kind.constants.len(), 1);

    let group = &kind.constants[0];
    assert!(group.is_group);
    assert_eq!(group.values.len(), 2);
    assert_eq!(group.values[0].name, "Circle");
    assert_eq!(group.values[0].type_, "Kind");
    assert_eq!(group.values[0].value, "iota");
    assert_eq!(group.values[1].name, "Square");
    assert_eq!(group.values[1].value, "");
    assert_eq!(group.signature_string, "const (\n\tCircle Kind = iota\n\tSquare\n)");
    assert_eq!(group.doc, "<p>\nShape kinds.\n</p>\n");
}

#[test]
fn test_variables() {
    let decls = read(SHAPES);
    assert_eq!(decls.variables.len(), 1);
    assert_eq!(decls.variables[0].name, "ErrBad");
    assert_eq!(decls.variables[0].value, "errors.New(\"bad\")");
    assert_eq!(decls.variables[0].type_, "");
}

#[test]
fn test_struct_fields_and_signature() {
    let decls = read(SHAPES);
    let shape = find_type(&decls, "Shape");
    assert_eq!(shape.type_, "struct");

    assert_eq!(shape.fields.len(), 1);
    let field = &shape.fields[0];
    assert_eq!(field.name, "Name");
    assert_eq!(field.type_, "string");
    assert_eq!(field.doc, "Name of the shape.\n");
    assert_eq!(field.struct_tag, "`json:\"name\"`");

    assert_eq!(
        shape.signature_string,
        "type Shape struct {\n\t// Name of the shape.\n\tName string `json:\"name\"`\n\tX, Y int\n\tio.Reader\n\t// contains filtered or unexported fields\n}"
    );
}

#[test]
fn test_constructors_and_methods() {
    let decls = read(SHAPES);
    let shape = find_type(&decls, "Shape");

    let funcs: Vec<&str> = shape.funcs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(funcs, vec!["All", "NewShape"]);
    assert_eq!(shape.funcs[1].signature_string, "func NewShape(name string) *Shape");
    assert_eq!(shape.funcs[1].id, "NewShape");

    assert_eq!(shape.methods.len(), 1);
    let area = &shape.methods[0];
    assert_eq!(area.id, "Shape.Area");
    assert_eq!(area.method_receiver_string, "*Shape");
    assert_eq!(area.signature_string, "func (s *Shape) Area() float64");
    assert_eq!(area.doc, "<p>\nArea computes area.\n</p>\n");

    // two candidate result types: stays at package level
    let package_funcs: Vec<&str> = decls.funcs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(package_funcs, vec!["Pair"]);
}

#[test]
fn test_values_need_a_dominant_type() {
    let src = "package p\n\ntype Kind int\n\nconst (\n\tA Kind = 1\n\tB = 2\n\tC = 3\n\tD Kind = 4\n)\n\nconst (\n\tE Kind = 1\n\tF string = \"f\"\n)\n";
    let decls = read(src);
    assert!(find_type(&decls, "Kind").constants.is_empty());
    assert_eq!(decls.constants.len(), 2);
}

#[test]
fn test_values_of_unexported_types_stay_at_package_level() {
    let src = "package p\n\ntype level int\n\nconst Debug level = 0\n";
    let decls = read(src);
    assert!(decls.types.is_empty());
    assert_eq!(decls.constants.len(), 1);
    assert_eq!(decls.constants[0].name, "Debug");
    assert_eq!(decls.constants[0].type_, "level");
}

#[test]
fn test_interface_methods_are_filtered() {
    let src = "package p\n\n// Doer does.\ntype Doer interface {\n\tDo()\n\tundo()\n}\n\ntype Closer interface {\n\tClose() error\n}\n";
    let decls = read(src);
    let doer = find_type(&decls, "Doer");
    assert_eq!(
        doer.signature_string,
        "type Doer interface {\n\tDo()\n\t// contains filtered or unexported methods\n}"
    );
    assert_eq!(doer.type_, "Doer interface {\n\tDo()\n\tundo()\n}");

    let closer = find_type(&decls, "Closer");
    assert_eq!(closer.signature_string, "type Closer interface {\n\tClose() error\n}");
}

#[test]
fn test_grouped_type_declaration_docs() {
    let src = "package p\n\n// Group doc.\ntype (\n\t// A is a.\n\tA int\n\tB string\n)\n";
    let decls = read(src);
    assert_eq!(find_type(&decls, "A").doc, "<p>\nA is a.\n</p>\n");
    assert_eq!(find_type(&decls, "A").signature_string, "type A int");
    assert_eq!(find_type(&decls, "B").doc, "<p>\nGroup doc.\n</p>\n");
}

#[test]
fn test_declarations_span_files() {
    let types = parse("types.go", "package p\n\ntype Client struct{}\n");
    let funcs = parse(
        "client.go",
        "package p\n\nfunc NewClient() *Client { return nil }\n\nfunc (c Client) Do() {}\n",
    );
    let decls = read_package(&[funcs, types], &[]);
    let client = find_type(&decls, "Client");
    assert_eq!(client.funcs.len(), 1);
    assert_eq!(client.methods.len(), 1);
    assert_eq!(client.methods[0].method_receiver_string, "Client");
    assert!(decls.funcs.is_empty());
}

#[test]
fn test_examples_are_attached() {
    let body = "{\n    run()\n}";
    let examples: Vec<RawExample> = ["Shape", "NewShape", "Area_Shape", "Shape_Area"]
        .iter()
        .map(|name| RawExample {
            name: name.to_string(),
            doc: String::new(),
            code: body.to_string(),
            output: String::new(),
        })
        .collect();
    let decls = read_package(&[parse("shapes.go", SHAPES)], &examples);
    let shape = find_type(&decls, "Shape");

    let type_examples: Vec<&str> = shape.examples.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(type_examples, vec!["ExampleShape--"]);
    assert_eq!(shape.funcs[1].examples[0].id, "ExampleNewShape--");
    assert_eq!(shape.methods[0].examples[0].id, "ExampleArea_Shape--");
    assert_eq!(shape.methods[0].examples[0].code, "\nrun()\n");
}
