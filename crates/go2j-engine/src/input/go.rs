//! Tree-sitter based Go reader.

use crate::ast::*;
use crate::traits::ReadError;
use tree_sitter::{Node, Parser, Tree};

/// Parse Go source into a syntax tree.
pub fn read_go(source: &str) -> Result<File, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_go::language().into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))?;

    let ctx = ReadContext::new(source);
    ctx.read_file(&tree)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

struct ReadContext<'a> {
    source: &'a str,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ReadError> {
        node.child_by_field_name(name)
            .ok_or_else(|| ReadError::Parse(format!("{} missing {}", node.kind(), name)))
    }

    fn read_file(&self, tree: &Tree) -> Result<File, ReadError> {
        let root = tree.root_node();

        if root.has_error() {
            return Err(ReadError::Parse("syntax error in source".into()));
        }

        let mut file = File::default();
        for child in named_children(root) {
            match child.kind() {
                "package_clause" => {
                    let name = named_children(child)
                        .into_iter()
                        .next()
                        .ok_or_else(|| ReadError::Parse("package clause missing name".into()))?;
                    file.package = self.node_text(name).to_string();
                }
                "import_declaration" => self.read_imports(child, &mut file.imports)?,
                "function_declaration" | "method_declaration" => {
                    file.decls.push(Decl::Func(self.read_func_decl(child)?));
                }
                "var_declaration" | "const_declaration" | "type_declaration" => {
                    file.decls.push(Decl::Gen(self.read_gen_decl(child)?));
                }
                _ => {}
            }
        }

        if file.package.is_empty() {
            return Err(ReadError::Parse("missing package clause".into()));
        }
        Ok(file)
    }

    fn read_imports(&self, node: Node, imports: &mut Vec<ImportSpec>) -> Result<(), ReadError> {
        for child in named_children(node) {
            match child.kind() {
                "import_spec" => {
                    let path = self.field(child, "path")?;
                    imports.push(ImportSpec {
                        name: child
                            .child_by_field_name("name")
                            .map(|name| self.node_text(name).to_string()),
                        path: unquote(self.node_text(path)).to_string(),
                    });
                }
                "import_spec_list" => self.read_imports(child, imports)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn read_func_decl(&self, node: Node) -> Result<FuncDecl, ReadError> {
        let name = self.field(node, "name")?;
        let receiver = match node.child_by_field_name("receiver") {
            Some(list) => self.read_params(list)?.into_iter().next(),
            None => None,
        };
        let body = match node.child_by_field_name("body") {
            Some(body) => Some(self.read_block(body)?),
            None => None,
        };
        Ok(FuncDecl {
            receiver,
            name: self.node_text(name).to_string(),
            ty: self.read_signature(node)?,
            body,
        })
    }

    /// Parameters and results of a function declaration, literal or type.
    fn read_signature(&self, node: Node) -> Result<FuncType, ReadError> {
        let params = match node.child_by_field_name("parameters") {
            Some(list) => self.read_params(list)?,
            None => Vec::new(),
        };
        let results = match node.child_by_field_name("result") {
            Some(result) if result.kind() == "parameter_list" => self.read_params(result)?,
            Some(result) => vec![Field::embedded(self.read_expr(result)?)],
            None => Vec::new(),
        };
        Ok(FuncType { params, results })
    }

    fn read_params(&self, node: Node) -> Result<Vec<Field>, ReadError> {
        let mut fields = Vec::new();
        for child in named_children(node) {
            let variadic = match child.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let ty = self.read_expr(self.field(child, "type")?)?;
            let ty = if variadic {
                Expr::Ellipsis(Box::new(ty))
            } else {
                ty
            };
            let names = field_children(child, "name")
                .into_iter()
                .map(|name| self.node_text(name).to_string())
                .collect();
            fields.push(Field { names, ty });
        }
        Ok(fields)
    }

    fn read_gen_decl(&self, node: Node) -> Result<GenDecl, ReadError> {
        let kind = match node.kind() {
            "var_declaration" => GenKind::Var,
            "const_declaration" => GenKind::Const,
            _ => GenKind::Type,
        };
        let mut specs = Vec::new();
        self.read_specs(node, &mut specs)?;
        Ok(GenDecl {
            kind,
            specs,
            grouped: has_token(node, "("),
        })
    }

    fn read_specs(&self, node: Node, specs: &mut Vec<Spec>) -> Result<(), ReadError> {
        for child in named_children(node) {
            match child.kind() {
                "var_spec" | "const_spec" => specs.push(Spec::Value(self.read_value_spec(child)?)),
                "type_spec" | "type_alias" => {
                    let name = self.field(child, "name")?;
                    specs.push(Spec::Type(TypeSpec {
                        name: self.node_text(name).to_string(),
                        ty: self.read_expr(self.field(child, "type")?)?,
                        alias: child.kind() == "type_alias",
                    }));
                }
                "var_spec_list" => self.read_specs(child, specs)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn read_value_spec(&self, node: Node) -> Result<ValueSpec, ReadError> {
        let names = field_children(node, "name")
            .into_iter()
            .map(|name| self.node_text(name).to_string())
            .collect();
        let ty = match node.child_by_field_name("type") {
            Some(ty) => Some(self.read_expr(ty)?),
            None => None,
        };
        let values = match node.child_by_field_name("value") {
            Some(list) => self.read_expr_list(list)?,
            None => Vec::new(),
        };
        Ok(ValueSpec { names, ty, values })
    }

    fn read_block(&self, node: Node) -> Result<Block, ReadError> {
        let mut stmts = Vec::new();
        self.read_stmts_into(named_children(node), &mut stmts)?;
        Ok(stmts)
    }

    fn read_stmts_into(&self, nodes: Vec<Node>, stmts: &mut Block) -> Result<(), ReadError> {
        for child in nodes {
            if child.kind() == "statement_list" {
                self.read_stmts_into(named_children(child), stmts)?;
            } else if let Some(stmt) = self.read_stmt(child)? {
                stmts.push(stmt);
            }
        }
        Ok(())
    }

    fn read_stmt(&self, node: Node) -> Result<Option<Stmt>, ReadError> {
        let stmt = match node.kind() {
            "comment" => return Ok(None),

            "expression_statement" => match named_children(node).into_iter().next() {
                Some(expr) => Stmt::Expr(self.read_expr(expr)?),
                None => Stmt::Empty,
            },
            "inc_statement" | "dec_statement" => {
                let target = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse(format!("{} missing operand", node.kind())))?;
                Stmt::IncDec {
                    target: self.read_expr(target)?,
                    inc: node.kind() == "inc_statement",
                }
            }
            "assignment_statement" => {
                let operator = self.node_text(self.field(node, "operator")?);
                let op = match operator {
                    "=" => AssignOp::Assign,
                    compound => {
                        let token = compound.trim_end_matches('=');
                        let op = BinaryOp::from_token(token).ok_or_else(|| {
                            ReadError::Unsupported(format!("assignment operator '{}'", compound))
                        })?;
                        AssignOp::Compound(op)
                    }
                };
                Stmt::Assign {
                    lhs: self.read_expr_list(self.field(node, "left")?)?,
                    op,
                    rhs: self.read_expr_list(self.field(node, "right")?)?,
                }
            }
            "short_var_declaration" => Stmt::Assign {
                lhs: self.read_expr_list(self.field(node, "left")?)?,
                op: AssignOp::Define,
                rhs: self.read_expr_list(self.field(node, "right")?)?,
            },
            "labeled_statement" => {
                let label = self.field(node, "label")?;
                let inner = named_children(node)
                    .into_iter()
                    .find(|child| child.id() != label.id());
                let stmt = match inner {
                    Some(inner) => self.read_stmt(inner)?.unwrap_or(Stmt::Empty),
                    None => Stmt::Empty,
                };
                Stmt::Labeled {
                    label: self.node_text(label).to_string(),
                    stmt: Box::new(stmt),
                }
            }
            "break_statement" => self.read_branch(node, BranchKind::Break),
            "continue_statement" => self.read_branch(node, BranchKind::Continue),
            "goto_statement" => self.read_branch(node, BranchKind::Goto),
            "fallthrough_statement" => Stmt::Branch {
                kind: BranchKind::Fallthrough,
                label: None,
            },
            "return_statement" => match named_children(node).into_iter().next() {
                Some(list) => Stmt::Return(self.read_expr_list(list)?),
                None => Stmt::Return(Vec::new()),
            },
            "go_statement" | "defer_statement" => {
                let call = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse(format!("{} missing call", node.kind())))?;
                let call = self.read_expr(call)?;
                if node.kind() == "go_statement" {
                    Stmt::Go(call)
                } else {
                    Stmt::Defer(call)
                }
            }
            "block" => Stmt::Block(self.read_block(node)?),
            "if_statement" => self.read_if(node)?,
            "for_statement" => self.read_for(node)?,
            "expression_switch_statement" => self.read_switch(node)?,
            "var_declaration" | "const_declaration" | "type_declaration" => {
                Stmt::Decl(self.read_gen_decl(node)?)
            }
            "empty_statement" => Stmt::Empty,
            kind => Stmt::Unsupported(kind.to_string()),
        };
        Ok(Some(stmt))
    }

    fn read_branch(&self, node: Node, kind: BranchKind) -> Stmt {
        let label = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "label_name")
            .map(|label| self.node_text(label).to_string());
        Stmt::Branch { kind, label }
    }

    fn read_optional_stmt(&self, node: Node, field: &str) -> Result<Option<Box<Stmt>>, ReadError> {
        match node.child_by_field_name(field) {
            Some(child) => Ok(self.read_stmt(child)?.map(Box::new)),
            None => Ok(None),
        }
    }

    fn read_if(&self, node: Node) -> Result<Stmt, ReadError> {
        let els = match node.child_by_field_name("alternative") {
            Some(alt) if alt.kind() == "if_statement" => Some(Box::new(self.read_if(alt)?)),
            Some(alt) => Some(Box::new(Stmt::Block(self.read_block(alt)?))),
            None => None,
        };
        Ok(Stmt::If {
            init: self.read_optional_stmt(node, "initializer")?,
            cond: self.read_expr(self.field(node, "condition")?)?,
            then: self.read_block(self.field(node, "consequence")?)?,
            els,
        })
    }

    fn read_for(&self, node: Node) -> Result<Stmt, ReadError> {
        let body_node = self.field(node, "body")?;
        let body = self.read_block(body_node)?;
        let header = named_children(node)
            .into_iter()
            .find(|child| child.id() != body_node.id());

        let Some(header) = header else {
            return Ok(Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
            });
        };

        match header.kind() {
            "for_clause" => {
                let cond = match header.child_by_field_name("condition") {
                    Some(cond) => Some(self.read_expr(cond)?),
                    None => None,
                };
                Ok(Stmt::For {
                    init: self.read_optional_stmt(header, "initializer")?,
                    cond,
                    post: self.read_optional_stmt(header, "update")?,
                    body,
                })
            }
            "range_clause" => {
                let mut targets = match header.child_by_field_name("left") {
                    Some(left) => self.read_expr_list(left)?.into_iter(),
                    None => Vec::new().into_iter(),
                };
                Ok(Stmt::Range {
                    key: targets.next(),
                    value: targets.next(),
                    define: has_token(header, ":="),
                    iterable: self.read_expr(self.field(header, "right")?)?,
                    body,
                })
            }
            _ => Ok(Stmt::For {
                init: None,
                cond: Some(self.read_expr(header)?),
                post: None,
                body,
            }),
        }
    }

    fn read_switch(&self, node: Node) -> Result<Stmt, ReadError> {
        let tag = match node.child_by_field_name("value") {
            Some(value) => Some(self.read_expr(value)?),
            None => None,
        };
        let mut cases = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "expression_case" => {
                    let values_node = self.field(child, "value")?;
                    let mut body = Vec::new();
                    let stmts = named_children(child)
                        .into_iter()
                        .filter(|stmt| stmt.id() != values_node.id())
                        .collect();
                    self.read_stmts_into(stmts, &mut body)?;
                    cases.push(CaseClause {
                        values: self.read_expr_list(values_node)?,
                        body,
                    });
                }
                "default_case" => {
                    let mut body = Vec::new();
                    self.read_stmts_into(named_children(child), &mut body)?;
                    cases.push(CaseClause {
                        values: Vec::new(),
                        body,
                    });
                }
                _ => {}
            }
        }
        Ok(Stmt::Switch {
            init: self.read_optional_stmt(node, "initializer")?,
            tag,
            cases,
        })
    }

    fn read_expr_list(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        if node.kind() != "expression_list" {
            return Ok(vec![self.read_expr(node)?]);
        }
        named_children(node)
            .into_iter()
            .map(|child| self.read_expr(child))
            .collect()
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        let expr = match node.kind() {
            // Identifiers
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier"
            | "true" | "false" | "nil" | "iota" => Expr::ident(self.node_text(node)),

            // Literals
            "int_literal" => self.literal(node, LitKind::Int),
            "float_literal" => self.literal(node, LitKind::Float),
            "imaginary_literal" => self.literal(node, LitKind::Imag),
            "rune_literal" => self.literal(node, LitKind::Char),
            "interpreted_string_literal" => self.literal(node, LitKind::String),
            "raw_string_literal" => self.literal(node, LitKind::RawString),
            "composite_literal" => {
                let body = self.field(node, "body")?;
                Expr::Composite {
                    ty: Some(Box::new(self.read_expr(self.field(node, "type")?)?)),
                    elts: self.read_literal_elements(body)?,
                }
            }
            "literal_value" => Expr::Composite {
                ty: None,
                elts: self.read_literal_elements(node)?,
            },
            "func_literal" => Expr::FuncLit {
                ty: self.read_signature(node)?,
                body: self.read_block(self.field(node, "body")?)?,
            },

            // Expressions
            "parenthesized_expression" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse("empty parenthesized expression".into()))?;
                Expr::Paren(Box::new(self.read_expr(inner)?))
            }
            "call_expression" => self.read_call(node)?,
            "type_conversion_expression" => Expr::Call {
                func: Box::new(self.read_expr(self.field(node, "type")?)?),
                args: vec![self.read_expr(self.field(node, "operand")?)?],
                spread: false,
            },
            "selector_expression" => Expr::Selector {
                base: Box::new(self.read_expr(self.field(node, "operand")?)?),
                field: self.node_text(self.field(node, "field")?).to_string(),
            },
            "index_expression" => Expr::Index {
                base: Box::new(self.read_expr(self.field(node, "operand")?)?),
                index: Box::new(self.read_expr(self.field(node, "index")?)?),
            },
            "slice_expression" => Expr::Slice {
                base: Box::new(self.read_expr(self.field(node, "operand")?)?),
                low: self.read_optional_expr(node, "start")?,
                high: self.read_optional_expr(node, "end")?,
            },
            "type_assertion_expression" => Expr::TypeAssert {
                base: Box::new(self.read_expr(self.field(node, "operand")?)?),
                ty: self.read_optional_expr(node, "type")?,
            },
            "unary_expression" => {
                let operator = self.node_text(self.field(node, "operator")?);
                let operand = Box::new(self.read_expr(self.field(node, "operand")?)?);
                if operator == "*" {
                    Expr::Star(operand)
                } else {
                    let op = UnaryOp::from_token(operator).ok_or_else(|| {
                        ReadError::Unsupported(format!("unary operator '{}'", operator))
                    })?;
                    Expr::Unary { op, operand }
                }
            }
            "binary_expression" => {
                let operator = self.node_text(self.field(node, "operator")?);
                let op = BinaryOp::from_token(operator)
                    .ok_or_else(|| ReadError::Unsupported(format!("operator '{}'", operator)))?;
                Expr::binary(
                    self.read_expr(self.field(node, "left")?)?,
                    op,
                    self.read_expr(self.field(node, "right")?)?,
                )
            }

            // Types
            "qualified_type" => Expr::selector(
                Expr::ident(self.node_text(self.field(node, "package")?)),
                self.node_text(self.field(node, "name")?),
            ),
            "pointer_type" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse("pointer type missing element".into()))?;
                Expr::pointer(self.read_expr(inner)?)
            }
            "slice_type" | "implicit_length_array_type" => {
                Expr::slice_of(self.read_expr(self.field(node, "element")?)?)
            }
            "array_type" => Expr::ArrayType {
                len: Some(Box::new(self.read_expr(self.field(node, "length")?)?)),
                elem: Box::new(self.read_expr(self.field(node, "element")?)?),
            },
            "map_type" => Expr::map_of(
                self.read_expr(self.field(node, "key")?)?,
                self.read_expr(self.field(node, "value")?)?,
            ),
            "channel_type" => Expr::ChanType(Box::new(self.read_expr(self.field(node, "value")?)?)),
            "function_type" => Expr::FuncType(Box::new(self.read_signature(node)?)),
            "struct_type" => Expr::StructType(self.read_struct_fields(node)?),
            "interface_type" => Expr::InterfaceType(self.read_interface_members(node)?),
            "parenthesized_type" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse("empty parenthesized type".into()))?;
                self.read_expr(inner)?
            }
            "generic_type" => self.read_expr(self.field(node, "type")?)?,

            kind => Expr::Unsupported(kind.to_string()),
        };
        Ok(expr)
    }

    fn read_optional_expr(&self, node: Node, field: &str) -> Result<Option<Box<Expr>>, ReadError> {
        match node.child_by_field_name(field) {
            Some(child) => Ok(Some(Box::new(self.read_expr(child)?))),
            None => Ok(None),
        }
    }

    fn literal(&self, node: Node, kind: LitKind) -> Expr {
        Expr::BasicLit {
            kind,
            value: self.node_text(node).to_string(),
        }
    }

    fn read_call(&self, node: Node) -> Result<Expr, ReadError> {
        let func = self.read_expr(self.field(node, "function")?)?;
        let mut args = Vec::new();
        let mut spread = false;
        if let Some(list) = node.child_by_field_name("arguments") {
            spread = has_token(list, "...");
            for arg in named_children(list) {
                if arg.kind() == "variadic_argument" {
                    spread = true;
                    if let Some(inner) = named_children(arg).into_iter().next() {
                        args.push(self.read_expr(inner)?);
                    }
                } else {
                    args.push(self.read_expr(arg)?);
                }
            }
        }
        Ok(Expr::Call {
            func: Box::new(func),
            args,
            spread,
        })
    }

    fn read_literal_elements(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        named_children(node)
            .into_iter()
            .map(|child| self.read_literal_element(child))
            .collect()
    }

    fn read_literal_element(&self, node: Node) -> Result<Expr, ReadError> {
        match node.kind() {
            "keyed_element" => {
                let parts = named_children(node);
                let [key, value] = parts.as_slice() else {
                    return Err(ReadError::UnexpectedNode {
                        expected: "key and value".into(),
                        got: format!("{} children", parts.len()),
                    });
                };
                Ok(Expr::KeyValue {
                    key: Box::new(self.read_literal_element(*key)?),
                    value: Box::new(self.read_literal_element(*value)?),
                })
            }
            "literal_element" => {
                let inner = named_children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ReadError::Parse("empty literal element".into()))?;
                self.read_expr(inner)
            }
            _ => self.read_expr(node),
        }
    }

    fn read_struct_fields(&self, node: Node) -> Result<Vec<Field>, ReadError> {
        let mut fields = Vec::new();
        let Some(list) = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "field_declaration_list")
        else {
            return Ok(fields);
        };
        for decl in named_children(list) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let mut ty = self.read_expr(self.field(decl, "type")?)?;
            let names: Vec<String> = field_children(decl, "name")
                .into_iter()
                .map(|name| self.node_text(name).to_string())
                .collect();
            if names.is_empty() && has_token(decl, "*") {
                ty = Expr::pointer(ty);
            }
            fields.push(Field { names, ty });
        }
        Ok(fields)
    }

    fn read_interface_members(&self, node: Node) -> Result<Vec<Field>, ReadError> {
        let mut members = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    let name = self.field(child, "name")?;
                    members.push(Field::named(
                        self.node_text(name),
                        Expr::FuncType(Box::new(self.read_signature(child)?)),
                    ));
                }
                "type_elem" | "constraint_elem" => {
                    if let Some(inner) = named_children(child).into_iter().next() {
                        members.push(Field::embedded(self.read_expr(inner)?));
                    }
                }
                _ => members.push(Field::embedded(self.read_expr(child)?)),
            }
        }
        Ok(members)
    }
}

/// Strip Go string quotes from an import path.
fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_imports() {
        let file = read_go(
            r#"
package main

import (
    "fmt"
    t "time"
)
"#,
        )
        .unwrap();
        assert_eq!(file.package, "main");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "fmt");
        assert_eq!(file.imports[1].name.as_deref(), Some("t"));
        assert_eq!(file.imports[1].path, "time");
    }

    #[test]
    fn test_function_signature() {
        let file = read_go("package p\n\nfunc Add(a, b int) int { return a + b }\n").unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name, "Add");
        assert_eq!(func.ty.params.len(), 1);
        assert_eq!(func.ty.params[0].names, vec!["a", "b"]);
        assert_eq!(func.ty.first_result(), Some(&Expr::ident("int")));
        match &func.body.as_deref().unwrap()[0] {
            Stmt::Return(values) => {
                assert!(matches!(values[0], Expr::Binary { op: BinaryOp::Add, .. }));
            }
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn test_method_receiver() {
        let file = read_go("package p\n\nfunc (c *Circle) Area() float64 { return 0 }\n").unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected method");
        };
        let receiver = func.receiver.as_ref().unwrap();
        assert_eq!(receiver.names, vec!["c"]);
        assert_eq!(receiver.ty, Expr::pointer(Expr::ident("Circle")));
    }

    #[test]
    fn test_struct_with_embedded_field() {
        let source = "package p\n\ntype Circle struct {\n\tShape\n\tR, D float64\n}\n";
        let file = read_go(source).unwrap();
        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected type declaration");
        };
        let Spec::Type(spec) = &decl.specs[0] else {
            panic!("expected type spec");
        };
        match &spec.ty {
            Expr::StructType(fields) => {
                assert!(fields[0].is_embedded());
                assert_eq!(fields[0].ty, Expr::ident("Shape"));
                assert_eq!(fields[1].names, vec!["R", "D"]);
            }
            _ => panic!("expected struct type"),
        }
    }

    #[test]
    fn test_range_and_map_literal() {
        let file = read_go(
            "package p\n\nfunc f() {\n\tm := map[string]int{\"a\": 1}\n\tfor k, v := range m {\n\t\t_ = k\n\t\t_ = v\n\t}\n}\n",
        )
        .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected function");
        };
        let body = func.body.as_ref().unwrap();
        match &body[0] {
            Stmt::Assign {
                op: AssignOp::Define,
                rhs,
                ..
            } => match &rhs[0] {
                Expr::Composite { ty: Some(ty), elts } => {
                    assert!(matches!(**ty, Expr::MapType { .. }));
                    assert!(matches!(elts[0], Expr::KeyValue { .. }));
                }
                _ => panic!("expected composite literal"),
            },
            _ => panic!("expected short variable declaration"),
        }
        match &body[1] {
            Stmt::Range {
                key, value, define, ..
            } => {
                assert_eq!(key.as_ref(), Some(&Expr::ident("k")));
                assert_eq!(value.as_ref(), Some(&Expr::ident("v")));
                assert!(*define);
            }
            _ => panic!("expected range loop"),
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(read_go("package p\n\nfunc {"), Err(ReadError::Parse(_))));
    }
}
