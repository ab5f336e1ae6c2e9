//! Expressions.

use crate::ast::{BinaryOp, Expr, FuncType, LitKind, Stmt, UnaryOp, title};
use crate::deferred::{Deferred, StmtTask};
use crate::output::Cursor;
use crate::program::Program;
use crate::resolve::{ResolveOpts, strip_pointer};
use crate::tables::{API_CONVS, ARRAYS, MAP, VALUE_CONVS, ValueConv, java_ident};

impl Program {
    pub(crate) fn convert_expr(&mut self, expr: &Expr, out: &mut Cursor) {
        match expr {
            Expr::Ident(name) => self.convert_ident(name, out),
            Expr::BasicLit { kind, value } => self.convert_basic_lit(*kind, value, out),
            Expr::Composite { ty, elts } => self.convert_composite(ty.as_deref(), elts, None, out),
            Expr::FuncLit { ty, body } => self.convert_func_lit(ty, body, out),
            Expr::Paren(inner) => {
                self.print(out, "(");
                self.convert_expr(inner, out);
                self.print(out, ")");
            }
            Expr::Selector { base, field } => {
                self.convert_expr(base, out);
                self.print(out, ".");
                self.print(out, field);
            }
            Expr::Index { base, index } => {
                let task = StmtTask::Index {
                    base: (**base).clone(),
                    index: (**index).clone(),
                };
                self.emit(out, Deferred::Statement(task));
            }
            Expr::Slice { base, low, high } => {
                let task = StmtTask::Slice {
                    base: (**base).clone(),
                    low: low.as_deref().cloned(),
                    high: high.as_deref().cloned(),
                };
                self.emit(out, Deferred::Statement(task));
            }
            Expr::TypeAssert { base, ty } => match ty {
                Some(ty) => {
                    self.print(out, "((");
                    self.convert_type(ty, out, ResolveOpts::function_ref());
                    self.print(out, ") ");
                    self.convert_expr(base, out);
                    self.print(out, ")");
                }
                None => self.convert_expr(base, out),
            },
            Expr::Call { func, args, spread } => self.convert_call(func, args, *spread, out),
            // Pointers are references in Java.
            Expr::Star(inner) => self.convert_expr(inner, out),
            Expr::Unary { op, operand } => {
                let token = match op {
                    UnaryOp::Pos => "+",
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                    UnaryOp::BitNot => "~",
                    UnaryOp::Addr | UnaryOp::Recv => "",
                };
                self.print(out, token);
                self.convert_expr(operand, out);
            }
            Expr::Binary { left, op, right } => {
                self.convert_expr(left, out);
                let token = match op {
                    BinaryOp::AndNot => "& ~",
                    other => other.as_str(),
                };
                self.print(out, &format!(" {} ", token));
                self.convert_expr(right, out);
            }
            Expr::KeyValue { value, .. } => self.convert_expr(value, out),
            Expr::Unsupported(kind) => {
                tracing::trace!(kind = %kind, "expression without a conversion");
                self.print(out, "null");
            }
            ty => self.convert_type(ty, out, ResolveOpts::function_ref()),
        }
    }

    fn convert_ident(&mut self, name: &str, out: &mut Cursor) {
        let is_receiver = out.receiver.as_ref().is_some_and(|r| r.name == name);
        if is_receiver {
            self.print(out, "this");
            return;
        }
        if name == "iota" {
            if let Some(index) = self.iota {
                self.print(out, &index.to_string());
                return;
            }
        }
        if !self.is_var(out, name) {
            let class = title(name);
            if let Some(import) = self.import_name(out, &class) {
                let qualified = import.qualified.clone();
                if let Some(qualified) = qualified {
                    self.unit_mut(out.unit).imports.insert(qualified);
                }
                self.print(out, &class);
                return;
            }
        }
        self.print(out, java_ident(name));
    }

    fn convert_basic_lit(&mut self, kind: LitKind, value: &str, out: &mut Cursor) {
        match kind {
            LitKind::RawString => {
                let text = raw_string(value);
                self.print(out, &text);
            }
            LitKind::Int => {
                let value = value
                    .strip_prefix("0o")
                    .or_else(|| value.strip_prefix("0O"))
                    .map(|octal| format!("0{}", octal))
                    .unwrap_or_else(|| value.to_string());
                self.print(out, &value);
            }
            _ => self.print(out, value),
        }
    }

    /// `new T(...)`, `new T[]{...}` or a map built from its entries.
    ///
    /// `implied` is the element type for literals whose type is elided.
    fn convert_composite(
        &mut self,
        ty: Option<&Expr>,
        elts: &[Expr],
        implied: Option<&Expr>,
        out: &mut Cursor,
    ) {
        let Some(ty) = ty.or(implied) else {
            self.print(out, "{");
            self.convert_elements(elts, None, out);
            self.print(out, "}");
            return;
        };
        let ty = strip_pointer(ty);
        match self.unalias(ty) {
            Expr::ArrayType { elem, .. } => {
                self.print(out, "new ");
                self.convert_type(ty, out, ResolveOpts::function_ref());
                self.print(out, "{");
                self.convert_elements(elts, Some(&*elem), out);
                self.print(out, "}");
            }
            Expr::MapType { key, value } => {
                self.print(out, "new ");
                let opts = ResolveOpts {
                    implementation_class: true,
                    ..ResolveOpts::default()
                };
                self.convert_type(ty, out, opts);
                self.print(out, "(");
                if !elts.is_empty() {
                    self.add_import(out, MAP);
                    // `Map.of` stops at ten pairs.
                    self.print(out, "Map.ofEntries(");
                    for (index, elt) in elts.iter().enumerate() {
                        if index > 0 {
                            self.print(out, ", ");
                        }
                        match elt {
                            Expr::KeyValue { key: k, value: v } => {
                                self.print(out, "Map.entry(");
                                self.convert_element(k, Some(&*key), out);
                                self.print(out, ", ");
                                self.convert_element(v, Some(&*value), out);
                                self.print(out, ")");
                            }
                            other => self.convert_expr(other, out),
                        }
                    }
                    self.print(out, ")");
                }
                self.print(out, ")");
            }
            _ => {
                self.print(out, "new ");
                let opts = ResolveOpts {
                    implementation_class: true,
                    ..ResolveOpts::default()
                };
                self.convert_type(ty, out, opts);
                self.print(out, "(");
                self.convert_elements(elts, None, out);
                self.print(out, ")");
            }
        }
    }

    fn convert_elements(&mut self, elts: &[Expr], implied: Option<&Expr>, out: &mut Cursor) {
        for (index, elt) in elts.iter().enumerate() {
            if index > 0 {
                self.print(out, ", ");
            }
            let elt = match elt {
                Expr::KeyValue { value, .. } => value,
                other => other,
            };
            self.convert_element(elt, implied, out);
        }
    }

    fn convert_element(&mut self, elt: &Expr, implied: Option<&Expr>, out: &mut Cursor) {
        match elt {
            Expr::Composite { ty: None, elts } => self.convert_composite(None, elts, implied, out),
            Expr::Unary {
                op: UnaryOp::Addr,
                operand,
            } => self.convert_element(operand, implied, out),
            other => self.convert_expr(other, out),
        }
    }

    /// `(a, b) -> {...}`
    fn convert_func_lit(&mut self, ty: &FuncType, body: &[Stmt], out: &mut Cursor) {
        let names: Vec<&str> = ty
            .params
            .iter()
            .flat_map(|field| field.names.iter().map(String::as_str))
            .collect();
        let scope = self.scopes.new_scope(Some(out.scope));
        for field in &ty.params {
            for name in &field.names {
                self.scopes.set_var(scope, name, field.ty.clone());
            }
        }
        self.print(out, &format!("({}) ->", names.join(", ")));
        let mut inner = Cursor {
            scope,
            result: ty.first_result().cloned(),
            ..out.clone()
        };
        self.convert_block(body, &mut inner, None);
        out.need_tabs = inner.need_tabs;
    }

    fn convert_call(&mut self, func: &Expr, args: &[Expr], spread: bool, out: &mut Cursor) {
        if args.len() == 1 && self.is_type_callee(func, out) {
            self.convert_value_conversion(func, &args[0], out);
            return;
        }
        if let Expr::Ident(name) = func {
            if !self.is_var(out, name) && self.convert_builtin(name, args, out) {
                return;
            }
        }

        let shadowed = matches!(func, Expr::Selector { base, .. }
            if matches!(&**base, Expr::Ident(package) if self.is_var(out, package)));
        if let Some(qualified) = qualified_name(func).filter(|_| !shadowed) {
            if let Some(conv) = API_CONVS.get(qualified.as_str()) {
                if let Some(import) = conv.import {
                    self.add_import(out, import);
                }
                self.print(out, conv.method);
                self.print(out, "(");
                self.convert_args(args, conv.separator.unwrap_or(", "), out);
                self.print(out, ")");
                return;
            }
        }

        // Package functions called from a type's own class need qualifying.
        if let Expr::Ident(name) = func {
            let package_unit = self.unit(out.unit).package_unit;
            if package_unit != out.unit
                && !self.is_var(out, name)
                && self.unit(package_unit).funcs.contains_key(name)
            {
                let class = self.unit(package_unit).name.clone();
                self.print(out, &class);
                self.print(out, ".");
            }
        }
        if spread {
            tracing::trace!("spread argument passed as array");
        }
        self.convert_expr(func, out);
        self.print(out, "(");
        self.convert_args(args, ", ", out);
        self.print(out, ")");
    }

    fn convert_args(&mut self, args: &[Expr], separator: &str, out: &mut Cursor) {
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.print(out, separator);
            }
            self.convert_expr(arg, out);
        }
    }

    /// `T(x)`: a table conversion, a cast, or nothing when the types agree.
    fn convert_value_conversion(&mut self, ty: &Expr, value: &Expr, out: &mut Cursor) {
        let opts = ResolveOpts::direct();
        let mut target = self.scratch(out);
        self.convert_type(ty, &mut target, opts);
        let target = self.scratch_text(&target);
        let mut source = self.scratch(out);
        self.resolve_type(value, &mut source, opts);
        let source = self.scratch_text(&source);

        match VALUE_CONVS.get(format!("{}->{}", source, target).as_str()) {
            Some(ValueConv::Suffix(suffix)) => {
                self.convert_expr(value, out);
                self.print(out, suffix);
            }
            Some(ValueConv::Wrap(prefix, suffix)) => {
                self.print(out, prefix);
                self.convert_expr(value, out);
                self.print(out, suffix);
            }
            None if source == target => self.convert_expr(value, out),
            None => {
                self.print(out, "((");
                self.convert_type(ty, out, ResolveOpts::default());
                self.print(out, ") ");
                self.convert_expr(value, out);
                self.print(out, ")");
            }
        }
    }

    /// Go built-ins with a dedicated Java form. Returns false for others.
    fn convert_builtin(&mut self, name: &str, args: &[Expr], out: &mut Cursor) -> bool {
        match (name, args) {
            ("len" | "cap", [value]) => {
                self.emit(out, Deferred::Statement(StmtTask::Len(value.clone())));
            }
            ("make", [ty, rest @ ..]) => self.convert_make(ty, rest.first(), out),
            ("new", [ty]) => {
                self.print(out, "new ");
                let opts = ResolveOpts {
                    implementation_class: true,
                    ..ResolveOpts::default()
                };
                self.convert_type(ty, out, opts);
                self.print(out, "()");
            }
            ("delete", [map, key]) => {
                self.convert_expr(map, out);
                self.print(out, ".remove(");
                self.convert_expr(key, out);
                self.print(out, ")");
            }
            ("panic", [value]) => {
                self.print(out, "throw new RuntimeException(String.valueOf(");
                self.convert_expr(value, out);
                self.print(out, "))");
            }
            _ => return false,
        }
        true
    }

    fn convert_make(&mut self, ty: &Expr, size: Option<&Expr>, out: &mut Cursor) {
        match self.unalias(ty) {
            Expr::MapType { .. } => {
                self.print(out, "new ");
                let opts = ResolveOpts {
                    implementation_class: true,
                    ..ResolveOpts::default()
                };
                self.convert_type(ty, out, opts);
                self.print(out, "()");
            }
            Expr::ArrayType { elem, .. } => {
                self.print(out, "new ");
                self.convert_type(&elem, out, ResolveOpts::default());
                self.print(out, "[");
                match size {
                    Some(size) => self.convert_expr(size, out),
                    None => self.print(out, "0"),
                }
                self.print(out, "]");
            }
            Expr::ChanType(_) => self.print(out, "null"),
            _ => {
                self.print(out, "new ");
                self.convert_type(ty, out, ResolveOpts::default());
                self.print(out, "()");
            }
        }
    }

    /// `m.get(k)`, `s.charAt(i)` or `a[i]` by the indexed value's type.
    pub(crate) fn convert_index_now(&mut self, base: &Expr, index: &Expr, out: &mut Cursor) {
        let (open, close) = match self.source_type(base, out) {
            Some(Expr::MapType { .. }) => (".get(", ")"),
            Some(Expr::Ident(name)) if name == "string" => (".charAt(", ")"),
            _ => ("[", "]"),
        };
        self.convert_expr(base, out);
        self.print(out, open);
        self.convert_expr(index, out);
        self.print(out, close);
    }

    pub(crate) fn convert_slice_now(
        &mut self,
        base: &Expr,
        low: Option<&Expr>,
        high: Option<&Expr>,
        out: &mut Cursor,
    ) {
        let is_string = matches!(
            self.source_type(base, out),
            Some(Expr::Ident(name)) if name == "string"
        );
        if is_string {
            self.convert_expr(base, out);
            self.print(out, ".substring(");
            match low {
                Some(low) => self.convert_expr(low, out),
                None => self.print(out, "0"),
            }
            if let Some(high) = high {
                self.print(out, ", ");
                self.convert_expr(high, out);
            }
            self.print(out, ")");
            return;
        }

        self.add_import(out, ARRAYS);
        self.print(out, "Arrays.copyOfRange(");
        self.convert_expr(base, out);
        self.print(out, ", ");
        match low {
            Some(low) => self.convert_expr(low, out),
            None => self.print(out, "0"),
        }
        self.print(out, ", ");
        match high {
            Some(high) => self.convert_expr(high, out),
            None => {
                self.convert_expr(base, out);
                self.print(out, ".length");
            }
        }
        self.print(out, ")");
    }

    /// `m.size()`, `s.length()` or `a.length`.
    pub(crate) fn convert_len_now(&mut self, value: &Expr, out: &mut Cursor) {
        let suffix = match self.source_type(value, out) {
            Some(Expr::MapType { .. }) => ".size()",
            Some(Expr::Ident(name)) if name == "string" => ".length()",
            _ => ".length",
        };
        self.convert_expr(value, out);
        self.print(out, suffix);
    }
}

/// `fmt.Println` for selector callees, `append` for plain ones.
fn qualified_name(func: &Expr) -> Option<String> {
    match func {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Selector { base, field } => match &**base {
            Expr::Ident(package) => Some(format!("{}.{}", package, field)),
            _ => None,
        },
        _ => None,
    }
}

/// Java string literal for a Go raw string, one source line per line.
fn raw_string(value: &str) -> String {
    let text = value.trim_start_matches('`').trim_end_matches('`');
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "")
        .replace('\n', "\\n\"+\n\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_string_splits_lines() {
        assert_eq!(raw_string("`a\n\"b\"`"), "\"a\\n\"+\n\"\\\"b\\\"\"");
        assert_eq!(raw_string("`C:\\dir`"), "\"C:\\\\dir\"");
    }

    #[test]
    fn test_qualified_name() {
        let func = Expr::selector(Expr::ident("fmt"), "Println");
        assert_eq!(qualified_name(&func).as_deref(), Some("fmt.Println"));
        assert_eq!(qualified_name(&Expr::ident("append")).as_deref(), Some("append"));
    }
}
