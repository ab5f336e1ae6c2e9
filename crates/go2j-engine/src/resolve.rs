//! Type inference for Go expressions.
//!
//! [`Program::resolve_type`] both prints the Java spelling of an
//! expression's type and returns the Go type it found, so callers can bind
//! the result to a variable or inspect it further.

use crate::ast::{BinaryOp, Expr, LitKind, UnaryOp, title};
use crate::env::{OutputClass, UnitId};
use crate::output::Cursor;
use crate::program::Program;
use crate::tables::{API_CONVS, TYPE_CONVS, is_builtin_type};

/// Guard against cyclic variable bindings.
pub(crate) const MAX_RESOLVE_DEPTH: usize = 32;

/// Options steering how a type is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOpts {
    /// Write the element type of arrays and the value type of maps.
    pub element_only: bool,
    /// Write a constructible class (`HashMap`) for interface types (`Map`).
    pub implementation_class: bool,
    /// Write boxed classes for primitives.
    pub primitive_as_object: bool,
    /// Resolve immediately even during discovery.
    pub direct_eval: bool,
    /// Write function types as `Function<P, R>`.
    pub function_as_reference: bool,
    /// Write a map as the `Map.Entry<K, V> entry` loop variable.
    pub range_entry: bool,
}

impl ResolveOpts {
    pub fn direct() -> Self {
        Self {
            direct_eval: true,
            ..Self::default()
        }
    }

    pub fn function_ref() -> Self {
        Self {
            function_as_reference: true,
            ..Self::default()
        }
    }
}

/// Expressions that denote types.
pub(crate) fn is_type_expr(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::ArrayType { .. }
            | Expr::MapType { .. }
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_)
            | Expr::Ellipsis(_)
            | Expr::ChanType(_)
    )
}

pub(crate) fn strip_pointer(ty: &Expr) -> &Expr {
    match ty {
        Expr::Star(inner) | Expr::Paren(inner) => strip_pointer(inner),
        other => other,
    }
}

impl Program {
    /// Write the Java type of `expr` and return its Go type.
    ///
    /// Unknown types are written as `Object` and return `None`.
    pub(crate) fn resolve_type(
        &mut self,
        expr: &Expr,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        if self.resolve_depth >= MAX_RESOLVE_DEPTH {
            tracing::debug!(?expr, "type resolution too deep");
            return self.unknown_type(out);
        }
        self.resolve_depth += 1;
        let ty = self.resolve_expr_type(expr, out, opts);
        self.resolve_depth -= 1;
        ty
    }

    fn resolve_expr_type(
        &mut self,
        expr: &Expr,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        match expr {
            Expr::BasicLit { kind, .. } => {
                let name = match kind {
                    LitKind::Int => "int",
                    LitKind::Float | LitKind::Imag => "float64",
                    LitKind::Char => "rune",
                    LitKind::String | LitKind::RawString => "string",
                };
                self.print_type(&Expr::ident(name), out, opts)
            }
            Expr::Paren(inner) | Expr::Star(inner) => self.resolve_type(inner, out, opts),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => self.print_type(&Expr::ident("bool"), out, opts),
                _ => self.resolve_type(operand, out, opts),
            },
            Expr::Binary { left, op, right } => {
                if op.is_boolean() {
                    self.print_type(&Expr::ident("bool"), out, opts)
                } else if matches!(**left, Expr::BasicLit { .. })
                    && !matches!(**right, Expr::BasicLit { .. })
                    && !matches!(op, BinaryOp::Shl | BinaryOp::Shr)
                {
                    self.resolve_type(right, out, opts)
                } else {
                    self.resolve_type(left, out, opts)
                }
            }
            Expr::Ident(name) => self.resolve_ident(name, out, opts),
            Expr::Index { base, .. } => {
                let element = match self.source_type(base, out) {
                    Some(Expr::MapType { value, .. }) => Some(*value),
                    Some(Expr::ArrayType { elem, .. } | Expr::Ellipsis(elem)) => Some(*elem),
                    Some(Expr::Ident(name)) if name == "string" => Some(Expr::ident("byte")),
                    _ => None,
                };
                match element {
                    Some(ty) => self.print_type(&ty, out, opts),
                    None => self.unknown_type(out),
                }
            }
            Expr::Slice { base, .. } => self.resolve_type(base, out, opts),
            Expr::Call { func, args, .. } => self.resolve_call(func, args, out, opts),
            Expr::Selector { base, field } => self.resolve_selector(base, field, out, opts),
            Expr::Composite { ty: Some(ty), .. } | Expr::TypeAssert { ty: Some(ty), .. } => {
                self.print_type(ty, out, opts)
            }
            Expr::FuncLit { ty, .. } => {
                self.print_type(&Expr::FuncType(Box::new(ty.clone())), out, opts)
            }
            Expr::KeyValue { value, .. } => self.resolve_type(value, out, opts),
            ty if is_type_expr(ty) => self.print_type(ty, out, opts),
            _ => self.unknown_type(out),
        }
    }

    fn resolve_ident(&mut self, name: &str, out: &mut Cursor, opts: ResolveOpts) -> Option<Expr> {
        match name {
            "true" | "false" => return self.print_type(&Expr::ident("bool"), out, opts),
            "iota" => return self.print_type(&Expr::ident("int"), out, opts),
            "nil" => return self.unknown_type(out),
            _ => {}
        }
        let Some(bound) = self.scopes.var(out.scope, name).cloned() else {
            return self.unknown_type(out);
        };
        match &bound {
            // Bound to a type name rather than another variable.
            Expr::Ident(inner) if !self.is_var(out, inner) || inner == name => {
                self.print_type(&bound, out, opts)
            }
            Expr::Selector { .. } | Expr::Star(_) => self.print_type(&bound, out, opts),
            ty if is_type_expr(ty) => self.print_type(&bound, out, opts),
            _ => self.resolve_type(&bound, out, opts),
        }
    }

    fn resolve_call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        if self.is_type_callee(func, out) {
            return self.print_type(func, out, opts);
        }

        match func {
            Expr::Ident(name) if !self.is_var(out, name) => match name.as_str() {
                "len" | "cap" | "copy" => return self.print_type(&Expr::ident("int"), out, opts),
                "make" | "new" => {
                    if let Some(ty) = args.first() {
                        return self.print_type(ty, out, opts);
                    }
                }
                "append" => {
                    if let Some(slice) = args.first() {
                        return self.resolve_type(slice, out, opts);
                    }
                }
                _ => {
                    if let Some(result) = self.local_func_result(out, name) {
                        return self.print_type(&result, out, opts);
                    }
                    if let Some(ty) = API_CONVS.get(name.as_str()).and_then(|conv| conv.result) {
                        return self.print_type(&Expr::from_type_name(ty), out, opts);
                    }
                }
            },
            Expr::Selector { base, field } => {
                if let Expr::Ident(prefix) = &**base {
                    if !self.is_var(out, prefix) {
                        if let Some(result) = self.package_func_result(out, prefix, field) {
                            return self.print_foreign_type(prefix, &result, out, opts);
                        }
                        let qualified = format!("{}.{}", prefix, field);
                        if let Some(ty) = API_CONVS.get(qualified.as_str()).and_then(|c| c.result) {
                            return self.print_type(&Expr::from_type_name(ty), out, opts);
                        }
                        return self.unknown_type(out);
                    }
                }
                // Method call on a typed value.
                let owner = self.source_type(base, out);
                let result = owner.as_ref().and_then(|ty| {
                    let method = self
                        .class_of_type(ty)
                        .and_then(|class| class.methods.get(field));
                    method
                        .or_else(|| {
                            let unit = self.unit_of_type(ty)?;
                            self.unit(unit).funcs.get(field)
                        })
                        .cloned()
                });
                if let Some(result) = result {
                    return self.print_type(&result, out, opts);
                }
            }
            _ => {}
        }
        self.unknown_type(out)
    }

    /// Package variables through their import, fields only through the
    /// method receiver.
    fn resolve_selector(
        &mut self,
        base: &Expr,
        field: &str,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        let Expr::Ident(name) = base else {
            return self.unknown_type(out);
        };
        if !self.is_var(out, name) {
            return self.resolve_package_var(name, field, out, opts);
        }
        let field_type = out
            .receiver
            .as_ref()
            .filter(|receiver| receiver.name == *name)
            .and_then(|receiver| self.classes[receiver.class.0 as usize].fields.get(field))
            .cloned();
        match field_type {
            Some(ty) => self.print_type(&ty, out, opts),
            None => self.unknown_type(out),
        }
    }

    /// Type of the variable `name` of the package imported as `prefix`.
    fn resolve_package_var(
        &mut self,
        prefix: &str,
        name: &str,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        let unit = self
            .import_name(out, &title(prefix))
            .and_then(|import| self.unit_by_key(&import.unit_key));
        let Some(unit) = unit else {
            return self.unknown_type(out);
        };
        let package = &self.unit(unit).package;
        let (declared, value) = (
            package.var_type(name).cloned(),
            package.var_value(name).cloned(),
        );
        if let Some(ty) = declared {
            return self.print_foreign_type(prefix, &ty, out, opts);
        }
        let Some(value) = value else {
            return self.unknown_type(out);
        };

        // The initializer only makes sense in the package declaring it.
        let declaring = Cursor {
            unit,
            scope: self.unit(unit).scope,
            receiver: None,
            result: None,
            ..out.clone()
        };
        let mut scratch = self.scratch(&declaring);
        match self.resolve_type(&value, &mut scratch, ResolveOpts::direct()) {
            Some(ty) => self.print_foreign_type(prefix, &ty, out, opts),
            None => self.unknown_type(out),
        }
    }

    /// Write a type declared in the package imported as `prefix`.
    fn print_foreign_type(
        &mut self,
        prefix: &str,
        ty: &Expr,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) -> Option<Expr> {
        if let Expr::Ident(name) = strip_pointer(ty) {
            let qualified = format!("{}.{}", prefix, name);
            if TYPE_CONVS.contains_key(qualified.as_str()) {
                return self.print_type(&Expr::from_type_name(&qualified), out, opts);
            }
        }
        self.print_type(ty, out, opts)
    }

    fn print_type(&mut self, ty: &Expr, out: &mut Cursor, opts: ResolveOpts) -> Option<Expr> {
        self.convert_type(ty, out, opts);
        if opts.element_only {
            self.element_type(ty)
        } else {
            Some(ty.clone())
        }
    }

    fn unknown_type(&mut self, out: &mut Cursor) -> Option<Expr> {
        self.print(out, "Object");
        None
    }

    /// Element type of arrays and value type of maps; other types unchanged.
    pub(crate) fn element_type(&self, ty: &Expr) -> Option<Expr> {
        match self.unalias(strip_pointer(ty)) {
            Expr::ArrayType { elem, .. } | Expr::Ellipsis(elem) => Some(*elem),
            Expr::MapType { value, .. } => Some(*value),
            other => Some(other),
        }
    }

    /// Resolve a named type to its underlying type expression.
    pub(crate) fn unalias(&self, ty: &Expr) -> Expr {
        let mut current = ty.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            let Expr::Ident(name) = &current else { break };
            if is_builtin_type(name) {
                break;
            }
            match self.type_aliases.get(&title(name)) {
                Some(target) => current = target.clone(),
                None => break,
            }
        }
        current
    }

    /// Underlying Go type of `expr`, resolved without emitting anything.
    pub(crate) fn source_type(&mut self, expr: &Expr, out: &Cursor) -> Option<Expr> {
        let mut scratch = self.scratch(out);
        let ty = self.resolve_type(expr, &mut scratch, ResolveOpts::direct())?;
        Some(self.unalias(strip_pointer(&ty)))
    }

    /// Whether a call of `func` is a conversion to that type.
    pub(crate) fn is_type_callee(&self, func: &Expr, out: &Cursor) -> bool {
        match func {
            Expr::Paren(inner) | Expr::Star(inner) => self.is_type_callee(inner, out),
            Expr::Ident(name) => {
                !self.is_var(out, name)
                    && (is_builtin_type(name)
                        || self.type_aliases.contains_key(&title(name))
                        || self.class_index.contains_key(&title(name)))
            }
            Expr::Selector { base, field } => match &**base {
                Expr::Ident(pkg) => TYPE_CONVS.contains_key(format!("{}.{}", pkg, field).as_str()),
                _ => false,
            },
            ty => is_type_expr(ty) && !matches!(ty, Expr::StructType(_)),
        }
    }

    /// Class generated for the named type `ty`.
    pub(crate) fn class_of_type(&self, ty: &Expr) -> Option<&OutputClass> {
        let Expr::Ident(name) = strip_pointer(ty) else {
            return None;
        };
        let id = self.class_index.get(&title(name))?;
        Some(&self.classes[id.0 as usize])
    }

    /// Unit whose tables describe values of the named type `ty`.
    pub(crate) fn unit_of_type(&self, ty: &Expr) -> Option<UnitId> {
        let Expr::Ident(name) = strip_pointer(ty) else {
            return None;
        };
        let class = title(name);
        if let Some(&id) = self.class_index.get(&class) {
            return Some(self.classes[id.0 as usize].unit);
        }
        self.class_names.get(&class).copied()
    }

    /// Result of a function of the package imported as `prefix`.
    fn package_func_result(&self, out: &Cursor, prefix: &str, name: &str) -> Option<Expr> {
        let import = self.import_name(out, &title(prefix))?;
        let unit = self.unit_by_key(&import.unit_key)?;
        self.unit(unit).package.func_result(name).cloned()
    }

    /// Result of a function declared in the current unit or its package.
    pub(crate) fn local_func_result(&self, out: &Cursor, name: &str) -> Option<Expr> {
        let unit = self.unit(out.unit);
        unit.funcs
            .get(name)
            .or_else(|| self.unit(unit.package_unit).funcs.get(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NoSystemSources;

    fn finalized(source: &str) -> (Program, Cursor) {
        let mut program = Program::new();
        program
            .discover("app/main.go", source, &NoSystemSources)
            .unwrap();
        program.finalize().unwrap();
        let unit = program.unit_by_key("app/Main").unwrap();
        let out = Cursor::new(program.unit(unit).root, unit, program.unit(unit).scope);
        (program, out)
    }

    fn resolved(
        program: &mut Program,
        out: &Cursor,
        expr: &Expr,
        opts: ResolveOpts,
    ) -> (String, Option<Expr>) {
        let mut scratch = program.scratch(out);
        let ty = program.resolve_type(expr, &mut scratch, opts);
        (program.scratch_text(&scratch), ty)
    }

    #[test]
    fn test_map_element_boxed() {
        let (mut program, out) = finalized("package main\n\nvar ages map[string]int\n");
        let opts = ResolveOpts {
            element_only: true,
            primitive_as_object: true,
            ..ResolveOpts::default()
        };
        let (text, ty) = resolved(&mut program, &out, &Expr::ident("ages"), opts);
        assert_eq!(text, "Integer");
        assert_eq!(ty, Some(Expr::ident("int")));
    }

    #[test]
    fn test_slice_element_and_boxed_literal() {
        let (mut program, out) = finalized("package main\n\nvar names []string\n");
        let element = ResolveOpts {
            element_only: true,
            ..ResolveOpts::default()
        };
        let (text, ty) = resolved(&mut program, &out, &Expr::ident("names"), element);
        assert_eq!(text, "String");
        assert_eq!(ty, Some(Expr::ident("string")));

        let boxed = ResolveOpts {
            primitive_as_object: true,
            ..ResolveOpts::default()
        };
        let (text, _) = resolved(&mut program, &out, &Expr::int("1"), boxed);
        assert_eq!(text, "Integer");
    }

    #[test]
    fn test_unknown_is_object() {
        let (mut program, out) = finalized("package main\n");
        let mystery = Expr::ident("mystery");
        let (text, ty) = resolved(&mut program, &out, &mystery, ResolveOpts::direct());
        assert_eq!(text, "Object");
        assert_eq!(ty, None);
    }

    #[test]
    fn test_literal_on_left_takes_right_type() {
        let (mut program, out) = finalized("package main\n\nvar total int64\n");
        let expr = Expr::binary(Expr::int("2"), BinaryOp::Mul, Expr::ident("total"));
        let (text, _) = resolved(&mut program, &out, &expr, ResolveOpts::direct());
        assert_eq!(text, "long");
    }

    #[test]
    fn test_strip_pointer() {
        let ty = Expr::pointer(Expr::ident("Circle"));
        assert_eq!(strip_pointer(&ty), &Expr::ident("Circle"));
    }

    #[test]
    fn test_type_expressions() {
        assert!(is_type_expr(&Expr::slice_of(Expr::ident("int"))));
        assert!(is_type_expr(&Expr::map_of(
            Expr::ident("string"),
            Expr::ident("int")
        )));
        assert!(!is_type_expr(&Expr::ident("x")));
    }
}
