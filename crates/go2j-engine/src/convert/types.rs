//! Java spelling of Go type expressions.

use crate::ast::{Expr, FuncType, title};
use crate::deferred::{Deferred, TypeTask};
use crate::output::Cursor;
use crate::program::Program;
use crate::resolve::{MAX_RESOLVE_DEPTH, ResolveOpts};
use crate::tables::{self, FUNCTION, HASH_MAP, MAP, TYPE_CONVS, java_type};

impl Program {
    /// Write `ty`, deferring named types until every declaration is known.
    pub(crate) fn convert_type(&mut self, ty: &Expr, out: &mut Cursor, opts: ResolveOpts) {
        let named = matches!(ty, Expr::Ident(name) if java_type(name, false).is_none());
        if named && !self.eager(out, opts.direct_eval) {
            self.emit(
                out,
                Deferred::Type(TypeTask::Name {
                    ty: ty.clone(),
                    opts,
                }),
            );
            return;
        }
        self.convert_type_now(ty, out, opts);
    }

    pub(crate) fn convert_type_now(&mut self, ty: &Expr, out: &mut Cursor, opts: ResolveOpts) {
        match ty {
            Expr::Ident(name) => self.convert_type_ident(name, out, opts),
            Expr::Paren(inner) | Expr::Star(inner) => self.convert_type(inner, out, opts),
            Expr::ArrayType { elem, .. } | Expr::Ellipsis(elem) if opts.element_only => {
                let inner = ResolveOpts {
                    element_only: false,
                    ..opts
                };
                self.convert_type(elem, out, inner);
            }
            Expr::ArrayType { elem, .. } => {
                self.convert_type(elem, out, Self::element_opts(opts));
                self.print(out, "[]");
            }
            Expr::Ellipsis(elem) => {
                self.convert_type(elem, out, Self::element_opts(opts));
                self.print(out, "...");
            }
            Expr::MapType { key, value } => self.convert_map_type(key, value, out, opts),
            Expr::Selector { base, field } => self.convert_qualified_type(base, field, out, opts),
            // Java has no function types; parameters and fields hold a
            // `Function` reference.
            Expr::FuncType(func) if opts.function_as_reference => {
                self.convert_function_ref(func, out, opts)
            }
            Expr::FuncType(func) => self.convert_function_signature(func, out),
            Expr::InterfaceType(_) | Expr::StructType(_) | Expr::ChanType(_) => {
                self.print(out, "Object");
            }
            other => {
                tracing::trace!(?other, "no Java type");
                self.print(out, "Object");
            }
        }
    }

    fn element_opts(opts: ResolveOpts) -> ResolveOpts {
        ResolveOpts {
            range_entry: false,
            implementation_class: false,
            ..opts
        }
    }

    fn convert_type_ident(&mut self, name: &str, out: &mut Cursor, opts: ResolveOpts) {
        if let Some(java) = java_type(name, opts.primitive_as_object) {
            self.print(out, java);
            return;
        }
        let class = title(name);
        if let Some(target) = self.type_aliases.get(&class).cloned() {
            if self.resolve_depth < MAX_RESOLVE_DEPTH {
                self.resolve_depth += 1;
                self.convert_type(&target, out, opts);
                self.resolve_depth -= 1;
                return;
            }
        }
        self.add_referenced(out, &class);
        self.print(out, &class);
    }

    fn convert_map_type(&mut self, key: &Expr, value: &Expr, out: &mut Cursor, opts: ResolveOpts) {
        if opts.element_only && !opts.range_entry {
            let inner = ResolveOpts {
                element_only: false,
                ..opts
            };
            self.convert_type(value, out, inner);
            return;
        }
        let open = if opts.range_entry {
            "Map.Entry<"
        } else if opts.implementation_class {
            self.add_import(out, HASH_MAP);
            "HashMap<"
        } else {
            "Map<"
        };
        self.add_import(out, MAP);
        self.print(out, open);

        let args = ResolveOpts {
            primitive_as_object: true,
            element_only: false,
            range_entry: false,
            implementation_class: false,
            ..opts
        };
        self.convert_type(key, out, args);
        self.print(out, ", ");
        self.convert_type(value, out, args);
        self.print(out, ">");
        if opts.range_entry {
            self.print(out, " entry");
        }
    }

    fn convert_qualified_type(
        &mut self,
        base: &Expr,
        field: &str,
        out: &mut Cursor,
        opts: ResolveOpts,
    ) {
        let Expr::Ident(package) = base else {
            self.convert_type(base, out, opts);
            self.print(out, ".");
            self.print(out, field);
            return;
        };
        let qualified = format!("{}.{}", package, field);
        if let Some(conv) = TYPE_CONVS.get(qualified.as_str()) {
            if let Some(import) = conv.import {
                self.add_import(out, import);
            }
            let name = match conv.import {
                None if opts.primitive_as_object => java_type_boxed(conv.name),
                _ => conv.name,
            };
            self.print(out, name);
            return;
        }
        if self.import_name(out, &title(package)).is_some() {
            self.add_referenced(out, field);
            self.print(out, field);
            return;
        }
        self.print(out, &qualified);
    }

    /// `Function<P, R>` with boxed arguments; `Void` stands in for absent
    /// parameters or results.
    fn convert_function_ref(&mut self, func: &FuncType, out: &mut Cursor, opts: ResolveOpts) {
        self.add_import(out, FUNCTION);
        let args = ResolveOpts {
            primitive_as_object: true,
            function_as_reference: true,
            element_only: false,
            range_entry: false,
            implementation_class: false,
            ..opts
        };
        self.print(out, "Function<");
        match func.params.first() {
            Some(param) => self.convert_type(&param.ty, out, args),
            None => self.print(out, "Void"),
        }
        self.print(out, ", ");
        match func.first_result() {
            Some(result) => self.convert_type(result, out, args),
            None => self.print(out, "Void"),
        }
        self.print(out, ">");
    }

    /// `R (P, Q)`: the bare signature of a function type.
    fn convert_function_signature(&mut self, func: &FuncType, out: &mut Cursor) {
        match func.first_result() {
            Some(result) => self.convert_type(result, out, ResolveOpts::default()),
            None => self.print(out, "void"),
        }
        self.print(out, " (");
        let params = func
            .params
            .iter()
            .flat_map(|field| std::iter::repeat_n(&field.ty, field.names.len().max(1)));
        for (index, ty) in params.enumerate() {
            if index > 0 {
                self.print(out, ", ");
            }
            self.convert_type(ty, out, ResolveOpts::function_ref());
        }
        self.print(out, ")");
    }
}

fn java_type_boxed(name: &'static str) -> &'static str {
    match name {
        "long" => "Long",
        "int" => "Integer",
        "double" => "Double",
        other => other,
    }
}

/// Zero-value initializer for a local declared without a value.
pub(crate) fn zero_initializer(ty: &Expr) -> Option<&'static str> {
    match ty {
        Expr::Ident(name) => tables::zero_value(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Field;
    use crate::traits::NoSystemSources;

    fn program_cursor() -> (Program, Cursor) {
        let mut program = Program::new();
        program
            .discover("app/main.go", "package main\n", &NoSystemSources)
            .unwrap();
        program.finalize().unwrap();
        let unit = program.unit_by_key("app/Main").unwrap();
        let out = Cursor::new(program.unit(unit).root, unit, program.unit(unit).scope);
        (program, out)
    }

    fn handler() -> Expr {
        Expr::FuncType(Box::new(FuncType {
            params: vec![Field {
                names: vec!["n".to_string()],
                ty: Expr::ident("int"),
            }],
            results: vec![Field {
                names: vec![],
                ty: Expr::ident("string"),
            }],
        }))
    }

    fn written(program: &mut Program, out: &Cursor, opts: ResolveOpts) -> String {
        let mut scratch = program.scratch(out);
        program.convert_type(&handler(), &mut scratch, opts);
        program.scratch_text(&scratch)
    }

    #[test]
    fn test_function_type_as_reference() {
        let (mut program, out) = program_cursor();
        let text = written(&mut program, &out, ResolveOpts::function_ref());
        assert_eq!(text, "Function<Integer, String>");
    }

    #[test]
    fn test_function_type_as_signature() {
        let (mut program, out) = program_cursor();
        let text = written(&mut program, &out, ResolveOpts::default());
        assert_eq!(text, "String (int)");
    }
}
