//! Package-level declarations: functions, methods, types and variables.

use crate::ast::{
    Decl, Expr, Field, FuncDecl, FuncType, GenDecl, GenKind, Spec, TypeSpec, UnaryOp, ValueSpec,
    is_exported, title,
};
use crate::deferred::{Deferred, TypeTask};
use crate::env::{ClassId, OutputClass, ScopeId};
use crate::output::{Cursor, Receiver};
use crate::program::{PendingMethod, Phase, Program};
use crate::resolve::{ResolveOpts, strip_pointer};
use crate::tables::HASH_MAP;
use std::collections::{BTreeSet, HashMap};

use super::types::zero_initializer;

/// Type and values repeated by constant specs that omit them.
#[derive(Debug, Default)]
struct ConstGroup {
    ty: Option<Expr>,
    values: Vec<Expr>,
}

impl Program {
    pub(crate) fn convert_decl(&mut self, decl: &Decl, out: &mut Cursor) {
        match decl {
            Decl::Func(func) => self.convert_func_decl(func, out),
            Decl::Gen(decl) => self.convert_gen_decl(decl, out, false),
        }
    }

    fn convert_func_decl(&mut self, decl: &FuncDecl, out: &mut Cursor) {
        if let Some(receiver) = &decl.receiver {
            let class = receiver_class(&receiver.ty);
            match self.class_index.get(&class).copied() {
                Some(id) => self.convert_method(decl, id),
                None if self.phase == Phase::Discovery => {
                    tracing::trace!(
                        class = %class,
                        method = %decl.name,
                        "method before its struct"
                    );
                    self.pending_methods.push(PendingMethod {
                        class,
                        decl: decl.clone(),
                        out: out.clone(),
                    });
                }
                None => self.convert_static_method(decl, out),
            }
            return;
        }

        let scope = self.new_scope(out);
        self.convert_export(&decl.name, out);
        self.print(out, "static ");
        self.convert_signature(&decl.name, &decl.ty, None, out, scope);
        let mut body = Cursor {
            scope,
            receiver: None,
            result: decl.ty.first_result().cloned(),
            ..out.clone()
        };
        self.convert_func_body(decl, out, &mut body);
    }

    /// Write a method into the class generated for its receiver type.
    pub(crate) fn convert_method(&mut self, decl: &FuncDecl, class: ClassId) {
        let mut out = self.classes[class.0 as usize].functions_at.clone();
        let scope = self.new_scope(&out);
        let mut receiver = None;
        if let Some(field) = &decl.receiver {
            if let Some(name) = field.names.first().filter(|name| *name != "_") {
                self.scopes.set_var(scope, name, field.ty.clone());
                receiver = Some(Receiver {
                    name: name.clone(),
                    class,
                });
            }
        }

        if let Some(result) = decl.ty.first_result() {
            self.classes[class.0 as usize]
                .methods
                .entry(decl.name.clone())
                .or_insert_with(|| result.clone());
        }
        self.convert_export(&decl.name, &mut out);
        self.convert_signature(&decl.name, &decl.ty, None, &mut out, scope);
        let mut body = Cursor {
            scope,
            receiver,
            result: decl.ty.first_result().cloned(),
            ..out.clone()
        };
        self.convert_func_body(decl, &mut out, &mut body);
    }

    /// Write a method whose receiver type has no class as a static function
    /// taking the receiver as its first parameter.
    pub(crate) fn convert_static_method(&mut self, decl: &FuncDecl, out: &mut Cursor) {
        let scope = self.new_scope(out);
        self.convert_export(&decl.name, out);
        self.print(out, "static ");
        self.convert_signature(&decl.name, &decl.ty, decl.receiver.as_ref(), out, scope);
        let mut body = Cursor {
            scope,
            receiver: None,
            result: decl.ty.first_result().cloned(),
            ..out.clone()
        };
        self.convert_func_body(decl, out, &mut body);
    }

    fn convert_func_body(&mut self, decl: &FuncDecl, out: &mut Cursor, body: &mut Cursor) {
        match &decl.body {
            Some(stmts) => self.convert_block(stmts, body, None),
            None => self.convert_block(&[], body, None),
        }
        out.need_tabs = body.need_tabs;
        self.println(out, "");
        self.println(out, "");
    }

    pub(crate) fn convert_export(&mut self, name: &str, out: &mut Cursor) {
        if is_exported(name) || name == "main" {
            self.print(out, "public ");
        } else {
            self.print(out, "protected ");
        }
    }

    /// `R name(T a, U b)`, binding each parameter in `scope` and registering
    /// the first result for later inference.
    pub(crate) fn convert_signature(
        &mut self,
        name: &str,
        ty: &FuncType,
        receiver: Option<&Field>,
        out: &mut Cursor,
        scope: ScopeId,
    ) {
        let opts = ResolveOpts::function_ref();
        match ty.first_result() {
            Some(result) => {
                self.convert_type(result, out, opts);
                let unit = self.unit_mut(out.unit);
                unit.funcs
                    .entry(name.to_string())
                    .or_insert_with(|| result.clone());
                if is_exported(name) {
                    unit.package.add_func(name, result.clone());
                }
            }
            None => self.print(out, "void"),
        }
        for extra in ty.results.iter().skip(1) {
            self.print(out, " /* ");
            self.convert_type(&extra.ty, out, opts);
            self.print(out, " */");
        }
        self.print(out, " ");
        self.print(out, name);
        self.print(out, "(");

        let mut count = 0;
        for field in receiver.into_iter().chain(&ty.params) {
            let names: Vec<String> = if field.names.is_empty() {
                vec![format!("arg{}", count)]
            } else {
                field.names.clone()
            };
            for param in names {
                if count > 0 {
                    self.print(out, ", ");
                }
                self.convert_type(&field.ty, out, opts);
                self.print(out, " ");
                self.print(out, &param);
                self.scopes.set_var(scope, &param, field.ty.clone());
                count += 1;
            }
        }
        if name == "main" && receiver.is_none() && count == 0 {
            self.print(out, "String[] args");
        }
        self.print(out, ")");
    }

    pub(crate) fn convert_gen_decl(&mut self, decl: &GenDecl, out: &mut Cursor, local: bool) {
        match decl.kind {
            GenKind::Type => {
                for spec in &decl.specs {
                    if let Spec::Type(spec) = spec {
                        self.convert_type_spec(spec, out);
                    }
                }
            }
            GenKind::Var | GenKind::Const => {
                let mut group = ConstGroup::default();
                for (index, spec) in decl.specs.iter().enumerate() {
                    if let Spec::Value(spec) = spec {
                        self.convert_value_spec(spec, decl.kind, index, &mut group, out, local);
                    }
                }
            }
        }
    }

    fn convert_type_spec(&mut self, spec: &TypeSpec, out: &mut Cursor) {
        let class = title(&spec.name);
        match &spec.ty {
            Expr::StructType(fields) if !spec.alias => {
                if is_exported(&spec.name) {
                    let mut target = self.class_unit(&class, out);
                    self.convert_struct(&class, fields, &mut target);
                } else {
                    self.convert_struct(&class, fields, out);
                }
            }
            Expr::InterfaceType(fields) if !spec.alias => {
                if is_exported(&spec.name) {
                    let mut target = self.class_unit(&class, out);
                    self.convert_interface(&class, fields, &mut target);
                } else {
                    self.convert_interface(&class, fields, out);
                }
            }
            other => {
                tracing::trace!(name = %class, "named type");
                self.type_aliases.insert(class, other.clone());
            }
        }
    }

    fn convert_struct(&mut self, name: &str, fields: &[Field], out: &mut Cursor) {
        self.print(out, "public ");
        if out.tabs > 0 {
            self.print(out, "static ");
        }
        self.print(out, "class ");
        self.print(out, name);

        let mut interfaces = BTreeSet::new();
        for (index, field) in fields.iter().filter(|f| f.is_embedded()).enumerate() {
            self.print(
                out,
                match index {
                    0 => " extends ",
                    1 => " implements ",
                    _ => ", ",
                },
            );
            self.convert_type(&field.ty, out, ResolveOpts::default());
            if index > 0 {
                if let Some(name) = type_class_name(&field.ty) {
                    interfaces.insert(name);
                }
            }
        }
        let implements_at = self.reserve_inline(out, None);
        self.println(out, " {");

        let mut body = out.tab();
        let named: Vec<(&String, &Expr)> = fields
            .iter()
            .flat_map(|field| field.names.iter().map(move |n| (n, &field.ty)))
            .collect();
        for &(field, ty) in &named {
            self.convert_field(field, ty, &mut body);
        }
        self.println(&mut body, "");

        self.print(&mut body, "public ");
        self.print(&mut body, name);
        self.println(&mut body, "() {");
        self.println(&mut body, "}");
        self.println(&mut body, "");

        if !named.is_empty() {
            let mut params = body.without_stmt_end();
            self.print(&mut params, "public ");
            self.print(&mut params, name);
            self.print(&mut params, "(");
            for (index, &(field, ty)) in named.iter().enumerate() {
                if index > 0 {
                    self.print(&mut params, ", ");
                }
                self.convert_type(ty, &mut params, ResolveOpts::function_ref());
                self.print(&mut params, " ");
                self.print(&mut params, field);
            }
            body.need_tabs = params.need_tabs;
            self.println(&mut body, ") {");
            let mut assign = body.tab();
            for &(field, _) in &named {
                self.println(&mut assign, &format!("this.{} = {};", field, field));
            }
            self.println(&mut body, "}");
            self.println(&mut body, "");
        }

        let functions_at = self.reserve_block(&mut body, None);
        out.need_tabs = true;
        self.println(out, "}");
        if out.tabs > 0 {
            self.println(out, "");
        }

        let id = ClassId(self.classes.len() as u32);
        self.classes.push(OutputClass {
            name: name.to_string(),
            unit: out.unit,
            implements_at,
            functions_at,
            interfaces,
            fields: named
                .iter()
                .map(|&(field, ty)| (field.clone(), ty.clone()))
                .collect(),
            methods: HashMap::new(),
        });
        self.class_index.insert(name.to_string(), id);

        let (ready, waiting) = std::mem::take(&mut self.pending_methods)
            .into_iter()
            .partition::<Vec<_>, _>(|method| method.class == name);
        self.pending_methods = waiting;
        for method in ready {
            self.convert_method(&method.decl, id);
        }
    }

    /// `public T name;`, with arrays initialized empty.
    fn convert_field(&mut self, name: &str, ty: &Expr, out: &mut Cursor) {
        self.convert_export(name, out);
        self.convert_type(ty, out, ResolveOpts::function_ref());
        self.print(out, " ");
        self.print(out, name);
        if matches!(ty, Expr::ArrayType { .. }) {
            self.print(out, " = new ");
            self.convert_type(ty, out, ResolveOpts::default());
            self.print(out, "{}");
        }
        self.stmt_end(out);
    }

    fn convert_interface(&mut self, name: &str, fields: &[Field], out: &mut Cursor) {
        self.interfaces.insert(name.to_string());
        self.print(out, "public ");
        if out.tabs > 0 {
            self.print(out, "static ");
        }
        self.print(out, "interface ");
        self.print(out, name);
        for (index, field) in fields.iter().filter(|f| f.is_embedded()).enumerate() {
            self.print(out, if index == 0 { " extends " } else { ", " });
            self.convert_type(&field.ty, out, ResolveOpts::default());
        }
        self.println(out, " {");

        let mut body = out.tab();
        for field in fields.iter().filter(|f| !f.is_embedded()) {
            let Expr::FuncType(method) = &field.ty else {
                continue;
            };
            for method_name in &field.names {
                let scope = self.new_scope(&body);
                self.convert_signature(method_name, method, None, &mut body, scope);
                self.stmt_end(&mut body);
            }
        }
        out.need_tabs = true;
        self.println(out, "}");
        if out.tabs > 0 {
            self.println(out, "");
        }
    }

    fn convert_value_spec(
        &mut self,
        spec: &ValueSpec,
        kind: GenKind,
        index: usize,
        group: &mut ConstGroup,
        out: &mut Cursor,
        local: bool,
    ) {
        let is_const = kind == GenKind::Const;
        let (ty, values) = if is_const && spec.values.is_empty() {
            (spec.ty.clone().or_else(|| group.ty.clone()), group.values.clone())
        } else {
            (spec.ty.clone(), spec.values.clone())
        };
        if is_const {
            group.ty = ty.clone();
            group.values = values.clone();
            self.iota = Some(index);
        }

        for (position, name) in spec.names.iter().enumerate() {
            if name == "_" {
                continue;
            }
            let value = values.get(position);
            if !local {
                self.convert_export(name, out);
                self.print(out, "static ");
            }
            if is_const {
                self.print(out, "final ");
            }
            match (&ty, value) {
                (Some(ty), _) => {
                    self.convert_type(ty, out, ResolveOpts::function_ref());
                    self.scopes.set_var(out.scope, name, ty.clone());
                    if !local {
                        self.unit_mut(out.unit).package.add_var_type(name, ty.clone());
                    }
                }
                (None, Some(value)) => {
                    if !local {
                        self.unit_mut(out.unit)
                            .package
                            .add_var_value(name, value.clone());
                    }
                    self.declare(name, value, out);
                }
                (None, None) => self.print(out, "Object"),
            }
            self.print(out, " ");
            self.print(out, name);

            match (value, &ty) {
                (Some(value), _) => {
                    self.print(out, " = ");
                    self.convert_expr(value, out);
                }
                (None, Some(ty)) => self.convert_initializer(ty, out, local),
                (None, None) => {}
            }
            self.stmt_end(out);
        }
        self.iota = None;
    }

    /// Write the inferred type of `name := value` and bind `name`.
    pub(crate) fn declare(&mut self, name: &str, value: &Expr, out: &mut Cursor) {
        let guess = self.find_type(value, out);
        self.scopes.set_var(out.scope, name, guess);
        self.emit(
            out,
            Deferred::Type(TypeTask::Declared {
                name: name.to_string(),
                value: value.clone(),
                opts: ResolveOpts::function_ref(),
            }),
        );
    }

    /// Best guess of a value's type before every declaration is known.
    pub(crate) fn find_type(&self, value: &Expr, out: &Cursor) -> Expr {
        match value {
            Expr::Ident(name) => self
                .scopes
                .var(out.scope, name)
                .cloned()
                .unwrap_or_else(|| value.clone()),
            Expr::Composite { ty: Some(ty), .. } | Expr::TypeAssert { ty: Some(ty), .. } => {
                (**ty).clone()
            }
            Expr::Unary {
                op: UnaryOp::Addr,
                operand,
            } => self.find_type(operand, out),
            Expr::Paren(inner) => self.find_type(inner, out),
            _ => value.clone(),
        }
    }

    /// Initializer for a variable declared with a type but no value.
    fn convert_initializer(&mut self, ty: &Expr, out: &mut Cursor, local: bool) {
        match self.unalias(ty) {
            Expr::ArrayType { .. } => {
                self.print(out, " = new ");
                self.convert_type(ty, out, ResolveOpts::default());
                self.print(out, "{}");
            }
            Expr::MapType { .. } => {
                self.add_import(out, HASH_MAP);
                self.print(out, " = new HashMap<>()");
            }
            underlying if local => {
                if let Some(zero) = zero_initializer(&underlying) {
                    self.print(out, " = ");
                    self.print(out, zero);
                } else if let Expr::Ident(name) = strip_pointer(&underlying) {
                    if matches!(underlying, Expr::Ident(_))
                        && self.class_index.contains_key(&title(name))
                    {
                        self.print(out, " = new ");
                        self.print(out, &title(name));
                        self.print(out, "()");
                    } else {
                        self.print(out, " = null");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Class name of a method receiver type (`*Circle` and `Circle` alike).
fn receiver_class(ty: &Expr) -> String {
    match strip_pointer(ty) {
        Expr::Ident(name) => title(name),
        other => {
            tracing::debug!(?other, "unusual receiver type");
            String::from("Object")
        }
    }
}

/// Java class spelling of an embedded type.
fn type_class_name(ty: &Expr) -> Option<String> {
    match strip_pointer(ty) {
        Expr::Ident(name) => Some(title(name)),
        Expr::Selector { field, .. } => Some(field.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_class() {
        assert_eq!(receiver_class(&Expr::pointer(Expr::ident("circle"))), "Circle");
        assert_eq!(receiver_class(&Expr::ident("Point")), "Point");
    }

    #[test]
    fn test_type_class_name() {
        let ty = Expr::selector(Expr::ident("shapes"), "Shape");
        assert_eq!(type_class_name(&ty), Some("Shape".to_string()));
    }
}
