//! Statements.

use crate::ast::{AssignOp, BinaryOp, BranchKind, CaseClause, Expr, Stmt};
use crate::deferred::{Deferred, FinalizeTask, IndexAssign, IndexUpdate, RangeLoop, StmtTask};
use crate::output::Cursor;
use crate::program::Program;
use crate::resolve::ResolveOpts;

impl Program {
    /// ` {`, the statements one level deeper, then `}` without a newline.
    pub(crate) fn convert_block(
        &mut self,
        body: &[Stmt],
        out: &mut Cursor,
        bindings: Option<&RangeLoop>,
    ) {
        self.println(out, " {");
        self.convert_block_lines(body, out, bindings);
    }

    fn convert_block_lines(
        &mut self,
        body: &[Stmt],
        out: &mut Cursor,
        bindings: Option<&RangeLoop>,
    ) {
        let mut inner = out.tab();
        if let Some(range) = bindings {
            self.emit(&mut inner, Deferred::Statement(StmtTask::RangeBindings(range.clone())));
        }
        for stmt in body {
            self.convert_stmt(stmt, &mut inner);
        }
        out.need_tabs = true;
        self.print(out, "}");
    }

    pub(crate) fn convert_stmt(&mut self, stmt: &Stmt, out: &mut Cursor) {
        match stmt {
            Stmt::Decl(decl) => self.convert_gen_decl(decl, out, true),
            Stmt::Empty => {}
            Stmt::Labeled { label, stmt } => {
                self.print(out, label);
                self.print(out, ": ");
                self.convert_stmt(stmt, out);
            }
            Stmt::Expr(expr) => {
                self.convert_expr(expr, out);
                self.stmt_end(out);
            }
            Stmt::IncDec { target, inc } => {
                if let Expr::Index { base, index } = target {
                    let assign = IndexAssign {
                        base: (**base).clone(),
                        index: (**index).clone(),
                        update: IndexUpdate::Step(*inc),
                    };
                    self.emit(out, Deferred::Statement(StmtTask::Assign(assign)));
                    return;
                }
                self.convert_expr(target, out);
                self.print(out, if *inc { "++" } else { "--" });
                self.stmt_end(out);
            }
            Stmt::Assign { lhs, op, rhs } => self.convert_assign(lhs, *op, rhs, out),
            Stmt::Go(call) => {
                self.print(out, "new Thread(() ->");
                match call {
                    Expr::Call { func, args, .. } if args.is_empty() => match &**func {
                        Expr::FuncLit { body, .. } => self.convert_block(body, out, None),
                        _ => {
                            self.print(out, " ");
                            self.convert_expr(call, out);
                        }
                    },
                    _ => {
                        self.print(out, " ");
                        self.convert_expr(call, out);
                    }
                }
                self.print(out, ").start()");
                self.stmt_end(out);
            }
            Stmt::Defer(call) => {
                // Deferred calls have no Java counterpart outside try/finally.
                let callee = match call {
                    Expr::Call { func, .. } => match &**func {
                        Expr::FuncLit { .. } => "func literal".to_string(),
                        other => callee_name(other),
                    },
                    other => callee_name(other),
                };
                self.println(out, &format!("// defer {}", callee));
            }
            Stmt::Return(values) => self.convert_return(values, out),
            Stmt::Branch { kind, label } => self.convert_branch(*kind, label.as_deref(), out),
            Stmt::Block(body) => {
                self.println(out, "{");
                self.convert_block_lines(body, out, None);
                self.println(out, "");
            }
            Stmt::If { .. } => {
                self.convert_if(stmt, out);
                self.println(out, "");
            }
            Stmt::Switch { init, tag, cases } => {
                if let Some(init) = init {
                    self.convert_stmt(init, out);
                }
                match tag {
                    Some(tag) => self.convert_switch(tag, cases, out),
                    None => self.convert_tagless_switch(cases, out),
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.print(out, "for (");
                let mut clause = out.without_stmt_end();
                if let Some(init) = init {
                    self.convert_stmt(init, &mut clause);
                }
                self.print(&mut clause, "; ");
                if let Some(cond) = cond {
                    self.convert_expr(cond, &mut clause);
                }
                self.print(&mut clause, "; ");
                if let Some(post) = post {
                    self.convert_stmt(post, &mut clause);
                }
                self.print(&mut clause, ")");
                out.need_tabs = false;
                self.convert_block(body, out, None);
                self.println(out, "");
            }
            Stmt::Range {
                key,
                value,
                iterable,
                body,
                ..
            } => self.convert_range(key.as_ref(), value.as_ref(), iterable, body, out),
            Stmt::Unsupported(kind) => {
                tracing::trace!(kind = %kind, "statement without a conversion");
            }
        }
    }

    fn convert_branch(&mut self, kind: BranchKind, label: Option<&str>, out: &mut Cursor) {
        let keyword = match kind {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => {
                self.println(out, &format!("// goto {}", label.unwrap_or_default()));
                return;
            }
            // Java cases fall through unless they break.
            BranchKind::Fallthrough => return,
        };
        self.print(out, keyword);
        if let Some(label) = label {
            self.print(out, " ");
            self.print(out, label);
        }
        self.stmt_end(out);
    }

    fn convert_assign(&mut self, lhs: &[Expr], op: AssignOp, rhs: &[Expr], out: &mut Cursor) {
        if lhs.len() > 1 && lhs.len() == rhs.len() {
            for (index, (target, value)) in lhs.iter().zip(rhs).enumerate() {
                if index > 0 && out.ban_stmt_end {
                    self.print(out, ", ");
                }
                // Java declares the type once per comma-separated list.
                let op = if index > 0 && out.ban_stmt_end && op == AssignOp::Define {
                    AssignOp::Assign
                } else {
                    op
                };
                self.convert_single_assign(target, &[], op, value, out);
            }
            return;
        }
        let (Some(target), Some(value)) = (lhs.first(), rhs.first()) else {
            return;
        };
        self.convert_single_assign(target, &lhs[1..], op, value, out);
    }

    fn convert_single_assign(
        &mut self,
        target: &Expr,
        extra: &[Expr],
        op: AssignOp,
        value: &Expr,
        out: &mut Cursor,
    ) {
        if let (Expr::Index { base, index }, false) = (target, op == AssignOp::Define) {
            let update = match op {
                AssignOp::Compound(op) => IndexUpdate::Compound(op, value.clone()),
                _ => IndexUpdate::Set(value.clone()),
            };
            let assign = IndexAssign {
                base: (**base).clone(),
                index: (**index).clone(),
                update,
            };
            self.emit(out, Deferred::Statement(StmtTask::Assign(assign)));
            return;
        }
        if target.as_ident() == Some("_") && extra.is_empty() {
            // `_ = x` only silences the compiler.
            if matches!(value, Expr::Call { .. }) {
                self.convert_expr(value, out);
                self.stmt_end(out);
            }
            return;
        }

        if op == AssignOp::Define {
            if let Some(name) = target.as_ident() {
                self.declare(name, value, out);
                self.print(out, " ");
            }
        }
        self.convert_expr(target, out);
        for other in extra {
            self.print(out, " /* ");
            self.convert_expr(other, out);
            self.print(out, " */");
        }
        let token = match op {
            AssignOp::Assign | AssignOp::Define => " = ".to_string(),
            AssignOp::Compound(BinaryOp::AndNot) => " &= ~".to_string(),
            AssignOp::Compound(op) => format!(" {}= ", op.as_str()),
        };
        self.print(out, &token);
        self.convert_expr(value, out);
        self.stmt_end(out);
    }

    /// `m.put(k, v)` for maps, `a[i] = v` otherwise.
    pub(crate) fn convert_index_assign(&mut self, assign: &IndexAssign, out: &mut Cursor) {
        let base_type = self.source_type(&assign.base, out);
        if matches!(base_type, Some(Expr::MapType { .. })) {
            self.convert_expr(&assign.base, out);
            self.print(out, ".put(");
            self.convert_expr(&assign.index, out);
            self.print(out, ", ");
            match &assign.update {
                IndexUpdate::Set(value) => self.convert_expr(value, out),
                IndexUpdate::Compound(op, value) => {
                    self.convert_map_get(assign, out);
                    self.print(out, &format!(" {} ", binary_token(*op)));
                    self.convert_expr(value, out);
                }
                IndexUpdate::Step(inc) => {
                    self.convert_map_get(assign, out);
                    self.print(out, if *inc { " + 1" } else { " - 1" });
                }
            }
            self.print(out, ")");
            self.stmt_end(out);
            return;
        }

        self.convert_expr(&assign.base, out);
        self.print(out, "[");
        self.convert_expr(&assign.index, out);
        self.print(out, "]");
        match &assign.update {
            IndexUpdate::Set(value) => {
                self.print(out, " = ");
                self.convert_expr(value, out);
            }
            IndexUpdate::Compound(BinaryOp::AndNot, value) => {
                self.print(out, " &= ~");
                self.convert_expr(value, out);
            }
            IndexUpdate::Compound(op, value) => {
                self.print(out, &format!(" {}= ", op.as_str()));
                self.convert_expr(value, out);
            }
            IndexUpdate::Step(inc) => self.print(out, if *inc { "++" } else { "--" }),
        }
        self.stmt_end(out);
    }

    fn convert_map_get(&mut self, assign: &IndexAssign, out: &mut Cursor) {
        self.convert_expr(&assign.base, out);
        self.print(out, ".get(");
        self.convert_expr(&assign.index, out);
        self.print(out, ")");
    }

    /// `if (...) {...} else ...` without the trailing newline.
    fn convert_if(&mut self, stmt: &Stmt, out: &mut Cursor) {
        let Stmt::If {
            init,
            cond,
            then,
            els,
        } = stmt
        else {
            return;
        };
        if let Some(init) = init {
            self.convert_stmt(init, out);
        }
        self.print(out, "if (");
        self.convert_expr(cond, out);
        self.print(out, ")");
        self.convert_block(then, out, None);
        match els.as_deref() {
            Some(nested @ Stmt::If { init: None, .. }) => {
                self.print(out, " else ");
                self.convert_if(nested, out);
            }
            Some(Stmt::Block(body)) => {
                self.print(out, " else");
                self.convert_block(body, out, None);
            }
            Some(other) => {
                // An else-if with an init statement needs its own block.
                self.print(out, " else");
                self.convert_block(std::slice::from_ref(other), out, None);
            }
            None => {}
        }
    }

    fn convert_switch(&mut self, tag: &Expr, cases: &[CaseClause], out: &mut Cursor) {
        self.print(out, "switch (");
        self.convert_expr(tag, out);
        self.println(out, ") {");
        for case in cases {
            if case.is_default() {
                self.println(out, "default:");
            }
            for value in &case.values {
                self.print(out, "case ");
                self.convert_expr(value, out);
                self.println(out, ":");
            }
            let mut body = out.tab();
            for stmt in &case.body {
                self.convert_stmt(stmt, &mut body);
            }
            if !ends_case(&case.body) {
                self.println(&mut body, "break;");
            }
        }
        self.println(out, "}");
    }

    /// A switch without a tag becomes an if/else chain.
    fn convert_tagless_switch(&mut self, cases: &[CaseClause], out: &mut Cursor) {
        let (defaults, conditions): (Vec<_>, Vec<_>) =
            cases.iter().partition(|case| case.is_default());
        for (index, case) in conditions.iter().enumerate() {
            self.print(out, if index == 0 { "if (" } else { " else if (" });
            for (position, value) in case.values.iter().enumerate() {
                if position > 0 {
                    self.print(out, " || ");
                }
                self.convert_expr(value, out);
            }
            self.print(out, ")");
            self.convert_block(&case.body, out, None);
        }
        if let Some(default) = defaults.first() {
            if conditions.is_empty() {
                self.println(out, "{");
                self.convert_block_lines(&default.body, out, None);
            } else {
                self.print(out, " else");
                self.convert_block(&default.body, out, None);
            }
        }
        if !cases.is_empty() {
            self.println(out, "");
        }
    }

    fn convert_range(
        &mut self,
        key: Option<&Expr>,
        value: Option<&Expr>,
        iterable: &Expr,
        body: &[Stmt],
        out: &mut Cursor,
    ) {
        let name = |expr: Option<&Expr>| {
            expr.and_then(Expr::as_ident)
                .filter(|name| *name != "_")
                .map(str::to_string)
        };
        let range = RangeLoop {
            key: name(key),
            value: name(value),
            iterable: iterable.clone(),
        };
        // Provisional bindings; the header rebinds once the iterable's type
        // is known.
        if let Some(key) = &range.key {
            self.scopes.set_var(out.scope, key, Expr::ident("int"));
        }
        if let Some(value) = &range.value {
            let element = Expr::index(iterable.clone(), Expr::int("0"));
            self.scopes.set_var(out.scope, value, element);
        }

        self.emit(out, Deferred::Statement(StmtTask::RangeHeader(range.clone())));
        self.convert_block(body, out, Some(&range));
        self.println(out, "");
    }

    /// `for (...)` of a range loop, chosen by the iterable's type.
    pub(crate) fn convert_range_header(&mut self, range: &RangeLoop, out: &mut Cursor) {
        let iterable = &range.iterable;
        let key = range.key.as_deref();
        let value = range.value.as_deref();
        match self.source_type(iterable, out) {
            Some(map @ Expr::MapType { .. }) => {
                let Expr::MapType { key: key_ty, value: value_ty } = &map else {
                    return;
                };
                self.print(out, "for (");
                let entry = ResolveOpts {
                    range_entry: true,
                    direct_eval: true,
                    ..ResolveOpts::default()
                };
                self.convert_type(&map, out, entry);
                self.print(out, " : ");
                self.convert_expr(iterable, out);
                self.print(out, ".entrySet())");
                if let Some(key) = key {
                    self.scopes.set_var(out.scope, key, (**key_ty).clone());
                }
                if let Some(value) = value {
                    self.scopes.set_var(out.scope, value, (**value_ty).clone());
                }
            }
            Some(Expr::ArrayType { elem, .. } | Expr::Ellipsis(elem)) => match key {
                Some(key) => {
                    self.print(out, &format!("for (int {} = 0; {} < ", key, key));
                    self.convert_expr(iterable, out);
                    self.print(out, &format!(".length; {}++)", key));
                    self.scopes.set_var(out.scope, key, Expr::ident("int"));
                    if let Some(value) = value {
                        self.scopes.set_var(out.scope, value, *elem);
                    }
                }
                None => {
                    self.print(out, "for (");
                    self.convert_type(&elem, out, ResolveOpts::direct());
                    self.print(out, " ");
                    self.print(out, value.unwrap_or("ignored"));
                    self.print(out, " : ");
                    self.convert_expr(iterable, out);
                    self.print(out, ")");
                    if let Some(value) = value {
                        self.scopes.set_var(out.scope, value, *elem);
                    }
                }
            },
            Some(Expr::Ident(name)) if name == "string" => {
                match key {
                    Some(key) => {
                        self.print(out, &format!("for (int {} = 0; {} < ", key, key));
                        self.convert_expr(iterable, out);
                        self.print(out, &format!(".length(); {}++)", key));
                        self.scopes.set_var(out.scope, key, Expr::ident("int"));
                    }
                    None => {
                        self.print(out, "for (char ");
                        self.print(out, value.unwrap_or("ignored"));
                        self.print(out, " : ");
                        self.convert_expr(iterable, out);
                        self.print(out, ".toCharArray())");
                    }
                }
                if let Some(value) = value {
                    self.scopes.set_var(out.scope, value, Expr::ident("rune"));
                }
            }
            Some(Expr::Ident(name)) if is_integer(&name) => {
                let counter = key.unwrap_or("i");
                self.print(out, &format!("for (int {} = 0; {} < ", counter, counter));
                self.convert_expr(iterable, out);
                self.print(out, &format!("; {}++)", counter));
                if let Some(key) = key {
                    self.scopes.set_var(out.scope, key, Expr::ident("int"));
                }
            }
            other => {
                tracing::debug!(?other, "range over a value of unknown type");
                self.print(out, "for (Object ");
                self.print(out, value.or(key).unwrap_or("ignored"));
                self.print(out, " : ");
                self.convert_expr(iterable, out);
                self.print(out, ")");
            }
        }
    }

    /// Key and value declarations opening a range loop body.
    pub(crate) fn convert_range_bindings(&mut self, range: &RangeLoop, out: &mut Cursor) {
        let iterable = &range.iterable;
        match self.source_type(iterable, out) {
            Some(Expr::MapType { key: key_ty, value: value_ty }) => {
                if let Some(key) = &range.key {
                    self.convert_type(&key_ty, out, ResolveOpts::direct());
                    self.println(out, &format!(" {} = entry.getKey();", key));
                }
                if let Some(value) = &range.value {
                    self.convert_type(&value_ty, out, ResolveOpts::direct());
                    self.println(out, &format!(" {} = entry.getValue();", value));
                }
            }
            Some(Expr::ArrayType { elem, .. } | Expr::Ellipsis(elem)) => {
                if let (Some(key), Some(value)) = (&range.key, &range.value) {
                    self.convert_type(&elem, out, ResolveOpts::direct());
                    self.print(out, &format!(" {} = ", value));
                    self.convert_expr(iterable, out);
                    self.println(out, &format!("[{}];", key));
                }
            }
            Some(Expr::Ident(name)) if name == "string" => {
                if let (Some(key), Some(value)) = (&range.key, &range.value) {
                    self.print(out, &format!("char {} = ", value));
                    self.convert_expr(iterable, out);
                    self.println(out, &format!(".charAt({});", key));
                }
            }
            _ => {}
        }
    }

    fn convert_return(&mut self, values: &[Expr], out: &mut Cursor) {
        self.print(out, "return");
        if let Some(first) = values.first() {
            self.print(out, " ");
            self.convert_expr(first, out);
            for extra in &values[1..] {
                self.print(out, " /* ");
                self.convert_expr(extra, out);
                self.print(out, " */");
            }
            if let Some(declared) = out.result.clone() {
                if !out.scratch {
                    let task = FinalizeTask::Conformance {
                        value: first.clone(),
                        declared,
                    };
                    self.emit(out, Deferred::Finalize(task));
                }
            }
        }
        self.stmt_end(out);
    }

    /// Add the declared result interface to the class of a returned value.
    pub(crate) fn check_conformance(&mut self, value: &Expr, declared: &Expr, out: &Cursor) {
        let opts = ResolveOpts::direct();
        let mut inferred = self.scratch(out);
        self.resolve_type(value, &mut inferred, opts);
        let inferred = self.scratch_text(&inferred);
        let mut interface = self.scratch(out);
        self.convert_type(declared, &mut interface, opts);
        let interface = self.scratch_text(&interface);

        if inferred == interface || !self.interfaces.contains(&interface) {
            return;
        }
        let Some(&class) = self.class_index.get(&inferred) else {
            return;
        };
        let class = &mut self.classes[class.0 as usize];
        if class.interfaces.contains(&interface) {
            return;
        }
        let separator = if class.interfaces.is_empty() {
            " implements "
        } else {
            ", "
        };
        class.interfaces.insert(interface.clone());
        let mut at = class.implements_at.clone();
        let unit = class.unit;
        tracing::debug!(class = %inferred, interface = %interface, "inferred implementation");
        self.print(&mut at, separator);
        self.print(&mut at, &interface);
        let class_out = Cursor { unit, ..at };
        self.add_referenced(&class_out, &interface);
    }
}

/// Whether a case body already leaves the switch.
fn ends_case(body: &[Stmt]) -> bool {
    match body.last() {
        Some(Stmt::Return(_) | Stmt::Branch { .. }) => true,
        Some(Stmt::Expr(Expr::Call { func, .. })) => func.as_ident() == Some("panic"),
        _ => false,
    }
}

/// Dotted spelling of a callee for comments.
fn callee_name(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Selector { base, field } => format!("{}.{}", callee_name(base), field),
        Expr::Paren(inner) | Expr::Star(inner) => callee_name(inner),
        _ => "call".to_string(),
    }
}

fn is_integer(name: &str) -> bool {
    matches!(
        name,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
            | "uint64" | "byte"
    )
}

fn binary_token(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::AndNot => "& ~",
        other => other.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_terminators() {
        assert!(ends_case(&[Stmt::Return(vec![])]));
        assert!(ends_case(&[Stmt::Expr(Expr::call(
            Expr::ident("panic"),
            vec![Expr::string("boom")]
        ))]));
        assert!(!ends_case(&[Stmt::Expr(Expr::ident("x"))]));
        assert!(!ends_case(&[]));
    }
}
