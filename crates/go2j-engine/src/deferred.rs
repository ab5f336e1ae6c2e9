//! Conversion tasks postponed until every file has been discovered.
//!
//! A task is attached to a reservation in an output buffer together with a
//! copy of the cursor that created it. Finalization runs each task exactly
//! once, writing into the reservation's own buffer. When the program is
//! already finalizing (or the cursor is a scratch cursor) the same tasks run
//! immediately instead.

use crate::ast::{BinaryOp, Expr};
use crate::output::Cursor;
use crate::program::Program;
use crate::resolve::ResolveOpts;

/// A task with the cursor it resumes writing through.
#[derive(Debug)]
pub struct Pending {
    pub cursor: Cursor,
    pub task: Deferred,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    Type(TypeTask),
    Statement(StmtTask),
    Finalize(FinalizeTask),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeTask {
    /// Java spelling of a named type.
    Name { ty: Expr, opts: ResolveOpts },
    /// Inferred type of a declaration without an explicit type; binds the
    /// declared name once resolved.
    Declared {
        name: String,
        value: Expr,
        opts: ResolveOpts,
    },
}

/// Statement forms that depend on the type of an operand.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtTask {
    RangeHeader(RangeLoop),
    /// Key and value declarations at the top of a range loop body.
    RangeBindings(RangeLoop),
    Assign(IndexAssign),
    Index {
        base: Expr,
        index: Expr,
    },
    Slice {
        base: Expr,
        low: Option<Expr>,
        high: Option<Expr>,
    },
    Len(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeLoop {
    pub key: Option<String>,
    pub value: Option<String>,
    pub iterable: Expr,
}

/// Assignment whose target is an index expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexAssign {
    pub base: Expr,
    pub index: Expr,
    pub update: IndexUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexUpdate {
    Set(Expr),
    Compound(BinaryOp, Expr),
    /// `++` when true, `--` otherwise.
    Step(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeTask {
    /// A returned value whose class may need to implement the declared
    /// result interface.
    Conformance { value: Expr, declared: Expr },
}

/// How a reservation for a task is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Within the current line.
    Inline,
    /// A whole statement; the parent continues on the next line.
    Statement,
    /// Lines at the current indentation.
    Block,
}

impl Deferred {
    pub(crate) fn placement(&self) -> Placement {
        match self {
            Self::Statement(StmtTask::Assign(_)) => Placement::Statement,
            Self::Statement(StmtTask::RangeBindings(_)) => Placement::Block,
            _ => Placement::Inline,
        }
    }

    /// Tasks that must run at once even during discovery.
    pub(crate) fn direct_eval(&self) -> bool {
        match self {
            Self::Type(TypeTask::Name { opts, .. } | TypeTask::Declared { opts, .. }) => {
                opts.direct_eval
            }
            _ => false,
        }
    }
}

impl Program {
    /// Run `task` now when its result can be known, otherwise reserve a
    /// place for it.
    pub(crate) fn emit(&mut self, out: &mut Cursor, task: Deferred) {
        if self.eager(out, task.direct_eval()) {
            self.run(task, out);
            return;
        }
        let placement = task.placement();
        match placement {
            Placement::Inline => {
                self.reserve_inline(out, Some(task));
            }
            Placement::Statement => {
                self.reserve_inline(out, Some(task));
                if !out.ban_stmt_end {
                    out.need_tabs = true;
                }
            }
            Placement::Block => {
                self.reserve_block(out, Some(task));
            }
        }
    }

    pub(crate) fn run(&mut self, task: Deferred, out: &mut Cursor) {
        match task {
            Deferred::Type(TypeTask::Name { ty, opts }) => {
                self.convert_type_now(&ty, out, opts);
            }
            Deferred::Type(TypeTask::Declared { name, value, opts }) => {
                if let Some(ty) = self.resolve_type(&value, out, opts) {
                    self.scopes.set_var(out.scope, &name, ty);
                }
            }
            Deferred::Statement(StmtTask::RangeHeader(range)) => {
                self.convert_range_header(&range, out);
            }
            Deferred::Statement(StmtTask::RangeBindings(range)) => {
                self.convert_range_bindings(&range, out);
            }
            Deferred::Statement(StmtTask::Assign(assign)) => {
                self.convert_index_assign(&assign, out);
            }
            Deferred::Statement(StmtTask::Index { base, index }) => {
                self.convert_index_now(&base, &index, out);
            }
            Deferred::Statement(StmtTask::Slice { base, low, high }) => {
                self.convert_slice_now(&base, low.as_ref(), high.as_ref(), out);
            }
            Deferred::Statement(StmtTask::Len(value)) => {
                self.convert_len_now(&value, out);
            }
            Deferred::Finalize(FinalizeTask::Conformance { value, declared }) => {
                self.check_conformance(&value, &declared, out);
            }
        }
    }
}
