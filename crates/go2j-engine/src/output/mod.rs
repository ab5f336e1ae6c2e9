//! Java text emission.

pub mod buffer;

use crate::ast::Expr;
use crate::env::{ClassId, ScopeId, UnitId};
use buffer::{BufferArena, BufferId};

const TAB: &str = "\t";

/// The method receiver of the function being converted.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: String,
    pub class: ClassId,
}

/// Where and how converted text is written.
///
/// Cursors are cheap to clone: a deferred task keeps a copy of the cursor it
/// was created with and resumes writing through it during finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub buffer: BufferId,
    pub tabs: usize,
    /// Indentation is owed before the next text.
    pub need_tabs: bool,
    /// Statements end without `;` and newline (for-loop clauses).
    pub ban_stmt_end: bool,
    /// Text is for inspection only and must be produced immediately.
    pub scratch: bool,
    pub unit: UnitId,
    pub scope: ScopeId,
    pub receiver: Option<Receiver>,
    /// Declared first result of the enclosing function.
    pub result: Option<Expr>,
}

impl Cursor {
    pub fn new(buffer: BufferId, unit: UnitId, scope: ScopeId) -> Self {
        Self {
            buffer,
            tabs: 0,
            need_tabs: true,
            ban_stmt_end: false,
            scratch: false,
            unit,
            scope,
            receiver: None,
            result: None,
        }
    }

    pub fn print<T>(&mut self, arena: &mut BufferArena<T>, text: &str) {
        if self.need_tabs {
            for _ in 0..self.tabs {
                arena.push_str(self.buffer, TAB);
            }
            self.need_tabs = false;
        }
        arena.push_str(self.buffer, text);
    }

    /// Write `text` and end the line. Blank lines carry no indentation.
    pub fn println<T>(&mut self, arena: &mut BufferArena<T>, text: &str) {
        if !text.is_empty() {
            self.print(arena, text);
        }
        arena.push_str(self.buffer, "\n");
        self.need_tabs = true;
    }

    /// Cursor one level deeper, starting on a fresh line.
    pub fn tab(&self) -> Self {
        Self {
            tabs: self.tabs + 1,
            need_tabs: true,
            ban_stmt_end: false,
            ..self.clone()
        }
    }

    pub fn without_stmt_end(&self) -> Self {
        Self {
            ban_stmt_end: true,
            ..self.clone()
        }
    }

    pub fn stmt_end<T>(&mut self, arena: &mut BufferArena<T>) {
        if !self.ban_stmt_end {
            self.println(arena, ";");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Scopes;

    fn cursor(arena: &mut BufferArena<()>) -> Cursor {
        let mut scopes = Scopes::default();
        let scope = scopes.new_scope(None);
        Cursor::new(arena.new_buffer(), UnitId(0), scope)
    }

    #[test]
    fn test_indentation_owed_after_newline() {
        let mut arena = BufferArena::new();
        let mut out = cursor(&mut arena).tab();
        out.print(&mut arena, "int x");
        out.print(&mut arena, " = 1");
        out.stmt_end(&mut arena);
        out.println(&mut arena, "x++;");
        assert_eq!(arena.text(out.buffer), "\tint x = 1;\n\tx++;\n");
    }

    #[test]
    fn test_banned_statement_end() {
        let mut arena = BufferArena::new();
        let mut out = cursor(&mut arena).without_stmt_end();
        out.print(&mut arena, "i++");
        out.stmt_end(&mut arena);
        assert_eq!(arena.text(out.buffer), "i++");
    }

    #[test]
    fn test_blank_line_has_no_indentation() {
        let mut arena = BufferArena::new();
        let mut out = cursor(&mut arena).tab();
        out.println(&mut arena, "}");
        out.println(&mut arena, "");
        out.println(&mut arena, "x;");
        assert_eq!(arena.text(out.buffer), "\t}\n\n\tx;\n");
    }
}
