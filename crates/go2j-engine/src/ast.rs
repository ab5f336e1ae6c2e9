//! Go syntax tree.
//!
//! One closed enum per node category. Type expressions share the [`Expr`]
//! enum with value expressions because Go allows them in the same positions
//! (`make([]int, 3)`, `[]byte(s)`, composite literal types).

/// A parsed Go source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Local alias (`import f "fmt"`), `.` or `_`.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub receiver: Option<Field>,
    pub name: String,
    pub ty: FuncType,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

impl FuncType {
    /// Type of the first declared result, if any.
    pub fn first_result(&self) -> Option<&Expr> {
        self.results.first().map(|field| &field.ty)
    }
}

/// A parameter, result, struct field or interface member.
///
/// Embedded struct fields and embedded interfaces have no names.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: Expr,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: Expr) -> Self {
        Self {
            names: vec![name.into()],
            ty,
        }
    }

    pub fn embedded(ty: Expr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind {
    Var,
    Const,
    Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub kind: GenKind,
    pub specs: Vec<Spec>,
    /// Written as a parenthesized group.
    pub grouped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub ty: Expr,
    /// `type A = B`
    pub alias: bool,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl(GenDecl),
    Empty,
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    IncDec {
        target: Expr,
        inc: bool,
    },
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        label: Option<String>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        cases: Vec<CaseClause>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        iterable: Expr,
        body: Block,
    },
    /// Statement kinds without a conversion rule (select, send, type switch).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// Empty for `default:`.
    pub values: Vec<Expr>,
    pub body: Block,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Compound(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
    RawString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    BitNot,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Pos,
            "-" => Self::Neg,
            "!" => Self::Not,
            "^" => Self::BitNot,
            "&" => Self::Addr,
            "<-" => Self::Recv,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    AndNot,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "&^" => Self::AndNot,
            "&&" => Self::And,
            "||" => Self::Or,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => return None,
        })
    }

    /// Go spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Operators whose result is a boolean regardless of operand types.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    BasicLit {
        kind: LitKind,
        value: String,
    },
    /// `T{...}`; `ty` is absent for elided inner literals of arrays and maps.
    Composite {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        base: Box<Expr>,
        field: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        base: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is absent in `x.(type)`.
    TypeAssert {
        base: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        /// Last argument spread with `...`.
        spread: bool,
    },
    /// Pointer type or dereference.
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    /// Slice type when `len` is absent.
    ArrayType {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncType(Box<FuncType>),
    StructType(Vec<Field>),
    InterfaceType(Vec<Field>),
    /// Variadic parameter type `...T`.
    Ellipsis(Box<Expr>),
    ChanType(Box<Expr>),
    Unsupported(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn int(value: impl Into<String>) -> Self {
        Self::BasicLit {
            kind: LitKind::Int,
            value: value.into(),
        }
    }

    pub fn float(value: impl Into<String>) -> Self {
        Self::BasicLit {
            kind: LitKind::Float,
            value: value.into(),
        }
    }

    /// String literal; `value` is the unquoted text.
    pub fn string(value: &str) -> Self {
        Self::BasicLit {
            kind: LitKind::String,
            value: format!("\"{}\"", value),
        }
    }

    pub fn selector(base: Expr, field: impl Into<String>) -> Self {
        Self::Selector {
            base: Box::new(base),
            field: field.into(),
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            func: Box::new(func),
            args,
            spread: false,
        }
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Self::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn composite(ty: Expr, elts: Vec<Expr>) -> Self {
        Self::Composite {
            ty: Some(Box::new(ty)),
            elts,
        }
    }

    pub fn slice_of(elem: Expr) -> Self {
        Self::ArrayType {
            len: None,
            elem: Box::new(elem),
        }
    }

    pub fn map_of(key: Expr, value: Expr) -> Self {
        Self::MapType {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn pointer(inner: Expr) -> Self {
        Self::Star(Box::new(inner))
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Parse a dotted Go type name such as `time.Time`.
    pub fn from_type_name(name: &str) -> Self {
        match name.split_once('.') {
            Some((pkg, ty)) => Self::selector(Self::ident(pkg), ty),
            None => Self::ident(name),
        }
    }
}

/// Go exports identifiers that start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Upper-case the first letter of `name`.
pub fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(title("shapes"), "Shapes");
        assert_eq!(title("Shapes"), "Shapes");
        assert_eq!(title(""), "");
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Foo"));
        assert!(!is_exported("foo"));
        assert!(!is_exported("_"));
    }

    #[test]
    fn test_from_type_name() {
        assert_eq!(
            Expr::from_type_name("time.Time"),
            Expr::selector(Expr::ident("time"), "Time")
        );
        assert_eq!(Expr::from_type_name("string"), Expr::ident("string"));
    }
}
