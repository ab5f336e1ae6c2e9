//! Type and symbol environment.
//!
//! Variable types live in an arena of flat tables: one per function
//! conversion, chained to the table of the Go package the function belongs
//! to. Nested blocks share their function's table, so a name re-declared in
//! an inner block overwrites the outer binding.

use crate::ast::Expr;
use crate::output::Cursor;
use crate::output::buffer::BufferId;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

#[derive(Debug, Default)]
struct VarTable {
    vars: HashMap<String, Expr>,
    parent: Option<ScopeId>,
}

/// Arena of variable type tables.
#[derive(Debug, Default)]
pub struct Scopes {
    tables: Vec<VarTable>,
}

impl Scopes {
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.tables.len() as u32);
        self.tables.push(VarTable {
            vars: HashMap::new(),
            parent,
        });
        id
    }

    pub fn set_var(&mut self, scope: ScopeId, name: &str, ty: Expr) {
        self.tables[scope.0 as usize]
            .vars
            .insert(name.to_string(), ty);
    }

    /// Type bound to `name` in `scope` or any enclosing table.
    pub fn var(&self, scope: ScopeId, name: &str) -> Option<&Expr> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let table = &self.tables[id.0 as usize];
            if let Some(ty) = table.vars.get(name) {
                return Some(ty);
            }
            current = table.parent;
        }
        None
    }

    pub fn is_var(&self, scope: ScopeId, name: &str) -> bool {
        self.var(scope, name).is_some()
    }
}

/// Cross-file symbol table of one compilation unit.
///
/// Entries are only ever added, and only during discovery; the first
/// declaration of a name wins.
#[derive(Debug, Default)]
pub struct Package {
    funcs: HashMap<String, Expr>,
    vars: HashMap<String, Expr>,
    /// Initializers of package variables declared without a type.
    values: HashMap<String, Expr>,
}

impl Package {
    pub fn add_func(&mut self, name: &str, result: Expr) {
        self.funcs.entry(name.to_string()).or_insert(result);
    }

    pub fn add_var_type(&mut self, name: &str, ty: Expr) {
        self.vars.entry(name.to_string()).or_insert(ty);
    }

    pub fn add_var_value(&mut self, name: &str, value: Expr) {
        self.values.entry(name.to_string()).or_insert(value);
    }

    pub fn func_result(&self, name: &str) -> Option<&Expr> {
        self.funcs.get(name)
    }

    pub fn var_type(&self, name: &str) -> Option<&Expr> {
        self.vars.get(name)
    }

    pub fn var_value(&self, name: &str) -> Option<&Expr> {
        self.values.get(name)
    }
}

/// What an imported package name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    /// Key of the unit holding the package's symbols.
    pub unit_key: String,
    /// Java import needed when the package class is referenced, for
    /// packages of the program's own module.
    pub qualified: Option<String>,
}

/// One Java compilation unit: the class of a Go package or of one exported
/// Go type.
#[derive(Debug)]
pub struct CompilationUnit {
    pub dir: String,
    pub name: String,
    pub is_package: bool,
    /// Library source, parsed for signatures and never emitted.
    pub system: bool,
    pub root: BufferId,
    /// The package unit of the Go package this unit was generated from.
    pub package_unit: UnitId,
    /// Buffer receiving the import lines.
    pub imports_at: Option<BufferId>,
    /// Local package names visible to files of this package.
    pub import_names: HashMap<String, ImportName>,
    /// Class names used by this unit's text.
    pub referenced: BTreeSet<String>,
    /// Qualified Java imports required by conversions.
    pub imports: BTreeSet<String>,
    /// Result types of every function written into this unit.
    pub funcs: HashMap<String, Expr>,
    pub package: Package,
    /// Scope holding package-level variables.
    pub scope: ScopeId,
}

impl CompilationUnit {
    /// Key joining directory and class name, e.g. `example.com/app/Main`.
    pub fn key(&self) -> String {
        unit_key(&self.dir, &self.name)
    }

    /// Java package name, e.g. `example.com.app`.
    pub fn java_package(&self) -> String {
        self.dir.replace('/', ".")
    }

    pub fn qualified_name(&self) -> String {
        if self.dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.java_package(), self.name)
        }
    }

    /// Output path relative to the Java source root.
    pub fn output_path(&self) -> String {
        format!("{}.java", self.qualified_name().replace('.', "/"))
    }
}

pub fn unit_key(dir: &str, name: &str) -> String {
    format!("{}/{}", dir, name)
}

/// A Java class generated for a Go struct type.
#[derive(Debug)]
pub struct OutputClass {
    pub name: String,
    pub unit: UnitId,
    /// Writes after the class name and its `extends` clause.
    pub implements_at: Cursor,
    /// Writes after the constructors, inside the class body.
    pub functions_at: Cursor,
    /// Interfaces already listed in the `implements` clause.
    pub interfaces: BTreeSet<String>,
    /// Declared types of the named fields.
    pub fields: HashMap<String, Expr>,
    /// Result types of the methods written into the class.
    pub methods: HashMap<String, Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lookup_walks_parents() {
        let mut scopes = Scopes::default();
        let package = scopes.new_scope(None);
        let function = scopes.new_scope(Some(package));
        scopes.set_var(package, "limit", Expr::ident("int"));
        scopes.set_var(function, "name", Expr::ident("string"));

        assert_eq!(scopes.var(function, "limit"), Some(&Expr::ident("int")));
        assert_eq!(scopes.var(function, "name"), Some(&Expr::ident("string")));
        assert_eq!(scopes.var(package, "name"), None);
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let mut scopes = Scopes::default();
        let scope = scopes.new_scope(None);
        scopes.set_var(scope, "x", Expr::ident("int"));
        scopes.set_var(scope, "x", Expr::ident("string"));
        assert_eq!(scopes.var(scope, "x"), Some(&Expr::ident("string")));
    }

    #[test]
    fn test_package_keeps_first_declaration() {
        let mut package = Package::default();
        package.add_func("Foo", Expr::ident("Bar"));
        package.add_func("Foo", Expr::ident("Baz"));
        assert_eq!(package.func_result("Foo"), Some(&Expr::ident("Bar")));
        assert_eq!(package.func_result("Missing"), None);
    }

    #[test]
    fn test_package_keeps_typed_and_untyped_vars_apart() {
        let mut package = Package::default();
        package.add_var_type("Limit", Expr::ident("int"));
        package.add_var_value("Default", Expr::call(Expr::ident("Foo"), vec![]));
        assert_eq!(package.var_type("Default"), None);
        assert_eq!(package.var_value("Limit"), None);
        assert!(package.var_value("Default").is_some());
    }
}
