//! Translation driver.
//!
//! A [`Program`] moves through three phases. During discovery every source
//! file is converted as far as its own text allows; anything that depends on
//! declarations not yet seen is left behind as a reserved task. Finalization
//! runs those tasks once all files are known and writes the import lists.
//! Flattening splices every reservation into its parent and hands out one
//! Java source per compilation unit.

use crate::ast::{Decl, File, FuncDecl, GenKind, ImportSpec, Spec, is_exported, title};
use crate::deferred::{Deferred, Pending};
use crate::env::{
    ClassId, CompilationUnit, ImportName, OutputClass, ScopeId, Scopes, UnitId, unit_key,
};
use crate::error::EngineError;
use crate::input::go::read_go;
use crate::output::Cursor;
use crate::output::buffer::{BufferArena, BufferId};
use crate::tables::JavaImport;
use crate::traits::SystemSources;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discovery,
    Finalization,
    Flattened,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Finalization => "finalization",
            Self::Flattened => "flattening",
        }
    }
}

/// One generated Java source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedUnit {
    /// Path relative to the Java source root, e.g. `a/b/Shapes.java`.
    pub path: String,
    pub package: String,
    pub class: String,
    pub qualified_name: String,
    pub text: String,
}

/// A method seen before the struct it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct PendingMethod {
    pub class: String,
    pub decl: FuncDecl,
    /// Package-level cursor of the declaring file.
    pub out: Cursor,
}

#[derive(Debug)]
pub struct Program {
    pub(crate) arena: BufferArena<Pending>,
    pub(crate) units: Vec<CompilationUnit>,
    unit_index: HashMap<String, UnitId>,
    /// Exported type name to the unit generated for it.
    pub(crate) class_names: HashMap<String, UnitId>,
    pub(crate) classes: Vec<OutputClass>,
    pub(crate) class_index: HashMap<String, ClassId>,
    /// Interface type names, for conformance inference.
    pub(crate) interfaces: HashSet<String>,
    /// Named non-struct types keyed by their class spelling.
    pub(crate) type_aliases: HashMap<String, crate::ast::Expr>,
    pub(crate) scopes: Scopes,
    sys_pkgs: HashMap<String, Option<UnitId>>,
    pub(crate) pending_methods: Vec<PendingMethod>,
    pub(crate) phase: Phase,
    /// Index of the constant spec being converted, for `iota`.
    pub(crate) iota: Option<usize>,
    pub(crate) resolve_depth: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    pub fn new() -> Self {
        Self {
            arena: BufferArena::new(),
            units: Vec::new(),
            unit_index: HashMap::new(),
            class_names: HashMap::new(),
            classes: Vec::new(),
            class_index: HashMap::new(),
            interfaces: HashSet::new(),
            type_aliases: HashMap::new(),
            scopes: Scopes::default(),
            sys_pkgs: HashMap::new(),
            pending_methods: Vec::new(),
            phase: Phase::Discovery,
            iota: None,
            resolve_depth: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Parse and convert one source file.
    ///
    /// `path` is relative to the Go source root; its directory becomes the
    /// Java package. A parse failure aborts the run.
    pub fn discover(
        &mut self,
        path: &str,
        source: &str,
        system: &dyn SystemSources,
    ) -> Result<(), EngineError> {
        self.check_discovery("discover")?;
        let file = read_go(source).map_err(|source| EngineError::Parse {
            path: path.to_string(),
            source,
        })?;
        self.discover_file(path, &file, system)
    }

    /// Convert an already parsed source file.
    pub fn discover_file(
        &mut self,
        path: &str,
        file: &File,
        system: &dyn SystemSources,
    ) -> Result<(), EngineError> {
        self.check_discovery("discover")?;
        let path = path.replace('\\', "/");
        let dir = parent_dir(&path);
        let unit = self.package_unit(dir, &title(&file.package), false);
        tracing::debug!(path = %path, unit = %self.unit(unit).key(), "discovering");

        for import in &file.imports {
            self.add_import_name(unit, import, system)?;
        }

        let mut out = Cursor::new(self.unit(unit).root, unit, self.unit(unit).scope);
        out.tabs = 1;
        for decl in &file.decls {
            self.convert_decl(decl, &mut out);
        }
        Ok(())
    }

    /// Resolve every deferred task and write the import lists.
    ///
    /// Calling it again before flattening does nothing.
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::Discovery => {}
            Phase::Finalization => return Ok(()),
            Phase::Flattened => return Err(EngineError::AlreadyFlattened),
        }

        let pending = std::mem::take(&mut self.pending_methods);
        for method in pending {
            tracing::debug!(
                class = %method.class,
                method = %method.decl.name,
                "receiver type has no class"
            );
            let mut out = method.out;
            self.convert_static_method(&method.decl, &mut out);
        }

        self.phase = Phase::Finalization;
        for index in 0..self.units.len() {
            let unit = &self.units[index];
            if unit.system {
                continue;
            }
            let root = unit.root;
            self.resolve_reservations(root);
        }
        for index in 0..self.units.len() {
            if !self.units[index].system {
                self.write_imports(UnitId(index as u32));
            }
        }
        Ok(())
    }

    /// Join every unit into its final text. Finalizes first if needed.
    pub fn flatten(&mut self) -> Result<Vec<TranslatedUnit>, EngineError> {
        match self.phase {
            Phase::Discovery => self.finalize()?,
            Phase::Finalization => {}
            Phase::Flattened => return Err(EngineError::AlreadyFlattened),
        }
        self.phase = Phase::Flattened;

        let mut translated = Vec::new();
        for index in 0..self.units.len() {
            let unit = &self.units[index];
            if unit.system {
                continue;
            }
            let root = unit.root;
            let is_package = unit.is_package;
            let mut result = TranslatedUnit {
                path: unit.output_path(),
                package: unit.java_package(),
                class: unit.name.clone(),
                qualified_name: unit.qualified_name(),
                text: String::new(),
            };
            if is_package {
                self.arena.push_str(root, "}\n");
            }
            result.text = self
                .arena
                .join(root)
                .map_err(|_| EngineError::AlreadyFlattened)?
                .to_string();
            translated.push(result);
        }
        tracing::info!(units = translated.len(), "flattened program");
        Ok(translated)
    }

    /// Discover, finalize and flatten `(path, source)` pairs in order.
    pub fn translate<'a>(
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
        system: &dyn SystemSources,
    ) -> Result<Vec<TranslatedUnit>, EngineError> {
        let mut program = Self::new();
        for (path, source) in files {
            program.discover(path, source, system)?;
        }
        program.flatten()
    }

    /// Fully qualified Java name of the class generated for an exported type.
    pub fn class_qualified_name(&self, name: &str) -> Option<String> {
        self.class_names
            .get(name)
            .map(|&id| self.unit(id).qualified_name())
    }

    fn check_discovery(&self, operation: &'static str) -> Result<(), EngineError> {
        match self.phase {
            Phase::Discovery => Ok(()),
            Phase::Flattened => Err(EngineError::AlreadyFlattened),
            phase => Err(EngineError::Phase {
                operation,
                phase: phase.name(),
            }),
        }
    }

    // Units

    pub(crate) fn unit(&self, id: UnitId) -> &CompilationUnit {
        &self.units[id.0 as usize]
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> &mut CompilationUnit {
        &mut self.units[id.0 as usize]
    }

    pub(crate) fn unit_by_key(&self, key: &str) -> Option<UnitId> {
        self.unit_index.get(key).copied()
    }

    /// Package unit for `dir`, created with its header on first use.
    fn package_unit(&mut self, dir: &str, name: &str, system: bool) -> UnitId {
        if let Some(id) = self.unit_by_key(&unit_key(dir, name)) {
            return id;
        }
        let id = self.new_unit(dir, name, true, system, None);
        if !system {
            let mut out = self.write_unit_header(id);
            self.println(&mut out, &format!("public class {} {{", name));
        }
        id
    }

    /// Cursor at the end of the unit generated for the exported type `name`.
    pub(crate) fn class_unit(&mut self, name: &str, out: &Cursor) -> Cursor {
        let package_unit = self.unit(out.unit).package_unit;
        let dir = self.unit(package_unit).dir.clone();
        let id = match self.unit_by_key(&unit_key(&dir, name)) {
            Some(id) if self.unit(id).is_package => {
                // Type named like its package: nest it in the package class.
                let mut nested = Cursor::new(self.unit(id).root, id, self.unit(id).scope);
                nested.tabs = 1;
                return nested;
            }
            Some(id) => id,
            None => {
                let id = self.new_unit(&dir, name, false, false, Some(package_unit));
                self.write_unit_header(id);
                self.class_names.insert(name.to_string(), id);
                id
            }
        };
        Cursor::new(self.unit(id).root, id, self.unit(id).scope)
    }

    fn new_unit(
        &mut self,
        dir: &str,
        name: &str,
        is_package: bool,
        system: bool,
        package_unit: Option<UnitId>,
    ) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        let root = self.arena.new_buffer();
        let scope = match package_unit {
            Some(parent) => self.unit(parent).scope,
            None => self.scopes.new_scope(None),
        };
        self.units.push(CompilationUnit {
            dir: dir.to_string(),
            name: name.to_string(),
            is_package,
            system,
            root,
            package_unit: package_unit.unwrap_or(id),
            imports_at: None,
            import_names: HashMap::new(),
            referenced: BTreeSet::new(),
            imports: BTreeSet::new(),
            funcs: HashMap::new(),
            package: Default::default(),
            scope,
        });
        self.unit_index.insert(unit_key(dir, name), id);
        id
    }

    /// `package` line and the reservation for imports.
    fn write_unit_header(&mut self, id: UnitId) -> Cursor {
        let unit = self.unit(id);
        let mut out = Cursor::new(unit.root, id, unit.scope);
        if !unit.dir.is_empty() {
            let line = format!("package {};", unit.java_package());
            self.println(&mut out, &line);
            self.println(&mut out, "");
        }
        let imports = self.reserve_block(&mut out, None);
        self.unit_mut(id).imports_at = Some(imports.buffer);
        out
    }

    fn add_import_name(
        &mut self,
        unit: UnitId,
        import: &ImportSpec,
        system: &dyn SystemSources,
    ) -> Result<(), EngineError> {
        let alias = import.name.as_deref();
        if matches!(alias, Some("_") | Some(".")) {
            return Ok(());
        }
        let path = import.path.as_str();
        let last = path.rsplit('/').next().unwrap_or(path);
        let own_dir = &self.unit(unit).dir;
        let own = !own_dir.is_empty() && first_segment(path) == first_segment(own_dir);

        let (local, target) = if own {
            let class = title(last);
            let target = ImportName {
                unit_key: unit_key(path, &class),
                qualified: Some(format!("{}.{}", path.replace('/', "."), class)),
            };
            (alias.map(title).unwrap_or(class), target)
        } else {
            let (key, name) = match self.load_system_package(path, system)? {
                Some(id) => (self.unit(id).key(), self.unit(id).name.clone()),
                None => (unit_key(path, &title(last)), title(last)),
            };
            let target = ImportName {
                unit_key: key,
                qualified: None,
            };
            (alias.map(title).unwrap_or(name), target)
        };
        self.unit_mut(unit).import_names.insert(local, target);
        Ok(())
    }

    /// Signatures of an imported library package, parsed on first use.
    fn load_system_package(
        &mut self,
        path: &str,
        system: &dyn SystemSources,
    ) -> Result<Option<UnitId>, EngineError> {
        if let Some(&loaded) = self.sys_pkgs.get(path) {
            return Ok(loaded);
        }
        let mut loaded = None;
        for source in system.package_files(path) {
            let file = read_go(&source.text).map_err(|err| EngineError::Parse {
                path: source.path.clone(),
                source: err,
            })?;
            if file.package == "main" || file.package.ends_with("_test") {
                continue;
            }
            let id = self.package_unit(path, &title(&file.package), true);
            self.register_signatures(id, &file);
            loaded = Some(id);
        }
        tracing::debug!(import = path, found = loaded.is_some(), "loaded system package");
        self.sys_pkgs.insert(path.to_string(), loaded);
        Ok(loaded)
    }

    /// Record exported function results and typed variables of a library file.
    fn register_signatures(&mut self, id: UnitId, file: &File) {
        let unit = self.unit_mut(id);
        for decl in &file.decls {
            match decl {
                Decl::Func(func) if func.receiver.is_none() && is_exported(&func.name) => {
                    if let Some(result) = func.ty.first_result() {
                        unit.package.add_func(&func.name, result.clone());
                        unit.funcs
                            .entry(func.name.clone())
                            .or_insert_with(|| result.clone());
                    }
                }
                Decl::Gen(decl) if decl.kind != GenKind::Type => {
                    for spec in &decl.specs {
                        let Spec::Value(value) = spec else { continue };
                        let exported = value
                            .names
                            .iter()
                            .enumerate()
                            .filter(|(_, name)| is_exported(name));
                        for (position, name) in exported {
                            match (&value.ty, value.values.get(position)) {
                                (Some(ty), _) => unit.package.add_var_type(name, ty.clone()),
                                (None, Some(init)) => {
                                    unit.package.add_var_value(name, init.clone())
                                }
                                (None, None) => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    pub(crate) fn import_name(&self, out: &Cursor, local: &str) -> Option<&ImportName> {
        let package_unit = self.unit(out.unit).package_unit;
        self.unit(package_unit).import_names.get(local)
    }

    pub(crate) fn add_import(&mut self, out: &Cursor, import: JavaImport) {
        self.unit_mut(out.unit)
            .imports
            .insert(import.qualified.to_string());
    }

    pub(crate) fn add_referenced(&mut self, out: &Cursor, class: &str) {
        if !self.unit(out.unit).referenced.contains(class) {
            self.unit_mut(out.unit).referenced.insert(class.to_string());
        }
    }

    pub(crate) fn new_scope(&mut self, out: &Cursor) -> ScopeId {
        let package_scope = self.unit(out.unit).scope;
        self.scopes.new_scope(Some(package_scope))
    }

    pub(crate) fn is_var(&self, out: &Cursor, name: &str) -> bool {
        self.scopes.is_var(out.scope, name)
    }

    // Printing

    pub(crate) fn print(&mut self, out: &mut Cursor, text: &str) {
        out.print(&mut self.arena, text);
    }

    pub(crate) fn println(&mut self, out: &mut Cursor, text: &str) {
        out.println(&mut self.arena, text);
    }

    pub(crate) fn stmt_end(&mut self, out: &mut Cursor) {
        out.stmt_end(&mut self.arena);
    }

    /// Whether type-dependent text can be written immediately.
    pub(crate) fn eager(&self, out: &Cursor, direct_eval: bool) -> bool {
        self.phase != Phase::Discovery || direct_eval || out.scratch
    }

    /// Reserve the current position within a line.
    pub(crate) fn reserve_inline(&mut self, out: &mut Cursor, task: Option<Deferred>) -> Cursor {
        // Owed indentation belongs before the reserved text.
        self.print(out, "");
        self.reserve(out, task, false)
    }

    /// Reserve whole lines at the current indentation.
    pub(crate) fn reserve_block(&mut self, out: &mut Cursor, task: Option<Deferred>) -> Cursor {
        self.reserve(out, task, true)
    }

    fn reserve(&mut self, out: &Cursor, task: Option<Deferred>, need_tabs: bool) -> Cursor {
        let id = self.arena.reserve(out.buffer, None);
        let child = Cursor {
            buffer: self.arena.child(id),
            need_tabs,
            ..out.clone()
        };
        if let Some(task) = task {
            self.arena.attach(
                id,
                Pending {
                    cursor: child.clone(),
                    task,
                },
            );
        }
        child
    }

    /// Detached cursor whose text is read back instead of emitted.
    pub(crate) fn scratch(&mut self, out: &Cursor) -> Cursor {
        Cursor {
            buffer: self.arena.new_buffer(),
            tabs: 0,
            need_tabs: false,
            ban_stmt_end: true,
            scratch: true,
            ..out.clone()
        }
    }

    pub(crate) fn scratch_text(&self, scratch: &Cursor) -> String {
        self.arena.text(scratch.buffer).to_string()
    }

    /// Run every task reserved under `root`, innermost first.
    fn resolve_reservations(&mut self, root: BufferId) {
        let mut stack: Vec<_> = self
            .arena
            .reservations(root)
            .iter()
            .rev()
            .map(|&id| (id, false))
            .collect();
        while let Some((id, children_done)) = stack.pop() {
            if self.arena.is_resolved(id) {
                continue;
            }
            let child = self.arena.child(id);
            if !children_done {
                stack.push((id, true));
                stack.extend(self.arena.reservations(child).iter().rev().map(|&r| (r, false)));
                continue;
            }
            let before = self.arena.reservations(child).len();
            if let Some(Some(pending)) = self.arena.resolve(id) {
                let mut out = pending.cursor;
                self.run(pending.task, &mut out);
            }
            // Reservations taken by the task itself.
            let added: Vec<_> = self.arena.reservations(child)[before..].to_vec();
            stack.extend(added.into_iter().rev().map(|r| (r, false)));
        }
    }

    fn write_imports(&mut self, id: UnitId) {
        let unit = self.unit(id);
        let Some(buffer) = unit.imports_at else {
            return;
        };
        let own_package = unit.java_package();
        let mut lines = unit.imports.clone();
        for name in &unit.referenced {
            if let Some(&target) = self.class_names.get(name) {
                lines.insert(self.unit(target).qualified_name());
            }
        }
        lines.retain(|qualified| {
            let package = qualified.rsplit_once('.').map(|(package, _)| package);
            package.is_some_and(|package| package != own_package)
        });

        let mut out = Cursor::new(buffer, id, unit.scope);
        for line in &lines {
            self.println(&mut out, &format!("import {};", line));
        }
        if !lines.is_empty() {
            self.println(&mut out, "");
        }
    }
}

fn parent_dir(path: &str) -> &str {
    let path = path.trim_start_matches("./").trim_start_matches('/');
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn first_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MemorySystemSources, NoSystemSources};

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("a/b/c.go"), "a/b");
        assert_eq!(parent_dir("./a/c.go"), "a");
        assert_eq!(parent_dir("main.go"), "");
    }

    #[test]
    fn test_discover_after_finalize_rejected() {
        let mut program = Program::new();
        program
            .discover("app/main.go", "package main\n", &NoSystemSources)
            .unwrap();
        program.finalize().unwrap();
        let err = program
            .discover("app/other.go", "package main\n", &NoSystemSources)
            .unwrap_err();
        assert!(matches!(err, EngineError::Phase { .. }));
    }

    #[test]
    fn test_finalize_after_flatten_rejected() {
        let mut program = Program::new();
        program
            .discover("app/main.go", "package main\n", &NoSystemSources)
            .unwrap();
        program.flatten().unwrap();
        assert!(matches!(
            program.finalize(),
            Err(EngineError::AlreadyFlattened)
        ));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut program = Program::new();
        let err = program
            .discover("app/broken.go", "package main\nfunc (", &NoSystemSources)
            .unwrap_err();
        assert!(err.to_string().starts_with("app/broken.go"));
    }

    #[test]
    fn test_system_package_loaded_once() {
        let system = MemorySystemSources::new().with_file(
            "strings",
            "strings/strings.go",
            "package strings\nfunc ToUpper(s string) string { return s }\n",
        );
        let mut program = Program::new();
        for path in ["app/a.go", "app/b.go"] {
            program
                .discover(path, "package main\nimport \"strings\"\n", &system)
                .unwrap();
        }
        let strings = program.unit_by_key("strings/Strings").unwrap();
        assert!(program.unit(strings).system);
        assert!(
            program
                .unit(strings)
                .package
                .func_result("ToUpper")
                .is_some()
        );
        let units = program.flatten().unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_nested_tasks_run_once_through_finalize() {
        use crate::ast::Expr;
        use crate::deferred::TypeTask;
        use crate::resolve::ResolveOpts;

        let name = |ty: &str| {
            Deferred::Type(TypeTask::Name {
                ty: Expr::ident(ty),
                opts: ResolveOpts::default(),
            })
        };
        let mut program = Program::new();
        program
            .discover("app/main.go", "package main\n", &NoSystemSources)
            .unwrap();
        let unit = program.unit_by_key("app/Main").unwrap();
        let mut out = Cursor::new(program.unit(unit).root, unit, program.unit(unit).scope);

        program.print(&mut out, "[");
        let mut first = program.reserve_inline(&mut out, Some(name("alpha")));
        program.print(&mut out, "]");
        program.print(&mut first, "(");
        let mut second = program.reserve_inline(&mut first, Some(name("beta")));
        program.print(&mut first, ")");
        program.print(&mut second, "{");
        program.reserve_inline(&mut second, Some(name("gamma")));
        program.print(&mut second, "}");

        program.finalize().unwrap();
        program.finalize().unwrap();
        let units = program.flatten().unwrap();
        let text = &units[0].text;
        assert!(text.contains("[({Gamma}Beta)Alpha]"), "{}", text);
        for class in ["Alpha", "Beta", "Gamma"] {
            assert_eq!(text.matches(class).count(), 1, "{}", text);
        }
    }

    #[test]
    fn test_broken_system_source_is_fatal() {
        let system = MemorySystemSources::new().with_file(
            "strings",
            "strings/strings.go",
            "package strings\nfunc ToUpper(",
        );
        let mut program = Program::new();
        let err = program
            .discover("app/main.go", "package main\nimport \"strings\"\n", &system)
            .unwrap_err();
        match err {
            EngineError::Parse { path, .. } => assert_eq!(path, "strings/strings.go"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
