//! The Repository Intermediate Representation (RIR): modules, classes,
//! functions, imports, call sites and the resolved call graph.
//!
//! Every entity is addressed by a dense integer id assigned during the
//! resolver's first pass; nothing here holds a reference to another entity
//! directly so the whole graph can be held in flat `Vec`s.

use std::path::PathBuf;

pub type ModuleId = u32;
pub type ClassId = u32;
pub type FunctionId = u32;

/// Placeholder id used before the resolver's id-assignment pass has run.
pub const UNASSIGNED: FunctionId = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    Method,
    Module,
}

impl FunctionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Method => "method",
            FunctionKind::Module => "module",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "method" => FunctionKind::Method,
            "module" => FunctionKind::Module,
            _ => FunctionKind::Function,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Import,
    From,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Import => "import",
            ImportKind::From => "from",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "from" => ImportKind::From,
            _ => ImportKind::Import,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub kind: ImportKind,
    /// Source module text for `from` imports (e.g. `pkg.mod` in `from pkg.mod import x`).
    pub source_module: Option<String>,
    pub imported_name: String,
    pub alias: Option<String>,
}

impl ImportEntry {
    /// The name this import binds in the importing module's namespace.
    pub fn local_binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.imported_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub lineno: u32,
    pub target: String,
    pub from_module_entry: bool,
}

#[derive(Debug, Clone)]
pub struct ClassIR {
    pub id: ClassId,
    pub module_id: ModuleId,
    pub name: String,
    pub qualified_name: String,
    pub lineno: u32,
    /// Textual base-class expressions, generic-parameter suffix stripped.
    pub bases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionIR {
    pub id: FunctionId,
    pub module_id: ModuleId,
    pub name: String,
    pub qualified_name: String,
    pub lineno: u32,
    pub end_lineno: u32,
    pub parent_class_id: Option<ClassId>,
    pub kind: FunctionKind,
    pub is_entrypoint: bool,
    /// `<module>:<qualname>`, filled by the resolver's id-assignment pass.
    pub symbol_id: Option<String>,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub params: Vec<String>,
    pub call_sites: Vec<CallSite>,
}

impl FunctionIR {
    pub fn is_dunder(&self) -> bool {
        self.name.starts_with("__") && self.name.ends_with("__")
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_') && !self.is_dunder()
    }

    pub fn is_test_named(&self) -> bool {
        self.name.starts_with("test_") || self.name == "test"
    }
}

#[derive(Debug, Clone)]
pub struct ModuleImportEdge {
    pub importer_module_id: ModuleId,
    pub imported_module_name: String,
}

#[derive(Debug, Clone)]
pub struct CallEdge {
    pub caller_function_id: FunctionId,
    pub callee_function_id: Option<FunctionId>,
    pub caller_symbol_id: String,
    pub callee_symbol_id: Option<String>,
    pub lineno: u32,
    pub target: String,
}

#[derive(Debug, Clone)]
pub struct ModuleIR {
    pub id: ModuleId,
    /// Repository-relative path, e.g. `src/pkg/mod.py`.
    pub path: PathBuf,
    /// Fully qualified dotted name derived from `path` (leading `src/`
    /// stripped, separators become dots, extension dropped).
    pub module_name: String,
    pub file_hash: Option<String>,
    pub imports: Vec<ImportEntry>,
    pub classes: Vec<ClassIR>,
    /// Includes the synthetic module-entry pseudo-function (`kind == Module`).
    pub functions: Vec<FunctionIR>,
    pub entry_symbol_id: Option<String>,
}

impl ModuleIR {
    pub fn module_entry(&self) -> Option<&FunctionIR> {
        self.functions.iter().find(|f| f.kind == FunctionKind::Module)
    }

    pub fn non_module_functions(&self) -> impl Iterator<Item = &FunctionIR> {
        self.functions.iter().filter(|f| f.kind != FunctionKind::Module)
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryIR {
    pub root: PathBuf,
    pub build_timestamp: String,
    pub modules: Vec<ModuleIR>,
    pub module_imports: Vec<ModuleImportEdge>,
    pub call_edges: Vec<CallEdge>,
    pub console_scripts: Vec<String>,
    pub config_paths: Vec<PathBuf>,
}

impl RepositoryIR {
    pub fn module_by_id(&self, id: ModuleId) -> Option<&ModuleIR> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn function_by_id(&self, id: FunctionId) -> Option<&FunctionIR> {
        self.modules.iter().flat_map(|m| m.functions.iter()).find(|f| f.id == id)
    }

    pub fn class_by_id(&self, id: ClassId) -> Option<&ClassIR> {
        self.modules.iter().flat_map(|m| m.classes.iter()).find(|c| c.id == id)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionIR> {
        self.modules.iter().flat_map(|m| m.functions.iter())
    }

    pub fn methods_of(&self, class_id: ClassId) -> Vec<&FunctionIR> {
        self.functions().filter(|f| f.parent_class_id == Some(class_id)).collect()
    }
}
