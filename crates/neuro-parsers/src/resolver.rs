//! Two-phase call-graph resolver.
//!
//! Phase A ([`assign_ids`]) assigns dense, repository-wide ids to every
//! class and function across all modules, in module-discovery order, and
//! remaps the module-local `parent_class_id` placeholders the extractor
//! left behind. Phase B ([`resolve_call_edges`]) walks every call site and
//! tries, in a fixed order, to resolve it to a concrete function:
//!
//! 1. exact qualified match against some function's full `qualified_name`
//! 2. same-module simple name
//! 3. `self.`/`cls.`/`super().` hierarchy walk, for methods
//! 4. `from`-import local binding
//! 5. module-alias attribute (`import x as y` then `y.fn()`)
//! 6. `ClassName.method`
//!
//! The first rule that produces a match wins; everything else is left
//! unresolved (`callee_function_id: None`) rather than guessed at.

use std::collections::HashMap;

use neuro_core::types::{
    CallEdge, ClassId, ClassIR, FunctionId, FunctionIR, ImportKind, ModuleId, ModuleImportEdge,
    ModuleIR,
};

/// Assigns dense, repository-wide ids to every class and function, in
/// module-discovery order. Must run once, before [`resolve_call_edges`].
pub fn assign_ids(modules: &mut [ModuleIR]) {
    let mut next_function_id: FunctionId = 0;
    let mut next_class_id: ClassId = 0;

    for module in modules.iter_mut() {
        let mut class_remap: Vec<ClassId> = Vec::with_capacity(module.classes.len());
        for class in module.classes.iter_mut() {
            class_remap.push(next_class_id);
            class.id = next_class_id;
            next_class_id += 1;
        }
        for func in module.functions.iter_mut() {
            if let Some(local) = func.parent_class_id {
                func.parent_class_id = class_remap.get(local as usize).copied();
            }
            func.id = next_function_id;
            next_function_id += 1;
            func.symbol_id = Some(symbol_id_for(&module.module_name, &func.qualified_name));
        }
    }
}

fn symbol_id_for(module_name: &str, qualified_name: &str) -> String {
    let prefix = format!("{module_name}.");
    let tail = qualified_name.strip_prefix(prefix.as_str()).unwrap_or(qualified_name);
    format!("{module_name}:{tail}")
}

/// Converts a (possibly relative) import source into an absolute dotted
/// module path, relative to the importing module's own dotted name.
fn resolve_module_ref(importer: &ModuleIR, source: &str) -> String {
    let dots = source.chars().take_while(|&c| c == '.').count();
    if dots == 0 {
        return source.to_string();
    }
    let rest = &source[dots..];
    let mut segments: Vec<&str> = importer.module_name.split('.').collect();
    segments.pop(); // importer's own leaf -> its containing package
    for _ in 1..dots {
        segments.pop();
    }
    if rest.is_empty() {
        segments.join(".")
    } else {
        segments.push(rest);
        segments.join(".")
    }
}

struct Index<'a> {
    module_by_name: HashMap<&'a str, ModuleId>,
    module_name_by_id: HashMap<ModuleId, &'a str>,
    full_qualified: HashMap<&'a str, FunctionId>,
    module_simple_name: HashMap<(ModuleId, &'a str), Vec<FunctionId>>,
    methods_by_class_name: HashMap<(ClassId, &'a str), FunctionId>,
    class_by_qualified: HashMap<&'a str, ClassId>,
    class_by_module_simple: HashMap<(ModuleId, &'a str), ClassId>,
    class_by_id: HashMap<ClassId, &'a ClassIR>,
    function_by_id: HashMap<FunctionId, &'a FunctionIR>,
}

impl<'a> Index<'a> {
    fn build(modules: &'a [ModuleIR]) -> Self {
        let mut idx = Index {
            module_by_name: HashMap::new(),
            module_name_by_id: HashMap::new(),
            full_qualified: HashMap::new(),
            module_simple_name: HashMap::new(),
            methods_by_class_name: HashMap::new(),
            class_by_qualified: HashMap::new(),
            class_by_module_simple: HashMap::new(),
            class_by_id: HashMap::new(),
            function_by_id: HashMap::new(),
        };

        for module in modules {
            idx.module_by_name.insert(module.module_name.as_str(), module.id);
            idx.module_name_by_id.insert(module.id, module.module_name.as_str());
            for class in &module.classes {
                idx.class_by_qualified.insert(class.qualified_name.as_str(), class.id);
                idx.class_by_module_simple.insert((module.id, class.name.as_str()), class.id);
                idx.class_by_id.insert(class.id, class);
            }
            for func in &module.functions {
                idx.function_by_id.insert(func.id, func);
                idx.full_qualified.insert(func.qualified_name.as_str(), func.id);
                idx.module_simple_name
                    .entry((module.id, func.name.as_str()))
                    .or_default()
                    .push(func.id);
                if let Some(class_id) = func.parent_class_id {
                    idx.methods_by_class_name.entry((class_id, func.name.as_str())).or_insert(func.id);
                }
            }
        }

        idx
    }

    fn resolve_hierarchy(&self, class_id: ClassId, method_name: &str, visited: &mut Vec<ClassId>) -> Option<FunctionId> {
        if visited.contains(&class_id) {
            return None;
        }
        visited.push(class_id);
        if let Some(&fid) = self.methods_by_class_name.get(&(class_id, method_name)) {
            return Some(fid);
        }
        let class = *self.class_by_id.get(&class_id)?;
        for base in &class.bases {
            if let Some(base_class_id) = self.find_class_by_name(base) {
                if let Some(fid) = self.resolve_hierarchy(base_class_id, method_name, visited) {
                    return Some(fid);
                }
            }
        }
        None
    }

    fn find_class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_by_qualified.get(name).copied().or_else(|| {
            let simple = name.rsplit('.').next().unwrap_or(name);
            self.class_by_qualified
                .iter()
                .find(|(qn, _)| qn.rsplit('.').next() == Some(simple))
                .map(|(_, id)| *id)
        })
    }
}

fn resolve_exact_qualified(idx: &Index, target: &str) -> Option<FunctionId> {
    idx.full_qualified.get(target).copied()
}

fn resolve_same_module_simple(idx: &Index, module_id: ModuleId, target: &str) -> Option<FunctionId> {
    if target.contains('.') {
        return None;
    }
    idx.module_simple_name.get(&(module_id, target)).and_then(|ids| ids.first().copied())
}

fn resolve_self_cls_super(idx: &Index, caller_class_id: ClassId, target: &str) -> Option<FunctionId> {
    let (rest, via_super) = if let Some(rest) = target.strip_prefix("super().") {
        (rest, true)
    } else if let Some(rest) = target.strip_prefix("self.") {
        (rest, false)
    } else if let Some(rest) = target.strip_prefix("cls.") {
        (rest, false)
    } else {
        return None;
    };
    let method_name = rest.split('.').next().unwrap_or(rest);

    if !via_super {
        let mut visited = Vec::new();
        return idx.resolve_hierarchy(caller_class_id, method_name, &mut visited);
    }

    let class = *idx.class_by_id.get(&caller_class_id)?;
    for base in &class.bases {
        if let Some(base_class_id) = idx.find_class_by_name(base) {
            let mut visited = Vec::new();
            if let Some(fid) = idx.resolve_hierarchy(base_class_id, method_name, &mut visited) {
                return Some(fid);
            }
        }
    }
    None
}

fn resolve_from_import(idx: &Index, module: &ModuleIR, target: &str) -> Option<FunctionId> {
    let mut parts = target.splitn(2, '.');
    let head = parts.next()?;
    let rest = parts.next();

    for imp in &module.imports {
        if imp.kind != ImportKind::From || imp.local_binding() != head {
            continue;
        }
        let source_module = imp.source_module.as_deref()?;
        let resolved_module_name = resolve_module_ref(module, source_module);
        let target_module_id = *idx.module_by_name.get(resolved_module_name.as_str())?;

        let tail = rest.map(str::to_string).unwrap_or_else(|| imp.imported_name.clone());
        let full = format!("{resolved_module_name}.{tail}");
        if let Some(&fid) = idx.full_qualified.get(full.as_str()) {
            return Some(fid);
        }
        let simple = tail.split('.').next().unwrap_or(&tail);
        if let Some(ids) = idx.module_simple_name.get(&(target_module_id, simple)) {
            return ids.first().copied();
        }
    }
    None
}

fn resolve_module_alias(idx: &Index, module: &ModuleIR, target: &str) -> Option<FunctionId> {
    let mut parts = target.splitn(2, '.');
    let head = parts.next()?;
    let rest = parts.next()?;

    for imp in &module.imports {
        if imp.kind != ImportKind::Import || imp.local_binding() != head {
            continue;
        }
        let resolved_module_name = resolve_module_ref(module, &imp.imported_name);
        let target_module_id = *idx.module_by_name.get(resolved_module_name.as_str())?;

        let full = format!("{resolved_module_name}.{rest}");
        if let Some(&fid) = idx.full_qualified.get(full.as_str()) {
            return Some(fid);
        }
        let simple = rest.split('.').next().unwrap_or(rest);
        if let Some(ids) = idx.module_simple_name.get(&(target_module_id, simple)) {
            return ids.first().copied();
        }
    }
    None
}

fn resolve_class_name_method(idx: &Index, module: &ModuleIR, target: &str) -> Option<FunctionId> {
    let mut parts = target.splitn(2, '.');
    let class_name = parts.next()?;
    let rest = parts.next()?;
    let method_name = rest.split('.').next().unwrap_or(rest);

    let class_id = idx.class_by_module_simple.get(&(module.id, class_name)).copied().or_else(|| {
        module.imports.iter().find(|imp| imp.local_binding() == class_name).and_then(|imp| {
            let source = imp.source_module.clone().unwrap_or_else(|| imp.imported_name.clone());
            let resolved = resolve_module_ref(module, &source);
            idx.class_by_qualified.get(format!("{resolved}.{class_name}").as_str()).copied()
        })
    })?;

    idx.methods_by_class_name.get(&(class_id, method_name)).copied()
}

fn build_module_import_edges(modules: &[ModuleIR]) -> Vec<ModuleImportEdge> {
    let mut edges = Vec::new();
    for module in modules {
        for imp in &module.imports {
            let raw = match imp.kind {
                ImportKind::Import => imp.imported_name.clone(),
                ImportKind::From => imp.source_module.clone().unwrap_or_default(),
            };
            if raw.is_empty() {
                continue;
            }
            edges.push(ModuleImportEdge {
                importer_module_id: module.id,
                imported_module_name: resolve_module_ref(module, &raw),
            });
        }
    }
    edges
}

/// Resolves every call site across `modules` into a [`CallEdge`], and
/// derives the repository's module-import edges. `modules` must already
/// have dense ids from [`assign_ids`].
pub fn resolve_call_edges(modules: &[ModuleIR]) -> (Vec<CallEdge>, Vec<ModuleImportEdge>) {
    let idx = Index::build(modules);
    let mut call_edges = Vec::new();

    for module in modules {
        for func in &module.functions {
            for site in &func.call_sites {
                let callee_id = resolve_exact_qualified(&idx, &site.target)
                    .or_else(|| resolve_same_module_simple(&idx, module.id, &site.target))
                    .or_else(|| {
                        func.parent_class_id.and_then(|cid| resolve_self_cls_super(&idx, cid, &site.target))
                    })
                    .or_else(|| resolve_from_import(&idx, module, &site.target))
                    .or_else(|| resolve_module_alias(&idx, module, &site.target))
                    .or_else(|| resolve_class_name_method(&idx, module, &site.target));

                let callee_symbol_id =
                    callee_id.and_then(|id| idx.function_by_id.get(&id)).and_then(|f| f.symbol_id.clone());

                call_edges.push(CallEdge {
                    caller_function_id: func.id,
                    callee_function_id: callee_id,
                    caller_symbol_id: func.symbol_id.clone().unwrap_or_default(),
                    callee_symbol_id,
                    lineno: site.lineno,
                    target: site.target.clone(),
                });
            }
        }
    }

    let module_imports = build_module_import_edges(modules);
    (call_edges, module_imports)
}

/// Runs both phases: assigns ids then resolves every call edge.
pub fn resolve_repository(mut modules: Vec<ModuleIR>) -> (Vec<ModuleIR>, Vec<CallEdge>, Vec<ModuleImportEdge>) {
    assign_ids(&mut modules);
    let (call_edges, module_imports) = resolve_call_edges(&modules);
    (modules, call_edges, module_imports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::types::{CallSite, FunctionKind, ImportEntry, UNASSIGNED};
    use std::path::PathBuf;

    fn module_fn(
        module_id: ModuleId,
        name: &str,
        qualified_name: &str,
        parent_class_id: Option<ClassId>,
        kind: FunctionKind,
        call_sites: Vec<CallSite>,
    ) -> FunctionIR {
        FunctionIR {
            id: UNASSIGNED,
            module_id,
            name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            lineno: 1,
            end_lineno: 2,
            parent_class_id,
            kind,
            is_entrypoint: false,
            symbol_id: None,
            signature: None,
            docstring: None,
            params: Vec::new(),
            call_sites,
        }
    }

    #[test]
    fn assigns_dense_ids_in_discovery_order() {
        let mut modules = vec![
            ModuleIR {
                id: 0,
                path: PathBuf::from("a.py"),
                module_name: "a".into(),
                file_hash: None,
                imports: Vec::new(),
                classes: Vec::new(),
                functions: vec![module_fn(0, "<module>", "a.<module>", None, FunctionKind::Module, Vec::new())],
                entry_symbol_id: None,
            },
            ModuleIR {
                id: 1,
                path: PathBuf::from("b.py"),
                module_name: "b".into(),
                file_hash: None,
                imports: Vec::new(),
                classes: Vec::new(),
                functions: vec![
                    module_fn(1, "<module>", "b.<module>", None, FunctionKind::Module, Vec::new()),
                    module_fn(1, "helper", "b.helper", None, FunctionKind::Function, Vec::new()),
                ],
                entry_symbol_id: None,
            },
        ];
        assign_ids(&mut modules);
        assert_eq!(modules[0].functions[0].id, 0);
        assert_eq!(modules[1].functions[0].id, 1);
        assert_eq!(modules[1].functions[1].id, 2);
        assert_eq!(modules[1].functions[1].symbol_id.as_deref(), Some("b:helper"));
    }

    #[test]
    fn resolves_same_module_simple_call() {
        let mut modules = vec![ModuleIR {
            id: 0,
            path: PathBuf::from("a.py"),
            module_name: "a".into(),
            file_hash: None,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: vec![
                module_fn(
                    0,
                    "main",
                    "a.main",
                    None,
                    FunctionKind::Function,
                    vec![CallSite { lineno: 2, target: "helper".into(), from_module_entry: false }],
                ),
                module_fn(0, "helper", "a.helper", None, FunctionKind::Function, Vec::new()),
            ],
            entry_symbol_id: None,
        }];
        assign_ids(&mut modules);
        let (edges, _) = resolve_call_edges(&modules);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].callee_function_id, Some(modules[0].functions[1].id));
    }

    #[test]
    fn resolves_self_call_through_base_class() {
        let mut modules = vec![ModuleIR {
            id: 0,
            path: PathBuf::from("a.py"),
            module_name: "a".into(),
            file_hash: None,
            imports: Vec::new(),
            classes: vec![
                ClassIR { id: 0, module_id: 0, name: "Base".into(), qualified_name: "a.Base".into(), lineno: 1, bases: Vec::new() },
                ClassIR { id: 1, module_id: 0, name: "Child".into(), qualified_name: "a.Child".into(), lineno: 5, bases: vec!["Base".into()] },
            ],
            functions: vec![
                module_fn(0, "greet", "a.Base.greet", Some(0), FunctionKind::Method, Vec::new()),
                module_fn(
                    0,
                    "run",
                    "a.Child.run",
                    Some(1),
                    FunctionKind::Method,
                    vec![CallSite { lineno: 6, target: "self.greet".into(), from_module_entry: false }],
                ),
            ],
            entry_symbol_id: None,
        }];
        assign_ids(&mut modules);
        let (edges, _) = resolve_call_edges(&modules);
        let run_edge = edges.iter().find(|e| e.target == "self.greet").unwrap();
        assert_eq!(run_edge.callee_function_id, Some(modules[0].functions[0].id));
    }

    #[test]
    fn resolves_from_import_local_binding() {
        let mut modules = vec![
            ModuleIR {
                id: 0,
                path: PathBuf::from("a.py"),
                module_name: "a".into(),
                file_hash: None,
                imports: vec![ImportEntry {
                    kind: ImportKind::From,
                    source_module: Some("b".into()),
                    imported_name: "helper".into(),
                    alias: None,
                }],
                classes: Vec::new(),
                functions: vec![module_fn(
                    0,
                    "main",
                    "a.main",
                    None,
                    FunctionKind::Function,
                    vec![CallSite { lineno: 2, target: "helper".into(), from_module_entry: false }],
                )],
                entry_symbol_id: None,
            },
            ModuleIR {
                id: 1,
                path: PathBuf::from("b.py"),
                module_name: "b".into(),
                file_hash: None,
                imports: Vec::new(),
                classes: Vec::new(),
                functions: vec![module_fn(1, "helper", "b.helper", None, FunctionKind::Function, Vec::new())],
                entry_symbol_id: None,
            },
        ];
        assign_ids(&mut modules);
        let (edges, module_imports) = resolve_call_edges(&modules);
        let edge = edges.iter().find(|e| e.target == "helper").unwrap();
        assert_eq!(edge.callee_function_id, Some(modules[1].functions[0].id));
        assert_eq!(module_imports.len(), 1);
        assert_eq!(module_imports[0].imported_module_name, "b");
    }

    #[test]
    fn resolves_super_call_through_full_extractor_pipeline() {
        let src = "class Processor:\n    def _compute(self, v):\n        return v\n\nclass Derived(Processor):\n    def add(self, v):\n        return super()._compute(v)\n";
        let mut extractor = crate::python::PyExtractor::new();
        let mut modules = vec![extractor.extract(0, PathBuf::from("a.py").as_path(), "a", src).expect("parse should succeed")];
        assign_ids(&mut modules);
        let (edges, _) = resolve_call_edges(&modules);

        let base_compute = modules[0]
            .functions
            .iter()
            .find(|f| f.qualified_name == "a.Processor._compute")
            .expect("Processor._compute should be extracted");
        let super_edge = edges
            .iter()
            .find(|e| e.target.starts_with("super()."))
            .expect("super() call should textualize with the super().method prefix");
        assert_eq!(super_edge.callee_function_id, Some(base_compute.id));
    }

    #[test]
    fn unresolvable_call_has_no_callee() {
        let mut modules = vec![ModuleIR {
            id: 0,
            path: PathBuf::from("a.py"),
            module_name: "a".into(),
            file_hash: None,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: vec![module_fn(
                0,
                "main",
                "a.main",
                None,
                FunctionKind::Function,
                vec![CallSite { lineno: 2, target: "mystery.run".into(), from_module_entry: false }],
            )],
            entry_symbol_id: None,
        }];
        assign_ids(&mut modules);
        let (edges, _) = resolve_call_edges(&modules);
        assert_eq!(edges[0].callee_function_id, None);
    }
}
