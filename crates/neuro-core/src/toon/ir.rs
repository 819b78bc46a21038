//! Serializer/parser for `ir.toon`: the repository snapshot document.

use std::path::{Path, PathBuf};

use super::document::{col, parse_document};
use super::row::{bool_to_col, col_to_bool, escape_value, join_multi, join_row, split_multi};
use crate::types::{
    CallEdge, CallSite, ClassIR, FunctionIR, FunctionKind, ImportEntry, ImportKind, ModuleId,
    ModuleIR, ModuleImportEdge, RepositoryIR,
};

pub fn repository_ir_to_toon(ir: &RepositoryIR) -> String {
    let mut lines: Vec<String> = Vec::new();

    let num_classes: usize = ir.modules.iter().map(|m| m.classes.len()).sum();
    let num_functions: usize = ir.modules.iter().map(|m| m.functions.len()).sum();
    let num_calls: usize = ir
        .modules
        .iter()
        .flat_map(|m| m.functions.iter())
        .map(|f| f.call_sites.len())
        .sum();

    lines.push("repo:".to_string());
    lines.push(format!("  root: {}", ir.root.display()));
    lines.push(format!("  build_timestamp: {}", ir.build_timestamp));
    lines.push(format!("  num_modules: {}", ir.modules.len()));
    lines.push(format!("  num_classes: {num_classes}"));
    lines.push(format!("  num_functions: {num_functions}"));
    lines.push(format!("  num_calls: {num_calls}"));
    lines.push(String::new());

    lines.push(format!(
        "modules[{}]{{module_id,module_name,path,file_hash,has_main_guard,entry_symbol_id,num_functions,num_imports}}:",
        ir.modules.len()
    ));
    for m in &ir.modules {
        let row = join_row(&[
            m.id.to_string(),
            escape_value(&m.module_name),
            escape_value(&m.path.to_string_lossy()),
            escape_value(m.file_hash.as_deref().unwrap_or("")),
            bool_to_col(m.entry_symbol_id.is_some()).to_string(),
            escape_value(m.entry_symbol_id.as_deref().unwrap_or("")),
            m.functions.len().to_string(),
            m.imports.len().to_string(),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    let all_classes: Vec<(&ModuleIR, &ClassIR)> =
        ir.modules.iter().flat_map(|m| m.classes.iter().map(move |c| (m, c))).collect();
    lines.push(format!(
        "classes[{}]{{class_id,module_id,module,name,qualified_name,lineno,base_names,num_methods}}:",
        all_classes.len()
    ));
    for (m, c) in &all_classes {
        let num_methods = ir.methods_of(c.id).len();
        let row = join_row(&[
            c.id.to_string(),
            c.module_id.to_string(),
            escape_value(&m.module_name),
            escape_value(&c.name),
            escape_value(&c.qualified_name),
            c.lineno.to_string(),
            escape_value(&join_multi(&c.bases)),
            num_methods.to_string(),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    let mut all_imports: Vec<String> = Vec::new();
    for m in &ir.modules {
        for imp in &m.imports {
            all_imports.push(join_row(&[
                m.id.to_string(),
                imp.kind.as_str().to_string(),
                escape_value(imp.source_module.as_deref().unwrap_or("")),
                escape_value(&imp.imported_name),
                escape_value(imp.alias.as_deref().unwrap_or("")),
            ]));
        }
    }
    lines.push(format!("imports[{}]{{module_id,kind,module,name,alias}}:", all_imports.len()));
    for row in &all_imports {
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    let all_functions: Vec<(&ModuleIR, &FunctionIR)> =
        ir.modules.iter().flat_map(|m| m.functions.iter().map(move |f| (m, f))).collect();
    lines.push(format!(
        "functions[{}]{{function_id,module_id,module,name,qualname,qualified_name,symbol_id,kind,is_entrypoint,lineno,end_lineno,parent_class_id,parent_class_qualified_name,signature,docstring,params,num_calls}}:",
        all_functions.len()
    ));
    for (m, f) in &all_functions {
        let parent_class_id = f.parent_class_id.map(|id| id.to_string()).unwrap_or_default();
        let parent_class_qualname = f
            .parent_class_id
            .and_then(|id| ir.class_by_id(id))
            .map(|c| c.qualified_name.clone())
            .unwrap_or_default();
        let qualname = f
            .qualified_name
            .strip_prefix(&format!("{}.", m.module_name))
            .unwrap_or(&f.qualified_name)
            .to_string();
        let row = join_row(&[
            f.id.to_string(),
            f.module_id.to_string(),
            escape_value(&m.module_name),
            escape_value(&f.name),
            escape_value(&qualname),
            escape_value(&f.qualified_name),
            escape_value(f.symbol_id.as_deref().unwrap_or("")),
            f.kind.as_str().to_string(),
            bool_to_col(f.is_entrypoint).to_string(),
            f.lineno.to_string(),
            f.end_lineno.to_string(),
            parent_class_id,
            escape_value(&parent_class_qualname),
            escape_value(f.signature.as_deref().unwrap_or("")),
            escape_value(f.docstring.as_deref().unwrap_or("")),
            escape_value(&join_multi(&f.params)),
            f.call_sites.len().to_string(),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    let mut all_calls_rows: Vec<String> = Vec::new();
    for m in &ir.modules {
        for f in &m.functions {
            for call in &f.call_sites {
                all_calls_rows.push(join_row(&[
                    f.id.to_string(),
                    m.id.to_string(),
                    call.lineno.to_string(),
                    escape_value(&call.target),
                    bool_to_col(call.from_module_entry).to_string(),
                ]));
            }
        }
    }
    lines.push(format!(
        "calls[{}]{{function_id,module_id,lineno,target,from_module_entry}}:",
        all_calls_rows.len()
    ));
    for row in &all_calls_rows {
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    lines.push(format!("module_imports[{}]{{module_id,imported_module}}:", ir.module_imports.len()));
    for edge in &ir.module_imports {
        let row = join_row(&[
            edge.importer_module_id.to_string(),
            escape_value(&edge.imported_module_name),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    lines.push(format!(
        "call_graph[{}]{{caller_function_id,callee_function_id,caller_symbol_id,callee_symbol_id,lineno,target}}:",
        ir.call_edges.len()
    ));
    for edge in &ir.call_edges {
        let callee = edge.callee_function_id.map(|id| id.to_string()).unwrap_or_default();
        let row = join_row(&[
            edge.caller_function_id.to_string(),
            callee,
            escape_value(&edge.caller_symbol_id),
            escape_value(edge.callee_symbol_id.as_deref().unwrap_or("")),
            edge.lineno.to_string(),
            escape_value(&edge.target),
        ]);
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    let mut config_rows: Vec<String> = Vec::new();
    for path in &ir.config_paths {
        config_rows.push(join_row(&["path".to_string(), escape_value(&path.to_string_lossy())]));
    }
    for script in &ir.console_scripts {
        config_rows.push(join_row(&["console_script".to_string(), escape_value(script)]));
    }
    lines.push(format!("config[{}]{{kind,value}}:", config_rows.len()));
    for row in &config_rows {
        lines.push(format!("  {row}"));
    }
    lines.push(String::new());

    lines.join("\n")
}

pub fn repository_ir_from_toon(text: &str) -> Result<RepositoryIR, String> {
    let doc = parse_document(text, "repo");

    let root = doc.header_get("root").ok_or("TOON IR is missing repo.root header")?;
    let root = PathBuf::from(root);
    let build_timestamp = doc.header_get("build_timestamp").unwrap_or("").to_string();

    let mut modules: Vec<ModuleIR> = Vec::new();
    for row in doc.table("modules") {
        let id: ModuleId = col(row, "module_id").parse().map_err(|_| "bad module_id")?;
        let module_name = col(row, "module_name").to_string();
        let path = PathBuf::from(col(row, "path"));
        let file_hash_raw = col(row, "file_hash");
        let entry_symbol_id_raw = col(row, "entry_symbol_id");
        modules.push(ModuleIR {
            id,
            path,
            module_name,
            file_hash: if file_hash_raw.is_empty() { None } else { Some(file_hash_raw.to_string()) },
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            entry_symbol_id: if entry_symbol_id_raw.is_empty() {
                None
            } else {
                Some(entry_symbol_id_raw.to_string())
            },
        });
    }
    modules.sort_by_key(|m| m.id);
    let module_index = |id: ModuleId, modules: &[ModuleIR]| -> Option<usize> {
        modules.iter().position(|m| m.id == id)
    };

    for row in doc.table("classes") {
        let class_id = col(row, "class_id").parse().map_err(|_| "bad class_id")?;
        let module_id: ModuleId = col(row, "module_id").parse().map_err(|_| "bad module_id")?;
        let idx = module_index(module_id, &modules).ok_or("class references unknown module")?;
        let bases = split_multi(col(row, "base_names"));
        modules[idx].classes.push(ClassIR {
            id: class_id,
            module_id,
            name: col(row, "name").to_string(),
            qualified_name: col(row, "qualified_name").to_string(),
            lineno: col(row, "lineno").parse().unwrap_or(0),
            bases,
        });
    }

    for row in doc.table("imports") {
        let module_id: ModuleId = col(row, "module_id").parse().map_err(|_| "bad module_id")?;
        let idx = module_index(module_id, &modules).ok_or("import references unknown module")?;
        let module_raw = col(row, "module");
        let alias_raw = col(row, "alias");
        modules[idx].imports.push(ImportEntry {
            kind: ImportKind::from_str(col(row, "kind")),
            source_module: if module_raw.is_empty() { None } else { Some(module_raw.to_string()) },
            imported_name: col(row, "name").to_string(),
            alias: if alias_raw.is_empty() { None } else { Some(alias_raw.to_string()) },
        });
    }

    let mut functions_by_id: std::collections::HashMap<u32, (usize, usize)> = std::collections::HashMap::new();
    for row in doc.table("functions") {
        let function_id = col(row, "function_id").parse().map_err(|_| "bad function_id")?;
        let module_id: ModuleId = col(row, "module_id").parse().map_err(|_| "bad module_id")?;
        let idx = module_index(module_id, &modules).ok_or("function references unknown module")?;
        let parent_class_raw = col(row, "parent_class_id");
        let parent_class_id = if parent_class_raw.is_empty() {
            None
        } else {
            Some(parent_class_raw.parse().map_err(|_| "bad parent_class_id")?)
        };
        let symbol_id_raw = col(row, "symbol_id");
        let signature_raw = col(row, "signature");
        let docstring_raw = col(row, "docstring");
        let params = split_multi(col(row, "params"));
        let fn_ir = FunctionIR {
            id: function_id,
            module_id,
            name: col(row, "name").to_string(),
            qualified_name: col(row, "qualified_name").to_string(),
            lineno: col(row, "lineno").parse().unwrap_or(0),
            end_lineno: col(row, "end_lineno").parse().unwrap_or(0),
            parent_class_id,
            kind: FunctionKind::from_str(col(row, "kind")),
            is_entrypoint: col_to_bool(col(row, "is_entrypoint")),
            symbol_id: if symbol_id_raw.is_empty() { None } else { Some(symbol_id_raw.to_string()) },
            signature: if signature_raw.is_empty() { None } else { Some(signature_raw.to_string()) },
            docstring: if docstring_raw.is_empty() { None } else { Some(docstring_raw.to_string()) },
            params,
            call_sites: Vec::new(),
        };
        modules[idx].functions.push(fn_ir);
        functions_by_id.insert(function_id, (idx, modules[idx].functions.len() - 1));
    }

    for row in doc.table("calls") {
        let function_id: u32 = col(row, "function_id").parse().map_err(|_| "bad function_id")?;
        if let Some(&(midx, fidx)) = functions_by_id.get(&function_id) {
            modules[midx].functions[fidx].call_sites.push(CallSite {
                lineno: col(row, "lineno").parse().unwrap_or(0),
                target: col(row, "target").to_string(),
                from_module_entry: col_to_bool(col(row, "from_module_entry")),
            });
        }
    }

    let mut module_imports = Vec::new();
    for row in doc.table("module_imports") {
        module_imports.push(ModuleImportEdge {
            importer_module_id: col(row, "module_id").parse().map_err(|_| "bad module_id")?,
            imported_module_name: col(row, "imported_module").to_string(),
        });
    }

    let mut call_edges = Vec::new();
    for row in doc.table("call_graph") {
        let caller_id: u32 = col(row, "caller_function_id").parse().map_err(|_| "bad caller id")?;
        let callee_raw = col(row, "callee_function_id");
        let callee_id = if callee_raw.is_empty() { None } else { Some(callee_raw.parse().map_err(|_| "bad callee id")?) };
        let caller_symbol_raw = col(row, "caller_symbol_id");
        let caller_symbol_id = if caller_symbol_raw.is_empty() {
            functions_by_id
                .get(&caller_id)
                .and_then(|&(m, f)| modules[m].functions[f].symbol_id.clone())
                .unwrap_or_default()
        } else {
            caller_symbol_raw.to_string()
        };
        let callee_symbol_raw = col(row, "callee_symbol_id");
        let callee_symbol_id = if !callee_symbol_raw.is_empty() {
            Some(callee_symbol_raw.to_string())
        } else {
            callee_id.and_then(|id| functions_by_id.get(&id)).and_then(|&(m, f)| modules[m].functions[f].symbol_id.clone())
        };
        call_edges.push(CallEdge {
            caller_function_id: caller_id,
            callee_function_id: callee_id,
            caller_symbol_id,
            callee_symbol_id,
            lineno: col(row, "lineno").parse().unwrap_or(0),
            target: col(row, "target").to_string(),
        });
    }

    let mut config_paths = Vec::new();
    let mut console_scripts = Vec::new();
    for row in doc.table("config") {
        match col(row, "kind") {
            "path" => config_paths.push(PathBuf::from(col(row, "value"))),
            "console_script" => console_scripts.push(col(row, "value").to_string()),
            _ => {}
        }
    }

    Ok(RepositoryIR {
        root,
        build_timestamp,
        modules,
        module_imports,
        call_edges,
        console_scripts,
        config_paths,
    })
}

pub fn load_repository_ir(path: &Path) -> Result<RepositoryIR, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    repository_ir_from_toon(&text)
}

pub fn save_repository_ir(ir: &RepositoryIR, path: &Path) -> std::io::Result<()> {
    crate::toon::write_atomic(path, &repository_ir_to_toon(ir))
}
