//! tree-sitter-python walker producing an unresolved [`ModuleIR`].
//!
//! Class and function `id` fields are left at placeholder values here:
//! [`ClassIR`]'s `id` holds a module-local index and [`FunctionIR`]'s `id`
//! is [`UNASSIGNED`]. `crate::resolver::assign_ids` remaps both into dense,
//! repository-wide ids in a second pass, since a class may need to be
//! referenced (as `parent_class_id`) before every module has been walked.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};

use neuro_core::types::{
    CallSite, ClassIR, FunctionIR, FunctionKind, ImportEntry, ImportKind, ModuleId, ModuleIR,
    UNASSIGNED,
};

pub struct PyExtractor {
    parser: Parser,
}

impl Default for PyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PyExtractor {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("tree-sitter-python grammar is always loadable");
        Self { parser }
    }

    /// Parses one Python source file into its module IR. `module_id` is
    /// assigned by the caller from file-discovery order; class and function
    /// ids are placeholders, finalized by [`crate::resolver::assign_ids`].
    pub fn extract(
        &mut self,
        module_id: ModuleId,
        path: &Path,
        module_name: &str,
        source: &str,
    ) -> Result<ModuleIR, String> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| format!("tree-sitter failed to parse {}", path.display()))?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut builder = ModuleBuilder::new(module_id, module_name, bytes);
        let module_docstring = docstring_of(root, bytes);
        let end_lineno = source.lines().count().max(1) as u32;
        builder.push_module_entry(end_lineno, module_docstring);

        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            builder.visit(stmt);
        }

        Ok(builder.finish(path.to_path_buf()))
    }
}

struct ModuleBuilder<'a> {
    module_id: ModuleId,
    module_name: String,
    bytes: &'a [u8],
    classes: Vec<ClassIR>,
    functions: Vec<FunctionIR>,
    imports: Vec<ImportEntry>,
    class_stack: Vec<u32>,
    function_stack: Vec<u32>,
    scope_names: Vec<String>,
    has_main_guard: bool,
}

impl<'a> ModuleBuilder<'a> {
    fn new(module_id: ModuleId, module_name: &str, bytes: &'a [u8]) -> Self {
        Self {
            module_id,
            module_name: module_name.to_string(),
            bytes,
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            class_stack: Vec::new(),
            function_stack: Vec::new(),
            scope_names: Vec::new(),
            has_main_guard: false,
        }
    }

    fn push_module_entry(&mut self, end_lineno: u32, docstring: Option<String>) {
        self.functions.push(FunctionIR {
            id: UNASSIGNED,
            module_id: self.module_id,
            name: "<module>".to_string(),
            qualified_name: format!("{}.<module>", self.module_name),
            lineno: 1,
            end_lineno,
            parent_class_id: None,
            kind: FunctionKind::Module,
            is_entrypoint: false,
            symbol_id: None,
            signature: None,
            docstring,
            params: Vec::new(),
            call_sites: Vec::new(),
        });
        self.function_stack.push(0);
    }

    fn qual_tail(&self, name: &str) -> String {
        if self.scope_names.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scope_names.join("."), name)
        }
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function_def(node),
            "class_definition" => self.visit_class_def(node),
            "import_statement" => self.visit_import_statement(node),
            "import_from_statement" => self.visit_import_from_statement(node),
            "call" => {
                self.record_call_site(node);
                self.visit_children(node);
            }
            "if_statement" => {
                if self.function_stack.len() == 1
                    && self.class_stack.is_empty()
                    && is_main_guard(node, self.bytes)
                {
                    self.has_main_guard = true;
                }
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn visit_function_def(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.bytes).ok())
            .unwrap_or("<anonymous>")
            .to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| extract_params(p, self.bytes))
            .unwrap_or_default();
        let return_type = node
            .child_by_field_name("return_type")
            .and_then(|n| n.utf8_text(self.bytes).ok());
        let lineno = node.start_position().row as u32 + 1;
        let end_lineno = node.end_position().row as u32 + 1;
        let body = node.child_by_field_name("body");
        let docstring = body.and_then(|b| docstring_of(b, self.bytes));

        let parent_class_id = self.class_stack.last().copied();
        let kind = if parent_class_id.is_some() {
            FunctionKind::Method
        } else {
            FunctionKind::Function
        };

        let qual_tail = self.qual_tail(&name);
        let qualified_name = format!("{}.{}", self.module_name, qual_tail);
        let signature = Some(build_signature(&name, &params, return_type));

        self.functions.push(FunctionIR {
            id: UNASSIGNED,
            module_id: self.module_id,
            name: name.clone(),
            qualified_name,
            lineno,
            end_lineno,
            parent_class_id,
            kind,
            is_entrypoint: false,
            symbol_id: None,
            signature,
            docstring,
            params,
            call_sites: Vec::new(),
        });
        let local_idx = (self.functions.len() - 1) as u32;

        self.function_stack.push(local_idx);
        self.scope_names.push(name);
        if let Some(b) = body {
            self.visit_children(b);
        }
        self.scope_names.pop();
        self.function_stack.pop();
    }

    fn visit_class_def(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.bytes).ok())
            .unwrap_or("<anonymous>")
            .to_string();
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| extract_bases(args, self.bytes))
            .unwrap_or_default();
        let lineno = node.start_position().row as u32 + 1;

        let qual_tail = self.qual_tail(&name);
        let qualified_name = format!("{}.{}", self.module_name, qual_tail);

        self.classes.push(ClassIR {
            id: self.classes.len() as u32,
            module_id: self.module_id,
            name: name.clone(),
            qualified_name,
            lineno,
            bases,
        });
        let local_idx = (self.classes.len() - 1) as u32;

        self.class_stack.push(local_idx);
        self.scope_names.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body);
        }
        self.scope_names.pop();
        self.class_stack.pop();
    }

    fn visit_import_statement(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "dotted_name" => {
                    if let Ok(text) = child.utf8_text(self.bytes) {
                        self.imports.push(ImportEntry {
                            kind: ImportKind::Import,
                            source_module: None,
                            imported_name: text.to_string(),
                            alias: None,
                        });
                    }
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(self.bytes).ok())
                        .unwrap_or("");
                    let alias = child
                        .child_by_field_name("alias")
                        .and_then(|n| n.utf8_text(self.bytes).ok());
                    self.imports.push(ImportEntry {
                        kind: ImportKind::Import,
                        source_module: None,
                        imported_name: name.to_string(),
                        alias: alias.map(str::to_string),
                    });
                }
                _ => {}
            }
        }
    }

    fn visit_import_from_statement(&mut self, node: Node) {
        let source_module = node
            .child_by_field_name("module_name")
            .and_then(|n| n.utf8_text(self.bytes).ok())
            .map(str::to_string);

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "dotted_name" => {
                    if let Ok(text) = child.utf8_text(self.bytes) {
                        self.imports.push(ImportEntry {
                            kind: ImportKind::From,
                            source_module: source_module.clone(),
                            imported_name: text.to_string(),
                            alias: None,
                        });
                    }
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(self.bytes).ok())
                        .unwrap_or("");
                    let alias = child
                        .child_by_field_name("alias")
                        .and_then(|n| n.utf8_text(self.bytes).ok());
                    self.imports.push(ImportEntry {
                        kind: ImportKind::From,
                        source_module: source_module.clone(),
                        imported_name: name.to_string(),
                        alias: alias.map(str::to_string),
                    });
                }
                "wildcard_import" => {
                    self.imports.push(ImportEntry {
                        kind: ImportKind::From,
                        source_module: source_module.clone(),
                        imported_name: "*".to_string(),
                        alias: None,
                    });
                }
                _ => {}
            }
        }
    }

    fn record_call_site(&mut self, call: Node) {
        let target = call_target_text(call, self.bytes);
        if target.is_empty() {
            return;
        }
        let lineno = call.start_position().row as u32 + 1;
        let current_fn = *self
            .function_stack
            .last()
            .expect("module-entry pseudo-function is always on the stack");
        let from_module_entry = current_fn == 0;
        self.functions[current_fn as usize].call_sites.push(CallSite {
            lineno,
            target,
            from_module_entry,
        });
    }

    fn finish(mut self, path: PathBuf) -> ModuleIR {
        if self.has_main_guard {
            self.functions[0].is_entrypoint = true;
        }
        ModuleIR {
            id: self.module_id,
            path,
            module_name: self.module_name,
            file_hash: None,
            imports: self.imports,
            classes: self.classes,
            functions: self.functions,
            entry_symbol_id: None,
        }
    }
}

fn is_main_guard(node: Node, bytes: &[u8]) -> bool {
    node.child_by_field_name("condition")
        .and_then(|c| c.utf8_text(bytes).ok())
        .map(|text| text.contains("__name__") && text.contains("__main__"))
        .unwrap_or(false)
}

fn param_name(node: Node, bytes: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" => node.utf8_text(bytes).ok().map(str::to_string),
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .find(|n| n.kind() == "identifier")
                .and_then(|n| n.utf8_text(bytes).ok())
                .map(str::to_string)
        }
        "default_parameter" | "typed_default_parameter" => node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(bytes).ok())
            .map(str::to_string),
        _ => None,
    }
}

fn extract_params(params_node: Node, bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.named_children(&mut cursor) {
        if let Some(name) = param_name(child, bytes) {
            if name != "self" && name != "cls" {
                out.push(name);
            }
        }
    }
    out
}

fn extract_bases(args: Node, bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "keyword_argument" {
            continue;
        }
        if let Ok(text) = child.utf8_text(bytes) {
            let base = text.split('[').next().unwrap_or(text).trim().to_string();
            if !base.is_empty() {
                out.push(base);
            }
        }
    }
    out
}

fn build_signature(name: &str, params: &[String], return_type: Option<&str>) -> String {
    let params_text = params.join(", ");
    match return_type {
        Some(rt) => format!("{name}({params_text}) -> {rt}"),
        None => format!("{name}({params_text})"),
    }
}

fn docstring_of(scope: Node, bytes: &[u8]) -> Option<String> {
    let mut cursor = scope.walk();
    let first = scope.named_children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let text = expr.utf8_text(bytes).ok()?;
    Some(strip_string_literal(text))
}

fn strip_string_literal(raw: &str) -> String {
    let mut s = raw.trim();
    for prefix in ["r", "R", "u", "U", "b", "B", "f", "F"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            if rest.starts_with('"') || rest.starts_with('\'') {
                s = rest;
            }
        }
    }
    if s.len() >= 6
        && ((s.starts_with("\"\"\"") && s.ends_with("\"\"\"")) || (s.starts_with("'''") && s.ends_with("'''")))
    {
        return s[3..s.len() - 3].trim().to_string();
    }
    s.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

fn call_target_text(call: Node, bytes: &[u8]) -> String {
    match call.child_by_field_name("function") {
        Some(func) => render_callable_expr(func, bytes),
        None => call.utf8_text(bytes).unwrap_or("").to_string(),
    }
}

fn render_callable_expr(node: Node, bytes: &[u8]) -> String {
    match node.kind() {
        "identifier" => node.utf8_text(bytes).unwrap_or("").to_string(),
        "attribute" => {
            let attr = node
                .child_by_field_name("attribute")
                .and_then(|n| n.utf8_text(bytes).ok())
                .unwrap_or("");
            match node.child_by_field_name("object") {
                Some(obj) if obj.kind() == "call" => {
                    let obj_text = obj.utf8_text(bytes).unwrap_or("").trim().to_string();
                    format!("{obj_text}.{attr}")
                }
                Some(obj) if matches!(obj.kind(), "identifier" | "attribute") => {
                    format!("{}.{}", render_callable_expr(obj, bytes), attr)
                }
                _ => attr.to_string(),
            }
        }
        "call" => call_target_text(node, bytes),
        _ => node.utf8_text(bytes).unwrap_or("").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> ModuleIR {
        let mut extractor = PyExtractor::new();
        extractor
            .extract(0, Path::new("pkg/mod.py"), "pkg.mod", src)
            .expect("parse should succeed")
    }

    #[test]
    fn extracts_top_level_function_and_call() {
        let ir = extract("def greet(name):\n    print(name)\n\ndef main():\n    greet('world')\n");
        assert_eq!(ir.functions.len(), 3); // module entry + greet + main
        let main = ir.functions.iter().find(|f| f.name == "main").unwrap();
        assert_eq!(main.call_sites.len(), 1);
        assert_eq!(main.call_sites[0].target, "greet");
    }

    #[test]
    fn extracts_class_with_method_and_bases() {
        let ir = extract(
            "class Base:\n    pass\n\nclass Widget(Base):\n    def render(self):\n        self.paint()\n\n    def paint(self):\n        pass\n",
        );
        assert_eq!(ir.classes.len(), 2);
        let widget = ir.classes.iter().find(|c| c.name == "Widget").unwrap();
        assert_eq!(widget.bases, vec!["Base".to_string()]);
        let render = ir.functions.iter().find(|f| f.name == "render").unwrap();
        assert_eq!(render.parent_class_id, Some(widget.id));
        assert_eq!(render.call_sites[0].target, "self.paint");
    }

    #[test]
    fn nested_function_inherits_innermost_class_only() {
        let ir = extract(
            "class C:\n    def outer(self):\n        def inner():\n            pass\n        inner()\n",
        );
        let class_id = ir.classes[0].id;
        let inner = ir.functions.iter().find(|f| f.name == "inner").unwrap();
        assert_eq!(inner.parent_class_id, Some(class_id));
    }

    #[test]
    fn detects_main_guard_as_entrypoint() {
        let ir = extract("def run():\n    pass\n\nif __name__ == '__main__':\n    run()\n");
        let module_entry = ir.module_entry().unwrap();
        assert!(module_entry.is_entrypoint);
        assert_eq!(module_entry.call_sites[0].target, "run");
    }

    #[test]
    fn extracts_imports() {
        let ir = extract("import os\nimport numpy as np\nfrom pkg.sub import helper as h\nfrom . import sibling\n");
        assert_eq!(ir.imports.len(), 4);
        assert_eq!(ir.imports[1].alias.as_deref(), Some("np"));
        assert_eq!(ir.imports[2].source_module.as_deref(), Some("pkg.sub"));
        assert_eq!(ir.imports[2].local_binding(), "h");
    }

    #[test]
    fn extracts_docstring_and_params() {
        let ir = extract("def greet(name, greeting='hi'):\n    \"\"\"Says hello.\"\"\"\n    pass\n");
        let greet = ir.functions.iter().find(|f| f.name == "greet").unwrap();
        assert_eq!(greet.docstring.as_deref(), Some("Says hello."));
        assert_eq!(greet.params, vec!["name".to_string(), "greeting".to_string()]);
    }
}
