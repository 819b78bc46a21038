//! Direct, single-file, single-function patches (§4.11): guard clause,
//! TODO marker, or a stub-body injection, applied without the patch-plan
//! bundle/schema round trip.

use std::path::Path;

use tree_sitter::{Node, Parser};

use neuro_core::error::{NeurocodeError, Result};
use neuro_core::types::RepositoryIR;

use crate::diffing::unified_diff;
use crate::freshness::module_for_file;
use crate::types::LocalPatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Guard,
    Todo,
    Inject,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "guard" => Some(Self::Guard),
            "todo" => Some(Self::Todo),
            "inject" => Some(Self::Inject),
            _ => None,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Strategy::Guard => "# neurocode:guard",
            Strategy::Todo => "# neurocode:todo",
            Strategy::Inject => "# neurocode:inject",
        }
    }
}

fn parser() -> Parser {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_python::LANGUAGE.into()).expect("tree-sitter-python grammar is always loadable");
    p
}

fn line_indent(source: &str, lineno: usize) -> String {
    source
        .lines()
        .nth(lineno)
        .map(|l| l.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
        .unwrap_or_default()
}

/// Finds the target `function_definition` node by name. With no explicit
/// name, prefers the earliest (by line) module-level function — one not
/// nested inside any class — falling back to the earliest function overall
/// when the file has none at module level, mirroring the grounded original's
/// `_select_target_function`. `require_target` gates the failure when no
/// function can be found at all; it does not affect explicit-name lookup.
fn find_function<'a>(root: Node<'a>, bytes: &[u8], target: Option<&str>, require_target: bool) -> Result<Node<'a>> {
    let mut matches = Vec::new();
    let mut cursor = root.walk();
    collect_functions(root, &mut cursor, bytes, false, &mut matches);

    match target {
        Some(name) => {
            let found: Vec<Node> = matches
                .into_iter()
                .filter(|(n, _)| n.child_by_field_name("name").map(|nm| nm.utf8_text(bytes).unwrap_or("") == name).unwrap_or(false))
                .map(|(n, _)| n)
                .collect();
            match found.len() {
                1 => Ok(found[0]),
                0 => Err(NeurocodeError::SymbolNotFound(name.to_string())),
                _ => Err(NeurocodeError::AmbiguousSymbol { symbol: name.to_string(), candidates: found.iter().map(|_| name.to_string()).collect() }),
            }
        }
        None => {
            let earliest = |nodes: Vec<Node<'a>>| nodes.into_iter().min_by_key(|n| n.start_position().row);
            let module_level: Vec<Node> = matches.iter().filter(|(_, in_class)| !in_class).map(|(n, _)| *n).collect();
            if let Some(n) = earliest(module_level) {
                return Ok(n);
            }
            let all: Vec<Node> = matches.into_iter().map(|(n, _)| n).collect();
            if let Some(n) = earliest(all) {
                return Ok(n);
            }
            if require_target {
                Err(NeurocodeError::PatchPlanError("no target function could be determined".to_string()))
            } else {
                Err(NeurocodeError::PatchPlanError("no function found in file".to_string()))
            }
        }
    }
}

/// Collects every `function_definition` node along with whether it is
/// nested inside a class body (`in_class`), tracked top-down the same way
/// the AST extractor tracks `parent_class_id`: once inside a class, every
/// further nested function (including methods of nested classes) counts as
/// non-module-level.
fn collect_functions<'a>(node: Node<'a>, cursor: &mut tree_sitter::TreeCursor<'a>, bytes: &[u8], in_class: bool, out: &mut Vec<(Node<'a>, bool)>) {
    let _ = bytes;
    if node.kind() == "function_definition" {
        out.push((node, in_class));
    }
    let child_in_class = in_class || node.kind() == "class_definition";
    for child in node.named_children(cursor) {
        let mut child_cursor = child.walk();
        collect_functions(child, &mut child_cursor, bytes, child_in_class, out);
    }
}

fn body_already_marked(body: Node, source: &str, marker: &str) -> bool {
    let text = &source[body.start_byte()..body.end_byte()];
    text.contains(marker)
}

fn guard_insertion(fix: &str, indent: &str, marker: &str) -> String {
    let (condition, action) = match fix.split_once("=>") {
        Some((c, a)) => (c.trim().to_string(), a.trim().to_string()),
        None => (fix.trim().to_string(), format!("raise ValueError({fix:?})")),
    };
    format!("{indent}if {condition}: {action}  {marker}\n")
}

fn todo_insertion(fix: &str, indent: &str, marker: &str) -> String {
    format!("{indent}# TODO: {fix}  {marker}\n")
}

fn inject_stub(fix: &str, indent: &str, marker: &str) -> String {
    format!("{indent}raise NotImplementedError({fix:?})  {marker}\n")
}

/// Applies one local patch to `file`. `target` selects the function by
/// name; `None` requires the file to contain exactly one function.
#[allow(clippy::too_many_arguments)]
pub fn apply_local_patch(
    ir: Option<&RepositoryIR>,
    repo_root: &Path,
    file: &Path,
    fix: &str,
    strategy: Strategy,
    target: Option<&str>,
    dry_run: bool,
    require_fresh_ir: bool,
    require_target: bool,
) -> Result<LocalPatchResult> {
    if require_fresh_ir {
        let ir = ir.ok_or_else(|| NeurocodeError::IrNotFound { path: repo_root.join(".neurocode/ir.toon") })?;
        let module = module_for_file(ir, repo_root, file)
            .ok_or_else(|| NeurocodeError::IrNotFound { path: repo_root.join(".neurocode/ir.toon") })?;
        let status = crate::freshness::module_freshness(repo_root, module);
        if status != crate::types::ModuleFreshness::Fresh {
            return Err(NeurocodeError::PatchPlanError(format!("IR for {} is {}; rerun `neurocode ir`", module.module_name, status.as_str())));
        }
    }

    let before = std::fs::read_to_string(file).map_err(|e| NeurocodeError::io(file, e))?;
    let mut parser = parser();
    let tree = parser.parse(&before, None).ok_or_else(|| NeurocodeError::PatchPlanError(format!("failed to parse {}", file.display())))?;
    let root = tree.root_node();

    let target_fn = find_function(root, before.as_bytes(), target, require_target)?;
    let name = target_fn.child_by_field_name("name").map(|n| n.utf8_text(before.as_bytes()).unwrap_or("").to_string());
    let body = target_fn.child_by_field_name("body").ok_or_else(|| NeurocodeError::PatchPlanError("function has no body".to_string()))?;

    let marker = strategy.marker();
    if body_already_marked(body, &before, marker) {
        return Ok(LocalPatchResult { file: file.display().to_string(), symbol: name, strategy: format!("{strategy:?}").to_lowercase(), is_noop: true, written: false, diff: None, warnings: Vec::new() });
    }

    let first_stmt = body.named_child(0).ok_or_else(|| NeurocodeError::PatchPlanError("function body is empty".to_string()))?;
    let indent = line_indent(&before, first_stmt.start_position().row);
    let indent = if indent.is_empty() { " ".repeat(first_stmt.start_position().column) } else { indent };

    let after = match strategy {
        Strategy::Guard => {
            let insertion = guard_insertion(fix, &indent, marker);
            splice_before_byte(&before, first_stmt.start_byte(), &insertion)
        }
        Strategy::Todo => {
            let insertion = todo_insertion(fix, &indent, marker);
            splice_before_byte(&before, first_stmt.start_byte(), &insertion)
        }
        Strategy::Inject => {
            let stub = inject_stub(fix, &indent, marker);
            let mut out = String::with_capacity(before.len());
            out.push_str(&before[..body.start_byte()]);
            out.push('\n');
            out.push_str(&stub);
            out.push_str(&before[body.end_byte()..]);
            out
        }
    };

    if after == before {
        return Ok(LocalPatchResult { file: file.display().to_string(), symbol: name, strategy: format!("{strategy:?}").to_lowercase(), is_noop: true, written: false, diff: None, warnings: Vec::new() });
    }

    let diff = Some(unified_diff(&file.display().to_string(), &before, &after));
    let written = if dry_run {
        false
    } else {
        std::fs::write(file, &after).map_err(|e| NeurocodeError::io(file, e))?;
        true
    };

    Ok(LocalPatchResult { file: file.display().to_string(), symbol: name, strategy: format!("{strategy:?}").to_lowercase(), is_noop: false, written, diff, warnings: Vec::new() })
}

fn splice_before_byte(source: &str, byte: usize, insertion: &str) -> String {
    let mut out = String::with_capacity(source.len() + insertion.len());
    out.push_str(&source[..byte]);
    out.push_str(insertion);
    out.push_str(&source[byte..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_sample(dir: &tempfile::TempDir, code: &str) -> std::path::PathBuf {
        let path = dir.path().join("sample.py");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(code.as_bytes()).unwrap();
        path
    }

    #[test]
    fn todo_strategy_inserts_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "def f(x):\n    return x\n");
        let result = apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Todo, None, false, false, false).unwrap();
        assert!(!result.is_noop);
        assert!(result.written);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# TODO: handle none"));
    }

    #[test]
    fn todo_strategy_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "def f(x):\n    return x\n");
        apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Todo, None, false, false, false).unwrap();
        let result = apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Todo, None, false, false, false).unwrap();
        assert!(result.is_noop);
        assert!(!result.written);
    }

    #[test]
    fn no_explicit_target_falls_back_to_earliest_module_level_function() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "def f(x):\n    return x\n\n\ndef g(y):\n    return y\n");
        let result = apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Todo, None, false, false, false).unwrap();
        assert_eq!(result.symbol.as_deref(), Some("f"));
    }

    #[test]
    fn no_explicit_target_prefers_module_level_over_nested_function() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "class C:\n    def method(self):\n        return 1\n\n\ndef top_level(x):\n    return x\n");
        let result = apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Todo, None, false, false, false).unwrap();
        assert_eq!(result.symbol.as_deref(), Some("top_level"));
    }

    #[test]
    fn require_target_fails_when_file_has_no_functions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "x = 1\n");
        let err = apply_local_patch(None, dir.path(), &path, "fix", Strategy::Todo, None, false, false, true);
        assert!(err.is_err());
    }

    #[test]
    fn dry_run_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "def f(x):\n    return x\n");
        let before = std::fs::read_to_string(&path).unwrap();
        let result = apply_local_patch(None, dir.path(), &path, "handle none", Strategy::Guard, None, true, false, false).unwrap();
        assert!(!result.written);
        assert!(result.diff.is_some());
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
    }
}
