//! Patch-plan construction, schema validation, and deterministic application
//! (§4.10). The plan is the wire contract between this engine and an
//! external model: we build a seeded plan from the explain bundle, the
//! model fills in `code`, and `apply_patch_plan` replays it onto the tree.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};

use neuro_core::error::{NeurocodeError, Result};
use neuro_core::hash::stable_id;
use neuro_core::types::RepositoryIR;

use crate::diffing::unified_diff;
use crate::explain::build_explain_bundle;
use crate::query::resolve_function;
use crate::types::{PatchApplyResult, PatchOp, PatchOperation, PatchPlanBundle};

/// Closed-world schema for one operation. `additionalProperties: false`
/// rejects any field beyond the ones named here.
fn operation_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "op", "file", "symbol", "lineno", "description", "code", "enabled"],
        "additionalProperties": false,
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "op": { "enum": ["insert_before", "insert_after", "replace_range", "append_to_function"] },
            "file": { "type": "string", "minLength": 1 },
            "symbol": { "type": "string" },
            "lineno": { "type": "integer", "minimum": 1 },
            "end_lineno": { "type": "integer", "minimum": 1 },
            "description": { "type": "string" },
            "code": { "type": "string" },
            "enabled": { "type": "boolean" },
        }
    })
}

fn plan_schema() -> Value {
    json!({
        "type": "object",
        "required": ["plan_id", "operations"],
        "properties": {
            "plan_id": { "type": "string", "minLength": 1 },
            "operations": { "type": "array", "items": operation_schema() }
        }
    })
}

/// Validates the closed-world shape of a patch plan JSON document. Does not
/// check `replace_range`'s `end_lineno >= lineno` or non-empty `code`
/// (apply-time concerns) — see [`validate_for_apply`].
pub fn validate_patch_plan_shape(value: &Value) -> Result<()> {
    let schema = plan_schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| NeurocodeError::PatchPlanError(format!("invalid schema: {e}")))?;
    let errors: Vec<String> = validator.iter_errors(value).map(|e| format!("{e} (at {})", e.instance_path)).collect();
    if !errors.is_empty() {
        return Err(NeurocodeError::PatchPlanError(format!("schema validation failed: {}", errors.join("; "))));
    }
    Ok(())
}

/// Apply-time checks beyond the closed-world shape: `end_lineno >= lineno`
/// for `replace_range`, and non-empty `code` on every enabled operation.
fn validate_for_apply(bundle: &PatchPlanBundle) -> Result<()> {
    for op in &bundle.operations {
        let kind = PatchOp::parse(&op.op)
            .ok_or_else(|| NeurocodeError::PatchPlanError(format!("unknown op kind: {}", op.op)))?;
        if kind == PatchOp::ReplaceRange {
            let end = op.end_lineno.ok_or_else(|| NeurocodeError::PatchPlanError(format!("{}: replace_range requires end_lineno", op.id)))?;
            if end < op.lineno {
                return Err(NeurocodeError::PatchPlanError(format!("{}: end_lineno must be >= lineno", op.id)));
            }
        }
        if op.enabled && op.code.is_empty() {
            return Err(NeurocodeError::PatchPlanError(format!("{}: enabled operation has empty code", op.id)));
        }
    }
    Ok(())
}

/// Builds a seeded patch plan: at least one `append_to_function` for
/// `symbol`, plus one anchored operation per resolved caller/callee
/// neighbor. `code` is empty at creation — the model fills it in.
pub fn build_patch_plan(
    ir: &RepositoryIR,
    repo_root: &Path,
    file: &Path,
    symbol: &str,
    config: &neuro_core::config::Config,
    embeddings: Option<&neuro_core::toon::embeddings::EmbeddingStore>,
) -> Result<PatchPlanBundle> {
    let explain = build_explain_bundle(ir, repo_root, file, Some(symbol), config, embeddings, crate::explain::DEFAULT_NEIGHBOR_K)?;
    let target_fn = resolve_function(ir, symbol)?;
    let target_summary = explain.target.clone().ok_or_else(|| NeurocodeError::SymbolNotFound(symbol.to_string()))?;

    let plan_id = stable_id(&format!("{}:{}", explain.file, symbol), 0);
    let mut counter = 0u64;
    let mut next_id = |seed: &str| {
        counter += 1;
        stable_id(seed, counter)
    };

    let mut operations = Vec::new();
    operations.push(PatchOperation {
        id: next_id(&plan_id),
        op: PatchOp::AppendToFunction.as_str().to_string(),
        file: explain.file.clone(),
        symbol: target_summary.qualified_name.clone(),
        lineno: target_summary.lineno,
        end_lineno: Some(target_summary.end_lineno),
        description: format!("Fill in a fix for {}", target_summary.qualified_name),
        code: String::new(),
        enabled: true,
    });

    for caller in &explain.callers {
        let call_lineno = ir
            .call_edges
            .iter()
            .find(|e| {
                e.callee_function_id == Some(target_fn.id)
                    && ir.function_by_id(e.caller_function_id).map(|f| f.symbol_id.as_deref()) == Some(Some(caller.symbol_id.as_str()))
            })
            .map(|e| e.lineno)
            .unwrap_or(caller.lineno);
        operations.push(PatchOperation {
            id: next_id(&caller.symbol_id),
            op: PatchOp::InsertBefore.as_str().to_string(),
            file: caller.file.strip_prefix(&format!("{}/", repo_root.display())).unwrap_or(&caller.file).to_string(),
            symbol: caller.qualified_name.clone(),
            lineno: call_lineno,
            end_lineno: None,
            description: format!("Update call site in {} ahead of the change to {}", caller.qualified_name, symbol),
            code: String::new(),
            enabled: true,
        });
    }

    for callee in &explain.callees {
        operations.push(PatchOperation {
            id: next_id(&callee.symbol_id),
            op: PatchOp::AppendToFunction.as_str().to_string(),
            file: callee.file.strip_prefix(&format!("{}/", repo_root.display())).unwrap_or(&callee.file).to_string(),
            symbol: callee.qualified_name.clone(),
            lineno: callee.lineno,
            end_lineno: None,
            description: format!("Adjust callee {} if its contract changes", callee.qualified_name),
            code: String::new(),
            enabled: true,
        });
    }

    Ok(PatchPlanBundle { plan_id, explain, operations })
}

fn apply_op_to_lines(lines: &mut Vec<String>, op: &PatchOperation, kind: PatchOp) -> Result<()> {
    match kind {
        PatchOp::InsertBefore => {
            let idx = (op.lineno as usize).saturating_sub(1).min(lines.len());
            lines.splice(idx..idx, op.code.lines().map(str::to_string));
        }
        PatchOp::InsertAfter => {
            let idx = (op.lineno as usize).min(lines.len());
            lines.splice(idx..idx, op.code.lines().map(str::to_string));
        }
        PatchOp::ReplaceRange => {
            let end = op.end_lineno.unwrap_or(op.lineno) as usize;
            let start = (op.lineno as usize).saturating_sub(1).min(lines.len());
            let end = end.min(lines.len());
            let end = end.max(start);
            lines.splice(start..end, op.code.lines().map(str::to_string));
        }
        PatchOp::AppendToFunction => {
            let anchor = op.end_lineno.unwrap_or(op.lineno) as usize;
            let idx = anchor.saturating_sub(1).min(lines.len());
            lines.splice(idx..idx, op.code.lines().map(str::to_string));
        }
    }
    Ok(())
}

/// Applies every enabled operation, grouped by file, sorted `lineno`
/// descending within a file so earlier insertions never shift later
/// anchors. A file whose produced text is unchanged from its current
/// content counts as a no-op for that file.
pub fn apply_patch_plan(
    bundle: &PatchPlanBundle,
    repo_root: &Path,
    dry_run: bool,
    want_diff: bool,
) -> Result<PatchApplyResult> {
    validate_for_apply(bundle)?;

    let mut by_file: BTreeMap<String, Vec<&PatchOperation>> = BTreeMap::new();
    for op in bundle.operations.iter().filter(|o| o.enabled) {
        by_file.entry(op.file.clone()).or_default().push(op);
    }

    let mut files_changed = Vec::new();
    let mut warnings = Vec::new();
    let mut diffs = Vec::new();
    let mut any_change = false;

    for (rel_file, mut ops) in by_file {
        ops.sort_by(|a, b| b.lineno.cmp(&a.lineno));
        let abs_path = repo_root.join(&rel_file);
        let before = std::fs::read_to_string(&abs_path).map_err(|e| NeurocodeError::io(&abs_path, e))?;
        let mut lines: Vec<String> = before.lines().map(str::to_string).collect();

        for op in &ops {
            let kind = PatchOp::parse(&op.op).expect("validated above");
            apply_op_to_lines(&mut lines, op, kind)?;
        }

        let mut after = lines.join("\n");
        if before.ends_with('\n') {
            after.push('\n');
        }

        if after == before {
            continue;
        }
        any_change = true;
        if want_diff || dry_run {
            diffs.push(unified_diff(&rel_file, &before, &after));
        }
        if !dry_run {
            std::fs::write(&abs_path, &after).map_err(|e| NeurocodeError::io(&abs_path, e))?;
        }
        files_changed.push(rel_file);
    }

    if !any_change {
        warnings.push("plan produced no textual change; nothing applied".to_string());
    }

    let diff = if diffs.is_empty() { None } else { Some(diffs.join("\n")) };

    Ok(PatchApplyResult { status: if any_change { "applied".to_string() } else { "noop".to_string() }, is_noop: !any_change, files_changed, diff, warnings })
}
