//! The project facade: a scoped object owning a repository root and its
//! configuration, coordinating every derived service. No business logic of
//! its own — everything here delegates to a leaf module.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use neuro_core::clock::now_iso8601;
use neuro_core::config::Config;
use neuro_core::error::{NeurocodeError, Result};
use neuro_core::hash::stable_id;
use neuro_core::toon::embeddings::{load_embedding_store, save_embedding_store, EmbeddingItem, EmbeddingStore};
use neuro_core::toon::history::{append_patch_history, load_patch_history};
use neuro_core::toon::ir::{load_repository_ir, save_repository_ir};
use neuro_core::types::RepositoryIR;
use neuro_parsers::build::build_repository_ir;

use crate::checks::check_module;
use crate::embedding_provider::EmbeddingProvider;
use crate::embedding_text::build_embedding_items;
use crate::explain::{build_explain_bundle, explain_module, DEFAULT_NEIGHBOR_K};
use crate::freshness::{freshness_entries, module_for_file, module_freshness, repository_is_fresh, stale_warning};
use crate::local_patch::{apply_local_patch, Strategy};
use crate::patch_plan::{apply_patch_plan, build_patch_plan, validate_patch_plan_shape};
use crate::query::{run_query, QueryKind};
use crate::search::{resolve_like_symbol, search_embeddings};
use crate::types::{
    ConfigSummary, EmbedResult, ExplainBundle, ExplainResult, IrBuildResult, LocalPatchResult, CheckResult as CheckResultView,
    ModuleFreshness, PatchApplyResult, PatchHistoryEntryView, PatchHistoryResult, PatchPlanBundle, QueryResult, SearchHit, SearchResult,
    StatusResult,
};

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = Config::load(&root);
        Self { root, config }
    }

    fn ir_path(&self) -> PathBuf {
        self.root.join(".neurocode").join("ir.toon")
    }

    fn embeddings_path(&self) -> PathBuf {
        self.root.join(".neurocode").join("ir-embeddings.toon")
    }

    fn config_summary(&self) -> ConfigSummary {
        ConfigSummary {
            fanout_threshold: self.config.fanout_threshold,
            long_function_threshold: self.config.long_function_threshold,
            enabled_checks: self.config.enabled_checks.clone(),
            severity_overrides: self.config.severity_overrides.clone(),
            embedding_provider: self.config.embedding.provider.clone(),
            embedding_model: self.config.embedding.model.clone(),
        }
    }

    pub fn load_ir(&self) -> Result<RepositoryIR> {
        let path = self.ir_path();
        load_repository_ir(&path).map_err(|_| NeurocodeError::IrNotFound { path })
    }

    fn load_embeddings(&self) -> Result<EmbeddingStore> {
        let path = self.embeddings_path();
        load_embedding_store(&path).map_err(|_| NeurocodeError::EmbeddingsNotFound { path })
    }

    /// `ir [path] [--check]`. Builds and persists a fresh snapshot, or, with
    /// `check_only`, verifies the existing one without rebuilding.
    pub fn ir_command(&self, check_only: bool) -> Result<IrBuildResult> {
        let ir = if check_only { self.load_ir()? } else { build_repository_ir(&self.root, now_iso8601()) };
        let fresh = repository_is_fresh(&self.root, &ir);
        if !check_only {
            save_repository_ir(&ir, &self.ir_path()).map_err(|e| NeurocodeError::io(self.ir_path(), e))?;
        }
        Ok(IrBuildResult {
            root: self.root.display().to_string(),
            num_modules: ir.modules.len(),
            num_classes: ir.modules.iter().map(|m| m.classes.len()).sum(),
            num_functions: ir.functions().count(),
            num_call_edges: ir.call_edges.len(),
            checked: check_only,
            fresh,
        })
    }

    /// `status [path]`.
    pub fn status(&self) -> Result<StatusResult> {
        let ir = self.load_ir()?;
        let modules = freshness_entries(&self.root, &ir);
        let fresh = modules.iter().all(|m| m.status == ModuleFreshness::Fresh);
        Ok(StatusResult { root: self.root.display().to_string(), fresh, modules, config: self.config_summary() })
    }

    /// `check <file>`.
    pub fn check_file(&self, file: &Path) -> Result<CheckResultView> {
        let ir = self.load_ir()?;
        let abs_file = self.root.join(file);
        let module = module_for_file(&ir, &self.root, &abs_file)
            .ok_or_else(|| NeurocodeError::SymbolNotFound(format!("no module recorded for {}", file.display())))?;
        let findings = check_module(&ir, module, &abs_file, &self.config).into_iter().map(Into::into).collect();
        let stale_warning = stale_warning(&self.root, &ir, &abs_file);
        Ok(CheckResultView { file: module.path.display().to_string(), findings, stale_warning })
    }

    /// `query <path> --kind ...`.
    pub fn query(&self, kind: QueryKind, symbol: Option<&str>, module_filter: Option<&str>) -> Result<QueryResult> {
        let ir = self.load_ir()?;
        let outcome = run_query(&ir, &self.root, kind, symbol, module_filter)?;
        Ok(outcome.into_query_result(kind))
    }

    /// `embed [path] [--update]`. `provider` must match `self.config`'s
    /// allowed/selected provider; the CLI is responsible for refusing a
    /// dummy provider when configuration disallows it.
    pub fn embed(&self, provider: &dyn EmbeddingProvider, update: bool) -> Result<EmbedResult> {
        let ir = self.load_ir()?;
        let mut items = build_embedding_items(&ir);
        let items_total = items.len();

        let existing: HashMap<String, EmbeddingItem> = if update {
            self.load_embeddings().map(|s| s.items.into_iter().map(|i| (i.id.clone(), i)).collect()).unwrap_or_default()
        } else {
            HashMap::new()
        };

        let mut to_embed_idx = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let reuse = existing.get(&item.id).map(|e| e.text == item.text).unwrap_or(false);
            if !reuse {
                to_embed_idx.push(idx);
            }
        }

        if !to_embed_idx.is_empty() {
            let texts: Vec<String> = to_embed_idx.iter().map(|&i| items[i].text.clone()).collect();
            let vectors = provider.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(NeurocodeError::ConfigError("embedding provider returned a mismatched batch size".to_string()));
            }
            for (i, vector) in to_embed_idx.iter().zip(vectors) {
                items[*i].embedding = vector;
            }
        } else {
            for item in items.iter_mut() {
                if let Some(prior) = existing.get(&item.id) {
                    item.embedding = prior.embedding.clone();
                }
            }
        }
        for item in items.iter_mut() {
            if item.embedding.is_empty() {
                if let Some(prior) = existing.get(&item.id) {
                    item.embedding = prior.embedding.clone();
                }
            }
        }

        let store = EmbeddingStore {
            version: 1,
            engine_version: ENGINE_VERSION.to_string(),
            model: provider.model_name().to_string(),
            created_at: now_iso8601(),
            repo_root: self.root.clone(),
            items,
        };
        save_embedding_store(&store, &self.embeddings_path()).map_err(|e| NeurocodeError::io(self.embeddings_path(), e))?;

        Ok(EmbedResult {
            root: self.root.display().to_string(),
            provider: provider.model_name().to_string(),
            model: provider.model_name().to_string(),
            items_embedded: to_embed_idx.len(),
            items_total,
            updated_existing_store: update && !existing.is_empty(),
        })
    }

    /// `search <path> --text ...`.
    pub fn search_text(&self, query: &str, provider: &dyn EmbeddingProvider, module_filter: Option<&str>, k: usize) -> Result<SearchResult> {
        let store = self.load_embeddings()?;
        if store.model != provider.model_name() {
            return Err(NeurocodeError::ConfigError(format!(
                "embedding store was built with model '{}', but the search provider is '{}'",
                store.model,
                provider.model_name()
            )));
        }
        let vector = provider.embed_batch(std::slice::from_ref(&query.to_string()))?.remove(0);
        let hits = search_embeddings(&store, &vector, module_filter, k).into_iter().map(Into::into).collect();
        Ok(SearchResult { query: query.to_string(), hits })
    }

    /// `search <path> --like <symbol>`.
    pub fn search_like(&self, symbol: &str, module_filter: Option<&str>, k: usize) -> Result<SearchResult> {
        let store = self.load_embeddings()?;
        let item = resolve_like_symbol(&store, symbol)?;
        let vector = item.embedding.clone();
        let hits: Vec<SearchHit> = search_embeddings(&store, &vector, module_filter, k).into_iter().map(Into::into).collect();
        Ok(SearchResult { query: symbol.to_string(), hits })
    }

    /// `explain <file>`.
    pub fn explain(&self, file: &Path) -> Result<ExplainResult> {
        let ir = self.load_ir()?;
        explain_module(&ir, &self.root, &self.root.join(file))
    }

    /// `explain-bundle <file> [--symbol]`.
    pub fn explain_bundle(&self, file: &Path, symbol: Option<&str>) -> Result<ExplainBundle> {
        let ir = self.load_ir()?;
        let embeddings = self.load_embeddings().ok();
        build_explain_bundle(&ir, &self.root, &self.root.join(file), symbol, &self.config, embeddings.as_ref(), DEFAULT_NEIGHBOR_K)
    }

    /// `plan <file> --symbol <name>`.
    pub fn plan(&self, file: &Path, symbol: &str) -> Result<PatchPlanBundle> {
        let ir = self.load_ir()?;
        let embeddings = self.load_embeddings().ok();
        build_patch_plan(&ir, &self.root, &self.root.join(file), symbol, &self.config, embeddings.as_ref())
    }

    /// `plan apply <plan.json>`.
    pub fn plan_apply(&self, plan_json: &Value, dry_run: bool, show_diff: bool) -> Result<PatchApplyResult> {
        validate_patch_plan_shape(plan_json)?;
        let bundle: PatchPlanBundle =
            serde_json::from_value(plan_json.clone()).map_err(|e| NeurocodeError::PatchPlanError(format!("malformed plan: {e}")))?;
        let result = apply_patch_plan(&bundle, &self.root, dry_run, show_diff)?;
        if !result.is_noop && !dry_run {
            append_patch_history(
                &self.root,
                &now_iso8601(),
                "plan apply",
                result.files_changed.clone(),
                result.is_noop,
                &format!("applied plan {}", bundle.plan_id),
                result.warnings.clone(),
                Some(bundle.plan_id.clone()),
            );
        }
        Ok(result)
    }

    /// `patch <file> --fix <text>`.
    #[allow(clippy::too_many_arguments)]
    pub fn patch(
        &self,
        file: &Path,
        fix: &str,
        strategy: Strategy,
        target: Option<&str>,
        dry_run: bool,
        require_fresh_ir: bool,
        require_target: bool,
    ) -> Result<LocalPatchResult> {
        let ir = self.load_ir().ok();
        let abs_file = self.root.join(file);
        let result = apply_local_patch(ir.as_ref(), &self.root, &abs_file, fix, strategy, target, dry_run, require_fresh_ir, require_target)?;
        if !result.is_noop && result.written {
            append_patch_history(
                &self.root,
                &now_iso8601(),
                fix,
                vec![result.file.clone()],
                result.is_noop,
                &format!("local patch ({}) on {}", result.strategy, result.file),
                result.warnings.clone(),
                None,
            );
        }
        Ok(result)
    }

    /// `patch-history [path]`.
    pub fn patch_history(&self, limit: Option<usize>) -> Result<PatchHistoryResult> {
        let history = load_patch_history(&self.root);
        let mut entries: Vec<PatchHistoryEntryView> = history
            .entries
            .into_iter()
            .map(|e| PatchHistoryEntryView {
                id: e.id,
                timestamp: e.timestamp,
                fix: e.fix,
                files_changed: e.files_changed,
                is_noop: e.is_noop,
                summary: e.summary,
                warnings: e.warnings,
                plan_id: e.plan_id,
            })
            .collect();
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(PatchHistoryResult { root: self.root.display().to_string(), entries })
    }
}

/// Deterministic module-status check used by `status` when rendering a
/// single module's freshness without materializing the whole entries list.
pub fn freshness_of(ir: &RepositoryIR, repo_root: &Path, file: &Path) -> Option<ModuleFreshness> {
    module_for_file(ir, repo_root, file).map(|m| module_freshness(repo_root, m))
}

pub fn stable_plan_seed(file: &str, symbol: &str) -> String {
    stable_id(&format!("{file}:{symbol}"), 0)
}
