//! Hosting driver for the shared compiler core.
//!
//! The broker owns the tree, the resolution context and the root module.
//! Language frontends register builtin modules and compile units under the
//! root, forward their declarations into them, and then the broker runs the
//! rest of the pipeline:
//!
//! 1. **Forward**: frontends open declarations in their units.
//! 2. **Resolve**: every declaration of every module is resolved.
//! 3. **Check**: the validator walks the resolved tree.
//!
//! Each stage ends with [`Broker::end_stage`], which drains the stage's
//! diagnostics into an emitter and stops the pipeline if any were fatal.

mod stage;


use std::sync::Once;

use ctu_diagnostic::emitter::DiagnosticEmitter;
use ctu_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use ctu_ir::Span;
use ctu_tree::{Prelude, Tag, Tree, TreeContext, TreeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument};

pub use stage::Stage;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=ctu_tree=trace` or `RUST_LOG=ctu_broker=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .try_init();
        }
    });
}

/// Join the parts of a unit path into its id, `a/b/c`.
pub fn unit_id(parts: &[&str]) -> String {
    parts.join("/")
}

/// Driver configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrokerConfig {
    pub diagnostics: DiagnosticConfig,
    /// Number of declaration tags of the root module. Modules registered
    /// under the root need at least as many.
    pub tag_count: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            diagnostics: DiagnosticConfig::default(),
            tag_count: Tag::CORE_COUNT,
        }
    }
}

/// One compilation: the tree, its root module and every registered module.
pub struct Broker {
    cx: TreeContext,
    root: TreeId,
    prelude: Prelude,
    stage: Stage,
    /// Modules provided by language runtimes, found before compile units.
    builtins: FxHashMap<String, TreeId>,
    units: FxHashMap<String, TreeId>,
}

impl Broker {
    /// # Panics
    /// Panics if `config.tag_count` is below [`Tag::CORE_COUNT`].
    pub fn new(config: BrokerConfig) -> Self {
        assert!(
            config.tag_count >= Tag::CORE_COUNT,
            "the root module needs at least {} tags, got {}",
            Tag::CORE_COUNT,
            config.tag_count
        );
        let mut cx = TreeContext::new(
            Tree::new(),
            DiagnosticQueue::with_config(config.diagnostics),
        );
        let prelude = Prelude::new(&mut cx.tree);
        let root = cx.tree.module(Span::DUMMY, "root", None, config.tag_count);
        Broker {
            cx,
            root,
            prelude,
            stage: Stage::default(),
            builtins: FxHashMap::default(),
            units: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> TreeId {
        self.root
    }

    pub fn prelude(&self) -> &Prelude {
        &self.prelude
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tree(&self) -> &Tree {
        &self.cx.tree
    }

    /// Resolution context handed to frontends while forwarding.
    pub fn context_mut(&mut self) -> &mut TreeContext {
        &mut self.cx
    }

    pub fn reports(&self) -> &DiagnosticQueue {
        self.cx.cookie.reports()
    }

    // --- modules ---

    /// Register a module a language runtime provides, such as its standard
    /// library.
    pub fn add_language_module(&mut self, name: &str, tag_count: usize) -> TreeId {
        let module = self
            .cx
            .tree
            .module(Span::DUMMY, name, Some(self.root), tag_count);
        let module = self.cx.declare(self.root, Tag::MODULES, name, module);
        self.builtins.insert(name.to_owned(), module);
        module
    }

    /// Register a compile unit under the root. Returns `None` and reports a
    /// conflict if a unit or builtin module with the same id already exists.
    pub fn add_unit(&mut self, parts: &[&str], span: Span, tag_count: usize) -> Option<TreeId> {
        let id = unit_id(parts);
        if let Some(previous) = self.get_unit(&id) {
            let diag = Diagnostic::error(ErrorCode::SYMBOL_SHADOWED)
                .with_message(format!("module `{id}` already exists"))
                .with_label(span, "")
                .with_secondary_label(
                    self.cx.tree.get_span(previous),
                    "previous definition here",
                );
            self.cx.report(diag);
            return None;
        }
        let module = self.cx.tree.module(span, &id, Some(self.root), tag_count);
        let module = self.cx.declare(self.root, Tag::MODULES, &id, module);
        debug!(unit = %id, "registered compile unit");
        self.units.insert(id, module);
        Some(module)
    }

    /// Find a unit or builtin module by id.
    pub fn get_unit(&self, id: &str) -> Option<TreeId> {
        self.builtins
            .get(id)
            .or_else(|| self.units.get(id))
            .copied()
    }

    // --- pipeline ---

    /// Resolve every declaration reachable from the root.
    ///
    /// Values, then types, then functions of each module, then its nested
    /// modules. Each module is visited once.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve_all(&mut self) {
        self.stage = Stage::Resolve;
        let mut visited = FxHashSet::default();
        self.resolve_module(self.root, &mut visited);
    }

    fn resolve_module(&mut self, module: TreeId, visited: &mut FxHashSet<TreeId>) {
        if !visited.insert(module) {
            return;
        }
        for tag in [Tag::VALUES, Tag::TYPES, Tag::PROCS] {
            // Resolution may add to the module, so walk a snapshot.
            let decls: Vec<TreeId> = self
                .cx
                .tree
                .module_tag(module, tag)
                .iter()
                .map(|(_, decl)| decl)
                .collect();
            for decl in decls {
                self.cx.resolve(decl);
            }
        }

        let children: Vec<TreeId> = self
            .cx
            .tree
            .module_tag(module, Tag::MODULES)
            .iter()
            .map(|(_, child)| child)
            .filter(|&child| self.cx.tree.is_module(child))
            .collect();
        for child in children {
            ctu_stack::ensure_sufficient_stack(|| self.resolve_module(child, visited));
        }
    }

    /// Validate the resolved tree.
    pub fn check(&mut self) {
        self.stage = Stage::Check;
        let TreeContext { tree, cookie, .. } = &mut self.cx;
        ctu_check::check_tree(tree, cookie.reports_mut(), &[self.root]);
    }

    /// Drain the current stage's diagnostics into `emitter`.
    ///
    /// Returns an error if any of them halt the pipeline: errors always,
    /// warnings only when they are configured as errors.
    pub fn end_stage(&mut self, emitter: &mut dyn DiagnosticEmitter) -> Result<(), ErrorGuaranteed> {
        let reports = self.cx.cookie.reports_mut();
        let fatal = reports.fatal_count();
        let errors = reports.error_count() + reports.suppressed_count();
        let warnings = reports.warning_count();
        let diagnostics = reports.flush();
        debug!(stage = %self.stage, errors, warnings, "stage finished");

        if !diagnostics.is_empty() {
            emitter.emit_all(&diagnostics);
            emitter.emit_summary(errors, warnings);
        }
        emitter.flush();

        match ErrorGuaranteed::from_error_count(fatal) {
            Some(guar) => Err(guar),
            None => {
                if let Some(next) = self.stage.next() {
                    self.stage = next;
                }
                Ok(())
            }
        }
    }

    /// Run resolution and validation over everything forwarded so far,
    /// ending each stage through `emitter`.
    pub fn run(&mut self, emitter: &mut dyn DiagnosticEmitter) -> Result<(), ErrorGuaranteed> {
        self.end_stage(emitter)?;
        self.resolve_all();
        self.end_stage(emitter)?;
        self.check();
        self.end_stage(emitter)
    }
}
