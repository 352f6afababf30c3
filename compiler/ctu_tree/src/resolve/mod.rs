//! Lazy declaration resolution.
//!
//! Front ends forward-declare with an `open_*` constructor carrying a
//! [`ResolveInfo`]. The first time anything asks for the declaration,
//! [`TreeContext::resolve`] pushes it on the cookie's value stack, runs the
//! callback and pops it again. Finding the declaration already on the stack
//! means the callback chain came back around: that is a cycle, reported once
//! as `E2001` and answered with an error sentinel.
//!
//! Signatures resolve separately through [`TreeContext::resolve_type`] on a
//! second stack, so mutually recursive functions can see each other's
//! signatures before either body is resolved.

use std::fmt;
use std::rc::Rc;

use ctu_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use ctu_ir::Span;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::module::Tag;
use crate::node::NodeKind;
use crate::{Tree, TreeId};

/// Resolution callback: `(context, scope, decl)`.
///
/// Front end data the callback needs is captured by the closure.
pub type ResolveFn = Rc<dyn Fn(&mut TreeContext, TreeId, TreeId)>;

/// Pending front end work attached to an open declaration.
#[derive(Clone)]
pub struct ResolveInfo {
    /// Scope the declaration was forwarded into.
    pub scope: TreeId,
    resolve: ResolveFn,
    resolve_type: Option<ResolveFn>,
}

impl ResolveInfo {
    pub fn new(scope: TreeId, resolve: impl Fn(&mut TreeContext, TreeId, TreeId) + 'static) -> Self {
        ResolveInfo {
            scope,
            resolve: Rc::new(resolve),
            resolve_type: None,
        }
    }

    /// Add a callback that only resolves the declaration's signature.
    #[must_use]
    pub fn with_resolve_type(
        mut self,
        resolve_type: impl Fn(&mut TreeContext, TreeId, TreeId) + 'static,
    ) -> Self {
        self.resolve_type = Some(Rc::new(resolve_type));
        self
    }

    pub fn has_resolve_type(&self) -> bool {
        self.resolve_type.is_some()
    }
}

impl fmt::Debug for ResolveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveInfo")
            .field("scope", &self.scope)
            .field("resolve_type", &self.resolve_type.is_some())
            .finish_non_exhaustive()
    }
}

/// Which of the two in-progress stacks a resolution runs on.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Stack {
    Value,
    Type,
}

/// Shared state of one compilation run: the diagnostic sink and the
/// in-progress stacks used for cycle detection.
#[derive(Debug, Default)]
pub struct Cookie {
    reports: DiagnosticQueue,
    value_stack: Vec<TreeId>,
    type_stack: Vec<TreeId>,
    /// Error node handed out for each declaration found in a cycle.
    value_cycles: FxHashMap<TreeId, TreeId>,
    type_cycles: FxHashMap<TreeId, TreeId>,
}

impl Cookie {
    pub fn new(reports: DiagnosticQueue) -> Self {
        Cookie {
            reports,
            ..Cookie::default()
        }
    }

    pub fn reports(&self) -> &DiagnosticQueue {
        &self.reports
    }

    pub fn reports_mut(&mut self) -> &mut DiagnosticQueue {
        &mut self.reports
    }

    /// Declarations currently resolving, outermost first.
    pub fn value_stack(&self) -> &[TreeId] {
        &self.value_stack
    }

    pub fn type_stack(&self) -> &[TreeId] {
        &self.type_stack
    }

    fn stack(&self, which: Stack) -> &[TreeId] {
        match which {
            Stack::Value => &self.value_stack,
            Stack::Type => &self.type_stack,
        }
    }

    fn stack_mut(&mut self, which: Stack) -> &mut Vec<TreeId> {
        match which {
            Stack::Value => &mut self.value_stack,
            Stack::Type => &mut self.type_stack,
        }
    }

    fn cycles_mut(&mut self, which: Stack) -> &mut FxHashMap<TreeId, TreeId> {
        match which {
            Stack::Value => &mut self.value_cycles,
            Stack::Type => &mut self.type_cycles,
        }
    }
}

/// The tree together with the cookie. Resolution callbacks receive this.
#[derive(Debug, Default)]
pub struct TreeContext {
    pub tree: Tree,
    pub cookie: Cookie,
}

impl TreeContext {
    pub fn new(tree: Tree, reports: DiagnosticQueue) -> Self {
        TreeContext {
            tree,
            cookie: Cookie::new(reports),
        }
    }

    /// Resolve `decl` if it is still open and return it.
    ///
    /// Closed declarations and errors are returned unchanged. A declaration
    /// that is already being resolved further up the call chain produces an
    /// error node; the first such discovery reports `E2001` and later ones
    /// return the same error silently.
    pub fn resolve(&mut self, decl: TreeId) -> TreeId {
        if self.tree.is_error(decl) {
            return decl;
        }
        let Some(info) = self.tree.resolve_info(decl).cloned() else {
            return decl;
        };
        if let Some(cycle) = self.enter_cycle(Stack::Value, decl) {
            return cycle;
        }
        let resolve = Rc::clone(&info.resolve);
        self.with_resolving(Stack::Value, decl, |cx| resolve(cx, info.scope, decl));
        decl
    }

    /// Resolve only the type of `decl`.
    ///
    /// Partial declarations run their type callback, or their resolve
    /// callback when they have none. Functions run their type callback if
    /// one was given and their signature is still unset. Everything else is
    /// returned unchanged.
    pub fn resolve_type(&mut self, decl: TreeId) -> TreeId {
        if self.tree.is_error(decl) {
            return decl;
        }
        let Some(info) = self.tree.resolve_info(decl).cloned() else {
            return decl;
        };
        let callback = match self.tree.get_kind(decl) {
            NodeKind::Partial => info
                .resolve_type
                .clone()
                .unwrap_or_else(|| Rc::clone(&info.resolve)),
            NodeKind::DeclFunction { .. } if self.tree.try_get_type(decl).is_none() => {
                match info.resolve_type.clone() {
                    Some(callback) => callback,
                    None => return decl,
                }
            }
            _ => return decl,
        };
        if let Some(cycle) = self.enter_cycle(Stack::Type, decl) {
            return cycle;
        }
        self.with_resolving(Stack::Type, decl, |cx| callback(cx, info.scope, decl));
        decl
    }

    /// Cached or freshly reported cycle error if `decl` is already on `which`.
    fn enter_cycle(&mut self, which: Stack, decl: TreeId) -> Option<TreeId> {
        if let Some(&cached) = self.cookie.cycles_mut(which).get(&decl) {
            return Some(cached);
        }
        let start = self.cookie.stack(which).iter().position(|&d| d == decl)?;

        let name = self.tree.get_name(decl).to_owned();
        let span = self.tree.get_span(decl);
        debug!(
            decl = %name,
            depth = self.cookie.stack(which).len(),
            stack = ?which,
            "cyclic dependency"
        );

        let tree = &self.tree;
        let diag = Diagnostic::error(ErrorCode::CYCLIC_DEPENDENCY)
            .with_message(format!("cyclic dependency when resolving `{name}`"))
            .with_label(span, "cycle detected here")
            .with_chain(self.cookie.stack(which)[start + 1..].iter().map(|&link| {
                (
                    tree.get_span(link),
                    format!("which requires `{}`", tree.get_name(link)),
                )
            }));
        self.cookie.reports.push(diag);

        let error = self
            .tree
            .error(span, ErrorCode::CYCLIC_DEPENDENCY, "cyclic dependency");
        self.cookie.cycles_mut(which).insert(decl, error);
        Some(error)
    }

    /// Run `f` with `decl` pushed on the `which` stack.
    ///
    /// The pop happens when the guard drops, so a callback that panics
    /// leaves the stack as it found it.
    fn with_resolving<F>(&mut self, which: Stack, decl: TreeId, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.cookie.stack_mut(which).push(decl);
        trace!(?decl, stack = ?which, depth = self.cookie.stack(which).len(), "resolve push");

        let mut guard = Resolving {
            cx: self,
            which,
            decl,
        };
        ctu_stack::ensure_sufficient_stack(|| f(&mut *guard));
    }

    /// Build an error node and report it immediately.
    pub fn raise(&mut self, span: Span, code: ErrorCode, message: impl Into<String>) -> TreeId {
        let message = message.into();
        self.cookie.reports.push(
            Diagnostic::from_code(code)
                .with_message(message.clone())
                .with_label(span, ""),
        );
        self.tree.error(span, code, message)
    }

    /// Report a diagnostic through the cookie's sink.
    pub fn report(&mut self, diag: Diagnostic) {
        self.cookie.reports.push(diag);
    }

    /// Add `value` to `module` and report `E1004` if the name was taken.
    ///
    /// Returns the declaration that ends up in the module, which is the
    /// first one on a conflict.
    pub fn declare(&mut self, module: TreeId, tag: Tag, name: &str, value: TreeId) -> TreeId {
        let Some(previous) = self.tree.module_set(module, tag, name, value) else {
            return value;
        };
        if previous != value {
            let diag = Diagnostic::error(ErrorCode::SYMBOL_SHADOWED)
                .with_message(format!("redefinition of `{name}`"))
                .with_label(self.tree.get_span(value), "redefined here")
                .with_secondary_label(self.tree.get_span(previous), "previous definition here");
            self.cookie.reports.push(diag);
        }
        previous
    }
}

/// A declaration on one of the cookie stacks, popped on drop.
struct Resolving<'a> {
    cx: &'a mut TreeContext,
    which: Stack,
    decl: TreeId,
}

impl std::ops::Deref for Resolving<'_> {
    type Target = TreeContext;

    fn deref(&self) -> &TreeContext {
        self.cx
    }
}

impl std::ops::DerefMut for Resolving<'_> {
    fn deref_mut(&mut self) -> &mut TreeContext {
        self.cx
    }
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        let (which, decl) = (self.which, self.decl);
        let popped = self.cx.cookie.stack_mut(which).pop();
        if !std::thread::panicking() {
            debug_assert_eq!(popped, Some(decl), "resolution stack out of balance");
        }
        trace!(?decl, stack = ?which, still_open = self.cx.tree.is_open(decl), "resolve pop");
    }
}
