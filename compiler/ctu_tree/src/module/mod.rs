//! Hierarchical tagged symbol tables.
//!
//! A module is a declaration node owning one symbol map per [`Tag`]. Tags
//! name declaration categories (values, types, procedures, nested modules,
//! plus whatever a front end adds past [`Tag::CORE_COUNT`]). Lookups that
//! miss fall back to the parent module under the same tag, so a child's tag
//! count is never smaller than its parent's.

use std::fmt;
use std::sync::OnceLock;

use ctu_ir::{Name, Span};
use rustc_hash::FxHashMap;

use crate::node::{DeclState, NodeKind};
use crate::{Tree, TreeId};

/// Index of a declaration category inside a module.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Tag(u16);

impl Tag {
    pub const VALUES: Tag = Tag(0);
    pub const TYPES: Tag = Tag(1);
    pub const PROCS: Tag = Tag(2);
    pub const MODULES: Tag = Tag(3);

    /// Number of tags every module has.
    pub const CORE_COUNT: usize = 4;

    pub const fn new(index: u16) -> Self {
        Tag(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tag::VALUES => write!(f, "Tag::VALUES"),
            Tag::TYPES => write!(f, "Tag::TYPES"),
            Tag::PROCS => write!(f, "Tag::PROCS"),
            Tag::MODULES => write!(f, "Tag::MODULES"),
            Tag(n) => write!(f, "Tag({n})"),
        }
    }
}

/// Name to declaration map that remembers insertion order.
#[derive(Clone, Debug, Default)]
pub struct SymbolMap {
    lookup: FxHashMap<Name, usize>,
    entries: Vec<(Name, TreeId)>,
}

impl SymbolMap {
    pub fn get(&self, name: Name) -> Option<TreeId> {
        self.lookup.get(&name).map(|&index| self.entries[index].1)
    }

    /// Insert unless already present. Returns the existing entry on conflict.
    fn insert(&mut self, name: Name, value: TreeId) -> Option<TreeId> {
        if let Some(existing) = self.get(name) {
            return Some(existing);
        }
        self.lookup.insert(name, self.entries.len());
        self.entries.push((name, value));
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, TreeId)> + '_ {
        self.entries.iter().copied()
    }
}

static NO_SYMBOLS: OnceLock<SymbolMap> = OnceLock::new();

/// What an error node looks like when it stands in for a module.
static DETACHED: ModuleData = ModuleData {
    parent: None,
    tags: Vec::new(),
};

/// Payload of a module node.
#[derive(Clone, Debug)]
pub struct ModuleData {
    parent: Option<TreeId>,
    tags: Vec<SymbolMap>,
}

impl ModuleData {
    pub fn parent(&self) -> Option<TreeId> {
        self.parent
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Symbols under `tag`. Tags the module does not have are empty.
    pub fn tag(&self, tag: Tag) -> &SymbolMap {
        self.tags
            .get(tag.index())
            .unwrap_or_else(|| NO_SYMBOLS.get_or_init(SymbolMap::default))
    }
}

impl Tree {
    /// Create a module with `tag_count` empty symbol maps.
    ///
    /// # Panics
    /// Panics if `tag_count` is smaller than the parent's tag count.
    pub fn module(
        &mut self,
        span: Span,
        name: &str,
        parent: Option<TreeId>,
        tag_count: usize,
    ) -> TreeId {
        if let Some(parent) = parent {
            let parent_count = self.module_data(parent).tag_count();
            assert!(
                tag_count >= parent_count,
                "module `{name}` has {tag_count} tags, its parent has {parent_count}"
            );
        }
        let data = ModuleData {
            parent,
            tags: vec![SymbolMap::default(); tag_count],
        };
        let name = self.decl_name(name);
        self.alloc_decl(NodeKind::DeclModule(data), span, None, name, DeclState::Closed)
    }

    pub fn is_module(&self, id: TreeId) -> bool {
        matches!(self.get_kind(id), NodeKind::DeclModule(_))
    }

    /// Payload of `module`. An error node reads as a module with no
    /// symbols and no parent.
    pub fn module_data(&self, module: TreeId) -> &ModuleData {
        match self.get_kind(module) {
            NodeKind::DeclModule(data) => data,
            NodeKind::Error { .. } => &DETACHED,
            _ => panic!("{} is not a module", self.display(module)),
        }
    }

    fn module_data_mut(&mut self, module: TreeId) -> &mut ModuleData {
        if !self.is_module(module) {
            panic!("{} is not a module", self.display(module));
        }
        match &mut self.node_mut(module).kind {
            NodeKind::DeclModule(data) => data,
            _ => unreachable!("checked above"),
        }
    }

    pub fn module_parent(&self, module: TreeId) -> Option<TreeId> {
        self.module_data(module).parent
    }

    /// Symbols of one tag in insertion order.
    pub fn module_tag(&self, module: TreeId, tag: Tag) -> &SymbolMap {
        self.module_data(module).tag(tag)
    }

    /// Look `name` up under `tag`, falling back to the ancestors.
    pub fn module_get(&self, module: TreeId, tag: Tag, name: &str) -> Option<TreeId> {
        self.module_find(module, tag, name).map(|(value, _)| value)
    }

    /// Like [`Tree::module_get`], also returning the module that held the
    /// symbol so callers can apply visibility rules.
    pub fn module_find(&self, module: TreeId, tag: Tag, name: &str) -> Option<(TreeId, TreeId)> {
        let name = self.interner().get(name)?;
        let mut current = Some(module);
        while let Some(scope) = current {
            let data = self.module_data(scope);
            if let Some(value) = data.tags.get(tag.index()).and_then(|map| map.get(name)) {
                return Some((value, scope));
            }
            current = data.parent;
        }
        None
    }

    /// Add `name` under `tag` unless the module already has it.
    ///
    /// The first definition wins. Returns the existing declaration when the
    /// name was taken; ancestors are not consulted.
    pub fn module_set(
        &mut self,
        module: TreeId,
        tag: Tag,
        name: &str,
        value: TreeId,
    ) -> Option<TreeId> {
        let name = self.intern(name);
        let data = self.module_data_mut(module);
        let count = data.tags.len();
        let Some(map) = data.tags.get_mut(tag.index()) else {
            panic!("tag {tag:?} is out of range for a module with {count} tags");
        };
        map.insert(name, value)
    }

    /// Probe `tags` in order and return the first hit.
    pub fn select_decl(&self, module: TreeId, tags: &[Tag], name: &str) -> Option<TreeId> {
        tags.iter()
            .find_map(|&tag| self.module_get(module, tag, name))
    }
}
