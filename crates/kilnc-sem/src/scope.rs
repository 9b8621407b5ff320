//! Lexical scopes.
//!
//! Scopes form a tree rooted at the file scope. Each scope exclusively
//! owns the bindings declared within it; entities themselves live in the
//! checker's entity arena and scopes refer to them by id. Bindings use an
//! `IndexMap` so iteration follows declaration order, which keeps
//! re-checking deterministic.

use crate::entity::EntityId;
use indexmap::IndexMap;
use kilnc_util::{define_idx, IndexVec, Symbol};

define_idx!(
    /// Index of a scope in the [`ScopeArena`].
    ScopeId
);

/// One lexical frame.
#[derive(Debug)]
pub struct Scope {
    /// Enclosing scope; `None` for the file scope.
    pub parent: Option<ScopeId>,
    elements: IndexMap<Symbol, EntityId>,
}

impl Scope {
    /// Bindings declared directly in this scope, in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = (Symbol, EntityId)> + '_ {
        self.elements.iter().map(|(&name, &entity)| (name, entity))
    }
}

/// Owner of every scope for the compilation.
pub struct ScopeArena {
    scopes: IndexVec<ScopeId, Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self {
            scopes: IndexVec::new(),
        }
    }

    /// Allocate a scope under `parent` (or a root when `None`).
    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            parent,
            elements: IndexMap::new(),
        })
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Bind `name` in `scope`. The first binding wins; an existing one is
    /// returned untouched so the caller can report the redeclaration.
    pub fn insert(&mut self, scope: ScopeId, name: Symbol, entity: EntityId) -> Option<EntityId> {
        let elements = &mut self.scopes[scope].elements;
        match elements.get(&name) {
            Some(&existing) => Some(existing),
            None => {
                elements.insert(name, entity);
                None
            }
        }
    }

    /// Find `name` in `scope` only, ignoring parents.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<EntityId> {
        self.scopes[scope].elements.get(&name).copied()
    }

    /// Find `name` in `scope` or the nearest enclosing scope binding it.
    pub fn lookup_parent(&self, scope: ScopeId, name: Symbol) -> Option<EntityId> {
        let mut current = scope;
        loop {
            if let Some(entity) = self.lookup(current, name) {
                return Some(entity);
            }
            match self.scopes[current].parent {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
