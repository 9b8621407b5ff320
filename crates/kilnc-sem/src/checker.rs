//! The checker context.
//!
//! One [`Checker`] instance carries all mutable state for a compilation:
//! the type, entity, and scope arenas, the procedure stack, the `defer`
//! flag, and the declaration records that let identifier resolution pull
//! in declarations on demand. The checker is single-threaded and
//! non-suspending; traversal order is the depth-first AST walk, with
//! procedure bodies optionally parked on a worklist and drained after the
//! top-level pass so forward references resolve against completed
//! signatures.
//!
//! Errors never abort the walk. They are reported through the shared
//! [`Handler`] and the offending operand or entity is demoted to the
//! `Invalid` sentinel, which every downstream check recognizes and skips.

use crate::entity::{Entity, EntityArena, EntityId, EntityKind};
use crate::scope::{ScopeArena, ScopeId};
use crate::types::{TypeArena, TypeId};
use crate::value::ConstValue;
use kilnc_ast::{Block, DeclKind, Expr, File, ProcDecl, Stmt, TypeExpr, VarDecl};
use kilnc_util::diagnostic::DiagnosticCode;
use kilnc_util::symbol::SYM_UNDERSCORE;
use kilnc_util::{define_idx, DiagnosticBuilder, FxHashMap, Handler, IndexVec, Span};

define_idx!(
    /// Index of a declaration record.
    DeclId
);

/// Per-entity declaration record.
///
/// Created when a declaration is first collected; consulted when an
/// identifier forces the entity to resolve. For multi-name declarations
/// sharing one right-hand side, every entity of the group points at the
/// same record.
#[derive(Debug)]
pub struct DeclInfo<'ast> {
    /// Scope the declaration lives in. For procedures this becomes the
    /// parameter scope once the signature has been checked.
    pub scope: ScopeId,
    /// All entities bound by the declaration, in source order.
    pub entities: Vec<EntityId>,
    /// The shared type expression, if one was written.
    pub type_expr: Option<&'ast TypeExpr>,
    /// Initializer expressions, in source order.
    pub init_exprs: Vec<&'ast Expr>,
    /// The procedure declaration node, for procedure entities.
    pub proc_decl: Option<&'ast ProcDecl>,
}

/// A procedure body parked for the post-pass.
pub(crate) struct PendingBody<'ast> {
    #[allow(dead_code)]
    pub entity: EntityId,
    pub decl: DeclId,
    pub ty: TypeId,
    pub body: &'ast Block,
}

/// All mutable state of one checking run.
pub struct Checker<'a> {
    pub types: TypeArena,
    pub entities: EntityArena,
    pub scopes: ScopeArena,
    pub curr_scope: ScopeId,
    pub file_scope: ScopeId,
    pub(crate) proc_stack: Vec<TypeId>,
    pub(crate) in_defer: bool,
    pub(crate) decls: IndexVec<DeclId, DeclInfo<'a>>,
    pub(crate) decl_of: FxHashMap<EntityId, DeclId>,
    pub(crate) active_decl: Option<DeclId>,
    pub(crate) pending_bodies: Vec<PendingBody<'a>>,
    definitions: Vec<(Span, Option<EntityId>)>,
    handler: &'a Handler,
}

impl<'a> Checker<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        let mut scopes = ScopeArena::new();
        let file_scope = scopes.push_scope(None);
        Self {
            types: TypeArena::new(),
            entities: EntityArena::new(),
            scopes,
            curr_scope: file_scope,
            file_scope,
            proc_stack: Vec::new(),
            in_defer: false,
            decls: IndexVec::new(),
            decl_of: FxHashMap::default(),
            active_decl: None,
            pending_bodies: Vec::new(),
            definitions: Vec::new(),
            handler,
        }
    }

    /// Report an error and keep going.
    pub(crate) fn error(&self, span: Span, code: DiagnosticCode, message: impl Into<String>) {
        DiagnosticBuilder::error(message)
            .span(span)
            .code(code)
            .emit(self.handler);
    }

    /// Render a type for a diagnostic.
    pub fn type_string(&self, ty: TypeId) -> String {
        self.types.display(ty, &self.entities)
    }

    /// The declaration record currently being resolved, if any.
    ///
    /// Exposed for the expression checker's cycle bookkeeping.
    pub fn active_decl(&self) -> Option<DeclId> {
        self.active_decl
    }

    /// Identifier definitions recorded during checking, including `_`
    /// sinks (which carry no entity).
    pub fn definitions(&self) -> &[(Span, Option<EntityId>)] {
        &self.definitions
    }

    pub(crate) fn add_definition(&mut self, span: Span, entity: Option<EntityId>) {
        self.definitions.push((span, entity));
    }

    /// Enter a fresh scope under the current one.
    pub(crate) fn open_scope(&mut self) {
        self.curr_scope = self.scopes.push_scope(Some(self.curr_scope));
    }

    /// Leave the current scope. Every `open_scope` is paired with exactly
    /// one `close_scope` on all exit paths of the dispatcher.
    pub(crate) fn close_scope(&mut self) {
        if let Some(parent) = self.scopes.get(self.curr_scope).parent {
            self.curr_scope = parent;
        }
    }

    /// Register an entity in a scope, diagnosing redeclaration. The blank
    /// identifier never enters a scope.
    pub(crate) fn add_entity(&mut self, scope: ScopeId, entity: EntityId) {
        let name = self.entities[entity].name;
        if name == SYM_UNDERSCORE {
            return;
        }
        if self.scopes.insert(scope, name, entity).is_some() {
            self.error(
                self.entities[entity].span,
                kilnc_util::diagnostic::E_DECLARATION,
                format!("Redeclaration of `{name}` in this scope"),
            );
        }
    }

    pub(crate) fn push_procedure(&mut self, ty: TypeId) {
        self.proc_stack.push(ty);
    }

    pub(crate) fn pop_procedure(&mut self) {
        self.proc_stack.pop();
    }

    /// Park a body for the synchronous post-pass.
    pub(crate) fn check_procedure_later(
        &mut self,
        entity: EntityId,
        decl: DeclId,
        ty: TypeId,
        body: &'a Block,
    ) {
        self.pending_bodies.push(PendingBody {
            entity,
            decl,
            ty,
            body,
        });
    }

    /// Check a whole file: collect top-level declarations, resolve every
    /// entity (identifier resolution pulls dependencies in the right
    /// order), then drain the deferred procedure bodies.
    pub fn check_file(&mut self, file: &'a File) {
        let mut to_check = Vec::new();

        for stmt in &file.stmts {
            match stmt {
                Stmt::Empty(_) | Stmt::Bad(_) => {}
                Stmt::Var(decl) => self.collect_var_decl(decl, &mut to_check),
                Stmt::Proc(decl) => {
                    let entity = self.entities.push(Entity::procedure(
                        self.file_scope,
                        decl.name.name,
                        decl.name.span,
                    ));
                    self.add_entity(self.file_scope, entity);
                    self.register_decl(
                        &[entity],
                        DeclInfo {
                            scope: self.file_scope,
                            entities: vec![entity],
                            type_expr: None,
                            init_exprs: Vec::new(),
                            proc_decl: Some(decl),
                        },
                    );
                    to_check.push(entity);
                }
                Stmt::Type(decl) => {
                    let entity = self.entities.push(Entity::type_name(
                        self.file_scope,
                        decl.name.name,
                        decl.name.span,
                    ));
                    self.add_entity(self.file_scope, entity);
                    self.register_decl(
                        &[entity],
                        DeclInfo {
                            scope: self.file_scope,
                            entities: vec![entity],
                            type_expr: Some(&decl.type_expr),
                            init_exprs: Vec::new(),
                            proc_decl: None,
                        },
                    );
                    to_check.push(entity);
                }
                other => self.error(
                    other.span(),
                    kilnc_util::diagnostic::E_DECLARATION,
                    "Only declarations are permitted at file scope",
                ),
            }
        }

        for entity in to_check {
            if self.entities[entity].ty.is_none() {
                self.check_entity_declaration(entity, None);
            }
        }

        // Bodies may enqueue further bodies while being checked.
        loop {
            let batch = std::mem::take(&mut self.pending_bodies);
            if batch.is_empty() {
                break;
            }
            for pending in batch {
                self.check_procedure_body(pending.decl, pending.ty, pending.body);
            }
        }
    }

    /// Resolve one entity's declaration if it has not been resolved yet.
    ///
    /// This is the entry point the expression checker uses when an
    /// identifier names an entity without a type; the `visited` flag in
    /// the individual initializers keeps recursion finite.
    pub fn check_entity_declaration(&mut self, entity: EntityId, named_type: Option<TypeId>) {
        if self.entities[entity].ty.is_some() {
            return;
        }

        let Some(&decl) = self.decl_of.get(&entity) else {
            panic!(
                "Compiler error: entity `{}` has no declaration record",
                self.entities[entity].name
            );
        };

        match self.entities[entity].kind {
            EntityKind::Constant { .. } => {
                let record = &self.decls[decl];
                let type_expr = record.type_expr;
                let init = record.init_exprs.first().copied();
                let previous = self.active_decl.replace(decl);
                self.check_constant_declaration(entity, type_expr, init);
                self.active_decl = previous;
            }
            EntityKind::Variable { .. } => {
                let record = &self.decls[decl];
                let type_expr = record.type_expr;
                let group = record.entities.clone();
                let inits = record.init_exprs.clone();
                let previous = self.active_decl.replace(decl);
                self.check_variable_declaration(entity, &group, type_expr, &inits);
                self.active_decl = previous;
            }
            EntityKind::TypeName => {
                let Some(type_expr) = self.decls[decl].type_expr else {
                    panic!(
                        "Compiler error: type entity `{}` has no type expression",
                        self.entities[entity].name
                    );
                };
                self.check_type_declaration(entity, type_expr, named_type);
            }
            EntityKind::Procedure => {
                self.check_procedure_declaration(entity, decl, true);
            }
            EntityKind::Dummy => {}
        }
    }

    fn register_decl(&mut self, entities: &[EntityId], info: DeclInfo<'a>) -> DeclId {
        let decl = self.decls.push(info);
        for &entity in entities {
            self.decl_of.insert(entity, decl);
        }
        decl
    }

    /// Collect a file-scope variable or constant declaration: create the
    /// entities, register them so forward references resolve, and attach
    /// the declaration record actual checking will consume.
    fn collect_var_decl(&mut self, decl: &'a VarDecl, to_check: &mut Vec<EntityId>) {
        match decl.kind {
            DeclKind::Mutable => {
                let mut group = Vec::with_capacity(decl.names.len());
                for name in &decl.names {
                    let entity = match name {
                        Expr::Ident(ident) => {
                            let entity = self.entities.push(Entity::variable(
                                self.file_scope,
                                ident.name,
                                ident.span,
                                None,
                            ));
                            self.add_definition(ident.span, Some(entity));
                            if !ident.is_blank() {
                                self.add_entity(self.file_scope, entity);
                            }
                            entity
                        }
                        other => {
                            self.error(
                                other.span(),
                                kilnc_util::diagnostic::E_DECLARATION,
                                "A variable declaration must be an identifier",
                            );
                            self.entities
                                .push(Entity::dummy_variable(self.file_scope, other.span()))
                        }
                    };
                    group.push(entity);
                }
                self.register_decl(
                    &group,
                    DeclInfo {
                        scope: self.file_scope,
                        entities: group.clone(),
                        type_expr: decl.type_expr.as_ref(),
                        init_exprs: decl.values.iter().collect(),
                        proc_decl: None,
                    },
                );
                to_check.extend(
                    group
                        .iter()
                        .copied()
                        .filter(|&e| self.entities[e].is_variable()),
                );
            }
            DeclKind::Immutable => {
                for (index, name) in decl.names.iter().enumerate() {
                    let Expr::Ident(ident) = name else {
                        self.error(
                            name.span(),
                            kilnc_util::diagnostic::E_DECLARATION,
                            "A variable declaration must be an identifier",
                        );
                        continue;
                    };
                    let entity = self.entities.push(Entity::constant(
                        self.file_scope,
                        ident.name,
                        ident.span,
                        ConstValue::Invalid,
                    ));
                    self.add_entity(self.file_scope, entity);
                    self.register_decl(
                        &[entity],
                        DeclInfo {
                            scope: self.file_scope,
                            entities: vec![entity],
                            type_expr: decl.type_expr.as_ref(),
                            init_exprs: decl.values.get(index).into_iter().collect(),
                            proc_decl: None,
                        },
                    );
                    to_check.push(entity);
                }
                self.check_constant_decl_arity(decl);
            }
        }
    }

    /// Arity diagnostics shared by the file-scope and statement-level
    /// constant declaration paths.
    pub(crate) fn check_constant_decl_arity(&self, decl: &VarDecl) {
        let lhs_count = decl.names.len();
        let rhs_count = decl.values.len();
        if rhs_count == 0 && decl.type_expr.is_none() {
            self.error(
                decl.span,
                kilnc_util::diagnostic::E_DECLARATION,
                "Missing type or initial expression",
            );
        } else if lhs_count < rhs_count {
            self.error(
                decl.span,
                kilnc_util::diagnostic::E_ARITY_MISMATCH,
                "Extra initial expression",
            );
        } else if lhs_count > rhs_count && rhs_count > 0 {
            self.error(
                decl.span,
                kilnc_util::diagnostic::E_ARITY_MISMATCH,
                "Missing initial expression",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checker_has_file_scope() {
        let handler = Handler::new();
        let checker = Checker::new(&handler);
        assert_eq!(checker.curr_scope, checker.file_scope);
        assert!(checker.proc_stack.is_empty());
        assert!(!checker.in_defer);
    }

    #[test]
    fn test_scope_nesting_restores() {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        let file = checker.curr_scope;
        checker.open_scope();
        let inner = checker.curr_scope;
        assert_ne!(inner, file);
        checker.close_scope();
        assert_eq!(checker.curr_scope, file);
    }

    #[test]
    fn test_add_entity_ignores_blank() {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        let scope = checker.file_scope;
        let blank = checker
            .entities
            .push(Entity::dummy_variable(scope, Span::DUMMY));
        checker.add_entity(scope, blank);
        assert_eq!(checker.scopes.get(scope).elements().count(), 0);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_add_entity_reports_redeclaration() {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        let scope = checker.file_scope;
        let name = kilnc_util::Symbol::intern("twice");
        let first = checker
            .entities
            .push(Entity::variable(scope, name, Span::DUMMY, None));
        let second = checker
            .entities
            .push(Entity::variable(scope, name, Span::DUMMY, None));
        checker.add_entity(scope, first);
        checker.add_entity(scope, second);
        assert_eq!(handler.error_count(), 1);
        assert!(handler.messages()[0].contains("Redeclaration of `twice`"));
    }

    #[test]
    #[should_panic(expected = "no declaration record")]
    fn test_unregistered_entity_is_a_compiler_error() {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        let scope = checker.file_scope;
        let orphan = checker.entities.push(Entity::variable(
            scope,
            kilnc_util::Symbol::intern("orphan"),
            Span::DUMMY,
            None,
        ));
        checker.check_entity_declaration(orphan, None);
    }
}
