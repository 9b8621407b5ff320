//! The statement and declaration checker.
//!
//! This is the top of the checking pass: a type-directed walk over
//! statement nodes that resolves identifiers into entities, drives the
//! untyped-constant machinery, enforces assignability, destructures
//! multi-value right-hand sides, and verifies that procedures with
//! results always return.
//!
//! The pieces, leaves first: the assignability judge
//! ([`Checker::is_assignable_to`]), the assignment coercer
//! ([`Checker::check_assignment`]), the termination analyzer
//! ([`is_terminating`]), the l-value validator
//! ([`Checker::check_assign_variable`]), the multi-value binder
//! ([`Checker::check_init_variables`] and
//! [`Checker::check_assign_variables`]), the per-kind entity
//! initializers, and the [`Checker::check_statement`] dispatcher.

use crate::checker::{Checker, DeclId, DeclInfo};
use crate::entity::{Entity, EntityId, EntityKind};
use crate::operand::{AddressingMode, Operand};
use crate::types::{BasicKind, TypeId, TypeKind};
use crate::value::ConstValue;
use kilnc_ast::{
    AssignOp, Block, DeclKind, Expr, Stmt, TypeExpr, VarDecl,
};
use kilnc_util::diagnostic::{
    E_ARITY_MISMATCH, E_BAD_CATEGORY, E_CONTROL_FLOW, E_DECLARATION, E_NOT_LVALUE,
    E_TYPE_MISMATCH,
};

/// Whether control provably leaves the enclosing procedure at `stmt`
/// instead of reaching the next statement in sequence.
pub fn is_terminating(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } => true,
        Stmt::Block(block) => is_terminating_list(&block.stmts),
        Stmt::Expr(expr) => expression_terminates(expr),
        Stmt::If {
            then_body,
            else_stmt: Some(else_stmt),
            ..
        } => is_terminating(then_body) && is_terminating(else_stmt),
        // A `for` without a condition loops forever.
        Stmt::For { cond: None, .. } => true,
        _ => false,
    }
}

/// A statement list terminates when its last non-empty statement does.
pub fn is_terminating_list(stmts: &[Stmt]) -> bool {
    for stmt in stmts.iter().rev() {
        if matches!(stmt, Stmt::Empty(_)) {
            continue;
        }
        return is_terminating(stmt);
    }
    false
}

fn expression_terminates(expr: &Expr) -> bool {
    // Panicking intrinsics would be recognized here once the language
    // grows them; today no expression diverges.
    let _ = expr;
    false
}

impl<'a> Checker<'a> {
    /// Structural type identity.
    ///
    /// Basics and named types are unique in the arena, so equal ids cover
    /// them; composite constructors built at different sites compare
    /// structurally.
    pub fn are_types_identical(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.types.kind(a), self.types.kind(b)) {
            (TypeKind::Pointer { elem: ea }, TypeKind::Pointer { elem: eb }) => {
                self.are_types_identical(*ea, *eb)
            }
            (
                TypeKind::Array {
                    elem: ea,
                    count: ca,
                },
                TypeKind::Array {
                    elem: eb,
                    count: cb,
                },
            ) => ca == cb && self.are_types_identical(*ea, *eb),
            (TypeKind::Slice { elem: ea }, TypeKind::Slice { elem: eb }) => {
                self.are_types_identical(*ea, *eb)
            }
            (TypeKind::Tuple { variables: va }, TypeKind::Tuple { variables: vb }) => {
                va.len() == vb.len()
                    && va.iter().zip(vb).all(|(&ea, &eb)| {
                        let ta = self.entities[ea].ty.unwrap_or(TypeId::INVALID);
                        let tb = self.entities[eb].ty.unwrap_or(TypeId::INVALID);
                        self.are_types_identical(ta, tb)
                    })
            }
            (
                TypeKind::Proc {
                    params: pa,
                    results: ra,
                    ..
                },
                TypeKind::Proc {
                    params: pb,
                    results: rb,
                    ..
                },
            ) => {
                self.optional_tuples_identical(*pa, *pb)
                    && self.optional_tuples_identical(*ra, *rb)
            }
            _ => false,
        }
    }

    fn optional_tuples_identical(&self, a: Option<TypeId>, b: Option<TypeId>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.are_types_identical(a, b),
            _ => false,
        }
    }

    /// The assignability judge: may `operand` flow into a slot of type
    /// `target` without explicit conversion? First matching rule wins.
    pub fn is_assignable_to(&self, operand: &Operand<'a>, target: TypeId) -> bool {
        // Rule 1: errors were already reported; do not cascade.
        if operand.mode == AddressingMode::Invalid || target == TypeId::INVALID {
            return true;
        }

        let source = operand.ty;

        // Rule 2: identical types.
        if self.are_types_identical(source, target) {
            return true;
        }

        let source_base = self.types.base_type(source);
        let target_base = self.types.base_type(target);

        // Rule 3: untyped sources judged by value or class.
        if self.types.is_untyped(source_base) {
            match self.types.kind(target_base) {
                TypeKind::Basic(kind) => {
                    if operand.mode == AddressingMode::Constant {
                        return operand.value.is_expressible_as(*kind);
                    }
                    return self.types.as_basic(source_base) == Some(BasicKind::UntypedBool)
                        && kind.is_boolean();
                }
                TypeKind::Pointer { .. } => {
                    return self.types.as_basic(source_base) == Some(BasicKind::UntypedNil);
                }
                _ => {}
            }
        }

        // Rule 4: identical bases, as long as at most one side is a
        // declared named type (two named siblings stay nominal).
        if self.are_types_identical(source_base, target_base)
            && (!self.types.is_named(source) || !self.types.is_named(target))
        {
            return true;
        }

        // Rule 5: typed pointers exchange freely with the raw pointer.
        if self.types.is_pointer(source_base) && self.types.is_rawptr(target_base) {
            return true;
        }
        if self.types.is_rawptr(source_base) && self.types.is_pointer(target_base) {
            return true;
        }

        // Rules 6 and 7: arrays need matching counts, slices only
        // matching element types.
        match (self.types.kind(source_base), self.types.kind(target_base)) {
            (
                TypeKind::Array {
                    elem: ea,
                    count: ca,
                },
                TypeKind::Array {
                    elem: eb,
                    count: cb,
                },
            ) => self.are_types_identical(*ea, *eb) && ca == cb,
            (TypeKind::Slice { elem: ea }, TypeKind::Slice { elem: eb }) => {
                self.are_types_identical(*ea, *eb)
            }
            _ => false,
        }
    }

    /// The assignment coercer: lower untyped operands (against `target`
    /// or their default type), then judge assignability and report.
    pub fn check_assignment(
        &mut self,
        operand: &mut Operand<'a>,
        target: Option<TypeId>,
        context: &str,
    ) {
        self.check_not_tuple(operand);
        if operand.is_invalid() {
            return;
        }

        if self.types.is_untyped(operand.ty) {
            let target_type = match target {
                Some(ty) => ty,
                None => match self.types.default_type(operand.ty) {
                    Some(ty) => ty,
                    None => {
                        self.error(
                            operand.span(),
                            E_TYPE_MISMATCH,
                            format!("Use of untyped nil in {context}"),
                        );
                        operand.invalidate();
                        return;
                    }
                },
            };
            self.convert_to_typed(operand, target_type);
            if operand.is_invalid() {
                return;
            }
        }

        if let Some(target) = target {
            if !self.is_assignable_to(operand, target) {
                self.error(
                    operand.span(),
                    E_TYPE_MISMATCH,
                    format!(
                        "Cannot assign value `{}` of type `{}` to `{}` in {}",
                        operand.expr_string(),
                        self.type_string(operand.ty),
                        self.type_string(target),
                        context
                    ),
                );
                operand.mode = AddressingMode::Invalid;
            }
        }
    }

    /// The l-value validator: check one assignment target and coerce the
    /// incoming operand into it. Returns the assigned type on success.
    pub fn check_assign_variable(
        &mut self,
        operand: &mut Operand<'a>,
        lhs: &'a Expr,
    ) -> Option<TypeId> {
        if operand.is_invalid() || operand.ty == TypeId::INVALID {
            return None;
        }

        let node = lhs.unparen();

        // `_` is a write-only sink: record the definition, type-default
        // the value, and accept it.
        if let Expr::Ident(ident) = node {
            if ident.is_blank() {
                self.add_definition(ident.span, None);
                self.check_assignment(operand, None, "assignment to `_` identifier");
                if operand.is_invalid() {
                    return None;
                }
                return Some(operand.ty);
            }
        }

        // Evaluating the target would spuriously mark a variable used;
        // remember the flag and put it back.
        let mut saved_used = None;
        if let Expr::Ident(ident) = node {
            if let Some(entity) = self.scopes.lookup_parent(self.curr_scope, ident.name) {
                if let EntityKind::Variable { used } = self.entities[entity].kind {
                    saved_used = Some((entity, used));
                }
            }
        }

        let target = self.check_expression(lhs);
        if let Some((entity, used)) = saved_used {
            if let EntityKind::Variable { used: flag } = &mut self.entities[entity].kind {
                *flag = used;
            }
        }

        if target.is_invalid() || target.ty == TypeId::INVALID {
            return None;
        }

        if target.mode != AddressingMode::Variable {
            // When a selection is rejected, re-check its base so the user
            // sees the root cause.
            if let Expr::Selector { base, .. } = node {
                let _ = self.check_expression(base);
            }
            self.error(
                target.span(),
                E_NOT_LVALUE,
                format!("Cannot assign to `{}`", target.expr_string()),
            );
        }

        self.check_assignment(operand, Some(target.ty), "assignment");
        if operand.is_invalid() {
            return None;
        }
        Some(operand.ty)
    }

    /// The multi-value binder, assignment form: pair the right-hand
    /// expressions against the targets, spreading tuple results across
    /// consecutive targets.
    pub fn check_assign_variables(&mut self, lhs: &'a [Expr], rhs: &'a [Expr]) {
        let mut target_index = 0;
        for rhs_expr in rhs {
            if target_index >= lhs.len() {
                break;
            }
            let mut operand = self.check_multi_expression(rhs_expr);
            let tuple_vars = match self.types.kind(operand.ty) {
                TypeKind::Tuple { variables } => Some(variables.clone()),
                _ => None,
            };
            match tuple_vars {
                None => {
                    self.check_assign_variable(&mut operand, &lhs[target_index]);
                    target_index += 1;
                }
                Some(vars) => {
                    for var in vars {
                        if target_index >= lhs.len() {
                            break;
                        }
                        let mut component = operand.clone();
                        component.ty = self.entities[var].ty.unwrap_or(TypeId::INVALID);
                        self.check_assign_variable(&mut component, &lhs[target_index]);
                        target_index += 1;
                    }
                }
            }
        }
    }

    /// Initialize one entity from an operand, inferring the entity's type
    /// from the operand when no type was declared.
    pub fn check_init_variable(
        &mut self,
        entity: EntityId,
        operand: &mut Operand<'a>,
        context: &str,
    ) -> Option<TypeId> {
        if operand.is_invalid()
            || operand.ty == TypeId::INVALID
            || self.entities[entity].ty == Some(TypeId::INVALID)
        {
            if self.entities[entity].ty.is_none() {
                self.entities[entity].ty = Some(TypeId::INVALID);
            }
            return None;
        }

        if self.entities[entity].ty.is_none() {
            let mut inferred = operand.ty;
            if self.types.is_untyped(inferred) {
                match self.types.default_type(inferred) {
                    Some(ty) => inferred = ty,
                    None => {
                        self.error(
                            self.entities[entity].span,
                            E_TYPE_MISMATCH,
                            format!("Use of untyped nil in {context}"),
                        );
                        self.entities[entity].ty = Some(TypeId::INVALID);
                        return None;
                    }
                }
            }
            self.entities[entity].ty = Some(inferred);
        }

        let target = self.entities[entity].ty;
        self.check_assignment(operand, target, context);
        if operand.is_invalid() {
            return None;
        }
        target
    }

    /// The multi-value binder, declaration form: pair initializer
    /// expressions against entities, spreading tuples, then report
    /// cardinality mismatches.
    pub fn check_init_variables(
        &mut self,
        lhs: &[EntityId],
        inits: &[&'a Expr],
        context: &str,
    ) {
        if lhs.is_empty() && inits.is_empty() {
            return;
        }

        let mut slot = 0;
        let mut init_index = 0;
        while slot < lhs.len() && init_index < inits.len() {
            let mut operand = self.check_multi_expression(inits[init_index]);
            let tuple_vars = match self.types.kind(operand.ty) {
                TypeKind::Tuple { variables } => Some(variables.clone()),
                _ => None,
            };
            match tuple_vars {
                None => {
                    self.check_init_variable(lhs[slot], &mut operand, context);
                    slot += 1;
                }
                Some(vars) => {
                    for var in vars {
                        if slot >= lhs.len() {
                            break;
                        }
                        let mut component = operand.clone();
                        component.ty = self.entities[var].ty.unwrap_or(TypeId::INVALID);
                        self.check_init_variable(lhs[slot], &mut component, context);
                        slot += 1;
                    }
                }
            }
            init_index += 1;
        }

        if slot < lhs.len() {
            if self.entities[lhs[slot]].ty.is_none() {
                self.error(
                    self.entities[lhs[slot]].span,
                    E_ARITY_MISMATCH,
                    "Too few values on the right hand side of the declaration",
                );
                // Contain the cascade: the starved slots are poisoned, not
                // re-reported.
                for &entity in &lhs[slot..] {
                    if self.entities[entity].ty.is_none() {
                        self.entities[entity].ty = Some(TypeId::INVALID);
                    }
                }
            }
        } else if init_index < inits.len() {
            self.error(
                inits[init_index].span(),
                E_ARITY_MISMATCH,
                "Too many values on the right hand side of the declaration",
            );
        }
    }

    /// Install a constant entity's type and value from its initializer.
    pub fn check_init_constant(&mut self, entity: EntityId, operand: &mut Operand<'a>) {
        if operand.is_invalid()
            || operand.ty == TypeId::INVALID
            || self.entities[entity].ty == Some(TypeId::INVALID)
        {
            if self.entities[entity].ty.is_none() {
                self.entities[entity].ty = Some(TypeId::INVALID);
            }
            return;
        }

        if operand.mode != AddressingMode::Constant {
            self.error(
                operand.span(),
                E_BAD_CATEGORY,
                format!("`{}` is not a constant", operand.expr_string()),
            );
            if self.entities[entity].ty.is_none() {
                self.entities[entity].ty = Some(TypeId::INVALID);
            }
            return;
        }
        if !self.types.is_constant_type(operand.ty) {
            panic!(
                "Compiler error: type `{}` of constant `{}` is not constant-representable",
                self.type_string(operand.ty),
                self.entities[entity].name
            );
        }

        if self.entities[entity].ty.is_none() {
            self.entities[entity].ty = Some(operand.ty);
        }

        let target = self.entities[entity].ty;
        self.check_assignment(operand, target, "constant declaration");
        if operand.is_invalid() {
            return;
        }

        if let EntityKind::Constant { value } = &mut self.entities[entity].kind {
            *value = operand.value.clone();
        }
    }

    /// Constant entity initializer.
    pub fn check_constant_declaration(
        &mut self,
        entity: EntityId,
        type_expr: Option<&'a TypeExpr>,
        init_expr: Option<&'a Expr>,
    ) {
        if self.entities[entity].visited {
            self.error(
                self.entities[entity].span,
                E_DECLARATION,
                format!("Cyclic declaration of `{}`", self.entities[entity].name),
            );
            self.entities[entity].ty = Some(TypeId::INVALID);
            return;
        }
        self.entities[entity].visited = true;

        if let Some(type_expr) = type_expr {
            let ty = self.check_type(type_expr, None);
            if !self.types.is_constant_type(ty) {
                self.error(
                    type_expr.span(),
                    E_DECLARATION,
                    format!("Invalid constant type `{}`", self.type_string(ty)),
                );
                self.entities[entity].ty = Some(TypeId::INVALID);
                return;
            }
            self.entities[entity].ty = Some(ty);
        }

        let mut operand = Operand::invalid();
        if let Some(init_expr) = init_expr {
            operand = self.check_expression(init_expr);
        }
        self.check_init_constant(entity, &mut operand);
    }

    /// Variable entity initializer, used by the lazy declaration path.
    pub fn check_variable_declaration(
        &mut self,
        entity: EntityId,
        group: &[EntityId],
        type_expr: Option<&'a TypeExpr>,
        inits: &[&'a Expr],
    ) {
        if self.entities[entity].visited {
            self.error(
                self.entities[entity].span,
                E_DECLARATION,
                format!("Cyclic declaration of `{}`", self.entities[entity].name),
            );
            self.entities[entity].ty = Some(TypeId::INVALID);
            return;
        }
        self.entities[entity].visited = true;

        if let Some(type_expr) = type_expr {
            let ty = self.check_type(type_expr, None);
            self.entities[entity].ty = Some(ty);
        }

        if inits.is_empty() {
            if type_expr.is_none() {
                self.entities[entity].ty = Some(TypeId::INVALID);
            }
            return;
        }

        if group.len() <= 1 {
            // Exactly one target: the single-value route. A tuple-typed
            // initializer is rejected by check_expression here.
            let mut operand = self.check_expression(inits[0]);
            self.check_init_variable(entity, &mut operand, "variable declaration");
            if inits.len() > 1 {
                self.error(
                    inits[1].span(),
                    E_ARITY_MISMATCH,
                    "Too many values on the right hand side of the declaration",
                );
            }
            return;
        }

        if type_expr.is_some() {
            let shared = self.entities[entity].ty;
            for &member in group {
                self.entities[member].ty = shared;
            }
        }

        self.check_init_variables(group, inits, "variable declaration");
    }

    /// Type entity initializer. The named shell is installed before the
    /// right-hand side resolves so indirection can close cycles; after
    /// resolution the base is collapsed to a concrete constructor.
    pub fn check_type_declaration(
        &mut self,
        entity: EntityId,
        type_expr: &'a TypeExpr,
        named_type: Option<TypeId>,
    ) {
        let named = self.types.named(self.entities[entity].name, entity);
        if let Some(outer) = named_type {
            self.types.set_named_base(outer, named);
        }
        self.entities[entity].ty = Some(named);

        let resolved = self.check_type(type_expr, Some(named));
        if resolved == named {
            self.error(
                self.entities[entity].span,
                E_DECLARATION,
                format!(
                    "Invalid recursive type declaration of `{}`",
                    self.entities[entity].name
                ),
            );
            self.types.set_named_base(named, TypeId::INVALID);
            return;
        }

        // Collapse transient named layers so the base is concrete.
        let base = self.types.base_type(resolved);
        self.types.set_named_base(named, base);
    }

    /// Check a procedure body in its parameter scope, enforcing the
    /// mandatory trailing return when the procedure has results.
    pub fn check_procedure_body(&mut self, decl: DeclId, ty: TypeId, body: &'a Block) {
        let origin_scope = self.curr_scope;
        self.curr_scope = self.decls[decl].scope;
        self.push_procedure(ty);

        self.check_statement_list(&body.stmts);
        if self.types.proc_result_count(ty) > 0 && !is_terminating_list(&body.stmts) {
            self.error(
                body.close,
                E_CONTROL_FLOW,
                "Missing return statement at the end of the procedure",
            );
        }

        self.pop_procedure();
        self.curr_scope = origin_scope;
    }

    /// Procedure entity initializer: install the type shell for mutual
    /// recursion, resolve the signature in a parameter scope rooted at
    /// the file scope, validate tags, and check or enqueue the body.
    pub fn check_procedure_declaration(
        &mut self,
        entity: EntityId,
        decl: DeclId,
        check_body_later: bool,
    ) {
        let proc_ty = self.types.procedure(self.entities[entity].scope);
        self.entities[entity].ty = Some(proc_ty);

        let Some(proc_decl) = self.decls[decl].proc_decl else {
            panic!(
                "Compiler error: procedure `{}` has no declaration node",
                self.entities[entity].name
            );
        };

        let origin_scope = self.curr_scope;
        self.curr_scope = self.file_scope;
        self.open_scope();

        self.check_procedure_type(proc_ty, &proc_decl.signature);

        let mut is_foreign = false;
        let mut is_inline = false;
        let mut is_no_inline = false;
        for tag in &proc_decl.tags {
            if tag.name == kilnc_util::symbol::TAG_FOREIGN {
                is_foreign = true;
            } else if tag.name == kilnc_util::symbol::TAG_INLINE {
                is_inline = true;
            } else if tag.name == kilnc_util::symbol::TAG_NO_INLINE {
                is_no_inline = true;
            } else {
                self.error(tag.span, E_DECLARATION, "Unknown procedure tag");
            }
        }
        if is_inline && is_no_inline {
            self.error(
                proc_decl.tags[0].span,
                E_DECLARATION,
                "You cannot apply both `inline` and `no_inline` to a procedure",
            );
        }

        if let Some(body) = &proc_decl.body {
            if is_foreign {
                self.error(
                    body.span,
                    E_DECLARATION,
                    "A procedure tagged as `#foreign` cannot have a body",
                );
            }

            self.decls[decl].scope = self.curr_scope;
            if check_body_later {
                self.check_procedure_later(entity, decl, proc_ty, body);
            } else {
                self.check_procedure_body(decl, proc_ty, body);
            }
        }

        self.close_scope();
        self.curr_scope = origin_scope;
    }

    pub fn check_statement_list(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            self.check_statement(stmt);
        }
    }

    /// The statement dispatcher.
    pub fn check_statement(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Empty(_) | Stmt::Bad(_) => {}

            Stmt::Expr(expr) => {
                let (operand, kind) = self.check_expression_base(expr);
                match operand.mode {
                    AddressingMode::Type => {
                        self.error(
                            stmt.span(),
                            E_BAD_CATEGORY,
                            format!("`{}` is not an expression", operand.expr_string()),
                        );
                    }
                    AddressingMode::Invalid => {}
                    _ => {
                        if kind != crate::expr::ExprKind::Statement {
                            self.error(stmt.span(), E_BAD_CATEGORY, "Expression is not used");
                        }
                    }
                }
            }

            Stmt::Tag {
                stmt: inner, span, ..
            } => {
                self.error(*span, E_DECLARATION, "Tag statements are not supported yet");
                self.check_statement(inner);
            }

            Stmt::IncDec { expr, op, span } => {
                let operand = self.check_expression(expr);
                if operand.is_invalid() {
                    return;
                }
                if !self.types.is_numeric(operand.ty) {
                    self.error(*span, E_BAD_CATEGORY, "Non numeric type");
                    return;
                }
                let one = Operand {
                    mode: AddressingMode::Constant,
                    ty: self.types.basic(BasicKind::UntypedInteger),
                    expr: None,
                    value: ConstValue::Integer(1),
                };
                // TODO: fold the result back into an assignment so `x++`
                // actually updates `x`.
                let _ = self.check_binary_op(op.binary_op(), operand, one, *span);
            }

            Stmt::Assign { op, lhs, rhs, span } => match op {
                AssignOp::Assign => {
                    if lhs.is_empty() {
                        self.error(
                            *span,
                            E_ARITY_MISMATCH,
                            "Missing lhs in assignment statement",
                        );
                        return;
                    }
                    self.check_assign_variables(lhs, rhs);
                }
                compound => {
                    if lhs.len() != 1 || rhs.len() != 1 {
                        self.error(
                            *span,
                            E_ARITY_MISMATCH,
                            format!(
                                "assignment operation `{}` requires single-valued expressions",
                                compound.symbol()
                            ),
                        );
                        return;
                    }
                    let Some(bin_op) = compound.binary_op() else {
                        return;
                    };
                    let lhs_operand = self.check_expression(&lhs[0]);
                    let rhs_operand = self.check_expression(&rhs[0]);
                    let mut operand = self.check_binary_op(bin_op, lhs_operand, rhs_operand, *span);
                    if operand.is_invalid() {
                        return;
                    }
                    self.check_assign_variable(&mut operand, &lhs[0]);
                }
            },

            Stmt::Block(block) => {
                self.open_scope();
                self.check_statement_list(&block.stmts);
                self.close_scope();
            }

            Stmt::If {
                cond,
                then_body,
                else_stmt,
                ..
            } => {
                let operand = self.check_expression(cond);
                if !operand.is_invalid() && !self.types.is_boolean(operand.ty) {
                    self.error(
                        cond.span(),
                        E_BAD_CATEGORY,
                        "Non-boolean condition in `if` statement",
                    );
                }
                self.check_statement(then_body);

                if let Some(else_stmt) = else_stmt {
                    match &**else_stmt {
                        Stmt::If { .. } | Stmt::Block(_) => self.check_statement(else_stmt),
                        other => self.error(
                            other.span(),
                            E_BAD_CATEGORY,
                            "Invalid `else` statement in `if` statement",
                        ),
                    }
                }
            }

            Stmt::Return { results, span } => {
                let Some(&proc_ty) = self.proc_stack.last() else {
                    panic!("Compiler error: return statement outside of a procedure body");
                };

                if self.in_defer {
                    self.error(
                        *span,
                        E_CONTROL_FLOW,
                        "You cannot `return` within a defer statement",
                    );
                    return;
                }

                let result_count = self.types.proc_result_count(proc_ty);
                if result_count != results.len() {
                    self.error(
                        *span,
                        E_ARITY_MISMATCH,
                        format!(
                            "Expected {} return {}, got {}",
                            result_count,
                            if result_count == 1 { "value" } else { "values" },
                            results.len()
                        ),
                    );
                } else if result_count > 0 {
                    let result_vars = match self.types.kind(proc_ty) {
                        TypeKind::Proc {
                            results: Some(results),
                            ..
                        } => self.tuple_variables(Some(*results)),
                        _ => Vec::new(),
                    };
                    let inits: Vec<&'a Expr> = results.iter().collect();
                    self.check_init_variables(&result_vars, &inits, "return statement");
                }
            }

            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                self.open_scope();
                if let Some(init) = init {
                    self.check_statement(init);
                }
                if let Some(cond) = cond {
                    let operand = self.check_expression(cond);
                    if !operand.is_invalid() && !self.types.is_boolean(operand.ty) {
                        self.error(
                            cond.span(),
                            E_BAD_CATEGORY,
                            "Non-boolean condition in `for` statement",
                        );
                    }
                }
                if let Some(post) = post {
                    self.check_statement(post);
                }
                self.check_statement(body);
                self.close_scope();
            }

            Stmt::Defer { stmt: inner, span } => {
                if inner.is_declaration() {
                    self.error(*span, E_CONTROL_FLOW, "You cannot defer a declaration");
                } else {
                    let outer_in_defer = self.in_defer;
                    self.in_defer = true;
                    self.check_statement(inner);
                    self.in_defer = outer_in_defer;
                }
            }

            Stmt::Var(decl) => self.check_var_decl_stmt(decl),

            Stmt::Proc(decl) => {
                let entity = self.entities.push(Entity::procedure(
                    self.curr_scope,
                    decl.name.name,
                    decl.name.span,
                ));
                self.add_entity(self.curr_scope, entity);
                let info = DeclInfo {
                    scope: self.curr_scope,
                    entities: vec![entity],
                    type_expr: None,
                    init_exprs: Vec::new(),
                    proc_decl: Some(decl),
                };
                let decl_id = self.decls.push(info);
                self.decl_of.insert(entity, decl_id);
                self.check_procedure_declaration(entity, decl_id, false);
            }

            Stmt::Type(decl) => {
                let entity = self.entities.push(Entity::type_name(
                    self.curr_scope,
                    decl.name.name,
                    decl.name.span,
                ));
                self.add_entity(self.curr_scope, entity);
                self.check_type_declaration(entity, &decl.type_expr, None);
            }
        }
    }

    /// A variable declaration statement, both mutable and immutable
    /// forms.
    fn check_var_decl_stmt(&mut self, decl: &'a VarDecl) {
        match decl.kind {
            DeclKind::Mutable => self.check_mutable_decl_stmt(decl),
            DeclKind::Immutable => self.check_immutable_decl_stmt(decl),
        }
    }

    fn check_mutable_decl_stmt(&mut self, decl: &'a VarDecl) {
        let mut group = Vec::with_capacity(decl.names.len());
        let mut new_entities = Vec::new();

        for name in &decl.names {
            let entity = match name {
                Expr::Ident(ident) => {
                    let existing = if ident.is_blank() {
                        None
                    } else {
                        self.scopes.lookup(self.curr_scope, ident.name)
                    };
                    match existing {
                        Some(found) => Some(found),
                        None => {
                            let entity = self.entities.push(Entity::variable(
                                self.curr_scope,
                                ident.name,
                                ident.span,
                                None,
                            ));
                            if !ident.is_blank() {
                                new_entities.push(entity);
                            }
                            self.add_definition(ident.span, Some(entity));
                            Some(entity)
                        }
                    }
                }
                other => {
                    self.error(
                        other.span(),
                        E_DECLARATION,
                        "A variable declaration must be an identifier",
                    );
                    None
                }
            };
            let entity = entity.unwrap_or_else(|| {
                self.entities
                    .push(Entity::dummy_variable(self.file_scope, name.span()))
            });
            group.push(entity);
        }

        let declared_type = decl.type_expr.as_ref().map(|te| self.check_type(te, None));

        for &entity in &group {
            if self.entities[entity].visited {
                self.entities[entity].ty = Some(TypeId::INVALID);
                continue;
            }
            self.entities[entity].visited = true;
            if self.entities[entity].ty.is_none() {
                self.entities[entity].ty = declared_type;
            }
        }

        let inits: Vec<&'a Expr> = decl.values.iter().collect();
        self.check_init_variables(&group, &inits, "variable declaration");

        // Register fresh names only now, so an initializer cannot see the
        // name it is initializing.
        for entity in new_entities {
            self.add_entity(self.curr_scope, entity);
        }
    }

    fn check_immutable_decl_stmt(&mut self, decl: &'a VarDecl) {
        let mut created = Vec::new();
        for (name, value) in decl.names.iter().zip(decl.values.iter()) {
            let Expr::Ident(ident) = name else {
                self.error(
                    name.span(),
                    E_DECLARATION,
                    "A variable declaration must be an identifier",
                );
                continue;
            };
            let entity = self.entities.push(Entity::constant(
                self.curr_scope,
                ident.name,
                ident.span,
                ConstValue::Invalid,
            ));
            created.push(entity);
            self.check_constant_declaration(entity, decl.type_expr.as_ref(), Some(value));
        }

        self.check_constant_decl_arity(decl);

        for entity in created {
            self.add_entity(self.curr_scope, entity);
        }
    }
}
