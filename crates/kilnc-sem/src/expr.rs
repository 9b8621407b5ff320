//! The expression checker.
//!
//! Produces an [`Operand`] for every expression: literals are untyped
//! constants, identifiers resolve through the scope chain (forcing the
//! named entity's declaration if it has not been checked yet), and
//! composite expressions combine their children's operands. Binary
//! checking is factored through [`Checker::check_binary_op`] so the
//! statement dispatcher can synthesize `x + 1` for `x++` and compound
//! assignment without fabricating AST nodes.

use crate::checker::Checker;
use crate::entity::{Entity, EntityKind};
use crate::operand::{AddressingMode, Operand};
use crate::types::{BasicKind, TypeId, TypeKind};
use crate::value::ConstValue;
use kilnc_ast::{BinOp, Expr, Ident, Literal, LitKind, ProcSignature, TypeExpr, UnaryOp};
use kilnc_util::diagnostic::{
    E_ARITY_MISMATCH, E_BAD_CATEGORY, E_TYPE_MISMATCH, E_UNDECLARED_NAME,
};
use kilnc_util::symbol::SYM_UNDERSCORE;
use kilnc_util::Span;

/// Whether an expression is allowed to stand alone as a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprKind {
    Expression,
    Statement,
}

impl<'a> Checker<'a> {
    /// Check an expression that must produce exactly one value.
    pub fn check_expression(&mut self, expr: &'a Expr) -> Operand<'a> {
        let mut operand = self.check_multi_expression(expr);
        self.check_not_tuple(&mut operand);
        operand
    }

    /// Check an expression whose result may be a tuple (a multi-result
    /// call on the right-hand side of a destructuring form).
    pub fn check_multi_expression(&mut self, expr: &'a Expr) -> Operand<'a> {
        let (mut operand, _) = self.check_expression_base(expr);
        match operand.mode {
            AddressingMode::NoValue => {
                self.error(
                    operand.span(),
                    E_BAD_CATEGORY,
                    format!("`{}` used as value", operand.expr_string()),
                );
                operand.invalidate();
            }
            AddressingMode::Type => {
                self.error(
                    operand.span(),
                    E_BAD_CATEGORY,
                    format!("`{}` is not an expression", operand.expr_string()),
                );
                operand.invalidate();
            }
            _ => {}
        }
        operand
    }

    /// The raw expression walk, also classifying whether the expression
    /// may be used as a statement (calls are the statement-expressions).
    pub fn check_expression_base(&mut self, expr: &'a Expr) -> (Operand<'a>, ExprKind) {
        let mut kind = ExprKind::Expression;
        let mut operand = match expr {
            Expr::Bad(_) => Operand::invalid(),
            Expr::Literal(lit) => self.check_literal(lit),
            Expr::Ident(ident) => self.check_identifier(ident),
            Expr::Paren { expr: inner, .. } => {
                let (operand, inner_kind) = self.check_expression_base(inner);
                kind = inner_kind;
                operand
            }
            Expr::Unary {
                op,
                expr: inner,
                span,
            } => self.check_unary(*op, inner, *span),
            Expr::Deref { expr: inner, span } => self.check_deref(inner, *span),
            Expr::Binary { .. } => self.check_binary_expression(expr),
            Expr::Call { callee, args, span } => {
                kind = ExprKind::Statement;
                self.check_call(callee, args, *span)
            }
            Expr::Selector { base, field, span } => self.check_selector(base, field, *span),
            Expr::Index { base, index, span } => self.check_index(base, index, *span),
        };
        if operand.expr.is_none() {
            operand.expr = Some(expr);
        }
        (operand, kind)
    }

    /// Demote tuple-typed operands in single-value contexts.
    pub(crate) fn check_not_tuple(&mut self, operand: &mut Operand<'a>) {
        if self.types.is_tuple(operand.ty) {
            self.error(
                operand.span(),
                E_ARITY_MISMATCH,
                "Multi-valued expression in single-value context",
            );
            operand.invalidate();
        }
    }

    fn check_literal(&mut self, lit: &Literal) -> Operand<'a> {
        let (kind, value) = match &lit.kind {
            LitKind::Int(v) => (BasicKind::UntypedInteger, ConstValue::Integer(*v)),
            LitKind::Float(v) => (BasicKind::UntypedFloat, ConstValue::Float(*v)),
            LitKind::Str(s) => (BasicKind::UntypedString, ConstValue::Str(*s)),
            LitKind::Rune(c) => (BasicKind::UntypedRune, ConstValue::Integer(*c as i128)),
            LitKind::Bool(b) => (BasicKind::UntypedBool, ConstValue::Bool(*b)),
            LitKind::Nil => (BasicKind::UntypedNil, ConstValue::Nil),
        };
        Operand {
            mode: AddressingMode::Constant,
            ty: self.types.basic(kind),
            expr: None,
            value,
        }
    }

    fn check_identifier(&mut self, ident: &Ident) -> Operand<'a> {
        if ident.is_blank() {
            self.error(ident.span, E_BAD_CATEGORY, "Cannot use `_` as a value");
            return Operand::invalid();
        }
        let Some(entity) = self.scopes.lookup_parent(self.curr_scope, ident.name) else {
            self.error(
                ident.span,
                E_UNDECLARED_NAME,
                format!("Undeclared name: `{}`", ident.name),
            );
            return Operand::invalid();
        };

        // An entity without a type has not had its declaration checked
        // yet (a forward reference, or a cycle in progress).
        if self.entities[entity].ty.is_none() {
            self.check_entity_declaration(entity, None);
        }
        let Some(ty) = self.entities[entity].ty else {
            return Operand::invalid();
        };

        match &mut self.entities[entity].kind {
            EntityKind::Variable { used } => {
                *used = true;
                Operand {
                    mode: AddressingMode::Variable,
                    ty,
                    expr: None,
                    value: ConstValue::Invalid,
                }
            }
            EntityKind::Constant { value } => {
                let value = value.clone();
                if ty == TypeId::INVALID {
                    return Operand::invalid();
                }
                Operand {
                    mode: AddressingMode::Constant,
                    ty,
                    expr: None,
                    value,
                }
            }
            EntityKind::TypeName => Operand {
                mode: AddressingMode::Type,
                ty,
                expr: None,
                value: ConstValue::Invalid,
            },
            EntityKind::Procedure => Operand {
                mode: AddressingMode::Value,
                ty,
                expr: None,
                value: ConstValue::Invalid,
            },
            EntityKind::Dummy => Operand::invalid(),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, inner: &'a Expr, span: Span) -> Operand<'a> {
        let operand = self.check_expression(inner);
        if operand.is_invalid() {
            return Operand::invalid();
        }

        match op {
            UnaryOp::AddressOf => {
                if operand.mode != AddressingMode::Variable {
                    self.error(
                        span,
                        E_BAD_CATEGORY,
                        format!("Cannot take the address of `{}`", operand.expr_string()),
                    );
                    return Operand::invalid();
                }
                Operand {
                    mode: AddressingMode::Value,
                    ty: self.types.pointer_to(operand.ty),
                    expr: None,
                    value: ConstValue::Invalid,
                }
            }
            UnaryOp::Plus | UnaryOp::Minus => {
                if !self.types.is_numeric(operand.ty) {
                    self.error(
                        span,
                        E_BAD_CATEGORY,
                        format!(
                            "Invalid operation `{}` on `{}`",
                            op.symbol(),
                            self.type_string(operand.ty)
                        ),
                    );
                    return Operand::invalid();
                }
                self.fold_unary(op, operand, span)
            }
            UnaryOp::Not => {
                if !self.types.is_boolean(operand.ty) {
                    self.error(
                        span,
                        E_BAD_CATEGORY,
                        format!(
                            "Invalid operation `!` on `{}`",
                            self.type_string(operand.ty)
                        ),
                    );
                    return Operand::invalid();
                }
                self.fold_unary(op, operand, span)
            }
        }
    }

    fn fold_unary(&mut self, op: UnaryOp, operand: Operand<'a>, span: Span) -> Operand<'a> {
        if operand.mode != AddressingMode::Constant {
            return Operand {
                mode: AddressingMode::Value,
                ty: operand.ty,
                expr: operand.expr,
                value: ConstValue::Invalid,
            };
        }
        match ConstValue::unary_op(op, &operand.value) {
            Ok(value) => Operand {
                mode: AddressingMode::Constant,
                ty: operand.ty,
                expr: operand.expr,
                value,
            },
            Err(err) => {
                self.error(span, E_TYPE_MISMATCH, err.to_string());
                Operand::invalid()
            }
        }
    }

    fn check_deref(&mut self, inner: &'a Expr, span: Span) -> Operand<'a> {
        let operand = self.check_expression(inner);
        if operand.is_invalid() {
            return Operand::invalid();
        }
        let base = self.types.base_type(operand.ty);
        match self.types.kind(base) {
            TypeKind::Pointer { elem } => Operand {
                mode: AddressingMode::Variable,
                ty: *elem,
                expr: None,
                value: ConstValue::Invalid,
            },
            _ => {
                self.error(
                    span,
                    E_BAD_CATEGORY,
                    format!(
                        "Cannot dereference `{}` of type `{}`",
                        operand.expr_string(),
                        self.type_string(operand.ty)
                    ),
                );
                Operand::invalid()
            }
        }
    }

    fn check_call(&mut self, callee: &'a Expr, args: &'a [Expr], span: Span) -> Operand<'a> {
        let callee_operand = self.check_expression(callee);

        let signature = if callee_operand.is_invalid() {
            None
        } else {
            let base = self.types.base_type(callee_operand.ty);
            match self.types.kind(base) {
                TypeKind::Proc {
                    params, results, ..
                } => Some((*params, *results)),
                _ => {
                    self.error(
                        span,
                        E_BAD_CATEGORY,
                        format!(
                            "Cannot call `{}` of type `{}`",
                            callee_operand.expr_string(),
                            self.type_string(callee_operand.ty)
                        ),
                    );
                    None
                }
            }
        };

        let Some((params, results)) = signature else {
            // Still walk the arguments so their own problems surface.
            for arg in args {
                let _ = self.check_multi_expression(arg);
            }
            return Operand::invalid();
        };

        let param_vars = self.tuple_variables(params);
        if args.len() != param_vars.len() {
            let expected = param_vars.len();
            self.error(
                span,
                E_ARITY_MISMATCH,
                format!(
                    "Expected {} argument{}, got {}",
                    expected,
                    if expected == 1 { "" } else { "s" },
                    args.len()
                ),
            );
            for arg in args {
                let _ = self.check_multi_expression(arg);
            }
        } else {
            for (arg, &param) in args.iter().zip(&param_vars) {
                let mut operand = self.check_expression(arg);
                let target = self.entities[param].ty.unwrap_or(TypeId::INVALID);
                self.check_assignment(&mut operand, Some(target), "argument");
            }
        }

        let result_vars = self.tuple_variables(results);
        match (results, result_vars.len()) {
            (_, 0) => Operand {
                mode: AddressingMode::NoValue,
                ty: TypeId::INVALID,
                expr: None,
                value: ConstValue::Invalid,
            },
            (_, 1) => Operand {
                mode: AddressingMode::Value,
                ty: self.entities[result_vars[0]].ty.unwrap_or(TypeId::INVALID),
                expr: None,
                value: ConstValue::Invalid,
            },
            (Some(results), _) => Operand {
                mode: AddressingMode::Value,
                ty: results,
                expr: None,
                value: ConstValue::Invalid,
            },
            (None, _) => Operand::invalid(),
        }
    }

    /// The entity list of a tuple type id, or empty.
    pub(crate) fn tuple_variables(
        &self,
        tuple: Option<TypeId>,
    ) -> Vec<crate::entity::EntityId> {
        match tuple {
            Some(id) => match self.types.kind(id) {
                TypeKind::Tuple { variables } => variables.clone(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    fn check_selector(&mut self, base: &'a Expr, field: &Ident, span: Span) -> Operand<'a> {
        let operand = self.check_expression(base);
        if operand.is_invalid() {
            return Operand::invalid();
        }
        self.error(
            span,
            E_BAD_CATEGORY,
            format!(
                "Type `{}` has no field `{}`",
                self.type_string(operand.ty),
                field.name
            ),
        );
        Operand::invalid()
    }

    fn check_index(&mut self, base: &'a Expr, index: &'a Expr, span: Span) -> Operand<'a> {
        let base_operand = self.check_expression(base);
        let index_operand = self.check_expression(index);

        let mut constant_index = None;
        if !index_operand.is_invalid() {
            if !self.types.is_integer(index_operand.ty) {
                self.error(
                    index.span(),
                    E_BAD_CATEGORY,
                    format!("Index `{}` must be an integer", index_operand.expr_string()),
                );
            } else if index_operand.mode == AddressingMode::Constant {
                if let ConstValue::Integer(v) = index_operand.value {
                    constant_index = Some(v);
                }
            }
        }

        if base_operand.is_invalid() {
            return Operand::invalid();
        }

        let base_ty = self.types.base_type(base_operand.ty);
        match self.types.kind(base_ty) {
            TypeKind::Array { elem, count } => {
                if let Some(v) = constant_index {
                    if v < 0 || v >= *count as i128 {
                        self.error(
                            index.span(),
                            E_BAD_CATEGORY,
                            format!(
                                "Index `{v}` is out of bounds for `{}`",
                                self.type_string(base_operand.ty)
                            ),
                        );
                    }
                }
                Operand {
                    mode: if base_operand.mode == AddressingMode::Variable {
                        AddressingMode::Variable
                    } else {
                        AddressingMode::Value
                    },
                    ty: *elem,
                    expr: None,
                    value: ConstValue::Invalid,
                }
            }
            TypeKind::Slice { elem } => {
                if let Some(v) = constant_index {
                    if v < 0 {
                        self.error(
                            index.span(),
                            E_BAD_CATEGORY,
                            format!("Index `{v}` is out of bounds"),
                        );
                    }
                }
                Operand {
                    mode: AddressingMode::Variable,
                    ty: *elem,
                    expr: None,
                    value: ConstValue::Invalid,
                }
            }
            TypeKind::Basic(BasicKind::Str | BasicKind::UntypedString) => {
                if let Some(v) = constant_index {
                    if v < 0 {
                        self.error(
                            index.span(),
                            E_BAD_CATEGORY,
                            format!("Index `{v}` is out of bounds"),
                        );
                    }
                }
                Operand {
                    mode: AddressingMode::Value,
                    ty: self.types.basic(BasicKind::U8),
                    expr: None,
                    value: ConstValue::Invalid,
                }
            }
            _ => {
                self.error(
                    span,
                    E_BAD_CATEGORY,
                    format!(
                        "Cannot index `{}` of type `{}`",
                        base_operand.expr_string(),
                        self.type_string(base_operand.ty)
                    ),
                );
                Operand::invalid()
            }
        }
    }

    /// Check a binary expression node.
    pub fn check_binary_expression(&mut self, expr: &'a Expr) -> Operand<'a> {
        let Expr::Binary { op, lhs, rhs, span } = expr else {
            return self.check_expression(expr);
        };
        let lhs_operand = self.check_expression(lhs);
        let rhs_operand = self.check_expression(rhs);
        self.check_binary_op(*op, lhs_operand, rhs_operand, *span)
    }

    /// The operand-level binary check shared by real binary expressions,
    /// `x++`/`x--`, and compound assignment.
    pub(crate) fn check_binary_op(
        &mut self,
        op: BinOp,
        mut lhs: Operand<'a>,
        mut rhs: Operand<'a>,
        span: Span,
    ) -> Operand<'a> {
        if lhs.is_invalid() || rhs.is_invalid() {
            return Operand::invalid();
        }

        if op.is_logical() {
            return self.check_logical_op(op, lhs, rhs, span);
        }

        self.promote_untyped_pair(&mut lhs, &mut rhs);
        if self.types.is_untyped(lhs.ty) && !self.types.is_untyped(rhs.ty) {
            self.convert_to_typed(&mut lhs, rhs.ty);
        } else if self.types.is_untyped(rhs.ty) && !self.types.is_untyped(lhs.ty) {
            self.convert_to_typed(&mut rhs, lhs.ty);
        }
        if lhs.is_invalid() || rhs.is_invalid() {
            return Operand::invalid();
        }

        if op.is_comparison() {
            return self.check_comparison_op(op, lhs, rhs, span);
        }

        if !self.are_types_identical(lhs.ty, rhs.ty) {
            self.error(
                span,
                E_TYPE_MISMATCH,
                format!(
                    "Mismatched types `{}` and `{}` in binary expression",
                    self.type_string(lhs.ty),
                    self.type_string(rhs.ty)
                ),
            );
            return Operand::invalid();
        }
        if !self.types.is_numeric(lhs.ty) {
            self.error(
                span,
                E_BAD_CATEGORY,
                format!(
                    "Operator `{}` is not defined on `{}`",
                    op.symbol(),
                    self.type_string(lhs.ty)
                ),
            );
            return Operand::invalid();
        }

        if lhs.mode == AddressingMode::Constant && rhs.mode == AddressingMode::Constant {
            return match ConstValue::binary_op(op, &lhs.value, &rhs.value) {
                Ok(value) => Operand {
                    mode: AddressingMode::Constant,
                    ty: lhs.ty,
                    expr: lhs.expr,
                    value,
                },
                Err(err) => {
                    self.error(span, E_TYPE_MISMATCH, err.to_string());
                    Operand::invalid()
                }
            };
        }

        Operand {
            mode: AddressingMode::Value,
            ty: lhs.ty,
            expr: lhs.expr,
            value: ConstValue::Invalid,
        }
    }

    fn check_logical_op(
        &mut self,
        op: BinOp,
        lhs: Operand<'a>,
        rhs: Operand<'a>,
        span: Span,
    ) -> Operand<'a> {
        if !self.types.is_boolean(lhs.ty) || !self.types.is_boolean(rhs.ty) {
            self.error(
                span,
                E_BAD_CATEGORY,
                format!("Operator `{}` requires boolean operands", op.symbol()),
            );
            return Operand::invalid();
        }
        let both_untyped = self.types.is_untyped(lhs.ty) && self.types.is_untyped(rhs.ty);
        let ty = if both_untyped {
            self.types.basic(BasicKind::UntypedBool)
        } else {
            self.types.basic(BasicKind::Bool)
        };
        if lhs.mode == AddressingMode::Constant && rhs.mode == AddressingMode::Constant {
            return match ConstValue::binary_op(op, &lhs.value, &rhs.value) {
                Ok(value) => Operand {
                    mode: AddressingMode::Constant,
                    ty,
                    expr: lhs.expr,
                    value,
                },
                Err(err) => {
                    self.error(span, E_TYPE_MISMATCH, err.to_string());
                    Operand::invalid()
                }
            };
        }
        Operand {
            mode: AddressingMode::Value,
            ty,
            expr: lhs.expr,
            value: ConstValue::Invalid,
        }
    }

    fn check_comparison_op(
        &mut self,
        op: BinOp,
        lhs: Operand<'a>,
        rhs: Operand<'a>,
        span: Span,
    ) -> Operand<'a> {
        if !self.is_assignable_to(&lhs, rhs.ty) && !self.is_assignable_to(&rhs, lhs.ty) {
            self.error(
                span,
                E_TYPE_MISMATCH,
                format!(
                    "Cannot compare `{}` and `{}`",
                    self.type_string(lhs.ty),
                    self.type_string(rhs.ty)
                ),
            );
            return Operand::invalid();
        }
        let untyped_bool = self.types.basic(BasicKind::UntypedBool);
        if lhs.mode == AddressingMode::Constant && rhs.mode == AddressingMode::Constant {
            return match ConstValue::binary_op(op, &lhs.value, &rhs.value) {
                Ok(value) => Operand {
                    mode: AddressingMode::Constant,
                    ty: untyped_bool,
                    expr: lhs.expr,
                    value,
                },
                Err(err) => {
                    self.error(span, E_TYPE_MISMATCH, err.to_string());
                    Operand::invalid()
                }
            };
        }
        Operand {
            mode: AddressingMode::Value,
            ty: untyped_bool,
            expr: lhs.expr,
            value: ConstValue::Invalid,
        }
    }

    /// Raise two untyped numeric operands to their common kind
    /// (integer < rune < float) so `1 + 2.5` folds as floats.
    fn promote_untyped_pair(&mut self, lhs: &mut Operand<'a>, rhs: &mut Operand<'a>) {
        fn rank(kind: BasicKind) -> Option<u8> {
            match kind {
                BasicKind::UntypedInteger => Some(0),
                BasicKind::UntypedRune => Some(1),
                BasicKind::UntypedFloat => Some(2),
                _ => None,
            }
        }
        let (Some(a), Some(b)) = (
            self.types.as_basic(lhs.ty),
            self.types.as_basic(rhs.ty),
        ) else {
            return;
        };
        let (Some(rank_a), Some(rank_b)) = (rank(a), rank(b)) else {
            return;
        };
        if rank_a == rank_b {
            return;
        }
        let target = if rank_a > rank_b { a } else { b };
        let ty = self.types.basic(target);
        for operand in [lhs, rhs] {
            operand.value = operand.value.coerced_to(target);
            operand.ty = ty;
        }
    }

    /// Give an untyped operand the target type if its value permits.
    ///
    /// Deliberately silent on failure: the operand is left untyped and the
    /// assignability judge produces the user-facing diagnostic with full
    /// context.
    pub fn convert_to_typed(&mut self, operand: &mut Operand<'a>, target: TypeId) {
        if operand.is_invalid() || target == TypeId::INVALID {
            return;
        }
        if !self.types.is_untyped(operand.ty) {
            return;
        }
        let source = self.types.as_basic(operand.ty);
        let target_base = self.types.base_type(target);
        let adopted = match self.types.kind(target_base) {
            TypeKind::Basic(kind) => {
                let kind = *kind;
                if operand.mode == AddressingMode::Constant {
                    if operand.value.is_expressible_as(kind) {
                        operand.value = operand.value.coerced_to(kind);
                        true
                    } else {
                        false
                    }
                } else {
                    source == Some(BasicKind::UntypedBool) && kind.is_boolean()
                }
            }
            TypeKind::Pointer { .. } => source == Some(BasicKind::UntypedNil),
            _ => false,
        };
        if adopted {
            operand.ty = target;
        }
    }

    /// Whether a constant value fits a type without explicit conversion.
    pub fn check_value_is_expressible(&self, value: &ConstValue, ty: TypeId) -> bool {
        match self.types.kind(self.types.base_type(ty)) {
            TypeKind::Basic(kind) => value.is_expressible_as(*kind),
            TypeKind::Pointer { .. } => matches!(value, ConstValue::Nil),
            _ => false,
        }
    }

    /// Resolve a type expression to a type id.
    ///
    /// `named` carries the in-flight named type while the right-hand side
    /// of a type declaration resolves, allowing self-reference through
    /// indirection.
    pub fn check_type(&mut self, type_expr: &'a TypeExpr, named: Option<TypeId>) -> TypeId {
        match type_expr {
            TypeExpr::Name(ident) => {
                if let Some(kind) = BasicKind::from_name(ident.name.as_str()) {
                    return self.types.basic(kind);
                }
                let Some(entity) = self.scopes.lookup_parent(self.curr_scope, ident.name) else {
                    self.error(
                        ident.span,
                        E_UNDECLARED_NAME,
                        format!("Undeclared name: `{}`", ident.name),
                    );
                    return TypeId::INVALID;
                };
                if self.entities[entity].ty.is_none() {
                    self.check_entity_declaration(entity, named);
                }
                match self.entities[entity].kind {
                    EntityKind::TypeName => self.entities[entity].ty.unwrap_or(TypeId::INVALID),
                    _ => {
                        self.error(
                            ident.span,
                            E_BAD_CATEGORY,
                            format!("`{}` is not a type", ident.name),
                        );
                        TypeId::INVALID
                    }
                }
            }
            TypeExpr::Pointer { elem, .. } => {
                let elem = self.check_type(elem, None);
                self.types.pointer_to(elem)
            }
            TypeExpr::Array { count, elem, .. } => {
                let count_operand = self.check_expression(count);
                let elem_ty = self.check_type(elem, None);
                if count_operand.is_invalid() {
                    return TypeId::INVALID;
                }
                let length = match (&count_operand.mode, &count_operand.value) {
                    (AddressingMode::Constant, ConstValue::Integer(v))
                        if *v >= 0 && *v <= i64::MAX as i128 =>
                    {
                        *v as i64
                    }
                    _ => {
                        self.error(
                            count.span(),
                            E_BAD_CATEGORY,
                            "Array count must be a non-negative constant integer",
                        );
                        return TypeId::INVALID;
                    }
                };
                self.types.array_of(elem_ty, length)
            }
            TypeExpr::Slice { elem, .. } => {
                let elem = self.check_type(elem, None);
                self.types.slice_of(elem)
            }
            TypeExpr::Proc { signature, .. } => {
                // A procedure type gets its own parameter scope rooted at
                // the file scope; procedures do not capture outer locals.
                let origin = self.curr_scope;
                self.curr_scope = self.file_scope;
                self.open_scope();
                let proc_ty = self.types.procedure(self.curr_scope);
                self.check_procedure_type(proc_ty, signature);
                self.close_scope();
                self.curr_scope = origin;
                proc_ty
            }
        }
    }

    /// Resolve the parameter and result lists of a procedure type into
    /// the shell allocated for it. Parameter entities are declared into
    /// the currently open scope; result slots are anonymous variables.
    pub fn check_procedure_type(&mut self, proc_ty: TypeId, signature: &'a ProcSignature) {
        let mut param_vars = Vec::new();
        for field in &signature.params {
            let ty = self.check_type(&field.ty, None);
            for name in &field.names {
                let entity = self.entities.push(Entity::variable(
                    self.curr_scope,
                    name.name,
                    name.span,
                    Some(ty),
                ));
                self.add_entity(self.curr_scope, entity);
                self.add_definition(name.span, Some(entity));
                param_vars.push(entity);
            }
        }

        let mut result_vars = Vec::new();
        for result in &signature.results {
            let ty = self.check_type(result, None);
            let entity = self.entities.push(Entity::variable(
                self.curr_scope,
                SYM_UNDERSCORE,
                result.span(),
                Some(ty),
            ));
            result_vars.push(entity);
        }

        let params = if param_vars.is_empty() {
            None
        } else {
            Some(self.types.tuple(param_vars))
        };
        let results = if result_vars.is_empty() {
            None
        } else {
            Some(self.types.tuple(result_vars))
        };
        self.types.set_proc_signature(proc_ty, params, results);
    }
}
