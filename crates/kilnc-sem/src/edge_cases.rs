//! Whole-program scenario tests for the checker.
//!
//! Each test builds a small AST directly, runs the checker, and asserts
//! on the exact diagnostic sequence, mirroring how the checker is driven
//! by the real front-end.

#[cfg(test)]
mod tests {
    use crate::Checker;
    use kilnc_ast::{
        AssignOp, BinOp, Block, DeclKind, Expr, Field, File, Ident, LitKind, Literal,
        ProcDecl, ProcSignature, Stmt, TypeDecl, TypeExpr, UnaryOp, VarDecl,
    };
    use kilnc_util::{Handler, Span, Symbol};

    fn sp() -> Span {
        Span::DUMMY
    }

    fn ident(name: &str) -> Ident {
        Ident::new(Symbol::intern(name), sp())
    }

    fn id(name: &str) -> Expr {
        Expr::Ident(ident(name))
    }

    fn lit(kind: LitKind) -> Expr {
        Expr::Literal(Literal { kind, span: sp() })
    }

    fn int(value: i128) -> Expr {
        lit(LitKind::Int(value))
    }

    fn boolean(value: bool) -> Expr {
        lit(LitKind::Bool(value))
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span: sp(),
        }
    }

    fn neg(expr: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Minus,
            expr: Box::new(expr),
            span: sp(),
        }
    }

    fn addr(expr: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::AddressOf,
            expr: Box::new(expr),
            span: sp(),
        }
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(id(name)),
            args,
            span: sp(),
        }
    }

    fn block(stmts: Vec<Stmt>) -> Block {
        Block {
            stmts,
            span: sp(),
            close: sp(),
        }
    }

    fn tname(name: &str) -> TypeExpr {
        TypeExpr::Name(ident(name))
    }

    fn pointer(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Pointer {
            elem: Box::new(elem),
            span: sp(),
        }
    }

    /// `names := values` (or `names: ty = values` with a type).
    fn decl_mut(names: &[&str], type_expr: Option<TypeExpr>, values: Vec<Expr>) -> Stmt {
        Stmt::Var(VarDecl {
            kind: DeclKind::Mutable,
            names: names.iter().map(|n| id(n)).collect(),
            type_expr,
            values,
            span: sp(),
        })
    }

    /// `names :: values`.
    fn decl_const(names: &[&str], type_expr: Option<TypeExpr>, values: Vec<Expr>) -> Stmt {
        Stmt::Var(VarDecl {
            kind: DeclKind::Immutable,
            names: names.iter().map(|n| id(n)).collect(),
            type_expr,
            values,
            span: sp(),
        })
    }

    fn assign(lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        Stmt::Assign {
            op: AssignOp::Assign,
            lhs,
            rhs,
            span: sp(),
        }
    }

    fn compound(op: AssignOp, lhs: Expr, rhs: Expr) -> Stmt {
        Stmt::Assign {
            op,
            lhs: vec![lhs],
            rhs: vec![rhs],
            span: sp(),
        }
    }

    fn signature(params: Vec<(Vec<&str>, TypeExpr)>, results: Vec<TypeExpr>) -> ProcSignature {
        ProcSignature {
            params: params
                .into_iter()
                .map(|(names, ty)| Field {
                    names: names.into_iter().map(ident).collect(),
                    ty,
                })
                .collect(),
            results,
            span: sp(),
        }
    }

    fn proc_decl(
        name: &str,
        sig: ProcSignature,
        tags: &[&str],
        body: Option<Block>,
    ) -> Stmt {
        Stmt::Proc(ProcDecl {
            name: ident(name),
            signature: sig,
            tags: tags.iter().map(|t| ident(t)).collect(),
            body,
            span: sp(),
        })
    }

    fn type_decl(name: &str, type_expr: TypeExpr) -> Stmt {
        Stmt::Type(TypeDecl {
            name: ident(name),
            type_expr,
            span: sp(),
        })
    }

    fn ret(results: Vec<Expr>) -> Stmt {
        Stmt::Return {
            results,
            span: sp(),
        }
    }

    fn if_stmt(cond: Expr, then_body: Block, else_stmt: Option<Stmt>) -> Stmt {
        Stmt::If {
            cond: Box::new(cond),
            then_body: Box::new(Stmt::Block(then_body)),
            else_stmt: else_stmt.map(Box::new),
            span: sp(),
        }
    }

    fn check_statements(stmts: &[Stmt]) -> Vec<String> {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_statement_list(stmts);
        handler.messages()
    }

    fn check_file(file: &File) -> Vec<String> {
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_file(file);
        handler.messages()
    }

    // ==================== ASSIGNMENT SCENARIOS ====================

    #[test]
    fn test_assigning_bool_to_int_variable() {
        let stmts = vec![
            decl_mut(&["x"], None, vec![int(1)]),
            assign(vec![id("x")], vec![boolean(true)]),
        ];
        assert_eq!(
            check_statements(&stmts),
            vec!["Cannot assign value `true` of type `untyped bool` to `int` in assignment"]
        );
    }

    #[test]
    fn test_assigning_to_constant() {
        let stmts = vec![
            decl_const(&["x"], None, vec![int(1)]),
            assign(vec![id("x")], vec![int(2)]),
        ];
        assert_eq!(check_statements(&stmts), vec!["Cannot assign to `x`"]);
    }

    #[test]
    fn test_blank_slot_declaration_then_compound_assign() {
        let stmts = vec![
            decl_mut(&["_", "y"], None, vec![int(1), int(2)]),
            compound(AssignOp::AddAssign, id("y"), int(1)),
        ];
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_statement_list(&stmts);
        assert!(handler.messages().is_empty());
        // `y` is in scope; the blank slot is recorded as a definition but
        // never enters the scope.
        assert!(checker
            .scopes
            .lookup(checker.file_scope, Symbol::intern("y"))
            .is_some());
        assert!(checker
            .scopes
            .lookup(checker.file_scope, Symbol::intern("_"))
            .is_none());
        assert_eq!(checker.definitions().len(), 2);
    }

    #[test]
    fn test_bad_expression_does_not_cascade() {
        let stmts = vec![decl_mut(
            &["x"],
            None,
            vec![bin(BinOp::Add, int(1), Expr::Bad(sp()))],
        )];
        // The recovered node produces no diagnostics of its own and no
        // follow-on "cannot assign" noise.
        assert!(check_statements(&stmts).is_empty());
    }

    #[test]
    fn test_undeclared_name_reports_once() {
        let stmts = vec![Stmt::Expr(Box::new(call("nope", vec![])))];
        assert_eq!(check_statements(&stmts), vec!["Undeclared name: `nope`"]);
    }

    #[test]
    fn test_missing_lhs_in_assignment() {
        let stmts = vec![assign(vec![], vec![int(1)])];
        assert_eq!(
            check_statements(&stmts),
            vec!["Missing lhs in assignment statement"]
        );
    }

    #[test]
    fn test_compound_assignment_requires_single_values() {
        let stmts = vec![
            decl_mut(&["x"], None, vec![int(1)]),
            Stmt::Assign {
                op: AssignOp::AddAssign,
                lhs: vec![id("x"), id("x")],
                rhs: vec![int(1), int(2)],
                span: sp(),
            },
        ];
        assert_eq!(
            check_statements(&stmts),
            vec!["assignment operation `+=` requires single-valued expressions"]
        );
    }

    // ==================== RETURN PLACEMENT ====================

    #[test]
    fn test_missing_return_in_one_armed_if() {
        let body = block(vec![if_stmt(
            boolean(true),
            block(vec![ret(vec![int(1)])]),
            None,
        )]);
        let file = File {
            stmts: vec![proc_decl(
                "f",
                signature(vec![], vec![tname("int")]),
                &[],
                Some(body),
            )],
        };
        assert_eq!(
            check_file(&file),
            vec!["Missing return statement at the end of the procedure"]
        );
    }

    #[test]
    fn test_two_armed_if_satisfies_return() {
        let body = block(vec![if_stmt(
            boolean(true),
            block(vec![ret(vec![int(1)])]),
            Some(Stmt::Block(block(vec![ret(vec![int(2)])]))),
        )]);
        let file = File {
            stmts: vec![proc_decl(
                "f",
                signature(vec![], vec![tname("int")]),
                &[],
                Some(body),
            )],
        };
        assert!(check_file(&file).is_empty());
    }

    #[test]
    fn test_infinite_loop_satisfies_return() {
        let body = block(vec![Stmt::For {
            init: None,
            cond: None,
            post: None,
            body: Box::new(Stmt::Block(block(vec![]))),
            span: sp(),
        }]);
        let file = File {
            stmts: vec![proc_decl(
                "f",
                signature(vec![], vec![tname("int")]),
                &[],
                Some(body),
            )],
        };
        assert!(check_file(&file).is_empty());
    }

    #[test]
    fn test_return_arity_mismatch() {
        let body = block(vec![ret(vec![])]);
        let file = File {
            stmts: vec![proc_decl(
                "f",
                signature(vec![], vec![tname("int")]),
                &[],
                Some(body),
            )],
        };
        assert_eq!(check_file(&file), vec!["Expected 1 return value, got 0"]);
    }

    #[test]
    fn test_return_inside_defer() {
        let body = block(vec![
            Stmt::Defer {
                stmt: Box::new(Stmt::Block(block(vec![ret(vec![int(1)])]))),
                span: sp(),
            },
            ret(vec![int(2)]),
        ]);
        let file = File {
            stmts: vec![proc_decl(
                "f",
                signature(vec![], vec![tname("int")]),
                &[],
                Some(body),
            )],
        };
        assert_eq!(
            check_file(&file),
            vec!["You cannot `return` within a defer statement"]
        );
    }

    #[test]
    fn test_defer_of_declaration_is_rejected() {
        let stmts = vec![Stmt::Defer {
            stmt: Box::new(decl_mut(&["x"], None, vec![int(1)])),
            span: sp(),
        }];
        assert_eq!(
            check_statements(&stmts),
            vec!["You cannot defer a declaration"]
        );
    }

    // ==================== TUPLES ====================

    fn two_result_proc(name: &str) -> Stmt {
        proc_decl(
            name,
            signature(vec![], vec![tname("int"), tname("int")]),
            &[],
            Some(block(vec![ret(vec![int(1), int(2)])])),
        )
    }

    #[test]
    fn test_tuple_destructures_into_two_names() {
        let file = File {
            stmts: vec![
                two_result_proc("f"),
                decl_mut(&["a", "b"], None, vec![call("f", vec![])]),
            ],
        };
        assert!(check_file(&file).is_empty());
    }

    #[test]
    fn test_tuple_in_single_value_declaration() {
        let file = File {
            stmts: vec![
                two_result_proc("f"),
                decl_mut(&["a", "b"], None, vec![call("f", vec![])]),
                decl_mut(&["c"], None, vec![call("f", vec![])]),
            ],
        };
        assert_eq!(
            check_file(&file),
            vec!["Multi-valued expression in single-value context"]
        );
    }

    #[test]
    fn test_tuple_spreads_in_assignment() {
        let file = File {
            stmts: vec![
                two_result_proc("f"),
                decl_mut(&["a", "b"], None, vec![int(0), int(0)]),
            ],
        };
        assert!(check_file(&file).is_empty());

        // Statement form: a, b = f().
        let extra = assign(vec![id("a"), id("b")], vec![call("f", vec![])]);
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_file(&file);
        checker.check_statement(&extra);
        assert!(handler.messages().is_empty());
    }

    #[test]
    fn test_too_few_values() {
        let stmts = vec![decl_mut(&["a", "b"], None, vec![int(1)])];
        assert_eq!(
            check_statements(&stmts),
            vec!["Too few values on the right hand side of the declaration"]
        );
    }

    #[test]
    fn test_too_many_values() {
        let stmts = vec![decl_mut(&["a"], None, vec![int(1), int(2)])];
        assert_eq!(
            check_statements(&stmts),
            vec!["Too many values on the right hand side of the declaration"]
        );
    }

    // ==================== NAMED TYPES ====================

    #[test]
    fn test_named_siblings_stay_nominal() {
        let file = File {
            stmts: vec![
                type_decl("Celsius", tname("int")),
                type_decl("Fahrenheit", tname("int")),
                decl_mut(&["c"], Some(tname("Celsius")), vec![int(20)]),
                decl_mut(&["f"], Some(tname("Fahrenheit")), vec![int(68)]),
                decl_mut(&["plain"], None, vec![int(0)]),
            ],
        };
        assert!(check_file(&file).is_empty());

        let cross = assign(vec![id("c")], vec![id("f")]);
        let into_named = assign(vec![id("c")], vec![id("plain")]);
        let into_plain = assign(vec![id("plain")], vec![id("c")]);
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_file(&file);

        // Named to named: rejected.
        checker.check_statement(&cross);
        assert_eq!(
            handler.messages(),
            vec!["Cannot assign value `f` of type `Fahrenheit` to `Celsius` in assignment"]
        );
        handler.clear();

        // Named and unnamed exchange in both directions.
        checker.check_statement(&into_named);
        checker.check_statement(&into_plain);
        assert!(handler.messages().is_empty());
    }

    #[test]
    fn test_self_referential_type_through_pointer() {
        let file = File {
            stmts: vec![type_decl("Node", pointer(tname("Node")))],
        };
        assert!(check_file(&file).is_empty());
    }

    #[test]
    fn test_directly_recursive_type_alias() {
        let file = File {
            stmts: vec![type_decl("T", tname("T"))],
        };
        assert_eq!(
            check_file(&file),
            vec!["Invalid recursive type declaration of `T`"]
        );
    }

    // ==================== POINTERS AND NIL ====================

    #[test]
    fn test_rawptr_exchanges_with_typed_pointers() {
        let stmts = vec![
            decl_mut(&["x"], None, vec![int(1)]),
            decl_mut(&["p"], None, vec![addr(id("x"))]),
            decl_mut(&["r"], Some(tname("rawptr")), vec![id("p")]),
            decl_mut(&["q"], Some(pointer(tname("int"))), vec![id("r")]),
        ];
        assert!(check_statements(&stmts).is_empty());
    }

    #[test]
    fn test_unrelated_pointers_do_not_exchange() {
        let stmts = vec![
            decl_mut(&["x"], None, vec![int(1)]),
            decl_mut(&["y"], None, vec![lit(LitKind::Float(1.5))]),
            decl_mut(&["p"], None, vec![addr(id("x"))]),
            assign(vec![id("p")], vec![addr(id("y"))]),
        ];
        assert_eq!(
            check_statements(&stmts),
            vec!["Cannot assign value `&y` of type `*f64` to `*int` in assignment"]
        );
    }

    #[test]
    fn test_nil_flows_into_pointers_only() {
        let ok = vec![
            decl_mut(&["p"], Some(pointer(tname("int"))), vec![lit(LitKind::Nil)]),
            decl_mut(&["r"], Some(tname("rawptr")), vec![lit(LitKind::Nil)]),
        ];
        assert!(check_statements(&ok).is_empty());

        let bad = vec![decl_mut(&["x"], None, vec![lit(LitKind::Nil)])];
        assert_eq!(
            check_statements(&bad),
            vec!["Use of untyped nil in variable declaration"]
        );
    }

    // ==================== CONSTANTS ====================

    #[test]
    fn test_constant_representability_bounds() {
        let fits = vec![decl_mut(&["x"], Some(tname("u8")), vec![int(255)])];
        assert!(check_statements(&fits).is_empty());

        let overflows = vec![decl_mut(&["x"], Some(tname("u8")), vec![int(256)])];
        assert_eq!(
            check_statements(&overflows),
            vec!["Cannot assign value `256` of type `untyped int` to `u8` in variable declaration"]
        );

        let negative = vec![decl_mut(&["x"], Some(tname("u8")), vec![neg(int(1))])];
        assert_eq!(
            check_statements(&negative),
            vec!["Cannot assign value `-1` of type `untyped int` to `u8` in variable declaration"]
        );
    }

    #[test]
    fn test_constant_folding_feeds_declarations() {
        let stmts = vec![
            decl_const(&["size"], None, vec![bin(BinOp::Mul, int(4), int(16))]),
            decl_mut(&["x"], Some(tname("u8")), vec![id("size")]),
        ];
        assert!(check_statements(&stmts).is_empty());
    }

    #[test]
    fn test_constant_division_by_zero() {
        let stmts = vec![decl_const(
            &["bad"],
            None,
            vec![bin(BinOp::Div, int(1), int(0))],
        )];
        assert_eq!(
            check_statements(&stmts),
            vec!["Division by zero in constant expression"]
        );
    }

    #[test]
    fn test_non_constant_initializer_for_constant() {
        let stmts = vec![
            decl_mut(&["x"], None, vec![int(1)]),
            decl_const(&["c"], None, vec![id("x")]),
        ];
        assert_eq!(check_statements(&stmts), vec!["`x` is not a constant"]);
    }

    #[test]
    fn test_constant_declaration_arity() {
        let extra = vec![decl_const(&["x"], None, vec![int(1), int(2)])];
        assert_eq!(check_statements(&extra), vec!["Extra initial expression"]);

        let missing_value = vec![decl_const(&["x", "y"], None, vec![int(1)])];
        assert_eq!(
            check_statements(&missing_value),
            vec!["Missing initial expression"]
        );

        let nothing = vec![decl_const(&["x"], None, vec![])];
        assert_eq!(
            check_statements(&nothing),
            vec!["Missing type or initial expression"]
        );
    }

    #[test]
    fn test_constant_cycle_is_contained() {
        let file = File {
            stmts: vec![decl_const(&["x"], None, vec![id("x")])],
        };
        assert_eq!(check_file(&file), vec!["Cyclic declaration of `x`"]);
    }

    // ==================== STATEMENT CATEGORIES ====================

    #[test]
    fn test_unused_expression_statement() {
        let stmts = vec![Stmt::Expr(Box::new(bin(BinOp::Add, int(1), int(2))))];
        assert_eq!(check_statements(&stmts), vec!["Expression is not used"]);
    }

    #[test]
    fn test_call_statement_is_allowed() {
        let file = File {
            stmts: vec![proc_decl(
                "side_effect",
                signature(vec![], vec![]),
                &[],
                Some(block(vec![])),
            )],
        };
        let stmt = Stmt::Expr(Box::new(call("side_effect", vec![])));
        let handler = Handler::new();
        let mut checker = Checker::new(&handler);
        checker.check_file(&file);
        checker.check_statement(&stmt);
        assert!(handler.messages().is_empty());
    }

    #[test]
    fn test_type_used_as_expression() {
        let stmts = vec![
            type_decl("T", tname("int")),
            Stmt::Expr(Box::new(id("T"))),
        ];
        assert_eq!(
            check_statements(&stmts),
            vec!["`T` is not an expression"]
        );
    }

    #[test]
    fn test_non_boolean_conditions() {
        let stmts = vec![if_stmt(int(1), block(vec![]), None)];
        assert_eq!(
            check_statements(&stmts),
            vec!["Non-boolean condition in `if` statement"]
        );

        let loops = vec![Stmt::For {
            init: None,
            cond: Some(Box::new(int(1))),
            post: None,
            body: Box::new(Stmt::Block(block(vec![]))),
            span: sp(),
        }];
        assert_eq!(
            check_statements(&loops),
            vec!["Non-boolean condition in `for` statement"]
        );
    }

    #[test]
    fn test_invalid_else_statement() {
        let stmts = vec![if_stmt(
            boolean(true),
            block(vec![]),
            Some(Stmt::Empty(sp())),
        )];
        assert_eq!(
            check_statements(&stmts),
            vec!["Invalid `else` statement in `if` statement"]
        );
    }

    #[test]
    fn test_inc_dec_requires_numeric_target() {
        let stmts = vec![
            decl_mut(&["ok"], None, vec![int(1)]),
            Stmt::IncDec {
                expr: Box::new(id("ok")),
                op: kilnc_ast::IncDecOp::Increment,
                span: sp(),
            },
            decl_mut(&["flag"], None, vec![boolean(true)]),
            Stmt::IncDec {
                expr: Box::new(id("flag")),
                op: kilnc_ast::IncDecOp::Increment,
                span: sp(),
            },
        ];
        assert_eq!(check_statements(&stmts), vec!["Non numeric type"]);
    }

    #[test]
    fn test_tag_statement_is_unsupported() {
        let stmts = vec![Stmt::Tag {
            name: ident("bounds_check"),
            stmt: Box::new(Stmt::Empty(sp())),
            span: sp(),
        }];
        assert_eq!(
            check_statements(&stmts),
            vec!["Tag statements are not supported yet"]
        );
    }

    #[test]
    fn test_for_scope_is_closed() {
        let stmts = vec![
            Stmt::For {
                init: Some(Box::new(decl_mut(&["i"], None, vec![int(0)]))),
                cond: Some(Box::new(bin(BinOp::Lt, id("i"), int(3)))),
                post: Some(Box::new(compound(AssignOp::AddAssign, id("i"), int(1)))),
                body: Box::new(Stmt::Block(block(vec![]))),
                span: sp(),
            },
            Stmt::Expr(Box::new(id("i"))),
        ];
        assert_eq!(check_statements(&stmts), vec!["Undeclared name: `i`"]);
    }

    // ==================== PROCEDURE TAGS ====================

    #[test]
    fn test_foreign_procedure_with_body() {
        let file = File {
            stmts: vec![proc_decl(
                "external",
                signature(vec![], vec![]),
                &["foreign"],
                Some(block(vec![])),
            )],
        };
        assert_eq!(
            check_file(&file),
            vec!["A procedure tagged as `#foreign` cannot have a body"]
        );
    }

    #[test]
    fn test_foreign_procedure_without_body() {
        let file = File {
            stmts: vec![proc_decl(
                "external",
                signature(vec![(vec!["len"], tname("int"))], vec![tname("int")]),
                &["foreign"],
                None,
            )],
        };
        assert!(check_file(&file).is_empty());
    }

    #[test]
    fn test_conflicting_inline_tags() {
        let file = File {
            stmts: vec![proc_decl(
                "hot",
                signature(vec![], vec![]),
                &["inline", "no_inline"],
                Some(block(vec![])),
            )],
        };
        assert_eq!(
            check_file(&file),
            vec!["You cannot apply both `inline` and `no_inline` to a procedure"]
        );
    }

    #[test]
    fn test_unknown_procedure_tag() {
        let file = File {
            stmts: vec![proc_decl(
                "tagged",
                signature(vec![], vec![]),
                &["fast"],
                Some(block(vec![])),
            )],
        };
        assert_eq!(check_file(&file), vec!["Unknown procedure tag"]);
    }

    // ==================== CALLS ====================

    #[test]
    fn test_argument_coercion_failure() {
        let file = File {
            stmts: vec![
                proc_decl(
                    "add",
                    signature(
                        vec![(vec!["a", "b"], tname("int"))],
                        vec![tname("int")],
                    ),
                    &[],
                    Some(block(vec![ret(vec![bin(BinOp::Add, id("a"), id("b"))])])),
                ),
                decl_mut(&["s"], None, vec![call("add", vec![int(1), boolean(true)])]),
            ],
        };
        assert_eq!(
            check_file(&file),
            vec!["Cannot assign value `true` of type `untyped bool` to `int` in argument"]
        );
    }

    #[test]
    fn test_call_arity() {
        let file = File {
            stmts: vec![
                proc_decl(
                    "pair",
                    signature(vec![(vec!["a", "b"], tname("int"))], vec![]),
                    &[],
                    Some(block(vec![])),
                ),
                Stmt::Expr(Box::new(call("pair", vec![int(1)]))),
            ],
        };
        assert_eq!(check_file(&file), vec!["Expected 2 arguments, got 1"]);
    }

    #[test]
    fn test_forward_reference_between_procedures() {
        // `first` calls `second`, declared later in the file.
        let file = File {
            stmts: vec![
                proc_decl(
                    "first",
                    signature(vec![], vec![tname("int")]),
                    &[],
                    Some(block(vec![ret(vec![call("second", vec![])])])),
                ),
                proc_decl(
                    "second",
                    signature(vec![], vec![tname("int")]),
                    &[],
                    Some(block(vec![ret(vec![int(42)])])),
                ),
            ],
        };
        assert!(check_file(&file).is_empty());
    }

    // ==================== FILE SCOPE ====================

    #[test]
    fn test_only_declarations_at_file_scope() {
        let file = File {
            stmts: vec![assign(vec![id("x")], vec![int(1)])],
        };
        assert_eq!(
            check_file(&file),
            vec!["Only declarations are permitted at file scope"]
        );
    }

    #[test]
    fn test_rechecking_is_deterministic() {
        let file = File {
            stmts: vec![
                two_result_proc("f"),
                decl_mut(&["a", "b"], None, vec![call("f", vec![])]),
                decl_mut(&["c"], None, vec![call("f", vec![])]),
                decl_const(&["k"], None, vec![int(9)]),
            ],
        };
        let first = check_file(&file);
        let second = check_file(&file);
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec!["Multi-valued expression in single-value context"]
        );
    }
}
