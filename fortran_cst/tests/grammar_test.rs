//! Tests for the single-statement grammar.

use fortran_cst::grammar::{self, *};
use fortran_cst::scan::{self, FreeForm};

fn stmt(src: &str) -> Stmt {
    let mut stmts = scan::split_statements(src, &FreeForm);
    assert_eq!(stmts.len(), 1, "expected one statement in {src:?}");
    grammar::parse_statement(stmts.remove(0))
}

fn kind(src: &str) -> StmtKind {
    stmt(src).kind
}

fn expr(src: &str) -> Expression {
    match kind(&format!("x = {src}")) {
        StmtKind::Assignment { value, .. } => value,
        other => panic!("{src:?} did not parse as an assignment value: {other:?}"),
    }
}

fn ident(e: &Expression) -> &str {
    match &e.kind {
        ExprKind::Identifier(n) => n,
        other => panic!("not an identifier: {other:?}"),
    }
}

fn number(e: &Expression) -> &str {
    match &e.kind {
        ExprKind::Number(n) => n,
        other => panic!("not a number: {other:?}"),
    }
}

fn binary(e: &Expression) -> (BinaryOp, &Expression, &Expression) {
    match &e.kind {
        ExprKind::Binary {
            operator,
            left,
            right,
        } => (*operator, left, right),
        other => panic!("not a binary expression: {other:?}"),
    }
}

#[test]
fn test_number_literals() {
    assert_eq!(number(&expr("42")), "42");
    assert_eq!(number(&expr("3.14")), "3.14");
    assert_eq!(number(&expr("1.")), "1.");
    assert_eq!(number(&expr(".5")), ".5");
    assert_eq!(number(&expr("1.5E-3")), "1.5E-3");
    assert_eq!(number(&expr("1D0")), "1D0");
    assert_eq!(number(&expr("1.0_wp")), "1.0_wp");
    assert_eq!(number(&expr("42_8")), "42_8");
}

#[test]
fn test_boz_literals() {
    assert!(matches!(expr("B'1010'").kind, ExprKind::Boz(ref t) if t == "B'1010'"));
    assert!(matches!(expr("o'777'").kind, ExprKind::Boz(ref t) if t == "o'777'"));
    assert!(matches!(expr("Z\"1F\"").kind, ExprKind::Boz(ref t) if t == "Z\"1F\""));
    assert!(matches!(expr("'1F'z").kind, ExprKind::Boz(ref t) if t == "'1F'z"));
}

#[test]
fn test_string_literals() {
    let e = expr("'it''s'");
    assert!(matches!(e.kind, ExprKind::Str(ref t) if t == "'it''s'"));
    assert_eq!(e.string_value().as_deref(), Some("it's"));
    let e = expr("\"say \"\"hi\"\"\"");
    assert_eq!(e.string_value().as_deref(), Some("say \"hi\""));
}

#[test]
fn test_logical_and_complex_literals() {
    assert!(matches!(expr(".TRUE.").kind, ExprKind::Logical(true)));
    assert!(matches!(expr(".false.").kind, ExprKind::Logical(false)));
    match expr("(1.0, 2.0)").kind {
        ExprKind::Complex { real, imag } => {
            assert_eq!(number(&real), "1.0");
            assert_eq!(number(&imag), "2.0");
        }
        other => panic!("not complex: {other:?}"),
    }
}

#[test]
fn test_array_literals() {
    match expr("(/ 1, 2, 3 /)").kind {
        ExprKind::Array(es) => assert_eq!(es.len(), 3),
        other => panic!("not an array: {other:?}"),
    }
    match expr("[1, 2]").kind {
        ExprKind::Array(es) => assert_eq!(es.len(), 2),
        other => panic!("not an array: {other:?}"),
    }
}

#[test]
fn test_precedence_arithmetic() {
    // a + b * c groups the product first.
    let e = expr("a + b * c");
    let (op, l, r) = binary(&e);
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(ident(l), "a");
    assert_eq!(binary(r).0, BinaryOp::Mul);

    // Exponentiation is right-associative.
    let e = expr("a ** b ** c");
    let (op, l, r) = binary(&e);
    assert_eq!(op, BinaryOp::Pow);
    assert_eq!(ident(l), "a");
    assert_eq!(binary(r).0, BinaryOp::Pow);

    // Concatenation sits at additive level, left-associative.
    let e = expr("a // b // c");
    let (op, l, _) = binary(&e);
    assert_eq!(op, BinaryOp::Concat);
    assert_eq!(binary(l).0, BinaryOp::Concat);

    // Parentheses override precedence and survive as a node.
    let e = expr("(a + b) * c");
    let (op, l, _) = binary(&e);
    assert_eq!(op, BinaryOp::Mul);
    assert!(matches!(l.kind, ExprKind::Paren(_)));
}

#[test]
fn test_precedence_logical() {
    // relational > .NOT. > .AND. > .OR. > .EQV.
    let e = expr("a .OR. b .AND. c");
    let (op, _, r) = binary(&e);
    assert_eq!(op, BinaryOp::Or);
    assert_eq!(binary(r).0, BinaryOp::And);

    let e = expr(".NOT. a .AND. b");
    let (op, l, _) = binary(&e);
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(
        l.kind,
        ExprKind::Unary {
            operator: UnaryOp::Not,
            ..
        }
    ));

    let e = expr("x < 1 .EQV. y > 2");
    let (op, l, r) = binary(&e);
    assert_eq!(op, BinaryOp::Eqv);
    assert_eq!(binary(l).0, BinaryOp::Lt);
    assert_eq!(binary(r).0, BinaryOp::Gt);
}

#[test]
fn test_spelled_relational_operators() {
    for (src, op) in [
        ("1 .LT. 2", BinaryOp::Lt),
        ("1 .LE. 2", BinaryOp::Le),
        ("1 .GT. 2", BinaryOp::Gt),
        ("1 .GE. 2", BinaryOp::Ge),
        ("1 .EQ. 2", BinaryOp::Eq),
        ("1 .NE. 2", BinaryOp::Ne),
        ("1 <= 2", BinaryOp::Le),
        ("1 /= 2", BinaryOp::Ne),
        ("1 == 2", BinaryOp::Eq),
    ] {
        assert_eq!(binary(&expr(src)).0, op, "{src}");
    }
}

#[test]
fn test_numbers_against_dot_operators() {
    // `1.EQ.2` must not lex `1.` as a real literal.
    let e = expr("1.EQ.2");
    let (op, l, r) = binary(&e);
    assert_eq!(op, BinaryOp::Eq);
    assert_eq!(number(l), "1");
    assert_eq!(number(r), "2");
    // But an exponent after the dot is still part of the number.
    let e = expr("1.E5.LT.X");
    let (op, l, _) = binary(&e);
    assert_eq!(op, BinaryOp::Lt);
    assert_eq!(number(l), "1.E5");
}

#[test]
fn test_member_access() {
    let e = expr("a%b%c");
    match &e.kind {
        ExprKind::Member { left, right } => {
            assert_eq!(ident(left), "a");
            assert!(matches!(right.kind, ExprKind::Member { .. }));
        }
        other => panic!("not a member access: {other:?}"),
    }
    assert!(matches!(expr("f(1)%x").kind, ExprKind::Member { .. }));
}

#[test]
fn test_call_arguments() {
    let e = expr("f(1, b = 2, 3:n:2, *)");
    let args = match e.kind {
        ExprKind::CallOrIndex { callee, args } => {
            assert_eq!(ident(&callee), "f");
            args
        }
        other => panic!("not a call: {other:?}"),
    };
    assert_eq!(args.len(), 4);
    assert!(matches!(args[0], Argument::Positional(_)));
    match &args[1] {
        Argument::Keyword { name, value, .. } => {
            assert_eq!(name, "b");
            assert!(matches!(value, KeywordValue::Expr(_)));
        }
        other => panic!("not a keyword argument: {other:?}"),
    }
    match &args[2] {
        Argument::Extent(ex) => {
            assert_eq!(number(ex.start.as_ref().unwrap()), "3");
            assert_eq!(ident(ex.stop.as_ref().unwrap()), "n");
            assert_eq!(number(ex.stride.as_ref().unwrap()), "2");
        }
        other => panic!("not an extent: {other:?}"),
    }
    assert!(matches!(args[3], Argument::AssumedSize(_)));

    // Empty extents keep their optional parts empty.
    let e = expr("a(:, ::2)");
    match e.kind {
        ExprKind::CallOrIndex { args, .. } => {
            assert!(
                matches!(&args[0], Argument::Extent(x) if x.start.is_none() && x.stop.is_none())
            );
            assert!(matches!(&args[1], Argument::Extent(x) if x.stride.is_some()));
        }
        other => panic!("not a call: {other:?}"),
    }
}

#[test]
fn test_keywords_are_not_reserved() {
    assert!(matches!(kind("if = 3"), StmtKind::Assignment { .. }));
    assert!(matches!(kind("caller = 1"), StmtKind::Assignment { .. }));
    match kind("program = 2") {
        StmtKind::Assignment { target, .. } => assert_eq!(ident(&target), "program"),
        other => panic!("not an assignment: {other:?}"),
    }
    match kind("end = while(do)") {
        StmtKind::Assignment { target, .. } => assert_eq!(ident(&target), "end"),
        other => panic!("not an assignment: {other:?}"),
    }
}

#[test]
fn test_assignment_statements() {
    match kind("a(i) = b + 1") {
        StmtKind::Assignment { target, .. } => {
            assert!(matches!(target.kind, ExprKind::CallOrIndex { .. }));
        }
        other => panic!("not an assignment: {other:?}"),
    }
    assert!(matches!(
        kind("p => null()"),
        StmtKind::PointerAssignment { .. }
    ));
}

#[test]
fn test_program_unit_statements() {
    assert_eq!(
        kind("PROGRAM demo"),
        StmtKind::Program {
            name: "demo".to_owned()
        }
    );
    assert_eq!(
        kind("module constants"),
        StmtKind::Module {
            name: "constants".to_owned()
        }
    );
    assert_eq!(kind("CONTAINS"), StmtKind::Contains);

    match kind("PURE RECURSIVE SUBROUTINE walk(n, depth)") {
        StmtKind::Subroutine {
            prefix,
            name,
            params,
            ..
        } => {
            assert_eq!(
                prefix,
                vec![
                    FunctionPrefix::Qualifier(ProcQualifier::Pure),
                    FunctionPrefix::Qualifier(ProcQualifier::Recursive),
                ]
            );
            assert_eq!(name, "walk");
            assert_eq!(params.unwrap(), ["n", "depth"]);
        }
        other => panic!("not a subroutine: {other:?}"),
    }

    match kind("REAL(KIND=8) FUNCTION norm(v) RESULT(r)") {
        StmtKind::Function {
            prefix,
            name,
            result,
            ..
        } => {
            assert!(matches!(prefix[0], FunctionPrefix::Type(_)));
            assert_eq!(name, "norm");
            assert_eq!(result.as_deref(), Some("r"));
        }
        other => panic!("not a function: {other:?}"),
    }

    match kind("ATTRIBUTES(GLOBAL) SUBROUTINE kern(a)") {
        StmtKind::Subroutine { attributes, .. } => {
            assert_eq!(attributes, Some(GpuAttribute::Global));
        }
        other => panic!("not a subroutine: {other:?}"),
    }
}

#[test]
fn test_end_statements() {
    assert_eq!(
        kind("END"),
        StmtKind::End {
            kind: None,
            name: None
        }
    );
    assert_eq!(
        kind("endif"),
        StmtKind::End {
            kind: Some(EndKind::If),
            name: None
        }
    );
    assert_eq!(
        kind("End Do"),
        StmtKind::End {
            kind: Some(EndKind::Do),
            name: None
        }
    );
    assert_eq!(
        kind("END SUBROUTINE walk"),
        StmtKind::End {
            kind: Some(EndKind::Subroutine),
            name: Some(BlockName::Name("walk".to_owned()))
        }
    );
    assert_eq!(
        kind("ENDSELECT"),
        StmtKind::End {
            kind: Some(EndKind::Select),
            name: None
        }
    );
}

#[test]
fn test_interface_statements() {
    assert_eq!(kind("INTERFACE"), StmtKind::Interface { name: None });
    assert_eq!(
        kind("INTERFACE swap"),
        StmtKind::Interface {
            name: Some(BlockName::Name("swap".to_owned()))
        }
    );
    assert_eq!(
        kind("INTERFACE OPERATOR(+)"),
        StmtKind::Interface {
            name: Some(BlockName::Operator("+".to_owned()))
        }
    );
    assert_eq!(
        kind("INTERFACE ASSIGNMENT(=)"),
        StmtKind::Interface {
            name: Some(BlockName::Assignment)
        }
    );
    assert_eq!(
        kind("END INTERFACE OPERATOR(.add.)"),
        StmtKind::End {
            kind: Some(EndKind::Interface),
            name: Some(BlockName::Operator(".add.".to_owned()))
        }
    );
}

#[test]
fn test_specification_statements() {
    assert_eq!(
        kind("USE iso_c_binding, ONLY: c_int, c_ptr"),
        StmtKind::Use {
            module: "iso_c_binding".to_owned(),
            only: Some(vec!["c_int".to_owned(), "c_ptr".to_owned()]),
        }
    );
    assert_eq!(kind("IMPLICIT NONE"), StmtKind::Implicit(ImplicitSpec::None));
    match kind("IMPLICIT REAL (A-H, O-Z), INTEGER (I-N)") {
        StmtKind::Implicit(ImplicitSpec::Rules(rules)) => {
            assert_eq!(rules.len(), 2);
            assert_eq!(rules[0].kind, IntrinsicKind::Real);
            assert_eq!(rules[0].ranges, vec![('A', Some('H')), ('O', Some('Z'))]);
            assert_eq!(rules[1].kind, IntrinsicKind::Integer);
        }
        other => panic!("not implicit rules: {other:?}"),
    }
    assert_eq!(
        kind("IMPORT :: a, b"),
        StmtKind::Import {
            names: vec!["a".to_owned(), "b".to_owned()]
        }
    );
    assert_eq!(
        kind("NAMELIST /grid/ nx, ny"),
        StmtKind::Namelist {
            name: "grid".to_owned(),
            items: vec!["nx".to_owned(), "ny".to_owned()],
        }
    );
    match kind("PARAMETER (N = 10, M = N*2)") {
        StmtKind::Parameter(ps) => {
            assert_eq!(ps.len(), 2);
            assert_eq!(ps[0].0, "N");
        }
        other => panic!("not parameter: {other:?}"),
    }
    match kind("EQUIVALENCE (a, b(1)), (c, d)") {
        StmtKind::Equivalence(sets) => assert_eq!(sets.len(), 2),
        other => panic!("not equivalence: {other:?}"),
    }
    assert_eq!(
        kind("INCLUDE 'params.inc'"),
        StmtKind::Include {
            filename: "params.inc".to_owned()
        }
    );
}

#[test]
fn test_declarations() {
    match kind("INTEGER :: i = 0, j") {
        StmtKind::Declaration {
            type_spec,
            qualifiers,
            entities,
        } => {
            assert_eq!(
                type_spec,
                TypeSpec::Intrinsic {
                    kind: IntrinsicKind::Integer,
                    size: None
                }
            );
            assert!(qualifiers.is_empty());
            assert_eq!(entities.len(), 2);
            assert!(matches!(entities[0].init, Some((InitKind::Value, _))));
            assert!(entities[1].init.is_none());
        }
        other => panic!("not a declaration: {other:?}"),
    }

    match kind("REAL(KIND=8), DIMENSION(10), SAVE :: grid") {
        StmtKind::Declaration {
            type_spec,
            qualifiers,
            ..
        } => {
            assert!(
                matches!(type_spec, TypeSpec::Intrinsic { size: Some(Size::List(_)), .. })
            );
            assert_eq!(qualifiers.len(), 2);
            assert!(matches!(qualifiers[0], TypeQualifier::Dimension(Some(_))));
            assert_eq!(qualifiers[1], TypeQualifier::Save);
        }
        other => panic!("not a declaration: {other:?}"),
    }

    match kind("CHARACTER*32 name") {
        StmtKind::Declaration { type_spec, .. } => {
            assert!(matches!(
                type_spec,
                TypeSpec::Intrinsic {
                    kind: IntrinsicKind::Character,
                    size: Some(Size::Star(_)),
                }
            ));
        }
        other => panic!("not a declaration: {other:?}"),
    }

    match kind("DOUBLE PRECISION x") {
        StmtKind::Declaration { type_spec, .. } => {
            assert!(matches!(
                type_spec,
                TypeSpec::Intrinsic {
                    kind: IntrinsicKind::DoublePrecision,
                    size: None,
                }
            ));
        }
        other => panic!("not a declaration: {other:?}"),
    }

    match kind("TYPE(point) :: origin") {
        StmtKind::Declaration { type_spec, .. } => {
            assert_eq!(
                type_spec,
                TypeSpec::Derived {
                    class: false,
                    name: "point".to_owned()
                }
            );
        }
        other => panic!("not a declaration: {other:?}"),
    }

    match kind("CLASS(shape), POINTER :: p => NULL()") {
        StmtKind::Declaration {
            type_spec,
            entities,
            ..
        } => {
            assert!(matches!(type_spec, TypeSpec::Derived { class: true, .. }));
            assert!(matches!(entities[0].init, Some((InitKind::Pointer, _))));
        }
        other => panic!("not a declaration: {other:?}"),
    }
}

#[test]
fn test_modification_statements() {
    match kind("DIMENSION a(10), b(n, m)") {
        StmtKind::Modification {
            qualifier,
            entities,
        } => {
            assert!(matches!(qualifier, TypeQualifier::Dimension(None)));
            assert_eq!(entities.len(), 2);
        }
        other => panic!("not a modification: {other:?}"),
    }
    match kind("INTENT(IN OUT) :: buf") {
        StmtKind::Modification { qualifier, .. } => {
            assert_eq!(qualifier, TypeQualifier::Intent(Intent::InOut));
        }
        other => panic!("not a modification: {other:?}"),
    }
    assert_eq!(kind("PUBLIC"), StmtKind::Public);
    assert!(matches!(kind("PRIVATE :: impl"), StmtKind::Modification { .. }));
}

#[test]
fn test_derived_type_statements() {
    assert_eq!(
        kind("TYPE point"),
        StmtKind::DerivedTypeDef {
            qualifier: None,
            name: "point".to_owned()
        }
    );
    assert_eq!(
        kind("TYPE, PUBLIC :: handle"),
        StmtKind::DerivedTypeDef {
            qualifier: Some(TypeQualifier::Public),
            name: "handle".to_owned()
        }
    );
    match kind("PROCEDURE, PASS :: area => circle_area") {
        StmtKind::ProcedureBinding {
            kind: k,
            attributes,
            binding,
            methods,
        } => {
            assert_eq!(k, ProcedureKind::Procedure);
            assert_eq!(attributes, vec![ProcedureAttribute::Pass]);
            assert_eq!(binding.as_deref(), Some("area"));
            assert_eq!(methods, ["circle_area"]);
        }
        other => panic!("not a procedure binding: {other:?}"),
    }
    match kind("MODULE PROCEDURE swap_i, swap_r") {
        StmtKind::ProcedureBinding {
            kind: k, methods, ..
        } => {
            assert_eq!(k, ProcedureKind::ModuleProcedure);
            assert_eq!(methods, ["swap_i", "swap_r"]);
        }
        other => panic!("not a procedure binding: {other:?}"),
    }
}

#[test]
fn test_control_statements() {
    match kind("DO i = 1, n, 2") {
        StmtKind::Do {
            block_label,
            control: Some(LoopControl::Counted { var, step, .. }),
        } => {
            assert!(block_label.is_none());
            assert_eq!(var, "i");
            assert!(step.is_some());
        }
        other => panic!("not a counted do: {other:?}"),
    }
    assert!(matches!(
        kind("DO WHILE (x < 10)"),
        StmtKind::Do {
            control: Some(LoopControl::While(_)),
            ..
        }
    ));
    match kind("outer: DO") {
        StmtKind::Do {
            block_label,
            control,
        } => {
            assert_eq!(block_label.as_deref(), Some("outer"));
            assert!(control.is_none());
        }
        other => panic!("not a do: {other:?}"),
    }

    assert!(matches!(kind("IF (a > 0) THEN"), StmtKind::BlockIf { .. }));
    match kind("IF (err /= 0) GOTO 100") {
        StmtKind::If { body, .. } => {
            assert_eq!(body.kind, StmtKind::Goto("100".to_owned()));
        }
        other => panic!("not an inline if: {other:?}"),
    }
    match kind("ELSE IF (a < 0) THEN named") {
        StmtKind::ElseIf { name, .. } => assert_eq!(name.as_deref(), Some("named")),
        other => panic!("not an else-if: {other:?}"),
    }
    assert_eq!(kind("ELSE"), StmtKind::Else { name: None });

    assert!(matches!(kind("WHERE (a > 0)"), StmtKind::BlockWhere { .. }));
    assert!(matches!(kind("WHERE (mask) a = 0"), StmtKind::Where { .. }));
    match kind("ELSEWHERE (b < 0)") {
        StmtKind::Elsewhere { condition, .. } => assert!(condition.is_some()),
        other => panic!("not an elsewhere: {other:?}"),
    }

    match kind("FORALL (i = 1:n, j = 1:m, a(i,j) > 0) b(i,j) = 0") {
        StmtKind::Forall { triplets, mask, .. } => {
            assert_eq!(triplets.len(), 2);
            assert!(mask.is_some());
        }
        other => panic!("not an inline forall: {other:?}"),
    }
    assert!(matches!(
        kind("FORALL (i = 1:n:2)"),
        StmtKind::BlockForall { .. }
    ));

    assert!(matches!(
        kind("SELECT CASE (state)"),
        StmtKind::SelectCase { .. }
    ));
    match kind("CASE (1, 3:5, DEFAULT)") {
        StmtKind::Case {
            selector: CaseSelector::Values(vs),
            ..
        } => {
            assert!(matches!(vs[0], CaseValue::Expr(_)));
            assert!(matches!(vs[1], CaseValue::Range(_)));
            assert!(matches!(vs[2], CaseValue::Default));
        }
        other => panic!("not a case: {other:?}"),
    }
    assert_eq!(
        kind("CASE DEFAULT"),
        StmtKind::Case {
            selector: CaseSelector::Default,
            name: None
        }
    );
}

#[test]
fn test_simple_executable_statements() {
    assert_eq!(kind("CONTINUE"), StmtKind::Continue);
    assert_eq!(kind("CYCLE outer"), StmtKind::Cycle(Some("outer".to_owned())));
    assert_eq!(kind("EXIT"), StmtKind::Exit(None));
    assert_eq!(kind("GO TO 10"), StmtKind::Goto("10".to_owned()));
    assert_eq!(kind("goto 10"), StmtKind::Goto("10".to_owned()));
    assert_eq!(kind("RETURN"), StmtKind::Return);
    assert!(matches!(kind("STOP 'bad input'"), StmtKind::Stop(Some(_))));
    match kind("CALL resize(buf, n = 2*n)") {
        StmtKind::Call { name, args } => {
            assert_eq!(name, "resize");
            assert_eq!(args.unwrap().len(), 2);
        }
        other => panic!("not a call: {other:?}"),
    }
    assert!(matches!(kind("assert(x > 0)"), StmtKind::ExprCall(_)));
}

#[test]
fn test_statement_labels() {
    let s = stmt("10 CONTINUE");
    assert_eq!(s.label.as_deref(), Some("10"));
    assert_eq!(s.kind, StmtKind::Continue);
    let s = stmt("100 FORMAT(1X, I5)");
    assert_eq!(s.label.as_deref(), Some("100"));
    assert!(matches!(s.kind, StmtKind::Format(_)));
}

#[test]
fn test_format_statements() {
    match kind("FORMAT(1X, I5, 'total:', 2(F4.1, 1X), /)") {
        StmtKind::Format(items) => {
            assert_eq!(items.len(), 5);
            assert_eq!(items[0], FormatItem::Descriptor("1X".to_owned()));
            assert_eq!(items[2], FormatItem::Str("'total:'".to_owned()));
            match &items[3] {
                FormatItem::Group { descriptor, items } => {
                    assert_eq!(descriptor.as_deref(), Some("2"));
                    assert_eq!(items.len(), 2);
                }
                other => panic!("not a group: {other:?}"),
            }
            assert_eq!(items[4], FormatItem::Descriptor("/".to_owned()));
        }
        other => panic!("not a format: {other:?}"),
    }
}

#[test]
fn test_print_statements() {
    match kind("PRINT *, 'x =', x") {
        StmtKind::Print { format, items } => {
            assert!(matches!(format, IoValue::Star(_)));
            assert_eq!(items.len(), 2);
        }
        other => panic!("not a print: {other:?}"),
    }
    match kind("PRINT 100") {
        StmtKind::Print { format, items } => {
            assert!(matches!(format, IoValue::Label(ref l, _) if l == "100"));
            assert!(items.is_empty());
        }
        other => panic!("not a print: {other:?}"),
    }
}

#[test]
fn test_write_statements() {
    match kind("WRITE(6, *) a, b") {
        StmtKind::Write { control, items } => {
            assert!(matches!(control.unit, Some(IoValue::Expr(_))));
            assert!(matches!(control.format, Some(IoValue::Star(_))));
            assert!(control.keywords.is_empty());
            assert_eq!(items.len(), 2);
        }
        other => panic!("not a write: {other:?}"),
    }
    match kind("WRITE(*, '(A)') msg") {
        StmtKind::Write { control, .. } => {
            assert!(matches!(control.unit, Some(IoValue::Star(_))));
            assert!(matches!(control.format, Some(IoValue::Expr(_))));
        }
        other => panic!("not a write: {other:?}"),
    }
    match kind("WRITE(unit, IOSTAT=ios) x") {
        StmtKind::Write { control, .. } => {
            assert!(matches!(control.unit, Some(IoValue::Expr(_))));
            assert!(control.format.is_none());
            assert!(control.keywords.contains_key("IOSTAT"));
        }
        other => panic!("not a write: {other:?}"),
    }
}

#[test]
fn test_read_statements() {
    match kind("READ(UNIT=5, FMT=100, IOSTAT=ios) x, y") {
        StmtKind::Read { control, items } => {
            assert!(control.unit.is_none());
            let keys: Vec<_> = control.keywords.keys().cloned().collect();
            assert_eq!(keys, ["UNIT", "FMT", "IOSTAT"]);
            assert!(matches!(control.keywords["FMT"], IoValue::Label(ref l, _) if l == "100"));
            assert_eq!(items.len(), 2);
        }
        other => panic!("not a read: {other:?}"),
    }
    match kind("READ *, n") {
        StmtKind::Read { control, items } => {
            assert!(matches!(control.format, Some(IoValue::Star(_))));
            assert_eq!(items.len(), 1);
        }
        other => panic!("not a read: {other:?}"),
    }
}

#[test]
fn test_case_insensitive_keywords() {
    assert!(matches!(kind("wRiTe(6, *) x"), StmtKind::Write { .. }));
    assert!(matches!(kind("Do While (.True.)"), StmtKind::Do { .. }));
    assert!(matches!(
        kind("implicit none"),
        StmtKind::Implicit(ImplicitSpec::None)
    ));
    for src in ["PROGRAM main", "Program main", "program main"] {
        assert!(matches!(kind(src), StmtKind::Program { .. }), "{src}");
    }
}

#[test]
fn test_unparseable_statement() {
    assert!(matches!(kind("INTEGER ="), StmtKind::Error { .. }));
    assert!(matches!(kind("DO 10 i = 1, 5"), StmtKind::Error { .. }));
}

#[test]
fn test_comment_trivia() {
    let s = stmt("x = 1 ! the answer");
    assert!(matches!(s.kind, StmtKind::Assignment { .. }));
    assert_eq!(s.comments.len(), 1);
    assert_eq!(s.comments[0].text, " the answer");

    let s = stmt("! just a note");
    assert_eq!(s.kind, StmtKind::Comment);
    assert_eq!(s.comments[0].text, " just a note");
}

#[test]
fn test_spans_through_continuation() {
    let src = "total = total + &\n        delta";
    let mut stmts = scan::split_statements(src, &FreeForm);
    let s = grammar::parse_statement(stmts.remove(0));
    match s.kind {
        StmtKind::Assignment { value, .. } => {
            // The whole sum covers both physical lines.
            assert_eq!(&src[value.span.start..value.span.end], "total + &\n        delta");
            let (_, _, r) = {
                match &value.kind {
                    ExprKind::Binary {
                        operator,
                        left,
                        right,
                    } => (*operator, left, right),
                    other => panic!("not binary: {other:?}"),
                }
            };
            assert_eq!(&src[r.span.start..r.span.end], "delta");
        }
        other => panic!("not an assignment: {other:?}"),
    }
}
