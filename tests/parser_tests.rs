// tests/parser_tests.rs

use verdict::ast::{Expression, Literal, MatchExpr, MatchOperator, PathSegment, Selector};
use verdict::lexer::LexError;
use verdict::parser::{MAX_NESTING_DEPTH, MAX_TREE_DEPTH, ParseError, parse};
use verdict::{to_expression_string, to_grouped_string};

fn parse_ok(input: &str) -> Expression {
    parse(input, 0).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e))
}

fn leaf(input: &str) -> MatchExpr {
    match parse_ok(input) {
        Expression::Match(m) => m,
        other => panic!("expected a match expression, got {:?}", other),
    }
}

fn field(path: &[&str]) -> Selector {
    Selector::fields(path.iter().copied()).unwrap()
}

// ============================================================================
// Match Expressions
// ============================================================================

#[test]
fn test_equality() {
    let m = leaf(r#"Name == "web""#);
    assert_eq!(m.selector, field(&["Name"]));
    assert_eq!(m.operator, MatchOperator::Equal);
    assert_eq!(m.value, Some(Literal::from("web")));

    let m = leaf("Replicas != 0");
    assert_eq!(m.operator, MatchOperator::NotEqual);
    assert_eq!(m.value, Some(Literal::Integer(0)));
}

#[test]
fn test_literal_kinds() {
    assert_eq!(leaf("A == 2.5").value, Some(Literal::Float(2.5)));
    assert_eq!(leaf("A == -3").value, Some(Literal::Integer(-3)));
    assert_eq!(leaf("A == true").value, Some(Literal::Boolean(true)));
    assert_eq!(leaf("A == null").value, Some(Literal::Null));
    assert_eq!(leaf("A == 'x'").value, Some(Literal::from("x")));
}

#[test]
fn test_membership_forms() {
    let m = leaf(r#"Tags contains "prod""#);
    assert_eq!(m.operator, MatchOperator::Contains);

    let m = leaf(r#"Tags not contains "prod""#);
    assert_eq!(m.operator, MatchOperator::NotContains);

    let m = leaf(r#""prod" in Tags"#);
    assert_eq!(m.operator, MatchOperator::In);
    assert_eq!(m.selector, field(&["Tags"]));
    assert_eq!(m.value, Some(Literal::from("prod")));

    let m = leaf(r#""prod" not in Meta.Tags"#);
    assert_eq!(m.operator, MatchOperator::NotIn);
    assert_eq!(m.selector, field(&["Meta", "Tags"]));
}

#[test]
fn test_emptiness() {
    let m = leaf("Labels is empty");
    assert_eq!(m.operator, MatchOperator::IsEmpty);
    assert_eq!(m.value, None);

    let m = leaf("Labels is not empty");
    assert_eq!(m.operator, MatchOperator::IsNotEmpty);
    assert_eq!(m.value, None);
}

#[test]
fn test_matches_compiles_pattern() {
    let m = leaf(r#"Name matches "^web-\d+$""#);
    assert_eq!(m.operator, MatchOperator::Matches);
    let pattern = m.pattern().unwrap();
    assert!(pattern.regex().unwrap().is_match("web-12"));

    let m = leaf(r#"Name not matches "^db""#);
    assert_eq!(m.operator, MatchOperator::NotMatches);
}

#[test]
fn test_invalid_pattern_still_parses() {
    let m = leaf(r#"Name matches "(""#);
    assert_eq!(m.pattern().unwrap().source(), "(");
    assert!(m.pattern().unwrap().regex().is_err());
}

// ============================================================================
// Selectors
// ============================================================================

#[test]
fn test_selector_segments() {
    let m = leaf(r#"Meta["app name"].Tags[0] == "x""#);
    assert_eq!(
        m.selector.segments(),
        &[
            PathSegment::Field("Meta".to_string()),
            PathSegment::Quoted("app name".to_string()),
            PathSegment::Field("Tags".to_string()),
            PathSegment::Index(0),
        ]
    );
}

#[test]
fn test_quoted_head_segment() {
    let m = leaf(r#"["weird key"] is empty"#);
    assert_eq!(
        m.selector.segments(),
        &[PathSegment::Quoted("weird key".to_string())]
    );
}

#[test]
fn test_keywords_after_dot_are_names() {
    let m = leaf("Spec.empty.in.not == 1");
    assert_eq!(m.selector, field(&["Spec", "empty", "in", "not"]));
}

#[test]
fn test_negative_index_rejected() {
    let err = parse("Tags[-1] == 1", 0).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedToken {
            expected: "a non-negative index",
            offset: 5,
            ..
        }
    ));
}

#[test]
fn test_unclosed_bracket() {
    let err = parse("Tags[0 == 1", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { expected: "']'", offset: 7, .. }));
}

// ============================================================================
// Boolean Structure and Precedence
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse_ok("A == 1 or B == 2 and C == 3");
    match expr {
        Expression::Or { left, right } => {
            assert!(matches!(*left, Expression::Match(_)));
            assert!(matches!(*right, Expression::And { .. }));
        }
        other => panic!("expected or at the root, got {:?}", other),
    }
}

#[test]
fn test_not_binds_tighter_than_and() {
    let expr = parse_ok("not A == 1 and B == 2");
    match expr {
        Expression::And { left, .. } => assert!(matches!(*left, Expression::Not { .. })),
        other => panic!("expected and at the root, got {:?}", other),
    }
}

#[test]
fn test_operators_are_left_associative() {
    let expr = parse_ok("A == 1 and B == 2 and C == 3");
    match expr {
        Expression::And { left, right } => {
            assert!(matches!(*left, Expression::And { .. }));
            assert!(matches!(*right, Expression::Match(_)));
        }
        other => panic!("expected and at the root, got {:?}", other),
    }
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = parse_ok("(A == 1 or B == 2) and C == 3");
    match expr {
        Expression::And { left, .. } => assert!(matches!(*left, Expression::Or { .. })),
        other => panic!("expected and at the root, got {:?}", other),
    }
}

#[test]
fn test_double_negation() {
    let expr = parse_ok("not not A is empty");
    assert_eq!(
        expr,
        Expression::not(Expression::not(Expression::Match(MatchExpr::new(
            field(&["A"]),
            MatchOperator::IsEmpty,
            None
        ))))
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_operand() {
    let err = parse("Name ==", 0).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingOperand {
            operator: MatchOperator::Equal,
            offset: 5
        }
    );

    let err = parse("Tags contains Other", 0).unwrap_err();
    assert!(matches!(
        err,
        ParseError::MissingOperand {
            operator: MatchOperator::Contains,
            ..
        }
    ));
}

#[test]
fn test_matches_requires_string() {
    let err = parse("Name matches 3", 0).unwrap_err();
    assert!(matches!(
        err,
        ParseError::OperandMismatch {
            operator: MatchOperator::Matches,
            offset: 13,
            ..
        }
    ));
}

#[test]
fn test_incomplete_emptiness() {
    let err = parse("Labels is", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { expected: "'empty'", .. }));

    let err = parse("Labels is full", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { offset: 10, .. }));
}

#[test]
fn test_value_first_requires_in() {
    let err = parse(r#""prod" == Tags"#, 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { offset: 7, .. }));
}

#[test]
fn test_unbalanced_parentheses() {
    let err = parse("(A == 1 and (B == 2)", 0).unwrap_err();
    assert_eq!(err, ParseError::UnbalancedParen { offset: 0 });

    let err = parse("A == 1)", 0).unwrap_err();
    assert!(matches!(err, ParseError::TrailingInput { offset: 6, .. }));
}

#[test]
fn test_dangling_boolean_operator() {
    let err = parse("A == 1 and", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { offset: 10, .. }));

    let err = parse("or A == 1", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { offset: 0, .. }));
}

#[test]
fn test_empty_input() {
    let err = parse("", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { offset: 0, .. }));
    let err = parse("   ", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { offset: 3, .. }));
}

#[test]
fn test_missing_operator() {
    let err = parse("Name", 0).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { expected: "a match operator", .. }));
}

#[test]
fn test_lex_errors_pass_through() {
    let err = parse("Name = 1", 0).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Lex(LexError::IncompleteOperator { offset: 5, .. })
    ));
    assert_eq!(err.offset(), 5);
}

#[test]
fn test_nesting_limit() {
    let deep = format!(
        "{}A == 1{}",
        "(".repeat(MAX_NESTING_DEPTH + 1),
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    assert!(matches!(
        parse(&deep, 0),
        Err(ParseError::NestingTooDeep { .. })
    ));

    let ok = format!(
        "{}A == 1{}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert!(parse(&ok, 0).is_ok());
}

#[test]
fn test_boolean_chains_count_toward_depth() {
    // A chain of n leaves is a left-leaning tree of height n
    let fits = vec!["A == 1"; MAX_TREE_DEPTH].join(" and ");
    assert_eq!(parse(&fits, 0).unwrap().leaf_count(), MAX_TREE_DEPTH);

    let too_tall = vec!["A == 1"; MAX_TREE_DEPTH + 1].join(" or ");
    assert_eq!(
        parse(&too_tall, 0).unwrap_err(),
        ParseError::NestingTooDeep {
            limit: MAX_TREE_DEPTH,
            offset: MAX_TREE_DEPTH * 10 - 3
        }
    );
}

#[test]
fn test_depth_adds_across_groups_and_negation() {
    let inner = vec!["A == 1"; MAX_TREE_DEPTH - 1].join(" and ");
    assert!(parse(&format!("not ({})", inner), 0).is_ok());
    assert!(matches!(
        parse(&format!("not not ({})", inner), 0),
        Err(ParseError::NestingTooDeep { offset: 0, .. })
    ));
}

// ============================================================================
// Expression Limit
// ============================================================================

fn chain(leaves: usize) -> String {
    (0..leaves)
        .map(|i| format!("F{} == {}", i, i))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[test]
fn test_limit_exact_is_accepted() {
    let expr = parse(&chain(10), 10).unwrap();
    assert_eq!(expr.leaf_count(), 10);
}

#[test]
fn test_limit_exceeded() {
    let err = parse(&chain(11), 10).unwrap_err();
    assert!(matches!(err, ParseError::TooManyExpressions { limit: 10, .. }));
    assert!(err.to_string().starts_with("too many expressions"));
}

#[test]
fn test_zero_limit_is_unlimited() {
    assert_eq!(parse(&chain(500), 0).unwrap().leaf_count(), 500);
}

#[test]
fn test_limit_counts_only_leaves() {
    // Grouping and negation do not count
    let expr = parse("not (A == 1 or not (B == 2))", 2).unwrap();
    assert_eq!(expr.leaf_count(), 2);
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_round_trip() {
    let inputs = [
        r#"Name == "web""#,
        r#"A == 1 or B == 2 and C == 3"#,
        r#"(A == 1 or B == 2) and not C is empty"#,
        r#""prod" not in Meta.Tags"#,
        r#"Meta["app name"][0].in == 'x'"#,
        r#"Name matches `^svc-\d+$` and Port != 8080"#,
        r#"Ratio == 3.0 or Ratio == -1.5e-7"#,
        r#"A == "line\nbreak \"quoted\"""#,
        r#"["and"] == null"#,
        r#"not not (A == true)"#,
    ];

    for input in inputs {
        let first = parse_ok(input);
        let printed = to_expression_string(&first);
        let second = parse(&printed, 0)
            .unwrap_or_else(|e| panic!("re-parse of {:?} failed: {}", printed, e));
        assert_eq!(first, second, "round trip changed {:?} -> {:?}", input, printed);
        assert_eq!(to_expression_string(&second), printed);

        let grouped = to_grouped_string(&first);
        assert_eq!(parse_ok(&grouped), first, "grouped form {:?}", grouped);
    }
}

#[test]
fn test_overflowing_float_literal_is_rejected() {
    // Accepting it would print as `inf`, which does not parse back
    let err = parse("Ratio == 1e400", 0).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Lex(LexError::InvalidNumber { offset: 9, .. })
    ));
    let expr = parse_ok("Ratio == 1e308");
    assert_eq!(parse_ok(&to_expression_string(&expr)), expr);
}

#[test]
fn test_canonical_output() {
    assert_eq!(
        parse_ok("((A == 1)) and (B == 2 or C == 3)").to_string(),
        "A == 1 and (B == 2 or C == 3)"
    );
    assert_eq!(
        parse_ok("A == 1 and (B == 2 and C == 3)").to_string(),
        "A == 1 and (B == 2 and C == 3)"
    );
    assert_eq!(parse_ok("'prod'   in   Tags").to_string(), r#""prod" in Tags"#);
    assert_eq!(parse_ok(r#"["in"] is empty"#).to_string(), r#"["in"] is empty"#);
}
