// tests/expression_tests.rs

use jsonq::{BoolEvaluator, ExprError, Operator, Postfix, to_postfix};

fn eval(expression: &str) -> bool {
    BoolEvaluator::new()
        .evaluate(expression)
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e))
}

fn eval_err(expression: &str) -> ExprError {
    BoolEvaluator::new()
        .evaluate(expression)
        .expect_err(expression)
}

// ============================================================================
// Arithmetic and Comparison
// ============================================================================

#[test]
fn test_arithmetic_round_trip() {
    assert!(eval("(3 + 4) * 2 == 14"));
    assert!(eval("3 + 4 * 2 == 11"));
    assert!(eval("10 / 4 == 2.5"));
    assert!(eval("2 ^ 3 ^ 2 == 512"));
    assert!(eval("10 - 4 - 3 == 3"));
}

#[test]
fn test_numeric_comparisons() {
    let test_cases = vec![
        ("1 < 2", true),
        ("2 < 1", false),
        ("2 <= 2", true),
        ("3 >= 4", false),
        ("5 > 4.5", true),
        ("1 != 1", false),
        ("1.0 == 1", true),
    ];

    for (expression, expected) in test_cases {
        assert_eq!(eval(expression), expected, "expression: {}", expression);
    }
}

// ============================================================================
// Logical Operators
// ============================================================================

#[test]
fn test_logical_operators() {
    assert!(eval("1 > 2 || 3 <= 3"));
    assert!(!eval("1 > 2 && 3 <= 3"));
    assert!(eval("true & true"));
    assert!(eval("false | true"));
    assert!(!eval("false || false"));
}

#[test]
fn test_not() {
    assert!(!eval("!true"));
    assert!(eval("!false"));
    assert!(eval("!(1 > 2)"));
    assert!(eval("!!true"));
}

#[test]
fn test_bare_booleans() {
    assert!(eval("true"));
    assert!(!eval("false"));
}

// ============================================================================
// Strings and Regex
// ============================================================================

#[test]
fn test_regex_full_match() {
    assert!(eval("'abc' ~ 'a.c'"));
    assert!(!eval("'abcd' ~ 'a.c'"));
    assert!(!eval("'xabc' ~ 'abc'"));
    assert!(eval(r"'item42' ~ 'item\d+'"));
    assert!(eval("'a' ~ 'a|b'"));
}

#[test]
fn test_string_comparisons() {
    assert!(eval("'abc' == 'abc'"));
    assert!(eval("'abc' != 'abd'"));
    assert!(eval("'apple' < 'banana'"));
    assert!(eval("'b' >= 'a'"));
}

#[test]
fn test_mixed_operands_compare_as_text() {
    // 12 renders as "12", which sorts before "9".
    assert!(eval("12 < '9'"));
    assert!(eval(r"12 ~ '\d+'"));
}

#[test]
fn test_lone_string_is_false() {
    assert!(!eval("'yes'"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_numeric_regex_is_unsupported() {
    let err = eval_err("1 ~ 1");
    assert_eq!(
        err,
        ExprError::UnsupportedOperand {
            operator: Operator::Matches,
            left: "1".to_string(),
            right: "1".to_string(),
        }
    );
}

#[test]
fn test_arithmetic_on_text_is_unsupported() {
    assert!(matches!(
        eval_err("'a' + 1"),
        ExprError::UnsupportedOperand { operator: Operator::Add, .. }
    ));
    assert!(matches!(eval_err("!'a'"), ExprError::UnsupportedOperand { .. }));
}

#[test]
fn test_malformed_expressions() {
    for expression in ["", "1 2", "(1 > 2", "1 > 2)", "1 +", "'a' ~ '('", "1 # 2"] {
        assert!(
            matches!(eval_err(expression), ExprError::MalformedExpression(_)),
            "expression: {}",
            expression
        );
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        eval_err("'a' * 2").to_string(),
        "Unsupported operand type for operator *: operand a and 2"
    );
}

// ============================================================================
// Postfix Conversion
// ============================================================================

#[test]
fn test_postfix_order() {
    let postfix = to_postfix("(3 + 4) * 2 == 14").unwrap();
    assert_eq!(
        postfix,
        vec![
            Postfix::Number(3.0),
            Postfix::Number(4.0),
            Postfix::Operator(Operator::Add),
            Postfix::Number(2.0),
            Postfix::Operator(Operator::Multiply),
            Postfix::Number(14.0),
            Postfix::Operator(Operator::Equal),
        ]
    );
}

#[test]
fn test_evaluate_postfix_directly() {
    let postfix = vec![
        Postfix::String("abc".into()),
        Postfix::String("a.c".into()),
        Postfix::Operator(Operator::Matches),
    ];
    assert!(BoolEvaluator::new().evaluate_postfix(&postfix).unwrap());
}
