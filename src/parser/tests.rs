use super::*;
use crate::ast::{Field, RangeOperator};
use crate::schema::FieldType;
use pretty_assertions::assert_eq;

fn expr(input: &str) -> Expression {
    parse_search_input_query(input, &[])
        .unwrap()
        .expression
        .unwrap()
}

fn errors(input: &str, schemas: &[FieldSchema]) -> Vec<ValidationError> {
    parse_search_input_query(input, schemas).unwrap_err().errors
}

fn fv(field: &str, value: &str) -> Expression {
    Expression::field_value(Field::new(field), value)
}

#[test]
fn test_blank_input() {
    for input in ["", "   ", "\t\n"] {
        let query = parse_search_input_query(input, &[]).unwrap();
        assert!(query.is_empty());
    }
}

#[test]
fn test_single_term() {
    assert_eq!(expr("laptop"), Expression::term("laptop"));
    assert_eq!(expr(r#""red shoes""#), Expression::term("red shoes"));
}

#[test]
fn test_implicit_and_is_left_associative() {
    assert_eq!(
        expr("a b c"),
        Expression::and(
            Expression::and(Expression::term("a"), Expression::term("b")),
            Expression::term("c")
        )
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        expr("a OR b AND c"),
        Expression::or(
            Expression::term("a"),
            Expression::and(Expression::term("b"), Expression::term("c"))
        )
    );
    assert_eq!(
        expr("a b OR c"),
        Expression::or(
            Expression::and(Expression::term("a"), Expression::term("b")),
            Expression::term("c")
        )
    );
}

#[test]
fn test_keywords_case_insensitive() {
    assert_eq!(expr("a or b"), expr("a OR b"));
    assert_eq!(expr("not a"), Expression::negate(Expression::term("a")));
}

#[test]
fn test_not_binds_to_atom() {
    assert_eq!(
        expr("NOT a b"),
        Expression::and(Expression::negate(Expression::term("a")), Expression::term("b"))
    );
    assert_eq!(
        expr("NOT NOT a"),
        Expression::negate(Expression::negate(Expression::term("a")))
    );
}

#[test]
fn test_groups_override_precedence() {
    assert_eq!(
        expr("(a OR b) c"),
        Expression::and(
            Expression::or(Expression::term("a"), Expression::term("b")),
            Expression::term("c")
        )
    );
}

#[test]
fn test_field_values() {
    assert_eq!(
        expr("title:foo AND status:active"),
        Expression::and(fv("title", "foo"), fv("status", "active"))
    );
    assert_eq!(expr(r#"title:"big deal""#), fv("title", "big deal"));
}

#[test]
fn test_ranges() {
    assert_eq!(
        expr("price:10..50"),
        Expression::Range {
            field: Field::new("price"),
            operator: RangeOperator::Between,
            value: "10".into(),
            value2: Some("50".into()),
        }
    );
    for (input, operator) in [
        ("price:>=10", RangeOperator::Gte),
        ("price:>10", RangeOperator::Gt),
        ("price:<=10", RangeOperator::Lte),
        ("price:< 10", RangeOperator::Lt),
    ] {
        assert_eq!(
            expr(input),
            Expression::Range {
                field: Field::new("price"),
                operator,
                value: "10".into(),
                value2: None,
            }
        );
    }
}

#[test]
fn test_in_list() {
    assert_eq!(
        expr(r#"category:IN(a,b,"c d")"#),
        Expression::In {
            field: Field::new("category"),
            values: vec!["a".into(), "b".into(), "c d".into()],
        }
    );
    assert_eq!(expr("category:in ( a , b )"), expr("category:IN(a,b)"));
}

#[test]
fn test_in_as_plain_value() {
    assert_eq!(expr("state:in"), fv("state", "in"));
}

#[test]
fn test_wildcards() {
    assert_eq!(expr("prog*"), Expression::wildcard("prog", false));
    assert_eq!(expr(r#""red sh"*"#), Expression::wildcard("red sh", true));
}

#[test]
fn test_schema_types_attached() {
    let schemas = [FieldSchema::number("price"), FieldSchema::string("title")];
    let query = parse_search_input_query("Price:>5 title:x other", &schemas).unwrap();
    let Some(Expression::And { left, right }) = query.expression else {
        panic!("expected AND");
    };
    let Expression::And { left: price, right: title } = *left else {
        panic!("expected nested AND");
    };
    assert_eq!(price.field(), Some(&Field::typed("Price", FieldType::Number)));
    assert_eq!(title.field(), Some(&Field::typed("title", FieldType::String)));
    assert_eq!(*right, Expression::term("other"));
}

#[test]
fn test_unbalanced_paren_reports_at_eof() {
    let errs = errors("(title:foo", &[]);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::SyntaxError);
    assert_eq!(errs[0].span(), (10, 0));
}

#[test]
fn test_stray_close_paren() {
    let errs = errors("a ) b", &[]);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].span(), (2, 1));
}

#[test]
fn test_unterminated_string() {
    let errs = errors(r#"title:"open"#, &[]);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::UnterminatedString);
    assert_eq!(errs[0].position, 6);
}

#[test]
fn test_malformed_ranges() {
    assert_eq!(errors("price:..5", &[])[0].position, 6);
    assert_eq!(errors("price:10..", &[])[0].code, ErrorCode::SyntaxError);
    assert_eq!(errors(">=5", &[])[0].position, 0);
}

#[test]
fn test_malformed_in_lists() {
    for input in ["tag:IN()", "tag:IN(a,)", "tag:IN(a b)", "tag:IN(a"] {
        let errs = errors(input, &[]);
        assert_eq!(errs.len(), 1, "{}", input);
        assert_eq!(errs[0].code, ErrorCode::SyntaxError, "{}", input);
    }
}

#[test]
fn test_dangling_operators() {
    assert_eq!(errors("a AND", &[])[0].span(), (5, 0));
    assert_eq!(errors("OR a", &[])[0].span(), (0, 2));
    assert_eq!(errors("NOT", &[])[0].span(), (3, 0));
}

#[test]
fn test_field_wildcard_rejected() {
    let errs = errors("title:foo*", &[]);
    assert_eq!(errs[0].span(), (6, 4));
}

#[test]
fn test_syntax_errors_are_fail_fast() {
    let schemas = [FieldSchema::string("title")];
    let errs = errors("unknown:x )", &schemas);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::SyntaxError);
}

#[test]
fn test_semantic_errors_accumulate_sorted() {
    let schemas = [FieldSchema::number("price"), FieldSchema::string("title")];
    let errs = errors("titel:x price:abc and:1 bad.name:2", &schemas);
    let codes: Vec<_> = errs.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::UnknownField,
            ErrorCode::TypeMismatch,
            ErrorCode::ReservedWordAsField,
            ErrorCode::InvalidFieldChars,
        ]
    );
    let positions: Vec<_> = errs.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 14, 18, 24]);
}

#[test]
fn test_unknown_field_single_diagnostic() {
    let schemas = [FieldSchema::string("title")];
    let errs = errors("unknown:foo", &schemas);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::UnknownField);
    assert_eq!(errs[0].span(), (0, 7));
}

#[test]
fn test_reserved_field_collision_keeps_structural() {
    let schemas = [FieldSchema::string("title")];
    let errs = errors("AND:foo", &schemas);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::ReservedWordAsField);
}

#[test]
fn test_depth_limit() {
    let options = ParseOptions {
        max_depth: 4,
        ..ParseOptions::default()
    };
    assert!(parse_with_options("((((a))))", &[], &options).is_ok());
    let err = parse_with_options("(((((a)))))", &[], &options).unwrap_err();
    assert_eq!(err.codes(), vec![ErrorCode::NestingTooDeep]);
    assert_eq!(err.errors[0].position, 4);

    let deep = "NOT ".repeat(300) + "a";
    let err = parse_search_input_query(&deep, &[]).unwrap_err();
    assert_eq!(err.codes(), vec![ErrorCode::NestingTooDeep]);
}

/// `(...(a) a a ...) a a ...`: each level wraps the previous one in a group
/// and extends it with an implicit-AND chain.
fn nested_chains(levels: usize, width: usize) -> String {
    let mut query = String::from("a");
    for _ in 0..levels {
        query = format!("({}){}", query, " a".repeat(width - 1));
    }
    query
}

#[test]
fn test_depth_limit_counts_chains_under_groups() {
    let query = nested_chains(12, 120);
    assert!(query.len() < DEFAULT_MAX_INPUT_LENGTH);
    let err = parse_search_input_query(&query, &[]).unwrap_err();
    assert_eq!(err.codes(), vec![ErrorCode::NestingTooDeep]);

    let query = nested_chains(3, 4);
    let options = ParseOptions {
        max_depth: 10,
        ..ParseOptions::default()
    };
    let parsed = parse_with_options(&query, &[], &options).unwrap();
    assert_eq!(parsed.expression.unwrap().depth(), 10);

    let options = ParseOptions {
        max_depth: 9,
        ..ParseOptions::default()
    };
    let err = parse_with_options(&query, &[], &options).unwrap_err();
    assert_eq!(err.codes(), vec![ErrorCode::NestingTooDeep]);
    // The last implicit AND is the first node past the cap.
    assert_eq!(err.errors[0].span(), (query.len() - 1, 1));
}

#[test]
fn test_flat_chain_limit() {
    let at_cap = format!("a{}", " OR a".repeat(DEFAULT_MAX_DEPTH - 1));
    let expression = expr(&at_cap);
    assert_eq!(expression.depth(), DEFAULT_MAX_DEPTH);

    let over = format!("a{}", " OR a".repeat(DEFAULT_MAX_DEPTH));
    let errs = errors(&over, &[]);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code, ErrorCode::NestingTooDeep);
    assert_eq!(errs[0].span(), (2 + 5 * (DEFAULT_MAX_DEPTH - 1), 2));
    assert!(errs[0].message.contains("each AND/OR in a chain adds a level"));
}

#[test]
fn test_input_length_limit() {
    let options = ParseOptions {
        max_input_length: 8,
        ..ParseOptions::default()
    };
    let err = parse_with_options("a b c d e f", &[], &options).unwrap_err();
    assert_eq!(err.codes(), vec![ErrorCode::InputTooLong]);
    assert_eq!(err.errors[0].span(), (8, 3));
}
