use pretty_assertions::assert_eq;
use searchql::{parse, serialize, FieldSchema};

const CORPUS: &[&str] = &[
    "laptop",
    r#""red shoes""#,
    "a b c",
    "a OR b AND c",
    "(a OR b) c",
    "NOT a",
    "NOT (a OR b) c",
    "prog*",
    r#""red sh"*"#,
    "title:foo AND status:active",
    r#"title:"big deal""#,
    "price:>=10",
    "price:> 10 price:<=20 price:<30",
    "price:10..50",
    "created:2024-01-01..2024-12-31",
    r#"category:IN(a,b,"c d")"#,
    "category:in ( x , y )",
    r#"path:"C:\\temp" OR name:"say \"hi\"""#,
    r#"title:"AND" "or" "NOT""#,
    r#""a:b" "x..y" "1." "(paren)""#,
    "state:in",
    "-5 +3 1.5 2024-01-01",
    "über title:naïve",
    "((((deep))))",
    "a AND NOT NOT b OR c d OR e",
];

#[test]
fn test_serialize_reparse_is_stable() {
    for input in CORPUS {
        let first = parse(input, &[])
            .unwrap_or_else(|e| panic!("{}: {}", input, e))
            .expression
            .unwrap();
        let text = serialize(&first);
        let second = parse(&text, &[])
            .unwrap_or_else(|e| panic!("{} -> {}: {}", input, text, e))
            .expression
            .unwrap();
        assert_eq!(second, first, "{} -> {}", input, text);
        assert_eq!(serialize(&second), text, "{}", input);
    }
}

#[test]
fn test_roundtrip_with_schema() {
    let schemas = [
        FieldSchema::number("price"),
        FieldSchema::date("created"),
        FieldSchema::boolean("active"),
    ];
    let input = "shoes Price:10..50 NOT active:FALSE created:>=2024-02-29";
    let first = parse(input, &schemas).unwrap().expression.unwrap();
    let second = parse(&first.to_string(), &schemas).unwrap().expression.unwrap();
    assert_eq!(second, first);
}

#[test]
fn test_canonical_forms() {
    let cases = [
        ("a b OR c", "((a AND b) OR c)"),
        ("NOT (a)", "NOT (a)"),
        ("x:IN( 1 , 2 )", "x:IN(1,2)"),
        ("price:>= 5", "price:>=5"),
        (r#""plain""#, "plain"),
    ];
    for (input, expected) in cases {
        let expr = parse(input, &[]).unwrap().expression.unwrap();
        assert_eq!(serialize(&expr), expected);
    }
}
