// tests/parser_tests.rs

use storeql::ast::{Ast, AstNode, NodeKind};
use storeql::lexer::Lexer;
use storeql::parser::{ParseError, Parser};
use storeql::Value;

fn parse(query: &str) -> Result<Ast, ParseError> {
    Parser::new(Lexer::new(query).tokenize()).parse()
}

/// (kind, text) of each direct child of the statement node.
fn statement_children(ast: &Ast) -> Vec<(NodeKind, String)> {
    let (id, _) = ast.statement().unwrap();
    ast.children(id)
        .map(|(_, node)| (node.kind, node.text.clone()))
        .collect()
}

fn child_of_kind<'a>(ast: &'a Ast, kind: NodeKind) -> (storeql::containers::NodeId, &'a AstNode) {
    let (id, _) = ast.statement().unwrap();
    ast.children_of_kind(id, kind).next().unwrap()
}

// ============================================================================
// SELECT
// ============================================================================

#[test]
fn test_select_star() {
    let ast = parse("SELECT * FROM products").unwrap();
    let (_, statement) = ast.statement().unwrap();
    assert_eq!(statement.kind, NodeKind::Select);
    assert_eq!(
        statement_children(&ast),
        vec![
            (NodeKind::Field, "*".to_string()),
            (NodeKind::Field, "products".to_string()),
        ]
    );
}

#[test]
fn test_select_field_and_all_clauses() {
    let ast = parse("SELECT name FROM products WHERE price > 5 AND stock > 0 ORDER BY price DESC LIMIT 10").unwrap();
    let kinds: Vec<NodeKind> = statement_children(&ast).into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Field,
            NodeKind::Field,
            NodeKind::Where,
            NodeKind::OrderBy,
            NodeKind::Limit,
        ]
    );

    let (order_id, order) = child_of_kind(&ast, NodeKind::OrderBy);
    assert_eq!(order.meta("direction"), Some(&Value::String("DESC".to_string())));
    let (_, order_field) = ast.children(order_id).next().unwrap();
    assert_eq!(order_field.text, "price");

    let (_, limit) = child_of_kind(&ast, NodeKind::Limit);
    assert_eq!(limit.text, "10");
    assert_eq!(limit.meta("count").and_then(Value::as_u64), Some(10));
}

#[test]
fn test_select_dotted_field() {
    let ast = parse("SELECT supplier.name FROM products").unwrap();
    assert_eq!(statement_children(&ast)[0].1, "supplier.name");
}

#[test]
fn test_select_source_may_be_keyword() {
    // The source accepts keyword tokens too, e.g. a collection named "order"
    let ast = parse("SELECT * FROM ORDER").unwrap();
    assert_eq!(statement_children(&ast)[1].1, "ORDER");
}

#[test]
fn test_where_is_empty_placeholder() {
    let ast = parse("SELECT * FROM products WHERE (a = 1 OR b IN 'x') LIMIT 3").unwrap();
    let (where_id, _) = child_of_kind(&ast, NodeKind::Where);
    assert_eq!(ast.children(where_id).count(), 0);
    // LIMIT after the skipped condition is still parsed
    let (_, limit) = child_of_kind(&ast, NodeKind::Limit);
    assert_eq!(limit.text, "3");
}

#[test]
fn test_clause_after_skipped_where_is_strict() {
    // The condition is skipped, but the ORDER that ends it must be well formed
    let err = parse("FIND products WHERE a ORDER x").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Expected { expected: "BY", line: 1, column: 29, .. }
    ));

    let err = parse("SELECT * FROM products WHERE a = 1 LIMIT").unwrap_err();
    assert!(matches!(err, ParseError::Expected { expected: "number after LIMIT", .. }));
}

#[test]
fn test_order_by_defaults_to_asc() {
    let ast = parse("SELECT * FROM orders ORDER BY created_at").unwrap();
    let (_, order) = child_of_kind(&ast, NodeKind::OrderBy);
    assert_eq!(order.meta("direction"), Some(&Value::String("ASC".to_string())));
}

// ============================================================================
// SELECT Errors
// ============================================================================

#[test]
fn test_select_missing_field() {
    let err = parse("SELECT FROM").unwrap_err();
    assert!(matches!(err, ParseError::Expected { line: 1, column: 8, .. }));
}

#[test]
fn test_select_missing_from() {
    let err = parse("SELECT * products").unwrap_err();
    assert!(matches!(err, ParseError::Expected { expected: "FROM", .. }));
}

#[test]
fn test_select_truncated_after_fields() {
    let err = parse("SELECT *").unwrap_err();
    match err {
        ParseError::Expected { found, .. } => assert_eq!(found, "end of input"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_multi_field_select_is_unsupported() {
    let err = parse("SELECT name, price FROM products").unwrap_err();
    assert!(matches!(err, ParseError::Unsupported { line: 1, column: 12, .. }));
}

#[test]
fn test_limit_requires_number() {
    let err = parse("SELECT * FROM products LIMIT ten").unwrap_err();
    assert!(matches!(err, ParseError::Expected { expected: "number after LIMIT", .. }));
}

#[test]
fn test_order_requires_by() {
    let err = parse("FIND orders ORDER price").unwrap_err();
    assert!(matches!(err, ParseError::Expected { expected: "BY", .. }));
}

#[test]
fn test_oversized_limit_keeps_text() {
    let digits = "99999999999999999999999999999999999";
    let ast = parse(&format!("SELECT * FROM products LIMIT {}", digits)).unwrap();
    let (_, limit) = child_of_kind(&ast, NodeKind::Limit);
    assert_eq!(limit.text, digits);
    assert_eq!(limit.meta("count"), Some(&Value::String(digits.to_string())));
}

#[test]
fn test_oversized_numbers_elsewhere_parse() {
    let ast = parse("UPDATE orders SET total = 100000000000000000000000000000 CONCURRENT 100000000000000000000000000000").unwrap();
    let (_, update) = ast.statement().unwrap();
    assert_eq!(
        update.meta("concurrent"),
        Some(&Value::String("100000000000000000000000000000".to_string()))
    );
}

// ============================================================================
// FIND
// ============================================================================

#[test]
fn test_find() {
    let ast = parse("FIND stores").unwrap();
    let (_, statement) = ast.statement().unwrap();
    assert_eq!(statement.kind, NodeKind::Find);
    assert_eq!(statement_children(&ast), vec![(NodeKind::Field, "stores".to_string())]);
}

#[test]
fn test_find_where_order() {
    let ast = parse("find orders where status = 'pending' order by total asc").unwrap();
    let kinds: Vec<NodeKind> = statement_children(&ast).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![NodeKind::Field, NodeKind::Where, NodeKind::OrderBy]);
}

#[test]
fn test_find_requires_entity() {
    let err = parse("FIND").unwrap_err();
    assert!(matches!(err, ParseError::Expected { expected: "entity name", .. }));
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_update_assignments() {
    let ast = parse("UPDATE products SET price = 9.99, name = 'Mug', active = TRUE, note = NULL").unwrap();
    let (update_id, update) = ast.statement().unwrap();
    assert_eq!(update.kind, NodeKind::Update);
    assert!(update.meta("concurrent").is_none());

    let children = statement_children(&ast);
    assert_eq!(children[0], (NodeKind::Field, "products".to_string()));

    let values: Vec<Value> = ast
        .children_of_kind(update_id, NodeKind::Assignment)
        .map(|(assignment, _)| {
            let mut parts = ast.children(assignment);
            let (_, field) = parts.next().unwrap();
            let (_, value) = parts.next().unwrap();
            assert_eq!(field.kind, NodeKind::Field);
            assert_eq!(value.kind, NodeKind::Value);
            value.meta("value").unwrap().clone()
        })
        .collect();

    assert_eq!(values.len(), 4);
    assert_eq!(values[0], Value::parse_number("9.99").unwrap());
    assert_eq!(values[1], Value::String("Mug".to_string()));
    assert_eq!(values[2], Value::Boolean(true));
    assert_eq!(values[3], Value::Null);
}

#[test]
fn test_update_concurrent() {
    let ast = parse("UPDATE orders SET status = 'shipped' WHERE id = 3 CONCURRENT 8").unwrap();
    let (_, update) = ast.statement().unwrap();
    assert_eq!(update.meta("concurrent").and_then(Value::as_u64), Some(8));

    let kinds: Vec<NodeKind> = statement_children(&ast).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![NodeKind::Field, NodeKind::Assignment, NodeKind::Where]);
}

#[test]
fn test_update_concurrent_defaults_to_one() {
    let ast = parse("UPDATE orders SET status = 'x' CONCURRENT").unwrap();
    let (_, update) = ast.statement().unwrap();
    assert_eq!(update.meta("concurrent").and_then(Value::as_u64), Some(1));
}

#[test]
fn test_update_errors() {
    assert!(matches!(
        parse("UPDATE products price = 1").unwrap_err(),
        ParseError::Expected { expected: "SET", .. }
    ));
    assert!(matches!(
        parse("UPDATE products SET").unwrap_err(),
        ParseError::Expected { .. }
    ));
    assert!(matches!(
        parse("UPDATE products SET price 1").unwrap_err(),
        ParseError::Expected { expected: "'=' in assignment", .. }
    ));
    assert!(matches!(
        parse("UPDATE products SET price = price").unwrap_err(),
        ParseError::Expected { .. }
    ));
    // UPDATE needs a plain identifier, keywords are rejected
    assert!(matches!(
        parse("UPDATE ORDER SET a = 1").unwrap_err(),
        ParseError::Expected { expected: "entity name", .. }
    ));
}

// ============================================================================
// ANALYZE
// ============================================================================

#[test]
fn test_analyze_group_by() {
    let ast = parse("ANALYZE orders GROUP BY status").unwrap();
    let (group_id, group) = child_of_kind(&ast, NodeKind::GroupBy);
    assert_eq!(group.text, "GROUP_BY");
    let (_, field) = ast.children(group_id).next().unwrap();
    assert_eq!(field.text, "status");
}

#[test]
fn test_analyze_plain() {
    let ast = parse("ANALYZE products").unwrap();
    assert_eq!(statement_children(&ast), vec![(NodeKind::Field, "products".to_string())]);
}

#[test]
fn test_analyze_group_requires_field() {
    let err = parse("ANALYZE orders GROUP BY").unwrap_err();
    assert!(matches!(err, ParseError::Expected { .. }));
}

// ============================================================================
// Statement Errors
// ============================================================================

#[test]
fn test_empty_input() {
    assert_eq!(parse("").unwrap_err(), ParseError::EmptyInput);
    assert_eq!(parse("   ").unwrap_err(), ParseError::EmptyInput);
    assert_eq!(Parser::new(Vec::new()).parse().unwrap_err(), ParseError::EmptyInput);
}

#[test]
fn test_unexpected_statement() {
    for query in ["DELETE FROM products", "WHERE a = 1", "42", "products"] {
        let err = parse(query).unwrap_err();
        assert!(
            matches!(err, ParseError::UnexpectedStatement { line: 1, column: 1, .. }),
            "Failed for: {}",
            query
        );
    }
}

#[test]
fn test_trailing_tokens_are_ignored() {
    let ast = parse("FIND products extra tokens here").unwrap();
    assert_eq!(statement_children(&ast).len(), 1);
}

// ============================================================================
// Tree Shape
// ============================================================================

#[test]
fn test_every_node_has_parent_listing_it() {
    let ast = parse("SELECT name FROM products WHERE x = 1 ORDER BY name LIMIT 2").unwrap();
    ast.traverse(|id, _| {
        if id == ast.root() {
            assert!(ast.parent(id).is_none());
        } else {
            let parent = ast.parent(id).unwrap();
            assert!(ast.children(parent).any(|(child, _)| child == id));
        }
    });
}

#[test]
fn test_render() {
    let ast = parse("FIND products WHERE price < 100 ORDER BY price DESC").unwrap();
    assert_eq!(
        ast.render(),
        "QUERY ROOT\n  FIND\n    FIELD products\n    WHERE\n    ORDER_BY [direction=\"DESC\"]\n      FIELD price\n"
    );
}
