use serde_json::json;
use storeql::ast::{Ast, AstNode, NodeKind};
use storeql::containers::Tree;
use storeql::store::{DataStore, Entity, MemoryStore, Record, StoreError};
use storeql::{
    Error, ExecutionError, Interpreter, InterpreterConfig, LexError, ParseError, QueryKind, TokenKind,
};

/// A bare `QUERY ROOT` tree.
fn root_only() -> Ast {
    Tree::new(AstNode::new(NodeKind::Query, "ROOT"))
}

fn store_with(products: usize, orders: usize, stores: usize) -> MemoryStore {
    MemoryStore::new()
        .with_records(Entity::Products, (0..products).map(|i| json!({"id": i, "name": format!("product-{}", i)})))
        .with_records(Entity::Orders, (0..orders).map(|i| json!({"id": i, "status": "pending"})))
        .with_records(Entity::Stores, (0..stores).map(|i| json!({"id": i})))
}

/// Store that fails every call.
struct BrokenStore;

impl DataStore for BrokenStore {
    fn fetch(&self, _entity: Entity, _limit: usize) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn count(&self, _entity: Entity) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

// ============================================================================
// FIND
// ============================================================================

#[test]
fn test_find_backed_entities() {
    let store = store_with(3, 150, 0);

    for (query, expected_count, expected_len) in [
        ("FIND products", 3, 3),
        ("FIND orders", 150, 100),
        ("FIND stores", 0, 0),
    ] {
        let result = storeql::execute(query, &store).unwrap();
        assert_eq!(result.kind, QueryKind::Find);
        assert!(result.success, "Failed for: {}", query);
        assert_eq!(result.count, expected_count, "Failed for: {}", query);
        assert_eq!(result.data.len(), expected_len, "Failed for: {}", query);
    }
}

#[test]
fn test_find_message() {
    let store = store_with(2, 0, 0);
    let result = storeql::execute("FIND products WHERE price < 100", &store).unwrap();
    assert_eq!(result.message, "Found 2 products");
}

#[test]
fn test_find_customers_is_empty() {
    let store = store_with(5, 5, 5);
    let result = storeql::execute("FIND customers", &store).unwrap();
    assert!(result.success);
    assert!(result.data.is_empty());
    assert_eq!(result.count, 0);
    assert_eq!(result.message, "Found 0 customers");
}

#[test]
fn test_unknown_and_differently_cased_entities_are_empty() {
    let store = store_with(5, 5, 5);
    for query in ["FIND users", "FIND Products", "SELECT * FROM PRODUCTS"] {
        let result = storeql::execute(query, &store).unwrap();
        assert!(result.success, "Failed for: {}", query);
        assert_eq!(result.count, 0, "Failed for: {}", query);
        assert!(result.data.is_empty(), "Failed for: {}", query);
    }
}

// ============================================================================
// SELECT
// ============================================================================

#[test]
fn test_select_star_returns_whole_records() {
    let store = store_with(2, 0, 0);
    let result = storeql::execute("SELECT * FROM products", &store).unwrap();
    assert_eq!(result.kind, QueryKind::Select);
    assert_eq!(result.message, "Selected 2 records FROM products");
    assert_eq!(result.data[1], json!({"id": 1, "name": "product-1"}));
}

#[test]
fn test_select_field_projects_records() {
    let store = store_with(2, 0, 0);
    let result = storeql::execute("SELECT name FROM products", &store).unwrap();
    assert_eq!(
        result.data,
        vec![json!({"name": "product-0"}), json!({"name": "product-1"})]
    );
}

#[test]
fn test_select_nested_field() {
    let store = MemoryStore::from_json(
        r#"{"stores": [{"owner": {"email": "a@example.com"}}, {"owner": {}}]}"#,
    )
    .unwrap();
    let result = storeql::execute("SELECT owner.email FROM stores", &store).unwrap();
    assert_eq!(
        result.data,
        vec![
            json!({"owner": {"email": "a@example.com"}}),
            json!({"owner": {"email": null}}),
        ]
    );
}

#[test]
fn test_clauses_are_not_applied() {
    let store = store_with(5, 0, 0);
    let result = storeql::execute("SELECT * FROM products WHERE id > 3 ORDER BY id DESC LIMIT 1", &store).unwrap();
    // LIMIT, WHERE and ORDER BY are parsed only
    assert_eq!(result.data.len(), 5);
    assert_eq!(result.data[0]["id"], 0);
}

#[test]
fn test_fetch_limit_config() {
    let store = store_with(10, 0, 0);
    let config = InterpreterConfig { fetch_limit: 4 };
    let result = storeql::execute_with_config("FIND products", &store, config).unwrap();
    assert_eq!(result.data.len(), 4);
    assert_eq!(result.count, 10);
}

// ============================================================================
// UPDATE / ANALYZE
// ============================================================================

#[test]
fn test_update_is_acknowledged_only() {
    let store = store_with(3, 0, 0);
    let result = storeql::execute("UPDATE products SET price = 1 CONCURRENT 4", &store).unwrap();
    assert_eq!(result.kind, QueryKind::Update);
    assert!(result.success);
    assert!(result.data.is_empty());
    assert_eq!(result.count, 0);
    assert_eq!(result.message, "Executed UPDATE products");
}

#[test]
fn test_analyze_is_acknowledged_only() {
    let result = storeql::execute("ANALYZE orders GROUP BY status", &BrokenStore).unwrap();
    assert_eq!(result.kind, QueryKind::Analyze);
    assert_eq!(result.message, "Executed ANALYZE orders");
}

#[test]
fn test_result_json() {
    let store = store_with(1, 0, 0);
    let result = storeql::execute("FIND products", &store).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        json!({
            "type": "FIND",
            "data": [{"id": 0, "name": "product-0"}],
            "count": 1,
            "success": true,
            "message": "Found 1 products"
        })
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_store_errors_propagate() {
    let err = storeql::execute("FIND products", &BrokenStore).unwrap_err();
    assert!(matches!(err, Error::Execution(ExecutionError::Store(_))));
    assert_eq!(
        err.to_string(),
        "execution failed: data store error: store unavailable: connection refused"
    );
}

#[test]
fn test_unbacked_entities_skip_the_store() {
    let result = storeql::execute("FIND customers", &BrokenStore).unwrap();
    assert_eq!(result.count, 0);
}

#[test]
fn test_lex_error_prefix() {
    let store = MemoryStore::new();
    let err = storeql::execute("FIND 'products", &store).unwrap_err();
    assert!(matches!(err, Error::Lex(LexError::UnterminatedString(_))));
    assert!(err.to_string().starts_with("lexical analysis failed: "));
}

#[test]
fn test_lex_error_after_complete_statement() {
    // The statement parses, but the trailing character is still a lexical error
    let err = storeql::validate("FIND products #").unwrap_err();
    assert!(matches!(err, Error::Lex(LexError::UnexpectedChar { .. })));
}

#[test]
fn test_parse_error_prefix() {
    let store = MemoryStore::new();
    let err = storeql::execute("SELECT FROM", &store).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Expected { .. })));
    assert!(err.to_string().starts_with("parsing failed: "));
}

// ============================================================================
// Hand-Built Trees
// ============================================================================

#[test]
fn test_execute_empty_tree() {
    let store = store_with(1, 0, 0);
    let err = Interpreter::new(&store).execute(&root_only()).unwrap_err();
    assert!(matches!(err, ExecutionError::EmptyAst));
    assert_eq!(err.to_string(), "empty AST");
}

#[test]
fn test_execute_non_statement_child() {
    let store = store_with(1, 0, 0);
    let mut ast = root_only();
    let root = ast.root();
    ast.insert(root, AstNode::new(NodeKind::Where, "WHERE")).unwrap();

    let err = Interpreter::new(&store).execute(&ast).unwrap_err();
    assert!(matches!(err, ExecutionError::UnknownStatement(NodeKind::Where)));
    assert_eq!(err.to_string(), "unknown statement type: WHERE");
}

#[test]
fn test_execute_statement_without_entity() {
    let store = store_with(1, 0, 0);

    let mut ast = root_only();
    let root = ast.root();
    ast.insert(root, AstNode::new(NodeKind::Find, "FIND")).unwrap();
    let err = Interpreter::new(&store).execute(&ast).unwrap_err();
    assert!(matches!(err, ExecutionError::MissingEntity(NodeKind::Find)));

    // A WHERE node in the entity slot is not an entity
    let mut ast = root_only();
    let root = ast.root();
    let update = ast.insert(root, AstNode::new(NodeKind::Update, "UPDATE")).unwrap();
    ast.insert(update, AstNode::new(NodeKind::Where, "WHERE")).unwrap();
    let err = Interpreter::new(&store).execute(&ast).unwrap_err();
    assert!(matches!(err, ExecutionError::MissingEntity(NodeKind::Update)));
}

#[test]
fn test_execute_select_without_source() {
    let store = store_with(1, 0, 0);
    let mut ast = root_only();
    let root = ast.root();
    let select = ast.insert(root, AstNode::new(NodeKind::Select, "SELECT")).unwrap();
    ast.insert(select, AstNode::new(NodeKind::Field, "*")).unwrap();

    let err = Interpreter::new(&store).execute(&ast).unwrap_err();
    assert!(matches!(err, ExecutionError::MissingEntity(NodeKind::Select)));
    assert_eq!(err.to_string(), "SELECT statement has no entity");
}

#[test]
fn test_execute_hand_built_find() {
    let store = store_with(2, 0, 0);
    let mut ast = root_only();
    let root = ast.root();
    let find = ast.insert(root, AstNode::new(NodeKind::Find, "FIND")).unwrap();
    ast.insert(find, AstNode::new(NodeKind::Field, "products")).unwrap();

    let result = Interpreter::new(&store).execute(&ast).unwrap();
    assert_eq!(result.count, 2);
}

// ============================================================================
// Validate / Tokenize
// ============================================================================

#[test]
fn test_validate() {
    assert!(storeql::validate("SELECT * FROM products").is_ok());
    assert!(storeql::validate("FIND orders WHERE status = 'pending' ORDER BY created_at DESC").is_ok());
    assert!(storeql::validate("UPDATE products SET price = 9.99 WHERE id = 1").is_ok());
    assert!(storeql::validate("ANALYZE orders GROUP BY status").is_ok());

    assert!(matches!(storeql::validate("SELECT FROM"), Err(Error::Parse(_))));
    assert!(matches!(storeql::validate(""), Err(Error::Parse(ParseError::EmptyInput))));
}

#[test]
fn test_validate_is_idempotent() {
    for query in ["FIND products", "SELECT FROM", "FIND 'x"] {
        let first = storeql::validate(query).map_err(|e| e.to_string());
        let second = storeql::validate(query).map_err(|e| e.to_string());
        assert_eq!(first, second, "Failed for: {}", query);
    }
}

#[test]
fn test_tokenize_never_fails() {
    let tokens = storeql::tokenize("FIND 'oops");
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);

    let tokens = storeql::tokenize("FIND products");
    assert_eq!(tokens.len(), 3);
    assert_eq!(storeql::tokenize("FIND products"), tokens);
}

#[test]
fn test_parse_entry_point() {
    let ast = storeql::parse("FIND products").unwrap();
    assert_eq!(ast.len(), 3);
    assert_eq!(ast.height(), 2);
}
