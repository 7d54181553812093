use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Ast, AstNode, NodeKind},
    containers::NodeId,
    store::{DataStore, Entity, Record, StoreError},
};

/// Default number of records fetched per query.
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Upper bound on the records returned by SELECT and FIND
    pub fetch_limit: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

/// Statement kind reported in a [`QueryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryKind {
    Select,
    Find,
    Update,
    Analyze,
}

impl QueryKind {
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Find => "FIND",
            QueryKind::Update => "UPDATE",
            QueryKind::Analyze => "ANALYZE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one executed query.
///
/// `count` is the size of the whole collection, not of `data`: `data` is
/// capped by [`InterpreterConfig::fetch_limit`] while `count` is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(rename = "type")]
    pub kind: QueryKind,
    pub data: Vec<Record>,
    pub count: u64,
    pub success: bool,
    pub message: String,
}

impl QueryResult {
    fn acknowledged(kind: QueryKind, entity: &str) -> Self {
        QueryResult {
            kind,
            data: Vec::new(),
            count: 0,
            success: true,
            message: format!("Executed {} {}", kind, entity),
        }
    }
}

/// Errors that can occur while executing a parsed query.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The root has no statement
    #[error("empty AST")]
    EmptyAst,

    /// The root's first child is not SELECT, FIND, UPDATE, or ANALYZE
    #[error("unknown statement type: {0}")]
    UnknownStatement(NodeKind),

    /// The statement carries no entity or source name
    #[error("{0} statement has no entity")]
    MissingEntity(NodeKind),

    #[error("data store error: {0}")]
    Store(#[from] StoreError),
}

/// Tree-walking executor for parsed StoreQL queries.
///
/// Only the statement kind, the entity, and the SELECT field are read from
/// the tree. WHERE, ORDER BY, LIMIT, and GROUP BY nodes are carried through
/// parsing but not applied here.
pub struct Interpreter<'a> {
    store: &'a dyn DataStore,
    config: InterpreterConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self::with_config(store, InterpreterConfig::default())
    }

    pub fn with_config(store: &'a dyn DataStore, config: InterpreterConfig) -> Self {
        Interpreter { store, config }
    }

    /// Executes a parsed query against the store.
    ///
    /// # Arguments
    ///
    /// * `ast` - Tree produced by [`Parser::parse`](crate::Parser::parse)
    ///
    /// # Returns
    ///
    /// A successful [`QueryResult`], or an [`ExecutionError`] for a malformed
    /// tree or a failing store. Unknown entity names are not errors: they
    /// yield no data and a count of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use storeql::{Interpreter, Lexer, Parser};
    /// use storeql::store::MemoryStore;
    ///
    /// let store = MemoryStore::from_json(r#"{"orders": [{"id": 1}, {"id": 2}]}"#).unwrap();
    /// let ast = Parser::new(Lexer::new("FIND orders").tokenize()).parse().unwrap();
    ///
    /// let result = Interpreter::new(&store).execute(&ast).unwrap();
    /// assert_eq!(result.count, 2);
    /// assert_eq!(result.message, "Found 2 orders");
    /// ```
    pub fn execute(&self, ast: &Ast) -> Result<QueryResult, ExecutionError> {
        let (id, statement) = ast.statement().ok_or(ExecutionError::EmptyAst)?;

        let result = match statement.kind {
            NodeKind::Select => self.execute_select(ast, id)?,
            NodeKind::Find => self.execute_find(ast, id)?,
            NodeKind::Update => {
                let entity = leading_field(ast, id, NodeKind::Update)?;
                QueryResult::acknowledged(QueryKind::Update, entity)
            }
            NodeKind::Analyze => {
                let entity = leading_field(ast, id, NodeKind::Analyze)?;
                QueryResult::acknowledged(QueryKind::Analyze, entity)
            }
            other => return Err(ExecutionError::UnknownStatement(other)),
        };

        debug!(
            kind = %result.kind,
            count = result.count,
            returned = result.data.len(),
            "executed query"
        );
        Ok(result)
    }

    fn execute_select(&self, ast: &Ast, id: NodeId) -> Result<QueryResult, ExecutionError> {
        let mut fields = ast.children_of_kind(id, NodeKind::Field);
        let field = fields.next().map(|(_, node)| node.text.as_str());
        let source = fields
            .next()
            .map(|(_, node)| node.text.as_str())
            .ok_or(ExecutionError::MissingEntity(NodeKind::Select))?;

        let (records, count) = self.load(source)?;
        let data = match field {
            Some("*") | None => records,
            Some(path) => records.iter().map(|record| project(record, path)).collect(),
        };

        Ok(QueryResult {
            kind: QueryKind::Select,
            data,
            count,
            success: true,
            message: format!("Selected {} records FROM {}", count, source),
        })
    }

    fn execute_find(&self, ast: &Ast, id: NodeId) -> Result<QueryResult, ExecutionError> {
        let entity = leading_field(ast, id, NodeKind::Find)?;
        let (data, count) = self.load(entity)?;

        Ok(QueryResult {
            kind: QueryKind::Find,
            data,
            count,
            success: true,
            message: format!("Found {} {}", count, entity),
        })
    }

    /// Records and total count for a named collection. Names without a
    /// backing collection load as empty.
    fn load(&self, name: &str) -> Result<(Vec<Record>, u64), ExecutionError> {
        let Some(entity) = Entity::from_name(name).filter(Entity::is_backed) else {
            debug!(entity = name, "no backing collection");
            return Ok((Vec::new(), 0));
        };

        let records = self.store.fetch(entity, self.config.fetch_limit)?;
        let count = self.store.count(entity)?;
        debug!(%entity, fetched = records.len(), count, "store fetch");
        Ok((records, count))
    }
}

fn leading_field(ast: &Ast, id: NodeId, kind: NodeKind) -> Result<&str, ExecutionError> {
    match ast.children(id).next() {
        Some((_, AstNode { kind: NodeKind::Field, text, .. })) => Ok(text.as_str()),
        _ => Err(ExecutionError::MissingEntity(kind)),
    }
}

/// Reduce `record` to the field at a dotted path, keeping the record shape:
/// `supplier.name` becomes `{"supplier": {"name": ...}}`. A missing field
/// is kept as `null`.
fn project(record: &Record, path: &str) -> Record {
    let value = path
        .split('.')
        .try_fold(record, |current, key| current.get(key))
        .cloned()
        .unwrap_or(Record::Null);

    path.rsplit('.').fold(value, |inner, key| {
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), inner);
        Record::Object(object)
    })
}
