use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Ast, AstNode, NodeKind, Token, TokenKind},
    containers::{ContainerError, NodeId, Tree},
    value::Value,
};

/// Keywords that end a skipped WHERE condition.
const CLAUSE_KEYWORDS: &[&str] = &["ORDER", "LIMIT", "GROUP", "CONCURRENT"];

/// Errors raised while building the AST.
///
/// Parsing stops at the first error; no partial tree is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No tokens, or nothing but end of input
    #[error("empty query")]
    EmptyInput,

    /// The query does not start with SELECT, FIND, UPDATE, or ANALYZE
    #[error("unexpected {found} at line {line}, column {column}: expected SELECT, FIND, UPDATE, or ANALYZE")]
    UnexpectedStatement {
        found: String,
        line: usize,
        column: usize,
    },

    /// A required token is missing
    #[error("expected {expected}, got {found} at line {line}, column {column}")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
        column: usize,
    },

    /// Syntax the grammar describes but the parser does not accept yet
    #[error("{feature} are not supported (line {line}, column {column})")]
    Unsupported {
        feature: &'static str,
        line: usize,
        column: usize,
    },

    #[error(transparent)]
    Tree(#[from] ContainerError),
}

/// Recursive-descent parser over a token vector.
///
/// The cursor only moves forward: each statement keyword selects exactly one
/// production, so no backtracking is needed.
///
/// # Examples
///
/// ```
/// use storeql::{Lexer, NodeKind, Parser};
///
/// let tokens = Lexer::new("SELECT * FROM products LIMIT 5").tokenize();
/// let ast = Parser::new(tokens).parse().unwrap();
///
/// let (_, statement) = ast.statement().unwrap();
/// assert_eq!(statement.kind, NodeKind::Select);
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = match tokens.last() {
            Some(last) => Token::new(TokenKind::Eof, "", last.line, last.column),
            None => Token::new(TokenKind::Eof, "", 1, 1),
        };
        Parser {
            tokens,
            position: 0,
            eof,
        }
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Not at EOF, an Error token, or past the end.
    fn has_more(&self) -> bool {
        !self.current_token().is_terminal()
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.current_token().is_keyword(keyword)
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_token().kind == kind
    }

    fn error_expected(&self, expected: &'static str) -> ParseError {
        let token = self.current_token();
        ParseError::Expected {
            expected,
            found: token.to_string(),
            line: token.line,
            column: token.column,
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        if !self.check_keyword(keyword) {
            return Err(self.error_expected(keyword));
        }
        self.advance();
        Ok(())
    }

    fn add(&self, tree: &mut Ast, parent: NodeId, node: AstNode) -> Result<NodeId, ParseError> {
        Ok(tree.insert(parent, node)?)
    }

    /// Parse a complete query into a tree rooted at `QUERY ROOT`.
    ///
    /// Tokens following a complete statement are ignored.
    pub fn parse(mut self) -> Result<Ast, ParseError> {
        if self.tokens.is_empty() || self.check_kind(TokenKind::Eof) {
            return Err(ParseError::EmptyInput);
        }

        let mut tree = Tree::new(AstNode::new(NodeKind::Query, "ROOT"));
        let root = tree.root();

        if !self.check_kind(TokenKind::Keyword) {
            return Err(self.unexpected_statement());
        }

        let keyword = self.current_token().text.clone();
        match keyword.as_str() {
            "SELECT" => self.parse_select(&mut tree, root)?,
            "FIND" => self.parse_find(&mut tree, root)?,
            "UPDATE" => self.parse_update(&mut tree, root)?,
            "ANALYZE" => self.parse_analyze(&mut tree, root)?,
            _ => return Err(self.unexpected_statement()),
        }

        if self.has_more() {
            debug!(
                ignored = %self.current_token(),
                "trailing tokens after statement"
            );
        }
        debug!(nodes = tree.len(), height = tree.height(), "parsed query");
        Ok(tree)
    }

    fn unexpected_statement(&self) -> ParseError {
        let token = self.current_token();
        ParseError::UnexpectedStatement {
            found: token.to_string(),
            line: token.line,
            column: token.column,
        }
    }

    // ========================================
    // Statements
    // ========================================

    fn parse_select(&mut self, tree: &mut Ast, root: NodeId) -> Result<(), ParseError> {
        let select = self.add(tree, root, AstNode::new(NodeKind::Select, "SELECT"))?;
        self.advance(); // consume SELECT

        self.parse_field_list(tree, select)?;
        self.expect_keyword("FROM")?;
        self.parse_source(tree, select, "source name")?;

        if self.check_keyword("WHERE") {
            self.parse_where(tree, select)?;
        }
        if self.check_keyword("ORDER") {
            self.parse_order_by(tree, select)?;
        }
        if self.check_keyword("LIMIT") {
            self.parse_limit(tree, select)?;
        }
        Ok(())
    }

    fn parse_find(&mut self, tree: &mut Ast, root: NodeId) -> Result<(), ParseError> {
        let find = self.add(tree, root, AstNode::new(NodeKind::Find, "FIND"))?;
        self.advance(); // consume FIND

        self.parse_source(tree, find, "entity name")?;

        if self.check_keyword("WHERE") {
            self.parse_where(tree, find)?;
        }
        if self.check_keyword("ORDER") {
            self.parse_order_by(tree, find)?;
        }
        Ok(())
    }

    fn parse_update(&mut self, tree: &mut Ast, root: NodeId) -> Result<(), ParseError> {
        self.advance(); // consume UPDATE
        let entity = self.parse_entity()?;
        self.expect_keyword("SET")?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.check_kind(TokenKind::Comma) {
            self.advance();
            assignments.push(self.parse_assignment()?);
        }

        let has_where = self.check_keyword("WHERE");
        if has_where {
            self.skip_condition();
        }

        let mut node = AstNode::new(NodeKind::Update, "UPDATE");
        if self.check_keyword("CONCURRENT") {
            self.advance();
            let workers = if self.check_kind(TokenKind::Number) {
                let value = self.number_value();
                self.advance();
                value
            } else {
                Value::Number(1.into())
            };
            node = node.with_meta("concurrent", workers);
        }

        let update = self.add(tree, root, node)?;
        self.add(tree, update, AstNode::new(NodeKind::Field, entity))?;
        for (field, value) in assignments {
            let assignment = self.add(tree, update, AstNode::new(NodeKind::Assignment, "="))?;
            self.add(tree, assignment, AstNode::new(NodeKind::Field, field))?;
            let text = value.to_string();
            self.add(
                tree,
                assignment,
                AstNode::new(NodeKind::Value, text).with_meta("value", value),
            )?;
        }
        if has_where {
            self.add(tree, update, AstNode::new(NodeKind::Where, "WHERE"))?;
        }
        Ok(())
    }

    fn parse_analyze(&mut self, tree: &mut Ast, root: NodeId) -> Result<(), ParseError> {
        self.advance(); // consume ANALYZE
        let entity = self.parse_entity()?;

        let analyze = self.add(tree, root, AstNode::new(NodeKind::Analyze, "ANALYZE"))?;
        self.add(tree, analyze, AstNode::new(NodeKind::Field, entity))?;

        if self.check_keyword("WHERE") {
            self.parse_where(tree, analyze)?;
        }
        if self.check_keyword("GROUP") {
            self.advance(); // consume GROUP
            self.expect_keyword("BY")?;
            let field = self.parse_field("field after GROUP BY")?;
            let group = self.add(tree, analyze, AstNode::new(NodeKind::GroupBy, "GROUP_BY"))?;
            self.add(tree, group, AstNode::new(NodeKind::Field, field))?;
        }
        Ok(())
    }

    // ========================================
    // Pieces
    // ========================================

    /// `*` or a single field. A comma after the field is rejected: multi-field
    /// lists are in the grammar but not implemented.
    fn parse_field_list(&mut self, tree: &mut Ast, parent: NodeId) -> Result<(), ParseError> {
        let field = if self.check_kind(TokenKind::Asterisk) {
            self.advance();
            "*".to_string()
        } else if self.check_kind(TokenKind::Identifier) {
            self.parse_field("field list")?
        } else {
            return Err(self.error_expected("field list ('*' or a field name)"));
        };

        if self.check_kind(TokenKind::Comma) {
            let token = self.current_token();
            return Err(ParseError::Unsupported {
                feature: "multi-field SELECT lists",
                line: token.line,
                column: token.column,
            });
        }

        self.add(tree, parent, AstNode::new(NodeKind::Field, field))?;
        Ok(())
    }

    /// SELECT sources and FIND entities accept identifiers and keywords.
    fn parse_source(
        &mut self,
        tree: &mut Ast,
        parent: NodeId,
        expected: &'static str,
    ) -> Result<(), ParseError> {
        if !matches!(
            self.current_token().kind,
            TokenKind::Identifier | TokenKind::Keyword
        ) {
            return Err(self.error_expected(expected));
        }
        let name = self.current_token().text.clone();
        self.advance();
        self.add(tree, parent, AstNode::new(NodeKind::Field, name))?;
        Ok(())
    }

    /// UPDATE and ANALYZE entities must be plain identifiers.
    fn parse_entity(&mut self) -> Result<String, ParseError> {
        if !self.check_kind(TokenKind::Identifier) {
            return Err(self.error_expected("entity name"));
        }
        let name = self.current_token().text.clone();
        self.advance();
        Ok(name)
    }

    /// `identifier` or `identifier.identifier`
    fn parse_field(&mut self, expected: &'static str) -> Result<String, ParseError> {
        if !self.check_kind(TokenKind::Identifier) {
            return Err(self.error_expected(expected));
        }
        let mut name = self.current_token().text.clone();
        self.advance();

        if self.check_kind(TokenKind::Dot) {
            self.advance(); // consume '.'
            if !self.check_kind(TokenKind::Identifier) {
                return Err(self.error_expected("identifier after '.'"));
            }
            name.push('.');
            name.push_str(&self.current_token().text);
            self.advance();
        }
        Ok(name)
    }

    fn parse_assignment(&mut self) -> Result<(String, Value), ParseError> {
        let field = self.parse_field("assignment (field = value)")?;

        let token = self.current_token();
        if token.kind != TokenKind::Operator || token.text != "=" {
            return Err(self.error_expected("'=' in assignment"));
        }
        self.advance();

        let value = self.parse_value()?;
        Ok((field, value))
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.current_token();
        let value = match token.kind {
            TokenKind::String => Value::String(token.text.clone()),
            TokenKind::Number => self.number_value(),
            TokenKind::Keyword if token.text == "TRUE" => Value::Boolean(true),
            TokenKind::Keyword if token.text == "FALSE" => Value::Boolean(false),
            TokenKind::Keyword if token.text == "NULL" => Value::Null,
            _ => return Err(self.error_expected("value (string, number, TRUE, FALSE, or NULL)")),
        };
        self.advance();
        Ok(value)
    }

    /// Current Number token as a decimal. Literals outside the decimal range
    /// keep their source text.
    fn number_value(&self) -> Value {
        let text = &self.current_token().text;
        Value::parse_number(text).unwrap_or_else(|| Value::String(text.clone()))
    }

    // ========================================
    // Clauses
    // ========================================

    /// Attach an empty WHERE node and skip the condition up to the next
    /// clause keyword. Never fails, whatever the condition text looks like.
    fn parse_where(&mut self, tree: &mut Ast, parent: NodeId) -> Result<(), ParseError> {
        self.skip_condition();
        self.add(tree, parent, AstNode::new(NodeKind::Where, "WHERE"))?;
        Ok(())
    }

    fn skip_condition(&mut self) {
        self.advance(); // consume WHERE
        while self.has_more()
            && !CLAUSE_KEYWORDS
                .iter()
                .any(|keyword| self.check_keyword(keyword))
        {
            self.advance();
        }
    }

    fn parse_order_by(&mut self, tree: &mut Ast, parent: NodeId) -> Result<(), ParseError> {
        self.advance(); // consume ORDER
        self.expect_keyword("BY")?;
        let field = self.parse_field("field after ORDER BY")?;

        let direction = if self.check_keyword("ASC") || self.check_keyword("DESC") {
            let direction = self.current_token().text.clone();
            self.advance();
            direction
        } else {
            "ASC".to_string()
        };

        let order = self.add(
            tree,
            parent,
            AstNode::new(NodeKind::OrderBy, "ORDER_BY").with_meta("direction", Value::String(direction)),
        )?;
        self.add(tree, order, AstNode::new(NodeKind::Field, field))?;
        Ok(())
    }

    fn parse_limit(&mut self, tree: &mut Ast, parent: NodeId) -> Result<(), ParseError> {
        self.advance(); // consume LIMIT
        if !self.check_kind(TokenKind::Number) {
            return Err(self.error_expected("number after LIMIT"));
        }

        let count = self.number_value();
        let text = self.current_token().text.clone();
        self.advance();

        self.add(
            tree,
            parent,
            AstNode::new(NodeKind::Limit, text).with_meta("count", count),
        )?;
        Ok(())
    }
}
