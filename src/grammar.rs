//! Formal grammar of StoreQL.
//!
//! The rule table is descriptive: it documents the language for tooling and
//! the `storeql grammar` command. The hand-written parser does not read it.
//!
//! ```text
//! <query>         ::= <select-stmt> | <find-stmt> | <update-stmt> | <analyze-stmt>
//! <select-stmt>   ::= "SELECT" <field-list> "FROM" <source> <where-clause>? <order-clause>? <limit-clause>?
//! <find-stmt>     ::= "FIND" <entity> <where-clause>? <order-clause>?
//! <update-stmt>   ::= "UPDATE" <entity> "SET" <assignment-list> <where-clause>? <concurrent-clause>?
//! <analyze-stmt>  ::= "ANALYZE" <entity> <where-clause>? <group-clause>?
//! <field-list>    ::= <field> | <field> "," <field-list> | "*"
//! <condition>     ::= <comparison> | <condition> <logical-op> <condition> | "(" <condition> ")"
//! ```

use std::sync::LazyLock;

use serde::Serialize;

/// One production: `non_terminal ::= production[0] production[1] ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarRule {
    pub non_terminal: String,
    pub production: Vec<String>,
}

impl GrammarRule {
    fn new(non_terminal: &str, production: &[&str]) -> Self {
        GrammarRule {
            non_terminal: non_terminal.to_string(),
            production: production.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Start symbol plus the ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grammar {
    start_symbol: String,
    rules: Vec<GrammarRule>,
}

static STOREQL_GRAMMAR: LazyLock<Grammar> = LazyLock::new(build_storeql_grammar);

/// The StoreQL grammar, built on first use and shared read-only afterwards.
pub fn grammar() -> &'static Grammar {
    &STOREQL_GRAMMAR
}

fn build_storeql_grammar() -> Grammar {
    let table: &[(&str, &[&str])] = &[
        // Query types
        ("query", &["select-stmt"]),
        ("query", &["find-stmt"]),
        ("query", &["update-stmt"]),
        ("query", &["analyze-stmt"]),
        // SELECT
        ("select-stmt", &["SELECT", "field-list", "FROM", "source"]),
        ("select-stmt", &["SELECT", "field-list", "FROM", "source", "where-clause"]),
        ("select-stmt", &["SELECT", "field-list", "FROM", "source", "where-clause", "order-clause"]),
        ("select-stmt", &["SELECT", "field-list", "FROM", "source", "where-clause", "order-clause", "limit-clause"]),
        // FIND
        ("find-stmt", &["FIND", "entity"]),
        ("find-stmt", &["FIND", "entity", "where-clause"]),
        ("find-stmt", &["FIND", "entity", "where-clause", "order-clause"]),
        // UPDATE
        ("update-stmt", &["UPDATE", "entity", "SET", "assignment-list"]),
        ("update-stmt", &["UPDATE", "entity", "SET", "assignment-list", "where-clause"]),
        ("update-stmt", &["UPDATE", "entity", "SET", "assignment-list", "where-clause", "concurrent-clause"]),
        // ANALYZE
        ("analyze-stmt", &["ANALYZE", "entity"]),
        ("analyze-stmt", &["ANALYZE", "entity", "where-clause"]),
        ("analyze-stmt", &["ANALYZE", "entity", "where-clause", "group-clause"]),
        // Field lists and sources
        ("field-list", &["field"]),
        ("field-list", &["field", ",", "field-list"]),
        ("field-list", &["*"]),
        ("source", &["entity"]),
        ("source", &["store", "string"]),
        ("entity", &["products"]),
        ("entity", &["orders"]),
        ("entity", &["stores"]),
        ("entity", &["customers"]),
        // Clauses
        ("where-clause", &["WHERE", "condition"]),
        ("condition", &["comparison"]),
        ("condition", &["condition", "logical-op", "condition"]),
        ("condition", &["(", "condition", ")"]),
        ("comparison", &["field", "operator", "value"]),
        ("logical-op", &["AND"]),
        ("logical-op", &["OR"]),
        ("order-clause", &["ORDER", "BY", "field"]),
        ("order-clause", &["ORDER", "BY", "field", "direction"]),
        ("direction", &["ASC"]),
        ("direction", &["DESC"]),
        ("limit-clause", &["LIMIT", "number"]),
        ("group-clause", &["GROUP", "BY", "field"]),
        ("concurrent-clause", &["CONCURRENT"]),
        ("concurrent-clause", &["CONCURRENT", "number"]),
        // Assignments
        ("assignment-list", &["assignment"]),
        ("assignment-list", &["assignment", ",", "assignment-list"]),
        ("assignment", &["field", "=", "value"]),
        // Fields and values
        ("field", &["identifier"]),
        ("field", &["identifier", ".", "identifier"]),
        ("value", &["string"]),
        ("value", &["number"]),
        ("value", &["boolean"]),
        ("value", &["NULL"]),
        ("boolean", &["TRUE"]),
        ("boolean", &["FALSE"]),
        // Operators
        ("operator", &["="]),
        ("operator", &["!="]),
        ("operator", &["<"]),
        ("operator", &[">"]),
        ("operator", &["<="]),
        ("operator", &[">="]),
        ("operator", &["LIKE"]),
        ("operator", &["IN"]),
    ];

    Grammar {
        start_symbol: "query".to_string(),
        rules: table
            .iter()
            .map(|(nt, production)| GrammarRule::new(nt, production))
            .collect(),
    }
}

impl Grammar {
    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    /// All productions of `non_terminal`, in table order.
    pub fn rules_for<'a>(&'a self, non_terminal: &'a str) -> impl Iterator<Item = &'a GrammarRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.non_terminal == non_terminal)
    }

    /// Distinct non-terminals in order of first appearance.
    pub fn non_terminals(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !seen.contains(&rule.non_terminal.as_str()) {
                seen.push(&rule.non_terminal);
            }
        }
        seen
    }

    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.rules.iter().any(|rule| rule.non_terminal == symbol)
    }

    /// The start symbol has at least one production.
    pub fn is_valid(&self) -> bool {
        self.is_non_terminal(&self.start_symbol)
    }

    /// Render the table as BNF, one line per non-terminal.
    ///
    /// Non-terminals are wrapped in angle brackets and terminals are quoted.
    pub fn to_bnf(&self) -> String {
        let mut out = String::new();
        for nt in self.non_terminals() {
            let alternatives: Vec<String> = self
                .rules_for(nt)
                .map(|rule| {
                    rule.production
                        .iter()
                        .map(|symbol| self.render_symbol(symbol))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            out.push_str(&format!("<{}> ::= {}\n", nt, alternatives.join(" | ")));
        }
        out
    }

    fn render_symbol(&self, symbol: &str) -> String {
        if self.is_non_terminal(symbol) {
            format!("<{}>", symbol)
        } else {
            format!("\"{}\"", symbol)
        }
    }
}
