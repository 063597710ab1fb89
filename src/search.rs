//! Search query compilation over the `info` JSON column
//!
//! Callers accumulate dotted-path/pattern terms into a [`SearchQueryBuilder`]
//! and compile them into a PostgreSQL fragment that selects analysis ids
//! (optionally with their raw info blob) filtered to documents matching every
//! term. The compiled string is a wire contract: identical inputs always
//! compile to an identical fragment, byte for byte, and terms appear in
//! insertion order.
//!
//! [`SearchQueryBuilder::build`] reproduces the legacy spliced-literal form
//! for compatibility. Execution layers should prefer
//! [`SearchQueryBuilder::build_bound`], which emits the same structure with
//! the regex patterns as bound parameters instead of inline literals.

use serde::Serialize;

use crate::error::{Error, Result};

const AND_DELIMITER: &str = " AND ";
const JSON_OBJECT_ARROW: &str = "->";
const JSON_VALUE_ARROW: &str = "->>";
const REGEX_MATCH: &str = " ~ ";
const STATEMENT_END: &str = ";";
const INFO_COLUMN: &str = "info";

/// Discriminator value for analysis info documents in the shared info store
pub const ANALYSIS_ID_TYPE: &str = "Analysis";

/// A single required match against a nested field of an info document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTerm {
    path: Vec<String>,
    pattern: String,
}

impl SearchTerm {
    /// Create a term from a dotted key (e.g. `key1.key2.key3`) and a regex
    /// pattern. Empty keys, empty path segments, and empty patterns are
    /// rejected.
    pub fn new(key: &str, pattern: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::invalid_search_term("key must not be empty"));
        }
        if pattern.is_empty() {
            return Err(Error::invalid_search_term("pattern must not be empty"));
        }
        let path: Vec<String> = key.split('.').map(String::from).collect();
        if path.iter().any(String::is_empty) {
            return Err(Error::invalid_search_term(format!(
                "key '{}' contains an empty segment",
                key
            )));
        }
        Ok(Self {
            path,
            pattern: pattern.to_string(),
        })
    }

    /// Parse a `key=pattern` expression, splitting on the first `=` only,
    /// so `a=b=c` yields key `a` and pattern `b=c`.
    pub fn parse(expression: &str) -> Result<Self> {
        let (key, pattern) = expression.split_once('=').ok_or_else(|| {
            Error::invalid_search_term(format!("expression '{}' has no '='", expression))
        })?;
        Self::new(key, pattern)
    }

    /// Parse a sequence of `key=pattern` expressions
    pub fn parse_all<S: AsRef<str>>(expressions: &[S]) -> Result<Vec<Self>> {
        expressions
            .iter()
            .map(|e| Self::parse(e.as_ref()))
            .collect()
    }

    /// The dotted form of the path
    pub fn key(&self) -> String {
        self.path.join(".")
    }

    /// Every path segment except the last
    pub fn non_leaf_keys(&self) -> &[String] {
        &self.path[..self.path.len() - 1]
    }

    /// The last path segment
    pub fn leaf_key(&self) -> &str {
        self.path.last().expect("path has at least one segment")
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compile this term into a `WHERE` condition over the info column: an
    /// object-navigation arrow per non-leaf segment, a text-extraction arrow
    /// for the leaf, then a regex match against the pattern.
    fn where_condition(&self, pattern_sql: &str) -> String {
        let mut condition = String::from(INFO_COLUMN);
        for key in self.non_leaf_keys() {
            condition.push_str(JSON_OBJECT_ARROW);
            condition.push_str(&quoted(key));
        }
        condition.push_str(JSON_VALUE_ARROW);
        condition.push_str(&quoted(self.leaf_key()));
        condition.push_str(REGEX_MATCH);
        condition.push_str(pattern_sql);
        condition
    }
}

/// A compiled query whose pattern values are bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    /// The query fragment with `$1..$n` placeholders for the patterns
    pub sql: String,
    /// Pattern values, in placeholder order
    pub params: Vec<String>,
}

/// Accumulates search terms and compiles them into a query fragment
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    include_info: bool,
    terms: Vec<SearchTerm>,
}

impl SearchQueryBuilder {
    /// Create a builder; `include_info` controls whether the raw info blob is
    /// projected alongside the analysis id.
    pub fn new(include_info: bool) -> Self {
        Self {
            include_info,
            terms: Vec::new(),
        }
    }

    /// Append a term from a dotted key and a regex pattern
    pub fn add(&mut self, key: &str, pattern: &str) -> Result<&mut Self> {
        self.add_term(SearchTerm::new(key, pattern)?);
        Ok(self)
    }

    /// Append an already-constructed term
    pub fn add_term(&mut self, term: SearchTerm) -> &mut Self {
        self.terms.push(term);
        self
    }

    /// Fan one key out over several patterns, appending one term per pattern
    pub fn add_values<S: AsRef<str>>(&mut self, key: &str, patterns: &[S]) -> Result<&mut Self> {
        for pattern in patterns {
            self.add(key, pattern.as_ref())?;
        }
        Ok(self)
    }

    /// The accumulated terms, in insertion order
    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// Compile the accumulated terms into the legacy query fragment, with
    /// pattern literals spliced in. Pure and idempotent: repeated calls on
    /// the same state return the same string.
    pub fn build(&self) -> String {
        let pattern_sql: Vec<String> = self.terms.iter().map(|t| quoted(t.pattern())).collect();
        self.assemble(&pattern_sql)
    }

    /// Compile to the same structure as [`build`](Self::build) but with
    /// `$1..$n` placeholders and the patterns returned separately for binding.
    pub fn build_bound(&self) -> BoundQuery {
        let pattern_sql: Vec<String> = (1..=self.terms.len()).map(|n| format!("${}", n)).collect();
        BoundQuery {
            sql: self.assemble(&pattern_sql),
            params: self.terms.iter().map(|t| t.pattern().to_string()).collect(),
        }
    }

    fn assemble(&self, pattern_sql: &[String]) -> String {
        let mut query = select_base(self.include_info);
        if !self.terms.is_empty() {
            let conditions: Vec<String> = self
                .terms
                .iter()
                .zip(pattern_sql)
                .map(|(term, pattern)| term.where_condition(pattern))
                .collect();
            query.push_str(AND_DELIMITER);
            query.push_str(&conditions.join(AND_DELIMITER));
        }
        query.push_str(STATEMENT_END);
        query
    }
}

/// Fixed projection head and join/filter body of every compiled query
fn select_base(include_info: bool) -> String {
    let mut sql = String::from("SELECT a.id AS analysis_id ");
    if include_info {
        sql.push_str(", i.info AS info ");
    }
    sql.push_str("FROM analysis AS a INNER JOIN info i ON a.id = i.id WHERE i.id_type = ");
    sql.push_str(&quoted(ANALYSIS_ID_TYPE));
    sql
}

fn quoted(input: &str) -> String {
    format!("'{}'", input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_path_splitting() {
        let term = SearchTerm::new("a.b.c", "k").unwrap();
        assert_eq!(term.non_leaf_keys(), ["a", "b"]);
        assert_eq!(term.leaf_key(), "c");
        assert_eq!(term.pattern(), "k");
        assert_eq!(term.key(), "a.b.c");
    }

    #[test]
    fn test_single_segment_term_has_no_non_leaf_keys() {
        let term = SearchTerm::new("key1", "v").unwrap();
        assert!(term.non_leaf_keys().is_empty());
        assert_eq!(term.leaf_key(), "key1");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            SearchTerm::new("", "v").unwrap_err(),
            Error::InvalidSearchTerm { .. }
        ));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            SearchTerm::new("a.b", "").unwrap_err(),
            Error::InvalidSearchTerm { .. }
        ));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(SearchTerm::new("a..b", "v").is_err());
    }

    #[test]
    fn test_expression_parsing_splits_on_first_equals() {
        let term = SearchTerm::parse("a=b").unwrap();
        assert_eq!(term.key(), "a");
        assert_eq!(term.pattern(), "b");

        let term = SearchTerm::parse("a=b=c").unwrap();
        assert_eq!(term.key(), "a");
        assert_eq!(term.pattern(), "b=c");
    }

    #[test]
    fn test_parse_all() {
        let terms = SearchTerm::parse_all(&["a=b", "c.d.e=f", "h.i=r=t"]).unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[1].key(), "c.d.e");
        assert_eq!(terms[2].pattern(), "r=t");
    }

    #[test]
    fn test_add_values_fans_out_one_key() {
        let mut builder = SearchQueryBuilder::new(false);
        builder.add_values("a.x.y", &["b", "c", "d"]).unwrap();
        assert_eq!(builder.terms().len(), 3);
        assert!(builder.terms().iter().all(|t| t.key() == "a.x.y"));
        let patterns: Vec<_> = builder.terms().iter().map(SearchTerm::pattern).collect();
        assert_eq!(patterns, ["b", "c", "d"]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut builder = SearchQueryBuilder::new(true);
        builder.add("key1", ".*").unwrap();
        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn test_terms_compile_in_insertion_order() {
        let mut builder = SearchQueryBuilder::new(false);
        builder.add("zzz", "1").unwrap();
        builder.add("aaa", "2").unwrap();
        let query = builder.build();
        let zzz = query.find("'zzz'").unwrap();
        let aaa = query.find("'aaa'").unwrap();
        assert!(zzz < aaa);
    }

    #[test]
    fn test_build_bound_binds_patterns_only() {
        let mut builder = SearchQueryBuilder::new(false);
        builder.add("key1", ".*value1$").unwrap();
        builder.add("key2.key3", "v2").unwrap();

        let bound = builder.build_bound();
        assert_eq!(bound.params, vec![".*value1$".to_string(), "v2".to_string()]);
        assert!(bound.sql.contains("info->>'key1' ~ $1"));
        assert!(bound.sql.contains("info->'key2'->>'key3' ~ $2"));
        // Navigation structure stays identical to the spliced form
        assert_eq!(
            bound.sql.replace("$1", "'.*value1$'").replace("$2", "'v2'"),
            builder.build()
        );
    }
}
