use serde::Serialize;

use crate::error::ExtractError;

/// Dimension every path pattern is matched against.
pub const PAGE_PATH_FIELD: &str = "pagePath";

/// A disjunction of "contains" predicates, serialized as a GA4 `FilterExpression`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilter {
    or_group: ExpressionList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ExpressionList {
    expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Expression {
    filter: FieldFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldFilter {
    field_name: String,
    string_filter: StringFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct StringFilter {
    match_type: MatchType,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum MatchType {
    Contains,
}

impl MatchFilter {
    pub fn len(&self) -> usize {
        self.or_group.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.or_group.expressions.is_empty()
    }

    /// Substrings in the order they were configured.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.or_group
            .expressions
            .iter()
            .map(|e| e.filter.string_filter.value.as_str())
    }

    /// Evaluates the filter locally. Matching is case-insensitive, like the API default.
    pub fn matches(&self, page_path: &str) -> bool {
        let haystack = page_path.to_lowercase();
        self.patterns()
            .any(|pattern| haystack.contains(&pattern.to_lowercase()))
    }
}

/// Builds one `CONTAINS` predicate on `pagePath` per pattern, OR-ed together.
///
/// An empty pattern list is accepted and matches nothing. A blank pattern would
/// match every path, so it is rejected before any request goes out.
pub fn build_match_filter<S: AsRef<str>>(patterns: &[S]) -> Result<MatchFilter, ExtractError> {
    let mut expressions = Vec::with_capacity(patterns.len());
    for (idx, pattern) in patterns.iter().enumerate() {
        let pattern = pattern.as_ref();
        if pattern.trim().is_empty() {
            return Err(ExtractError::config(format!(
                "path pattern #{} is blank",
                idx + 1
            )));
        }
        expressions.push(Expression {
            filter: FieldFilter {
                field_name: PAGE_PATH_FIELD.to_string(),
                string_filter: StringFilter {
                    match_type: MatchType::Contains,
                    value: pattern.to_string(),
                },
            },
        });
    }

    Ok(MatchFilter {
        or_group: ExpressionList { expressions },
    })
}
