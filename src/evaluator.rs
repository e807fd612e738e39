use std::collections::{HashMap, HashSet};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    ast::{ArraySelector, Segment, SlicePiece},
    classifier::PathClassifier,
    expression::BoolEvaluator,
    value::Value,
};

/// Values produced by a path, in discovery order. Duplicates are kept.
pub type ResultSet = Vec<Value>;

/// Errors that can occur while running a path against a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Integer index outside the bounds of an array. Plain navigation raises
    /// it for any array; a bracketed index on an empty array selects nothing.
    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// A path fragment matched no grammar rule
    #[error("Path not found {path}. When processing this part {segment}")]
    UnrecognizedSegment { path: String, segment: String },

    /// A mutation key that does not fit the target container
    #[error("Invalid mutation target: {0}")]
    InvalidMutationTarget(String),
}

/// The query executor.
///
/// Splits a path into segments and threads a [`ResultSet`] through them,
/// starting from the root. Filter segments substitute each candidate's fields
/// into the expression text and hand it to a [`BoolEvaluator`].
///
/// The executor keeps no per-query state; one instance can serve any number
/// of documents.
///
/// # Examples
///
/// ```
/// use jsonq::{Evaluator, Value, json_to_value};
/// use serde_json::json;
///
/// let doc = json_to_value(json!({
///     "items": [{"name": "a", "value": 10}, {"name": "b", "value": 20}]
/// }));
///
/// let evaluator = Evaluator::new();
/// let names = evaluator.find(&doc, "$.items[?(@.value > 15)].name").unwrap();
/// assert_eq!(names, vec![Value::from("b")]);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    classifier: PathClassifier,
    expressions: BoolEvaluator,
    /// `@.field` references inside filter text
    variable: Regex,
    truthy: Regex,
    falsy: Regex,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            classifier: PathClassifier::new(),
            expressions: BoolEvaluator::new(),
            variable: Regex::new(r"@\.(\w+)").expect("variable pattern must compile"),
            truthy: Regex::new(r"^(?i:yes|ndio|ndiyo|true)$").expect("truthy pattern must compile"),
            falsy: Regex::new(r"^(?i:hapana|no|false)$").expect("falsy pattern must compile"),
        }
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    /// Parses `path`, failing on the first fragment no grammar rule accepts.
    pub fn compile(&self, path: &str) -> Result<Vec<Segment>, QueryError> {
        let segments = self.classifier.parse(path);
        match segments.iter().find_map(|s| match s {
            Segment::Unrecognized(fragment) => Some(fragment.clone()),
            _ => None,
        }) {
            Some(segment) => Err(QueryError::UnrecognizedSegment {
                path: path.to_string(),
                segment,
            }),
            None => Ok(segments),
        }
    }

    /// Runs `path` against `root`.
    ///
    /// - `""` and `"."` return the root itself.
    /// - A scalar root yields nothing for any other path.
    /// - An unrecognized fragment is logged and yields nothing.
    /// - Missing keys and failed filters drop candidates silently.
    /// - An out-of-range integer index is an error.
    pub fn find(&self, root: &Value, path: &str) -> Result<ResultSet, QueryError> {
        if path.is_empty() || path == "." {
            return Ok(vec![root.clone()]);
        }
        if !root.is_container() {
            return Ok(Vec::new());
        }

        let segments = self.classifier.parse(path);
        let mut results = vec![root.clone()];

        for segment in &segments {
            if let Segment::Unrecognized(fragment) = segment {
                warn!(path, segment = %fragment, "path not found, unrecognized segment");
                return Ok(Vec::new());
            }
            if results.is_empty() {
                return Ok(results);
            }
            trace!(?segment, candidates = results.len(), "applying segment");
            results = self.apply(segment, &results)?;
        }

        Ok(results)
    }

    /// Evaluates one segment against every candidate, producing the next set.
    fn apply(&self, segment: &Segment, candidates: &[Value]) -> Result<ResultSet, QueryError> {
        let mut next = Vec::new();
        match segment {
            Segment::Plain(names) => {
                for candidate in candidates {
                    if let Some(hit) = self.navigate(names, candidate)? {
                        next.push(hit);
                    }
                }
            }
            Segment::Glob(pattern) => {
                let key_pattern = glob_regex(pattern);
                for candidate in candidates {
                    Self::match_keys(&key_pattern, candidate, &mut next);
                }
            }
            Segment::Descendant { trailing } => {
                for candidate in candidates {
                    self.search_descendants(trailing.as_deref(), candidate, &mut next);
                }
            }
            Segment::Array(selector) => {
                for candidate in candidates {
                    self.select(selector, candidate, &mut next)?;
                }
            }
            Segment::Filter(expression) => {
                for candidate in candidates {
                    next.extend(self.filter(candidate, expression));
                }
            }
            Segment::Unrecognized(_) => {}
        }
        Ok(next)
    }

    /// Walks dotted `names` from `candidate`.
    ///
    /// Objects look the name up, arrays read it as an index, anything else
    /// ends the walk. A walk that ends where it started is not a hit.
    fn navigate(&self, names: &[String], candidate: &Value) -> Result<Option<Value>, QueryError> {
        let mut current = candidate.clone();
        for name in names {
            let next = match &current {
                Value::Object(map) => map.borrow().get(name).cloned(),
                Value::Array(items) if self.classifier.is_integer(name) => {
                    let items = items.borrow();
                    let index = name.parse::<usize>().unwrap_or(usize::MAX);
                    match items.get(index) {
                        Some(item) => Some(item.clone()),
                        None => {
                            return Err(QueryError::IndexOutOfRange {
                                index: i64::try_from(index).unwrap_or(i64::MAX),
                                len: items.len(),
                            });
                        }
                    }
                }
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok((!current.same(candidate)).then_some(current))
    }

    fn match_keys(key_pattern: &Regex, candidate: &Value, out: &mut ResultSet) {
        for (key, child) in candidate.entries() {
            if key_pattern.is_match(&key) {
                out.push(child);
            }
        }
    }

    /// Exhaustive search below `start` with an explicit stack. Every container
    /// is visited once, however many paths lead to it.
    fn search_descendants(&self, trailing: Option<&[String]>, start: &Value, out: &mut ResultSet) {
        let Some(start_id) = start.identity() else {
            return;
        };
        let mut seen = HashSet::from([start_id]);
        let mut stack = vec![start.clone()];

        while let Some(node) = stack.pop() {
            let entries = node.entries();
            match trailing {
                // Index errors are misses here: not every array is long enough.
                Some(names) => {
                    if let Ok(Some(hit)) = self.navigate(names, &node) {
                        out.push(hit);
                    }
                }
                None => {
                    out.push(node.clone());
                    out.extend(
                        entries
                            .iter()
                            .filter(|(_, child)| !child.is_container())
                            .map(|(_, child)| child.clone()),
                    );
                }
            }

            // Reversed so that children pop in document order.
            for (_, child) in entries.into_iter().rev() {
                if let Some(id) = child.identity()
                    && seen.insert(id)
                {
                    stack.push(child);
                }
            }
        }
    }

    fn select(&self, selector: &ArraySelector, candidate: &Value, out: &mut ResultSet) -> Result<(), QueryError> {
        if !candidate.is_container() {
            return Ok(());
        }
        match selector {
            ArraySelector::All => out.extend(candidate.children()),
            ArraySelector::Slices(pieces) => out.extend(slice(&candidate.children(), pieces)?),
            ArraySelector::Key(key) => {
                if let Some(hit) = self.navigate(std::slice::from_ref(key), candidate)? {
                    out.push(hit);
                }
            }
        }
        Ok(())
    }

    /// Applies a filter expression to a candidate.
    ///
    /// An array candidate is filtered element by element, skipping nested
    /// arrays; an object candidate is tested as a whole. Elements for which
    /// the expression cannot be completed or evaluated are dropped.
    pub fn filter(&self, candidate: &Value, expression: &str) -> ResultSet {
        match candidate {
            Value::Array(_) => candidate
                .entries()
                .into_iter()
                .filter(|(_, element)| !matches!(element, Value::Array(_)))
                .filter(|(key, element)| self.test(expression, key, element))
                .map(|(_, element)| element)
                .collect(),
            Value::Object(_) if self.test(expression, "", candidate) => vec![candidate.clone()],
            _ => Vec::new(),
        }
    }

    /// Substitutes `element` into `expression` and evaluates the result.
    fn test(&self, expression: &str, key: &str, element: &Value) -> bool {
        let Some(substituted) = self.substitute(expression, key, element) else {
            return false;
        };
        let cleaned: String = substituted.chars().filter(|c| !matches!(c, '[' | ']')).collect();
        match self.expressions.evaluate(&cleaned) {
            Ok(keep) => keep,
            Err(e) => {
                debug!(expression = %cleaned, error = %e, "filter candidate dropped");
                false
            }
        }
    }

    /// Replaces every `@.field` with a literal taken from `element`.
    ///
    /// Objects supply their members; a scalar supplies itself for the key it
    /// sits under. `None` when any reference has no literal.
    fn substitute(&self, expression: &str, key: &str, element: &Value) -> Option<String> {
        let mut literals = HashMap::new();
        for caps in self.variable.captures_iter(expression) {
            let field = caps.get(1)?.as_str();
            if literals.contains_key(field) {
                continue;
            }
            let value = match element {
                Value::Object(_) => element.get(field)?,
                scalar if scalar.is_primitive() && !key.is_empty() && field == key => scalar.clone(),
                _ => return None,
            };
            literals.insert(field.to_string(), self.literal(&value)?);
        }

        Some(
            self.variable
                .replace_all(expression, |caps: &regex::Captures<'_>| {
                    literals.get(&caps[1]).cloned().unwrap_or_default()
                })
                .into_owned(),
        )
    }

    /// Expression literal for a scalar; `None` for null and containers.
    fn literal(&self, value: &Value) -> Option<String> {
        match value {
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(n) if *n < 0 => Some(format!("(0 - {})", n.unsigned_abs())),
            Value::Integer(n) => Some(n.to_string()),
            // Covers -0.0, which would otherwise render as `-0`.
            Value::Float(n) if *n == 0.0 => Some("0".to_string()),
            Value::Float(n) if *n < 0.0 => Some(format!("(0 - {})", -n)),
            Value::Float(n) => Some(n.to_string()),
            Value::String(s) if self.truthy.is_match(s) => Some("true".to_string()),
            Value::String(s) if self.falsy.is_match(s) => Some("false".to_string()),
            Value::String(s) => Some(format!("'{}'", s)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// `*` becomes `\w*`; everything else matches literally, and the whole key
/// must match.
fn glob_regex(pattern: &str) -> Regex {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\w*");
    Regex::new(&format!("^{}$", body)).expect("escaped glob pattern must compile")
}

/// Concatenates the selected ranges of `items`, in the order given.
///
/// Negative bounds count from the end. A bare index selects one element and
/// must fall inside the array; range bounds are clamped. An empty array
/// selects nothing.
fn slice(items: &[Value], pieces: &[SlicePiece]) -> Result<ResultSet, QueryError> {
    let len = items.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    let resolve = |n: i64| -> usize {
        let from_end = if n < 0 { len as i64 + n } else { n };
        usize::try_from(from_end.max(0)).unwrap_or(usize::MAX)
    };

    let mut selected = Vec::new();
    for piece in pieces {
        match *piece {
            SlicePiece::Index(index) => {
                let at = resolve(index);
                let item = items.get(at).ok_or(QueryError::IndexOutOfRange { index, len })?;
                selected.push(item.clone());
            }
            SlicePiece::Range { start, end } => {
                let start = start.map_or(0, resolve).min(len);
                let end = end.map_or(len, resolve).min(len);
                if start < end {
                    selected.extend_from_slice(&items[start..end]);
                }
            }
        }
    }
    Ok(selected)
}

/// Turns a result set into a single value: nulls are dropped, a lone result
/// is returned bare, anything else becomes a new array.
pub fn collapse(results: ResultSet) -> Value {
    let mut results: Vec<Value> = results.into_iter().filter(|v| !v.is_null()).collect();
    if results.len() == 1 {
        results.swap_remove(0)
    } else {
        Value::array(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: i64) -> Vec<Value> {
        (0..n).map(Value::Integer).collect()
    }

    #[test]
    fn test_slice_ranges_and_indices() {
        let items = numbers(10);
        let pick = |pieces: &[SlicePiece]| slice(&items, pieces).unwrap();

        assert_eq!(pick(&[SlicePiece::Range { start: None, end: Some(3) }]), numbers(3));
        assert_eq!(pick(&[SlicePiece::Index(-1)]), vec![Value::Integer(9)]);
        assert_eq!(
            pick(&[SlicePiece::Range { start: Some(-2), end: None }]),
            vec![Value::Integer(8), Value::Integer(9)]
        );
        assert_eq!(pick(&[SlicePiece::Range { start: Some(5), end: Some(2) }]), vec![]);
    }

    #[test]
    fn test_slice_pieces_concatenate_without_dedup() {
        let items = numbers(4);
        let picked = slice(
            &items,
            &[
                SlicePiece::Index(1),
                SlicePiece::Range { start: Some(0), end: Some(2) },
            ],
        )
        .unwrap();
        assert_eq!(picked, vec![Value::Integer(1), Value::Integer(0), Value::Integer(1)]);
    }

    #[test]
    fn test_slice_index_past_end_is_an_error() {
        let err = slice(&numbers(2), &[SlicePiece::Index(5)]).unwrap_err();
        assert_eq!(err, QueryError::IndexOutOfRange { index: 5, len: 2 });
        assert_eq!(slice(&[], &[SlicePiece::Index(5)]).unwrap(), vec![]);
    }

    #[test]
    fn test_glob_regex_escapes_literals() {
        let re = glob_regex("first.*");
        assert!(re.is_match("first.name"));
        assert!(!re.is_match("firstxname"));
        assert!(glob_regex("*_name").is_match("last_name"));
        assert!(!glob_regex("*_name").is_match("last-name"));
    }

    #[test]
    fn test_literals() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.literal(&Value::from("Ndiyo")), Some("true".to_string()));
        assert_eq!(evaluator.literal(&Value::from("HAPANA")), Some("false".to_string()));
        assert_eq!(evaluator.literal(&Value::from("maybe")), Some("'maybe'".to_string()));
        assert_eq!(evaluator.literal(&Value::Integer(-3)), Some("(0 - 3)".to_string()));
        assert_eq!(evaluator.literal(&Value::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(evaluator.literal(&Value::array(vec![])), None);
    }

    #[test]
    fn test_collapse() {
        assert_eq!(collapse(vec![Value::Integer(1)]), Value::Integer(1));
        assert_eq!(
            collapse(vec![Value::Integer(1), Value::Null, Value::Integer(2)]),
            Value::array(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(collapse(vec![]), Value::array(vec![]));
    }
}
