//! The caller-facing query surface.
//!
//! A [`Document`] owns a root [`Value`] and answers path queries against it.
//! Results that are themselves containers share structure with the root, so
//! a mutation made through a derived document is visible in the original.

use std::{fmt, rc::Rc};

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::debug;

use crate::{
    convert::json_to_value,
    evaluator::{Evaluator, QueryError, collapse},
    transform::{self, Key},
    value::Value,
};

/// A JSON document with path queries.
///
/// # Examples
///
/// ```
/// use jsonq::{Document, Value};
///
/// let doc = Document::from_json(r#"{"people": [{"name": "Ada", "age": 36}, {"name": "Alan", "age": 41}]}"#).unwrap();
///
/// assert_eq!(doc.text("people[0].name").unwrap(), "Ada");
/// assert_eq!(doc.get("people").unwrap().string_column("name").unwrap(), vec!["Ada", "Alan"]);
///
/// let older = doc.get("people").unwrap().filter_where("age > ?", &[Value::Integer(40)]).unwrap();
/// assert_eq!(older.text("name").unwrap(), "Alan");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    evaluator: Rc<Evaluator>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    pub fn from_value(root: Value) -> Self {
        Document {
            root,
            evaluator: Rc::new(Evaluator::new()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_value(json_to_value(json)))
    }

    /// A document with a null root.
    pub fn empty() -> Self {
        Self::from_value(Value::Null)
    }

    fn derive(&self, root: Value) -> Document {
        Document {
            root,
            evaluator: Rc::clone(&self.evaluator),
        }
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Null, an empty container or an empty string.
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            other => other.len() == Some(0),
        }
    }

    /// Runs `path` and collapses the results: a single result comes back
    /// bare, several are wrapped in a new array.
    pub fn get(&self, path: &str) -> Result<Document, QueryError> {
        let results = self.evaluator.find(&self.root, path)?;
        Ok(self.derive(collapse(results)))
    }

    pub fn first(&self, path: &str) -> Result<Option<Value>, QueryError> {
        Ok(self.evaluator.find(&self.root, path)?.into_iter().next())
    }

    /// The first result as text, or `""` when nothing matched.
    pub fn text(&self, path: &str) -> Result<String, QueryError> {
        Ok(self.first(path)?.map(|v| v.to_string()).unwrap_or_default())
    }

    pub fn strings(&self, path: &str) -> Result<Vec<String>, QueryError> {
        Ok(self
            .evaluator
            .find(&self.root, path)?
            .iter()
            .map(Value::to_string)
            .collect())
    }

    /// The `name` field of every element, as text.
    pub fn string_column(&self, name: &str) -> Result<Vec<String>, QueryError> {
        self.strings(&format!("[*].{}", name))
    }

    pub fn integers(&self, path: &str) -> Result<Vec<i64>, QueryError> {
        Ok(self
            .evaluator
            .find(&self.root, path)?
            .iter()
            .filter_map(Value::as_int)
            .collect())
    }

    /// The `name` field of every element whose value reads as a whole number.
    pub fn int_column(&self, name: &str) -> Result<Vec<i64>, QueryError> {
        let rows = self
            .evaluator
            .find(&self.root, &format!(r"[(@.{} ~ '\d+')]", name))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(name))
            .filter_map(|v| v.as_int())
            .collect())
    }

    /// Every result of `path` that reads as a `yyyy-mm-dd` or `dd-mm-yyyy`
    /// date. Other results are skipped.
    pub fn dates(&self, path: &str) -> Result<Vec<NaiveDate>, QueryError> {
        Ok(self
            .strings(path)?
            .iter()
            .filter_map(|text| parse_date(text))
            .collect())
    }

    /// The `name` field of every element whose value looks like a date.
    pub fn date_column(&self, name: &str) -> Result<Vec<NaiveDate>, QueryError> {
        let rows = self.evaluator.find(
            &self.root,
            &format!(r"[(@.{} ~ '\d{{2,4}}-\d{{2}}-\d{{2,4}}')]", name),
        )?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(name))
            .filter_map(|v| parse_date(&v.to_string()))
            .collect())
    }

    /// Projects every object element onto `columns`.
    pub fn select(&self, columns: &[&str]) -> Document {
        let rows = self
            .root
            .children()
            .into_iter()
            .filter(|row| matches!(row, Value::Object(_)))
            .map(|row| {
                Value::object(
                    columns
                        .iter()
                        .map(|column| (*column, row.get(column).unwrap_or(Value::Null))),
                )
            })
            .collect();
        self.derive(collapse(rows))
    }

    /// Filters the root collection with a loose condition syntax.
    ///
    /// Bare identifiers name fields of the element, `and`/`or` are the
    /// logical operators, `=` compares, and each `?` takes the next
    /// argument as a literal.
    ///
    /// ```
    /// use jsonq::{Document, Value};
    ///
    /// let doc = Document::from_json(r#"[{"k": "a", "n": 1}, {"k": "b", "n": 2}]"#).unwrap();
    /// let hit = doc.filter_where("k = ? or n > ?", &[Value::from("a"), Value::Integer(5)]).unwrap();
    /// assert_eq!(hit.text("n").unwrap(), "1");
    /// ```
    pub fn filter_where(&self, condition: &str, args: &[Value]) -> Result<Document, QueryError> {
        let expression = format!("({})", rewrite_condition(condition, args));
        let rows = self.evaluator.filter(&self.root, &expression);
        Ok(self.derive(collapse(rows)))
    }

    /// Visits the direct children of the root with their keys.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, Document),
    {
        for (key, child) in self.root.entries() {
            f(&key, self.derive(child));
        }
    }

    /// Writes `value` at `path`, replacing any existing member.
    pub fn put(&self, path: &str, value: impl Into<Value>) -> Result<(), QueryError> {
        transform::put(&self.evaluator, &self.root, path, value.into())
    }

    pub fn put_all(
        &self,
        path: &str,
        override_existing: bool,
        pairs: Vec<(Key, Value)>,
    ) -> Result<(), QueryError> {
        transform::put_all(&self.evaluator, &self.root, path, override_existing, pairs)
    }

    /// Appends to a root array.
    pub fn add(&self, value: impl Into<Value>) -> Result<(), QueryError> {
        transform::add(&self.evaluator, &self.root, value.into())
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Document::from_value(root)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Turns `age >= ? and name = ?` into `@.age >= 30 && @.name == 'x'`.
fn rewrite_condition(condition: &str, args: &[Value]) -> String {
    let token = Regex::new(r"'[^']*'|@\.\w+|[A-Za-z_]\w*|[!<>]?=+|\?")
        .expect("condition token pattern must compile");
    let mut args = args.iter().filter(|a| a.is_primitive());

    token
        .replace_all(condition, |caps: &Captures<'_>| {
            let text = &caps[0];
            match text {
                "?" => args.next().map(argument_literal).unwrap_or_default(),
                _ if text.starts_with('\'') || text.starts_with('@') => text.to_string(),
                _ if text.eq_ignore_ascii_case("and") => "&&".to_string(),
                _ if text.eq_ignore_ascii_case("or") => "||".to_string(),
                "true" | "false" => text.to_string(),
                _ if text.ends_with('=') => match text.chars().next() {
                    Some(op @ ('!' | '<' | '>')) => format!("{}=", op),
                    _ => "==".to_string(),
                },
                field => format!("@.{}", field),
            }
        })
        .into_owned()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let format = match (text.len(), text.as_bytes().get(4), text.as_bytes().get(2)) {
        (10, Some(b'-'), _) => "%Y-%m-%d",
        (10, _, Some(b'-')) => "%d-%m-%Y",
        _ => return None,
    };
    NaiveDate::parse_from_str(text, format)
        .map_err(|e| debug!(text, error = %e, "not a date"))
        .ok()
}

fn argument_literal(arg: &Value) -> String {
    match arg {
        Value::String(s) => format!("'{}'", s),
        Value::Integer(n) if *n < 0 => format!("(0 - {})", n.unsigned_abs()),
        Value::Float(n) if *n == 0.0 => "0".to_string(),
        Value::Float(n) if *n < 0.0 => format!("(0 - {})", -n),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_condition() {
        assert_eq!(
            rewrite_condition("age >= ? and name = ?", &[Value::Integer(30), Value::from("x")]),
            "@.age >= 30 && @.name == 'x'"
        );
        assert_eq!(
            rewrite_condition("a != 'or' OR @.b == true", &[]),
            "@.a != 'or' || @.b == true"
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("15-02-2023"), NaiveDate::from_ymd_opt(2023, 2, 15));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("24-01-15"), None);
    }

    #[test]
    fn test_rewrite_zero_float_argument() {
        assert_eq!(rewrite_condition("n == ?", &[Value::Float(-0.0)]), "@.n == 0");
    }

    #[test]
    fn test_rewrite_skips_container_arguments() {
        let args = [Value::array(vec![]), Value::Integer(-2)];
        assert_eq!(rewrite_condition("n > ?", &args), "@.n > (0 - 2)");
    }
}
