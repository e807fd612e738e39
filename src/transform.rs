use crate::{
    evaluator::{Evaluator, QueryError},
    value::Value,
};

/// Where a value goes inside its parent container.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Object member name. On an array, an all-digit name is read as an index.
    ///
    /// # Examples
    /// - `put("user.email", ..)` → `Name("email")`
    /// - `put("items.0", ..)` → `Name("0")` (index 0 when `items` is an array)
    Name(String),

    /// Array position
    Index(i64),

    /// End of an array, written `$` or left empty in a path
    Append,
}

impl Key {
    /// Reads the last component of a mutation path.
    pub fn parse(text: &str) -> Key {
        match text {
            "" | "$" => Key::Append,
            name => Key::Name(name.to_string()),
        }
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::parse(text)
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

/// Splits a mutation path into the parent path and the final key.
///
/// ```
/// use jsonq::transform::{Key, split_target};
///
/// assert_eq!(split_target("$.user.email"), ("$.user", Key::Name("email".into())));
/// assert_eq!(split_target("tags.$"), ("tags", Key::Append));
/// assert_eq!(split_target("name"), ("", Key::Name("name".into())));
/// ```
pub fn split_target(path: &str) -> (&str, Key) {
    match path.rsplit_once('.') {
        Some((parent, key)) => (parent, Key::parse(key)),
        None => ("", Key::parse(path)),
    }
}

/// Writes `value` at `path`, replacing what is there.
///
/// Every container the parent path finds receives the key, so a wildcard
/// parent writes into each match.
pub fn put(evaluator: &Evaluator, root: &Value, path: &str, value: Value) -> Result<(), QueryError> {
    let (parent, key) = split_target(path);
    put_all(evaluator, root, parent, true, vec![(key, value)])
}

/// Applies each `(key, value)` pair to every container found at `path`.
///
/// Without `override_existing` an existing object member is left alone and
/// array writes always append.
pub fn put_all(
    evaluator: &Evaluator,
    root: &Value,
    path: &str,
    override_existing: bool,
    pairs: Vec<(Key, Value)>,
) -> Result<(), QueryError> {
    let parents = evaluator.find(root, path)?;
    for parent in &parents {
        for (key, value) in &pairs {
            insert(evaluator, parent, key, value.clone(), override_existing)?;
        }
    }
    Ok(())
}

/// Appends `value` to a root array.
pub fn add(evaluator: &Evaluator, root: &Value, value: Value) -> Result<(), QueryError> {
    put_all(evaluator, root, "", false, vec![(Key::Append, value)])
}

fn insert(
    evaluator: &Evaluator,
    parent: &Value,
    key: &Key,
    value: Value,
    override_existing: bool,
) -> Result<(), QueryError> {
    match (parent, key) {
        (Value::Object(map), Key::Name(name)) => {
            let mut map = map.borrow_mut();
            if !override_existing && map.contains_key(name) {
                return Ok(());
            }
            if value.is_null() {
                map.shift_remove(name);
            } else {
                map.insert(name.clone(), value);
            }
            Ok(())
        }
        (Value::Array(items), _) => {
            let position = match key {
                Key::Append => None,
                Key::Index(i) => Some(*i),
                Key::Name(name) if evaluator.classifier().is_integer(name) => name.parse().ok(),
                Key::Name(name) => {
                    return Err(QueryError::InvalidMutationTarget(format!(
                        "array key must be an integer or '$', got '{}'",
                        name
                    )));
                }
            };
            if value.is_null() {
                return Ok(());
            }
            let mut items = items.borrow_mut();
            match position.and_then(|i| usize::try_from(i).ok()) {
                Some(at) if override_existing && at < items.len() => items.insert(at, value),
                _ => items.push(value),
            }
            Ok(())
        }
        (Value::Object(_), other) => Err(QueryError::InvalidMutationTarget(format!(
            "object key must be a name, got {:?}",
            other
        ))),
        (scalar, _) => Err(QueryError::InvalidMutationTarget(format!(
            "cannot write into a {}",
            scalar.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("$"), Key::Append);
        assert_eq!(Key::parse(""), Key::Append);
        assert_eq!(Key::parse("7"), Key::Name("7".to_string()));
    }

    #[test]
    fn test_insert_into_scalar_fails() {
        let evaluator = Evaluator::new();
        let err = insert(&evaluator, &Value::Integer(1), &Key::Append, Value::Integer(2), true).unwrap_err();
        assert!(matches!(err, QueryError::InvalidMutationTarget(_)));
    }
}
