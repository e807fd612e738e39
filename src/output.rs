//! JSON text rendering for query values.
//!
//! This module renders [`Value`]s as JSON text in compact or pretty form.
//! It is the canonical text form used by `Display`, by error messages and by
//! the string coercion of filter expressions.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - no whitespace
//! - **Pretty output** via [`to_json_pretty()`] - 2-space indentation
//! - **Insertion order** - object members print in the order they were added
//! - **Cycle safe** - a container reached again while it is still being
//!   printed renders as `null`
//!
//! # Examples
//!
//! ```
//! use jsonq::Value;
//! use jsonq::output::{to_json, to_json_pretty};
//!
//! let value = Value::array(vec![Value::Integer(1), Value::from("two")]);
//!
//! assert_eq!(to_json(&value), r#"[1,"two"]"#);
//! assert_eq!(to_json_pretty(&value), "[\n  1,\n  \"two\"\n]");
//! ```

use std::cell::RefCell;

use crate::value::{Identity, Value};

pub struct JsonPrinter {
    pretty: bool,
    /// Containers on the current descent path.
    active: RefCell<Vec<Identity>>,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter {
            pretty,
            active: RefCell::new(Vec::new()),
        }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        if let Some(id) = value.identity() {
            if self.active.borrow().contains(&id) {
                return "null".to_string();
            }
            self.active.borrow_mut().push(id);
            let printed = match value {
                Value::Array(items) => self.print_array(&items.borrow(), indent),
                Value::Object(map) => self.print_object(&map.borrow(), indent),
                _ => unreachable!("only containers have an identity"),
            };
            self.active.borrow_mut().pop();
            return printed;
        }

        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(_) => "null".to_string(),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(_) | Value::Object(_) => unreachable!("containers handled above"),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &indexmap::IndexMap<String, Value>, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let mut result = "{\n".to_string();
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent))
                })
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
                c => vec![c],
            })
            .collect()
    }
}

/// Converts a Value to compact JSON text.
///
/// # Examples
///
/// ```
/// use jsonq::Value;
/// use jsonq::output::to_json;
///
/// let user = Value::object([("name", Value::from("Alice")), ("age", Value::Integer(30))]);
/// assert_eq!(to_json(&user), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to JSON text with 2-space indentation, one element or
/// member per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes() {
        let value = Value::from("say \"hi\"\n");
        assert_eq!(to_json(&value), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_cycle_renders_as_null() {
        let outer = Value::object([("name", Value::from("loop"))]);
        if let Value::Object(map) = &outer {
            map.borrow_mut().insert("me".to_string(), outer.clone());
        }
        assert_eq!(to_json(&outer), r#"{"name":"loop","me":null}"#);
    }

    #[test]
    fn test_shared_but_acyclic_prints_twice() {
        let shared = Value::array(vec![Value::Integer(1)]);
        let doc = Value::object([("a", shared.clone()), ("b", shared)]);
        assert_eq!(to_json(&doc), r#"{"a":[1],"b":[1]}"#);
    }
}
