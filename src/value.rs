use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::output::to_json;

/// Shared handle to an array's elements.
pub type Array = Rc<RefCell<Vec<Value>>>;

/// Shared handle to an object's members, kept in insertion order.
pub type Object = Rc<RefCell<IndexMap<String, Value>>>;

/// A JSON value as seen by the query engine.
///
/// Scalars are held inline. Containers are shared handles: cloning a
/// `Value::Array` or `Value::Object` clones the handle, not the contents, so
/// two keys of a document may point at the same nested container and a
/// mutation through one handle is visible through every other.
///
/// # Type Preservation
///
/// Integers and floats are kept apart. A source number without a decimal
/// point stays an [`Value::Integer`]; everything else is a [`Value::Float`].
///
/// # Null Collapse
///
/// Containers never hold `Null`. The constructors here and the mutation
/// operations drop null elements and members, so an absent key and a null
/// key are the same thing to every handler.
///
/// # Examples
///
/// ```
/// use jsonq::Value;
///
/// let items = Value::array(vec![Value::Integer(1), Value::Null, Value::Integer(2)]);
/// assert_eq!(items.len(), Some(2));
///
/// let user = Value::object([("name", Value::from("Ada")), ("email", Value::Null)]);
/// assert!(user.get("name").is_some());
/// assert!(user.get("email").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Array),

    /// Mapping from string keys to values
    Object(Object),
}

/// Identity of a container, usable as a key in a visited set.
///
/// Two values have the same identity only when they are handles to the same
/// container allocation; structurally equal copies are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Value {
    /// Builds an array, dropping null elements.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Value {
        let items = items.into_iter().filter(|v| !v.is_null()).collect();
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Builds an object, dropping null members.
    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, Value)>) -> Value {
        let members = members
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.into(), v))
            .collect();
        Value::Object(Rc::new(RefCell::new(members)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Booleans, numbers and strings. `Null` is neither primitive nor container.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Boolean(_) | Value::Float(_) | Value::Integer(_) | Value::String(_)
        )
    }

    /// The container identity, or `None` for scalars.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Array(items) => Some(Identity(Rc::as_ptr(items) as *const () as usize)),
            Value::Object(map) => Some(Identity(Rc::as_ptr(map) as *const () as usize)),
            _ => None,
        }
    }

    /// Depth-unaware equality: identity for containers, value equality for
    /// scalars. Never descends into children, so it is safe on cyclic trees.
    pub fn same(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }

    /// Number of direct children of a container.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.borrow().len()),
            Value::Object(map) => Some(map.borrow().len()),
            _ => None,
        }
    }

    /// Looks up an object member.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Direct children with their key text: member names for objects,
    /// decimal indices for arrays. Scalars have no children.
    pub fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Value::Array(items) => items
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            Value::Object(map) => map
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Direct child values in order.
    pub fn children(&self) -> Vec<Value> {
        match self {
            Value::Array(items) => items.borrow().clone(),
            Value::Object(map) => map.borrow().values().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer; floats only when they hold an exact integral value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// Canonical text: strings verbatim, everything else as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => f.write_str(&to_json(other)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
