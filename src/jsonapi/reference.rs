use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource identifier object: `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Identifier {
    pub fn new(kind: &str, id: &str) -> Self {
        Identifier {
            id: id.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Read an identifier out of loosely-shaped linkage data.
    /// Returns `None` unless the value is an object with a string or numeric `id`.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Identifier { id, kind })
    }
}

/// A relationship reference, decoded from the `data` member of a
/// JSON:API relationship object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reference {
    /// Relationship absent, `null`, or of an unrecognised shape
    #[default]
    None,
    /// To-one linkage
    Single(Identifier),
    /// To-many linkage, in wire order
    Many(Vec<Identifier>),
}

impl Reference {
    /// Decode the `data` member of a relationship object
    pub fn from_linkage(data: &Value) -> Self {
        match data {
            Value::Array(items) => {
                Reference::Many(items.iter().filter_map(Identifier::from_value).collect())
            }
            Value::Object(_) => match Identifier::from_value(data) {
                Some(ident) => Reference::Single(ident),
                None => Reference::None,
            },
            _ => Reference::None,
        }
    }

    /// The identifier of a to-one reference. To-many references yield `None`.
    pub fn single(&self) -> Option<&Identifier> {
        match self {
            Reference::Single(ident) => Some(ident),
            Reference::Many(_) | Reference::None => None,
        }
    }

    /// Element 0 of a to-many reference. To-one references and empty
    /// sequences yield `None`.
    pub fn first(&self) -> Option<&Identifier> {
        match self {
            Reference::Many(idents) => idents.first(),
            Reference::Single(_) | Reference::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Reference::None)
    }
}

/// A relationship object as received, plus its decoded linkage.
///
/// Serializes back to the original JSON so `links`, `meta` and unrecognised
/// shapes pass through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Relationship {
    pub reference: Reference,
    raw: Value,
}

impl Relationship {
    /// The relationship object exactly as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl From<Value> for Relationship {
    fn from(raw: Value) -> Self {
        let reference = raw
            .get("data")
            .map(Reference::from_linkage)
            .unwrap_or_default();
        Relationship { reference, raw }
    }
}

impl From<Relationship> for Value {
    fn from(rel: Relationship) -> Self {
        rel.raw
    }
}
