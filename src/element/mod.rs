pub mod storage;

pub use storage::{load_element, save_element};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Date format used for every date attribute.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of reading a typed attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttribLookup<T> {
    Found(T),
    NotFound,
    /// Attribute is present but its text does not parse; carries the raw text.
    Invalid(String),
}

impl<T> AttribLookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            AttribLookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, AttribLookup::Invalid(_))
    }
}

/// Generic attributed tree node.
///
/// This is the shape every persisted record is read from and written to: a
/// tag name, string attributes, an optional text value and ordered children.
/// Typed readers never fail outright, they report [`AttribLookup::Invalid`]
/// and leave the decision (warn or abort) to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Raw attribute text
    pub fn attrib(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attrib(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attrib_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn set_attrib(&mut self, name: &str, value: impl Display) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn set_attrib_bool(&mut self, name: &str, value: bool) {
        self.set_attrib(name, if value { "y" } else { "n" });
    }

    pub fn set_attrib_date(&mut self, name: &str, value: NaiveDate) {
        self.set_attrib(name, value.format(DATE_FORMAT));
    }

    /// Read and parse an attribute with `FromStr`.
    pub fn get_attrib<T: FromStr>(&self, name: &str) -> AttribLookup<T> {
        match self.attrib(name) {
            None => AttribLookup::NotFound,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => AttribLookup::Found(v),
                Err(_) => AttribLookup::Invalid(raw.to_string()),
            },
        }
    }

    /// Booleans accept `y`/`n`, `1`/`0` and `true`/`false` (any case).
    pub fn get_attrib_bool(&self, name: &str) -> AttribLookup<bool> {
        match self.attrib(name) {
            None => AttribLookup::NotFound,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "y" | "1" | "true" => AttribLookup::Found(true),
                "n" | "0" | "false" => AttribLookup::Found(false),
                _ => AttribLookup::Invalid(raw.to_string()),
            },
        }
    }

    pub fn get_attrib_date(&self, name: &str) -> AttribLookup<NaiveDate> {
        match self.attrib(name) {
            None => AttribLookup::NotFound,
            Some(raw) => match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
                Ok(d) => AttribLookup::Found(d),
                Err(_) => AttribLookup::Invalid(raw.to_string()),
            },
        }
    }

    /// Append a new empty child and return it for filling in.
    pub fn add_child(&mut self, name: &str) -> &mut Element {
        let idx = self.children.len();
        self.children.push(Element::new(name));
        &mut self.children[idx]
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}
