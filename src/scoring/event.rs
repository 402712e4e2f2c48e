use anyhow::{bail, Result};

use super::registry::ScoringMethodRegistry;
use crate::callback::{invalid_value_message, LoadCallback};
use crate::element::{AttribLookup, Element};
use crate::version::ArbVersion;

pub const TREE_CONFIG: &str = "Config";
pub const TREE_EVENT: &str = "Event";
const ATTRIB_CONFIG_VERSION: &str = "version";
const ATTRIB_EVENT_NAME: &str = "Name";
const ATTRIB_EVENT_TABLE: &str = "Table";

/// One event of a venue together with its scoring methods.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventConfig {
    pub name: String,
    /// Whether the event's courses ever include a table.
    pub has_table: bool,
    pub scorings: ScoringMethodRegistry,
}

impl EventConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn load(node: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> Result<Self> {
        if node.name() != TREE_EVENT {
            bail!("Expected <{}>, found <{}>", TREE_EVENT, node.name());
        }
        let Some(name) = node.attrib(ATTRIB_EVENT_NAME) else {
            bail!("Missing required attribute '{}' on <{}>", ATTRIB_EVENT_NAME, TREE_EVENT)
        };
        let has_table = match node.get_attrib_bool(ATTRIB_EVENT_TABLE) {
            AttribLookup::Found(v) => v,
            AttribLookup::NotFound => false,
            AttribLookup::Invalid(raw) => {
                callback.log_message(&invalid_value_message(TREE_EVENT, ATTRIB_EVENT_TABLE, &raw));
                false
            }
        };
        let mut event = EventConfig {
            name: name.to_string(),
            has_table,
            scorings: ScoringMethodRegistry::new(),
        };
        event.scorings.load(node, doc_version, callback)?;
        Ok(event)
    }

    pub fn save(&self, parent: &mut Element) {
        let node = parent.add_child(TREE_EVENT);
        node.set_attrib(ATTRIB_EVENT_NAME, &self.name);
        if self.has_table {
            node.set_attrib_bool(ATTRIB_EVENT_TABLE, true);
        }
        self.scorings.save(node);
    }
}

/// Events of a venue, unique by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventList {
    events: Vec<EventConfig>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventConfig> {
        self.events.iter()
    }

    pub fn find(&self, name: &str) -> Option<&EventConfig> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut EventConfig> {
        self.events.iter_mut().find(|e| e.name == name)
    }

    /// Returns false if an event with that name already exists.
    pub fn add(&mut self, event: EventConfig) -> bool {
        if self.find(&event.name).is_some() {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.name != name);
        self.events.len() != before
    }
}

/// Root of a venue configuration document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VenueConfig {
    /// Embedded configuration version, distinct from the document version.
    pub version: u16,
    pub events: EventList,
}

impl VenueConfig {
    pub fn load(node: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> Result<Self> {
        if node.name() != TREE_CONFIG {
            bail!("Expected <{}>, found <{}>", TREE_CONFIG, node.name());
        }
        let version = match node.get_attrib::<u16>(ATTRIB_CONFIG_VERSION) {
            AttribLookup::Found(v) => v,
            AttribLookup::NotFound => bail!(
                "Missing required attribute '{}' on <{}>",
                ATTRIB_CONFIG_VERSION,
                TREE_CONFIG
            ),
            AttribLookup::Invalid(raw) => bail!(
                "Invalid value '{}' for attribute '{}' on <{}>",
                raw,
                ATTRIB_CONFIG_VERSION,
                TREE_CONFIG
            ),
        };
        let mut events = EventList::new();
        for child in node.children_named(TREE_EVENT) {
            let event = EventConfig::load(child, doc_version, callback)?;
            let name = event.name.clone();
            if !events.add(event) {
                callback.log_message(&format!("Duplicate event '{}' ignored", name));
            }
        }
        Ok(Self { version, events })
    }

    pub fn to_element(&self) -> Element {
        let mut root = Element::new(TREE_CONFIG);
        root.set_attrib(ATTRIB_CONFIG_VERSION, self.version);
        for event in self.events.iter() {
            event.save(&mut root);
        }
        root
    }
}
