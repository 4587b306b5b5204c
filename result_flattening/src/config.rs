// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// An ordered bag of attributes, as found on an XML element or a CSV line.
///
/// Inserting a name that is already present overwrites its value but keeps
/// the position of the first insertion.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AttrBag {
    entries: Vec<(String, String)>,
}

impl AttrBag {
    pub fn new() -> AttrBag {
        AttrBag {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.entries.push((name.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Writes all the entries of `other` on top of this bag. Last write wins.
    pub fn overlay(&mut self, other: &AttrBag) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for AttrBag {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut bag = AttrBag::new();
        for (name, value) in iter {
            bag.insert(name, value);
        }
        bag
    }
}

/// The identifier of a municipality in the registry.
///
/// It is kept as an opaque string: the source uses it verbatim in URLs.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct MunicipalityCode(pub String);

impl MunicipalityCode {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for MunicipalityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An XML element of a result document.
///
/// Only the element structure is kept: text content and comments are not
/// used by the results documents.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attributes: AttrBag,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: &str) -> Element {
        Element {
            name: name.to_string(),
            attributes: AttrBag::new(),
            children: Vec::new(),
        }
    }

    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }
}

// ******** Output data structures *********

/// One denormalized line of the output table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlatRow {
    pub fields: AttrBag,
}

impl FlatRow {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    /// The values for the given column names, in that order. Missing fields are blank.
    pub fn project<'a>(&'a self, field_names: &[String]) -> Vec<&'a str> {
        field_names
            .iter()
            .map(|name| self.fields.get(name).unwrap_or(""))
            .collect()
    }

    /// The fields of this row that are not listed in `field_names`.
    pub fn unknown_fields<'a>(&'a self, field_names: &[String]) -> Vec<&'a str> {
        self.fields
            .names()
            .filter(|name| !field_names.iter().any(|f| f == name))
            .collect()
    }
}

/// The nodes of a result document that the flattening relies on.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ResultNode {
    Municipality,
    ResultBlock,
    Participation,
}

impl Display for ResultNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultNode::Municipality => "municipality",
            ResultNode::ResultBlock => "result block",
            ResultNode::Participation => "participation",
        };
        write!(f, "{}", s)
    }
}

/// Errors that prevent a result document from being flattened.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FlattenErrors {
    /// The document does not have the expected nesting.
    MissingNode { node: ResultNode, parent: String },
}

impl Error for FlattenErrors {}

impl Display for FlattenErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlattenErrors::MissingNode { node, parent } => {
                write!(f, "missing {} node under <{}>", node, parent)
            }
        }
    }
}
