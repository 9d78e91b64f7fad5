//! # Result Trees and Flattening
//!
//! Atoms produce a raw value shaped like the grammar: nested sequence,
//! repetition and maybe wrappers around matched slices and named maps.
//! Flattening reduces that raw shape to a [`Tree`], which is what callers see.
//!
//! ## Sequence
//!
//! Children are folded left to right:
//!
//! | left   | right  | result                                   |
//! |--------|--------|------------------------------------------|
//! | map    | map    | keys merged, right wins on duplicates    |
//! | list   | list   | concatenated                             |
//! | string | string | concatenated                             |
//! | string | other  | other (unnamed text is dropped)          |
//! | map    | list   | the map joins the list on its side       |
//! | unit   | any    | the other side                           |
//!
//! ## Repetition
//!
//! If any repetition produced a map, only the maps are kept, as a list. Else if
//! any produced a list, the lists are concatenated one level. Else the strings
//! are concatenated. Zero repetitions give an empty list when named and
//! [`Tree::Unit`] otherwise.
//!
//! ## Maybe
//!
//! The child's value, or [`Tree::Unit`] when it did not match.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::source::Slice;

/// The public shape of a parse result.
///
/// Lists and maps are reference counted, so cloning a tree is cheap no matter
/// how large it is. The memo table relies on this: a cached rule result is
/// handed out again without copying it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tree {
    /// Nothing was captured.
    #[default]
    Unit,
    /// Matched text.
    Str(Slice),
    /// Repeated values, in input order.
    List(Arc<Vec<Tree>>),
    /// Named values.
    Map(Arc<BTreeMap<String, Tree>>),
}

impl Tree {
    /// Builds a list tree.
    pub fn list(items: impl IntoIterator<Item = Tree>) -> Self {
        Tree::List(Arc::new(items.into_iter().collect()))
    }

    /// Builds a map tree. A key given twice keeps its last value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Tree)>) -> Self {
        Tree::Map(Arc::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()))
    }

    /// True for [`Tree::Unit`].
    pub fn is_unit(&self) -> bool {
        matches!(self, Tree::Unit)
    }

    /// The matched text, when this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::Str(slice) => Some(slice.as_str()),
            _ => None,
        }
    }

    /// The matched text with its input offset, when this is a string.
    pub fn as_slice(&self) -> Option<&Slice> {
        match self {
            Tree::Str(slice) => Some(slice),
            _ => None,
        }
    }

    /// The items, when this is a list.
    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The entries, when this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Tree>> {
        match self {
            Tree::Map(map) => Some(&**map),
            _ => None,
        }
    }

    /// Looks up `key` when this is a map.
    pub fn get(&self, key: &str) -> Option<&Tree> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Renders the tree as JSON: strings, arrays, objects and `null` for unit.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Tree::Unit => serde_json::Value::Null,
            Tree::Str(s) => serde_json::Value::String(s.as_str().to_string()),
            Tree::List(items) => serde_json::Value::Array(items.iter().map(Tree::to_json).collect()),
            Tree::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<&str> for Tree {
    fn from(text: &str) -> Self {
        Tree::Str(Slice::new(text, 0))
    }
}

impl From<Slice> for Tree {
    fn from(slice: Slice) -> Self {
        Tree::Str(slice)
    }
}

impl PartialEq<&str> for Tree {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Unit => f.write_str("nil"),
            Tree::Str(s) => write!(f, "{:?}", s),
            Tree::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Tree::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Unit => serializer.serialize_unit(),
            Tree::Str(s) => s.serialize(serializer),
            Tree::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Pre-flatten value built by atoms during matching.
#[derive(Debug, Clone)]
pub(crate) enum Raw {
    /// An already flat value: a slice, a named map, a rule's result, unit.
    Leaf(Tree),
    Sequence(Vec<Raw>),
    Repetition(Vec<Raw>),
    Maybe(Option<Box<Raw>>),
}

impl Raw {
    pub(crate) fn unit() -> Self {
        Raw::Leaf(Tree::Unit)
    }
}

/// A map merge overwrote an existing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate subtrees while merging result: key {:?} was overwritten",
            self.key
        )
    }
}

/// Reduces raw values to trees, collecting duplicate-key warnings on the way.
#[derive(Debug, Default)]
pub(crate) struct Flattener {
    warn: bool,
    warnings: Vec<DuplicateKey>,
}

impl Flattener {
    pub(crate) fn new(warn: bool) -> Self {
        Self {
            warn,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<DuplicateKey> {
        std::mem::take(&mut self.warnings)
    }

    /// Flattens `raw`. `named` is set when the result is about to be stored
    /// under a key, which only changes how an empty repetition reads.
    pub(crate) fn flatten(&mut self, raw: Raw, named: bool) -> Tree {
        match raw {
            Raw::Leaf(tree) => tree,
            Raw::Maybe(value) => value.map_or(Tree::Unit, |v| self.flatten(*v, false)),
            Raw::Sequence(items) => {
                let flat: Vec<Tree> = items.into_iter().map(|i| self.flatten(i, false)).collect();
                flat.into_iter()
                    .fold(Tree::Unit, |acc, item| self.merge(acc, item))
            }
            Raw::Repetition(items) => {
                let flat: Vec<Tree> = items.into_iter().map(|i| self.flatten(i, false)).collect();
                self.flatten_repetition(flat, named)
            }
        }
    }

    fn merge(&mut self, left: Tree, right: Tree) -> Tree {
        match (left, right) {
            (Tree::Unit, r) => r,
            (l, Tree::Unit) => l,
            (Tree::Map(mut l), Tree::Map(r)) => {
                let merged = Arc::make_mut(&mut l);
                for (key, value) in r.iter() {
                    if merged.insert(key.clone(), value.clone()).is_some() {
                        self.duplicate(key.clone());
                    }
                }
                Tree::Map(l)
            }
            (Tree::List(mut l), Tree::List(r)) => {
                Arc::make_mut(&mut l).extend(r.iter().cloned());
                Tree::List(l)
            }
            (Tree::Str(l), Tree::Str(r)) => Tree::Str(l.concat(&r)),
            (Tree::Str(_), r) => r,
            (l, Tree::Str(_)) => l,
            (Tree::Map(m), Tree::List(mut l)) => {
                Arc::make_mut(&mut l).insert(0, Tree::Map(m));
                Tree::List(l)
            }
            (Tree::List(mut l), Tree::Map(m)) => {
                Arc::make_mut(&mut l).push(Tree::Map(m));
                Tree::List(l)
            }
        }
    }

    fn flatten_repetition(&mut self, items: Vec<Tree>, named: bool) -> Tree {
        if items.iter().any(|t| matches!(t, Tree::Map(_))) {
            return Tree::list(items.into_iter().filter(|t| matches!(t, Tree::Map(_))));
        }
        if items.iter().any(|t| matches!(t, Tree::List(_))) {
            let mut joined = Vec::new();
            for item in items {
                if let Tree::List(inner) = item {
                    joined.extend(inner.iter().cloned());
                }
            }
            return Tree::list(joined);
        }
        if named && items.is_empty() {
            return Tree::list([]);
        }
        items
            .into_iter()
            .fold(Tree::Unit, |acc, item| self.merge(acc, item))
    }

    fn duplicate(&mut self, key: String) {
        if !self.warn {
            return;
        }
        tracing::warn!(
            target: "pegrat::flatten",
            key = %key,
            "duplicate subtrees while merging result, later value wins"
        );
        self.warnings.push(DuplicateKey { key });
    }
}
