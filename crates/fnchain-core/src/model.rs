//! Function and dependency records as they appear in a backend config.
//!
//! A backend config maps function names to config items. Each item may carry
//! a `dependsOn` list of typed [`Dependency`] records; only records whose
//! category is `"function"` form edges of the function graph. Everything the
//! core does not interpret (`build`, `providerPlugin`, `service`, ...) is kept
//! in an ordered pass-through bag and written back verbatim, in its original
//! key position.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Dependency category that participates in the function graph.
pub const FUNCTION_CATEGORY: &str = "function";

/// Key of the dependency list inside a function config item.
pub const DEPENDS_ON_KEY: &str = "dependsOn";

// ---------------------------------------------------------------------------
// Dependency
// ---------------------------------------------------------------------------

/// A typed edge out of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Attribute names consumed from the target (e.g. `Name`, `Arn`).
    #[serde(default)]
    pub attributes: Vec<String>,
    /// `"function"` or any other resource category.
    pub category: String,
    /// Target identifier. For function edges, a key of the function set.
    pub resource_name: String,
    /// Fields the core does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dependency {
    /// Build a `"function"`-category dependency on `target` exposing `attribute`.
    pub fn function(target: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            attributes: vec![attribute.into()],
            category: FUNCTION_CATEGORY.to_string(),
            resource_name: target.into(),
            extra: Map::new(),
        }
    }

    /// Returns `true` if this dependency is a function-to-function edge.
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.category == FUNCTION_CATEGORY
    }
}

// ---------------------------------------------------------------------------
// Function
// ---------------------------------------------------------------------------

/// One function config item.
///
/// `fields` keeps every key of the original item in document order. When the
/// item had a `dependsOn` key, its slot in `fields` holds a placeholder and
/// the parsed list lives in `depends_on`; serialization puts it back in the
/// same position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    depends_on: Option<Vec<Dependency>>,
    fields: Map<String, Value>,
}

impl Function {
    /// A function with the given dependency list and no other fields.
    #[must_use]
    pub fn with_dependencies(dependencies: Vec<Dependency>) -> Self {
        Self {
            depends_on: Some(dependencies),
            fields: Map::new(),
        }
    }

    /// All dependencies, in declaration order. Empty when `dependsOn` is absent.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        self.depends_on.as_deref().unwrap_or_default()
    }

    /// Targets of `"function"`-category dependencies, in declaration order.
    pub fn function_targets(&self) -> impl Iterator<Item = &str> {
        self.dependencies()
            .iter()
            .filter(|dep| dep.is_function())
            .map(|dep| dep.resource_name.as_str())
    }

    /// Returns `true` if no dependency has the `"function"` category.
    #[must_use]
    pub fn is_dependency_free(&self) -> bool {
        !self.dependencies().iter().any(Dependency::is_function)
    }

    /// Returns `true` if the function has no dependencies of any category.
    #[must_use]
    pub fn has_no_dependencies(&self) -> bool {
        self.dependencies().is_empty()
    }

    /// Append a dependency, creating the `dependsOn` list if absent.
    pub fn push_dependency(&mut self, dependency: Dependency) {
        self.depends_on.get_or_insert_with(Vec::new).push(dependency);
    }
}

impl Serialize for Function {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_slot = self.fields.contains_key(DEPENDS_ON_KEY);
        let appended = usize::from(!has_slot && self.depends_on.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + appended))?;
        for (key, value) in &self.fields {
            if key == DEPENDS_ON_KEY {
                map.serialize_entry(key, &self.depends_on)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        if appended == 1 {
            map.serialize_entry(DEPENDS_ON_KEY, &self.depends_on)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Function {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let depends_on = match fields.get_mut(DEPENDS_ON_KEY) {
            Some(slot) => match slot.take() {
                Value::Null => None,
                raw => Some(
                    serde_json::from_value::<Vec<Dependency>>(raw)
                        .map_err(|e| de::Error::custom(format!("invalid dependsOn: {e}")))?,
                ),
            },
            None => None,
        };
        Ok(Self { depends_on, fields })
    }
}

// ---------------------------------------------------------------------------
// FunctionSet
// ---------------------------------------------------------------------------

/// Ordered map of function name to [`Function`].
///
/// Iteration follows the key order of the source document; every algorithm
/// in this crate treats that order as the stable key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionSet {
    entries: Vec<(String, Function)>,
    index: HashMap<String, usize>,
}

impl FunctionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a function. An existing name keeps its position and gets the
    /// new value.
    pub fn insert(&mut self, name: impl Into<String>, function: Function) {
        let name = name.into();
        if let Some(&pos) = self.index.get(&name) {
            self.entries[pos].1 = function;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, function));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.index.get(name).map(|&pos| &mut self.entries[pos].1)
    }

    /// Position of `name` in key order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.entries.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// `"function"`-category targets of `name`; empty for unknown names.
    #[must_use]
    pub fn function_targets(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|f| f.function_targets().collect())
            .unwrap_or_default()
    }

    /// Names of functions without any `"function"` dependency, in key order.
    #[must_use]
    pub fn dependency_free(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, f)| f.is_dependency_free())
            .map(|(name, _)| name)
            .collect()
    }

    /// Number of functions with at least one `"function"` dependency.
    #[must_use]
    pub fn dependent_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, f)| !f.is_dependency_free())
            .count()
    }
}

impl<N: Into<String>> FromIterator<(N, Function)> for FunctionSet {
    fn from_iter<I: IntoIterator<Item = (N, Function)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, function) in iter {
            set.insert(name, function);
        }
        set
    }
}

impl Serialize for FunctionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, function) in &self.entries {
            map.serialize_entry(name, function)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FunctionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = FunctionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of function names to config items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FunctionSet, A::Error> {
                let mut set = FunctionSet::new();
                while let Some((name, function)) = access.next_entry::<String, Function>()? {
                    set.insert(name, function);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}
