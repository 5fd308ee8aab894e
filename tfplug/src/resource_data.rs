//! The field map handed to resource and data source handlers
//!
//! `ResourceData` wraps one resource instance for the duration of a single
//! operation: the prior state, the configuration (during create and update),
//! and whatever the handler writes back. Every key is checked against the
//! schema so handlers cannot invent attributes or store the wrong type.

use crate::error::{Result, TfplugError};
use crate::schema::{Attribute, AttributeType, Element, PrimitiveType, Schema};
use crate::types::Dynamic;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    id: String,
    state: BTreeMap<String, Dynamic>,
    /// Present during create and update only
    config: Option<BTreeMap<String, Dynamic>>,
    values: BTreeMap<String, Dynamic>,
}

impl ResourceData {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            id: String::new(),
            state: BTreeMap::new(),
            config: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_state(mut self, state: BTreeMap<String, Dynamic>) -> Self {
        self.state = state;
        self
    }

    pub fn with_config(mut self, config: BTreeMap<String, Dynamic>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Marks the instance as gone; the caller drops it from state
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Current value of `key`, or null if nothing supplies one. Configured
    /// values come back normalized, so sets are sorted.
    ///
    /// Lookup order: values written during this operation, then the
    /// configuration (computed attributes fall back to prior state when not
    /// configured), then prior state when there is no configuration, then the
    /// schema default. A plain attribute removed from the configuration
    /// reads as its zero value so updates clear it remotely.
    pub fn get(&self, key: &str) -> Dynamic {
        let Some(attr) = self.schema.attribute(key) else {
            return Dynamic::Null;
        };
        if let Some(value) = self.values.get(key) {
            return value.clone();
        }
        let configured = match &self.config {
            Some(config) => match config.get(key).filter(|v| !v.is_null()) {
                Some(value) => Some(
                    normalize(&attr.r#type, value.clone(), key).unwrap_or_else(|_| value.clone()),
                ),
                None if attr.computed => self.prior(key),
                None => None,
            },
            None => self.prior(key),
        };
        configured
            .or_else(|| attr.default.clone())
            .or_else(|| self.removed(attr).then(|| attr.r#type.zero()))
            .unwrap_or(Dynamic::Null)
    }

    fn removed(&self, attr: &Attribute) -> bool {
        self.config.is_some() && !attr.computed && self.prior(&attr.name).is_some()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).as_string().map(str::to_string)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).as_bool()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).as_i64()
    }

    /// Elements of a primitive list or set of strings
    pub fn get_strings(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).as_string_vec()
    }

    /// Items of a nested block list or set
    pub fn get_blocks(&self, key: &str) -> Vec<BTreeMap<String, Dynamic>> {
        match self.get(key) {
            Dynamic::List(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Dynamic::Map(fields) => Some(fields),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the configuration changes `key` relative to prior state.
    /// Configured values go through the attribute's state function first, so
    /// a hashed password compares against its stored hash. A computed
    /// attribute left out of the configuration keeps its prior value.
    pub fn has_change(&self, key: &str) -> bool {
        let (Some(config), Some(attr)) = (&self.config, self.schema.attribute(key)) else {
            return false;
        };
        let new = match config.get(key).filter(|v| !v.is_null()) {
            Some(value) => normalize(&attr.r#type, value.clone(), key)
                .ok()
                .map(|v| apply_state_func(attr, &v)),
            None if attr.computed => return false,
            None => None,
        };
        new != self.prior(key)
    }

    /// Stores `value` for `key` after checking it against the schema.
    ///
    /// Sets are sorted and deduplicated. When the attribute has a diff
    /// suppression function and it reports the incoming value equal to the
    /// current one, the current value is kept.
    pub fn set(&mut self, key: &str, value: impl Into<Dynamic>) -> Result<()> {
        let attr = self
            .schema
            .attribute(key)
            .ok_or_else(|| TfplugError::UnknownAttribute(key.to_string()))?;
        let value = normalize(&attr.r#type, value.into(), key)?;

        if let Some(suppress) = attr.diff_suppress {
            let current = self.get(key);
            if let (Some(incoming), Some(existing)) = (value.as_string(), current.as_string()) {
                if suppress(incoming, existing) {
                    self.values.insert(key.to_string(), current);
                    return Ok(());
                }
            }
        }

        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// `set` for values the server may omit; `None` leaves the field alone
    pub fn set_opt<T: Into<Dynamic>>(&mut self, key: &str, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.set(key, value),
            None => Ok(()),
        }
    }

    /// The attribute map to persist after this operation
    pub fn state(&self) -> BTreeMap<String, Dynamic> {
        let mut out = BTreeMap::new();
        for (name, attr) in &self.schema.block.attributes {
            let value = if let Some(value) = self.values.get(name) {
                Some(value.clone())
            } else if let Some(config) = &self.config {
                match config.get(name).filter(|v| !v.is_null()) {
                    Some(value) => normalize(&attr.r#type, value.clone(), name)
                        .ok()
                        .map(|v| apply_state_func(attr, &v)),
                    None if attr.computed => self.prior(name),
                    None => attr.default.clone(),
                }
            } else {
                self.prior(name)
            };
            if let Some(value) = value.filter(|v| !v.is_null()) {
                out.insert(name.clone(), value);
            }
        }
        out
    }

    fn prior(&self, key: &str) -> Option<Dynamic> {
        self.state.get(key).filter(|v| !v.is_null()).cloned()
    }
}

fn apply_state_func(attr: &Attribute, value: &Dynamic) -> Dynamic {
    match attr.state_func {
        Some(f) => f(value),
        None => value.clone(),
    }
}

fn mismatch(key: &str, expected: String, value: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        attribute: key.to_string(),
        expected,
        actual: value.type_name().to_string(),
    }
}

fn normalize(ty: &AttributeType, value: Dynamic, key: &str) -> Result<Dynamic> {
    if value.is_null() {
        return Ok(value);
    }
    match ty {
        AttributeType::Primitive(p) => coerce(*p, &value, key),
        AttributeType::List(element) => {
            let items = normalize_items(ty, element, value, key)?;
            Ok(Dynamic::List(items))
        }
        AttributeType::Set(element) => {
            let mut items = normalize_items(ty, element, value, key)?;
            items.sort_by_cached_key(|item| serde_json::to_string(item).unwrap_or_default());
            items.dedup();
            Ok(Dynamic::List(items))
        }
    }
}

fn coerce(p: PrimitiveType, value: &Dynamic, key: &str) -> Result<Dynamic> {
    p.coerce(value)
        .ok_or_else(|| mismatch(key, p.name().to_string(), value))
}

fn normalize_items(
    ty: &AttributeType,
    element: &Element,
    value: Dynamic,
    key: &str,
) -> Result<Vec<Dynamic>> {
    let Dynamic::List(items) = value else {
        return Err(mismatch(key, ty.name(), &value));
    };
    items
        .into_iter()
        .map(|item| match element {
            Element::Primitive(p) => coerce(*p, &item, key),
            Element::Block(block) => {
                let Dynamic::Map(fields) = item else {
                    return Err(mismatch(key, "block".to_string(), &item));
                };
                let mut out = BTreeMap::new();
                for (name, field) in fields {
                    let nested = block.get(&name).ok_or_else(|| {
                        TfplugError::UnknownAttribute(format!("{}.{}", key, name))
                    })?;
                    let path = format!("{}.{}", key, name);
                    out.insert(name, normalize(&nested.r#type, field, &path)?);
                }
                Ok(Dynamic::Map(out))
            }
        })
        .collect()
}

/// Collects field failures while packing an entity so that every field is
/// attempted before the operation fails.
#[derive(Debug)]
pub struct MarshalErrors {
    entity: String,
    errors: Vec<String>,
}

impl MarshalErrors {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.errors.push(e.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(TfplugError::Marshal {
                entity: self.entity,
                errors: self.errors,
            })
        }
    }
}
