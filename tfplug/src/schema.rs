//! Schema types and builders for tfplug
//!
//! A schema is an explicit field registry: every attribute a resource can
//! hold is declared here with its type, cardinality, mutability class and
//! validators. `ResourceData` refuses to store anything the registry does not
//! declare, and `Schema::validate` rejects bad configuration before any
//! handler runs.

use crate::types::{AttributePath, Diagnostic, Diagnostics, Dynamic};
use crate::validator::Validator;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scalar value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveType {
    String,
    Int,
    Bool,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Int => "int",
            PrimitiveType::Bool => "bool",
        }
    }

    /// Weak coercion in the style of Terraform's SDK: numbers and bools may
    /// be written as strings, and anything scalar can become a string.
    pub fn coerce(&self, value: &Dynamic) -> Option<Dynamic> {
        match (self, value) {
            (PrimitiveType::String, Dynamic::String(_)) => Some(value.clone()),
            (PrimitiveType::String, Dynamic::Bool(b)) => Some(Dynamic::String(b.to_string())),
            (PrimitiveType::String, Dynamic::Number(_)) => {
                value.as_i64().map(|n| Dynamic::String(n.to_string()))
            }
            (PrimitiveType::Int, Dynamic::Number(_)) => value.as_i64().map(Dynamic::from),
            (PrimitiveType::Int, Dynamic::String(s)) => s.parse::<i64>().ok().map(Dynamic::from),
            (PrimitiveType::Bool, Dynamic::Bool(_)) => Some(value.clone()),
            (PrimitiveType::Bool, Dynamic::String(s)) => s.parse::<bool>().ok().map(Dynamic::Bool),
            _ => None,
        }
    }

    fn zero(&self) -> Dynamic {
        match self {
            PrimitiveType::String => Dynamic::String(String::new()),
            PrimitiveType::Int => Dynamic::Number(0.0),
            PrimitiveType::Bool => Dynamic::Bool(false),
        }
    }
}

/// Element type of a list or set
#[derive(Debug, Clone)]
pub enum Element {
    Primitive(PrimitiveType),
    /// Nested block; each item is an object
    Block(Block),
}

/// AttributeType defines type and cardinality of an attribute
#[derive(Debug, Clone)]
pub enum AttributeType {
    Primitive(PrimitiveType),
    /// Ordered, allows duplicates
    List(Element),
    /// Unordered, no duplicates
    Set(Element),
}

impl AttributeType {
    pub fn name(&self) -> String {
        match self {
            AttributeType::Primitive(p) => p.name().to_string(),
            AttributeType::List(Element::Primitive(p)) => format!("list of {}", p.name()),
            AttributeType::Set(Element::Primitive(p)) => format!("set of {}", p.name()),
            AttributeType::List(Element::Block(_)) => "list of blocks".to_string(),
            AttributeType::Set(Element::Block(_)) => "set of blocks".to_string(),
        }
    }

    /// Value reported by `ResourceData::get` for an attribute removed from config
    pub fn zero(&self) -> Dynamic {
        match self {
            AttributeType::Primitive(p) => p.zero(),
            AttributeType::List(_) | AttributeType::Set(_) => Dynamic::empty_list(),
        }
    }
}

/// Applied to a configured value before it is written to state
pub type StateFunc = fn(&Dynamic) -> Dynamic;

/// Returns true when `old` and `new` should be treated as equal
pub type DiffSuppressFunc = fn(old: &str, new: &str) -> bool;

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub force_new: bool,
    pub deprecated: Option<String>,
    pub validators: Vec<Arc<dyn Validator>>,
    /// Sibling attributes that may not be set together with this one
    pub conflicts_with: Vec<String>,
    /// Sibling attributes that must be set whenever this one is
    pub required_with: Vec<String>,
    pub min_items: usize,
    /// 0 means unbounded
    pub max_items: usize,
    pub default: Option<Dynamic>,
    pub state_func: Option<StateFunc>,
    pub diff_suppress: Option<DiffSuppressFunc>,
}

// Manual Debug implementation since validators and function pointers are opaque
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("force_new", &self.force_new)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("conflicts_with", &self.conflicts_with)
            .field("required_with", &self.required_with)
            .field("default", &self.default)
            .field("state_func", &self.state_func.is_some())
            .finish()
    }
}

impl Attribute {
    /// Computed attributes that the configuration may not set
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Nested block of a list/set-of-blocks attribute
    pub fn block(&self) -> Option<&Block> {
        match &self.r#type {
            AttributeType::List(Element::Block(b)) | AttributeType::Set(Element::Block(b)) => {
                Some(b)
            }
            _ => None,
        }
    }

    fn validate_value(&self, value: &Dynamic, path: &AttributePath, diags: &mut Diagnostics) {
        match &self.r#type {
            AttributeType::Primitive(p) => self.validate_primitive(*p, value, path, diags),
            AttributeType::List(element) | AttributeType::Set(element) => {
                let Some(items) = value.as_list() else {
                    diags.push(type_error(path, &self.r#type.name(), value));
                    return;
                };
                if items.len() < self.min_items {
                    diags.push(
                        Diagnostic::error(
                            format!(
                                "{}: attribute supports {} item minimum, config has {} declared",
                                path,
                                self.min_items,
                                items.len()
                            ),
                            "",
                        )
                        .with_attribute(path.clone()),
                    );
                }
                if self.max_items > 0 && items.len() > self.max_items {
                    diags.push(
                        Diagnostic::error(
                            format!(
                                "{}: attribute supports {} item maximum, config has {} declared",
                                path,
                                self.max_items,
                                items.len()
                            ),
                            "",
                        )
                        .with_attribute(path.clone()),
                    );
                }
                for (i, item) in items.iter().enumerate() {
                    let item_path = path.clone().index(i);
                    match element {
                        Element::Primitive(p) => {
                            self.validate_primitive(*p, item, &item_path, diags)
                        }
                        Element::Block(block) => match item.as_map() {
                            Some(fields) => block.validate(fields, &item_path, diags),
                            None => diags.push(type_error(&item_path, "block", item)),
                        },
                    }
                }
            }
        }
    }

    fn validate_primitive(
        &self,
        p: PrimitiveType,
        value: &Dynamic,
        path: &AttributePath,
        diags: &mut Diagnostics,
    ) {
        match p.coerce(value) {
            Some(coerced) => {
                let rendered = path.to_string();
                for validator in &self.validators {
                    validator.validate(&coerced, &rendered, diags);
                }
            }
            None => diags.push(type_error(path, p.name(), value)),
        }
    }
}

fn type_error(path: &AttributePath, expected: &str, value: &Dynamic) -> Diagnostic {
    Diagnostic::error(
        format!(
            "{}: expected {}, got {}",
            path,
            expected,
            value.type_name()
        ),
        "",
    )
    .with_attribute(path.clone())
}

/// Block is the registry of attributes at one nesting level
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Block {
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn validate(
        &self,
        config: &BTreeMap<String, Dynamic>,
        path: &AttributePath,
        diags: &mut Diagnostics,
    ) {
        for (key, value) in config {
            if !value.is_null() && !self.attributes.contains_key(key) {
                diags.push(Diagnostic::error(
                    format!(
                        "An argument named \"{}\" is not expected here",
                        path.clone().attribute(key)
                    ),
                    "",
                ));
            }
        }

        for (name, attr) in &self.attributes {
            let attr_path = path.clone().attribute(name);
            let Some(value) = config.get(name).filter(|v| !v.is_null()) else {
                if attr.required {
                    diags.push(
                        Diagnostic::error(
                            format!("The argument \"{}\" is required", attr_path),
                            "",
                        )
                        .with_attribute(attr_path),
                    );
                }
                continue;
            };

            if attr.is_computed_only() {
                diags.push(
                    Diagnostic::error(
                        format!("{}: computed attributes cannot be set", attr_path),
                        "",
                    )
                    .with_attribute(attr_path),
                );
                continue;
            }

            if let Some(message) = &attr.deprecated {
                diags.push(
                    Diagnostic::warning(format!("\"{}\" is deprecated", attr_path), message)
                        .with_attribute(attr_path.clone()),
                );
            }

            for other in &attr.conflicts_with {
                if config.get(other).is_some_and(|v| !v.is_null()) {
                    diags.push(
                        Diagnostic::error(
                            format!("\"{}\": conflicts with {}", attr_path, other),
                            "",
                        )
                        .with_attribute(attr_path.clone()),
                    );
                }
            }

            for other in &attr.required_with {
                if !config.get(other).is_some_and(|v| !v.is_null()) {
                    diags.push(
                        Diagnostic::error(
                            format!(
                                "\"{}\": all of `{},{}` must be specified",
                                attr_path, name, other
                            ),
                            "",
                        )
                        .with_attribute(attr_path.clone()),
                    );
                }
            }

            attr.validate_value(value, &attr_path, diags);
        }
    }
}

/// Schema is returned by resources and data sources
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Increment when schema changes require state migration
    pub version: i64,
    pub description: String,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.get(name)
    }

    /// Checks a configuration object. Errors here mean no handler may run.
    pub fn validate(&self, config: &Dynamic) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match config {
            Dynamic::Null => self
                .block
                .validate(&BTreeMap::new(), &AttributePath::root(), &mut diags),
            Dynamic::Map(fields) => self
                .block
                .validate(fields, &AttributePath::root(), &mut diags),
            other => diags.add_error(
                format!("configuration must be an object, got {}", other.type_name()),
                None::<String>,
            ),
        }
        diags
    }

    /// Derives a read-only schema from a resource schema. The lookup keys
    /// become required, every other attribute becomes computed and loses its
    /// validators, defaults and conflicts.
    pub fn data_source_from_resource(&self, keys: &[&str]) -> Schema {
        let attributes = self
            .block
            .attributes
            .iter()
            .map(|(name, attr)| {
                let mut attr = attr.clone();
                let lookup = keys.contains(&name.as_str());
                attr.required = lookup;
                attr.optional = false;
                attr.computed = !lookup;
                attr.force_new = false;
                attr.default = None;
                attr.conflicts_with.clear();
                attr.required_with.clear();
                attr.min_items = 0;
                attr.max_items = 0;
                if !lookup {
                    attr.validators.clear();
                }
                (name.clone(), attr)
            })
            .collect();

        Schema {
            version: self.version,
            description: self.description.clone(),
            block: Block { attributes },
        }
    }
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                force_new: false,
                deprecated: None,
                validators: Vec::new(),
                conflicts_with: Vec::new(),
                required_with: Vec::new(),
                min_items: 0,
                max_items: 0,
                default: None,
                state_func: None,
                diff_suppress: None,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::Primitive(PrimitiveType::String))
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, AttributeType::Primitive(PrimitiveType::Int))
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Primitive(PrimitiveType::Bool))
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttributeType::List(Element::Primitive(PrimitiveType::String)))
    }

    pub fn string_set(name: &str) -> Self {
        Self::new(name, AttributeType::Set(Element::Primitive(PrimitiveType::String)))
    }

    pub fn block_list(name: &str, block: Block) -> Self {
        Self::new(name, AttributeType::List(Element::Block(block)))
    }

    pub fn block_set(name: &str, block: Block) -> Self {
        Self::new(name, AttributeType::Set(Element::Block(block)))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.attribute.deprecated = Some(message.to_string());
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn conflicts_with(mut self, others: &[&str]) -> Self {
        self.attribute
            .conflicts_with
            .extend(others.iter().map(|s| s.to_string()));
        self
    }

    pub fn required_with(mut self, others: &[&str]) -> Self {
        self.attribute
            .required_with
            .extend(others.iter().map(|s| s.to_string()));
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.attribute.min_items = min;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.attribute.max_items = max;
        self
    }

    pub fn default(mut self, value: impl Into<Dynamic>) -> Self {
        self.attribute.default = Some(value.into());
        self
    }

    pub fn state_func(mut self, f: StateFunc) -> Self {
        self.attribute.state_func = Some(f);
        self
    }

    pub fn diff_suppress(mut self, f: DiffSuppressFunc) -> Self {
        self.attribute.diff_suppress = Some(f);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas and nested blocks
#[derive(Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema
            .block
            .attributes
            .insert(attr.name.clone(), attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }

    /// Finalize as a nested block (version and description are dropped)
    pub fn build_block(self) -> Block {
        self.schema.block
    }
}
