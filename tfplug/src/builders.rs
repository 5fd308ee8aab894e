use crate::schema::{Attribute, AttributeBuilder, Block, Schema, SchemaBuilder};
use crate::types::Dynamic;

/// Shorthand for the attribute shapes provider schemas use over and over.
/// Anything unusual goes through `attribute`.
#[derive(Default)]
pub struct FluentSchemaBuilder {
    builder: SchemaBuilder,
}

impl FluentSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.builder = self.builder.version(version);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.builder = self.builder.description(description);
        self
    }

    pub fn required_string(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .required()
                .description(description)
                .build(),
        );
        self
    }

    /// Required identifier; changing it replaces the resource
    pub fn required_string_force_new(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .required()
                .force_new()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_string(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .optional()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_sensitive_string(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .optional()
                .sensitive()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_computed_string(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .optional()
                .computed()
                .description(description)
                .build(),
        );
        self
    }

    pub fn computed_string(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string(name)
                .computed()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_bool(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::bool(name)
                .optional()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_computed_bool(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::bool(name)
                .optional()
                .computed()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_bool_with_default(
        mut self,
        name: &str,
        description: &str,
        default: bool,
    ) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::bool(name)
                .optional()
                .default(Dynamic::Bool(default))
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_int(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::int(name)
                .optional()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_computed_int(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::int(name)
                .optional()
                .computed()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_string_set(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string_set(name)
                .optional()
                .description(description)
                .build(),
        );
        self
    }

    pub fn optional_string_list(mut self, name: &str, description: &str) -> Self {
        self.builder = self.builder.attribute(
            AttributeBuilder::string_list(name)
                .optional()
                .description(description)
                .build(),
        );
        self
    }

    /// Escape hatch for attributes the shorthands above do not cover
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.builder = self.builder.attribute(attribute);
        self
    }

    pub fn build(self) -> Schema {
        self.builder.build()
    }

    pub fn build_block(self) -> Block {
        self.builder.build_block()
    }
}

impl Schema {
    pub fn builder() -> FluentSchemaBuilder {
        FluentSchemaBuilder::new()
    }
}
