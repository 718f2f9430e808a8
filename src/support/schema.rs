//! Route parameter declarations and their JSON schema.

use serde_json::{Map, Value};

/// Represents a query parameter accepted by a route
#[derive(Clone, Debug)]
pub struct ParamDef {
    /// Parameter name as it appears in the query string
    pub name:        &'static str,
    /// Description of the parameter
    pub description: &'static str,
    /// Whether this parameter is required
    pub required:    bool,
    /// Type of the parameter
    pub param_type:  ParamType,
}

/// Types of query parameters that can be declared
#[derive(Clone, Debug)]
pub enum ParamType {
    /// A free-form string
    String,
    /// A boolean with its default
    Boolean {
        /// Value when absent
        default: bool,
    },
    /// A strictly positive integer with its default
    PositiveInteger {
        /// Value when absent
        default: u32,
    },
    /// A repeatable string (`key=a&key=b`)
    StringArray,
    /// A string restricted to a fixed set of values
    Enum {
        /// Accepted values
        values:  Vec<&'static str>,
        /// Value when absent
        default: &'static str,
    },
    /// A string with a default value
    StringWithDefault {
        /// Value when absent
        default: &'static str,
    },
}

impl ParamDef {
    /// Declare a required string parameter
    pub const fn required_string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
            param_type: ParamType::String,
        }
    }

    /// Declare an optional parameter
    pub const fn optional(
        name: &'static str,
        description: &'static str,
        param_type: ParamType,
    ) -> Self {
        Self {
            name,
            description,
            required: false,
            param_type,
        }
    }
}

/// Builder for the JSON schema describing a route's query parameters
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required:   Vec<String>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Start an empty object schema
    pub fn new() -> Self {
        Self {
            properties: Map::new(),
            required:   Vec::new(),
        }
    }

    /// Add every parameter of a route
    pub fn add_params(self, params: &[ParamDef]) -> Self {
        params.iter().fold(self, Self::add_param)
    }

    /// Add a single declared parameter
    pub fn add_param(self, param: &ParamDef) -> Self {
        match &param.param_type {
            ParamType::String => {
                self.add_property(param, "string", None, Vec::new())
            }
            ParamType::StringWithDefault { default } => {
                self.add_property(param, "string", Some((*default).into()), Vec::new())
            }
            ParamType::Boolean { default } => {
                self.add_property(param, "boolean", Some((*default).into()), Vec::new())
            }
            ParamType::PositiveInteger { default } => {
                let extra = vec![("exclusiveMinimum", Value::from(0))];
                self.add_property(param, "integer", Some((*default).into()), extra)
            }
            ParamType::StringArray => {
                let mut items = Map::new();
                items.insert("type".to_string(), "string".into());
                self.add_property(param, "array", None, vec![("items", items.into())])
            }
            ParamType::Enum { values, default } => {
                let values: Vec<Value> = values.iter().map(|v| Value::from(*v)).collect();
                self.add_property(
                    param,
                    "string",
                    Some((*default).into()),
                    vec![("enum", values.into())],
                )
            }
        }
    }

    fn add_property(
        mut self,
        param: &ParamDef,
        type_name: &str,
        default: Option<Value>,
        extra: Vec<(&str, Value)>,
    ) -> Self {
        let mut prop = Map::new();
        prop.insert("type".to_string(), type_name.into());
        prop.insert("description".to_string(), param.description.into());

        if let Some(default_value) = default {
            prop.insert("default".to_string(), default_value);
        }
        for (key, value) in extra {
            prop.insert(key.to_string(), value);
        }

        self.properties.insert(param.name.to_string(), prop.into());

        if param.required {
            self.required.push(param.name.to_string());
        }

        self
    }

    /// Build the final schema
    pub fn build(self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".to_string(), "object".into());
        schema.insert("properties".to_string(), self.properties.into());

        if !self.required.is_empty() {
            schema.insert("required".to_string(), self.required.into());
        }

        schema
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn schema_lists_required_and_defaults() {
        let schema = SchemaBuilder::new()
            .add_params(&[
                ParamDef::required_string("url", "Dataset URL"),
                ParamDef::optional(
                    "strict",
                    "Treat warnings as errors",
                    ParamType::Boolean { default: false },
                ),
                ParamDef::optional(
                    "max_size",
                    "Statistics size",
                    ParamType::PositiveInteger { default: 1024 },
                ),
            ])
            .build();

        assert_eq!(schema["required"], json!(["url"]));
        assert_eq!(schema["properties"]["strict"]["default"], json!(false));
        assert_eq!(schema["properties"]["max_size"]["exclusiveMinimum"], json!(0));
    }

    #[test]
    fn enum_params_carry_their_values() {
        let schema = SchemaBuilder::new()
            .add_param(&ParamDef::optional(
                "asset_media_type",
                "Asset's media type",
                ParamType::Enum {
                    values:  vec!["image/png", "auto"],
                    default: "auto",
                },
            ))
            .build();

        let prop = &schema["properties"]["asset_media_type"];
        assert_eq!(prop["enum"], json!(["image/png", "auto"]));
        assert_eq!(prop["default"], json!("auto"));
        assert!(schema.get("required").is_none());
    }
}
