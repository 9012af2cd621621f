//! Definition and output types shared by every tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::{ErrorKind, MutationResult};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// JSON-schema description of one tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl PropertySchema {
    fn typed(schema_type: &str, description: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            description: description.to_string(),
            default: None,
            items: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::typed("string", description)
    }

    pub fn integer(description: &str) -> Self {
        Self::typed("integer", description)
    }

    pub fn boolean(description: &str) -> Self {
        Self::typed("boolean", description)
    }

    pub fn string_array(description: &str) -> Self {
        Self {
            items: Some(Box::new(Self::typed("string", "Item identifier"))),
            ..Self::typed("array", description)
        }
    }

    /// An integer month, 1 through 12.
    pub fn month() -> Self {
        Self {
            minimum: Some(1),
            maximum: Some(12),
            ..Self::integer("Month number (1-12)")
        }
    }

    /// An optional year that defaults to the selected one.
    pub fn year() -> Self {
        Self::integer("Year (defaults to the currently selected year)")
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// The `parameters` object of a tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolInputSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn property(mut self, name: &str, schema: PropertySchema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn required_property(mut self, name: &str, schema: PropertySchema) -> Self {
        self.required.push(name.to_string());
        self.property(name, schema)
    }
}

/// What an agent provider is told about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "parameters")]
    pub input_schema: ToolInputSchema,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A tool's JSON response: `{success, reason?, message, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    pub message: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: None,
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn failure(reason: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::failure(ErrorKind::InvalidArgument, message)
    }

    /// Convert an engine result, keeping its metadata as top-level fields.
    pub fn from_mutation(result: &MutationResult) -> Self {
        let mut output = Self {
            success: result.success,
            reason: result.reason,
            message: result.message.clone(),
            data: Map::new(),
        };
        if let Some(op) = result.operation {
            output = output.with("operation", op);
        }
        if let Ok(Value::Object(details)) = serde_json::to_value(&result.details) {
            output.data.extend(details);
        }
        output
    }

    /// Attach a field.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            warn!(key, %err, "tool output field did not serialize");
            Value::Null
        });
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
