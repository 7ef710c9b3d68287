//! Command System
//!
//! Commands are what the chat front-end can ask the tracker to do.
//! They are registered at startup and dispatched by name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{ChatError, Result};

/// Command invocation coming from the chat surface
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandCall {
    /// Command identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl CommandCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// String argument, trimmed; empty strings count as missing
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric argument. Chat input arrives as text, so numeric strings
    /// are accepted alongside JSON numbers.
    pub fn number_arg(&self, key: &str) -> Result<Option<f64>> {
        match self.arguments.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ChatError::Parse(format!("'{}' is not a number", key))),
            Some(serde_json::Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ChatError::Parse(format!("'{}' is not a number: {}", key, s.trim()))),
            Some(other) => Err(ChatError::Parse(format!(
                "'{}' must be a number, got {}",
                key, other
            ))),
        }
    }
}

/// Reply produced by a command
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandReply {
    /// Command that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Text shown to the user
    pub text: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandReply {
    pub fn success(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            text: text.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            text: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameter definition for a command schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON type (string, number, boolean)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Example value shown in help
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl ParameterSchema {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            example: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// Command definition schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Unique command identifier
    pub name: String,

    /// Human-readable description (shown in help)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Whether the command changes stored state
    #[serde(default)]
    pub mutates_state: bool,
}

/// Command trait - implement to expose a capability to the chat surface
#[async_trait]
pub trait Command: Send + Sync {
    /// Get the command's schema
    fn schema(&self) -> CommandSchema;

    /// Execute the command with given arguments
    async fn execute(&self, call: &CommandCall) -> Result<CommandReply>;

    /// Validate arguments before execution (optional)
    fn validate(&self, call: &CommandCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(ChatError::Validation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Name answered by the registry itself unless a command claims it
pub const HELP_COMMAND: &str = "help";

/// Registry for available commands
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Register a new command
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let schema = command.schema();
        self.commands.insert(schema.name, Arc::new(command));
    }

    /// Get a command by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Execute a command call
    pub async fn execute(&self, call: &CommandCall) -> Result<CommandReply> {
        if call.name == HELP_COMMAND && !self.commands.contains_key(HELP_COMMAND) {
            let reply = CommandReply::success(HELP_COMMAND, self.help_text());
            return Ok(match &call.id {
                Some(id) => reply.with_id(id.clone()),
                None => reply,
            });
        }

        let command = self
            .get(&call.name)
            .ok_or_else(|| ChatError::CommandNotFound(call.name.clone()))?;

        command.validate(call)?;

        tracing::debug!(command = %call.name, "Dispatching command");
        let reply = command.execute(call).await?;

        Ok(match &call.id {
            Some(id) => reply.with_id(id.clone()),
            None => reply,
        })
    }

    /// Get all command schemas, ordered by name
    pub fn schemas(&self) -> Vec<CommandSchema> {
        self.commands.values().map(|c| c.schema()).collect()
    }

    /// Get command names, ordered
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render the help text listing every command
    pub fn help_text(&self) -> String {
        let mut text = String::from("📚 *Help:*\n");

        for schema in self.schemas() {
            text.push_str(&format!("• `{}` - {}\n", schema.name, schema.description));

            for param in &schema.parameters {
                let required = if param.required { "" } else { " (optional)" };
                text.push_str(&format!("    `{}`{}: {}", param.name, required, param.description));
                if let Some(example) = &param.example {
                    text.push_str(&format!(" e.g. `{}`", example));
                }
                text.push('\n');
            }
        }

        text
    }
}
