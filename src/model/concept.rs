//! Business concept definitions

use serde::{Deserialize, Serialize};

/// A named business entity, declared independently of the hooks using it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    /// One or two sentence definition, 10 to 200 characters
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Reference/time concepts are weak and hooked with the weak prefix
    #[serde(default)]
    pub is_weak: bool,
}

impl Concept {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            examples: Vec::new(),
            is_weak: false,
        }
    }

    pub fn weak(mut self) -> Self {
        self.is_weak = true;
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}
