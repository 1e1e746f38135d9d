//! Declarative YAML scenarios

use pizzamock_common::FixtureKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Seed data the mock is reset to before the first step
    #[serde(default)]
    pub fixture: FixtureKind,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Send one request and check the response
    Request {
        #[serde(default = "default_method")]
        method: String,
        path: String,
        #[serde(default)]
        body: Option<Value>,
        #[serde(default)]
        expect: Expectation,
    },

    /// Drop all mock state back to the scenario's fixture
    Reset,

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message (for debugging)
    Log { message: String },
}

fn default_method() -> String {
    "GET".to_string()
}

/// What a response must look like. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectation {
    #[serde(default)]
    pub status: Option<u16>,

    /// Subset of the JSON body
    #[serde(default)]
    pub json: Option<Value>,

    /// Substrings the raw body must contain
    #[serde(default)]
    pub contains: Vec<String>,

    /// Substrings the raw body must not contain
    #[serde(default)]
    pub absent: Vec<String>,
}

impl Expectation {
    /// Check a response against this expectation, describing the first mismatch
    pub fn check(&self, status: u16, text: &str) -> Result<(), String> {
        if let Some(expected) = self.status {
            if expected != status {
                return Err(format!("expected status {}, got {}: {}", expected, status, text));
            }
        }

        if let Some(expected) = &self.json {
            let actual: Value = serde_json::from_str(text)
                .map_err(|e| format!("response is not JSON ({}): {}", e, text))?;
            json_subset(expected, &actual, "$")?;
        }

        for needle in &self.contains {
            if !text.contains(needle.as_str()) {
                return Err(format!("response does not contain {:?}: {}", needle, text));
            }
        }
        for needle in &self.absent {
            if text.contains(needle.as_str()) {
                return Err(format!("response unexpectedly contains {:?}: {}", needle, text));
            }
        }

        Ok(())
    }
}

/// Every key of an expected object must match in the actual value. Arrays
/// must have the same length and match element by element.
pub fn json_subset(expected: &Value, actual: &Value, path: &str) -> Result<(), String> {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, want) in want {
                let here = format!("{}.{}", path, key);
                match got.get(key) {
                    Some(got) => json_subset(want, got, &here)?,
                    None => return Err(format!("{}: missing", here)),
                }
            }
            Ok(())
        }
        (Value::Array(want), Value::Array(got)) => {
            if want.len() != got.len() {
                return Err(format!(
                    "{}: expected {} element(s), got {}",
                    path,
                    want.len(),
                    got.len()
                ));
            }
            for (i, (want, got)) in want.iter().zip(got).enumerate() {
                json_subset(want, got, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        (Value::Number(want), Value::Number(got)) if want.as_f64() == got.as_f64() => Ok(()),
        _ if expected == actual => Ok(()),
        _ => Err(format!("{}: expected {}, got {}", path, expected, actual)),
    }
}

impl ScenarioSpec {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, ordered by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(E2eError::SpecParse(format!(
                "scenario directory not found: {}",
                dir.display()
            )));
        }

        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.has_tag(tag)).collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
