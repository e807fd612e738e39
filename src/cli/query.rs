//! Execute jsonq commands against JSON input

use super::CliError;
use crate::{BoolEvaluator, Document, Evaluator, convert::value_to_json, json_to_value};

/// Options for the get command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Path to evaluate
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Filter expression, with any `@.field` references already substituted
    pub expression: String,
}

/// Options for the put command
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Target path; its last component is the key written
    pub path: String,
    /// JSON text of the value to write
    pub value: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Leave existing members untouched
    pub keep: bool,
}

fn load(input: Option<&String>) -> Result<Document, CliError> {
    let text = input.ok_or(CliError::NoInput)?;
    Ok(Document::from_json(text)?)
}

/// Run a path and return the collapsed result as JSON.
pub fn execute_get(options: &QueryOptions) -> Result<serde_json::Value, CliError> {
    let document = load(options.input.as_ref())?;
    let result = document.get(&options.path)?;
    Ok(value_to_json(result.value()))
}

/// One line per segment: its classification, then the raw fragment.
pub fn execute_explain(path: &str) -> Result<String, CliError> {
    let evaluator = Evaluator::new();
    evaluator.compile(path)?;

    let classifier = evaluator.classifier();
    let mut out = String::new();
    for fragment in classifier.split(path) {
        out.push_str(&format!("{:<12} {}\n", classifier.classify(&fragment), fragment));
    }
    Ok(out)
}

pub fn execute_eval(options: &EvalOptions) -> Result<bool, CliError> {
    Ok(BoolEvaluator::new().evaluate(&options.expression)?)
}

/// Apply a put and return the whole modified document.
pub fn execute_put(options: &PutOptions) -> Result<serde_json::Value, CliError> {
    let document = load(options.input.as_ref())?;
    let value = json_to_value(serde_json::from_str(&options.value)?);

    if options.keep {
        let (parent, key) = crate::transform::split_target(&options.path);
        document.put_all(parent, false, vec![(key, value)])?;
    } else {
        document.put(&options.path, value)?;
    }
    Ok(value_to_json(document.value()))
}
