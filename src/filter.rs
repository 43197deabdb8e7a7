//! Filtering collections with a compiled expression.

use std::collections::HashMap;

use crate::{
    evaluator::{CompileOptions, EvalError, Evaluator},
    parser::ParseError,
    value::Value,
};

/// Keeps the elements of a collection that an expression matches.
///
/// # Examples
///
/// ```
/// use verdict::{Filter, Value};
///
/// let filter = Filter::new(r#"Env == "prod""#).unwrap();
/// let services = Value::from(serde_json::json!([
///     {"Name": "web", "Env": "prod"},
///     {"Name": "db", "Env": "dev"},
/// ]));
///
/// let kept = filter.execute(&services).unwrap();
/// assert_eq!(kept, Value::from(serde_json::json!([{"Name": "web", "Env": "prod"}])));
/// ```
#[derive(Debug)]
pub struct Filter {
    evaluator: Evaluator,
}

impl Filter {
    pub fn new(expression: &str) -> Result<Self, ParseError> {
        Evaluator::new(expression).map(Filter::from)
    }

    pub fn with_options(expression: &str, options: CompileOptions) -> Result<Self, ParseError> {
        Evaluator::with_options(expression, options).map(Filter::from)
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Filters an array (keeping order) or an object (keeping matching
    /// entries). Any other shape is a type error, as is any element error.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = data.type_name()))]
    pub fn execute(&self, data: &Value) -> Result<Value, EvalError> {
        match data {
            Value::Array(items) => {
                let kept: Vec<Value> = self.select(items)?.into_iter().cloned().collect();
                tracing::debug!(total = items.len(), kept = kept.len(), "filtered array");
                Ok(Value::Array(kept))
            }
            Value::Object(map) => {
                let mut kept = HashMap::new();
                for (key, value) in map {
                    if self.evaluator.evaluate(value)? {
                        kept.insert(key.clone(), value.clone());
                    }
                }
                tracing::debug!(total = map.len(), kept = kept.len(), "filtered object");
                Ok(Value::Object(kept))
            }
            other => Err(EvalError::TypeError(format!(
                "filter requires an array or object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Returns references to the matching items, in order.
    pub fn select<'a, I>(&self, items: I) -> Result<Vec<&'a Value>, EvalError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut kept = Vec::new();
        for item in items {
            if self.evaluator.evaluate(item)? {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}

impl From<Evaluator> for Filter {
    fn from(evaluator: Evaluator) -> Self {
        Filter { evaluator }
    }
}
