//! Evaluate verdict expressions against JSON input

use crate::{CompileOptions, DEFAULT_TAG_NAME, Evaluator, Filter};

use super::{CliError, parse_json_input, render_json};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print filtered output
    pub pretty: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Filter the input collection instead of evaluating it as one datum
    pub filter: bool,
    /// Maximum number of match expressions (0 = unlimited)
    pub max_expressions: usize,
    /// Tag name used for record field aliases
    pub tag_name: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            expression: String::new(),
            input: None,
            pretty: false,
            syntax_only: false,
            filter: false,
            max_expressions: 0,
            tag_name: DEFAULT_TAG_NAME.to_string(),
        }
    }
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The verdict for the whole input
    Verdict(bool),
    /// The matching elements, rendered as JSON text
    Filtered(String),
}

/// Execute a verdict check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let compile_options = CompileOptions::new()
        .with_max_expressions(options.max_expressions)
        .with_tag_name(options.tag_name.clone());
    let evaluator = Evaluator::with_options(&options.expression, compile_options)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let datum = parse_json_input(input)?;

    if options.filter {
        let kept = Filter::from(evaluator).execute(&datum)?;
        let rendered = render_json(&kept, &options.tag_name, options.pretty)?;
        return Ok(CheckResult::Filtered(rendered));
    }

    Ok(CheckResult::Verdict(evaluator.evaluate(&datum)?))
}
