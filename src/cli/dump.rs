//! Show how an expression parses

use crate::{Expression, parse, to_expression_string, to_grouped_string};

use super::CliError;

/// Printable forms of a parsed expression
#[derive(Debug, Clone)]
pub struct DumpOutput {
    pub canonical: String,
    pub grouped: String,
    pub leaves: usize,
    pub tree: Expression,
}

/// Parse an expression and collect its printable forms
pub fn execute_dump(expression: &str, max_expressions: usize) -> Result<DumpOutput, CliError> {
    let tree = parse(expression, max_expressions)?;
    Ok(DumpOutput {
        canonical: to_expression_string(&tree),
        grouped: to_grouped_string(&tree),
        leaves: tree.leaf_count(),
        tree,
    })
}
