//! Action extraction from identity-based policy documents

use crate::error::{SentinelError, SentinelResult};
use serde::Deserialize;
use serde_json::Value;

/// The `Action` element of a statement: IAM accepts a bare string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActionField {
    Single(String),
    Multiple(Vec<String>),
}

impl ActionField {
    fn into_actions(self) -> Vec<String> {
        match self {
            ActionField::Single(action) => vec![action],
            ActionField::Multiple(actions) => actions,
        }
    }
}

/// Flatten every statement's `Action` into one ordered list.
///
/// Order is document order, then order within the statement. Duplicates are
/// kept. `Statement` may be a single object or a list of them.
pub fn extract_actions(document: &Value) -> SentinelResult<Vec<String>> {
    let statements = match document.get("Statement") {
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            return Err(SentinelError::malformed_document(format!(
                "Statement must be an object or a list, found: {other}"
            )))
        }
        None => {
            return Err(SentinelError::malformed_document(
                "policy document has no Statement",
            ))
        }
    };

    let mut actions = Vec::new();
    for (index, statement) in statements.into_iter().enumerate() {
        let field = statement.get("Action").ok_or_else(|| {
            SentinelError::malformed_document(format!("statement {index} has no Action"))
        })?;
        let field = ActionField::deserialize(field).map_err(|e| {
            SentinelError::malformed_document(format!(
                "statement {index} has an invalid Action: {e}"
            ))
        })?;
        actions.extend(field.into_actions());
    }
    Ok(actions)
}
