use crate::domain::Intent;

/// What the completion engine asked for after a reasoning round.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    CallTool { intent: Intent },
    Final { answer: String },
}
