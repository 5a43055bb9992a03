use serde::{Deserialize, Serialize};

/// Maximum task text length accepted by the editors, in characters.
pub const MAX_TASK_TEXT: usize = 80;

/// One user-entered to-do item. Tasks have no stable id; their identity is
/// their current index in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}
