use serde::{Deserialize, Serialize};

use super::{FormErrors, required_text};
use crate::domain::Comment;

/// Add/edit submission for a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// The trimmed comment text, which must not be blank.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required_text(&mut errors, "text", &self.text, None);
        errors.into_result(text)
    }
}
