use crate::common::errors::{ConsoleError, Result};

const DEFAULT_GREETING: &str = "Welcome to the newsletter.";
const EMPTY_CONTENT_PLACEHOLDER: &str = "› Your newsletter content will appear here...";

/// Newsletter being composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub subject: String,
    pub content: String,
}

impl Draft {
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self { subject: subject.into(), content: content.into() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() || self.content.trim().is_empty() {
            return Err(ConsoleError::Validation("subject and content are required".to_string()));
        }
        Ok(())
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    // matches the composer badge: an empty body is still one line
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Plain-text rendition of what subscribers will read.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        out.push_str("Hey Reader,\n\n");
        if self.subject.trim().is_empty() {
            out.push_str(DEFAULT_GREETING);
        } else {
            out.push_str(self.subject.trim());
        }
        out.push_str("\n\n");
        if self.content.is_empty() {
            out.push_str(EMPTY_CONTENT_PLACEHOLDER);
            out.push('\n');
        } else {
            for line in self.content.split('\n') {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}
