use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::errors::ConsoleError;

pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=Image+Error";

/// A user-submitted wallpaper awaiting (or past) moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallpaper {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_approved: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl Wallpaper {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), image_url: None, author: None, is_approved: false }
    }

    pub fn approved(mut self, is_approved: bool) -> Self {
        self.is_approved = is_approved;
        self
    }

    pub fn display_url(&self) -> &str {
        match self.image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => PLACEHOLDER_IMAGE_URL,
        }
    }

    pub fn display_author(&self) -> String {
        match self.author.as_deref() {
            Some(a) if !a.trim().is_empty() => format!("By: {}", a),
            _ => "Unknown author".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStatus {
    #[default]
    Pending,
    Approved,
    All,
}

impl FilterStatus {
    pub fn matches(self, item: &Wallpaper) -> bool {
        match self {
            FilterStatus::Pending => !item.is_approved,
            FilterStatus::Approved => item.is_approved,
            FilterStatus::All => true,
        }
    }
}

impl FromStr for FilterStatus {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(FilterStatus::Pending),
            "approved" => Ok(FilterStatus::Approved),
            "all" => Ok(FilterStatus::All),
            other => Err(ConsoleError::Validation(format!("unknown filter status '{}'", other))),
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterStatus::Pending => "pending",
            FilterStatus::Approved => "approved",
            FilterStatus::All => "all",
        };
        f.write_str(s)
    }
}

/// Per-filter totals, always derived from the held collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub pending: usize,
    pub approved: usize,
    pub all: usize,
}

impl Counts {
    pub fn of(items: &[Wallpaper]) -> Self {
        let approved = items.iter().filter(|w| FilterStatus::Approved.matches(w)).count();
        Self { pending: items.len() - approved, approved, all: items.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_is_approved_defaults_to_false() {
        let w: Wallpaper = serde_json::from_str(r#"{"id":"a","imageUrl":"https://x/y.png"}"#).unwrap();
        assert!(!w.is_approved);
        let w: Wallpaper = serde_json::from_str(r#"{"id":"b","isApproved":null}"#).unwrap();
        assert!(!w.is_approved);
        let w: Wallpaper = serde_json::from_str(r#"{"id":"c","isApproved":true,"author":"neo"}"#).unwrap();
        assert!(w.is_approved);
        assert_eq!(w.display_author(), "By: neo");
    }

    #[test]
    fn empty_image_url_uses_placeholder() {
        let mut w = Wallpaper::new("a");
        assert_eq!(w.display_url(), PLACEHOLDER_IMAGE_URL);
        w.image_url = Some("  ".to_string());
        assert_eq!(w.display_url(), PLACEHOLDER_IMAGE_URL);
        w.image_url = Some("https://cdn/a.jpg".to_string());
        assert_eq!(w.display_url(), "https://cdn/a.jpg");
        assert_eq!(w.display_author(), "Unknown author");
    }

    #[test]
    fn filter_status_parsing() {
        assert_eq!("Pending".parse::<FilterStatus>().unwrap(), FilterStatus::Pending);
        assert_eq!(" ALL ".parse::<FilterStatus>().unwrap(), FilterStatus::All);
        assert!("rejected".parse::<FilterStatus>().unwrap_err().is_validation());
    }

    #[test]
    fn counts_match_predicates() {
        let items = vec![Wallpaper::new("a"), Wallpaper::new("b").approved(true), Wallpaper::new("c")];
        assert_eq!(Counts::of(&items), Counts { pending: 2, approved: 1, all: 3 });
        assert_eq!(Counts::of(&[]), Counts::default());
    }
}
