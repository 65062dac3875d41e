use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FormErrors, INVALID_CHOICE, REQUIRED, optional_text, required_text};
use crate::domain::{Post, PostDraft};

const TITLE_MAX_LEN: usize = 256;
const IMAGE_MAX_LEN: usize = 512;

/// Layout used when pre-filling a date field (HTML `datetime-local`).
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    DATETIME_LOCAL,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Create/edit submission for a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub category: String,
    pub location: String,
    pub image: String,
}

impl PostForm {
    /// A form pre-filled from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: format_pub_date(post.pub_date),
            category: post.category_id.map(|id| id.to_string()).unwrap_or_default(),
            location: post.location_id.map(|id| id.to_string()).unwrap_or_default(),
            image: post.image.clone().unwrap_or_default(),
        }
    }

    /// Check field shapes. Whether referenced categories and locations exist
    /// is left to the caller.
    pub fn validate(&self) -> Result<PostDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required_text(&mut errors, "title", &self.title, Some(TITLE_MAX_LEN));
        let text = required_text(&mut errors, "text", &self.text, None);

        let pub_date = match self.pub_date.trim() {
            "" => {
                errors.add("pub_date", REQUIRED);
                None
            }
            raw => parse_pub_date(raw).or_else(|| {
                errors.add("pub_date", "Enter a valid date/time.");
                None
            }),
        };

        let category_id = optional_id(&mut errors, "category", &self.category);
        let location_id = optional_id(&mut errors, "location", &self.location);
        let image = optional_text(&mut errors, "image", &self.image, Some(IMAGE_MAX_LEN));

        match pub_date {
            Some(pub_date) => errors.into_result(PostDraft {
                title,
                text,
                pub_date,
                category_id,
                location_id,
                image: (!image.is_empty()).then_some(image),
            }),
            None => Err(errors),
        }
    }
}

/// Parse a submitted publication date. Values without an offset are UTC.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Render a publication date the way the form expects it back.
pub fn format_pub_date(date: DateTime<Utc>) -> String {
    date.format(DATETIME_LOCAL).to_string()
}

fn optional_id(errors: &mut FormErrors, field: &str, raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}
