use regex::Regex;
use std::sync::OnceLock;

use crate::shared::errors::AppError;

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')')
}

pub struct Validator;

impl Validator {
    pub fn validate_limit(limit: i64) -> Result<u32, AppError> {
        if limit < 0 {
            return Err(AppError::ValidationError(
                "Limit must be non-negative".to_string(),
            ));
        }
        u32::try_from(limit).map_err(|_| {
            AppError::ValidationError(format!("Limit too large (max {})", u32::MAX))
        })
    }

    /// Trim, drop blanks and duplicates (keeping first occurrence); at least one must remain
    pub fn validate_regions(regions: &[String]) -> Result<Vec<String>, AppError> {
        let mut cleaned: Vec<String> = Vec::with_capacity(regions.len());
        for region in regions {
            let region = region.trim();
            if region.is_empty() {
                continue;
            }
            if region.len() > 100 {
                return Err(AppError::ValidationError(format!(
                    "Region name too long (max 100 characters): {}",
                    region
                )));
            }
            if !cleaned.iter().any(|r| r.eq_ignore_ascii_case(region)) {
                cleaned.push(region.to_string());
            }
        }

        if cleaned.is_empty() {
            return Err(AppError::ValidationError(
                "Region list cannot be empty".to_string(),
            ));
        }
        Ok(cleaned)
    }

    /// Collapse runs of whitespace; `None` when nothing is left
    pub fn clean_text(text: Option<&str>) -> Option<String> {
        let cleaned = text?.split_whitespace().collect::<Vec<_>>().join(" ");
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Keep digits and `+-() `; anything shorter than 9 characters is dropped
    pub fn clean_phone(phone: Option<&str>) -> Option<String> {
        let cleaned: String = phone?.chars().filter(|c| is_phone_char(*c)).collect();
        let cleaned = cleaned.trim().to_string();
        (cleaned.len() >= 9).then_some(cleaned)
    }

    pub fn clean_email(email: Option<&str>) -> Option<String> {
        let email = email?.trim();
        email_regex()
            .is_some_and(|re| re.is_match(email))
            .then(|| email.to_string())
    }
}
