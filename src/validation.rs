use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Check an inbound DTO against its declarative contract before it reaches
/// the orchestrator or a repository. Failures short-circuit with the full
/// field-addressable error list.
pub fn validate<T: Validate>(value: &T) -> Result<(), ApiError> {
    value.validate().map_err(ApiError::Validation)?;
    Ok(())
}

/// Tag lists are capped and every tag must be short and non-blank.
pub fn tag_list(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > 10 {
        return Err(ValidationError::new("too_many_tags"));
    }
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.len() > 30 {
            return Err(ValidationError::new("invalid_tag"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_accepts_reasonable_tags() {
        let tags = vec!["rust".to_string(), "backend".to_string()];
        assert!(tag_list(&tags).is_ok());
    }

    #[test]
    fn tag_list_rejects_blank_and_oversized_tags() {
        assert!(tag_list(&vec!["  ".to_string()]).is_err());
        assert!(tag_list(&vec!["x".repeat(31)]).is_err());
        let too_many: Vec<String> = (0..11).map(|i| format!("tag-{i}")).collect();
        assert!(tag_list(&too_many).is_err());
    }
}
