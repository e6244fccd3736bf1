//! Input validation for user-provided data.

/// Validation result with error message.
pub type ValidationResult = Result<(), String>;

/// Validates a project ID according to GCP naming rules.
///
/// Rules:
/// - Must be 6-30 characters
/// - Must start with a lowercase letter
/// - Can contain lowercase letters, digits, and hyphens
/// - Cannot end with a hyphen
pub fn validate_project_id(id: &str) -> ValidationResult {
    if id.is_empty() {
        return Err("Project ID cannot be empty".to_string());
    }

    if !(6..=30).contains(&id.len()) {
        return Err("Project ID must be 6 to 30 characters".to_string());
    }

    if !id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("Project ID must start with a lowercase letter".to_string());
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(format!(
            "Project ID can only contain lowercase letters, digits, and hyphens. Found: '{c}'"
        ));
    }

    if id.ends_with('-') {
        return Err("Project ID cannot end with a hyphen".to_string());
    }

    Ok(())
}
