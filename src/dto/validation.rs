//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::ValidationError;

/// Validates that every player name is non-blank and that names are unique.
///
/// Uniqueness is checked on the trimmed name, so `"Ana"` and `"Ana "` collide.
///
/// # Examples
///
/// ```ignore
/// validate_player_names(&["Ana".into(), "Ben".into()]) // Ok
/// validate_player_names(&["Ana".into(), "  ".into()])  // Err - blank
/// validate_player_names(&["Ana".into(), "Ana".into()]) // Err - duplicate
/// ```
pub fn validate_player_names(names: &[String]) -> Result<(), ValidationError> {
    if names.iter().any(|name| name.trim().is_empty()) {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player names must not be empty".into());
        return Err(err);
    }

    let mut seen = HashSet::with_capacity(names.len());
    if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.trim())) {
        let mut err = ValidationError::new("player_name_duplicate");
        err.message = Some(format!("Player name `{}` is used twice", duplicate.trim()).into());
        return Err(err);
    }

    Ok(())
}
