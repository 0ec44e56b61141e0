use crate::config::MAX_SESSION_MINUTES;
use crate::models::Topic;

/// Validation result with error message
pub type ValidationResult = Result<(), &'static str>;

/// Longest weekly goal that can be set (every hour of the week)
const MAX_GOAL_HOURS: f64 = 168.0;

/// Validate a topic name for creation
///
/// Returns Ok(()) if valid, or Err with a message explaining why it's invalid.
pub fn validate_new_topic_name(name: &str, existing: &[Topic]) -> ValidationResult {
    let name = name.trim();
    if name.is_empty() {
        return Err("Topic name cannot be empty");
    }
    if existing.iter().any(|t| t.name == name) {
        return Err("Topic already exists");
    }
    Ok(())
}

/// Parse a weekly goal entry; an empty entry means "no goal"
pub fn parse_goal_hours(input: &str) -> Result<Option<f64>, &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<f64>() {
        Ok(hours) if hours > 0.0 && hours <= MAX_GOAL_HOURS => Ok(Some(hours)),
        Ok(_) => Err("Goal must be between 0 and 168 hours"),
        Err(_) => Err("Goal must be a number of hours"),
    }
}

/// Validate a focus or break length
pub fn validate_session_minutes(minutes: u32) -> ValidationResult {
    if minutes == 0 || minutes > MAX_SESSION_MINUTES {
        return Err("Session length must be between 1 and 600 minutes");
    }
    Ok(())
}
