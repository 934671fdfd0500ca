//! Font Awesome icon classes for provider condition codes

/// Icon shown when a condition code is not recognised
pub const UNKNOWN_ICON: &str = "fas fa-question";

/// Map a provider condition code to an icon class
#[must_use]
pub fn icon_class(condition_code: i32) -> &'static str {
    match condition_code {
        200..=299 => "fas fa-bolt",
        300..=399 => "fas fa-cloud-rain",
        500..=599 => "fas fa-cloud-showers-heavy",
        600..=699 => "fas fa-snowflake",
        700..=799 => "fas fa-smog",
        800 => "fas fa-sun",
        801..=804 => "fas fa-cloud",
        _ => UNKNOWN_ICON,
    }
}
