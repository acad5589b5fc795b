use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for report category slugs
    /// Lowercase snake_case starting with a letter
    /// - Valid: "pothole", "street_light", "noise_complaint"
    /// - Invalid: "Pothole", "street-light", "_other", "1st"
    pub static ref CATEGORY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}
