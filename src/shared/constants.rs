/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - full access, may verify or reopen any report
pub const ROLE_ADMIN: &str = "admin";

/// Department staff role - works reports routed to their department
pub const ROLE_DEPARTMENT: &str = "department";

/// Citizen role - any signed-in account; no route checks it
#[cfg(test)]
pub const ROLE_CITIZEN: &str = "citizen";

// =============================================================================
// ENRICHMENT THRESHOLDS
// =============================================================================

/// A category prediction replaces the citizen's category only above this confidence
pub const CATEGORY_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Cosine similarity a candidate must exceed to count as a possible duplicate
pub const DUPLICATE_SCORE_THRESHOLD: f32 = 0.6;

/// Search radius for duplicate candidates when the caller does not supply one
pub const DEFAULT_DUPLICATE_RADIUS_METERS: f64 = 500.0;

/// Upper bound on candidate reports sent to the duplicate scorer
pub const MAX_DUPLICATE_CANDIDATES: i64 = 50;
