//! # Fixed Limits
//!
//! Compile-time constants for the tracker core. These are immutable at
//! runtime.

/// Default number of records returned by a list operation.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Upper bound on the number of records a single list call may return.
pub const MAX_PAGE_LIMIT: usize = 1000;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for associate identifiers (GenC, mentor, user).
pub const MAX_ASSOCIATE_ID_LENGTH: usize = 50;

/// Maximum length for names and other short text fields.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for skill categories.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Maximum length for free text (descriptions, notes, feedback).
///
/// Anything longer (64KB) is rejected before it reaches storage.
pub const MAX_TEXT_LENGTH: usize = 65536;

/// Maximum number of records accepted in one seed bundle, per kind.
pub const MAX_IMPORT_RECORDS: usize = 10000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_within_max() {
        assert!(DEFAULT_PAGE_LIMIT <= MAX_PAGE_LIMIT);
    }

    #[test]
    fn associate_id_shorter_than_names() {
        assert!(MAX_ASSOCIATE_ID_LENGTH < MAX_NAME_LENGTH);
    }
}
