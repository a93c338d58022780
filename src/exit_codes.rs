//! Exit code constants for the docval CLI.
//!
//! - 0: Success (every document valid)
//! - 1: User error (bad args, unreadable input, bad config)
//! - 2: Validation failure (at least one document has issues)
//! - 3: Invalid document type (no rule set for the requested type)
//! - 4: Session lock could not be acquired

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable files, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: one or more documents produced issues.
pub const VALIDATION_FAILURE: i32 = 2;

/// The document type has no entry in the rule catalog.
pub const INVALID_DOCUMENT_TYPE: i32 = 3;

/// Session lock acquisition failure.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            VALIDATION_FAILURE,
            INVALID_DOCUMENT_TYPE,
            LOCK_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
