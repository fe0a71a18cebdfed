//! Stable error code strings surfaced by [`crate::DiffError::code`] and
//! [`crate::ConfigError::code`].

pub const DIFF_MISSING_KEY_FIELD: &str = "TDIFF_DIFF_001";
pub const DIFF_EMPTY_KEY_SCHEMA: &str = "TDIFF_DIFF_002";
pub const DIFF_EMPTY_FIELD_SCHEMA: &str = "TDIFF_DIFF_003";
pub const DIFF_DUPLICATE_FIELD_NAME: &str = "TDIFF_DIFF_004";
pub const DIFF_UNKNOWN_FILTER_FIELD: &str = "TDIFF_DIFF_005";
pub const DIFF_INVALID_CONFIG: &str = "TDIFF_DIFF_006";

pub const CONFIG_INVALID_PATTERN: &str = "TDIFF_CONFIG_001";
pub const CONFIG_EMPTY_FIELD_NAME: &str = "TDIFF_CONFIG_002";
