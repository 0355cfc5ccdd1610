//! Common model-level constants.

/// Repository-relative path of the counter file when none is configured.
///
/// The file holds a single JSON object mapping counter ids to their last issued number.
pub const DEFAULT_COUNTER_PATH: &str = ".github/build-numbers.json";
