pub mod arc_consistency;
pub mod backtracking_search;
pub mod domain;
pub mod puzzle;
pub mod types;
pub mod word_list;

/// The expected maximum number of distinct characters appearing in a grid.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum number of variables appearing in a grid.
pub const MAX_VAR_COUNT: usize = 256;

/// The expected maximum length for a single variable.
pub const MAX_VAR_LENGTH: usize = 21;
