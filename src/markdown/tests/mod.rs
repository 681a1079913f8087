mod normalize_tests;
mod sanitize_tests;
