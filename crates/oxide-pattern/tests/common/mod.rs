#![allow(dead_code)]

use oxide_pattern::{Anchor, PathPattern, PatternError, PatternOptions};

pub fn compile(pattern: &str) -> PathPattern {
    PathPattern::new(pattern)
        .unwrap_or_else(|e| panic!("Failed to compile: {pattern}\nError: {e}"))
}

pub fn compile_err(pattern: &str) -> PatternError {
    PathPattern::new(pattern).expect_err(&format!("Expected compile error for: {pattern}"))
}

/// The matched text followed by every capture that participated, which is
/// what a route handler ends up seeing.
pub fn args(pattern: &PathPattern, candidate: &str) -> Option<Vec<String>> {
    let caps = pattern.captures(candidate)?;
    let mut out = vec![caps.matched().to_string()];
    out.extend(caps.present().map(str::to_string));
    Some(out)
}

/// Checks each `(candidate, expected)` pair against `pattern`.
pub fn check(pattern: &str, cases: &[(&str, Option<Vec<&str>>)]) {
    check_compiled(&compile(pattern), cases);
}

/// Like [`check`] but with a trailing slash tolerated.
pub fn check_lenient(pattern: &str, cases: &[(&str, Option<Vec<&str>>)]) {
    let compiled = PathPattern::compile(pattern, Anchor::Full, &PatternOptions::lenient())
        .unwrap_or_else(|e| panic!("Failed to compile: {pattern}\nError: {e}"));
    check_compiled(&compiled, cases);
}

fn check_compiled(pattern: &PathPattern, cases: &[(&str, Option<Vec<&str>>)]) {
    for (candidate, expected) in cases {
        let expected = expected.as_ref().map(|e| e.iter().map(|s| (*s).to_string()).collect::<Vec<_>>());
        assert_eq!(
            args(pattern, candidate),
            expected,
            "pattern {:?} against {candidate:?}",
            pattern.pattern()
        );
    }
}
