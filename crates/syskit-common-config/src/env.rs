//! Environment variable handling.

use std::env;

/// Environment variable names.
pub mod vars {
    pub const SYSKIT_CONFIG: &str = "SYSKIT_CONFIG";
    pub const SYSKIT_SPECS_DIR: &str = "SYSKIT_SPECS_DIR";
    pub const SYSKIT_DOC_DIR: &str = "SYSKIT_DOC_DIR";
}

/// Typed access to process environment variables.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Get an optional string variable; empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_treats_empty_as_unset() {
        env::set_var("SYSKIT_TEST_EMPTY", "");
        assert_eq!(Environment::get("SYSKIT_TEST_EMPTY"), None);
        env::set_var("SYSKIT_TEST_EMPTY", "doc");
        assert_eq!(Environment::get("SYSKIT_TEST_EMPTY").as_deref(), Some("doc"));
        env::remove_var("SYSKIT_TEST_EMPTY");
    }
}
