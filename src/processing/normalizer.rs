//! Canonical comparison keys for skill names

/// Lower-case and trim a skill name.
///
/// Total over every input (empty in, empty out) and idempotent.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize("  Project Management \n"), "project management");
        assert_eq!(normalize("PYTHON"), "python");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  Cloud Computing ", "ÜBERWACHEN", "", "c++", "\tSQL\t"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_inner_spacing_untouched() {
        assert_eq!(normalize("Machine  Learning"), "machine  learning");
    }
}
