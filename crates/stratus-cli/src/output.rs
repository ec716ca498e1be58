//! Formatted output helpers for CLI commands.

/// A horizontal rule as wide as `title`.
#[must_use]
pub fn rule(title: &str) -> String {
    "\u{2550}".repeat(title.chars().count())
}

/// Suffix naming the direct dependencies of a plan entry, empty when there are none.
#[must_use]
pub fn dependency_suffix(depends_on: &[String]) -> String {
    if depends_on.is_empty() {
        String::new()
    } else {
        format!("  <- {}", depends_on.join(", "))
    }
}

/// Count followed by `noun`, with `(s)` appended unless the count is one.
#[must_use]
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}(s)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_matches_title_width() {
        assert_eq!(rule("Plan: ec2"), "\u{2550}".repeat(9));
    }

    #[test]
    fn dependency_suffix_is_empty_without_dependencies() {
        assert_eq!(dependency_suffix(&[]), "");
    }

    #[test]
    fn dependency_suffix_lists_dependencies() {
        let deps = vec!["MyVpc".to_owned(), "Net::SharedVpc".to_owned()];
        assert_eq!(dependency_suffix(&deps), "  <- MyVpc, Net::SharedVpc");
    }

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(1, "resource"), "1 resource");
        assert_eq!(count(0, "resource"), "0 resource(s)");
        assert_eq!(count(7, "unit"), "7 unit(s)");
    }
}
