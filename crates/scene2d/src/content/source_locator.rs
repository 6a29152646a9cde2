use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceLocatorError {
    #[error("source locator must not be empty")]
    Empty,
    #[error("source locator must not start with '/'")]
    LeadingSlash,
    #[error("source locator must not contain '\\\\'")]
    Backslash,
    #[error("source locator must not contain '..'")]
    ParentTraversal,
    #[error("source locator contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Checks a relative image locator such as `sprites/hero.png` before it is
/// resolved against a loader root.
pub fn validate_source_locator(locator: &str) -> Result<(), SourceLocatorError> {
    if locator.is_empty() {
        return Err(SourceLocatorError::Empty);
    }
    if locator.starts_with('/') {
        return Err(SourceLocatorError::LeadingSlash);
    }
    if locator.contains('\\') {
        return Err(SourceLocatorError::Backslash);
    }
    if locator.contains("..") {
        return Err(SourceLocatorError::ParentTraversal);
    }
    for ch in locator.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-' | '.') {
            continue;
        }
        return Err(SourceLocatorError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_image_paths() {
        for locator in ["hero.png", "sprites/Hero_1.png", "ui/icons/a-b.jpg"] {
            assert!(validate_source_locator(locator).is_ok(), "locator={locator}");
        }
    }

    #[test]
    fn rejects_escaping_or_odd_locators() {
        for locator in ["", "/etc/passwd", "..", "a/../b", r"a\b", "c:/x.png", "a b.png"] {
            assert!(
                validate_source_locator(locator).is_err(),
                "locator={locator}"
            );
        }
    }

    #[test]
    fn reports_offending_character() {
        assert_eq!(
            validate_source_locator("a?b"),
            Err(SourceLocatorError::InvalidCharacter { character: '?' })
        );
    }
}
