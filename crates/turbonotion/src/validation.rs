//! Pre-flight request validation
//!
//! Guards that reject oversize payloads before anything reaches the
//! transport. Each guard is pure: it either returns `Ok(())` or an
//! [`Error::Validation`] describing the violated bound. Bounds are
//! inclusive, so a value of exactly the limit is accepted.
//!
//! String lengths are counted in UTF-16 code units, which is how the API
//! measures them: an emoji outside the Basic Multilingual Plane counts as 2.
//!
//! # Examples
//!
//! ```rust
//! use turbonotion::validation::{limits, validate_array_length, validate_string_length};
//!
//! validate_string_length("Quarterly roadmap", limits::RICH_TEXT_CONTENT, "title")?;
//!
//! let options = vec!["urgent"; 101];
//! let err = validate_array_length(&options, limits::MULTI_SELECT_OPTIONS, "tags").unwrap_err();
//! assert_eq!(err.to_string(), "tags exceeds the 100-element limit (got 101)");
//! # Ok::<(), turbonotion::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::observability::log_validation_error;

/// Size limits documented by the API.
pub mod limits {
    /// Characters in a single rich text object's `text.content`
    pub const RICH_TEXT_CONTENT: usize = 2000;
    /// Characters in a rich text link URL or a URL property
    pub const URL: usize = 2000;
    /// Characters in an equation expression
    pub const EQUATION_EXPRESSION: usize = 1000;
    /// Rich text objects in one rich text array
    pub const RICH_TEXT_ARRAY: usize = 100;
    /// Block children appended in one request
    pub const BLOCK_CHILDREN: usize = 100;
    /// Options in a multi-select property value
    pub const MULTI_SELECT_OPTIONS: usize = 100;
    /// Related pages in a relation property value
    pub const RELATION_PAGES: usize = 100;
    /// Users in a people property value
    pub const PEOPLE_USERS: usize = 100;
    /// Characters in an email property value
    pub const EMAIL: usize = 200;
    /// Characters in a phone number property value
    pub const PHONE_NUMBER: usize = 200;
}

/// Fail when `value` is longer than `max_length` UTF-16 code units.
///
/// # Errors
///
/// Returns [`Error::Validation`] with
/// `"<label> exceeds the <max_length>-character limit (got <actual>)"`.
pub fn validate_string_length(value: &str, max_length: usize, label: &str) -> Result<()> {
    // Cheap upper bound first: UTF-16 length never exceeds UTF-8 byte length
    if value.len() <= max_length {
        return Ok(());
    }

    let actual = value.encode_utf16().count();
    check_bound(actual, max_length, label, "character")
}

/// Fail when `items` has more than `max_length` elements.
///
/// # Errors
///
/// Returns [`Error::Validation`] with
/// `"<label> exceeds the <max_length>-element limit (got <actual>)"`.
pub fn validate_array_length<T>(items: &[T], max_length: usize, label: &str) -> Result<()> {
    check_bound(items.len(), max_length, label, "element")
}

/// Guard for a rich text object's content.
pub fn validate_rich_text_content(content: &str) -> Result<()> {
    validate_string_length(content, limits::RICH_TEXT_CONTENT, "rich text content")
}

/// Guard for a rich text array.
pub fn validate_rich_text_array<T>(items: &[T]) -> Result<()> {
    validate_array_length(items, limits::RICH_TEXT_ARRAY, "rich text array")
}

/// Guard for the children of an append-block-children request.
pub fn validate_block_children<T>(children: &[T]) -> Result<()> {
    validate_array_length(children, limits::BLOCK_CHILDREN, "block children")
}

/// Guard for a URL property value or link target.
pub fn validate_url(url: &str) -> Result<()> {
    validate_string_length(url, limits::URL, "url")
}

fn check_bound(actual: usize, max_length: usize, label: &str, unit: &str) -> Result<()> {
    if actual <= max_length {
        return Ok(());
    }

    let message = format!(
        "{} exceeds the {}-{} limit (got {})",
        label, max_length, unit, actual
    );
    log_validation_error(label, &message);
    Err(Error::Validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_string_at_limit_accepted() {
        let content = "a".repeat(limits::RICH_TEXT_CONTENT);
        assert!(validate_rich_text_content(&content).is_ok());
    }

    #[test]
    fn test_string_over_limit_rejected() {
        let content = "a".repeat(limits::RICH_TEXT_CONTENT + 1);
        let err = validate_rich_text_content(&content).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "rich text content exceeds the 2000-character limit (got 2001)"
        );
    }

    #[test]
    fn test_array_boundary() {
        let children = vec![(); limits::BLOCK_CHILDREN];
        assert!(validate_block_children(&children).is_ok());

        let children = vec![(); limits::BLOCK_CHILDREN + 1];
        let err = validate_block_children(&children).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("100"), "missing limit: {}", message);
        assert!(message.contains("101"), "missing actual count: {}", message);
        assert_eq!(
            message,
            "block children exceeds the 100-element limit (got 101)"
        );
    }

    #[rstest]
    #[case("", 0, true)]
    #[case("a", 0, false)]
    #[case("héllo", 5, true)]
    #[case("日本語", 3, true)]
    #[case("日本語", 2, false)]
    // One astral-plane emoji is two UTF-16 code units
    #[case("😀", 2, true)]
    #[case("😀", 1, false)]
    fn test_utf16_length(#[case] value: &str, #[case] max: usize, #[case] ok: bool) {
        assert_eq!(validate_string_length(value, max, "value").is_ok(), ok);
    }

    #[test]
    fn test_utf16_count_in_message() {
        let value = "😀".repeat(3);
        let err = validate_string_length(&value, 5, "emoji").unwrap_err();
        assert_eq!(
            err.to_string(),
            "emoji exceeds the 5-character limit (got 6)"
        );
    }

    #[test]
    fn test_url_and_rich_text_array_guards() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url(&"x".repeat(limits::URL + 1)).is_err());

        assert!(validate_rich_text_array(&[0u8; 100]).is_ok());
        assert!(validate_rich_text_array(&[0u8; 101]).is_err());
    }

    proptest! {
        #[test]
        fn prop_array_bound_is_inclusive(len in 0usize..300, max in 0usize..300) {
            let items = vec![0u8; len];
            prop_assert_eq!(validate_array_length(&items, max, "items").is_ok(), len <= max);
        }

        #[test]
        fn prop_string_bound_matches_utf16_len(value in "\\PC{0,40}", max in 0usize..60) {
            let expected = value.encode_utf16().count() <= max;
            prop_assert_eq!(validate_string_length(&value, max, "value").is_ok(), expected);
        }
    }
}
