//! Cache key layout
//!
//! Three structures live in the store:
//! - `photos`: hash of url -> serialized record
//! - `categories_names`: set of every category name currently in use
//! - `category::<name>`: one set of urls per category

/// Hash key of the photo table
pub const PHOTOS_KEY: &str = "photos";

/// Set key of the category-name set
pub const CATEGORY_NAMES_KEY: &str = "categories_names";

/// Prefix of the per-category url sets
pub const CATEGORY_KEY_PREFIX: &str = "category::";

/// Store key of the url set for `name`
pub fn category_key(name: &str) -> String {
    format!("{}{}", CATEGORY_KEY_PREFIX, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_key() {
        assert_eq!(category_key("cats"), "category::cats");
        assert!(category_key("cats").starts_with(CATEGORY_KEY_PREFIX));
    }
}
