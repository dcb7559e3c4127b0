//! Discovery of the image URL behind a target.

use once_cell::sync::Lazy;
use regex::Regex;

static BACKGROUND_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("background url pattern is valid")
});

/// First `url(...)` reference in a CSS `background-image` value.
pub fn background_url(background_image: &str) -> Option<String> {
    BACKGROUND_URL
        .captures(background_image)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

/// An explicit `src` wins; otherwise fall back to the background image.
pub fn image_source(src: Option<&str>, background_image: Option<&str>) -> Option<String> {
    src.map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .or_else(|| background_image.and_then(background_url))
}
