//! Slug generation and collision-free naming.
//!
//! Device types are keyed by slug. Imported and migrated entries derive their
//! slug from human names, so both the slug and the display name must be made
//! unique against what the layout already holds.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Pattern every device-type slug must match.
pub const SLUG_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

/// Pattern every device colour must match.
pub const COLOUR_PATTERN: &str = r"^#[0-9a-fA-F]{6}$";

fn slug_regex() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(SLUG_PATTERN).expect("slug pattern is valid"))
}

fn colour_regex() -> &'static Regex {
    static COLOUR: OnceLock<Regex> = OnceLock::new();
    COLOUR.get_or_init(|| Regex::new(COLOUR_PATTERN).expect("colour pattern is valid"))
}

/// Returns true if `slug` is lowercase alphanumeric words joined by single hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    slug_regex().is_match(slug)
}

/// Returns true if `colour` is a `#RRGGBB` hex string.
#[must_use]
pub fn is_valid_colour(colour: &str) -> bool {
    colour_regex().is_match(colour)
}

/// Converts free text into a slug.
///
/// Every run of characters outside `[a-z0-9]` collapses into one hyphen and
/// leading/trailing hyphens are dropped. Returns an empty string when the
/// input has no alphanumeric characters.
///
/// # Examples
///
/// ```
/// use rackplan::models::slug::slugify;
///
/// assert_eq!(slugify("Dell PowerEdge R740"), "dell-poweredge-r740");
/// assert_eq!(slugify("  --Server (imported 2)-- "), "server-imported-2");
/// assert_eq!(slugify("!!!"), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Builds a slug from the manufacturer, model and name of a device.
///
/// Blank parts are skipped. When every part is blank the slug falls back to
/// `device-<millis>` so the entry stays addressable.
#[must_use]
pub fn slug_from_parts(manufacturer: Option<&str>, model: Option<&str>, name: Option<&str>) -> String {
    let joined = [manufacturer, model, name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let slug = slugify(&joined);
    if slug.is_empty() {
        format!("device-{}", chrono::Utc::now().timestamp_millis())
    } else {
        slug
    }
}

/// Returns `name` or the first free `"<name> (imported)"`, `"<name> (imported 2)"`, ...
///
/// `taken` is compared case-insensitively and is not modified.
///
/// # Examples
///
/// ```
/// use rackplan::models::slug::unique_imported_name;
/// use std::collections::HashSet;
///
/// let taken: HashSet<String> = ["server".to_string()].into_iter().collect();
/// assert_eq!(unique_imported_name("Server", &taken), "Server (imported)");
/// assert_eq!(unique_imported_name("Switch", &taken), "Switch");
/// ```
#[must_use]
pub fn unique_imported_name(name: &str, taken: &HashSet<String>) -> String {
    let is_taken = |candidate: &str| taken.contains(&candidate.to_lowercase());

    if !is_taken(name) {
        return name.to_string();
    }

    let first = format!("{name} (imported)");
    if !is_taken(&first) {
        return first;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{name} (imported {counter})");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Returns `slug` or the first free `"<slug>-2"`, `"<slug>-3"`, ...
#[must_use]
pub fn unique_slug(slug: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(slug) {
        return slug.to_string();
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{slug}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
