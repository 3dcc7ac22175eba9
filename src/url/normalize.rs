use crate::url::scope::Scope;
use url::Url;

/// Removes the fragment (everything after `#`) from a URL in place
pub fn strip_fragment(url: &mut Url) {
    url.set_fragment(None);
}

/// Resolves a link against its page and returns the canonical in-scope URL
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base` (relative links become absolute)
/// 2. Remove the fragment
/// 3. Reject anything that is not HTTP or HTTPS
/// 4. Reject URLs outside `scope` (domain without `www.`, literal path prefix)
///
/// Malformed and out-of-scope links are not errors; they return `None` and the
/// caller skips them.
///
/// # Arguments
///
/// * `raw` - The link as written in the page (typically an `href` value)
/// * `base` - The URL of the page the link was found on
/// * `scope` - The crawl scope
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scope_spider::url::{normalize, Scope};
///
/// let seed = Url::parse("https://school.edu/admissions").unwrap();
/// let scope = Scope::from_seed(&seed).unwrap();
///
/// assert_eq!(
///     normalize("apply#deadlines", &Url::parse("https://school.edu/admissions/").unwrap(), &scope),
///     Some("https://school.edu/admissions/apply".to_string())
/// );
/// assert_eq!(normalize("/news", &seed, &scope), None);
/// ```
pub fn normalize(raw: &str, base: &Url, scope: &Scope) -> Option<String> {
    let mut resolved = base.join(raw.trim()).ok()?;
    strip_fragment(&mut resolved);

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if !scope.contains(&resolved) {
        return None;
    }

    Some(resolved.into())
}
