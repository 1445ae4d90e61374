
use serde::{Deserialize, Serialize};
use url::Url;

/// Link-scoping policy for the frontier. Injected configuration rather than
/// hard-coded control flow so the lists can be tuned per deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScopePolicy {
    /// A discovered link is dropped when its path contains any of these
    /// substrings (navigation/legal/social boilerplate).
    pub path_denylist: Vec<String>,
    /// File extensions that mark binary or document resources.
    pub skip_extensions: Vec<String>,
}

impl Default for ScopePolicy {
    #[inline]
    fn default() -> Self {
        Self {
            path_denylist: [
                "/tag", "/category", "/author", "/login", "/signup", "/signin", "/register",
                "/cart", "/account", "/privacy", "/terms", "/legal", "/cookie", "/contact",
                "/subscribe", "/feed", "/rss", "/share", "/facebook", "/twitter", "/linkedin",
                "/instagram", "/youtube", "/mailto",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            skip_extensions: [
                "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "gz", "tar", "rar",
                "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "mp3", "mp4", "avi", "mov",
                "css", "js", "json", "xml", "woff", "woff2", "ttf", "eot", "exe", "dmg",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

/// True when both URLs share scheme, host, and port.
#[inline]
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host() == b.host() && a.port_or_known_default() == b.port_or_known_default()
}

/// Number of non-empty path segments.
#[inline]
pub fn path_segment_count(url: &Url) -> usize {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count())
        .unwrap_or(0)
}

/// Path rule: a candidate is followed only if its path is equal to or a
/// descendant of the current page's path, and it never has fewer segments.
/// A current page at root opens the whole origin. Crawl deeper, never
/// sideways or up.
#[inline]
pub fn path_descends(current: &Url, candidate: &Url) -> bool {
    let current_path = current.path();
    if current_path == "/" || current_path.is_empty() {
        return true;
    }

    let prefix = current_path.trim_end_matches('/');
    let candidate_path = candidate.path();

    let descends = candidate_path == prefix
        || candidate_path == current_path
        || candidate_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));

    descends && path_segment_count(candidate) >= path_segment_count(current)
}

/// Exclusion rule for a discovered link, independent of origin and descent.
#[inline]
pub fn is_excluded(policy: &ScopePolicy, url: &Url) -> bool {
    let path = url.path();

    // Root-only or near-empty paths carry no content of their own.
    if path.len() <= 1 {
        return true;
    }

    if url.query().is_some() {
        return true;
    }

    let lower = path.to_ascii_lowercase();
    if policy
        .path_denylist
        .iter()
        .any(|needle| lower.contains(needle.as_str()))
    {
        return true;
    }

    if let Some((_, ext)) = lower.rsplit_once('.') {
        if !ext.contains('/') && policy.skip_extensions.iter().any(|e| e == ext) {
            return true;
        }
    }

    false
}

/// Full frontier admission check for a link discovered on `current` during a
/// crawl rooted at `seed`.
#[inline]
pub fn should_follow(policy: &ScopePolicy, seed: &Url, current: &Url, candidate: &Url) -> bool {
    same_origin(seed, candidate) && path_descends(current, candidate) && !is_excluded(policy, candidate)
}

/// Resolve an href against its page, dropping in-page anchors and non-HTTP
/// schemes, and stripping any fragment from the result.
#[inline]
pub fn resolve_link(page: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("javascript:")
        || trimmed.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = page.join(trimmed).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}
