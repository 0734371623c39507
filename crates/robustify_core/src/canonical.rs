use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use regex::{Regex, RegexBuilder};
use url::{Host, Url};

const STRIP_CHARS: &[char] = &[' ', '/', '\n', '\r', '\t', '\'', '"', '.'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL: {url} ({reason})")]
    Malformed { url: String, reason: String },
    #[error("Invalid URL: {url} (unsupported scheme {scheme})")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("Invalid URL: {url} (not a public host)")]
    NotPublic { url: String },
    #[error("Invalid URL: {url} (blacklisted)")]
    Blacklisted { url: String },
}

impl UrlError {
    pub fn url(&self) -> &str {
        match self {
            UrlError::Malformed { url, .. }
            | UrlError::UnsupportedScheme { url, .. }
            | UrlError::NotPublic { url }
            | UrlError::Blacklisted { url } => url,
        }
    }
}

/// Cleans up a URL as found in a document and upgrades it to https.
///
/// Surrounding quotes, dots, slashes and whitespace are stripped, inner spaces
/// are percent-encoded, `http://`, `://` and bare `www` prefixes become
/// `https://`. The result must be an http(s) URL on a public host.
pub fn canonicalize_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim_matches(STRIP_CHARS).replace(' ', "%20");
    let candidate = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("://") {
        format!("https://{rest}")
    } else if trimmed.starts_with("www") {
        format!("https://{trimmed}")
    } else {
        trimmed
    };
    validate_public_url(&candidate)?;
    Ok(candidate)
}

fn validate_public_url(candidate: &str) -> Result<(), UrlError> {
    let parsed = Url::parse(candidate).map_err(|err| UrlError::Malformed {
        url: candidate.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme {
            url: candidate.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }
    let public = match parsed.host() {
        Some(Host::Domain(domain)) => is_public_domain(domain),
        Some(Host::Ipv4(ip)) => is_public_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_public_ipv6(ip),
        None => false,
    };
    if public {
        Ok(())
    } else {
        Err(UrlError::NotPublic {
            url: candidate.to_string(),
        })
    }
}

fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    domain.contains('.') && domain != "localhost" && !domain.ends_with(".localhost")
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast())
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;
    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}

/// URL patterns that are never robustified, matched case-insensitively
/// anywhere in the canonical URL.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    pattern: Option<Regex>,
}

impl Blacklist {
    /// Blank entries are ignored; an empty list blocks nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let mut patterns: Vec<&str> = patterns
            .iter()
            .map(|pattern| pattern.as_ref().trim())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        patterns.sort_unstable();
        let pattern = RegexBuilder::new(&patterns.join("|"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(url))
    }
}

/// What `build_rows` drops besides malformed and private URLs.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub blacklist: Blacklist,
    /// Keep only one URL of each set where one is a substring of another.
    pub drop_overlapping: bool,
}

/// Rows built from user input, plus what was dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowsBuild {
    pub rows: Vec<Vec<String>>,
    pub rejected: Vec<UrlError>,
    pub duplicates: usize,
    /// URLs dropped because a shorter overlapping URL was kept.
    pub overlapping: usize,
}

/// One row per non-empty input line. A line may list several URLs separated
/// by whitespace; they form one group. Lines starting with `#` are comments.
/// A URL already present in an earlier row is skipped.
pub fn build_rows<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    filter: &RowFilter,
) -> RowsBuild {
    let mut build = RowsBuild::default();
    let mut seen: Vec<String> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut group = Vec::new();
        for raw in line.split_whitespace() {
            match canonicalize_url(raw) {
                Ok(url) if filter.blacklist.matches(&url) => {
                    build.rejected.push(UrlError::Blacklisted { url })
                }
                Ok(url) if seen.contains(&url) => build.duplicates += 1,
                Ok(url) => {
                    seen.push(url.clone());
                    group.push(url);
                }
                Err(err) => build.rejected.push(err),
            }
        }
        if !group.is_empty() {
            build.rows.push(group);
        }
    }

    if filter.drop_overlapping {
        let kept: HashSet<String> = pick_unique_urls(&seen).into_iter().collect();
        build.overlapping = seen.len() - kept.len();
        for group in &mut build.rows {
            group.retain(|url| kept.contains(url));
        }
        build.rows.retain(|group| !group.is_empty());
    }
    build
}

/// Drops every URL that contains, or is contained in, a shorter URL of
/// `urls`. Comparison ignores the `https://` prefix. Survivors keep their
/// input order; among equally long overlapping URLs the first one wins.
pub fn pick_unique_urls(urls: &[String]) -> Vec<String> {
    let mut by_length: Vec<usize> = (0..urls.len()).collect();
    by_length.sort_by_key(|&index| urls[index].len());

    let mut kept: Vec<usize> = Vec::new();
    for index in by_length {
        let candidate = without_scheme(&urls[index]);
        let overlaps = kept.iter().any(|&other| {
            let other = without_scheme(&urls[other]);
            other.contains(candidate) || candidate.contains(other)
        });
        if !overlaps {
            kept.push(index);
        }
    }
    kept.sort_unstable();
    kept.into_iter().map(|index| urls[index].clone()).collect()
}

fn without_scheme(url: &str) -> &str {
    url.strip_prefix("https://").unwrap_or(url)
}
