use scraper::{Html, Selector};

/// The anchor of a robust link fragment, as returned in `href_uri_r` and
/// `href_uri_m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobustLink {
    pub href: String,
    pub text: String,
    pub original_url: Option<String>,
    pub version_url: Option<String>,
    pub version_date: Option<String>,
}

/// Extracts the first anchor with an `href` from an HTML fragment.
pub fn parse_robust_link(fragment: &str) -> Option<RobustLink> {
    let document = Html::parse_fragment(fragment);
    let selector = Selector::parse("a[href]").ok()?;
    let anchor = document.select(&selector).next()?;
    let element = anchor.value();
    let attr = |name: &str| {
        element
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    };

    let text = anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    Some(RobustLink {
        href: attr("href")?,
        text,
        original_url: attr("data-originalurl"),
        version_url: attr("data-versionurl"),
        version_date: attr("data-versiondate"),
    })
}
