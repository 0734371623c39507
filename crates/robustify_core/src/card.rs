use crate::{HrefField, Observation};

/// One entry of the result log, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCard {
    Passed {
        uri: String,
        href_uri_r: String,
        href_uri_m: String,
    },
    Failed {
        uri: String,
        error: String,
    },
}

impl LogCard {
    /// Builds the card for an observation; href fragments are flattened to one line.
    pub fn from_observation(observation: Observation) -> Self {
        match observation {
            Observation::Passed {
                uri,
                href_uri_r,
                href_uri_m,
            } => LogCard::Passed {
                uri,
                href_uri_r: collapse_whitespace(&href_uri_r),
                href_uri_m: collapse_whitespace(&href_uri_m),
            },
            Observation::Failed { uri, error } => LogCard::Failed { uri, error },
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            LogCard::Passed { uri, .. } | LogCard::Failed { uri, .. } => uri,
        }
    }

    pub fn href(&self, field: HrefField) -> Option<&str> {
        match (self, field) {
            (LogCard::Passed { href_uri_r, .. }, HrefField::UriR) => Some(href_uri_r),
            (LogCard::Passed { href_uri_m, .. }, HrefField::UriM) => Some(href_uri_m),
            (LogCard::Failed { .. }, _) => None,
        }
    }

    /// Text placed on the clipboard by the card's Copy button for `field`.
    pub fn copy_text(&self, field: HrefField) -> Option<String> {
        self.href(field).map(copy_text)
    }

    /// Bootstrap card markup, as appended to the log element of the page.
    pub fn to_html(&self) -> String {
        match self {
            LogCard::Passed {
                uri,
                href_uri_r,
                href_uri_m,
            } => format!(
                r#"
<div class="card mb-1">
  <div class="card-header px-2 bg-success text-white">
    <b class="nowrap">{uri}</b>
  </div>
  <div class="card-body p-2">
    <table class="card-text w-100">
    <tbody>
{row_r}
{row_m}
    </tbody>
    </table>
  </div>
</div>"#,
                uri = escape_html(uri),
                row_r = href_row(HrefField::UriR, href_uri_r),
                row_m = href_row(HrefField::UriM, href_uri_m),
            ),
            LogCard::Failed { uri, error } => format!(
                r#"
<div class="card mb-1">
  <div class="card-header px-2 bg-warning text-white">
    <b>{uri}</b>
  </div>
  <div class="card-body p-2">
    <table class="card-text w-100">
    <tbody>
      <tr>
        <td class="w-4em"><b>Error:</b></td>
        <td>{error}</td>
      </tr>
    </tbody>
    </table>
  </div>
</div>"#,
                uri = escape_html(uri),
                error = escape_html(error),
            ),
        }
    }
}

fn href_row(field: HrefField, href: &str) -> String {
    format!(
        r#"      <tr>
        <td class="w-4em"><b>{label}:</b></td>
        <td>{href}</td>
        <td class="w-4em">
          <button
            type="button"
            class="btn btn-success btn-sm float-end text-xs"
            onclick='copyToClipboard({literal})'>Copy</button></td>
      </tr>"#,
        label = field.label(),
        href = href,
        literal = js_template_literal(&copy_text(href)),
    )
}

/// Replaces every run of whitespace with a single space.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Clipboard text for an href fragment: single quotes become double quotes so
/// the fragment can sit inside a single-quoted `onclick` attribute.
pub fn copy_text(href: &str) -> String {
    href.replace('\'', "\"")
}

fn js_template_literal(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${");
    format!("`{escaped}`")
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HREF_R: &str = "<a href='https://example.com/'\n   data-versionurl='https://web.archive.org/x'>example</a>";

    fn passed() -> LogCard {
        LogCard::from_observation(Observation::Passed {
            uri: "https://example.com/".into(),
            href_uri_r: HREF_R.into(),
            href_uri_m: "<a href=\"https://web.archive.org/x\">memento</a>".into(),
        })
    }

    #[test]
    fn whitespace_runs_collapse_to_single_space() {
        assert_eq!(collapse_whitespace("a \n\t b\n\nc"), "a b c");
        assert_eq!(collapse_whitespace("plain"), "plain");
    }

    #[test]
    fn passed_card_hrefs_are_flattened() {
        let card = passed();
        assert_eq!(
            card.href(HrefField::UriR),
            Some("<a href='https://example.com/' data-versionurl='https://web.archive.org/x'>example</a>")
        );
    }

    #[test]
    fn copy_text_swaps_single_quotes() {
        let card = passed();
        assert_eq!(
            card.copy_text(HrefField::UriR).as_deref(),
            Some("<a href=\"https://example.com/\" data-versionurl=\"https://web.archive.org/x\">example</a>")
        );
    }

    #[test]
    fn failed_card_has_no_copy_text() {
        let card = LogCard::from_observation(Observation::Failed {
            uri: "https://example.com/".into(),
            error: "nope".into(),
        });
        assert_eq!(card.copy_text(HrefField::UriM), None);
    }

    #[test]
    fn passed_html_has_green_header_and_copy_buttons() {
        let html = passed().to_html();
        assert!(html.contains("bg-success"));
        assert!(html.contains("<b>URI-R:</b>"));
        assert!(html.contains("<b>URI-M:</b>"));
        assert_eq!(html.matches("onclick='copyToClipboard(`").count(), 2);
        // The attribute stays single-quoted: no raw single quote inside it.
        assert!(!html.contains("copyToClipboard(`<a href='"));
    }

    #[test]
    fn failed_html_escapes_uri_and_error() {
        let card = LogCard::Failed {
            uri: "https://example.com/?a=1&b=<2>".into(),
            error: "Robust Links said \"no\"".into(),
        };
        let html = card.to_html();
        assert!(html.contains("bg-warning"));
        assert!(html.contains("https://example.com/?a=1&amp;b=&lt;2&gt;"));
        assert!(html.contains("Robust Links said &quot;no&quot;"));
    }

    #[test]
    fn template_literal_escapes_backticks_and_interpolation() {
        assert_eq!(js_template_literal("a`b${c}"), "`a\\`b\\${c}`");
    }
}
