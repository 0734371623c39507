use robustify_core::{escape_html, AppViewModel};

/// Standalone results page: the row buttons in their final tones, the
/// progress line and the log cards with working Copy buttons.
pub fn render_page(view: &AppViewModel, generated_at: &str) -> String {
    const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Robustify __KEY__</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" />
</head>
<body class="container py-3">
  <h1 class="h4">Robust links for __KEY__</h1>
  <p class="text-muted small">Generated __GENERATED__</p>
  <div id="rows" class="mb-3">
__ROWS__
  </div>
  <p id="progress">__PROGRESS__</p>
__ERROR__
  <div id="log">__LOG__</div>
  <div class="toast-container position-fixed bottom-0 end-0 p-3">
    <div id="copiedToast" class="toast" role="alert">
      <div class="toast-body">Copied to clipboard</div>
    </div>
  </div>
  <script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
  <script>
function copyToClipboard(textToCopy) {
  const showToast = () => new bootstrap.Toast(document.getElementById("copiedToast")).show();
  if (navigator.clipboard && window.isSecureContext) {
    return navigator.clipboard.writeText(textToCopy).then(showToast);
  }
  let textArea = document.createElement("textarea");
  textArea.value = textToCopy;
  textArea.style.position = "fixed";
  textArea.style.left = "-999999px";
  textArea.style.top = "-999999px";
  document.body.appendChild(textArea);
  textArea.focus();
  textArea.select();
  return new Promise((res, rej) => {
    document.execCommand('copy') ? res() : rej();
    textArea.remove();
  }).then(showToast);
}
  </script>
</body>
</html>
"#;

    let rows: String = view
        .rows
        .iter()
        .map(|row| {
            let uris: Vec<String> = row.uris.iter().map(|uri| escape_html(uri)).collect();
            format!(
                "    <button type=\"button\" class=\"btn btn-sm {} mb-1 me-1\" disabled>{}</button>\n",
                row.tone.css_class(),
                uris.join("<br>")
            )
        })
        .collect();
    let error = match &view.last_error {
        Some(message) => format!(
            "  <div class=\"alert alert-danger\">Error from API: {}</div>",
            escape_html(message)
        ),
        None => String::new(),
    };

    fill(
        TEMPLATE,
        &[
            ("__KEY__", &escape_html(&view.key)),
            ("__GENERATED__", &escape_html(generated_at)),
            ("__ROWS__", rows.trim_end_matches('\n')),
            ("__PROGRESS__", &view.progress.text()),
            ("__ERROR__", &error),
            ("__LOG__", &view.log_html()),
        ],
    )
}

/// Substitutes placeholders in one left-to-right pass. Inserted values are
/// never scanned again, so URIs containing a placeholder name stay as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('_');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use robustify_core::{LogCard, RowView, Tone};

    #[test]
    fn page_contains_rows_progress_and_cards() {
        let mut view = AppViewModel {
            key: "abc".to_string(),
            ..AppViewModel::default()
        };
        view.progress.fail = 1;
        view.progress.total = 1;
        view.rows.push(RowView {
            row: 0,
            uris: vec!["https://a.example.com/?x=<1>".to_string()],
            checked: true,
            tone: Tone::Warning,
            enabled: true,
        });
        view.log.push(LogCard::Failed {
            uri: "https://a.example.com/?x=<1>".to_string(),
            error: "timeout".to_string(),
        });

        let page = render_page(&view, "2026-01-01T00:00:00+00:00");
        assert!(page.contains("<title>Robustify abc</title>"));
        assert!(page.contains("btn-warning"));
        assert!(page.contains("https://a.example.com/?x=&lt;1&gt;"));
        assert!(page.contains("Pass: 0, Fail: 1, Total: 1"));
        assert!(page.contains(&view.log_html()));
        assert!(!page.contains("alert-danger"));
        assert!(!page.contains("__LOG__"));
        assert!(!page.contains("__ROWS__"));
    }

    #[test]
    fn placeholder_names_in_uris_are_left_alone() {
        let uri = "https://a.example.com/__LOG__";
        let mut view = AppViewModel::default();
        view.rows.push(RowView {
            row: 0,
            uris: vec![uri.to_string()],
            checked: false,
            tone: Tone::Primary,
            enabled: true,
        });
        view.log.push(LogCard::Failed {
            uri: uri.to_string(),
            error: "MARKER".to_string(),
        });

        let page = render_page(&view, "now");
        assert_eq!(page.matches("MARKER").count(), 1);
        assert!(page.contains(uri));
    }

    #[test]
    fn fill_keeps_unknown_underscores() {
        assert_eq!(
            fill("a___X__ b__c__", &[("__X__", "1")]),
            "a_1 b__c__".to_string()
        );
    }
}
