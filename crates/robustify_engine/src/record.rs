use serde::{Deserialize, Serialize};

use crate::{EngineError, FailureKind};

/// Shown for a failed record that carries no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One robustify result as streamed by the server and stored in its mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub enum RobustifyRecord {
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

impl RobustifyRecord {
    pub fn uri(&self) -> &str {
        match self {
            RobustifyRecord::Passed { uri, .. } | RobustifyRecord::Failed { uri, .. } => uri,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireRecord {
    uri: String,
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href_uri_r: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href_uri_m: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<WireRecord> for RobustifyRecord {
    type Error = String;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        if !wire.ok {
            return Ok(RobustifyRecord::Failed {
                uri: wire.uri,
                error: wire.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            });
        }
        match (wire.href_uri_r, wire.href_uri_m) {
            (Some(href_uri_r), Some(href_uri_m)) => Ok(RobustifyRecord::Passed {
                uri: wire.uri,
                href_uri_r,
                href_uri_m,
            }),
            _ => Err(format!("record for {} is ok but lacks its hrefs", wire.uri)),
        }
    }
}

impl From<RobustifyRecord> for WireRecord {
    fn from(record: RobustifyRecord) -> Self {
        match record {
            RobustifyRecord::Passed {
                uri,
                href_uri_r,
                href_uri_m,
            } => WireRecord {
                uri,
                ok: true,
                href_uri_r: Some(href_uri_r),
                href_uri_m: Some(href_uri_m),
                error: None,
            },
            RobustifyRecord::Failed { uri, error } => WireRecord {
                uri,
                ok: false,
                href_uri_r: None,
                href_uri_m: None,
                error: Some(error),
            },
        }
    }
}

/// Parses one stream line into a record.
pub fn parse_record(line: &str) -> Result<RobustifyRecord, EngineError> {
    serde_json::from_str(line.trim())
        .map_err(|err| EngineError::new(FailureKind::MalformedRecord, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_record_parses() {
        let record = parse_record(
            r#"{"ok": true, "uri": "https://a.example.com", "href_uri_r": "<a>r</a>", "href_uri_m": "<a>m</a>"}"#,
        )
        .unwrap();
        assert_eq!(
            record,
            RobustifyRecord::Passed {
                uri: "https://a.example.com".into(),
                href_uri_r: "<a>r</a>".into(),
                href_uri_m: "<a>m</a>".into(),
            }
        );
    }

    #[test]
    fn failed_record_without_message_gets_placeholder() {
        let record = parse_record(r#"{"ok": false, "uri": "https://a.example.com"}"#).unwrap();
        assert_eq!(
            record,
            RobustifyRecord::Failed {
                uri: "https://a.example.com".into(),
                error: UNKNOWN_ERROR.into(),
            }
        );
    }

    #[test]
    fn ok_record_without_hrefs_is_malformed() {
        let err = parse_record(r#"{"ok": true, "uri": "https://a.example.com"}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedRecord);
        assert!(err.message.contains("lacks its hrefs"));
    }

    #[test]
    fn failed_record_serializes_in_wire_shape() {
        let json = serde_json::to_value(RobustifyRecord::Failed {
            uri: "https://a.example.com".into(),
            error: "gone".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"uri": "https://a.example.com", "ok": false, "error": "gone"})
        );
    }
}
