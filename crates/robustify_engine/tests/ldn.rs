use pretty_assertions::assert_eq;
use robustify_engine::{ClientSettings, FailureKind, LdnClient, RobustifyRecord};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "5d41402abc4b2a76b9719d911017c592";

fn client(server: &MockServer) -> LdnClient {
    LdnClient::new(ClientSettings::for_server(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn get_ldn_returns_pretty_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/ldn/{KEY}")))
        .and(query_param("ld_server_url", "https://ld.example.org/"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Offer",
            "object": {"url": "http://localhost/mappings/x"}
        })))
        .mount(&server)
        .await;

    let text = client(&server)
        .get_ldn(KEY, "https://ld.example.org/")
        .await
        .expect("ldn");

    assert!(text.contains("\n  \"type\": \"Offer\""));
    assert!(text.contains("\n    \"url\": \"http://localhost/mappings/x\"\n  }"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&text).unwrap(),
        json!({"type": "Offer", "object": {"url": "http://localhost/mappings/x"}})
    );
}

#[tokio::test]
async fn get_ldn_surfaces_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/ldn/{KEY}")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "timestamp": "2024-01-01T00:00:00",
            "error": "The URL https://nope.example is not an LD Server"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_ldn(KEY, "https://nope.example")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(
        err.message,
        "The URL https://nope.example is not an LD Server"
    );
}

#[tokio::test]
async fn preview_follows_redirect_to_preview_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/preview"))
        .and(body_json(json!({"type": "Offer"})))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/preview?pdf_url=a&mapping_url=b"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/preview"))
        .and(query_param("pdf_url", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let location = client(&server)
        .preview_ldn("{\"type\": \"Offer\"}")
        .await
        .expect("preview");

    assert_eq!(
        location,
        format!("{}/preview?pdf_url=a&mapping_url=b", server.uri())
    );
}

#[tokio::test]
async fn send_ldn_posts_server_url_and_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/ldn/{KEY}")))
        .and(body_json(json!({"ld_server_url": "https://ld.example.org/"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server)
        .send_ldn(KEY, "https://ld.example.org/")
        .await
        .expect("sent");
    assert_eq!(status, 201);
}

#[tokio::test]
async fn send_ldn_rejection_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/ldn/{KEY}")))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_ldn(KEY, "https://ld.example.org/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn mappings_are_keyed_by_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/mappings/{KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "https://a.example.com": {
                "ok": true,
                "uri": "https://a.example.com",
                "href_uri_r": "<a>r</a>",
                "href_uri_m": "<a>m</a>"
            },
            "https://b.example.com": {"ok": false, "uri": "https://b.example.com", "error": "x"}
        })))
        .mount(&server)
        .await;

    let mappings = client(&server).fetch_mappings(KEY).await.expect("mappings");
    assert_eq!(mappings.len(), 2);
    assert_eq!(
        mappings["https://b.example.com"],
        RobustifyRecord::Failed {
            uri: "https://b.example.com".to_string(),
            error: "x".to_string(),
        }
    );
}
