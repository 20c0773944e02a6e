//! Abstract and full-text lookups against a mocked DORA object page.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dora_mcp::client::DoraClient;
use dora_mcp::config::Config;
use dora_mcp::error::ClientError;
use dora_mcp::models::{Lookup, PublicationId};
use dora_mcp::server::rpc::Dispatcher;
use dora_mcp::tools::{self, McpTool, PublicationAbstractTool, PublicationFulltextTool, ToolContext};

const OBJECT_PATH: &str = "/islandora/object/empa:1234";
const PDF_BYTES: &[u8] = b"%PDF-1.4 fake";

fn client(mock_server: &MockServer) -> DoraClient {
    DoraClient::new(Config::for_testing(&mock_server.uri())).unwrap()
}

fn setup_test_context(mock_server: &MockServer) -> ToolContext {
    ToolContext::new(Arc::new(client(mock_server)))
}

fn object_page(description: Option<&str>, pdf_href: Option<&str>) -> String {
    let meta = description
        .map(|d| format!(r#"<meta name="description" content="{d}">"#))
        .unwrap_or_default();
    let link = pdf_href
        .map(|href| format!(r#"<a class="download" href="{href}">  Download   PDF </a>"#))
        .unwrap_or_default();
    format!(
        "<html><head><title>Publication</title>{meta}</head>\
         <body><h1>Surface forces</h1><a href=\"/empa/\">Home</a>{link}</body></html>"
    )
}

async fn mount_page(mock_server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(mock_server)
        .await;
}

// =============================================================================
// Abstract
// =============================================================================

#[tokio::test]
async fn test_abstract_found() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(Some("We measure   surface forces."), None)).await;

    let id = PublicationId::parse("1234").unwrap();
    let lookup = client(&mock_server).get_abstract(&id).await.unwrap();

    match lookup {
        Lookup::Found(result) => {
            assert_eq!(result.publication_id.as_str(), "empa:1234");
            assert_eq!(result.abstract_text, "We measure surface forces.");
            assert!(result.url.ends_with(OBJECT_PATH));
        }
        Lookup::NotFound(missing) => panic!("expected abstract, got {missing:?}"),
    }
}

#[tokio::test]
async fn test_abstract_missing_markup_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(None, None)).await;

    let ctx = setup_test_context(&mock_server);
    let text = PublicationAbstractTool
        .execute(&ctx, json!({"publication_id": "empa:1234"}))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["found"], false);
    assert_eq!(value["publication_id"], "empa:1234");
    assert_eq!(value["reason"], "no abstract on publication page");
}

#[tokio::test]
async fn test_abstract_unknown_page_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let id = PublicationId::parse("empa:1234").unwrap();
    let lookup = client(&mock_server).get_abstract(&id).await.unwrap();

    assert!(!lookup.is_found());
}

#[tokio::test]
async fn test_abstract_from_url_argument() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(Some("An abstract."), None)).await;

    let ctx = setup_test_context(&mock_server);
    let text = PublicationAbstractTool
        .execute(
            &ctx,
            json!({"publication_id": "https://www.dora.lib4ri.ch/empa/islandora/object/empa%3A1234"}),
        )
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["abstract"], "An abstract.");
}

#[tokio::test]
async fn test_abstract_server_error_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dispatcher = Dispatcher::new(tools::register_all_tools(), setup_test_context(&mock_server));
    let result = dispatcher
        .call_tool("get_publication_abstract", json!({"publication_id": "empa:1234"}))
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result.content[0].text.starts_with("Error fetching publication: "));
}

#[tokio::test]
async fn test_abstract_rejects_bad_identifier() {
    let ctx = ToolContext::new(Arc::new(
        DoraClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap(),
    ));

    for id in ["", "not a pid", "https://example.org/papers/1"] {
        let result = PublicationAbstractTool.execute(&ctx, json!({"publication_id": id})).await;
        assert!(result.is_err(), "accepted {id:?}");
    }
}

// =============================================================================
// Full text
// =============================================================================

#[tokio::test]
async fn test_fulltext_metadata_only() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        object_page(None, Some("/empa/islandora/object/empa:1234/datastream/PDF/view")),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/empa/islandora/object/empa:1234/datastream/PDF/view"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(PDF_BYTES),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = PublicationId::parse("empa:1234").unwrap();
    let lookup = client(&mock_server).download_fulltext(&id, false).await.unwrap();

    let Lookup::Found(result) = lookup else { panic!("expected full text") };
    assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(result.size_bytes, PDF_BYTES.len() as u64);
    assert!(result.pdf_url.ends_with("/datastream/PDF/view"));
    assert!(result.content_base64.is_none());

    let value = serde_json::to_value(Lookup::Found(result)).unwrap();
    assert!(value.get("content_base64").is_none());
}

#[tokio::test]
async fn test_fulltext_with_content() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(None, Some("files/paper.pdf"))).await;

    Mock::given(method("GET"))
        .and(path("/islandora/object/files/paper.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let text = PublicationFulltextTool
        .execute(&ctx, json!({"publication_id": "empa:1234", "include_content": true}))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["content_base64"], STANDARD.encode(PDF_BYTES));
    assert_eq!(value["size_bytes"], PDF_BYTES.len());
}

#[tokio::test]
async fn test_fulltext_without_link_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(Some("Abstract only."), None)).await;

    let ctx = setup_test_context(&mock_server);
    let text = PublicationFulltextTool
        .execute(&ctx, json!({"publication_id": "empa:1234"}))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["found"], false);
    assert!(value["reason"].as_str().unwrap().contains("Download PDF"));
}

#[tokio::test]
async fn test_fulltext_missing_pdf_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(None, Some("/gone.pdf"))).await;

    Mock::given(method("GET"))
        .and(path("/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let id = PublicationId::parse("empa:1234").unwrap();
    let lookup = client(&mock_server).download_fulltext(&id, true).await.unwrap();

    let Lookup::NotFound(missing) = lookup else { panic!("expected not found") };
    assert_eq!(missing.reason, "full text not found");
    assert!(missing.url.ends_with("/gone.pdf"));
}

#[tokio::test]
async fn test_fulltext_over_size_limit_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, object_page(None, Some("/big.pdf"))).await;

    Mock::given(method("GET"))
        .and(path("/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.max_download_bytes = 8;
    let client = DoraClient::new(config).unwrap();
    let id = PublicationId::parse("empa:1234").unwrap();

    for include_content in [false, true] {
        let err = client.download_fulltext(&id, include_content).await.unwrap_err();
        assert!(matches!(err, ClientError::TooLarge { limit: 8 }));
    }

    let dispatcher = Dispatcher::new(
        tools::register_all_tools(),
        ToolContext::new(Arc::new(client)),
    );
    let result = dispatcher
        .call_tool("download_publication_fulltext", json!({"publication_id": "empa:1234"}))
        .await
        .unwrap();
    assert!(result.is_error);
    assert!(result.content[0].text.starts_with("Error fetching publication: "));
}
