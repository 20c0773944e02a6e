//! Static API descriptions served to integration platforms.
//!
//! Copilot Studio and Power Platform connectors onboard MCP servers from a
//! Swagger 2.0 document whose `/mcp` operation is tagged with
//! `x-ms-agentic-protocol`. Workflow tools consume the OpenAPI 3 contract of
//! the REST routes.

use serde_json::{Value, json};

use crate::config::server::SERVICE_TITLE;

/// Protocol marker expected by Copilot Studio for streamable MCP.
pub const AGENTIC_PROTOCOL: &str = "mcp-streamable-1.0";

const DESCRIPTION: &str =
    "Search the DORA (Empa) publication repository by author, title keyword or any search term.";

/// Split a public base URL into Swagger 2.0 `host` and `schemes`.
fn host_and_scheme(base_url: &str) -> (String, String) {
    match url::Url::parse(base_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost");
            let host = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            (host, url.scheme().to_string())
        }
        Err(_) => ("localhost:8000".to_string(), "http".to_string()),
    }
}

fn mcp_operation(summary: &str) -> Value {
    json!({
        "summary": summary,
        "description": "Model Context Protocol endpoint (JSON-RPC 2.0)",
        "operationId": "InvokeMCP",
        "x-ms-agentic-protocol": AGENTIC_PROTOCOL,
        "responses": {
            "200": { "description": "Success" }
        }
    })
}

/// Bare `/mcp` document for the Copilot Studio onboarding wizard.
#[must_use]
pub fn minimal_spec(base_url: &str) -> Value {
    let (host, scheme) = host_and_scheme(base_url);
    json!({
        "swagger": "2.0",
        "info": {
            "title": SERVICE_TITLE,
            "description": DESCRIPTION,
            "version": env!("CARGO_PKG_VERSION")
        },
        "host": host,
        "basePath": "/",
        "schemes": [scheme],
        "paths": {
            "/mcp": { "post": mcp_operation("DORA MCP Server") }
        }
    })
}

/// Copilot Studio variant with content types and tags.
#[must_use]
pub fn copilot_spec(base_url: &str) -> Value {
    let mut spec = minimal_spec(base_url);
    spec["consumes"] = json!(["application/json"]);
    spec["produces"] = json!(["application/json"]);
    spec["paths"]["/mcp"]["post"]["tags"] = json!(["Agentic", "McpSse"]);
    spec["paths"]["/mcp"]["post"]["summary"] = json!("Search DORA publications");
    spec
}

/// Power Platform custom connector: `/mcp` plus the REST search action.
#[must_use]
pub fn connector_spec(base_url: &str) -> Value {
    let mut spec = copilot_spec(base_url);
    spec["paths"]["/search"] = json!({
        "post": {
            "summary": "Search publications",
            "description": "Weighted keyword search across titles, abstracts, authors and other metadata.",
            "operationId": "SearchPublications",
            "parameters": [{
                "name": "body",
                "in": "body",
                "required": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "search_string": {
                            "type": "string",
                            "description": "Author name, title keyword or any search term",
                            "x-ms-summary": "Search string"
                        }
                    },
                    "required": ["search_string"]
                }
            }],
            "responses": {
                "200": { "description": "Raw DORA search response", "schema": { "type": "object" } },
                "400": { "description": "Missing search_string" },
                "502": { "description": "DORA unavailable" }
            }
        }
    });
    spec
}

fn json_body(properties: &Value, required: &[&str]) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": required
                }
            }
        }
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" }
            }
        }
    })
}

/// OpenAPI 3 contract of the REST routes.
#[must_use]
pub fn rest_spec(base_url: &str) -> Value {
    let publication_id = json!({
        "publication_id": {
            "type": "string",
            "description": "DORA identifier (empa:12345), numeric id, or publication URL"
        }
    });
    let mut fulltext_props = publication_id.clone();
    fulltext_props["include_content"] =
        json!({ "type": "boolean", "default": false, "description": "Embed the PDF as base64" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": SERVICE_TITLE,
            "description": DESCRIPTION,
            "version": env!("CARGO_PKG_VERSION")
        },
        "servers": [{ "url": base_url }],
        "paths": {
            "/search": {
                "post": {
                    "operationId": "searchPublications",
                    "summary": "Search publications",
                    "requestBody": json_body(
                        &json!({
                            "search_string": {
                                "type": "string",
                                "description": "Author name, title keyword or any search term",
                                "example": "manfred heuberger"
                            }
                        }),
                        &["search_string"],
                    ),
                    "responses": {
                        "200": {
                            "description": "Raw DORA search response",
                            "content": { "application/json": { "schema": { "type": "object" } } }
                        },
                        "400": error_response("Missing search_string"),
                        "502": error_response("DORA request failed"),
                        "504": error_response("DORA request timed out")
                    }
                }
            },
            "/abstract": {
                "post": {
                    "operationId": "getPublicationAbstract",
                    "summary": "Fetch a publication abstract",
                    "requestBody": json_body(&publication_id, &["publication_id"]),
                    "responses": {
                        "200": { "description": "Abstract found" },
                        "400": error_response("Invalid publication_id"),
                        "404": { "description": "Publication page has no abstract" },
                        "502": error_response("DORA request failed")
                    }
                }
            },
            "/fulltext": {
                "post": {
                    "operationId": "downloadPublicationFulltext",
                    "summary": "Download a publication PDF",
                    "requestBody": json_body(&fulltext_props, &["publication_id"]),
                    "responses": {
                        "200": { "description": "PDF located and downloaded" },
                        "400": error_response("Invalid publication_id"),
                        "404": { "description": "Publication page has no PDF link" },
                        "502": error_response("DORA request failed")
                    }
                }
            },
            "/tools": {
                "get": {
                    "operationId": "listTools",
                    "summary": "List MCP tools",
                    "responses": { "200": { "description": "Tool descriptors" } }
                }
            },
            "/health": {
                "get": {
                    "operationId": "health",
                    "summary": "Health check",
                    "responses": { "200": { "description": "Service is healthy" } }
                }
            },
            "/mcp": {
                "post": {
                    "operationId": "invokeMcp",
                    "summary": "MCP JSON-RPC endpoint",
                    "x-ms-agentic-protocol": AGENTIC_PROTOCOL,
                    "responses": { "200": { "description": "JSON-RPC response" } }
                }
            }
        },
        "components": {
            "schemas": {
                "Error": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } },
                    "required": ["error"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_and_scheme() {
        assert_eq!(
            host_and_scheme("https://dora-mcp.example.org"),
            ("dora-mcp.example.org".to_string(), "https".to_string())
        );
        assert_eq!(
            host_and_scheme("http://localhost:8000"),
            ("localhost:8000".to_string(), "http".to_string())
        );
    }

    #[test]
    fn test_specs_declare_streamable_protocol() {
        for spec in [
            minimal_spec("https://x.org"),
            copilot_spec("https://x.org"),
            connector_spec("https://x.org"),
            rest_spec("https://x.org"),
        ] {
            assert_eq!(spec["paths"]["/mcp"]["post"]["x-ms-agentic-protocol"], AGENTIC_PROTOCOL);
            assert_eq!(spec["info"]["title"], "DORA MCP Server");
        }
    }

    #[test]
    fn test_connector_has_search_action() {
        let spec = connector_spec("https://x.org");
        assert_eq!(spec["paths"]["/search"]["post"]["operationId"], "SearchPublications");
        assert_eq!(spec["host"], "x.org");
    }

    #[test]
    fn test_rest_spec_server_url() {
        let spec = rest_spec("https://x.org");
        assert_eq!(spec["servers"][0]["url"], "https://x.org");
        assert_eq!(
            spec["paths"]["/search"]["post"]["requestBody"]["content"]["application/json"]["schema"]
                ["required"][0],
            "search_string"
        );
    }
}
