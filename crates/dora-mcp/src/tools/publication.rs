//! Publication tools: get_publication_abstract, download_publication_fulltext.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{FulltextInput, PublicationInput};

fn publication_id_schema() -> serde_json::Value {
    json!({
        "type": "string",
        "description": "DORA identifier (e.g., 'empa:12345' or '12345') or the publication URL \
                        (https://www.dora.lib4ri.ch/empa/islandora/object/empa:12345)"
    })
}

/// Abstract of a single publication.
pub struct PublicationAbstractTool;

#[async_trait::async_trait]
impl McpTool for PublicationAbstractTool {
    fn name(&self) -> &'static str {
        "get_publication_abstract"
    }

    fn description(&self) -> &'static str {
        "Fetch the abstract of a DORA publication from its publication page. Returns \
         found=false when the page carries no abstract."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "publication_id": publication_id_schema()
            },
            "required": ["publication_id"]
        })
    }

    fn error_prefix(&self) -> &'static str {
        formatters::PUBLICATION_ERROR_PREFIX
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PublicationInput = serde_json::from_value(input)?;
        let id = params.validate()?;

        let lookup = ctx.client.get_abstract(&id).await?;
        Ok(formatters::format_lookup(&lookup)?)
    }
}

/// Full-text PDF of a single publication.
pub struct PublicationFulltextTool;

#[async_trait::async_trait]
impl McpTool for PublicationFulltextTool {
    fn name(&self) -> &'static str {
        "download_publication_fulltext"
    }

    fn description(&self) -> &'static str {
        "Download the full-text PDF of a DORA publication. Reports the PDF URL, content type \
         and size; set include_content to embed the PDF as base64. Returns found=false when \
         the publication page has no PDF link."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "publication_id": publication_id_schema(),
                "include_content": {
                    "type": "boolean",
                    "default": false,
                    "description": "Embed the PDF body as base64"
                }
            },
            "required": ["publication_id"]
        })
    }

    fn error_prefix(&self) -> &'static str {
        formatters::PUBLICATION_ERROR_PREFIX
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: FulltextInput = serde_json::from_value(input)?;
        let id = params.validate()?;

        let lookup = ctx.client.download_fulltext(&id, params.include_content).await?;
        Ok(formatters::format_lookup(&lookup)?)
    }
}
