//! Search tools: search_publications, search_by_year, search_by_date_range.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{SearchByDateRangeInput, SearchByYearInput, SearchPublicationsInput};

/// Weighted keyword search across DORA metadata fields.
pub struct SearchPublicationsTool;

#[async_trait::async_trait]
impl McpTool for SearchPublicationsTool {
    fn name(&self) -> &'static str {
        "search_publications"
    }

    fn description(&self) -> &'static str {
        "Search the DORA (Digital Object Repository for Academia) database for scientific \
         publications. Searches across titles, abstracts, authors, and other metadata fields. \
         Returns a list of publications matching the search criteria."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "search_string": {
                    "type": "string",
                    "description": "The search term to query. Can be an author name, title keyword, \
                                    or any search term. Example: 'manfred heuberger'"
                }
            },
            "required": ["search_string"]
        })
    }

    fn error_prefix(&self) -> &'static str {
        formatters::SEARCH_ERROR_PREFIX
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchPublicationsInput = serde_json::from_value(input)?;
        let term = params.validate()?;

        let results = ctx.client.search(term).await?;
        Ok(formatters::format_search_results(term, &results)?)
    }
}

/// All publications issued in one year.
pub struct SearchByYearTool;

#[async_trait::async_trait]
impl McpTool for SearchByYearTool {
    fn name(&self) -> &'static str {
        "search_by_year"
    }

    fn description(&self) -> &'static str {
        "List DORA publications issued in a specific year."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "year": {
                    "type": "integer",
                    "description": "Year to search for (e.g., 2018)"
                }
            },
            "required": ["year"]
        })
    }

    fn error_prefix(&self) -> &'static str {
        formatters::SEARCH_ERROR_PREFIX
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchByYearInput = serde_json::from_value(input)?;
        let year = params.validate()?;

        let results = ctx.client.search_by_year(year).await?;
        Ok(formatters::format_listing(&format!("Publications from {year}"), &results)?)
    }
}

/// Publications issued within a date range.
pub struct SearchByDateRangeTool;

#[async_trait::async_trait]
impl McpTool for SearchByDateRangeTool {
    fn name(&self) -> &'static str {
        "search_by_date_range"
    }

    fn description(&self) -> &'static str {
        "List DORA publications issued within a date range (inclusive)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "start_date": {
                    "type": "string",
                    "description": "Start date in ISO format (e.g., '2018-01-01')"
                },
                "end_date": {
                    "type": "string",
                    "description": "End date in ISO format (e.g., '2018-12-31')"
                }
            },
            "required": ["start_date", "end_date"]
        })
    }

    fn error_prefix(&self) -> &'static str {
        formatters::SEARCH_ERROR_PREFIX
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchByDateRangeInput = serde_json::from_value(input)?;
        let (start, end) = params.validate()?;

        let results = ctx.client.search_by_date_range(start, end).await?;
        let heading = format!("Publications from {start} to {end}");
        Ok(formatters::format_listing(&heading, &results)?)
    }
}
