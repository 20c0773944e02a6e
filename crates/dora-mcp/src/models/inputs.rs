//! Input models for MCP tool parameters and REST bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PublicationId;
use crate::error::{ToolError, ToolResult};

/// Input for the weighted keyword search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPublicationsInput {
    /// Author name, title keyword or any free-text term.
    #[serde(default, alias = "searchString")]
    pub search_string: String,
}

impl SearchPublicationsInput {
    /// Return the trimmed search term, rejecting blank input.
    pub fn validate(&self) -> ToolResult<&str> {
        let term = self.search_string.trim();
        if term.is_empty() {
            return Err(ToolError::validation("search_string", "search_string is required"));
        }
        Ok(term)
    }
}

/// Input for searching one publication year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchByYearInput {
    /// Year of issue (e.g., 2018).
    pub year: i32,
}

impl SearchByYearInput {
    /// Check the year is a plausible four-digit year.
    pub fn validate(&self) -> ToolResult<i32> {
        if !(1000..=9999).contains(&self.year) {
            return Err(ToolError::validation("year", "year must be a four-digit year"));
        }
        Ok(self.year)
    }
}

/// Input for searching an issued-date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchByDateRangeInput {
    /// Start date in ISO format (e.g., "2018-01-01").
    pub start_date: String,

    /// End date in ISO format (e.g., "2018-12-31").
    pub end_date: String,
}

impl SearchByDateRangeInput {
    /// Parse both dates and check they are ordered.
    pub fn validate(&self) -> ToolResult<(NaiveDate, NaiveDate)> {
        let start = parse_date("start_date", &self.start_date)?;
        let end = parse_date("end_date", &self.end_date)?;
        if start > end {
            return Err(ToolError::validation("start_date", "start_date must not be after end_date"));
        }
        Ok((start, end))
    }
}

fn parse_date(field: &str, value: &str) -> ToolResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::validation(field, format!("'{value}' is not a YYYY-MM-DD date")))
}

/// Input identifying one publication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationInput {
    /// DORA PID (`empa:12345`), numeric id, or object URL.
    #[serde(default, alias = "publicationId")]
    pub publication_id: String,
}

impl PublicationInput {
    /// Normalize the identifier.
    pub fn validate(&self) -> ToolResult<PublicationId> {
        PublicationId::parse(&self.publication_id)
    }
}

/// Input for downloading a publication's PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulltextInput {
    /// DORA PID (`empa:12345`), numeric id, or object URL.
    #[serde(default, alias = "publicationId")]
    pub publication_id: String,

    /// Embed the PDF as base64 in the result.
    #[serde(default, alias = "includeContent")]
    pub include_content: bool,
}

impl FulltextInput {
    /// Normalize the identifier.
    pub fn validate(&self) -> ToolResult<PublicationId> {
        PublicationId::parse(&self.publication_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_input_missing_field_is_blank() {
        let input: SearchPublicationsInput = serde_json::from_str("{}").unwrap();
        let err = input.validate().unwrap_err();
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("search_string is required"));
    }

    #[test]
    fn test_search_input_trims() {
        let input: SearchPublicationsInput =
            serde_json::from_str(r#"{"search_string": "  manfred heuberger "}"#).unwrap();
        assert_eq!(input.validate().unwrap(), "manfred heuberger");
    }

    #[test]
    fn test_search_input_camel_case_alias() {
        let input: SearchPublicationsInput =
            serde_json::from_str(r#"{"searchString": "graphene"}"#).unwrap();
        assert_eq!(input.validate().unwrap(), "graphene");
    }

    #[test]
    fn test_year_bounds() {
        assert!(SearchByYearInput { year: 2018 }.validate().is_ok());
        assert!(SearchByYearInput { year: 18 }.validate().is_err());
        assert!(SearchByYearInput { year: 20180 }.validate().is_err());
    }

    #[test]
    fn test_date_range_order() {
        let input = SearchByDateRangeInput {
            start_date: "2020-06-30".into(),
            end_date: "2020-01-01".into(),
        };
        assert!(input.validate().is_err());

        let input = SearchByDateRangeInput {
            start_date: "2020-01-01".into(),
            end_date: "2020-06-30".into(),
        };
        let (start, end) = input.validate().unwrap();
        assert!(start < end);
    }

    #[test]
    fn test_date_range_rejects_bad_format() {
        let input = SearchByDateRangeInput {
            start_date: "01/01/2020".into(),
            end_date: "2020-06-30".into(),
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_user_message().contains("start_date"));
    }

    #[test]
    fn test_fulltext_defaults() {
        let input: FulltextInput =
            serde_json::from_str(r#"{"publication_id": "empa:1"}"#).unwrap();
        assert!(!input.include_content);
        assert_eq!(input.validate().unwrap().as_str(), "empa:1");
    }
}
