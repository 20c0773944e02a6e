//! Solr query construction for the DORA search endpoint.
//!
//! DORA exposes an Islandora Solr search whose query travels in the URL
//! path. A free-text term is expanded into one boosted clause per metadata
//! field and the clauses are OR-ed together.

use std::borrow::Cow;

use chrono::NaiveDate;

/// Default query matching every publication.
pub const MATCH_ALL: &str = "*:*";

/// Separator between encoded clauses (a percent-encoded ` OR `).
pub const CLAUSE_SEPARATOR: &str = "%20OR%20";

/// Solr field holding the issued date of a publication.
pub const DATE_ISSUED_FIELD: &str = "mods_originInfo_encoding_w3cdtf_keyDate_yes_dateIssued_dt";

/// Searched fields and their boosts, in query order.
pub const FIELD_WEIGHTS: [(&str, u8); 7] = [
    ("mods_titleInfo_title_mt", 5),
    ("mods_abstract_ms", 2),
    ("dc.creator", 2),
    ("mods_extension_originalAuthorList_mt", 2),
    ("dc.contributor", 1),
    ("dc.type", 1),
    ("catch_all_MODS_mt", 1),
];

/// Build the unencoded clause for one field.
#[must_use]
pub fn field_clause(field: &str, term: &str, weight: u8) -> String {
    format!("{field}:({term})^{weight}")
}

/// Percent-encode one path segment of the query.
///
/// Only RFC 3986 unreserved characters survive unencoded.
#[must_use]
pub fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Build the weighted multi-field query for a search term.
///
/// Each clause is encoded on its own and the results are joined with
/// [`CLAUSE_SEPARATOR`]. The term is not escaped: Solr syntax inside it
/// (colons, parentheses, quotes) reaches DORA as typed.
#[must_use]
pub fn build_search_query(term: &str) -> String {
    FIELD_WEIGHTS
        .iter()
        .map(|(field, weight)| encode_component(&field_clause(field, term, *weight)).into_owned())
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR)
}

/// Encode a caller-supplied Solr query, keeping `:` literal.
///
/// An empty query falls back to [`MATCH_ALL`].
#[must_use]
pub fn encode_raw_query(query: &str) -> String {
    let query = if query.trim().is_empty() { MATCH_ALL } else { query };
    encode_component(query).replace("%3A", ":")
}

/// Filter restricting results to publications issued between two dates (inclusive).
#[must_use]
pub fn date_filter(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{DATE_ISSUED_FIELD}:[{}T00:00:00Z TO {}T23:59:59Z]",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// Filter restricting results to publications issued in one calendar year.
///
/// Returns `None` for years chrono cannot represent.
#[must_use]
pub fn year_filter(year: i32) -> Option<String> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(date_filter(start, end))
}

/// Query parameters carrying filters (`f[0]`, `f[1]`, ...).
#[must_use]
pub fn filter_params(filters: &[String]) -> Vec<(String, String)> {
    filters
        .iter()
        .enumerate()
        .map(|(i, filter)| (format!("f[{i}]"), filter.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_query() {
        let query = build_search_query("graphene");
        assert_eq!(
            query,
            "mods_titleInfo_title_mt%3A%28graphene%29%5E5%20OR%20\
             mods_abstract_ms%3A%28graphene%29%5E2%20OR%20\
             dc.creator%3A%28graphene%29%5E2%20OR%20\
             mods_extension_originalAuthorList_mt%3A%28graphene%29%5E2%20OR%20\
             dc.contributor%3A%28graphene%29%5E1%20OR%20\
             dc.type%3A%28graphene%29%5E1%20OR%20\
             catch_all_MODS_mt%3A%28graphene%29%5E1"
        );
    }

    #[test]
    fn test_spaces_are_encoded_inside_clauses() {
        let query = build_search_query("manfred heuberger");
        assert!(query.starts_with("mods_titleInfo_title_mt%3A%28manfred%20heuberger%29%5E5"));
        assert!(query.contains("dc.creator%3A%28manfred%20heuberger%29%5E2"));
        assert_eq!(query.matches(CLAUSE_SEPARATOR).count(), 6);
    }

    #[test]
    fn test_reserved_syntax_passes_through() {
        let query = build_search_query("title:(x)");
        let decoded = urlencoding::decode(&query).unwrap();
        assert!(decoded.contains("dc.type:(title:(x))^1"));
    }

    #[test]
    fn test_raw_query_keeps_colons() {
        assert_eq!(encode_raw_query("*:*"), "%2A:%2A");
        assert_eq!(encode_raw_query("   "), "%2A:%2A");
        assert_eq!(encode_raw_query("dc.type:article"), "dc.type:article");
    }

    #[test]
    fn test_year_filter_format() {
        assert_eq!(
            year_filter(2018).unwrap(),
            "mods_originInfo_encoding_w3cdtf_keyDate_yes_dateIssued_dt:\
             [2018-01-01T00:00:00Z TO 2018-12-31T23:59:59Z]"
        );
    }

    #[test]
    fn test_date_filter_format() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 6, 30).unwrap();
        assert!(date_filter(start, end).ends_with("[2020-01-01T00:00:00Z TO 2020-06-30T23:59:59Z]"));
    }

    #[test]
    fn test_filter_params_are_indexed() {
        let params = filter_params(&["a".to_string(), "b".to_string()]);
        assert_eq!(params[0], ("f[0]".to_string(), "a".to_string()));
        assert_eq!(params[1], ("f[1]".to_string(), "b".to_string()));
    }
}
