//! Data models for tool inputs and publication lookups.
//!
//! Search responses are not modelled: DORA's JSON is passed through verbatim.

mod inputs;
mod publication;

pub use inputs::{
    FulltextInput, PublicationInput, SearchByDateRangeInput, SearchByYearInput,
    SearchPublicationsInput,
};
pub use publication::{
    AbstractResult, FulltextResult, Lookup, PublicationId, PublicationNotFound,
};
