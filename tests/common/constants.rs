//! Requests used across the end-to-end tests.

pub const RECENTLY_PLAYED_QUERY: &str = "Can you store the recently played songs in a table";
pub const CURATED_QUERY: &str =
    "Can you store the 'Made for you' and 'Popular albums' in a table";

pub const RECENTLY_PLAYED_ARTIFACT: &str = "api/recently-played/query.sql";
pub const MADE_FOR_YOU_ARTIFACT: &str = "api/made-for-you/query.sql";
pub const POPULAR_ALBUMS_ARTIFACT: &str = "api/popular-albums/query.sql";
