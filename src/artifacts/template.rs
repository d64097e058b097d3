use crate::entity_store::{listing_query, EntityKind};
use serde::Serialize;
use std::path::PathBuf;

/// Rows returned by a generated endpoint.
pub const ENDPOINT_ROW_LIMIT: usize = 20;

const TEMPLATE: &str = "\
-- GET /api/{{ROUTE}}
-- Entity kind: {{KIND}}
-- Response: JSON array of
--   {\"id\": string, \"title\": string, \"artist\": string,
--    \"album\": string, \"image\": string, \"duration\": integer}
{{QUERY}};
";

/// A generated read-endpoint definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: EntityKind,
    pub route: &'static str,
    /// Location relative to the artifacts root.
    pub path: PathBuf,
    #[serde(skip)]
    pub content: String,
}

/// Endpoint route for kinds that are served directly.
///
/// Tracks are only stored as a dependency of play history and have none.
pub fn route_for(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Track => None,
        EntityKind::PlayHistory => Some("recently-played"),
        EntityKind::CuratedPlaylist => Some("made-for-you"),
        EntityKind::CuratedAlbum => Some("popular-albums"),
    }
}

/// Render the artifact for a kind. Same kind, same bytes.
pub fn generate(kind: EntityKind) -> Option<Artifact> {
    let route = route_for(kind)?;
    let query = listing_query(kind).to_sql(Some(ENDPOINT_ROW_LIMIT));

    let content = TEMPLATE
        .replace("{{ROUTE}}", route)
        .replace("{{KIND}}", kind.as_str())
        .replace("{{QUERY}}", &query);

    Some(Artifact {
        kind,
        route,
        path: PathBuf::from("api").join(route).join("query.sql"),
        content,
    })
}
