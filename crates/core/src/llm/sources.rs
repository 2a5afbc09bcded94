use crate::domain::prediction::GroundingSource;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Citations from a search-grounded call. Chunks without a URI are dropped;
/// a missing title falls back to the URI.
pub fn extract_sources(chunks: &[GroundingChunk]) -> Vec<GroundingSource> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(uri);
            Some(GroundingSource {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}
