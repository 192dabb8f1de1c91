use serde::{Deserialize, Serialize};

/// One title of the catalog the similarity artifacts were built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRow {
    /// Display title, matched case-insensitively
    pub title: String,
    /// Category label (e.g. "Movie", "TV Show")
    #[serde(rename = "type")]
    pub title_type: String,
    pub release_year: i32,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rating: String,
    /// Comma-separated genres
    #[serde(default)]
    pub listed_in: String,
    /// Minutes for movies, seasons for shows
    #[serde(default)]
    pub duration_int: i64,
    /// Text the vectorizer was fitted on
    #[serde(default)]
    pub content: String,
}

impl CatalogRow {
    /// Text used for content similarity; rows exported without a content
    /// column fall back to country and genres
    pub fn content_text(&self) -> String {
        if self.content.trim().is_empty() {
            format!("{} {}", self.country, self.listed_in)
        } else {
            self.content.clone()
        }
    }
}

/// Projection of a catalog row returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    #[serde(rename = "type")]
    pub title_type: String,
    pub release_year: i32,
}

impl From<&CatalogRow> for Recommendation {
    fn from(row: &CatalogRow) -> Self {
        Self {
            title: row.title.clone(),
            title_type: row.title_type.clone(),
            release_year: row.release_year,
        }
    }
}
