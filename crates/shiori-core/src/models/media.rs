use serde::{Deserialize, Serialize};

/// Discriminator between the anime and manga catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "anime" => Some(Self::Anime),
            "manga" => Some(Self::Manga),
            _ => None,
        }
    }

    pub const ALL: &[MediaType] = &[Self::Anime, Self::Manga];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read-only catalog item as reported by the remote source.
///
/// Identity is `(mal_id, media_type)`; anime and manga ids live in
/// separate namespaces on MyAnimeList.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub mal_id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub score: Option<f32>,
    pub url: Option<String>,
}
