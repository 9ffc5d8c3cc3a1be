use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaSummary, MediaType};

/// User's tracking status for a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingStatus {
    Ongoing,
    Backlog,
    Finished,
    Unset,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "Ongoing",
            Self::Backlog => "Backlog",
            Self::Finished => "Finished",
            Self::Unset => "Unset",
        }
    }

    /// Database string representation (lowercase).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Backlog => "backlog",
            Self::Finished => "finished",
            Self::Unset => "unset",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(Self::Ongoing),
            "backlog" => Some(Self::Backlog),
            "finished" => Some(Self::Finished),
            "unset" => Some(Self::Unset),
            _ => None,
        }
    }

    pub const ALL: &[TrackingStatus] = &[
        Self::Ongoing,
        Self::Backlog,
        Self::Finished,
        Self::Unset,
    ];
}

impl std::fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked catalog item, keyed by `(mal_id, media_type)`.
///
/// Media fields are denormalized from the catalog at save time so list
/// screens never need a network round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub mal_id: i64,
    pub media_type: MediaType,
    pub status: TrackingStatus,
    pub starred: bool,
    pub title: String,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub score: Option<f32>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LibraryEntry {
    /// Project the denormalized media fields back into a catalog summary.
    pub fn to_summary(&self) -> MediaSummary {
        MediaSummary {
            mal_id: self.mal_id,
            media_type: self.media_type,
            title: self.title.clone(),
            synopsis: self.synopsis.clone(),
            cover_url: self.cover_url.clone(),
            score: self.score,
            url: self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_roundtrip() {
        for status in TrackingStatus::ALL {
            assert_eq!(
                TrackingStatus::from_db_str(status.as_db_str()),
                Some(*status)
            );
        }
        assert_eq!(TrackingStatus::from_db_str("watching"), None);
    }

    #[test]
    fn test_media_type_db_roundtrip() {
        for media in MediaType::ALL {
            assert_eq!(MediaType::from_db_str(media.as_str()), Some(*media));
        }
        assert_eq!(MediaType::from_db_str(""), None);
    }

    #[test]
    fn test_to_summary_keeps_identity() {
        let entry = LibraryEntry {
            mal_id: 21,
            media_type: MediaType::Anime,
            status: TrackingStatus::Ongoing,
            starred: true,
            title: "One Piece".into(),
            synopsis: Some("Pirates.".into()),
            cover_url: None,
            score: Some(8.7),
            url: Some("https://myanimelist.net/anime/21".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let summary = entry.to_summary();
        assert_eq!(summary.mal_id, 21);
        assert_eq!(summary.media_type, MediaType::Anime);
        assert_eq!(summary.title, "One Piece");
        assert_eq!(summary.score, Some(8.7));
    }
}
