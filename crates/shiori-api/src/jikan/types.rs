use serde::Deserialize;

use shiori_core::models::{MediaSummary, MediaType};

/// Envelope for list endpoints (`/top/{anime,manga}`).
#[derive(Debug, Deserialize)]
pub struct JikanListResponse {
    pub data: Vec<JikanMedia>,
}

/// Envelope for single-item endpoints (`/{anime,manga}/{id}`).
#[derive(Debug, Deserialize)]
pub struct JikanDetailResponse {
    pub data: JikanMedia,
}

/// A catalog item as Jikan reports it. Shared between the anime and
/// manga catalogs; fields absent in one stay `None`.
#[derive(Debug, Deserialize)]
pub struct JikanMedia {
    pub mal_id: i64,
    pub url: Option<String>,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub score: Option<f32>,
    #[serde(default)]
    pub images: Option<JikanImages>,
}

#[derive(Debug, Deserialize)]
pub struct JikanImages {
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Deserialize)]
pub struct JikanImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

impl JikanMedia {
    /// Convert into the domain summary, tagging with the catalog queried.
    pub fn into_summary(self, media: MediaType) -> MediaSummary {
        let cover_url = self.images.and_then(|i| i.jpg).and_then(|j| {
            j.large_image_url.or(j.image_url)
        });

        MediaSummary {
            mal_id: self.mal_id,
            media_type: media,
            title: self.title.unwrap_or_else(|| "Unknown".into()),
            synopsis: self.synopsis,
            cover_url,
            score: self.score,
            url: self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_top_response() {
        let json = r#"{
            "data": [
                {
                    "mal_id": 52991,
                    "url": "https://myanimelist.net/anime/52991/Sousou_no_Frieren",
                    "images": {
                        "jpg": {
                            "image_url": "https://cdn.myanimelist.net/images/anime/1015/138006.jpg",
                            "large_image_url": "https://cdn.myanimelist.net/images/anime/1015/138006l.jpg"
                        }
                    },
                    "title": "Sousou no Frieren",
                    "score": 9.32,
                    "synopsis": "After the party defeats the Demon King..."
                }
            ]
        }"#;

        let resp: JikanListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 1);

        let summary = resp
            .data
            .into_iter()
            .next()
            .unwrap()
            .into_summary(MediaType::Anime);
        assert_eq!(summary.mal_id, 52991);
        assert_eq!(summary.media_type, MediaType::Anime);
        assert_eq!(summary.title, "Sousou no Frieren");
        assert_eq!(summary.score, Some(9.32));
        assert_eq!(
            summary.cover_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/1015/138006l.jpg")
        );
    }

    #[test]
    fn test_deserialize_detail_response() {
        let json = r#"{
            "data": {
                "mal_id": 2,
                "url": "https://myanimelist.net/manga/2/Berserk",
                "title": "Berserk",
                "score": 9.47,
                "synopsis": null
            }
        }"#;

        let resp: JikanDetailResponse = serde_json::from_str(json).unwrap();
        let summary = resp.data.into_summary(MediaType::Manga);
        assert_eq!(summary.mal_id, 2);
        assert_eq!(summary.media_type, MediaType::Manga);
        assert!(summary.synopsis.is_none());
        assert!(summary.cover_url.is_none());
    }

    #[test]
    fn test_missing_title_falls_back() {
        let json = r#"{ "mal_id": 7 }"#;
        let media: JikanMedia = serde_json::from_str(json).unwrap();
        let summary = media.into_summary(MediaType::Anime);
        assert_eq!(summary.title, "Unknown");
    }
}
