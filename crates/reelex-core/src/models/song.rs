//! Music/song metadata extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::validation::FieldIssue;
use super::{Category, RecordSchema};

/// Song metadata extracted from a music video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SongMetadata {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    pub song_title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub lyrics_snippet: Option<String>,
    pub spotify_link: Option<String>,
    pub youtube_link: Option<String>,
    /// e.g. "Energetic", "Relaxing", "Melancholic".
    pub mood: Option<String>,
}

impl RecordSchema for SongMetadata {
    const SCHEMA_NAME: &'static str = "SongMetadata";
    const CATEGORY: Category = Category::Music;
    const FIELDS: &'static [&'static str] = &[
        "song_title",
        "artist",
        "genre",
        "lyrics_snippet",
        "spotify_link",
        "youtube_link",
        "mood",
    ];
    const REQUIRED: &'static [&'static str] = &[];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"music\""));
        }
    }
}
