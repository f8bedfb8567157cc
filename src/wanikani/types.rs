use serde::{
    Deserialize,
    Serialize,
};

/// Single-resource envelope, e.g. `/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource<T> {
    pub object: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data_updated_at: Option<String>,
    pub data: T,
}

/// Paginated collection envelope, e.g. `/subjects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    pub object: String,
    #[serde(default)]
    pub pages: Pages,
    #[serde(default)]
    pub total_count: u64,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub previous_url: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    pub level: u32,
    pub subscription: Subscription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub active: bool,
    pub max_level_granted: u32,
}

/// A vocabulary subject as returned by `/subjects`, kept verbatim in the
/// local cache between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    pub object: String,
    pub data: SubjectData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectData {
    pub level: u32,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub hidden_at: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub auxiliary_meanings: Vec<AuxiliaryMeaning>,
    #[serde(default)]
    pub readings: Vec<Reading>,
    #[serde(default)]
    pub parts_of_speech: Vec<String>,
    #[serde(default)]
    pub meaning_mnemonic: String,
    #[serde(default)]
    pub pronunciation_audios: Vec<PronunciationAudio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meaning {
    pub meaning: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub accepted_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryMeaning {
    pub meaning: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub reading: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub accepted_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationAudio {
    pub url: String,
    pub content_type: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Subject {
    pub fn is_hidden(&self) -> bool {
        self.data.hidden_at.is_some()
    }
}
