use std::{
    collections::BTreeSet,
    sync::OnceLock,
};

use regex::Regex;
use sha1::Sha1;
use sha2::{
    Digest,
    Sha256,
};

use crate::wanikani::{
    audio::audio_file_name,
    Subject,
};

pub const FIELD_SEPARATOR: char = '\x1f';

const GUID_NAMESPACE: &str = "wanikani-vocabulary";
const BASE91_TABLE: &[u8; 91] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// One Audio -> Meaning note. Field order matches [`super::model::FIELD_NAMES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub subject_id: u64,
    pub level: u32,
    pub guid: String,
    pub audio_file: String,
    pub fields: Vec<String>,
}

impl Card {
    pub fn from_subject(subject: &Subject) -> Self {
        let data = &subject.data;
        let audio_file = audio_file_name(subject.id);

        let mut readings: Vec<&str> = data.readings.iter().map(|r| r.reading.as_str()).collect();
        // Kana-only vocabulary carries no readings; the characters are the reading.
        if readings.is_empty() {
            readings.extend(data.characters.as_deref());
        }

        let meanings = data
            .meanings
            .iter()
            .map(|m| m.meaning.as_str())
            .chain(
                data.auxiliary_meanings
                    .iter()
                    .filter(|m| m.kind == "whitelist")
                    .map(|m| m.meaning.as_str()),
            );

        let fields = vec![
            format!("[sound:{audio_file}]"),
            span_lines(readings),
            data.parts_of_speech.join(", "),
            span_lines(meanings),
            // Mnemonics use WaniKani's own tags (<kanji>, <vocabulary>) which the model CSS styles.
            data.meaning_mnemonic.clone(),
        ];

        Self {
            subject_id: subject.id,
            level: data.level,
            guid: guid_for(&[GUID_NAMESPACE, &subject.id.to_string()]),
            audio_file,
            fields,
        }
    }

    pub fn joined_fields(&self) -> String {
        self.fields.join(&FIELD_SEPARATOR.to_string())
    }

    pub fn sort_field(&self) -> String {
        strip_html(self.fields.first().map(String::as_str).unwrap_or_default())
    }

    /// Anki's duplicate-detection checksum: the first 32 bits of the SHA-1 of
    /// the stripped first field.
    pub fn checksum(&self) -> i64 {
        let digest = Sha1::digest(self.sort_field().as_bytes());
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as i64
    }
}

/// Cards for every visible subject at or below `max_level` that has audio,
/// ordered by subject id.
pub fn build_cards<'a>(
    subjects: impl IntoIterator<Item = &'a Subject>,
    max_level: u32,
    with_audio: &BTreeSet<u64>,
) -> Vec<Card> {
    let mut cards: Vec<Card> = subjects
        .into_iter()
        .filter(|s| s.data.level <= max_level && !s.is_hidden() && with_audio.contains(&s.id))
        .map(Card::from_subject)
        .collect();
    cards.sort_by_key(|card| card.subject_id);
    cards.dedup_by_key(|card| card.subject_id);
    cards
}

/// Stable note GUID in the same shape Anki generates: base91 of the first
/// 64 bits of a SHA-256 over the `__`-joined values.
pub fn guid_for(values: &[&str]) -> String {
    let digest = Sha256::digest(values.join("__").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    base91(u64::from_be_bytes(bytes))
}

fn base91(mut num: u64) -> String {
    if num == 0 {
        return (BASE91_TABLE[0] as char).to_string();
    }

    let mut buf = Vec::new();
    while num > 0 {
        buf.push(BASE91_TABLE[(num % 91) as usize]);
        num /= 91;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn strip_html(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let re = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    re.replace_all(text, "").trim().to_string()
}

fn span_lines<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(|v| format!("<span>{}</span>", escape_html(v)))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
