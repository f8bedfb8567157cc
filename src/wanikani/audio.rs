use std::{
    collections::BTreeSet,
    fs,
    path::Path,
};

use reqwest::blocking::Client;
use tracing::{
    info,
    warn,
};

use super::types::{
    PronunciationAudio,
    Subject,
};
use crate::core::{
    http::download_to_file,
    WaniAnkiError,
};

const MPEG: &str = "audio/mpeg";

pub fn audio_file_name(subject_id: u64) -> String {
    format!("wbvocab-{subject_id}.mp3")
}

/// First MP3 pronunciation for the subject, if WaniKani has one.
pub fn select_audio(subject: &Subject) -> Option<&PronunciationAudio> {
    subject.data.pronunciation_audios.iter().find(|audio| audio.content_type == MPEG)
}

/// Makes sure every subject's MP3 is present in `audio_dir`, downloading the
/// ones that are missing unless `skip_download` is set. Returns the ids of the
/// subjects whose audio is available on disk afterwards.
pub fn ensure_audio<'a>(
    client: &Client,
    subjects: impl IntoIterator<Item = &'a Subject>,
    audio_dir: &Path,
    skip_download: bool,
) -> Result<BTreeSet<u64>, WaniAnkiError> {
    fs::create_dir_all(audio_dir)?;

    let mut available = BTreeSet::new();
    let mut missing: Vec<(u64, &str)> = Vec::new();

    for subject in subjects {
        if audio_dir.join(audio_file_name(subject.id)).exists() {
            available.insert(subject.id);
            continue;
        }

        match select_audio(subject) {
            Some(audio) => missing.push((subject.id, audio.url.as_str())),
            None => warn!("Subject {} has no MP3 pronunciation; leaving it out", subject.id),
        }
    }

    if missing.is_empty() {
        return Ok(available);
    }

    if skip_download {
        info!("Skipping download of {} missing audio files", missing.len());
        return Ok(available);
    }

    info!("Fetching audio for {} subjects; this may take a while", missing.len());
    for (subject_id, url) in missing {
        info!("Fetching audio for {subject_id}");
        download_to_file(client, url, &audio_dir.join(audio_file_name(subject_id)))?;
        available.insert(subject_id);
    }

    Ok(available)
}
