use std::{
    fs,
    path::PathBuf,
};

use tracing::info;

use super::{
    Config,
    WaniAnkiError,
};
use crate::{
    anki::{
        audio_model,
        build_cards,
        wanikani_deck,
        Package,
    },
    persistence,
    wanikani::{
        audio::ensure_audio,
        export_level,
        WaniKaniClient,
    },
};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub max_level: u32,
    pub cards: usize,
}

/// Fetch -> cache -> audio -> cards -> `.apkg`.
pub fn run(config: &Config) -> Result<ExportSummary, WaniAnkiError> {
    fs::create_dir_all(&config.data_directory)?;

    let mut client = WaniKaniClient::new(&config.api_token, &config.api_base_url)?;
    let user = client.fetch_user()?;
    let max_level = export_level(&user, config.include_in_progress_level)?;
    info!(
        "User is on level {}; exporting vocabulary up to level {}",
        user.level, max_level
    );

    let fresh = client.fetch_vocabulary(max_level)?;

    let cache_path = config.cache_path();
    let mut cache = persistence::load_cache(&cache_path);
    persistence::merge(&mut cache, fresh);
    persistence::save_cache(&cache_path, &cache)?;

    let eligible = cache.values().filter(|s| s.data.level <= max_level && !s.is_hidden());
    let audio_dir = config.audio_dir();
    let with_audio = ensure_audio(client.http(), eligible, &audio_dir, config.skip_audio)?;

    let cards = build_cards(cache.values(), max_level, &with_audio);
    let mut package = Package::new(wanikani_deck(), audio_model());
    for card in cards {
        package.add_media(card.audio_file.clone(), audio_dir.join(&card.audio_file));
        package.add_card(card);
    }
    let card_count = package.cards().len();
    package.write_to_file(&config.output_path)?;

    info!("Done");
    Ok(ExportSummary { output_path: config.output_path.clone(), max_level, cards: card_count })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;
    use wiremock::{
        matchers::{
            method,
            path,
        },
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;

    fn subject_json(server: &MockServer, id: u64, level: u32) -> serde_json::Value {
        json!({
            "id": id,
            "object": "vocabulary",
            "data": {
                "level": level,
                "characters": "一",
                "meanings": [{ "meaning": format!("Meaning {id}"), "primary": true }],
                "readings": [{ "reading": "いち", "primary": true }],
                "parts_of_speech": ["noun"],
                "meaning_mnemonic": "mnemonic",
                "pronunciation_audios": [{
                    "url": format!("{}/audio/{id}.mp3", server.uri()),
                    "content_type": "audio/mpeg",
                    "metadata": {}
                }]
            }
        })
    }

    fn subjects_page(subjects: Vec<serde_json::Value>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "object": "collection",
            "pages": { "next_url": null },
            "total_count": subjects.len(),
            "data": subjects
        }))
    }

    async fn mount_user_and_audio(server: &MockServer, level: u32) {
        Mock::given(method("GET"))
            .and(path("/v2/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "user",
                "data": {
                    "level": level,
                    "subscription": { "active": true, "max_level_granted": 60 }
                }
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(wiremock::matchers::path_regex(r"^/audio/\d+\.mp3$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .mount(server)
            .await;
    }

    async fn mount_account(server: &MockServer, level: u32, subjects: Vec<serde_json::Value>) {
        mount_user_and_audio(server, level).await;

        Mock::given(method("GET"))
            .and(path("/v2/subjects"))
            .respond_with(subjects_page(subjects))
            .mount(server)
            .await;
    }

    fn note_guids(apkg: &std::path::Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(fs::File::open(apkg).unwrap()).unwrap();
        let mut entry = archive.by_name("collection.anki2").unwrap();
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();

        let db_path = apkg.with_extension("anki2");
        fs::write(&db_path, bytes).unwrap();
        let conn = Connection::open(&db_path).unwrap();
        let mut stmt = conn.prepare("SELECT guid FROM notes ORDER BY id").unwrap();
        let guids = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        guids
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_end_to_end_export_is_repeatable() {
        let server = MockServer::start().await;
        // Level 3 is in progress, so only levels 1 and 2 are exported.
        let subjects =
            vec![subject_json(&server, 1, 1), subject_json(&server, 2, 2), subject_json(&server, 3, 3)];
        mount_account(&server, 3, subjects).await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("token".to_string(), false, Some(dir.path().to_path_buf()), None, false)
            .with_api_base_url(format!("{}/v2", server.uri()));

        let first_config = config.clone();
        let first = tokio::task::spawn_blocking(move || run(&first_config)).await.unwrap().unwrap();
        assert_eq!(first.max_level, 2);
        assert_eq!(first.cards, 2);
        assert!(config.cache_path().exists());
        assert!(!config.audio_dir().join("wbvocab-3.mp3").exists());
        let first_guids = note_guids(&first.output_path);

        let second_config = config.clone();
        let second = tokio::task::spawn_blocking(move || run(&second_config)).await.unwrap().unwrap();
        assert_eq!(note_guids(&second.output_path), first_guids);
        assert_eq!(first_guids.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_completed_levels_aborts_before_writing() {
        let server = MockServer::start().await;
        mount_account(&server, 1, vec![]).await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("token".to_string(), false, Some(dir.path().to_path_buf()), None, false)
            .with_api_base_url(format!("{}/v2", server.uri()));

        let output = config.output_path.clone();
        let result = tokio::task::spawn_blocking(move || run(&config)).await.unwrap();
        assert!(matches!(result, Err(WaniAnkiError::NoCompletedLevels)));
        assert!(!output.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subject_hidden_after_caching_is_dropped_from_deck() {
        let server = MockServer::start().await;
        mount_user_and_audio(&server, 3).await;

        // First run sees both subjects; later runs see subject 2 retired.
        Mock::given(method("GET"))
            .and(path("/v2/subjects"))
            .respond_with(subjects_page(vec![subject_json(&server, 1, 1), subject_json(&server, 2, 2)]))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let mut retired = subject_json(&server, 2, 2);
        retired["data"]["hidden_at"] = json!("2024-01-01T00:00:00.000000Z");
        Mock::given(method("GET"))
            .and(path("/v2/subjects"))
            .respond_with(subjects_page(vec![subject_json(&server, 1, 1), retired]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("token".to_string(), false, Some(dir.path().to_path_buf()), None, false)
            .with_api_base_url(format!("{}/v2", server.uri()));

        let first_config = config.clone();
        let first = tokio::task::spawn_blocking(move || run(&first_config)).await.unwrap().unwrap();
        assert_eq!(first.cards, 2);

        let second_config = config.clone();
        let second = tokio::task::spawn_blocking(move || run(&second_config)).await.unwrap().unwrap();
        assert_eq!(second.cards, 1);
        assert_eq!(note_guids(&second.output_path).len(), 1);

        let cache = persistence::load_cache(&config.cache_path());
        assert!(cache[&2].is_hidden());
    }
}
