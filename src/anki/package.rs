use std::{
    collections::BTreeMap,
    fs,
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use chrono::{
    DateTime,
    Utc,
};
use rusqlite::{
    params,
    Connection,
};
use tempfile::NamedTempFile;
use tracing::{
    debug,
    info,
};
use zip::{
    write::SimpleFileOptions,
    CompressionMethod,
    ZipWriter,
};

use super::{
    card::Card,
    model::{
        Deck,
        Model,
    },
    schema,
};
use crate::core::WaniAnkiError;

const COLLECTION_NAME: &str = "collection.anki2";
const MEDIA_MANIFEST: &str = "media";

/// Note ids must be unique inside the collection; deriving them from the
/// subject id keeps regenerated decks identical.
const NOTE_ID_BASE: i64 = 1_000_000_000_000;
const CARD_ORD_STRIDE: i64 = 10_000_000_000;

/// A deck ready to be written as an `.apkg` archive.
pub struct Package {
    deck: Deck,
    model: Model,
    cards: Vec<Card>,
    media: BTreeMap<String, PathBuf>,
}

impl Package {
    pub fn new(deck: Deck, model: Model) -> Self {
        Self { deck, model, cards: Vec::new(), media: BTreeMap::new() }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Registers a media file under the name the cards reference it by.
    pub fn add_media(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.media.insert(name.into(), path.into());
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), WaniAnkiError> {
        self.write_to_file_at(path, Utc::now())
    }

    /// Writes the archive as of `now`. The archive is assembled in a temp file
    /// beside `path` and renamed into place once complete.
    pub fn write_to_file_at(&self, path: &Path, now: DateTime<Utc>) -> Result<(), WaniAnkiError> {
        info!(
            "Generating Anki deck with {} cards and {} media files",
            self.cards.len(),
            self.media.len()
        );

        let workdir = tempfile::tempdir()?;
        let collection_path = workdir.path().join(COLLECTION_NAME);
        self.write_collection(&collection_path, now)?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let tmp = NamedTempFile::new_in(parent)?;
        let mut zip = ZipWriter::new(BufWriter::new(tmp));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file(COLLECTION_NAME, deflated)?;
        zip.write_all(&fs::read(&collection_path)?)?;

        let mut manifest = serde_json::Map::new();
        for (index, (name, media_path)) in self.media.iter().enumerate() {
            let bytes = fs::read(media_path).map_err(|e| {
                WaniAnkiError::Custom(format!(
                    "Failed to read media file {}: {}",
                    media_path.display(),
                    e
                ))
            })?;
            zip.start_file(index.to_string(), stored)?;
            zip.write_all(&bytes)?;
            manifest.insert(index.to_string(), serde_json::Value::String(name.clone()));
        }

        zip.start_file(MEDIA_MANIFEST, deflated)?;
        zip.write_all(serde_json::to_string(&manifest)?.as_bytes())?;

        let writer = zip.finish()?;
        let tmp = writer.into_inner().map_err(|e| e.into_error())?;
        tmp.persist(path)?;

        info!("Wrote {}", path.display());
        Ok(())
    }

    fn write_collection(&self, path: &Path, now: DateTime<Utc>) -> Result<(), WaniAnkiError> {
        let secs = now.timestamp();
        let millis = now.timestamp_millis();

        let mut conn = Connection::open(path)?;
        conn.execute_batch(schema::SCHEMA)?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO col VALUES (NULL, ?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?6, ?7, ?8, '{}')",
            params![
                secs,
                millis,
                millis,
                schema::SCHEMA_VERSION,
                schema::collection_conf(&self.model, &self.deck).to_string(),
                schema::models_json(&self.model, &self.deck, secs).to_string(),
                schema::decks_json(&self.deck, secs).to_string(),
                schema::deck_conf_json().to_string(),
            ],
        )?;

        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
            )?;
            let mut insert_card = tx.prepare(
                "INSERT INTO cards VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, ?6, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            )?;

            for (position, card) in self.cards.iter().enumerate() {
                let nid = note_id(card);
                insert_note.execute(params![
                    nid,
                    card.guid,
                    self.model.id,
                    secs,
                    card.joined_fields(),
                    card.sort_field(),
                    card.checksum(),
                ])?;

                for ord in 0..self.model.templates.len() {
                    insert_card.execute(params![
                        card_id(nid, ord),
                        nid,
                        self.deck.id,
                        ord as i64,
                        secs,
                        position as i64 + 1,
                    ])?;
                }
            }
        }

        tx.commit()?;
        conn.close().map_err(|(_, e)| e)?;
        debug!("Collection written to {}", path.display());
        Ok(())
    }
}

fn note_id(card: &Card) -> i64 {
    NOTE_ID_BASE + card.subject_id as i64
}

fn card_id(note_id: i64, ord: usize) -> i64 {
    note_id + ord as i64 * CARD_ORD_STRIDE
}
