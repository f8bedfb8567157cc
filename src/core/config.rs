use std::path::PathBuf;

pub const APP_NAME: &str = "wanianki";
pub const DEFAULT_API_BASE_URL: &str = "https://api.wanikani.com/v2";
pub const CACHE_FILE_NAME: &str = "last_cached.json";
pub const AUDIO_DIR_NAME: &str = "audio_files";
pub const DEFAULT_OUTPUT_NAME: &str = "wanikani_vocab.apkg";

/// Everything one run of the exporter needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub include_in_progress_level: bool,
    pub data_directory: PathBuf,
    pub output_path: PathBuf,
    pub skip_audio: bool,
    pub api_base_url: String,
}

impl Config {
    pub fn new(
        api_token: String,
        include_in_progress_level: bool,
        data_directory: Option<PathBuf>,
        output_path: Option<PathBuf>,
        skip_audio: bool,
    ) -> Self {
        let data_directory = data_directory.unwrap_or_else(default_data_directory);
        let output_path = output_path.unwrap_or_else(|| data_directory.join(DEFAULT_OUTPUT_NAME));

        Self {
            api_token,
            include_in_progress_level,
            data_directory,
            output_path,
            skip_audio,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_directory.join(CACHE_FILE_NAME)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_directory.join(AUDIO_DIR_NAME)
    }
}

pub fn default_data_directory() -> PathBuf {
    match dirs::data_local_dir() {
        Some(data_dir) => data_dir.join(APP_NAME),
        None => PathBuf::from("."),
    }
}
