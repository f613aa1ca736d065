use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use tutor_core::{CredentialKey, Credentials};
use tutor_engine::{AtomicFileWriter, PersistError};

const CREDENTIALS_FILENAME: &str = "credentials.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct PersistedCredentials {
    modelscope: String,
    fish_audio: String,
    fish_audio_url: String,
    chunkr: String,
    firecrawl: String,
    model_name: String,
}

impl From<&Credentials> for PersistedCredentials {
    fn from(credentials: &Credentials) -> Self {
        Self {
            modelscope: credentials.modelscope.clone(),
            fish_audio: credentials.fish_audio.clone(),
            fish_audio_url: credentials.fish_audio_url.clone(),
            chunkr: credentials.chunkr.clone(),
            firecrawl: credentials.firecrawl.clone(),
            model_name: credentials.model_name.clone(),
        }
    }
}

impl From<PersistedCredentials> for Credentials {
    fn from(persisted: PersistedCredentials) -> Self {
        let mut credentials = Credentials::default();
        credentials.set(CredentialKey::ModelScope, persisted.modelscope);
        credentials.set(CredentialKey::FishAudio, persisted.fish_audio);
        credentials.set(CredentialKey::FishAudioUrl, persisted.fish_audio_url);
        credentials.set(CredentialKey::Chunkr, persisted.chunkr);
        credentials.set(CredentialKey::Firecrawl, persisted.firecrawl);
        credentials.set(CredentialKey::ModelName, persisted.model_name);
        credentials
    }
}

/// Reads saved credentials; a missing or unreadable file yields defaults.
pub(crate) fn load_credentials(data_dir: &Path) -> Credentials {
    let path = data_dir.join(CREDENTIALS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Credentials::default();
        }
        Err(err) => {
            engine_warn!("Failed to read credentials from {:?}: {}", path, err);
            return Credentials::default();
        }
    };

    match ron::from_str::<PersistedCredentials>(&content) {
        Ok(persisted) => {
            engine_info!("Loaded credentials from {:?}", path);
            persisted.into()
        }
        Err(err) => {
            engine_warn!("Failed to parse credentials from {:?}: {}", path, err);
            Credentials::default()
        }
    }
}

pub(crate) fn save_credentials(
    data_dir: &Path,
    credentials: &Credentials,
) -> Result<PathBuf, PersistError> {
    let persisted = PersistedCredentials::from(credentials);
    let content = ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::default())
        .map_err(|err| PersistError::Encode(format!("credentials: {err}")))?;

    let writer = AtomicFileWriter::new(data_dir);
    match writer.write(CREDENTIALS_FILENAME, &content) {
        Ok(path) => {
            engine_info!("Saved credentials to {:?}", path);
            Ok(path)
        }
        Err(err) => {
            engine_error!("Failed to save credentials in {:?}: {}", data_dir, err);
            Err(err)
        }
    }
}
