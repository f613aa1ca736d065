pub const DEFAULT_MODEL_NAME: &str = "Qwen/Qwen2.5-32B-Instruct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    ModelScope,
    FishAudio,
    FishAudioUrl,
    Chunkr,
    Firecrawl,
    ModelName,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 6] = [
        CredentialKey::ModelScope,
        CredentialKey::FishAudio,
        CredentialKey::FishAudioUrl,
        CredentialKey::Chunkr,
        CredentialKey::Firecrawl,
        CredentialKey::ModelName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialKey::ModelScope => "modelscope",
            CredentialKey::FishAudio => "fish_audio",
            CredentialKey::FishAudioUrl => "fish_audio_url",
            CredentialKey::Chunkr => "chunkr",
            CredentialKey::Firecrawl => "firecrawl",
            CredentialKey::ModelName => "model_name",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|key| key.name() == wanted)
    }
}

/// API keys supplied by the user and forwarded to the backend with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub modelscope: String,
    pub fish_audio: String,
    pub fish_audio_url: String,
    pub chunkr: String,
    pub firecrawl: String,
    pub model_name: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            modelscope: String::new(),
            fish_audio: String::new(),
            fish_audio_url: String::new(),
            chunkr: String::new(),
            firecrawl: String::new(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl Credentials {
    pub fn get(&self, key: CredentialKey) -> &str {
        match key {
            CredentialKey::ModelScope => &self.modelscope,
            CredentialKey::FishAudio => &self.fish_audio,
            CredentialKey::FishAudioUrl => &self.fish_audio_url,
            CredentialKey::Chunkr => &self.chunkr,
            CredentialKey::Firecrawl => &self.firecrawl,
            CredentialKey::ModelName => &self.model_name,
        }
    }

    /// Sets a credential. An empty model name falls back to the default model.
    pub fn set(&mut self, key: CredentialKey, value: impl Into<String>) {
        let value = value.into().trim().to_string();
        let slot = match key {
            CredentialKey::ModelScope => &mut self.modelscope,
            CredentialKey::FishAudio => &mut self.fish_audio,
            CredentialKey::FishAudioUrl => &mut self.fish_audio_url,
            CredentialKey::Chunkr => &mut self.chunkr,
            CredentialKey::Firecrawl => &mut self.firecrawl,
            CredentialKey::ModelName => &mut self.model_name,
        };
        *slot = if value.is_empty() && key == CredentialKey::ModelName {
            DEFAULT_MODEL_NAME.to_string()
        } else {
            value
        };
    }

    /// Non-empty entries, in declaration order.
    pub fn present(&self) -> Vec<(CredentialKey, &str)> {
        CredentialKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}
