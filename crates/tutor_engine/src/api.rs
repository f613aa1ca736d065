use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use base64::Engine as _;
use bytes::Bytes;
use engine_logging::{engine_debug, engine_warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde_json::Value;

use crate::wire::{
    error_detail, reply_text, AskRequest, InteractRequest, MessagesReply, MultimodalRequest,
    SpeechRequest, WireMessage, WireStatusMap,
};
use crate::{ApiError, FailureKind, UploadReceipt};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload: UploadSettings,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Agent answers come from an LLM and can take a while.
            request_timeout: Duration::from_secs(120),
            upload: UploadSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_extensions: [
                "pdf", "doc", "docx", "png", "jpg", "jpeg", "gif", "webp", "mp3", "wav", "ogg",
                "m4a", "mp4", "webm",
            ]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect(),
        }
    }
}

impl UploadSettings {
    /// Rejects files by extension and size before any bytes leave the machine.
    pub fn check(&self, path: &Path, len: u64) -> Result<(), ApiError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        let allowed = extension.as_deref().is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        });
        if !allowed {
            return Err(ApiError::new(
                FailureKind::UnsupportedFile { extension },
                path.display().to_string(),
            ));
        }
        if len > self.max_bytes {
            return Err(ApiError::new(
                FailureKind::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: len,
                },
                path.display().to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Url(String),
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl SpeechAudio {
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("audio/mpeg" | "audio/mp3") => "mp3",
            Some("audio/wav" | "audio/x-wav" | "audio/wave") => "wav",
            Some("audio/ogg") => "ogg",
            _ => "bin",
        }
    }
}

#[async_trait::async_trait]
pub trait TutorApi: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<String, ApiError>;

    async fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError>;

    async fn ask_multimodal(&self, question: &str, image: &ImageInput)
        -> Result<String, ApiError>;

    async fn interact(&self, request: &InteractRequest) -> Result<String, ApiError>;

    async fn interrupt(&self, agent_name: &str) -> Result<String, ApiError>;

    async fn history(&self, student_id: &str) -> Result<Vec<WireMessage>, ApiError>;

    async fn messages(&self) -> Result<Vec<WireMessage>, ApiError>;

    async fn agent_status(&self) -> Result<WireStatusMap, ApiError>;

    async fn text_to_speech(&self, text: &str) -> Result<SpeechAudio, ApiError>;
}

/// HTTP client for the tutoring backend. Credential headers set through
/// [`ReqwestApi::set_headers`] are attached to every request.
#[derive(Debug)]
pub struct ReqwestApi {
    settings: ApiSettings,
    client: reqwest::Client,
    headers: RwLock<HeaderMap>,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            client,
            headers: RwLock::new(HeaderMap::new()),
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Replaces the extra headers. Invalid names or values are skipped.
    pub fn set_headers(&self, pairs: &[(String, String)]) {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            let header_name = HeaderName::from_bytes(name.as_bytes());
            let header_value = HeaderValue::from_str(value);
            match (header_name, header_value) {
                (Ok(header_name), Ok(mut header_value)) => {
                    header_value.set_sensitive(true);
                    map.insert(header_name, header_value);
                }
                _ => engine_warn!("Skipping invalid request header {}", name),
            }
        }
        match self.headers.write() {
            Ok(mut guard) => *guard = map,
            Err(poisoned) => *poisoned.into_inner() = map,
        }
    }

    fn headers(&self) -> HeaderMap {
        match self.headers.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .headers(self.headers())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body).unwrap_or_else(|| status.to_string());
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        Ok(response)
    }

    async fn post_json<T>(&self, path: &str, body: &T) -> Result<Value, ApiError>
    where
        T: Serialize + Sync,
    {
        let url = self.endpoint(path)?;
        engine_debug!("POST {}", url);
        let response = self.send(self.client.post(url).json(body)).await?;
        read_json(response).await
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        engine_debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        read_json(response).await
    }

    async fn encode_image(&self, image: &ImageInput) -> Result<String, ApiError> {
        match image {
            ImageInput::Url(url) => Ok(url.clone()),
            ImageInput::Path(path) => {
                let meta = tokio::fs::metadata(path).await.map_err(io_error)?;
                self.settings.upload.check(path, meta.len())?;
                let content = tokio::fs::read(path).await.map_err(io_error)?;
                Ok(base64::engine::general_purpose::STANDARD.encode(content))
            }
        }
    }
}

#[async_trait::async_trait]
impl TutorApi for ReqwestApi {
    async fn ask(&self, request: &AskRequest) -> Result<String, ApiError> {
        let value = self.post_json("/api/ask", request).await?;
        reply_text(&value, &["answer", "message", "response"])
            .ok_or_else(|| missing_field("answer"))
    }

    async fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::new(FailureKind::Io, "path has no file name"))?;
        let meta = tokio::fs::metadata(path).await.map_err(io_error)?;
        self.settings.upload.check(path, meta.len())?;

        let content = tokio::fs::read(path).await.map_err(io_error)?;
        let bytes = content.len() as u64;
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name.clone()));

        let url = self.endpoint("/api/upload_pdf")?;
        engine_debug!("POST {} file={} bytes={}", url, file_name, bytes);
        let response = self.send(self.client.post(url).multipart(form)).await?;
        let value = read_json(response).await?;
        let message = reply_text(&value, &["message", "status"])
            .unwrap_or_else(|| format!("Uploaded {file_name}"));
        Ok(UploadReceipt {
            file_name,
            bytes,
            message,
        })
    }

    async fn ask_multimodal(
        &self,
        question: &str,
        image: &ImageInput,
    ) -> Result<String, ApiError> {
        let request = MultimodalRequest {
            question: question.to_string(),
            image: Some(self.encode_image(image).await?),
        };
        let value = self.post_json("/api/multimodal", &request).await?;
        reply_text(&value, &["answer", "message", "response"])
            .ok_or_else(|| missing_field("answer"))
    }

    async fn interact(&self, request: &InteractRequest) -> Result<String, ApiError> {
        let value = self.post_json("/api/interact", request).await?;
        reply_text(&value, &["message", "response", "answer"])
            .ok_or_else(|| missing_field("message"))
    }

    async fn interrupt(&self, agent_name: &str) -> Result<String, ApiError> {
        let mut url = self.endpoint("/api/interrupt")?;
        url.query_pairs_mut().append_pair("agent_name", agent_name);
        engine_debug!("POST {}", url);
        let response = self.send(self.client.post(url)).await?;
        let value = read_json(response).await?;
        reply_text(&value, &["message", "status"]).ok_or_else(|| missing_field("message"))
    }

    async fn history(&self, student_id: &str) -> Result<Vec<WireMessage>, ApiError> {
        let mut url = self.endpoint("/api/history")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .push(student_id);
        let value = self.get_json(url).await?;
        decode::<MessagesReply>(value).map(|reply| reply.messages)
    }

    async fn messages(&self) -> Result<Vec<WireMessage>, ApiError> {
        let url = self.endpoint("/api/messages")?;
        let value = self.get_json(url).await?;
        decode::<MessagesReply>(value).map(|reply| reply.messages)
    }

    async fn agent_status(&self) -> Result<WireStatusMap, ApiError> {
        let url = self.endpoint("/api/agents/status")?;
        let value = self.get_json(url).await?;
        // Accept both a bare map and one wrapped as `{"agents": {...}}`.
        let map = match value.get("agents") {
            Some(Value::Object(agents)) => Value::Object(agents.clone()),
            _ => value,
        };
        decode::<WireStatusMap>(map)
    }

    async fn text_to_speech(&self, text: &str) -> Result<SpeechAudio, ApiError> {
        let url = self.endpoint("/api/text_to_speech")?;
        engine_debug!("POST {} text_len={}", url, text.len());
        let response = self
            .send(self.client.post(url).json(&SpeechRequest { text }))
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"));
        if !is_json {
            return Ok(SpeechAudio {
                bytes: body,
                content_type,
            });
        }

        // Some deployments wrap the clip as base64 in `{"audio": "..."}`.
        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let encoded = reply_text(&value, &["audio"]).ok_or_else(|| missing_field("audio"))?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        Ok(SpeechAudio {
            bytes: Bytes::from(decoded),
            content_type: Some("audio/mpeg".to_string()),
        })
    }
}

async fn read_json(response: Response) -> Result<Value, ApiError> {
    response
        .json::<Value>()
        .await
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn missing_field(field: &str) -> ApiError {
    ApiError::new(FailureKind::Decode, format!("reply has no {field}"))
}

fn io_error(err: std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
