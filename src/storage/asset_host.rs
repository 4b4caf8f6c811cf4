use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Upload class understood by the asset host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    /// Non-media files (PDF brochures).
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Raw => "raw",
        }
    }

    /// Classify an upload by MIME type, falling back to the file extension.
    pub fn infer(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let declared = content_type
            .map(|ct| ct.trim().to_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        let mime = match declared {
            Some(ct) => ct,
            None => mime_guess::from_path(file_name?).first()?.essence_str().to_string(),
        };

        if mime.starts_with("image/") {
            Some(ResourceType::Image)
        } else if mime == "application/pdf" {
            Some(ResourceType::Raw)
        } else {
            None
        }
    }
}

/// A file ready to hand to the asset host.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpload {
    pub file_name: String,
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
    pub resource_type: ResourceType,
}

impl AssetUpload {
    pub fn new(file_name: &str, mime: &str, bytes: &[u8], resource_type: ResourceType) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            file_name: file_name.to_string(),
            data_uri: format!("data:{mime};base64,{payload}"),
            resource_type,
        }
    }
}

/// Where the asset host put the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub resource_type: ResourceType,
}

/// Trait for the external asset host.
///
/// Abstracted as a trait so tests can use a mock without a real upload service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, AppError>;
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Cloudinary-compatible upload API client (signed uploads, SHA-256 signatures).
pub struct HttpAssetHost {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    folder: Option<String>,
}

impl HttpAssetHost {
    /// `base_url` is the account root, e.g. `https://api.cloudinary.com/v1_1/<cloud>`.
    pub fn new(
        base_url: &str,
        api_key: String,
        api_secret: String,
        folder: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        url::Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid asset upload URL '{base_url}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_secret,
            folder,
        })
    }

    fn endpoint(&self, resource_type: ResourceType) -> String {
        format!("{}/{}/upload", self.base_url, resource_type.as_str())
    }

    /// Hex SHA-256 over the `&`-joined, key-sorted params followed by the secret.
    pub fn sign(params: &[(&str, &str)], secret: &str) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Sha256::digest(format!("{joined}{secret}").as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[async_trait]
impl AssetHost for HttpAssetHost {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, AppError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let public_id = uuid::Uuid::new_v4().simple().to_string();

        let mut signed: Vec<(&str, &str)> =
            vec![("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())];
        if let Some(folder) = &self.folder {
            signed.push(("folder", folder.as_str()));
        }
        let signature = Self::sign(&signed, &self.api_secret);

        let mut form: Vec<(&str, &str)> = signed.clone();
        form.push(("file", upload.data_uri.as_str()));
        form.push(("api_key", self.api_key.as_str()));
        form.push(("signature", signature.as_str()));
        form.push(("signature_algorithm", "sha256"));

        let response = self
            .client
            .post(self.endpoint(upload.resource_type))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::AssetHost(format!("Upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AssetHost(format!(
                "Upload of '{}' rejected with {status}: {body}",
                upload.file_name
            )));
        }

        let parsed: HostResponse = response
            .json()
            .await
            .map_err(|e| AppError::AssetHost(format!("Unreadable upload response: {e}")))?;

        let url = parsed
            .secure_url
            .or(parsed.url)
            .ok_or_else(|| AppError::AssetHost("Upload response carried no URL".into()))?;

        tracing::debug!(file = %upload.file_name, %url, "asset uploaded");
        Ok(UploadedAsset {
            url,
            resource_type: upload.resource_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_infer_from_mime() {
        assert_eq!(
            ResourceType::infer(Some("image/png"), Some("a.png")),
            Some(ResourceType::Image)
        );
        assert_eq!(
            ResourceType::infer(Some("application/pdf"), None),
            Some(ResourceType::Raw)
        );
        assert_eq!(ResourceType::infer(Some("text/plain"), Some("a.txt")), None);
    }

    #[test]
    fn test_infer_falls_back_to_extension() {
        assert_eq!(
            ResourceType::infer(Some("application/octet-stream"), Some("menu.pdf")),
            Some(ResourceType::Raw)
        );
        assert_eq!(
            ResourceType::infer(None, Some("photo.JPG")),
            Some(ResourceType::Image)
        );
        assert_eq!(ResourceType::infer(None, None), None);
    }

    #[test]
    fn test_data_uri() {
        let upload = AssetUpload::new("a.txt", "image/png", b"hi", ResourceType::Image);
        assert_eq!(upload.data_uri, "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = HttpAssetHost::sign(&[("timestamp", "1"), ("public_id", "x")], "s");
        let b = HttpAssetHost::sign(&[("public_id", "x"), ("timestamp", "1")], "s");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_upload_posts_to_resource_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/raw/upload");
                then.status(200).json_body(serde_json::json!({
                    "secure_url": "https://cdn.example/raw/menu.pdf",
                    "url": "http://cdn.example/raw/menu.pdf"
                }));
            })
            .await;

        let host = HttpAssetHost::new(
            &server.base_url(),
            "key".into(),
            "secret".into(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let uploaded = host
            .upload(AssetUpload::new(
                "menu.pdf",
                "application/pdf",
                b"%PDF-1.4",
                ResourceType::Raw,
            ))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(uploaded.url, "https://cdn.example/raw/menu.pdf");
        assert_eq!(uploaded.resource_type, ResourceType::Raw);
    }

    #[tokio::test]
    async fn test_upload_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/image/upload");
                then.status(401).body("invalid signature");
            })
            .await;

        let host = HttpAssetHost::new(
            &server.base_url(),
            "key".into(),
            "bad".into(),
            Some("services".into()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = host
            .upload(AssetUpload::new("a.png", "image/png", b"x", ResourceType::Image))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssetHost(_)));
    }
}
