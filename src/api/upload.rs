use axum::extract::Multipart;

use crate::api::envelope::{ApiResult, Envelope};
use crate::error::AppError;
use crate::storage::asset_host::{AssetHost, AssetUpload, ResourceType, UploadedAsset};

/// Multipart field names accepted for the file.
const FILE_FIELDS: &[&str] = &["file", "my_file"];

/// Classify, base64-encode and forward one file to the asset host.
pub async fn process_upload(
    host: &dyn AssetHost,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<UploadedAsset, AppError> {
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let resource_type = ResourceType::infer(content_type, Some(file_name)).ok_or_else(|| {
        AppError::BadRequest("Only image and PDF files are allowed".into())
    })?;

    let mime = match (resource_type, content_type) {
        (ResourceType::Raw, _) => "application/pdf".to_string(),
        (ResourceType::Image, Some(ct)) if ct.starts_with("image/") => ct.to_string(),
        (ResourceType::Image, _) => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    host.upload(AssetUpload::new(file_name, &mime, data, resource_type))
        .await
}

/// Axum handler for `POST /api/admin/<resource>/upload-image`.
///
/// Accepts a multipart form with a single file field named "file" (or "my_file").
pub async fn upload_asset_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadedAsset> {
    let host = state
        .asset_host
        .clone()
        .ok_or_else(|| AppError::Config("Asset host is not configured".into()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

        let uploaded =
            process_upload(host.as_ref(), &file_name, content_type.as_deref(), &data).await?;
        tracing::info!(file = %file_name, resource_type = uploaded.resource_type.as_str(), "asset uploaded");

        return Ok(axum::Json(Envelope::data(uploaded)));
    }

    Err(AppError::BadRequest("No file field found in request".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::asset_host::MockAssetHost;

    #[tokio::test]
    async fn test_pdf_is_sent_as_raw() {
        let mut host = MockAssetHost::new();
        host.expect_upload()
            .withf(|u| {
                u.resource_type == ResourceType::Raw
                    && u.data_uri.starts_with("data:application/pdf;base64,")
            })
            .times(1)
            .returning(|u| {
                Ok(UploadedAsset {
                    url: "https://cdn.example/raw/menu.pdf".into(),
                    resource_type: u.resource_type,
                })
            });

        let uploaded = process_upload(&host, "menu.pdf", Some("application/octet-stream"), b"%PDF")
            .await
            .unwrap();
        assert_eq!(uploaded.url, "https://cdn.example/raw/menu.pdf");
    }

    #[tokio::test]
    async fn test_image_keeps_declared_mime() {
        let mut host = MockAssetHost::new();
        host.expect_upload()
            .withf(|u| u.data_uri.starts_with("data:image/webp;base64,"))
            .times(1)
            .returning(|u| {
                Ok(UploadedAsset {
                    url: "https://cdn.example/image/x.webp".into(),
                    resource_type: u.resource_type,
                })
            });

        let uploaded = process_upload(&host, "x.webp", Some("image/webp"), b"RIFF")
            .await
            .unwrap();
        assert_eq!(uploaded.resource_type, ResourceType::Image);
    }

    #[tokio::test]
    async fn test_rejects_other_types() {
        let mut host = MockAssetHost::new();
        host.expect_upload().times(0);

        let err = process_upload(&host, "notes.txt", Some("text/plain"), b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let host = MockAssetHost::new();
        let err = process_upload(&host, "a.png", Some("image/png"), b"")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
