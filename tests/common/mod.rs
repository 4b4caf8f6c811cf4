#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use gourmet::app::{build_router, AppState};
use gourmet::auth::handlers::ensure_admin;
use gourmet::config::AppConfig;
use gourmet::error::AppError;
use gourmet::mail::mailer::{Mailer, Notifier, OutgoingEmail};
use gourmet::storage::asset_host::{AssetHost, AssetUpload, UploadedAsset};

pub const ADMIN_EMAIL: &str = "admin@gourmet.test";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Mailer that records every message and optionally fails.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email);
        if self.fail {
            return Err(AppError::Mail("SMTP connection refused".into()));
        }
        Ok(())
    }
}

/// Asset host that answers with a predictable URL.
#[derive(Default)]
pub struct FakeAssetHost {
    pub uploads: Mutex<Vec<AssetUpload>>,
}

#[async_trait]
impl AssetHost for FakeAssetHost {
    async fn upload(&self, upload: AssetUpload) -> Result<UploadedAsset, AppError> {
        let asset = UploadedAsset {
            url: format!(
                "https://assets.test/{}/{}",
                upload.resource_type.as_str(),
                upload.file_name
            ),
            resource_type: upload.resource_type,
        };
        self.uploads.lock().unwrap().push(upload);
        Ok(asset)
    }
}

/// In-memory application with fake mail and asset collaborators.
pub struct TestEnv {
    pub state: AppState,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub assets: Arc<FakeAssetHost>,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::with_mailer(RecordingMailer::default()).await
    }

    pub async fn with_mailer(mailer: RecordingMailer) -> Self {
        let config = AppConfig {
            jwt_secret: "integration-secret".into(),
            ..AppConfig::default()
        };
        let mut state = AppState::in_memory(config).expect("Failed to build in-memory state");

        let mailer = Arc::new(mailer);
        let assets = Arc::new(FakeAssetHost::default());
        state.notifier = Some(Notifier {
            mailer: mailer.clone(),
            from: "noreply@gourmet.test".into(),
            admin: ADMIN_EMAIL.into(),
        });
        state.asset_host = Some(assets.clone());

        ensure_admin(state.users.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to create admin");

        let router = build_router(state.clone());
        Self {
            state,
            router,
            mailer,
            assets,
        }
    }

    /// Anonymous server that does NOT expect success by default.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    /// Server whose cookie jar holds an admin session.
    pub async fn admin_server(&self) -> axum_test::TestServer {
        let server = self.server();
        server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD
            }))
            .await
            .assert_status_ok();
        server
    }

    /// Server with a regular shopper session.
    pub async fn shopper_server(&self) -> axum_test::TestServer {
        let server = self.server();
        server
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "userName": "shopper",
                "email": "shopper@gourmet.test",
                "password": "shopper-password"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": "shopper@gourmet.test",
                "password": "shopper-password"
            }))
            .await
            .assert_status_ok();
        server
    }
}
