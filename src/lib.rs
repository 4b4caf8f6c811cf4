pub mod app;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod mail;
pub mod api {
    pub mod clubs;
    pub mod crud;
    pub mod envelope;
    pub mod errors;
    pub mod quotes;
    pub mod upload;
}
pub mod db {
    pub mod catalog;
    pub mod memory;
    pub mod models;
    pub mod repository;
}
pub mod storage {
    pub mod asset_host;
}
