//! # docshrink-api
//!
//! REST API server for docshrink
//!

mod api;
pub mod config;


pub use api::{
    app, compress_file, download_file, health_check, AppError, AppState, CompressResponse,
    ErrorResponse,
};
pub use config::ApiConfig;
