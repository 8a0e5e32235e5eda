//! Library crate for user-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - Backend client trait and HTTP implementation (`api`)
//! - Command line and runtime configuration (`cli`, `config`)
//! - User records, request bodies and date helpers (`model`)
//! - Shared list state and the CRUD facade over it (`store`, `service`)
//! - Application state, form, keymap, worker and update loop (`app`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `user-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
pub use api::{HttpUserApi, UserApi};
pub use config::Config;
pub use error::{ApiError, ApiResult, ConfigError};
pub use model::{User, UserFormData, UserPayload};
pub use service::UserService;
pub use store::{UserState, UserStore};
