//! Backend service that syncs LinkedIn Marketing API data (ad accounts,
//! campaigns, lead-gen form responses) into a local SQLite store for the
//! recruitment dashboard, and creates campaigns on the owner's behalf.

pub mod cli;
pub mod config;
pub mod linkedin_api;
pub mod linkedin_sync;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use linkedin_sync::{dispatch, LinkedInSync, SyncOutcome, SyncRequest};
pub use web::start_web_server;
