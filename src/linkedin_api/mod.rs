// src/linkedin_api/mod.rs
//! LinkedIn Marketing API access: credential, validation, REST client.

pub mod client;
pub mod error;
pub mod models;
pub mod token;
pub mod validator;

pub use client::LinkedInClient;
pub use error::LinkedInError;
pub use token::{Credential, EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use validator::{TokenValidation, TokenValidator, REQUIRED_SCOPES};
