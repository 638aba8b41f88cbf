//! # iam-keycloak
//!
//! Thin client for the parts of the Keycloak admin REST API needed to
//! provision users in bulk: the password grant against the admin realm and
//! user, realm role and role mapping endpoints of the target realm.
//!
//! Every admin call returns a small outcome enum instead of failing on
//! non-2xx answers, so callers decide per status what is fatal.
mod client;

pub use client::*;
pub mod config;
pub mod session;

pub use config::Config as KeycloakConfig;
pub use session::{AccessToken, KeycloakHttpError, KeycloakSessionClient};
