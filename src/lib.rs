#[cfg(feature = "keycloak")]
pub use iam_keycloak as keycloak;

#[cfg(feature = "import")]
pub use iam_import as import;
