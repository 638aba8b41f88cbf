//! Shared fixtures for the import integration tests.

#![allow(dead_code)]

use std::io::Write;

use iam_import::Importer;
use iam_keycloak::KeycloakConfig;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REALM: &str = "library-realm";
pub const HEADER: &str = "username,email,lastName,password,role";

/// Importer pointed at the mock server, with no environment influence.
pub fn importer(server: &MockServer) -> Importer {
    let uri = server.uri();
    let config = KeycloakConfig::builder()
        .with_prefix("IAM_IMPORT_TEST_NOT_SET_IN_SHELL_")
        .with_address(&uri)
        .with_realm(REALM)
        .build()
        .expect("test config");
    Importer::new(config)
}

pub fn csv_file(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "{header}").expect("write header");
    for row in rows {
        writeln!(file, "{row}").expect("write row");
    }
    file.flush().expect("flush");
    file
}

pub fn admin_path(rest: &str) -> String {
    format!("/admin/realms/{REALM}/{rest}")
}

pub fn role_json(name: &str) -> Value {
    json!({
        "id": format!("r-{name}"),
        "name": name,
        "composite": false,
        "clientRole": false,
        "containerId": REALM
    })
}

pub async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token",
            "token_type": "Bearer",
            "expires_in": 300
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn created_at(server: &MockServer, user_id: &str) -> ResponseTemplate {
    let location = format!("{}{}", server.uri(), admin_path(&format!("users/{user_id}")));
    ResponseTemplate::new(201).insert_header("Location", location.as_str())
}

pub fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("utf-8 output")
}
