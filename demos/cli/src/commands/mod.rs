use std::path::PathBuf;

use clap::Parser;

mod import;

#[derive(Parser)]
#[clap(version, about = "Bulk import users into a Keycloak realm")]
pub struct Opts {
    /// suppress progress output
    #[clap(short, long)]
    pub quiet: bool,
    /// CSV file with the columns username, email, lastName, password, role
    #[clap(short, long, default_value = "users.csv")]
    pub file: PathBuf,
    /// target realm, overrides KEYCLOAK_REALM
    #[clap(long)]
    pub realm: Option<String>,
    /// prefix of the environment variables holding the connection settings
    #[clap(long, default_value = "KEYCLOAK_")]
    pub env_prefix: String,
}
