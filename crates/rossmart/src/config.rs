use crate::client::{ClientBuilder, Endpoint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based client configuration
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// API environment to talk to
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Path to the armored public key file
    pub public_key_path: PathBuf,

    /// Path to the armored private key file
    pub private_key_path: PathBuf,

    /// Plaintext account password
    pub password: Option<String>,

    /// Pre-hashed password, mutually exclusive with `password`
    pub hashed_password: Option<String>,

    /// Employer registration number
    pub employer_registration_number: String,

    /// Tax year requests are scoped to
    pub tax_year: String,

    /// Software identifier reported on every request
    pub software_used: Option<String>,

    /// Software version reported on every request
    pub software_version: Option<String>,

    /// TAIN of the agent filing on the employer's behalf
    pub agent_tain: Option<String>,
}

impl Configuration {
    /// Load the configuration from a TOML file
    pub async fn load<P>(path: P) -> eyre::Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path).await?;
        toml::from_str(&content).map_err(eyre::Report::from)
    }
}

impl ClientBuilder {
    /// Populate a builder from a loaded configuration
    #[must_use]
    pub fn from_config(config: Configuration) -> Self {
        let mut builder = Self::default()
            .endpoint(config.endpoint)
            .public_key_path(config.public_key_path)
            .private_key_path(config.private_key_path)
            .employer_registration_number(config.employer_registration_number)
            .tax_year(config.tax_year);

        if let Some(password) = config.password {
            builder = builder.password(password);
        }
        if let Some(hashed_password) = config.hashed_password {
            builder = builder.hashed_password(hashed_password);
        }
        if let Some(software_used) = config.software_used {
            builder = builder.software_used(software_used);
        }
        if let Some(software_version) = config.software_version {
            builder = builder.software_version(software_version);
        }
        if let Some(agent_tain) = config.agent_tain {
            builder = builder.agent_tain(agent_tain);
        }

        builder
    }
}
