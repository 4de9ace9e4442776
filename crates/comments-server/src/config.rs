use std::env;

use anyhow::Context;

use crate::db::SchemaFailurePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown store backend: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub jwt_secret: String,
    pub port: u16,
    pub schema_failure_policy: SchemaFailurePolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            store_backend: var("STORE_BACKEND", "mongodb").parse()?,
            mongodb_uri: var("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_database: var("MONGODB_DATABASE", "task_comments"),
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            port: var("PORT", "3000").parse().context("PORT must be a port number")?,
            schema_failure_policy: var("SCHEMA_FAILURE_POLICY", "continue").parse()?,
        })
    }
}
