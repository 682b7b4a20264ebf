//! Configuration loading and the authority-weight policy.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars. The authority policy maps each source kind to a trust weight in
//! [0, 1]; weights are snapshotted onto chunks at index time.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};
use crate::types::SourceKind;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed extraction with a fallback for absent keys.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment.extract_inner(key).unwrap_or(default)
    }
}

/// Per-kind authority weights plus the threshold above which a source
/// counts as high-authority in ranking diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    pub earnings_call: f32,
    pub filing: f32,
    pub ir_material: f32,
    pub analyst_report: f32,
    pub high_authority_threshold: f32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            earnings_call: 1.0,
            filing: 1.0,
            ir_material: 0.9,
            analyst_report: 0.4,
            high_authority_threshold: 0.85,
        }
    }
}

impl AuthorityConfig {
    pub fn weight_for(&self, kind: SourceKind) -> f32 {
        match kind {
            SourceKind::EarningsCall => self.earnings_call,
            SourceKind::Filing => self.filing,
            SourceKind::IrMaterial => self.ir_material,
            SourceKind::AnalystReport => self.analyst_report,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("authority.earnings_call", self.earnings_call),
            ("authority.filing", self.filing),
            ("authority.ir_material", self.ir_material),
            ("authority.analyst_report", self.analyst_report),
            (
                "authority.high_authority_threshold",
                self.high_authority_threshold,
            ),
        ];
        for (field, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::validation(
                    field,
                    format!("{value} is outside [0, 1]"),
                ));
            }
        }
        Ok(())
    }
}
