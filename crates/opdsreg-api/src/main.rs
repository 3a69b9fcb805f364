//! # Registry Service Entry Point
//!
//! Assembles the registrar from its components and serves the API.
//!
//! Configuration comes from the environment:
//!
//! - `OPDSREG_BIND` — listen address (default `0.0.0.0:8080`)
//! - `OPDSREG_GEO_DB` — path to the offline geo database JSON snapshot
//!   (starts with an empty database when unset)
//! - `OPDSREG_GEOCODER_URL` — external geocoder endpoint
//! - `OPDSREG_CONFIG` — path to a JSON `RegistrarConfig` override
//! - `RUST_LOG` — tracing filter

use std::sync::Arc;

use anyhow::Context;

use opdsreg_api::{app, AppState};
use opdsreg_authdoc::{DocumentValidator, HttpFetcher};
use opdsreg_coverage::CoverageIndex;
use opdsreg_geo::{GeoDatabase, GeoDatabaseBuilder, GeoResolver, HttpGeocoder};
use opdsreg_registrar::{MemoryStore, Registrar, RegistrarConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::var("OPDSREG_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
        }
        Err(_) => RegistrarConfig::default(),
    };

    let db = match std::env::var("OPDSREG_GEO_DB") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading geo database {path}"))?;
            let db = GeoDatabase::from_json(&raw)
                .with_context(|| format!("parsing geo database {path}"))?;
            tracing::info!(path, postal = db.postal_count(), places = db.place_count(),
                "offline geo database loaded");
            db
        }
        Err(_) => {
            tracing::warn!("no OPDSREG_GEO_DB set; starting with an empty geo database");
            GeoDatabaseBuilder::new().build()
        }
    };

    let geocoder_url = std::env::var("OPDSREG_GEOCODER_URL")
        .unwrap_or_else(|_| "https://geocoder.invalid/v1/search".to_string());
    let geocoder = HttpGeocoder::new(&geocoder_url, config.geocoder_timeout())
        .context("building geocoder client")?;
    let fetcher = HttpFetcher::new(config.fetch_timeout()).context("building fetcher client")?;

    let index = Arc::new(CoverageIndex::new());
    let registrar = Registrar::new(
        DocumentValidator::new(fetcher),
        GeoResolver::new(Arc::new(db), geocoder),
        MemoryStore::new(),
        Arc::clone(&index),
        config,
    );
    let state = AppState::new(registrar, index);

    let bind = std::env::var("OPDSREG_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(addr = %bind, "registry service listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
