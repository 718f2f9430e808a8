//! Application wiring: one factory, the enabled extensions, and the route index.
//!
//! ```text
//! /
//! ├── {prefix}/validate   - ValidateExtension
//! ├── {prefix}/stac       - StacExtension
//! └── /api                - route index with query parameter schemas
//! ```

#[cfg(any(feature = "cogeo", feature = "stac"))]
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Map, Value};

use crate::cogeo::ValidateExtension;
#[cfg(feature = "cogeo")]
use crate::cogeo::TiffCogValidator;
use crate::config::Config;
use crate::error::Result;
use crate::factory::TilerFactory;
use crate::stac::StacExtension;
#[cfg(feature = "stac")]
use crate::stac::RasterItemSynthesizer;

/// Path of the route index
pub const ROUTE_INDEX: &str = "/api";

/// Build the factory and register every extension the configuration enables
pub fn build_factory(config: &Config) -> Result<TilerFactory> {
    let mut factory = TilerFactory::new(&config.prefix, config.path_dependency());

    if config.disable_validate {
        tracing::info!("Validation route disabled");
    } else {
        factory.register(&validate_extension(config))?;
    }

    if config.disable_stac {
        tracing::info!("STAC route disabled");
    } else {
        factory.register(&stac_extension(config))?;
    }

    Ok(factory)
}

#[cfg(feature = "cogeo")]
fn validate_extension(config: &Config) -> ValidateExtension {
    let validator = TiffCogValidator::new(config.source_reader());
    ValidateExtension::new().with_validator(Arc::new(validator))
}

#[cfg(not(feature = "cogeo"))]
fn validate_extension(_config: &Config) -> ValidateExtension {
    ValidateExtension::new()
}

#[cfg(feature = "stac")]
fn stac_extension(config: &Config) -> StacExtension {
    let synthesizer = RasterItemSynthesizer::new(config.source_reader());
    StacExtension::new().with_synthesizer(Arc::new(synthesizer))
}

#[cfg(not(feature = "stac"))]
fn stac_extension(_config: &Config) -> StacExtension {
    StacExtension::new()
}

/// Consume the factory into the application router, adding `GET /api`
pub fn build_router(factory: TilerFactory) -> Router {
    let index = factory.route_schemas();
    factory
        .into_router()
        .route(ROUTE_INDEX, get(move || route_index(index)))
}

async fn route_index(routes: Vec<Map<String, Value>>) -> Json<Value> {
    Json(Value::Array(routes.into_iter().map(Value::Object).collect()))
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let factory = build_factory(config)?;
    let router = build_router(factory);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, prefix = %config.prefix, "Tiler listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Tiler stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
