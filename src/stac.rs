//! `GET {prefix}/stac`: STAC item synthesis for a single raster.
//!
//! The endpoint does the input work the synthesizer would do less cheaply: it checks
//! the media type against the accepted set, splits `datetime` ranges into
//! `start_datetime`/`end_datetime` properties, and falls back to the resolved source
//! when no asset href is given. Everything else is left to the [`ItemSynthesizer`].

pub mod datetime;
pub mod item;
pub mod media_type;
pub mod params;
pub mod synthesizer;

use std::sync::Arc;

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::routing::get;
use serde_json::{Map, Value};

use crate::constants::{DEPENDENCY_STAC, RESPONSE_ITEM, ROUTE_NAME_STAC, ROUTE_STAC};
use crate::error::Result;
use crate::extension::{Extension, require_capability};
use crate::factory::{PathDependency, RouteInfo, TilerFactory};
use crate::support::QueryParams;
pub use datetime::{TemporalProperties, format_datetime, parse_datetime, parse_temporal};
pub use item::{Asset, Item, ItemRequest, Link};
pub use media_type::{AssetMediaType, MediaType};
pub use params::CatalogItemParams;
#[cfg(feature = "stac")]
pub use synthesizer::RasterItemSynthesizer;
pub use synthesizer::ItemSynthesizer;

/// Adds `GET {prefix}/stac` to a factory
pub struct StacExtension {
    synthesizer: Option<Arc<dyn ItemSynthesizer>>,
}

impl Default for StacExtension {
    fn default() -> Self {
        Self {
            synthesizer: default_synthesizer(),
        }
    }
}

#[cfg(feature = "stac")]
fn default_synthesizer() -> Option<Arc<dyn ItemSynthesizer>> {
    Some(Arc::new(RasterItemSynthesizer::default()))
}

#[cfg(not(feature = "stac"))]
fn default_synthesizer() -> Option<Arc<dyn ItemSynthesizer>> {
    None
}

impl StacExtension {
    /// Extension with the bundled synthesizer, when the `stac` feature is enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `synthesizer` instead of the bundled one
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn ItemSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Drop the synthesizer; registration will then fail with `MissingDependency`
    #[must_use]
    pub fn without_synthesizer(mut self) -> Self {
        self.synthesizer = None;
        self
    }
}

impl Extension for StacExtension {
    fn name(&self) -> &'static str {
        "StacExtension"
    }

    fn register(&self, factory: &mut TilerFactory) -> Result<()> {
        let synthesizer =
            require_capability(self.synthesizer.as_ref(), self.name(), DEPENDENCY_STAC)?;
        let path_dependency = factory.path_dependency();

        let info = RouteInfo::get(ROUTE_STAC, ROUTE_NAME_STAC, RESPONSE_ITEM)
            .with_params(path_dependency.params())
            .with_params(params::stac_params());
        let state = StacState {
            synthesizer,
            path_dependency,
        };

        factory.add_route(info, get(create_stac).with_state(state))
    }
}

#[derive(Clone)]
struct StacState {
    synthesizer:     Arc<dyn ItemSynthesizer>,
    path_dependency: Arc<dyn PathDependency>,
}

async fn create_stac(
    State(state): State<StacState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Map<String, Value>>> {
    let params = QueryParams::from_raw(query.as_deref());
    let request =
        CatalogItemParams::from_query(&params, state.path_dependency.as_ref())?.into_item_request();
    tracing::debug!(
        source = %request.path,
        asset_href = %request.asset_href,
        has_instant = request.input_datetime.is_some(),
        "Creating STAC item"
    );

    let synthesizer = Arc::clone(&state.synthesizer);
    let item = tokio::task::spawn_blocking(move || synthesizer.create_item(&request)).await??;

    Ok(Json(item.into_map()?))
}
