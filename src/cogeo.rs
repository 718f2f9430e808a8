//! `GET {prefix}/validate`: Cloud Optimized GeoTIFF validation.

#[cfg(feature = "cogeo")]
pub(crate) mod layout;
pub mod model;
pub mod validator;

use std::sync::Arc;

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::routing::get;

use crate::constants::{
    DEPENDENCY_COGEO, DESC_STRICT, PARAM_STRICT, RESPONSE_INFO, ROUTE_NAME_VALIDATE,
    ROUTE_VALIDATE,
};
use crate::error::Result;
use crate::extension::{Extension, require_capability};
use crate::factory::{PathDependency, RouteInfo, TilerFactory};
use crate::support::params::extract_optional_bool;
use crate::support::{ParamDef, ParamType, QueryParams};
pub use model::{CogInfo, Geo, IfdInfo, Profile};
#[cfg(feature = "cogeo")]
pub use validator::TiffCogValidator;
pub use validator::CogValidator;

/// Normalized input of one validation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Source resolved by the path dependency
    pub source_path: String,
    /// Treat warnings as errors
    pub strict:      bool,
}

impl ValidationRequest {
    /// Parse `strict` and resolve the source; failures are client input errors
    pub fn from_query(params: &QueryParams, path_dependency: &dyn PathDependency) -> Result<Self> {
        let strict = extract_optional_bool(params, PARAM_STRICT, false)?;
        let source_path = path_dependency.resolve(params)?;
        Ok(Self {
            source_path,
            strict,
        })
    }
}

fn validate_params() -> Vec<ParamDef> {
    vec![ParamDef::optional(
        PARAM_STRICT,
        DESC_STRICT,
        ParamType::Boolean { default: false },
    )]
}

/// Adds `GET {prefix}/validate` to a factory
pub struct ValidateExtension {
    validator: Option<Arc<dyn CogValidator>>,
}

impl Default for ValidateExtension {
    fn default() -> Self {
        Self {
            validator: default_validator(),
        }
    }
}

#[cfg(feature = "cogeo")]
fn default_validator() -> Option<Arc<dyn CogValidator>> {
    Some(Arc::new(TiffCogValidator::default()))
}

#[cfg(not(feature = "cogeo"))]
fn default_validator() -> Option<Arc<dyn CogValidator>> {
    None
}

impl ValidateExtension {
    /// Extension with the bundled validator, when the `cogeo` feature is enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `validator` instead of the bundled one
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn CogValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Drop the validator; registration will then fail with `MissingDependency`
    #[must_use]
    pub fn without_validator(mut self) -> Self {
        self.validator = None;
        self
    }
}

impl Extension for ValidateExtension {
    fn name(&self) -> &'static str {
        "ValidateExtension"
    }

    fn register(&self, factory: &mut TilerFactory) -> Result<()> {
        let validator = require_capability(self.validator.as_ref(), self.name(), DEPENDENCY_COGEO)?;
        let path_dependency = factory.path_dependency();

        let info = RouteInfo::get(ROUTE_VALIDATE, ROUTE_NAME_VALIDATE, RESPONSE_INFO)
            .with_params(path_dependency.params())
            .with_params(validate_params());
        let state = ValidateState {
            validator,
            path_dependency,
        };

        factory.add_route(info, get(validate).with_state(state))
    }
}

#[derive(Clone)]
struct ValidateState {
    validator:       Arc<dyn CogValidator>,
    path_dependency: Arc<dyn PathDependency>,
}

async fn validate(
    State(state): State<ValidateState>,
    RawQuery(query): RawQuery,
) -> Result<Json<CogInfo>> {
    let params = QueryParams::from_raw(query.as_deref());
    let request = ValidationRequest::from_query(&params, state.path_dependency.as_ref())?;
    tracing::debug!(source = %request.source_path, strict = request.strict, "Validating source");

    let validator = Arc::clone(&state.validator);
    let info = tokio::task::spawn_blocking(move || {
        validator.validate(&request.source_path, request.strict)
    })
    .await??;

    Ok(Json(info))
}
