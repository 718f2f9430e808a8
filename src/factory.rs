//! Tiler factory: the routable object extensions attach themselves to.
//!
//! The factory owns an axum [`Router`], a table describing every route it holds,
//! and a shared [`PathDependency`] that resolves the dataset location of a request.
//! Extensions never own the factory; they borrow it mutably while registering,
//! clone the path dependency into their handler state and add one route.
//!
//! ```text
//! TilerFactory::new("/cog", DatasetPathParams::new())
//!     ├── register(&ValidateExtension)  → GET /cog/validate
//!     └── register(&StacExtension)      → GET /cog/stac
//! ```

pub mod path;

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::MethodRouter;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::support::{ParamDef, SchemaBuilder};
pub use path::{DatasetPathParams, PathDependency};

/// Describes one route held by a factory
#[derive(Clone, Debug)]
pub struct RouteInfo {
    /// HTTP method
    pub method:   Method,
    /// Path suffix, relative to the factory prefix
    pub path:     &'static str,
    /// Human readable route name
    pub name:     &'static str,
    /// Name of the declared response shape
    pub response: &'static str,
    /// Query parameters, including those of the path dependency
    pub params:   Vec<ParamDef>,
}

impl RouteInfo {
    /// A `GET` route with no parameters yet
    pub const fn get(path: &'static str, name: &'static str, response: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            name,
            response,
            params: Vec::new(),
        }
    }

    /// Append query parameters
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = ParamDef>) -> Self {
        self.params.extend(params);
        self
    }
}

/// A routable factory with a shared dataset path dependency
pub struct TilerFactory {
    prefix:          String,
    router:          Router,
    routes:          Vec<RouteInfo>,
    path_dependency: Arc<dyn PathDependency>,
}

impl TilerFactory {
    /// Create an empty factory mounted at `prefix` (`""` or `"/"` mounts at the root)
    pub fn new(prefix: &str, path_dependency: impl PathDependency + 'static) -> Self {
        Self::with_shared_dependency(prefix, Arc::new(path_dependency))
    }

    /// Create an empty factory sharing an existing path dependency
    pub fn with_shared_dependency(prefix: &str, path_dependency: Arc<dyn PathDependency>) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            router: Router::new(),
            routes: Vec::new(),
            path_dependency,
        }
    }

    /// Normalized prefix, without a trailing slash
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The shared dependency every route uses to resolve its source
    pub fn path_dependency(&self) -> Arc<dyn PathDependency> {
        Arc::clone(&self.path_dependency)
    }

    /// Routes registered so far, in registration order
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Full path of a route suffix under this factory's prefix
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.prefix)
    }

    /// Add a route to the route table and the router.
    ///
    /// The router cannot hold the same method and path twice, so a second
    /// registration of an existing pair is refused instead of shadowing it.
    pub fn add_route(&mut self, info: RouteInfo, handler: MethodRouter) -> Result<()> {
        let conflict = self
            .routes
            .iter()
            .any(|existing| existing.path == info.path && existing.method == info.method);
        if conflict {
            return Err(Error::RouteConflict {
                method: info.method.to_string(),
                path:   self.url_for(info.path),
            });
        }

        let full_path = self.url_for(info.path);
        tracing::info!(method = %info.method, path = %full_path, name = info.name, "Adding route");

        self.router = std::mem::take(&mut self.router).route(&full_path, handler);
        self.routes.push(info);
        Ok(())
    }

    /// Register an extension onto this factory
    pub fn register(&mut self, extension: &dyn Extension) -> Result<()> {
        let before = self.routes.len();
        match extension.register(self) {
            Ok(()) => {
                tracing::info!(
                    extension = extension.name(),
                    routes_added = self.routes.len() - before,
                    "Registered extension"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(extension = extension.name(), error = %e, "Extension registration failed");
                Err(e)
            }
        }
    }

    /// JSON description of every route: method, path, response shape and query schema
    pub fn route_schemas(&self) -> Vec<Map<String, Value>> {
        self.routes
            .iter()
            .map(|route| {
                let mut entry = Map::new();
                entry.insert("method".to_string(), route.method.as_str().into());
                entry.insert("path".to_string(), self.url_for(route.path).into());
                entry.insert("name".to_string(), route.name.into());
                entry.insert("response".to_string(), route.response.into());
                entry.insert(
                    "query".to_string(),
                    SchemaBuilder::new().add_params(&route.params).build().into(),
                );
                entry
            })
            .collect()
    }

    /// Consume the factory, handing out its router
    pub fn into_router(self) -> Router {
        self.router
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::routing::get;

    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn prefixes_are_normalized() {
        assert_eq!(normalize_prefix("/cog"), "/cog");
        assert_eq!(normalize_prefix("cog/"), "/cog");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn routes_are_recorded_under_prefix() {
        let mut factory = TilerFactory::new("/cog", DatasetPathParams::new());
        factory
            .add_route(RouteInfo::get("/ping", "Ping", "Text"), get(ok))
            .unwrap();

        assert_eq!(factory.routes().len(), 1);
        assert_eq!(factory.url_for("/ping"), "/cog/ping");

        let schemas = factory.route_schemas();
        assert_eq!(schemas[0]["path"], "/cog/ping");
        assert_eq!(schemas[0]["method"], "GET");
    }

    #[test]
    fn duplicate_routes_are_refused() {
        let mut factory = TilerFactory::new("", DatasetPathParams::new());
        factory
            .add_route(RouteInfo::get("/ping", "Ping", "Text"), get(ok))
            .unwrap();
        let err = factory
            .add_route(RouteInfo::get("/ping", "Ping", "Text"), get(ok))
            .unwrap_err();

        assert!(matches!(err, Error::RouteConflict { path, .. } if path == "/ping"));
        assert_eq!(factory.routes().len(), 1);
    }
}
