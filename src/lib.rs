//! COG validation and STAC item extensions for a raster tiler factory.
//!
//! A [`TilerFactory`] owns an axum router, a table of the routes it holds, and the
//! dataset path dependency every route shares. Extensions attach one route each:
//!
//! - [`ValidateExtension`] adds `GET {prefix}/validate`, delegating to a [`CogValidator`]
//! - [`StacExtension`] adds `GET {prefix}/stac`, delegating to an [`ItemSynthesizer`]
//!
//! Each extension checks its delegate when it registers and fails with
//! [`Error::MissingDependency`] if it has none. The bundled delegates are behind the
//! `cogeo` and `stac` cargo features, both enabled by default.
//!
//! ```no_run
//! use tiler_extensions::{DatasetPathParams, StacExtension, TilerFactory, ValidateExtension};
//!
//! # fn main() -> tiler_extensions::Result<()> {
//! let mut factory = TilerFactory::new("/cog", DatasetPathParams::new());
//! factory.register(&ValidateExtension::default())?;
//! factory.register(&StacExtension::default())?;
//! let router = factory.into_router();
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod cogeo;
pub mod config;
pub(crate) mod constants;
pub mod error;
pub mod extension;
pub mod factory;
pub mod logging;
pub mod raster;
pub mod server;
pub mod stac;
pub mod support;

pub use cogeo::{CogInfo, CogValidator, ValidateExtension};
pub use config::Config;
pub use error::{Error, Result};
pub use extension::Extension;
pub use factory::{DatasetPathParams, PathDependency, RouteInfo, TilerFactory};
pub use stac::{Item, ItemRequest, ItemSynthesizer, StacExtension};
