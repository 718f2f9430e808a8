//! Extension registration contract.
//!
//! An extension is a unit of behavior that adds routes to a [`TilerFactory`] it does
//! not own. Each extension carries an optional capability handle (the validator, the
//! item synthesizer, ...). The handle is checked once, when the extension registers,
//! so a missing capability stops startup instead of failing the first request.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::factory::TilerFactory;

/// A pluggable set of routes attached to a factory.
///
/// `register` is expected to be called once per factory. A second call on the same
/// factory is refused by [`TilerFactory::add_route`] with a route conflict.
pub trait Extension {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Attach this extension's routes to `factory`
    fn register(&self, factory: &mut TilerFactory) -> Result<()>;
}

/// Return the capability if present, otherwise a `MissingDependency` error naming it.
pub fn require_capability<T: ?Sized>(
    capability: Option<&Arc<T>>,
    extension: &'static str,
    dependency: &'static str,
) -> Result<Arc<T>> {
    capability.map(Arc::clone).ok_or(Error::MissingDependency {
        extension,
        dependency,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    trait Capability: std::fmt::Debug + Send + Sync {
        fn answer(&self) -> u8;
    }

    #[derive(Debug)]
    struct Fixed;

    impl Capability for Fixed {
        fn answer(&self) -> u8 {
            42
        }
    }

    #[test]
    fn present_capability_is_cloned_out() {
        let cap: Arc<dyn Capability> = Arc::new(Fixed);
        let found = require_capability(Some(&cap), "Test", "fixed").unwrap();
        assert_eq!(found.answer(), 42);
        assert_eq!(Arc::strong_count(&cap), 2);
    }

    #[test]
    fn absent_capability_names_the_dependency() {
        let err = require_capability::<dyn Capability>(None, "TestExtension", "fixed").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingDependency {
                extension:  "TestExtension",
                dependency: "fixed",
            }
        ));
    }
}
