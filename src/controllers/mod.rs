//! Controllers Module
//!
//! The resource controllers shipped with the server and their registration.

pub mod cars;
pub mod docs;
pub mod values;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::RouterError;
use crate::router::RouterRegistry;

pub use cars::{Car, CarStore};
pub use docs::RouteDocs;
pub use values::ValueStore;

/// Registers the bundled controllers, plus `/docs` in development mode.
pub fn register_controllers(registry: &mut RouterRegistry, config: &Config) -> Result<(), RouterError> {
    registry.register(cars::controller(Arc::new(CarStore::seeded())))?;
    registry.register(values::controller(Arc::new(ValueStore::seeded())))?;

    if config.environment.is_development() {
        let docs = RouteDocs::new(registry.routes());
        registry.register(docs::controller(docs))?;
        info!("route documentation mounted at /docs");
    }
    Ok(())
}

/// Builds a registry with every bundled controller.
pub fn build_router(config: &Config) -> Result<RouterRegistry, RouterError> {
    let mut registry = RouterRegistry::new();
    register_controllers(&mut registry, config)?;
    Ok(registry)
}
