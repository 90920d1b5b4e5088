//! Platform adapters and their registry.
//!
//! A provider's platform key selects the adapter that carries out deploy,
//! undeploy, log, cancel and discovery requests. The `local` and
//! `kubernetes` keys are served by [`BuiltinPlatformAdapter`], which runs
//! reconciliation passes; any other key is served by an adapter registered
//! at startup.

mod adapter;
mod builtin;
mod registry;

pub use adapter::{PlatformAdapter, PlatformAdapterError, PlatformAdapterResult};
pub use builtin::BuiltinPlatformAdapter;
pub use registry::{PlatformAdapterRegistry, PlatformRegistryError};
