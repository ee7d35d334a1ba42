//! Provider allow-list evaluated at discovery time.
//!
//! The bridge only subscribes to the task-hub providers it knows how to forward, and the
//! list is fixed: there is no configuration surface. One wrinkle is the deprecated core
//! provider, which reuses the current core provider's name; the two are told apart by
//! their unique ids.

use uuid::{uuid, Uuid};

use crate::ProviderIdentity;

/// Name shared by the current and the deprecated core task providers.
pub const CORE_PROVIDER: &str = "DurableTask-Core";
/// Unique id of the deprecated duplicate of [`CORE_PROVIDER`]. A provider carrying this
/// exact id is skipped; any other provider with the same name is the current one.
pub const LEGACY_CORE_ID: Uuid = uuid!("7da4779a-152e-44a2-a6f2-f80d991a5bee");
/// Storage-backed variant of the task subsystem.
pub const AZURE_STORAGE_PROVIDER: &str = "DurableTask-AzureStorage";
/// SQL-backed variant of the task subsystem.
pub const SQL_PROVIDER: &str = "DurableTask-SqlServer";
/// The extension-level provider owned by the bridge's host.
pub const EXTENSION_PROVIDER: &str = "WebJobs-Extensions-DurableTask";

/// Decides whether the bridge should subscribe to the specified provider.
///
/// The decision is pure and infallible: a provider either fully matches the allow-list
/// rule or is ignored entirely. There is no partial, per-level or per-keyword matching;
/// once a provider is accepted, all of its events are captured.
pub fn matches(provider: &ProviderIdentity) -> bool {
    if provider.name == CORE_PROVIDER {
        // The deprecated core provider is excluded even though its name matches.
        return provider.unique_id != LEGACY_CORE_ID;
    }
    matches!(
        provider.name.as_str(),
        AZURE_STORAGE_PROVIDER | SQL_PROVIDER | EXTENSION_PROVIDER
    )
}
