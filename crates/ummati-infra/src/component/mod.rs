//! Component resources
//!
//! A component groups the resources that make up one logical piece of the
//! stack (identity, network, cluster, ...) for one location. Constructors
//! validate their arguments, register their resources with the engine in
//! dependency order and expose the deferred values dependents need.

mod common;
mod container;
mod identity;
mod kubernetes;
mod network;

pub use common::CommonResource;
pub use container::ContainerAppResource;
pub use identity::IdentityResource;
pub use kubernetes::KubernetesResource;
pub use network::VirtualNetworkResource;

use ummati_common::{Error, Result};

/// Reject an empty required argument
pub(crate) fn require_argument(argument: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::argument(
            argument,
            format!("'{argument}' cannot be empty."),
        ));
    }
    Ok(())
}
