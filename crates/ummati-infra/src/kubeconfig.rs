//! Kubeconfig post-processing
//!
//! The list-credentials call returns base64-encoded kubeconfig files. The
//! first one is decoded into a [`Secret`]. Disconnected runs get no credential
//! list at all; that resolves to an empty secret instead of failing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};
use ummati_common::{Error, Result};

use crate::output::Output;
use crate::provisioner::CredentialList;
use crate::secret::Secret;

const CONTEXT: &str = "kubeconfig";

/// Decode the first kubeconfig of a credential list once it resolves
pub fn decode_kubeconfig(credentials: Output<CredentialList>) -> Output<Secret> {
    credentials.apply(decode_first)
}

fn decode_first(credentials: CredentialList) -> Result<Secret> {
    let Some(first) = credentials.kubeconfigs.as_deref().and_then(<[_]>::first) else {
        debug!("no kubeconfig returned, using an empty secret");
        return Ok(Secret::default());
    };

    let bytes = STANDARD.decode(first.value.trim()).map_err(|e| {
        warn!(credential = %first.name, error = %e, "kubeconfig is not valid base64");
        Error::decode(CONTEXT, format!("invalid base64 in '{}': {e}", first.name))
    })?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::decode(CONTEXT, format!("invalid UTF-8 in '{}': {e}", first.name)))?;

    debug!(credential = %first.name, "decoded kubeconfig");
    Ok(Secret::new(text))
}
