//! Azure Kubernetes infrastructure for Ummati
//!
//! Turns validated [`Settings`](ummati_common::settings::Settings) into
//! resource specs and hands them to a [`Provisioner`]. Values only the engine
//! knows (ids, generated names, credentials) flow between resources as
//! [`Output`] handles.

#![deny(missing_docs)]

pub mod component;
pub mod kubeconfig;
pub mod output;
pub mod preview;
pub mod provisioner;
pub mod resource;
pub mod secret;
pub mod stack;

pub use output::Output;
pub use preview::PreviewProvisioner;
pub use provisioner::{
    CredentialList, CredentialResult, ListCredentialsRequest, Provisioner, RegisteredResource,
};
pub use secret::Secret;
pub use stack::AzureKubernetesStack;
pub use ummati_common::{Error, Result};
