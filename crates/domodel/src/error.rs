//! Error types

use domodel_dom::DomError;

use crate::model_chain::ModelChainError;
use crate::observable::ObservableError;

/// Result type for model runs and binding operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure surfaced by the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Observable(#[from] ObservableError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    ModelChain(#[from] ModelChainError),

    /// Failure raised by a component hook
    #[error(transparent)]
    Component(#[from] anyhow::Error),
}

/// Violations of the binding ownership contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("binding field `{0}` is write-once and already set")]
    AlreadySet(&'static str),

    #[error("binding has not been run yet and has no root")]
    NotRendered,

    #[error("binding is not attached to a document")]
    NoDocument,
}
