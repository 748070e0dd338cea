//! Capability traits for the two sides of a version conversion.
//!
//! A resource family has exactly one [`Hub`] type, the canonical version all
//! others convert through, and any number of [`Convertible`] spokes. The hub
//! is a marker; all conversion logic lives on the spokes.

use std::any::Any;
use std::fmt;

use serde::Serialize;

use crate::fill::Fill;
use crate::primitives::Object;

/// Capabilities every object handed to the harness carries: deep copy
/// (`Clone`), debug output for diffs, serialization for semantic equality,
/// and random filling.
pub trait RuntimeObject: Any + Clone + fmt::Debug + Serialize + Fill {}

impl<T> RuntimeObject for T where T: Any + Clone + fmt::Debug + Serialize + Fill {}

/// Marks the canonical version of a resource family.
pub trait Hub: RuntimeObject {}

/// A version that converts to and from the hub `H`.
pub trait Convertible<H: Hub>: RuntimeObject {
    /// Converts `self` into `dst`, a freshly copied hub.
    fn convert_to(&self, dst: &mut H) -> Result<(), ConversionError>;

    /// Overwrites `self` with the contents of `src`.
    fn convert_from(&mut self, src: &H) -> Result<(), ConversionError>;

    /// Identity metadata of this spoke, for versions that carry it.
    ///
    /// The harness strips the stash annotation through this accessor, so a
    /// spoke that carries metadata must return `Some`.
    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        None
    }
}

/// Error returned by resource-specific conversion functions.
#[derive(Debug)]
pub struct ConversionError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        ConversionError { message: message.into(), source: None }
    }

    /// Wraps a lower-level failure, e.g. a stash decode error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConversionError { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<crate::error::StashError> for ConversionError {
    fn from(err: crate::error::StashError) -> Self {
        ConversionError::with_source("conversion data stash failed", err)
    }
}
