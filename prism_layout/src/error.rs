// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! None of these are fatal to layout. [`PropertyError`] never leaves
//! [`Tree::apply_properties`](crate::Tree::apply_properties): it is logged and the previous value
//! is kept.

use std::path::PathBuf;

use crate::types::NodeId;

/// An alignment name that is not of the form `"<vertical>-<horizontal>"`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid alignment `{0}`, expected `<top|center|bottom>-<left|center|right>`")]
pub struct ParseAlignmentError(pub String);

/// A property that is present but cannot be used.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// The JSON value has the wrong type.
    #[error("property `{key}`: expected {expected}")]
    WrongType {
        /// Property name.
        key: String,
        /// Human readable description of the accepted shape.
        expected: &'static str,
    },
    /// An array property has the wrong number of elements.
    #[error("property `{key}`: expected {expected} elements, found {found}")]
    WrongArity {
        /// Property name.
        key: String,
        /// Required element count.
        expected: usize,
        /// Actual element count.
        found: usize,
    },
    /// A string property names an unknown value.
    #[error("property `{key}`: unknown value `{value}`")]
    UnknownValue {
        /// Property name.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// A number is outside the accepted range.
    #[error("property `{key}`: {value} is out of range")]
    OutOfRange {
        /// Property name.
        key: String,
        /// The rejected value.
        value: f64,
    },
    /// An alignment string failed to parse.
    #[error("property `{key}`: {source}")]
    Alignment {
        /// Property name.
        key: String,
        /// Parse failure.
        #[source]
        source: ParseAlignmentError,
    },
}

/// Why the result of an asynchronous content load was discarded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The node was removed while the load was in flight.
    #[error("node {0:?} was removed before its load completed")]
    NodeRemoved(NodeId),
    /// A newer load, a content change, or a cancellation replaced this one.
    #[error("load for node {0:?} was superseded")]
    Superseded(NodeId),
}

/// Failure to read or parse a [`LayoutConfig`](crate::LayoutConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The TOML could not be parsed into a configuration.
    #[error("failed to parse layout config: {0}")]
    Parse(#[from] toml::de::Error),
}
