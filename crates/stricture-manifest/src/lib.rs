//! Contract manifest model.
//!
//! A manifest declares one or more contracts, each describing a producer's
//! API surface: endpoints with request/response field specs, the status
//! codes each endpoint may return, an optional structured error shape, and
//! optional lifecycle protocol groupings for multi-step flows.
//!
//! Loading is strict: any schema violation (unknown type tag, enum with no
//! values, inverted range, unknown format name, …) is a fatal
//! [`ManifestError`] naming the offending manifest path. The rule engine
//! never sees a partially-valid manifest.

mod format;
mod load;
mod spec;

pub use format::{FormatSpec, format_registry, is_known_format};
pub use load::{load_manifest, parse_manifest};
pub use spec::{
    Contract, Endpoint, ErrorShape, FieldKind, FieldSpec, IntRange, LengthBounds, Lifecycle,
    LifecycleRole, ManifestSet, RequestSpec, ResponseSpec,
};

/// Errors raised while loading or validating a manifest. All fatal.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A structurally valid document that violates a manifest invariant.
    /// `path` points into the manifest (e.g.
    /// `contracts[0].endpoints[2].request.body.tier.values`).
    #[error("invalid manifest at {path}: {reason}")]
    Invalid { path: String, reason: String },
}
