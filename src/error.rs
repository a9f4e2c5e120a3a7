use thiserror::Error;

/// Failures at the edges of the renderer: input text and raster output.
///
/// The update path itself never fails; malformed data degrades to the
/// placeholder chart instead of surfacing one of these.
#[derive(Debug, Error)]
pub enum MekkoError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to rasterize SVG: {0}")]
    Raster(String),
}

/// Failures reported by host capabilities.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("selection identity unavailable: {0}")]
    IdentityUnavailable(String),
}
