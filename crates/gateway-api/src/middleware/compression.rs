//! Response compression layer.

use tower_http::compression::CompressionLayer;

/// Gzip compression for responses the client accepts it for.
pub fn build_compression_layer() -> CompressionLayer {
    CompressionLayer::new().gzip(true)
}
