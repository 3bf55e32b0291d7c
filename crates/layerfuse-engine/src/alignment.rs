//! Layer alignment
//!
//! Snaps requested transition heights to true layer boundaries of the
//! section that begins there. A transition landing mid-layer would truncate
//! the prior section's topmost layer and leave a visible seam.

use layerfuse_core::EPSILON;

/// Snap a requested transition height to a layer boundary of the upcoming
/// section, never rounding down
///
/// Returns the smallest multiple of `layer_height` strictly greater than
/// `requested`. When `requested` is already an exact multiple, the result
/// advances one additional layer; this is a documented policy choice that
/// guarantees the previous section's last layer is never truncated.
pub fn align(requested: f64, layer_height: f64) -> f64 {
    if layer_height <= EPSILON {
        return requested;
    }
    let ratio = requested / layer_height;
    let nearest = ratio.round();
    let steps = if (ratio - nearest).abs() < EPSILON {
        // Already on a boundary: advance one layer
        nearest + 1.0
    } else {
        ratio.ceil()
    };
    steps * layer_height
}

/// Check whether a height sits on a layer boundary of the given layer height
pub fn is_layer_multiple(height: f64, layer_height: f64) -> bool {
    if layer_height <= EPSILON {
        return false;
    }
    let ratio = height / layer_height;
    (ratio - ratio.round()).abs() < EPSILON
}

/// Correct a requested transition height only when it is not already an
/// exact multiple of the upcoming section's layer height
pub fn ensure_aligned(requested: f64, layer_height: f64) -> f64 {
    if is_layer_multiple(requested, layer_height) {
        requested
    } else {
        align(requested, layer_height)
    }
}

/// Recommend the nearest detected layer boundary at or above the requested
/// height
///
/// `boundaries` are the Z values the section extractor detected in the
/// upcoming section's stream. The recommendation is surfaced to the caller
/// as a suggestion, not auto-applied.
pub fn recommend(requested: f64, boundaries: &[f64]) -> Option<f64> {
    boundaries
        .iter()
        .copied()
        .filter(|z| *z + EPSILON >= requested)
        .min_by(|a, b| a.partial_cmp(b).expect("boundary Z is never NaN"))
}
