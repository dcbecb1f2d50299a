//! Inline styles the browser host writes
//!
//! The wrapper becomes an isolated stacking context. The blob paints beneath
//! the wrapper's own content (negative z-index) and the outline above it.

use glam::Vec2;

/// Wrapper styles set once on mount
pub const WRAP_STYLES: [(&str, &str); 4] = [
    ("position", "relative"),
    ("overflow", "visible"),
    // Keeps the blob's negative z-index inside the wrapper
    ("isolation", "isolate"),
    // Touch gestures would otherwise scroll and cancel the pointer stream
    ("touch-action", "none"),
];

/// Blob styles for a render box of `size` offset by `bleed`
pub fn blob_styles(bleed: f32, size: Vec2) -> Vec<(&'static str, String)> {
    vec![
        ("position", "absolute".to_string()),
        ("left", format!("{}px", -bleed)),
        ("top", format!("{}px", -bleed)),
        ("width", format!("{}px", size.x)),
        ("height", format!("{}px", size.y)),
        ("z-index", "-1".to_string()),
        ("pointer-events", "none".to_string()),
    ]
}

/// Inline `style` attribute for the outline svg
pub fn outline_style(bleed: f32, size: Vec2) -> String {
    format!(
        "position:absolute;pointer-events:none;overflow:visible;left:{}px;top:{}px;width:{}px;height:{}px",
        -bleed, -bleed, size.x, size.y
    )
}
