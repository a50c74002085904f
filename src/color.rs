//! Color type and the handful of named colors the outline pipeline uses.

pub use rgb::Rgba;

/// The color type used throughout xray3d. RGBA with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// Black (0, 0, 0). Clear color of every offscreen pass.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// White (255, 255, 255)
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Red (255, 0, 0). Default mask color.
pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// Blue (0, 0, 255). Default extrusion color.
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

/// Yellow (255, 255, 0). Default outline color.
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

/// Light gray (211, 211, 211)
pub const LIGHT_GRAY: Color = Color::new(0.827, 0.827, 0.827, 1.0);

/// Converts a color to the wgpu clear color.
#[inline]
pub fn to_wgpu(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: color.a as f64,
    }
}

/// Converts a color to a `vec4<f32>` uniform value.
#[inline]
pub fn to_array(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, color.a]
}
