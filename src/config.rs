// Validated scalar configuration.
//
// Values arrive pre-validated from the process configuration layer; this
// struct only carries them. Degenerate combinations (zero gamma, zero
// contrast) still produce defined output downstream, see `color`.

/// Tone-curve and scaler selection scalars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoConfig {
    /// Gamma the source material was authored for.
    pub target_gamma: f32,
    /// Gamma of the panel the frames are presented on.
    pub lcd_gamma: f32,
    /// Contrast multiplier, 1.0 = neutral.
    pub contrast: f32,
    /// Brightness offset, 0.0 = neutral.
    pub brightness: f32,
    /// Output geometry selector: < 2 native 240x160, >= 2 scaled 360x240.
    pub scaler: u8,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            target_gamma: 2.2,
            lcd_gamma: 1.54,
            contrast: 1.0,
            brightness: 0.0,
            scaler: 2,
        }
    }
}
