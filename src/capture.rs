// Capture-unit configuration.
//
// Derives geometry and scaling enables from the scaler mode, loads the
// optional coefficient override file, and hands the finished configuration
// to the capture unit exactly once. The frame-ready signal returned by the
// unit is this module's only output.

use tracing::warn;

use crate::hal::{Devices, Dim, FrameSignal, PixelFormat, Storage, StorageError};

/// Taps per filter phase.
pub const FILTER_TAPS: usize = 6;
/// Filter phases per axis.
pub const FILTER_PHASES: usize = 8;
/// One axis worth of coefficients.
pub const MATRIX_LEN: usize = FILTER_TAPS * FILTER_PHASES;

/// Optional coefficient override, relative to the storage root. Exactly
/// two little-endian i16 matrices, vertical then horizontal.
pub const SCALER_MATRIX_PATH: &str = "scaler_matrix.bin";

/// Built-in filter coefficients (s1.14 fixed point), vertical matrix first.
/// Each row below is one tap across the 8 phases.
pub(crate) const DEFAULT_MATRIX: [i16; MATRIX_LEN * 2] = [
    // Vertical.
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0x24B0, 0x4000, 0, 0x24B0, 0x4000, 0, 0,
    0x4000, 0x2000, 0, 0x4000, 0x2000, 0, 0, 0,
    0, -0x4B0, 0, 0, -0x4B0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    // Horizontal.
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0x24B0, 0, 0, 0x24B0, 0, 0,
    0x4000, 0x4000, 0x2000, 0x4000, 0x4000, 0x2000, 0, 0,
    0, 0, -0x4B0, 0, 0, -0x4B0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
];

/// Finished capture-unit configuration.
///
/// The filter matrices are only meaningful when the scale enables are set
/// (scaler mode >= 2); native modes carry them loaded but unused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    /// Emit frames in the GPU's tiled layout.
    pub swizzle: bool,
    pub hscale: bool,
    pub vscale: bool,
    /// Vertical filter tap count and phase pattern.
    pub vlen: u8,
    pub vpatt: u8,
    pub vmatrix: [i16; MATRIX_LEN],
    /// Horizontal filter tap count and phase pattern.
    pub hlen: u8,
    pub hpatt: u8,
    pub hmatrix: [i16; MATRIX_LEN],
}

/// Output geometry for a scaler mode: modes 0 and 1 present the source
/// natively, modes >= 2 through the hardware scaler.
pub fn geometry(scaler: u8) -> Dim {
    if scaler < 2 {
        Dim::new(240, 160)
    } else {
        Dim::new(360, 240)
    }
}

/// Build the capture configuration for a scaler mode, with the coefficient
/// override applied when present. A missing override file is the normal
/// case; any other read failure is reported and the built-ins stay in
/// effect.
pub fn capture_config(storage: &dyn Storage, scaler: u8) -> CaptureConfig {
    let mut matrix = DEFAULT_MATRIX;
    match load_matrix_override(storage, &mut matrix) {
        Ok(()) | Err(StorageError::NotFound) => {}
        Err(err) => warn!("failed to load scaler matrix override: {err}"),
    }

    let native = scaler < 2;
    let dim = geometry(scaler);
    let mut cfg = CaptureConfig {
        width: dim.w,
        height: dim.h,
        format: PixelFormat::A1Bgr5,
        swizzle: true,
        hscale: !native,
        vscale: !native,
        vlen: FILTER_TAPS as u8,
        vpatt: 0b0001_1011,
        vmatrix: [0; MATRIX_LEN],
        hlen: FILTER_TAPS as u8,
        hpatt: 0b0001_1011,
        hmatrix: [0; MATRIX_LEN],
    };
    cfg.vmatrix.copy_from_slice(&matrix[..MATRIX_LEN]);
    cfg.hmatrix.copy_from_slice(&matrix[MATRIX_LEN..]);
    cfg
}

/// All-or-nothing override load: `matrix` is only touched after the whole
/// file has been read and decoded.
fn load_matrix_override(
    storage: &dyn Storage,
    matrix: &mut [i16; MATRIX_LEN * 2],
) -> Result<(), StorageError> {
    let mut raw = [0u8; MATRIX_LEN * 2 * 2];
    storage.read(SCALER_MATRIX_PATH, &mut raw)?;
    for (dst, src) in matrix.iter_mut().zip(raw.chunks_exact(2)) {
        *dst = i16::from_le_bytes([src[0], src[1]]);
    }
    Ok(())
}

/// Configure and arm the capture unit. Returns the frame-ready signal it
/// will set once per completed input frame.
pub fn setup_frame_capture(devices: &Devices, scaler: u8) -> FrameSignal {
    let cfg = capture_config(devices.storage.as_ref(), scaler);
    devices.capture.init(&cfg)
}
