// Screenshot serialization.
//
// Builds a BMP in place: 14-byte file header, 40-byte info header and three
// channel bit-masks, zero-padded out to a 128-byte pixel offset, followed by
// the raw 16-bpp payload transferred straight out of the capture texture.
// The hidden presentation buffer doubles as staging memory; that loan is
// only sound while the capture unit is paused.

use tracing::debug;

use crate::hal::{Devices, Dim, PixelFormat, Side, StorageError, Surface, TransferFlags};

/// Byte offset of the pixel payload. The header block is padded to this
/// alignment to keep the transfer engine's destination aligned.
pub const PIXEL_OFFSET: usize = 0x80;

/// Directory screenshots are written under, relative to the storage root.
pub const SCREENSHOT_DIR: &str = "screenshots";

/// BI_BITFIELDS: pixel layout given by the three channel masks.
const BI_BITFIELDS: u32 = 3;

/// Channel masks for the 16-bit A1BGR5 payload (alpha bit ignored).
const R_MASK: u32 = 0xF800;
const G_MASK: u32 = 0x07C0;
const B_MASK: u32 = 0x003E;

/// Frames live in a 512-line capture texture; the dump reads it through a
/// cropped 512x240 window.
const CAPTURE_TEX_DIM: Dim = Dim::new(512, 240);

/// Total screenshot file size for a geometry.
pub fn file_size(dim: Dim) -> usize {
    PIXEL_OFFSET + dim.w as usize * dim.h as usize * 2
}

/// Serialize the BMP header block for a geometry.
///
/// Height is written negative to mark top-to-bottom row order. Everything
/// between the masks and `PIXEL_OFFSET` is zero padding.
pub fn bmp_headers(dim: Dim) -> [u8; PIXEL_OFFSET] {
    let w = dim.w as u32;
    let h = dim.h as u32;
    let mut out = [0u8; PIXEL_OFFSET];

    // File header.
    out[0..2].copy_from_slice(b"BM");
    out[2..6].copy_from_slice(&(file_size(dim) as u32).to_le_bytes());
    out[10..14].copy_from_slice(&(PIXEL_OFFSET as u32).to_le_bytes());

    // Info header.
    out[14..18].copy_from_slice(&40u32.to_le_bytes());
    out[18..22].copy_from_slice(&(w as i32).to_le_bytes());
    out[22..26].copy_from_slice(&(-(h as i32)).to_le_bytes());
    out[26..28].copy_from_slice(&1u16.to_le_bytes()); // color planes
    out[28..30].copy_from_slice(&16u16.to_le_bytes()); // bits per pixel
    out[30..34].copy_from_slice(&BI_BITFIELDS.to_le_bytes());
    out[34..38].copy_from_slice(&(w * h * 2).to_le_bytes());
    // Pixels-per-meter and palette fields stay zero.

    // Channel masks.
    out[54..58].copy_from_slice(&R_MASK.to_le_bytes());
    out[58..62].copy_from_slice(&G_MASK.to_le_bytes());
    out[62..66].copy_from_slice(&B_MASK.to_le_bytes());

    out
}

/// Screenshot file path for a timestamp: fields rendered as uppercase hex,
/// year biased by 0x2000. The RTC reports BCD-coded fields, so hex digits
/// read as calendar digits.
fn screenshot_path(devices: &Devices) -> String {
    let td = devices.clock.now();
    format!(
        "{SCREENSHOT_DIR}/{:04X}_{:02X}_{:02X}_{:02X}_{:02X}_{:02X}.bmp",
        td.year + 0x2000,
        td.mon,
        td.day,
        td.hour,
        td.min,
        td.sec
    )
}

/// Divert the most recently rendered frame into a screenshot file.
///
/// Pauses the capture unit so the texture is not rewritten mid-dump, stages
/// header plus payload in the hidden presentation buffer, writes the file,
/// and restarts capture unconditionally — a failed write must not leave the
/// pipeline stopped. The write result is returned to the trigger site,
/// which consumes it.
pub fn dump_frame(devices: &Devices, dim: Dim) -> Result<(), StorageError> {
    devices.capture.stop();

    devices.display.write_frame(Side::Back, 0, &bmp_headers(dim));
    devices.transfer.transfer(
        Surface::CaptureTexture,
        CAPTURE_TEX_DIM,
        Surface::Frame(Side::Back),
        PIXEL_OFFSET,
        dim,
        PixelFormat::A1Bgr5,
        PixelFormat::A1Bgr5,
        TransferFlags::CROP,
    );
    devices.transfer.wait_done();

    let path = screenshot_path(devices);
    let data = devices.display.read_frame(Side::Back, file_size(dim));
    let res = devices.storage.write(&path, &data);
    if res.is_ok() {
        debug!(path = %path, "screenshot written");
    }

    devices.capture.start();
    res
}
