// Hardware collaborator contracts.
//
// Every block the pipeline talks to is consumed through one of these narrow
// traits, bundled in `Devices`. Completion waits (`wait_idle`, `wait_done`)
// have no failure path: a hang there is unrecoverable, there is no degraded
// mode for display hardware.

pub mod signal;
pub mod storage;

pub use signal::{FrameSignal, SignalClosed};
pub use storage::{FsStorage, Storage, StorageError};

use std::sync::Arc;

use crate::capture::CaptureConfig;

/// SELECT button bit in the input bitmask.
pub const KEY_SELECT: u32 = 1 << 2;
/// Y button bit in the input bitmask.
pub const KEY_Y: u32 = 1 << 11;

/// Layout of the GPU render buffer: one full rotated panel.
pub const RENDER_BUF_DIM: Dim = Dim::new(240, 400);

/// Presentation buffer role. `Front` is the buffer the display is scanning
/// out, `Back` the hidden one the pipeline may write. Which physical buffer
/// plays which role flips on every [`Display::swap_buffers`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

/// Addressable pixel surfaces visible to the transfer engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    /// Texture the capture unit streams frames into.
    CaptureTexture,
    /// GPU render target the command sequences draw into.
    RenderBuffer,
    /// A presentation buffer, selected by role at call time.
    Frame(Side),
}

/// Width/height of a transfer window, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dim {
    pub w: u16,
    pub h: u16,
}

impl Dim {
    pub const fn new(w: u16, h: u16) -> Self {
        Self { w, h }
    }
}

/// Pixel formats understood by the capture unit and transfer engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit, 5 bits per channel, alpha in the low bit.
    A1Bgr5,
    /// 24-bit packed BGR.
    Bgr8,
}

/// Transfer engine behavior flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferFlags {
    /// Restrict the source read to the destination extent.
    pub crop: bool,
    /// Emit the destination in the GPU's tiled layout.
    pub tiled_output: bool,
}

impl TransferFlags {
    pub const NONE: Self = Self { crop: false, tiled_output: false };
    pub const CROP: Self = Self { crop: true, tiled_output: false };
    pub const TILED: Self = Self { crop: false, tiled_output: true };
}

/// Calendar time as reported by the RTC. Fields are BCD-coded, exactly as
/// the clock hardware delivers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RtcTime {
    pub year: u16,
    pub mon: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
}

/// The capture unit producing raw frames from the legacy input source.
pub trait CaptureUnit: Send + Sync {
    /// Configure and arm the unit. Returns the frame-ready signal the unit
    /// sets once per completed input frame.
    fn init(&self, cfg: &CaptureConfig) -> FrameSignal;
    /// Resume frame production.
    fn start(&self);
    /// Pause frame production. Frames already in the capture texture stay
    /// readable until `start` is called again.
    fn stop(&self);
    /// Tear the unit down and close the signal handed out by `init`. The
    /// close is what lets a pipeline task blocked on the signal terminate.
    fn deinit(&self);
}

/// The GPU block executing submitted command sequences.
pub trait CommandProcessor: Send + Sync {
    /// Queue a command sequence for execution.
    fn submit(&self, list: &[u32]);
    /// Block until the queued sequence has drained.
    fn wait_idle(&self);
}

/// The DMA block performing format-converting copies between surfaces.
pub trait TransferEngine: Send + Sync {
    /// Start a copy of `src_dim` pixels from `src` into `dst` at byte
    /// offset `dst_offset`, converting `in_fmt` to `out_fmt` on the way.
    #[allow(clippy::too_many_arguments)]
    fn transfer(
        &self,
        src: Surface,
        src_dim: Dim,
        dst: Surface,
        dst_offset: usize,
        dst_dim: Dim,
        in_fmt: PixelFormat,
        out_fmt: PixelFormat,
        flags: TransferFlags,
    );
    /// Block until the running transfer has landed.
    fn wait_done(&self);
}

/// The double-buffered presentation subsystem.
pub trait Display: Send + Sync {
    /// Flip which physical buffer is front and which is back. The sole
    /// point at which a newly written frame becomes visible; acts as a full
    /// barrier — nothing may assume pre-swap buffer contents afterwards.
    fn swap_buffers(&self);

    /// CPU write into a presentation buffer at a byte offset. Writing
    /// `Side::Back` is the caller's short-lived staging loan; using it as
    /// screenshot scratch requires the capture unit paused.
    fn write_frame(&self, side: Side, offset: usize, bytes: &[u8]);

    /// CPU read of the first `len` bytes of a presentation buffer. Same
    /// loan rules as [`Display::write_frame`].
    fn read_frame(&self, side: Side, len: usize) -> Vec<u8>;

    /// Store one packed `0x00RRGGBB` entry in the color lookup table and
    /// advance the write cursor. The register is write-only and the index
    /// implicit: entries land at increasing indices in call order, and
    /// there is no way to rewind short of reloading all 256.
    fn push_color_lut(&self, entry: u32);

    /// Power hint: blank the unused secondary panel. Default does nothing.
    fn blank_secondary(&self) {}
}

/// Input-state polling.
pub trait Input: Send + Sync {
    /// Bitmask of buttons currently held.
    fn keys_held(&self) -> u32;
    /// Bitmask of buttons that transitioned to pressed this sample.
    fn keys_down(&self) -> u32;
}

/// Real-time clock access.
pub trait Clock: Send + Sync {
    fn now(&self) -> RtcTime;
}

/// Bundle of every hardware contract the pipeline needs. Cloned into the
/// pipeline task at spawn time.
#[derive(Clone)]
pub struct Devices {
    pub capture: Arc<dyn CaptureUnit>,
    pub gpu: Arc<dyn CommandProcessor>,
    pub transfer: Arc<dyn TransferEngine>,
    pub display: Arc<dyn Display>,
    pub input: Arc<dyn Input>,
    pub clock: Arc<dyn Clock>,
    pub storage: Arc<dyn Storage>,
}
