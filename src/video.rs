// Pipeline lifecycle.
//
// Init order: power hints, capture configuration, command-list build, task
// spawn, gamma load, optional border. Exit deinitializes the capture unit;
// the signal close that entails is what lets the task terminate itself —
// exit never stops the task directly.

use std::thread::JoinHandle;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::capture;
use crate::cmdlist::CommandLists;
use crate::color;
use crate::config::VideoConfig;
use crate::hal::{
    Devices, FrameSignal, PixelFormat, Side, StorageError, Surface, TransferFlags, RENDER_BUF_DIM,
};
use crate::pipeline::FramePipeline;

/// Optional border image, relative to the storage root: raw 400x240 BGR.
pub const BORDER_PATH: &str = "border.bgr";

const BORDER_BYTES: usize = 400 * 240 * 3;

/// Running pipeline handle. Owns the frame-ready signal and the task; both
/// live until [`Video::exit`].
pub struct Video {
    devices: Devices,
    signal: FrameSignal,
    task: JoinHandle<()>,
}

/// Bring the pipeline up.
///
/// Returns once the task is running and the gamma table and optional
/// border are installed; frames flow from the first signal onward.
pub fn init(devices: Devices, cfg: &VideoConfig) -> Result<Video> {
    // Release builds blank the unused panel.
    if !cfg!(debug_assertions) {
        devices.display.blank_secondary();
    }

    let scaler = cfg.scaler;
    let signal = capture::setup_frame_capture(&devices, scaler);
    let lists = CommandLists::for_scaler(scaler);
    let geometry = capture::geometry(scaler);
    info!(
        scaler,
        width = geometry.w,
        height = geometry.h,
        "video pipeline starting"
    );

    let task =
        FramePipeline::new(devices.clone(), signal.clone(), lists, geometry).spawn()?;

    color::load_gamma_table(devices.display.as_ref(), cfg);

    // Borders only exist for the unscaled mode; GPU-side scaling (mode 1)
    // covers the border area.
    if scaler == 0 {
        load_border(&devices);
    }

    Ok(Video {
        devices,
        signal,
        task,
    })
}

impl Video {
    /// The frame-ready signal, for lifecycle tracking.
    pub fn signal(&self) -> &FrameSignal {
        &self.signal
    }

    /// Tear down the capture unit and reap the task.
    ///
    /// Deinitializing the unit closes the frame-ready signal; the task's
    /// wait fails and it terminates itself — this method only joins it.
    pub fn exit(self) -> Result<()> {
        self.devices.capture.deinit();
        self.task
            .join()
            .map_err(|_| anyhow!("frame-pipeline task panicked"))
    }
}

/// Stage the optional border through the hidden presentation buffer and
/// tile it into the render buffer once. Missing file: nothing to do.
fn load_border(devices: &Devices) {
    let mut raw = vec![0u8; BORDER_BYTES];
    match devices.storage.read(BORDER_PATH, &mut raw) {
        Ok(()) => {}
        Err(StorageError::NotFound) => return,
        Err(err) => {
            warn!("failed to load border: {err}");
            return;
        }
    }

    devices.display.write_frame(Side::Back, 0, &raw);
    devices.transfer.transfer(
        Surface::Frame(Side::Back),
        RENDER_BUF_DIM,
        Surface::RenderBuffer,
        0,
        RENDER_BUF_DIM,
        PixelFormat::Bgr8,
        PixelFormat::Bgr8,
        TransferFlags::TILED,
    );
    devices.transfer.wait_done();
}
