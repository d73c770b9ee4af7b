// Frame pipeline task.
//
// One dedicated thread per pipeline instance: block on the frame-ready
// signal, acknowledge it, submit the command sequence (A on the very first
// frame, B afterwards), transfer the rendered frame into the hidden
// presentation buffer, swap, then check the screenshot chord. No locks —
// correctness rests on the signal-gated single-writer protocol and the
// blocking completion waits after every submission and transfer.

use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cmdlist::CommandLists;
use crate::hal::{
    Devices, Dim, FrameSignal, PixelFormat, Side, Surface, TransferFlags, KEY_SELECT, KEY_Y,
    RENDER_BUF_DIM,
};
use crate::image;

pub struct FramePipeline {
    devices: Devices,
    signal: FrameSignal,
    lists: CommandLists,
    geometry: Dim,
    /// False until the first frame has been rendered. Owned by the task
    /// instance, set exactly once, never reset — it selects the full
    /// initialization sequence on the first iteration only.
    initialized: bool,
}

impl FramePipeline {
    pub fn new(devices: Devices, signal: FrameSignal, lists: CommandLists, geometry: Dim) -> Self {
        Self {
            devices,
            signal,
            lists,
            geometry,
            initialized: false,
        }
    }

    /// Spawn the pipeline loop on its own thread. The thread terminates
    /// when the frame-ready signal is closed.
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("frame-pipeline".into())
            .spawn(move || self.run())
            .context("failed to spawn frame-pipeline thread")
    }

    /// Blocking loop: idle on the signal, render, repeat. A failed wait is
    /// the cooperative shutdown path — the task exits without touching a
    /// buffer or the hardware again.
    pub fn run(mut self) {
        while self.signal.wait().is_ok() {
            // Acknowledge before rendering: a signal raised while we render
            // is observed on the next wait instead of being lost.
            self.signal.clear();

            self.render_frame();

            // Screenshot chord: exactly Y+SELECT held, nothing else, and at
            // least one key freshly pressed this sample. Checked after the
            // swap so the dump covers the frame just presented.
            let input = &self.devices.input;
            if input.keys_held() == (KEY_Y | KEY_SELECT) && input.keys_down() != 0 {
                if let Err(err) = image::dump_frame(&self.devices, self.geometry) {
                    warn!("screenshot failed: {err}");
                }
            }
        }
        debug!("frame-ready signal closed, pipeline task exiting");
    }

    fn render_frame(&mut self) {
        let list = if self.initialized {
            self.lists.frame_sequence()
        } else {
            self.initialized = true;
            self.lists.init_sequence()
        };

        let devices = &self.devices;
        devices.gpu.submit(list);
        devices.gpu.wait_idle();

        devices.transfer.transfer(
            Surface::RenderBuffer,
            RENDER_BUF_DIM,
            Surface::Frame(Side::Back),
            0,
            RENDER_BUF_DIM,
            PixelFormat::Bgr8,
            PixelFormat::Bgr8,
            TransferFlags::NONE,
        );
        devices.transfer.wait_done();

        devices.display.swap_buffers();
    }
}
