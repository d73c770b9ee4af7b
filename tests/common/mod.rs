// Mock hardware: every HAL trait implemented over plain memory with
// recorded effects, so integration tests can drive the whole pipeline
// without a device behind it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use retroview::capture::CaptureConfig;
use retroview::hal::{
    CaptureUnit, Clock, CommandProcessor, Devices, Dim, Display, FrameSignal, Input, PixelFormat,
    RtcTime, Side, Storage, StorageError, Surface, TransferEngine, TransferFlags,
};

/// Physical presentation buffer size: large enough for every staging use
/// (full BGR frame, border image, screenshot header plus payload).
pub const FRAME_BUF_BYTES: usize = 240 * 400 * 3;

/// Marker byte the mock transfer engine fills destinations with.
pub const TRANSFER_MARKER: u8 = 0xA5;

/// One recorded transfer-engine call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub src: Surface,
    pub src_dim: Dim,
    pub dst: Surface,
    pub dst_offset: usize,
    pub dst_dim: Dim,
    pub in_fmt: PixelFormat,
    pub out_fmt: PixelFormat,
    pub flags: TransferFlags,
}

pub struct MachineState {
    pub capture_cfg: Option<CaptureConfig>,
    pub capture_running: bool,
    pub start_calls: usize,
    pub stop_calls: usize,
    pub deinit_calls: usize,
    pub submitted: Vec<Vec<u32>>,
    pub transfers: Vec<TransferRecord>,
    pub swaps: usize,
    /// Physical index of the buffer currently scanned out.
    pub visible: usize,
    pub frames: [Vec<u8>; 2],
    pub lut: Vec<u32>,
    pub blanked: bool,
    pub held: u32,
    pub down: u32,
    pub time: RtcTime,
    pub files: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

impl MachineState {
    fn new() -> Self {
        Self {
            capture_cfg: None,
            capture_running: false,
            start_calls: 0,
            stop_calls: 0,
            deinit_calls: 0,
            submitted: Vec::new(),
            transfers: Vec::new(),
            swaps: 0,
            visible: 0,
            frames: [vec![0; FRAME_BUF_BYTES], vec![0; FRAME_BUF_BYTES]],
            lut: Vec::new(),
            blanked: false,
            held: 0,
            down: 0,
            time: RtcTime {
                year: 0x25,
                mon: 0x08,
                day: 0x06,
                hour: 0x12,
                min: 0x34,
                sec: 0x56,
            },
            files: HashMap::new(),
            fail_writes: false,
        }
    }

    /// Physical buffer index playing the given role right now.
    pub fn physical(&self, side: Side) -> usize {
        match side {
            Side::Front => self.visible,
            Side::Back => self.visible ^ 1,
        }
    }
}

pub struct MockMachine {
    state: Mutex<MachineState>,
    signal: Mutex<Option<FrameSignal>>,
}

impl MockMachine {
    pub fn new() -> Arc<Self> {
        init_logging();
        Arc::new(Self {
            state: Mutex::new(MachineState::new()),
            signal: Mutex::new(None),
        })
    }

    /// Devices bundle where every contract resolves to this machine.
    pub fn devices(self: &Arc<Self>) -> Devices {
        Devices {
            capture: self.clone(),
            gpu: self.clone(),
            transfer: self.clone(),
            display: self.clone(),
            input: self.clone(),
            clock: self.clone(),
            storage: self.clone(),
        }
    }

    /// Same bundle, with storage swapped for a real implementation.
    pub fn devices_with_storage(self: &Arc<Self>, storage: Arc<dyn Storage>) -> Devices {
        let mut devices = self.devices();
        devices.storage = storage;
        devices
    }

    pub fn state(&self) -> MutexGuard<'_, MachineState> {
        self.state.lock().expect("machine mutex poisoned")
    }

    pub fn set_keys(&self, held: u32, down: u32) {
        let mut state = self.state();
        state.held = held;
        state.down = down;
    }

    /// Raise the frame-ready signal, as the capture unit would on frame
    /// completion. Requires a prior `CaptureUnit::init`.
    pub fn fire_frame(&self) {
        self.signal
            .lock()
            .expect("signal slot poisoned")
            .as_ref()
            .expect("capture unit not initialized")
            .set();
    }
}

impl CaptureUnit for MockMachine {
    fn init(&self, cfg: &CaptureConfig) -> FrameSignal {
        let signal = FrameSignal::new();
        *self.signal.lock().expect("signal slot poisoned") = Some(signal.clone());
        let mut state = self.state();
        state.capture_cfg = Some(cfg.clone());
        state.capture_running = true;
        signal
    }

    fn start(&self) {
        let mut state = self.state();
        state.start_calls += 1;
        state.capture_running = true;
    }

    fn stop(&self) {
        let mut state = self.state();
        state.stop_calls += 1;
        state.capture_running = false;
    }

    fn deinit(&self) {
        if let Some(signal) = self.signal.lock().expect("signal slot poisoned").as_ref() {
            signal.close();
        }
        let mut state = self.state();
        state.deinit_calls += 1;
        state.capture_running = false;
    }
}

impl CommandProcessor for MockMachine {
    fn submit(&self, list: &[u32]) {
        self.state().submitted.push(list.to_vec());
    }

    fn wait_idle(&self) {}
}

impl TransferEngine for MockMachine {
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
    ) {
        let mut state = self.state();
        state.transfers.push(TransferRecord {
            src,
            src_dim,
            dst,
            dst_offset,
            dst_dim,
            in_fmt,
            out_fmt,
            flags,
        });

        // Emulate the landing: fill the destination window with a marker so
        // consumers can tell transferred payload from stale bytes.
        if let Surface::Frame(side) = dst {
            let bpp = match out_fmt {
                PixelFormat::A1Bgr5 => 2,
                PixelFormat::Bgr8 => 3,
            };
            let len = dst_dim.w as usize * dst_dim.h as usize * bpp;
            let idx = state.physical(side);
            state.frames[idx][dst_offset..dst_offset + len].fill(TRANSFER_MARKER);
        }
    }

    fn wait_done(&self) {}
}

impl Display for MockMachine {
    fn swap_buffers(&self) {
        let mut state = self.state();
        state.visible ^= 1;
        state.swaps += 1;
    }

    fn write_frame(&self, side: Side, offset: usize, bytes: &[u8]) {
        let mut state = self.state();
        let idx = state.physical(side);
        state.frames[idx][offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn read_frame(&self, side: Side, len: usize) -> Vec<u8> {
        let state = self.state();
        let idx = state.physical(side);
        state.frames[idx][..len].to_vec()
    }

    fn push_color_lut(&self, entry: u32) {
        self.state().lut.push(entry);
    }

    fn blank_secondary(&self) {
        self.state().blanked = true;
    }
}

impl Input for MockMachine {
    fn keys_held(&self) -> u32 {
        self.state().held
    }

    fn keys_down(&self) -> u32 {
        self.state().down
    }
}

impl Clock for MockMachine {
    fn now(&self) -> RtcTime {
        self.state().time
    }
}

impl Storage for MockMachine {
    fn read(&self, path: &str, buf: &mut [u8]) -> Result<(), StorageError> {
        let state = self.state();
        match state.files.get(path) {
            None => Err(StorageError::NotFound),
            Some(data) if data.len() < buf.len() => Err(StorageError::Truncated {
                expected: buf.len(),
                actual: data.len(),
            }),
            Some(data) => {
                buf.copy_from_slice(&data[..buf.len()]);
                Ok(())
            }
        }
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(StorageError::Io(io::Error::other("write protected")));
        }
        state.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

/// Opt-in log output for debugging test runs (`RUST_LOG=debug`).
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `pred` until it holds or two seconds pass.
pub fn wait_for(mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}
