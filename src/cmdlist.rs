// GPU command sequences.
//
// Two opaque word streams in (parameter, register-header) pairs: sequence A
// runs exactly once to bring the render state up (framebuffer, texture
// environment, vertex attributes), sequence B is the lighter per-frame draw
// and cache flush. The command processor interprets them; this crate only
// patches the marked slots for the active scaler mode before the task
// starts.

use crate::capture::geometry;
use crate::hal::RENDER_BUF_DIM;

// One-time render-state bring-up.
const INIT_SEQUENCE: [u32; 28] = [
    0x0000_0000, 0x0005_0110, // color buffer clear
    0x0000_0000, 0x0005_0111, // depth buffer clear
    0x0000_00EF, 0x000F_0041, // viewport width
    0x0000_018F, 0x000F_0042, // viewport height
    0x0000_0000, 0x000F_004F, // viewport origin
    0x0100_00F0, 0x000F_011E, // render buffer dim (h<<16 | w)
    0x0000_0000, 0x000F_011D, // render buffer offset
    0x00A0_00F0, 0x000F_0082, // texture 0 dim (h<<16 | w), patched
    0x0000_0000, 0x000F_0085, // texture 0 address
    0x0000_0002, 0x000F_008E, // texture 0 format
    0x0000_0001, 0x000F_0080, // texture units enable
    0x0000_0003, 0x000F_0229, // draw mode: triangle strip
    0x0000_0001, 0x000F_022E, // draw trigger
    0x0000_0001, 0x000F_0111, // framebuffer cache flush
];

// Steady-state per-frame draw.
const FRAME_SEQUENCE: [u32; 8] = [
    0x0000_0000, 0x000F_0110, // color cache invalidate
    0x0000_0003, 0x000F_0229, // draw mode: triangle strip
    0x0000_0001, 0x000F_022E, // draw trigger
    0x0000_0001, 0x000F_0111, // framebuffer cache flush
];

// Patched slots in INIT_SEQUENCE.
const RENDER_DIM_WORD: usize = 10;
const TEX_DIM_WORD: usize = 14;

/// Command sequences selected by the frame pipeline: A once, B afterwards.
pub struct CommandLists {
    init: Box<[u32]>,
    frame: Box<[u32]>,
}

impl CommandLists {
    /// Build both sequences with the scaler-mode-dependent words applied.
    pub fn for_scaler(scaler: u8) -> Self {
        let mut init = INIT_SEQUENCE.to_vec();

        // The sampled window tracks the capture geometry; the render buffer
        // extent is fixed by the panel.
        let dim = geometry(scaler);
        init[TEX_DIM_WORD] = (dim.h as u32) << 16 | dim.w as u32;
        init[RENDER_DIM_WORD] =
            (RENDER_BUF_DIM.h as u32) << 16 | RENDER_BUF_DIM.w as u32;

        Self {
            init: init.into_boxed_slice(),
            frame: FRAME_SEQUENCE.to_vec().into_boxed_slice(),
        }
    }

    /// One-time initialization sequence (sequence A).
    pub fn init_sequence(&self) -> &[u32] {
        &self.init
    }

    /// Steady-state per-frame sequence (sequence B).
    pub fn frame_sequence(&self) -> &[u32] {
        &self.frame
    }
}
