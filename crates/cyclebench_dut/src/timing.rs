//! VGA raster timing.

/// Horizontal and vertical timing of one video mode, in pixel clocks and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VgaTiming {
    /// Visible pixels per line.
    pub h_visible: u16,
    /// First pixel of the horizontal sync pulse.
    pub h_sync_start: u16,
    /// One past the last pixel of the horizontal sync pulse.
    pub h_sync_end: u16,
    /// Pixel clocks per line.
    pub h_total: u16,
    /// Visible lines per frame.
    pub v_visible: u16,
    /// First line of the vertical sync pulse.
    pub v_sync_start: u16,
    /// One past the last line of the vertical sync pulse.
    pub v_sync_end: u16,
    /// Lines per frame.
    pub v_total: u16,
}

impl VgaTiming {
    /// 640x480 at 60 Hz: 800 clocks per line, 525 lines per frame.
    pub const VGA_640X480: VgaTiming = VgaTiming {
        h_visible: 640,
        h_sync_start: 656,
        h_sync_end: 752,
        h_total: 800,
        v_visible: 480,
        v_sync_start: 490,
        v_sync_end: 492,
        v_total: 525,
    };

    /// Returns true while the horizontal sync pulse is active.
    pub fn hsync(&self, hpos: u16) -> bool {
        (self.h_sync_start..self.h_sync_end).contains(&hpos)
    }

    /// Returns true while the vertical sync pulse is active.
    pub fn vsync(&self, vpos: u16) -> bool {
        (self.v_sync_start..self.v_sync_end).contains(&vpos)
    }

    /// Returns true inside the visible area.
    pub fn visible(&self, hpos: u16, vpos: u16) -> bool {
        hpos < self.h_visible && vpos < self.v_visible
    }

    /// Pixel clocks per frame.
    pub fn frame_clocks(&self) -> u64 {
        u64::from(self.h_total) * u64::from(self.v_total)
    }
}

impl Default for VgaTiming {
    fn default() -> Self {
        Self::VGA_640X480
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mode() {
        let t = VgaTiming::default();
        assert_eq!(t.frame_clocks(), 420_000);
        assert!(t.hsync(656) && t.hsync(751));
        assert!(!t.hsync(655) && !t.hsync(752));
        assert!(t.vsync(490) && t.vsync(491) && !t.vsync(492));
        assert!(t.visible(639, 479));
        assert!(!t.visible(640, 0));
    }
}
