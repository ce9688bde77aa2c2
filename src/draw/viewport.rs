use glam::DVec2;

/// Affine map between molecule space (y up) and device space (y down,
/// offset by the panel origin).
///
/// `x_min`/`y_min` and the ranges describe the padded bounding box; the
/// translations centre that box in the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub x_min: f64,
    pub y_min: f64,
    pub x_range: f64,
    pub y_range: f64,
    pub x_trans: f64,
    pub y_trans: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub panel_height: f64,
    pub legend_height: f64,
}

impl Viewport {
    pub fn new(panel_height: f64) -> Self {
        Self {
            scale: 1.0,
            x_min: 0.0,
            y_min: 0.0,
            x_range: 1.0,
            y_range: 1.0,
            x_trans: 0.0,
            y_trans: 0.0,
            x_offset: 0.0,
            y_offset: 0.0,
            panel_height,
            legend_height: 0.0,
        }
    }

    /// Height available to the molecule once the legend is taken off.
    pub fn draw_height(&self) -> f64 {
        self.panel_height - self.legend_height
    }

    pub fn to_device(&self, p: DVec2) -> DVec2 {
        let x = self.scale * (p.x - self.x_min + self.x_trans);
        let y = self.scale * (p.y - self.y_min + self.y_trans);
        DVec2::new(x + self.x_offset, self.draw_height() - (y - self.y_offset))
    }

    pub fn to_molecule(&self, q: DVec2) -> DVec2 {
        let sx = q.x - self.x_offset;
        let sy = q.y - self.y_offset;
        DVec2::new(
            sx / self.scale + self.x_min - self.x_trans,
            self.y_min - self.y_trans - (sy - self.draw_height()) / self.scale,
        )
    }

    /// Identity-like map used while measuring labels: unit scale, no
    /// translation or offset. Device y is still flipped.
    pub fn unit(&self) -> Self {
        Self {
            scale: 1.0,
            x_min: 0.0,
            y_min: 0.0,
            x_trans: 0.0,
            y_trans: 0.0,
            x_offset: 0.0,
            y_offset: 0.0,
            ..*self
        }
    }

    /// Translate so the middle of the bounding box lands in the middle of
    /// a `width` x `height` area.
    pub fn centre_picture(&mut self, width: f64, height: f64) {
        let x_mid = self.x_min + 0.5 * self.x_range;
        let y_mid = self.y_min + 0.5 * self.y_range;
        let mid_x = self.scale * (x_mid - self.x_min);
        let mid_y = height - self.scale * (y_mid - self.y_min);
        self.x_trans = (width / 2.0 - mid_x) / self.scale;
        self.y_trans = (mid_y - height / 2.0) / self.scale;
    }
}
