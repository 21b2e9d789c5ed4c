//! Rack geometry and status overlays for the rendering layer.
//!
//! Equipment images are scaled proportionally inside a fixed-width rack
//! frame: a full 19" device spans the frame, and each rack unit is a fixed
//! number of pixels tall.

use racker_core::{EquipmentConfig, EquipmentModel, Facing, RackConfig};
use serde::Serialize;

use crate::evaluator::SensorReport;

/// Width of a full-size rack-mount device, in inches.
pub const FULL_WIDTH_INCHES: f64 = 19.0;
/// Width of the rendered rack frame, in pixels.
pub const RACK_WIDTH_PX: f64 = 410.0;
/// Height of one rack unit, in pixels.
pub const UNIT_HEIGHT_PX: f64 = 40.0;

const NOMINAL_COLOR: &str = "rgba(0,255,0,0.5)";
const ALARM_COLOR: &str = "rgba(255,0,0,0.5)";

/// Pixel size of a model: `(width, height)`.
pub fn equipment_size(model: &EquipmentModel) -> (u32, u32) {
    (
        inches_to_px(model.width_inches),
        (f64::from(model.rack_u) * UNIT_HEIGHT_PX).floor() as u32,
    )
}

fn inches_to_px(inches: f64) -> u32 {
    ((inches / FULL_WIDTH_INCHES) * RACK_WIDTH_PX).floor().max(0.0) as u32
}

/// URL of a model descriptor under the configured URL root.
pub fn model_url(url_root: &str, model_id: &str) -> String {
    format!("{}/models/{}.json", url_root, model_id)
}

// ── Placement ───────────────────────────────────────────────────────

/// Where and how one equipment item is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentPlacement {
    pub x_px: u32,
    /// Offset from the top of the frame; `None` when the item has no valid
    /// position and is stacked in list order instead.
    pub y_px: Option<u32>,
    pub width_px: u32,
    pub height_px: u32,
    pub image_url: String,
}

/// Layout parameters of one rendered rack.
#[derive(Debug, Clone)]
pub struct RackLayout<'a> {
    url_root: &'a str,
    facing: Facing,
    flip: bool,
    rack_height: u32,
}

impl<'a> RackLayout<'a> {
    pub fn new(rack: &RackConfig, url_root: &'a str) -> Self {
        Self {
            url_root: url_root.trim_end_matches('/'),
            facing: rack.facing,
            flip: rack.flip,
            rack_height: rack.rack_height,
        }
    }

    /// Override the rack's own flip setting (dashboard cards may flip a rack).
    pub fn flipped(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn frame_height_px(&self) -> u32 {
        (f64::from(self.rack_height) * UNIT_HEIGHT_PX) as u32
    }

    /// Vertical offset of an item whose highest unit is `top_u`.
    ///
    /// Units count up from the bottom unless the rack is flipped.
    pub fn vertical_offset(&self, top_u: u32) -> Option<u32> {
        if top_u == 0 || top_u > self.rack_height {
            return None;
        }
        let units_above = if self.flip {
            top_u - 1
        } else {
            self.rack_height - top_u
        };
        Some((f64::from(units_above) * UNIT_HEIGHT_PX) as u32)
    }

    /// Which side of the device is visible: the rack's viewing side, swapped
    /// for devices mounted facing the rear.
    pub fn visible_side(&self, equipment: &EquipmentConfig) -> Facing {
        match equipment.facing.unwrap_or_default() {
            Facing::Front => self.facing,
            Facing::Rear => self.facing.opposite(),
        }
    }

    pub fn image_url(&self, equipment: &EquipmentConfig, model: &EquipmentModel) -> String {
        format!(
            "{}/models/{}_{}.{}",
            self.url_root,
            equipment.model,
            self.visible_side(equipment),
            model.img_type
        )
    }

    pub fn place(&self, equipment: &EquipmentConfig, model: &EquipmentModel) -> EquipmentPlacement {
        let (width_px, height_px) = equipment_size(model);
        EquipmentPlacement {
            x_px: inches_to_px(equipment.x_offset_inches),
            y_px: equipment.position_topu.and_then(|u| self.vertical_offset(u)),
            width_px,
            height_px,
            image_url: self.image_url(equipment, model),
        }
    }
}

// ── Status overlay ──────────────────────────────────────────────────

/// Colour overlay drawn over an equipment image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub color: &'static str,
    pub blink: bool,
}

impl StatusIndicator {
    /// Overlay for an equipment's sensor report; unmonitored equipment gets none.
    pub fn for_report(report: &SensorReport) -> Option<Self> {
        if report.is_empty() {
            None
        } else if report.is_alarm() {
            Some(Self {
                color: ALARM_COLOR,
                blink: true,
            })
        } else {
            Some(Self {
                color: NOMINAL_COLOR,
                blink: false,
            })
        }
    }
}
