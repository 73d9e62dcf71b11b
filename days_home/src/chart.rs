//! Day-box chart layout.
//!
//! Each interval row becomes one horizontal band: trip days stack leftward
//! from a shared divider (the trip's last day touches it) and home days
//! extend rightward from it. The layout is backend-neutral; writing it out is
//! left to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IntervalRow, StaysError};

/// An opaque `#rrggbb` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub u8, pub u8, pub u8);

impl FromStr for HexColor {
    type Err = StaysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StaysError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(HexColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = StaysError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChartStyle {
    /// Edge length of one day box, in pixels.
    pub box_size: u32,
    pub stroke: HexColor,
    pub stroke_width: u32,
    pub trip_fill: HexColor,
    pub home_fill: HexColor,
    /// Blank border around the whole chart, in pixels.
    pub margin: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            box_size: 8,
            stroke: HexColor(0xff, 0xff, 0xff),
            stroke_width: 1,
            trip_fill: HexColor(0x75, 0x8f, 0xd1),
            home_fill: HexColor(0x55, 0xc4, 0xb4),
            margin: 40,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoxKind {
    Trip,
    Home,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayBox {
    pub kind: BoxKind,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub fill: HexColor,
    pub stroke: HexColor,
    pub stroke_width: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartDocument {
    pub width: i64,
    pub height: i64,
    pub boxes: Vec<DayBox>,
}

/// Lay out one band of day boxes per row, top to bottom in row order.
pub fn layout_chart(
    rows: &[IntervalRow],
    style: &ChartStyle,
) -> Result<ChartDocument, StaysError> {
    let max_trip = rows
        .iter()
        .map(|row| row.trip.duration_days)
        .max()
        .ok_or(StaysError::EmptyInput)?;
    let max_home = rows
        .iter()
        .map(|row| row.home.duration_days)
        .max()
        .ok_or(StaysError::EmptyInput)?
        .max(0);

    let size = i64::from(style.box_size);
    let margin = i64::from(style.margin);
    let divider_x = margin + max_trip * size;

    let day_box = |kind: BoxKind, x: i64, y: i64| DayBox {
        kind,
        x,
        y,
        width: size,
        height: size,
        fill: match kind {
            BoxKind::Trip => style.trip_fill,
            BoxKind::Home => style.home_fill,
        },
        stroke: style.stroke,
        stroke_width: style.stroke_width,
    };

    let mut boxes = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let y = margin + row_idx as i64 * size;
        for day in 0..row.trip.duration_days {
            boxes.push(day_box(BoxKind::Trip, divider_x - (1 + day) * size, y));
        }
        // Inverted home windows carry a non-positive count and draw nothing.
        for day in 0..row.home.duration_days.max(0) {
            boxes.push(day_box(BoxKind::Home, divider_x + day * size, y));
        }
    }

    Ok(ChartDocument {
        width: 2 * margin + (max_trip + max_home) * size,
        height: 2 * margin + rows.len() as i64 * size,
        boxes,
    })
}
