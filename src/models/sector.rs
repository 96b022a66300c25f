use serde::{Deserialize, Serialize};

use super::seat::Seat;

/// Declared sector type, used by the editing flow. Display/grouping uses
/// `Sector::is_standing_like` instead, which classifies by capacity
/// presence; the two can disagree (see that method).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorKind {
    #[serde(rename = "SEATED", alias = "NORMAL")]
    Seated,
    #[serde(rename = "STANDING")]
    Standing,
    #[serde(rename = "STAGE")]
    Stage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: SectorKind,
    pub name: Option<String>,
    /// Absent for STAGE sectors.
    pub price: Option<i64>,
    /// Present only for STANDING sectors.
    pub capacity: Option<i64>,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl Sector {
    /// Legacy classification rule: a sector counts as standing iff its
    /// capacity is defined, regardless of `kind`. Display grouping and
    /// cart handling depend on this looser rule, so it is kept verbatim
    /// and contained here rather than folded into the discriminant.
    pub fn is_standing_like(&self) -> bool {
        self.capacity.is_some()
    }

    /// Max row number observed among non-deleted seats (sector extent).
    pub fn max_row(&self) -> i32 {
        self.seats
            .iter()
            .filter(|s| !s.deleted)
            .map(|s| s.row_number)
            .max()
            .unwrap_or(0)
    }

    /// Max column number observed among non-deleted seats.
    pub fn max_column(&self) -> i32 {
        self.seats
            .iter()
            .filter(|s| !s.deleted)
            .map(|s| s.column_number)
            .max()
            .unwrap_or(0)
    }

    pub fn seat_at(&self, row: i32, column: i32) -> Option<&Seat> {
        self.seats
            .iter()
            .find(|s| s.row_number == row && s.column_number == column)
    }
}
