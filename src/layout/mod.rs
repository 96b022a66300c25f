//! Derived, render-ready view of a room.
//!
//! Everything here is recomputed from scratch whenever the room or the
//! buyer's cart changes; nothing in this module mutates either one.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::models::{PaymentItem, Room, Seat};

/// Min/max extent of a standing sector's placeholder seats, used to draw
/// one rectangle instead of discrete cells. Derived only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub min_row: i32,
    pub max_row: i32,
    pub min_col: i32,
    pub max_col: i32,
}

/// Render data for one standing sector.
#[derive(Debug, Clone)]
pub struct StandingBlock {
    /// Index into `Room::sectors`.
    pub sector_index: usize,
    /// None when the sector has no placeholder seats; rendering skips it.
    pub rect: Option<BoundingRect>,
    /// Quantity preselected in the UI before the buyer touches the input.
    pub default_quantity: u32,
}

#[derive(Debug, Clone)]
pub struct RoomLayout {
    pub columns: i32,
    pub rows: i32,
    pub seat_by_id: HashMap<i64, Seat>,
    /// Indices of sectors rendered as discrete seat cells.
    pub seated: Vec<usize>,
    /// Sectors rendered as one aggregate block.
    pub standing: Vec<StandingBlock>,
    /// One color per sector, aligned with `Room::sectors`. Chosen fresh
    /// on every build, stable until the next build.
    pub colors: Vec<String>,
    /// Seat ids already in the buyer's cart, for highlighting.
    pub selected_seat_ids: HashSet<i64>,
    /// Standing sector ids already in the buyer's cart.
    pub selected_standing_sector_ids: HashSet<i64>,
}

impl RoomLayout {
    pub fn build(room: &Room, cart: &[PaymentItem]) -> RoomLayout {
        let seat_by_id: HashMap<i64, Seat> = room
            .seats
            .iter()
            .filter_map(|s| s.id.map(|id| (id, s.clone())))
            .collect();

        let mut seated = Vec::new();
        let mut standing = Vec::new();
        for (index, sector) in room.sectors.iter().enumerate() {
            // Grouping goes by capacity presence, not by the declared
            // type (see Sector::is_standing_like).
            if sector.is_standing_like() {
                standing.push(StandingBlock {
                    sector_index: index,
                    rect: bounding_rect(&sector.seats),
                    default_quantity: 1,
                });
            } else {
                seated.push(index);
            }
        }

        let (selected_seat_ids, selected_standing_sector_ids) = selected_ids(cart);

        RoomLayout {
            columns: room.x_size,
            rows: room.y_size,
            seat_by_id,
            seated,
            standing,
            colors: assign_colors(room.sectors.len()),
            selected_seat_ids,
            selected_standing_sector_ids,
        }
    }

    pub fn color_of(&self, sector_index: usize) -> Option<&str> {
        self.colors.get(sector_index).map(String::as_str)
    }

    /// Whether a seat's coordinate falls inside the room grid.
    pub fn in_bounds(&self, seat: &Seat) -> bool {
        seat.row_number >= 1
            && seat.row_number <= self.rows
            && seat.column_number >= 1
            && seat.column_number <= self.columns
    }
}

/// Extent of a seat collection. Empty input short-circuits to None so a
/// standing sector without placeholders renders as nothing instead of
/// producing a degenerate rectangle.
fn bounding_rect(seats: &[Seat]) -> Option<BoundingRect> {
    if seats.is_empty() {
        return None;
    }
    let mut rect = BoundingRect {
        min_row: i32::MAX,
        max_row: i32::MIN,
        min_col: i32::MAX,
        max_col: i32::MIN,
    };
    for seat in seats {
        rect.min_row = rect.min_row.min(seat.row_number);
        rect.max_row = rect.max_row.max(seat.row_number);
        rect.min_col = rect.min_col.min(seat.column_number);
        rect.max_col = rect.max_col.max(seat.column_number);
    }
    Some(rect)
}

/// Seat ids and standing sector ids present in the cart, for rendering
/// selection state. Read-only over the cart.
fn selected_ids(cart: &[PaymentItem]) -> (HashSet<i64>, HashSet<i64>) {
    let mut seat_ids = HashSet::new();
    let mut sector_ids = HashSet::new();
    for item in cart {
        match item {
            PaymentItem::Seated { seat_id, .. } => {
                seat_ids.insert(*seat_id);
            }
            PaymentItem::Standing { sector_id, .. } => {
                sector_ids.insert(*sector_id);
            }
        }
    }
    (seat_ids, sector_ids)
}

// Fresh random hue per sector per build. Cosmetic and intentionally not
// stable across builds; hues are drawn without replacement so two
// sectors never share one within a build.
fn assign_colors(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut used: HashSet<i32> = HashSet::new();
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        let hue = loop {
            let candidate = rng.gen_range(0..360);
            if used.insert(candidate) || used.len() >= 360 {
                break candidate;
            }
        };
        colors.push(format!("hsl({}, 70%, 55%)", hue));
    }
    colors
}
