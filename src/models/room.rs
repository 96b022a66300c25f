use serde::{Deserialize, Serialize};

use super::seat::Seat;
use super::sector::Sector;

/// A venue layout: fixed grid dimensions, a set of sectors, a set of
/// seats. The unit of persistence — saved as one full replace, and the
/// backend's response unconditionally becomes the new local truth.
///
/// Seats appear both in the flat `seats` list and inside their owning
/// sector's sub-collection; `refresh_seats` keeps the two consistent
/// after sector-level edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Option<i64>,
    pub name: String,
    pub x_size: i32,
    pub y_size: i32,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl Room {
    pub fn new(name: impl Into<String>, x_size: i32, y_size: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            x_size,
            y_size,
            sectors: Vec::new(),
            seats: Vec::new(),
        }
    }

    /// Fan the flat seat list back out into the sector sub-collections.
    /// Rooms on the wire may carry seats only at the room level; editing
    /// and geometry read the sector-owned lists, so a sector that arrived
    /// empty is populated from the flat list by its sector reference.
    pub fn normalize(&mut self) {
        for sector in &mut self.sectors {
            if !sector.seats.is_empty() {
                continue;
            }
            if let Some(id) = sector.id {
                sector.seats = self
                    .seats
                    .iter()
                    .filter(|s| s.sector_id == Some(id))
                    .cloned()
                    .collect();
            }
        }
    }

    /// Rebuild the flat seat list from the sector sub-collections,
    /// carrying over seats that belong to no sector (unassigned ones
    /// survive sector deletion).
    pub fn refresh_seats(&mut self) {
        let owned: Vec<&Seat> = self.sectors.iter().flat_map(|s| s.seats.iter()).collect();
        let mut flat: Vec<Seat> = self
            .seats
            .iter()
            .filter(|s| s.sector_id.is_none() && !owned.contains(s))
            .cloned()
            .collect();
        flat.extend(owned.into_iter().cloned());
        self.seats = flat;
    }
}
