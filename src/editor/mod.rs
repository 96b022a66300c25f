//! Operator-side editing of a room.
//!
//! The editor owns an in-memory `Room` and a single `Selection`: at most
//! one of {selected sector, selected seat, new-sector draft} is active at
//! a time, which the tagged union enforces structurally. All numeric
//! input is validated locally before any mutation; a validation failure
//! leaves both the room and the selection untouched. After a successful
//! add/edit/delete the caller pushes the whole room through the sync
//! protocol (`sync::RoomSession`) — a failed save neither reverts the
//! in-memory edit nor advances the UI.

use validator::Validate;

use crate::error::EngineError;
use crate::models::{Room, Seat, Sector, SectorKind};

/// Draft fields for the sector being added or edited. Which fields are
/// meaningful depends on the kind: seated sectors use rows/seats-per-row,
/// standing sectors use capacity, stage sectors carry no price.
#[derive(Debug, Clone, Validate)]
pub struct SectorForm {
    pub kind: SectorKind,
    pub name: Option<String>,
    #[validate(range(min = 1, max = 200, message = "rows must be between 1 and 200"))]
    pub rows: i32,
    #[validate(range(min = 1, max = 100, message = "seats per row must be between 1 and 100"))]
    pub seats_per_row: i32,
    #[validate(range(min = 1, max = 9999, message = "capacity must be between 1 and 9999"))]
    pub capacity: i64,
    #[validate(range(min = 1, max = 9999, message = "price must be between 1 and 9999"))]
    pub price: i64,
}

impl SectorForm {
    /// Default extents for a brand new sector draft.
    pub fn draft() -> Self {
        Self {
            kind: SectorKind::Seated,
            name: None,
            rows: 1,
            seats_per_row: 1,
            capacity: 1,
            price: 1,
        }
    }

    fn seeded_from(sector: &Sector) -> Self {
        Self {
            kind: sector.kind,
            name: sector.name.clone(),
            rows: sector.max_row().max(1),
            seats_per_row: sector.max_column().max(1),
            capacity: sector.capacity.unwrap_or(1),
            price: sector.price.unwrap_or(1),
        }
    }

    // Only the fields the current kind actually uses participate in
    // validation; the rest are disabled inputs.
    fn active_fields(&self) -> &'static [&'static str] {
        match self.kind {
            SectorKind::Seated => &["rows", "seats_per_row", "price"],
            SectorKind::Standing => &["capacity", "price"],
            SectorKind::Stage => &["rows", "seats_per_row"],
        }
    }

    pub fn check(&self) -> Result<(), EngineError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let active = self.active_fields();
        let mut messages = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            if !active.contains(&field.as_ref()) {
                continue;
            }
            for e in field_errors {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is out of range", field));
                messages.push(message);
            }
        }
        messages.sort();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(messages))
        }
    }
}

/// Current editing mode. Selecting a seat clears any selected sector and
/// vice versa — the variants make the states mutually exclusive.
#[derive(Debug, Clone)]
pub enum Selection {
    Idle,
    Sector { index: usize, form: SectorForm },
    Seat { sector_index: usize, row: i32, column: i32 },
    AddingSector { form: SectorForm },
}

pub struct RoomEditor {
    room: Room,
    selection: Selection,
}

impl RoomEditor {
    pub fn new(mut room: Room) -> Self {
        room.normalize();
        Self { room, selection: Selection::Idle }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Replace local state with the backend's canonical room (after a
    /// save or refetch). Any in-progress selection is dropped.
    pub fn replace_room(&mut self, mut room: Room) {
        room.normalize();
        self.room = room;
        self.selection = Selection::Idle;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The form currently open for editing, if any.
    pub fn form_mut(&mut self) -> Option<&mut SectorForm> {
        match &mut self.selection {
            Selection::Sector { form, .. } | Selection::AddingSector { form } => Some(form),
            _ => None,
        }
    }

    /// Focus a sector for editing, seeding the form from its current
    /// extent (max row/column among non-deleted seats, or capacity).
    pub fn select_sector(&mut self, index: usize) -> Result<(), EngineError> {
        let sector = self.room.sectors.get(index).ok_or(EngineError::UnknownSector(index))?;
        self.selection = Selection::Sector { index, form: SectorForm::seeded_from(sector) };
        Ok(())
    }

    /// Focus an individual seat for deletion; clears any sector focus.
    pub fn select_seat(&mut self, sector_index: usize, row: i32, column: i32) -> Result<(), EngineError> {
        let sector = self
            .room
            .sectors
            .get(sector_index)
            .ok_or(EngineError::UnknownSector(sector_index))?;
        if sector.seat_at(row, column).is_none() {
            return Err(EngineError::UnknownSeat);
        }
        self.selection = Selection::Seat { sector_index, row, column };
        Ok(())
    }

    pub fn start_add_sector(&mut self) {
        self.selection = Selection::AddingSector { form: SectorForm::draft() };
    }

    pub fn cancel(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Commit the open form. For a new sector the draft is appended to
    /// the room; for an existing one the edit is applied in place, except
    /// that a type change rebuilds the sector fresh (price carried over).
    /// Validation failures leave the machine in its current mode.
    pub fn submit(&mut self) -> Result<(), EngineError> {
        match self.selection.clone() {
            Selection::AddingSector { form } => {
                form.check()?;
                let sector = build_sector(&form, None, self.room.id);
                self.room.sectors.push(sector);
            }
            Selection::Sector { index, form } => {
                form.check()?;
                let room_id = self.room.id;
                let sector = self
                    .room
                    .sectors
                    .get_mut(index)
                    .ok_or(EngineError::UnknownSector(index))?;
                if form.kind != sector.kind {
                    // Retyping: fresh grid or fresh capacity, same id.
                    *sector = build_sector(&form, sector.id, room_id);
                } else {
                    apply_in_place(sector, &form, room_id);
                }
            }
            Selection::Idle | Selection::Seat { .. } => return Ok(()),
        }
        self.room.refresh_seats();
        self.selection = Selection::Idle;
        Ok(())
    }

    /// Soft-delete the focused seat. The seat stays in the collections
    /// with its flag set so identity and history survive regeneration.
    pub fn delete_seat(&mut self) -> Result<(), EngineError> {
        let Selection::Seat { sector_index, row, column } = self.selection else {
            return Err(EngineError::UnknownSeat);
        };
        let sector = self
            .room
            .sectors
            .get_mut(sector_index)
            .ok_or(EngineError::UnknownSector(sector_index))?;
        let seat = sector
            .seats
            .iter_mut()
            .find(|s| s.row_number == row && s.column_number == column)
            .ok_or(EngineError::UnknownSeat)?;
        seat.deleted = true;
        self.room.refresh_seats();
        self.selection = Selection::Idle;
        Ok(())
    }

    /// Remove the focused sector from the room. Its seats are unassigned
    /// (sector reference cleared), not deleted.
    pub fn delete_sector(&mut self) -> Result<(), EngineError> {
        let Selection::Sector { index, .. } = self.selection else {
            // No sector focused, nothing to remove.
            return Ok(());
        };
        if index >= self.room.sectors.len() {
            return Err(EngineError::UnknownSector(index));
        }
        let removed = self.room.sectors.remove(index);
        for seat in &mut self.room.seats {
            if removed.id.is_some() && seat.sector_id == removed.id {
                seat.sector_id = None;
            }
        }
        self.room.refresh_seats();
        self.selection = Selection::Idle;
        Ok(())
    }
}

fn build_sector(form: &SectorForm, id: Option<i64>, room_id: Option<i64>) -> Sector {
    match form.kind {
        SectorKind::Seated => Sector {
            id,
            kind: SectorKind::Seated,
            name: form.name.clone(),
            price: Some(form.price),
            capacity: None,
            seats: generate_grid(form.rows, form.seats_per_row, id, room_id, &[]),
        },
        SectorKind::Standing => Sector {
            id,
            kind: SectorKind::Standing,
            name: form.name.clone(),
            price: Some(form.price),
            capacity: Some(form.capacity),
            seats: Vec::new(),
        },
        SectorKind::Stage => Sector {
            id,
            kind: SectorKind::Stage,
            name: form.name.clone(),
            price: None,
            capacity: None,
            seats: generate_grid(form.rows, form.seats_per_row, id, room_id, &[]),
        },
    }
}

fn apply_in_place(sector: &mut Sector, form: &SectorForm, room_id: Option<i64>) {
    sector.name = form.name.clone();
    match form.kind {
        SectorKind::Standing => {
            sector.capacity = Some(form.capacity);
            sector.price = Some(form.price);
        }
        SectorKind::Seated => {
            sector.price = Some(form.price);
            sector.seats =
                generate_grid(form.rows, form.seats_per_row, sector.id, room_id, &sector.seats);
        }
        SectorKind::Stage => {
            sector.price = None;
            sector.seats =
                generate_grid(form.rows, form.seats_per_row, sector.id, room_id, &sector.seats);
        }
    }
}

/// Regenerate a rows×columns seat grid. A seat whose coordinate already
/// exists keeps its id and deletion flag; new coordinates get fresh
/// unsaved seats; coordinates outside the new grid are dropped from the
/// in-memory sector (their backend-side deletion is a save concern).
fn generate_grid(
    rows: i32,
    columns: i32,
    sector_id: Option<i64>,
    room_id: Option<i64>,
    existing: &[Seat],
) -> Vec<Seat> {
    let by_coordinate: std::collections::HashMap<(i32, i32), &Seat> = existing
        .iter()
        .map(|s| ((s.row_number, s.column_number), s))
        .collect();
    let mut seats = Vec::with_capacity((rows * columns) as usize);
    for row in 1..=rows {
        for column in 1..=columns {
            match by_coordinate.get(&(row, column)) {
                Some(&old) => {
                    let mut kept = old.clone();
                    kept.sector_id = sector_id;
                    kept.room_id = room_id;
                    seats.push(kept);
                }
                None => seats.push(Seat::new(row, column, sector_id, room_id)),
            }
        }
    }
    seats
}
