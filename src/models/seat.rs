use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: Option<i64>,
    pub row_number: i32,
    pub column_number: i32,
    pub deleted: bool,
    pub sector_id: Option<i64>,
    pub room_id: Option<i64>,
}

impl Seat {
    // Fresh, unsaved seat; id stays None until the backend assigns one
    pub fn new(row_number: i32, column_number: i32, sector_id: Option<i64>, room_id: Option<i64>) -> Self {
        Self {
            id: None,
            row_number,
            column_number,
            deleted: false,
            sector_id,
            room_id,
        }
    }
}
