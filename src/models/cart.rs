use serde::{Deserialize, Serialize};

/// One unit of buyer intent. Seated items address a concrete seat; the
/// row/column pair is carried for display only. Standing items address a
/// whole sector with a chosen quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentItem {
    #[serde(rename = "seated", rename_all = "camelCase")]
    Seated {
        show_id: i64,
        sector_id: i64,
        seat_id: i64,
        price: i64,
        row: i32,
        column: i32,
    },
    #[serde(rename = "standing", rename_all = "camelCase")]
    Standing {
        show_id: i64,
        sector_id: i64,
        price: i64,
        quantity: u32,
    },
}

impl PaymentItem {
    pub fn show_id(&self) -> i64 {
        match self {
            PaymentItem::Seated { show_id, .. } | PaymentItem::Standing { show_id, .. } => *show_id,
        }
    }

    pub fn line_total(&self) -> i64 {
        match self {
            PaymentItem::Seated { price, .. } => *price,
            PaymentItem::Standing { price, quantity, .. } => price * i64::from(*quantity),
        }
    }
}

/// A ticket already held by a backend-side reservation, as returned when
/// the buyer opens a reservation to convert it into a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedTicket {
    pub id: i64,
    pub show_id: i64,
    pub sector_id: i64,
    pub seat_id: Option<i64>,
    pub price: i64,
    pub row: Option<i32>,
    pub column: Option<i32>,
}
