pub mod cart;
pub mod room;
pub mod seat;
pub mod sector;

pub use cart::{PaymentItem, ReservedTicket};
pub use room::Room;
pub use seat::Seat;
pub use sector::{Sector, SectorKind};
