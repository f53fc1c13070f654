pub mod seat_assignment;
pub mod seat_pool;
pub mod session;
pub mod transfer;

pub use crate::domain::model::{AssignmentResult, Roster, SeatAssignment, Team};
pub use crate::domain::ports::{
    ConfigProvider, Exporter, Notifier, RosterStore, Storage, StudentDirectory,
};
pub use crate::utils::error::Result;
