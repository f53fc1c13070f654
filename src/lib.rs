pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::SessionConfig;

pub use adapters::{
    export::AssignmentExporter,
    notify::{LogNotifier, WebhookNotifier},
    roster_store::JsonRosterStore,
    storage::LocalStorage,
};
pub use crate::core::{
    seat_assignment::{assign_seats, SeatAssignmentEngine},
    seat_pool::{add_room, FlatPool, RoomPool, SeatPool},
    session::{SeatingSession, SessionReport},
    transfer::TransferEngine,
};
pub use domain::model::{
    AssignmentResult, Level, Room, Roster, SeatAssignment, SeatingRules, Student, Team,
};
pub use utils::error::{Result, SeatingError};
