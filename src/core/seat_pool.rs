use crate::domain::model::{AssignmentMode, Level, Room};
use crate::utils::error::{Result, SeatingError};
use serde::Serialize;
use std::collections::HashSet;

/// Ordered seat codes of a single, undivided venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatPool {
    venue: String,
    seats: Vec<String>,
}

impl FlatPool {
    pub fn new(venue: impl Into<String>, seats: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for code in &seats {
            if !seen.insert(code.as_str()) {
                return Err(SeatingError::DuplicateSeatCode { code: code.clone() });
            }
        }
        Ok(Self {
            venue: venue.into(),
            seats,
        })
    }

    /// Venue whose seats are numbered `1..=count`.
    pub fn numbered(venue: impl Into<String>, count: usize) -> Self {
        Self {
            venue: venue.into(),
            seats: (1..=count).map(|n| n.to_string()).collect(),
        }
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn seats(&self) -> &[String] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// Level-tagged rooms, plus the qualified `<roomName><code>` view of all their seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomPool {
    rooms: Vec<Room>,
    flat_view: Vec<String>,
}

impl RoomPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rooms(rooms: impl IntoIterator<Item = Room>) -> Result<Self> {
        rooms
            .into_iter()
            .try_fold(RoomPool::new(), |pool, room| pool.add_room(room))
    }

    /// Returns a pool with `room` appended. `self` is left as it was on both paths.
    pub fn add_room(&self, room: Room) -> Result<RoomPool> {
        if self.room(&room.name, room.level).is_some() {
            return Err(SeatingError::DuplicateRoom {
                name: room.name,
                level: room.level.to_string(),
            });
        }

        let mut taken: HashSet<&str> = self.flat_view.iter().map(String::as_str).collect();
        let qualified: Vec<String> = room.qualified_codes().collect();
        for code in &qualified {
            if !taken.insert(code.as_str()) {
                return Err(SeatingError::DuplicateSeatCode { code: code.clone() });
            }
        }

        tracing::debug!(
            "Added room {} (level {}, {} seats)",
            room.name,
            room.level,
            room.seat_count()
        );

        let mut rooms = self.rooms.clone();
        rooms.push(room);
        let mut flat_view = self.flat_view.clone();
        flat_view.extend(qualified);
        Ok(RoomPool { rooms, flat_view })
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn rooms_at(&self, level: Level) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.level == level)
    }

    pub fn room(&self, name: &str, level: Level) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name && r.level == level)
    }

    pub fn flat_view(&self) -> &[String] {
        &self.flat_view
    }

    pub fn total_seats(&self) -> usize {
        self.flat_view.len()
    }
}

/// Free-function form of [`RoomPool::add_room`].
pub fn add_room(pool: &RoomPool, room: Room) -> Result<RoomPool> {
    pool.add_room(room)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeatPool {
    Flat(FlatPool),
    Rooms(RoomPool),
}

impl SeatPool {
    pub fn mode(&self) -> AssignmentMode {
        match self {
            SeatPool::Flat(_) => AssignmentMode::Flat,
            SeatPool::Rooms(_) => AssignmentMode::Rooms,
        }
    }

    pub fn total_seats(&self) -> usize {
        match self {
            SeatPool::Flat(pool) => pool.len(),
            SeatPool::Rooms(pool) => pool.total_seats(),
        }
    }

    /// Teams the pool can take when one seat is used per `skip_factor` slots.
    pub fn usable_capacity(&self, skip_factor: usize) -> usize {
        let k = skip_factor.max(1);
        match self {
            SeatPool::Flat(pool) => pool.len() / k,
            SeatPool::Rooms(pool) => pool.rooms().iter().map(|r| r.seat_count() / k).sum(),
        }
    }
}
