use crate::core::seat_pool::{FlatPool, RoomPool, SeatPool};
use crate::domain::model::{
    AssignmentResult, Level, Roster, SeatAssignment, SeatingRules, Team, TeamId,
};
use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;

/// Maps teams to seats, using one seat out of every `skip_factor` pool slots.
///
/// Teams, rooms and seats are walked in the order given; there is no randomness,
/// so identical inputs give identical results.
#[derive(Debug, Clone)]
pub struct SeatAssignmentEngine {
    skip_factor: usize,
    separate_levels: bool,
}

impl SeatAssignmentEngine {
    pub fn new(rules: &SeatingRules) -> Result<Self> {
        validate_positive_number("rules.skip_factor", rules.skip_factor, 1)?;
        Ok(Self {
            skip_factor: rules.skip_factor,
            separate_levels: rules.separate_levels,
        })
    }

    pub fn skip_factor(&self) -> usize {
        self.skip_factor
    }

    pub fn assign_seats(&self, roster: &Roster, pool: &SeatPool) -> AssignmentResult {
        let required_seats = roster.len();
        let available_capacity = pool.usable_capacity(self.skip_factor);
        let short_up_front = available_capacity < required_seats;
        if short_up_front {
            tracing::warn!(
                "⚠️ {} teams need seats but the pool only fits {} with skip factor {}",
                required_seats,
                available_capacity,
                self.skip_factor
            );
        }

        let (assignments, unseated) = match pool {
            SeatPool::Flat(flat) => self.assign_flat(&self.flat_order(roster), flat),
            SeatPool::Rooms(rooms) => self.assign_rooms(roster, rooms),
        };

        if !unseated.is_empty() {
            tracing::warn!("⚠️ {} teams left without a seat", unseated.len());
        }

        AssignmentResult {
            insufficient_seats: short_up_front || !unseated.is_empty(),
            assignments,
            required_seats,
            available_capacity,
            unseated,
        }
    }

    /// Caller order, or level A teams first when levels are kept apart.
    fn flat_order<'a>(&self, roster: &'a Roster) -> Vec<&'a Team> {
        if self.separate_levels {
            Level::ALL
                .iter()
                .flat_map(|level| roster.teams_at(*level))
                .collect()
        } else {
            roster.teams().collect()
        }
    }

    fn assign_flat(&self, teams: &[&Team], pool: &FlatPool) -> (Vec<SeatAssignment>, Vec<TeamId>) {
        let mut assignments = Vec::new();
        let mut unseated = Vec::new();

        for (i, team) in teams.iter().enumerate() {
            // 一旦超出座位範圍，之後的隊伍都不再安排
            match pool.seats().get(i * self.skip_factor) {
                Some(code) if unseated.is_empty() => {
                    tracing::debug!("Team {} -> seat {}", team.id(), code);
                    assignments.push(SeatAssignment {
                        team_id: team.id().clone(),
                        team_name: team.name().to_string(),
                        level: team.level(),
                        seat_code: code.clone(),
                        site: pool.venue().to_string(),
                        site_capacity: pool.len(),
                    });
                }
                _ => unseated.push(team.id().clone()),
            }
        }

        (assignments, unseated)
    }

    fn assign_rooms(&self, roster: &Roster, pool: &RoomPool) -> (Vec<SeatAssignment>, Vec<TeamId>) {
        let mut assignments = Vec::new();
        let mut unseated = Vec::new();

        for level in Level::ALL {
            let pending = roster.teams_at(level);
            let mut next = 0;

            for room in pool.rooms_at(level) {
                let mut j = 0;
                while next < pending.len() {
                    let Some(code) = room.seat_codes.get(j * self.skip_factor) else {
                        break;
                    };
                    let team = pending[next];
                    let seat_code = room.qualify(code);
                    tracing::debug!("Team {} -> room {} seat {}", team.id(), room.name, seat_code);
                    assignments.push(SeatAssignment {
                        team_id: team.id().clone(),
                        team_name: team.name().to_string(),
                        level,
                        seat_code,
                        site: room.name.clone(),
                        site_capacity: room.seat_count(),
                    });
                    next += 1;
                    j += 1;
                }
            }

            if next < pending.len() {
                tracing::debug!(
                    "{} level {} teams did not fit in the level {} rooms",
                    pending.len() - next,
                    level,
                    level
                );
            }
            unseated.extend(pending[next..].iter().map(|t| t.id().clone()));
        }

        (assignments, unseated)
    }
}

/// Runs the seating engine once with `rules`.
pub fn assign_seats(
    roster: &Roster,
    pool: &SeatPool,
    rules: &SeatingRules,
) -> Result<AssignmentResult> {
    Ok(SeatAssignmentEngine::new(rules)?.assign_seats(roster, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Room, Student};

    fn team(id: &str, level: Level) -> Team {
        let members = match level {
            Level::A => vec![
                Student::new(format!("{}-1", id), "x", Level::A),
                Student::new(format!("{}-2", id), "y", Level::A),
            ],
            Level::B => vec![Student::new(format!("{}-1", id), "x", Level::B)],
        };
        Team::with_members(id, format!("Team {}", id), 4, members, 2).unwrap()
    }

    fn flat(codes: &[&str]) -> SeatPool {
        SeatPool::Flat(FlatPool::new("Hall", codes.iter().map(|c| c.to_string()).collect()).unwrap())
    }

    fn rules(k: usize, separate_levels: bool) -> SeatingRules {
        SeatingRules {
            skip_factor: k,
            separate_levels,
            ..SeatingRules::default()
        }
    }

    #[test]
    fn test_flat_every_third_seat() {
        let roster = Roster::new(vec![team("t0", Level::B), team("t1", Level::B)]).unwrap();
        let result = assign_seats(&roster, &flat(&["A", "B", "C", "D", "E", "F"]), &rules(3, true)).unwrap();

        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.assignments[0].seat_code, "A");
        assert_eq!(result.assignments[1].seat_code, "D");
        assert!(!result.insufficient_seats);
    }

    #[test]
    fn test_flat_runs_out_of_seats() {
        let roster = Roster::new(vec![team("t0", Level::B), team("t1", Level::B)]).unwrap();
        let result = assign_seats(&roster, &flat(&["A", "B", "C", "D", "E"]), &rules(3, true)).unwrap();

        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].team_id.as_str(), "t0");
        assert_eq!(result.unseated, vec![TeamId::from("t1")]);
        assert!(result.insufficient_seats);
    }

    #[test]
    fn test_precheck_flags_even_when_everyone_fits() {
        // 4 slots / k=3 = 1, but indexes 0 and 3 both exist
        let roster = Roster::new(vec![team("t0", Level::B), team("t1", Level::B)]).unwrap();
        let result = assign_seats(&roster, &flat(&["A", "B", "C", "D"]), &rules(3, true)).unwrap();

        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.available_capacity, 1);
        assert!(result.insufficient_seats);
    }

    #[test]
    fn test_flat_separate_levels_seats_a_first() {
        let roster = Roster::new(vec![team("b0", Level::B), team("a0", Level::A)]).unwrap();
        let pool = flat(&["1", "2", "3", "4"]);

        let separated = assign_seats(&roster, &pool, &rules(2, true)).unwrap();
        assert_eq!(separated.assignments[0].team_id.as_str(), "a0");

        let interleaved = assign_seats(&roster, &pool, &rules(2, false)).unwrap();
        assert_eq!(interleaved.assignments[0].team_id.as_str(), "b0");
    }

    #[test]
    fn test_rooms_respect_levels() {
        let roster = Roster::new(vec![
            team("a0", Level::A),
            team("b0", Level::B),
            team("a1", Level::A),
            team("b1", Level::B),
        ])
        .unwrap();
        let pool = SeatPool::Rooms(
            RoomPool::from_rooms(vec![
                Room::numbered("RA", Level::A, 3),
                Room::numbered("RB", Level::B, 6),
                Room::numbered("RA2", Level::A, 3),
            ])
            .unwrap(),
        );

        let result = assign_seats(&roster, &pool, &rules(3, true)).unwrap();

        let a0 = result.assignment_for(&"a0".into()).unwrap();
        assert_eq!((a0.site.as_str(), a0.seat_code.as_str()), ("RA", "RA1"));
        let a1 = result.assignment_for(&"a1".into()).unwrap();
        assert_eq!((a1.site.as_str(), a1.seat_code.as_str()), ("RA2", "RA21"));
        let b1 = result.assignment_for(&"b1".into()).unwrap();
        assert_eq!(b1.seat_code, "RB4");
        assert!(!result.insufficient_seats);
    }

    #[test]
    fn test_rooms_without_matching_level_leave_teams_unseated() {
        let roster = Roster::new(vec![team("a0", Level::A), team("b0", Level::B)]).unwrap();
        let pool = SeatPool::Rooms(RoomPool::from_rooms(vec![Room::numbered("RB", Level::B, 9)]).unwrap());

        let result = assign_seats(&roster, &pool, &rules(3, true)).unwrap();

        assert_eq!(result.unseated, vec![TeamId::from("a0")]);
        assert_eq!(result.seated_count(), 1);
        assert!(result.insufficient_seats);
    }

    #[test]
    fn test_zero_skip_factor_rejected() {
        assert!(SeatAssignmentEngine::new(&rules(0, true)).is_err());
    }
}
