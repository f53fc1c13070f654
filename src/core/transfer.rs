use crate::domain::model::{Roster, SeatingRules, Student, StudentId, TeamId, TransferRequest};
use crate::utils::error::{Result, SeatingError};

/// Moves students between teams, producing a new roster snapshot per move.
///
/// The input roster is never touched; dropping the returned snapshot undoes the move.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    rules: SeatingRules,
}

impl TransferEngine {
    pub fn new(rules: SeatingRules) -> Result<Self> {
        rules.validate_level_thresholds()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &SeatingRules {
        &self.rules
    }

    pub fn transfer(
        &self,
        student: &Student,
        from: &TeamId,
        to: &TeamId,
        roster: &Roster,
    ) -> Result<Roster> {
        if from == to {
            return Err(SeatingError::InvalidTransfer {
                message: format!("student {} is already in team {}", student.id, from),
            });
        }

        let source = roster
            .team(from)
            .ok_or_else(|| SeatingError::not_found("team", from.as_str()))?;
        let destination = roster
            .team(to)
            .ok_or_else(|| SeatingError::not_found("team", to.as_str()))?;

        // 以來源隊伍中的紀錄為準
        let moving = source
            .member(&student.id)
            .ok_or_else(|| SeatingError::not_found("student", student.id.as_str()))?
            .clone();

        if destination.len() >= destination.capacity() {
            return Err(SeatingError::CapacityExceeded {
                team_id: to.to_string(),
                capacity: destination.capacity(),
            });
        }

        let destination = destination.with_added(moving, self.rules.level_a_min_members);
        let source = source.with_removed(&student.id, self.rules.source_level_a_min_members);

        tracing::debug!(
            "Moved {} from {} (now {} members, level {}) to {} (now {} members, level {})",
            student.id,
            source.id(),
            source.len(),
            source.level(),
            destination.id(),
            destination.len(),
            destination.level()
        );

        Ok(roster.replacing(&[source, destination]))
    }

    /// Like [`transfer`](Self::transfer), resolving the student from the source team.
    pub fn transfer_by_id(
        &self,
        student_id: &StudentId,
        from: &TeamId,
        to: &TeamId,
        roster: &Roster,
    ) -> Result<Roster> {
        if from == to {
            return Err(SeatingError::InvalidTransfer {
                message: format!("student {} is already in team {}", student_id, from),
            });
        }
        let student = roster
            .team(from)
            .ok_or_else(|| SeatingError::not_found("team", from.as_str()))?
            .member(student_id)
            .ok_or_else(|| SeatingError::not_found("student", student_id.as_str()))?
            .clone();
        self.transfer(&student, from, to, roster)
    }

    /// Applies transfers in order, stopping at the first failure.
    pub fn apply_all(&self, requests: &[TransferRequest], roster: &Roster) -> Result<Roster> {
        requests.iter().try_fold(roster.clone(), |current, request| {
            self.transfer_by_id(&request.student, &request.from, &request.to, &current)
        })
    }
}
