use crate::core::{RosterStore, Storage, StudentDirectory};
use crate::domain::model::{
    Roster, RosterDocument, SeatingRules, Student, StudentId, Team, TeamRecord,
};
use crate::utils::error::{Result, SeatingError};
use async_trait::async_trait;
use std::collections::HashMap;

/// Student directory held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    students: HashMap<StudentId, Student>,
}

impl InMemoryDirectory {
    pub fn new(students: impl IntoIterator<Item = Student>) -> Result<Self> {
        let mut map = HashMap::new();
        for student in students {
            if let Some(previous) = map.insert(student.id.clone(), student) {
                return Err(SeatingError::ValidationError {
                    message: format!("student id {} is registered twice", previous.id),
                });
            }
        }
        Ok(Self { students: map })
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

impl StudentDirectory for InMemoryDirectory {
    fn student(&self, id: &StudentId) -> Option<Student> {
        self.students.get(id).cloned()
    }
}

/// Resolves team membership through `directory`; levels are always rederived.
pub fn roster_from_document(
    document: &RosterDocument,
    directory: &dyn StudentDirectory,
    rules: &SeatingRules,
) -> Result<Roster> {
    let teams = document
        .teams
        .iter()
        .map(|record| {
            let members = record
                .members
                .iter()
                .map(|id| {
                    directory
                        .student(id)
                        .ok_or_else(|| SeatingError::not_found("student", id.as_str()))
                })
                .collect::<Result<Vec<_>>>()?;
            Team::with_members(
                record.id.clone(),
                record.name.clone(),
                record.capacity.unwrap_or(rules.team_capacity),
                members,
                rules.level_a_min_members,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Roster::new(teams)
}

/// Replaces the team section of `base`, keeping its student list.
pub fn roster_to_document(roster: &Roster, base: &RosterDocument, rules: &SeatingRules) -> RosterDocument {
    let teams = roster
        .teams()
        .map(|team| TeamRecord {
            id: team.id().clone(),
            name: team.name().to_string(),
            members: team.members().iter().map(|s| s.id.clone()).collect(),
            capacity: (team.capacity() != rules.team_capacity).then_some(team.capacity()),
        })
        .collect();

    RosterDocument {
        students: base.students.clone(),
        teams,
    }
}

/// Roster persisted as a JSON [`RosterDocument`] through a [`Storage`].
pub struct JsonRosterStore<S: Storage> {
    storage: S,
    path: String,
    rules: SeatingRules,
}

impl<S: Storage> JsonRosterStore<S> {
    pub fn new(storage: S, path: impl Into<String>, rules: SeatingRules) -> Self {
        Self {
            storage,
            path: path.into(),
            rules,
        }
    }

    pub async fn read_document(&self) -> Result<RosterDocument> {
        let data = self.storage.read_file(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl<S: Storage> RosterStore for JsonRosterStore<S> {
    async fn load(&self) -> Result<Roster> {
        tracing::debug!("Reading roster from {}", self.path);
        let document = self.read_document().await?;
        let directory = InMemoryDirectory::new(document.students.iter().cloned())?;
        tracing::debug!(
            "Roster document has {} students and {} teams",
            directory.len(),
            document.teams.len()
        );
        roster_from_document(&document, &directory, &self.rules)
    }

    async fn save(&self, roster: &Roster) -> Result<()> {
        let base = self.read_document().await?;
        let document = roster_to_document(roster, &base, &self.rules);
        let json = serde_json::to_vec_pretty(&document)?;
        self.storage.write_file(&self.path, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::Level;
    use tempfile::TempDir;

    fn document() -> RosterDocument {
        serde_json::from_value(serde_json::json!({
            "students": [
                {"id": "s1", "name": "Ada", "level": "A"},
                {"id": "s2", "name": "Brian", "level": "A"},
                {"id": "s3", "name": "Cleo", "level": "B"}
            ],
            "teams": [
                {"id": "t1", "name": "Lambda", "members": ["s1", "s2"]},
                {"id": "t2", "name": "Kappa", "members": ["s3"], "capacity": 3}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_levels_are_derived_on_load() {
        let doc = document();
        let directory = InMemoryDirectory::new(doc.students.clone()).unwrap();
        let roster = roster_from_document(&doc, &directory, &SeatingRules::default()).unwrap();

        assert_eq!(roster.team(&"t1".into()).unwrap().level(), Level::A);
        assert_eq!(roster.team(&"t2".into()).unwrap().level(), Level::B);
        assert_eq!(roster.team(&"t2".into()).unwrap().capacity(), 3);
        assert_eq!(directory.level_preference(&"s3".into()), Some(Level::B));
    }

    #[test]
    fn test_unknown_member_is_not_found() {
        let mut doc = document();
        doc.teams[0].members.push("ghost".into());
        let directory = InMemoryDirectory::new(doc.students.clone()).unwrap();

        let err = roster_from_document(&doc, &directory, &SeatingRules::default()).unwrap_err();
        assert!(matches!(err, SeatingError::NotFound { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn test_over_capacity_team_rejected() {
        let doc = document();
        let directory = InMemoryDirectory::new(doc.students.clone()).unwrap();
        let rules = SeatingRules {
            team_capacity: 1,
            ..SeatingRules::default()
        };

        let err = roster_from_document(&doc, &directory, &rules).unwrap_err();
        assert!(matches!(err, SeatingError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn test_save_keeps_student_list() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        std::fs::write(
            dir.path().join("roster.json"),
            serde_json::to_vec(&document()).unwrap(),
        )
        .unwrap();

        let store = JsonRosterStore::new(storage, "roster.json", SeatingRules::default());
        let roster = store.load().await.unwrap();
        store.save(&roster).await.unwrap();

        let saved = store.read_document().await.unwrap();
        assert_eq!(saved, document());
    }
}
