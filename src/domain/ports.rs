use crate::core::seat_pool::SeatPool;
use crate::domain::model::{
    AssignmentResult, Level, Roster, SeatAssignment, SeatingRules, Student, StudentId, Team,
    TransferRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn competition_name(&self) -> &str;
    fn rules(&self) -> &SeatingRules;
    fn transfers(&self) -> &[TransferRequest];
    fn seat_pool(&self) -> Result<SeatPool>;
}

/// Level preference lookup for registered students.
pub trait StudentDirectory: Send + Sync {
    fn student(&self, id: &StudentId) -> Option<Student>;

    fn level_preference(&self, id: &StudentId) -> Option<Level> {
        self.student(id).map(|s| s.level)
    }
}

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn load(&self) -> Result<Roster>;
    async fn save(&self, roster: &Roster) -> Result<()>;
}

/// Receives the seating outcome once per team; `None` means the team got no seat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, team: &Team, assignment: Option<&SeatAssignment>) -> Result<()>;
}

/// Writes an assignment result somewhere; returns the locations written.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, competition: &str, result: &AssignmentResult) -> Result<Vec<String>>;
}
