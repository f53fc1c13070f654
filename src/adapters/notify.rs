use crate::core::Notifier;
use crate::domain::model::{Level, SeatAssignment, Team};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// What a team is told about its seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatNotice {
    pub team_id: String,
    pub team_name: String,
    pub level: Level,
    pub members: Vec<String>,
    pub seated: bool,
    pub site: Option<String>,
    pub seat: Option<String>,
}

impl SeatNotice {
    pub fn new(team: &Team, assignment: Option<&SeatAssignment>) -> Self {
        Self {
            team_id: team.id().to_string(),
            team_name: team.name().to_string(),
            level: team.level(),
            members: team.members().iter().map(|s| s.name.clone()).collect(),
            seated: assignment.is_some(),
            site: assignment.map(|a| a.site.clone()),
            seat: assignment.map(|a| a.seat_code.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, team: &Team, assignment: Option<&SeatAssignment>) -> Result<()> {
        match assignment {
            Some(a) => tracing::info!("📨 {} ({}) -> {} seat {}", team.name(), team.id(), a.site, a.seat_code),
            None => tracing::warn!("📨 {} ({}) has no seat", team.name(), team.id()),
        }
        Ok(())
    }
}

/// POSTs one JSON [`SeatNotice`] per team to a fixed URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, team: &Team, assignment: Option<&SeatAssignment>) -> Result<()> {
        let notice = SeatNotice::new(team, assignment);
        tracing::debug!("Posting seat notice for {} to {}", notice.team_id, self.url);

        self.client
            .post(&self.url)
            .json(&notice)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Student, TeamId};
    use httpmock::prelude::*;

    fn team() -> Team {
        Team::with_members(
            "t1",
            "Lambda",
            4,
            vec![
                Student::new("s1", "Ada", Level::A),
                Student::new("s2", "Brian", Level::A),
            ],
            2,
        )
        .unwrap()
    }

    fn seat() -> SeatAssignment {
        SeatAssignment {
            team_id: TeamId::from("t1"),
            team_name: "Lambda".to_string(),
            level: Level::A,
            seat_code: "R14".to_string(),
            site: "R1".to_string(),
            site_capacity: 12,
        }
    }

    #[test]
    fn test_notice_for_unseated_team() {
        let notice = SeatNotice::new(&team(), None);
        assert!(!notice.seated);
        assert_eq!(notice.seat, None);
        assert_eq!(notice.members, vec!["Ada", "Brian"]);
    }

    #[tokio::test]
    async fn test_webhook_posts_notice() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST)
                .path("/seats")
                .json_body_partial(r#"{"team_id": "t1", "seat": "R14", "seated": true}"#);
            then.status(204);
        });

        let notifier = WebhookNotifier::new(server.url("/seats"));
        notifier.notify(&team(), Some(&seat())).await.unwrap();

        hook.assert();
    }

    #[tokio::test]
    async fn test_webhook_failure_is_reported() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/seats");
            then.status(500);
        });

        let notifier = WebhookNotifier::new(server.url("/seats"));
        let err = notifier.notify(&team(), None).await.unwrap_err();

        hook.assert();
        assert!(matches!(err, crate::utils::error::SeatingError::HttpError(_)));
    }
}
