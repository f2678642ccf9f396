mod client;
mod models;
mod spec;
mod transformer;

pub use client::{DEFAULT_BASE_URL, FootballDataClient};
pub use models::*;
pub use spec::{CompetitionCode, FootballDataSpec, TeamNaming};
pub use transformer::FootballDataTransformer;

use async_trait::async_trait;
use storage::error::ProviderError;
use storage::models::RawStanding;
use storage::traits::StandingsProvider;
use tracing::{info, warn};

use crate::Result;

/// Live standings from football-data.org for one configured league.
pub struct FootballDataImporter {
    client: FootballDataClient,
    spec: FootballDataSpec,
}

impl FootballDataImporter {
    pub fn new(client: FootballDataClient, spec: FootballDataSpec) -> Self {
        Self { client, spec }
    }

    pub fn spec(&self) -> &FootballDataSpec {
        &self.spec
    }

    pub async fn fetch(&self) -> Result<Vec<RawStanding>> {
        let competition = self.spec.competition();
        info!("Fetching {} standings from football-data.org", competition);

        let response = self.client.fetch_standings(competition.as_str()).await?;
        if let Some(season) = &response.season {
            info!(
                "Season {}..{} at matchday {:?}",
                season.start_date, season.end_date, season.current_matchday
            );
        }

        let rows = FootballDataTransformer::new(self.spec.naming()).transform(response)?;
        if rows.len() != competition.team_count() {
            warn!(
                "{} table lists {} teams, expected {}",
                competition,
                rows.len(),
                competition.team_count()
            );
        }

        Ok(rows)
    }
}

#[async_trait]
impl StandingsProvider for FootballDataImporter {
    async fn fetch_standings(&self) -> std::result::Result<Vec<RawStanding>, ProviderError> {
        self.fetch().await.map_err(ProviderError::from)
    }

    fn name(&self) -> &'static str {
        "football-data.org"
    }
}
