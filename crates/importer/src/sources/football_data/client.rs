use std::time::Duration;

use super::models::StandingsResponse;
use crate::error::{ImporterError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org";

pub struct FootballDataClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl FootballDataClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("league-predictor/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            token,
            client,
        })
    }

    pub fn standings_url(&self, competition_code: &str) -> String {
        format!(
            "{}/v4/competitions/{}/standings",
            self.base_url.trim_end_matches('/'),
            competition_code
        )
    }

    pub async fn fetch_standings(&self, competition_code: &str) -> Result<StandingsResponse> {
        let url = self.standings_url(competition_code);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("X-Auth-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImporterError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let data = serde_json::from_str::<StandingsResponse>(&body)?;

        Ok(data)
    }
}
