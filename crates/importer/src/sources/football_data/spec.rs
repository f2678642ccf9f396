use crate::ImporterError;

/// Leagues available on the football-data.org free tier with a single
/// round-robin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompetitionCode {
    PremierLeague,
    Championship,
    LaLiga,
    Bundesliga,
    SerieA,
    Ligue1,
}

impl CompetitionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PremierLeague => "PL",
            Self::Championship => "ELC",
            Self::LaLiga => "PD",
            Self::Bundesliga => "BL1",
            Self::SerieA => "SA",
            Self::Ligue1 => "FL1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PremierLeague => "Premier League",
            Self::Championship => "Championship",
            Self::LaLiga => "Primera Division",
            Self::Bundesliga => "Bundesliga",
            Self::SerieA => "Serie A",
            Self::Ligue1 => "Ligue 1",
        }
    }

    /// Number of clubs in a regular season.
    pub fn team_count(&self) -> usize {
        match self {
            Self::PremierLeague | Self::LaLiga | Self::SerieA => 20,
            Self::Championship => 24,
            Self::Bundesliga | Self::Ligue1 => 18,
        }
    }

    pub fn all() -> &'static [CompetitionCode] {
        &[
            Self::PremierLeague,
            Self::Championship,
            Self::LaLiga,
            Self::Bundesliga,
            Self::SerieA,
            Self::Ligue1,
        ]
    }

    fn parse_str(s: &str) -> Result<Self, ImporterError> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "pl" | "premier-league" | "epl" => Ok(Self::PremierLeague),
            "elc" | "championship" => Ok(Self::Championship),
            "pd" | "la-liga" | "laliga" | "primera-division" => Ok(Self::LaLiga),
            "bl1" | "bundesliga" => Ok(Self::Bundesliga),
            "sa" | "serie-a" => Ok(Self::SerieA),
            "fl1" | "ligue-1" | "ligue1" => Ok(Self::Ligue1),
            _ => Err(ImporterError::ImportError(format!(
                "Unknown competition: '{}'. Available: {}",
                s,
                Self::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl TryFrom<&str> for CompetitionCode {
    type Error = ImporterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse_str(value)
    }
}

impl std::str::FromStr for CompetitionCode {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for CompetitionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which of the provider's team names is used as the team label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamNaming {
    /// "Arsenal FC", "Wolverhampton Wanderers FC"
    #[default]
    Full,
    /// "Arsenal", "Wolverhampton"
    Short,
}

impl std::str::FromStr for TeamNaming {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "name" => Ok(Self::Full),
            "short" | "short-name" | "shortname" => Ok(Self::Short),
            _ => Err(ImporterError::ImportError(format!(
                "Unknown team naming: '{}'. Available: full, short",
                s
            ))),
        }
    }
}

/// Everything needed to fetch one league's live table.
#[derive(Debug, Clone)]
pub struct FootballDataSpec {
    competition: CompetitionCode,
    naming: TeamNaming,
}

impl FootballDataSpec {
    pub fn new(competition: CompetitionCode) -> Self {
        Self {
            competition,
            naming: TeamNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: TeamNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn competition(&self) -> CompetitionCode {
        self.competition
    }

    pub fn naming(&self) -> TeamNaming {
        self.naming
    }
}
