use std::fmt;

/// Tokens that providers and participants add or drop at will.
const NOISE_TOKENS: &[&str] = &["fc", "afc", "cf"];

/// A newtype that ensures team names are compared in a normalized form
/// so that "Arsenal FC", "arsenal" and " Arsenal " resolve to the same team.
///
/// Standings providers and participants rarely agree on spelling; every
/// lookup between a prediction and a snapshot goes through this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamKey(String);

impl TeamKey {
    /// Creates a normalized key from a display name.
    ///
    /// Normalization lowercases, treats `&` as `and`, drops dots and
    /// club-form tokens such as `FC`/`AFC`, and collapses whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use storage::models::TeamKey;
    ///
    /// let from_provider = TeamKey::new("Brighton & Hove Albion FC");
    /// let from_participant = TeamKey::new("brighton and hove albion");
    ///
    /// assert_eq!(from_provider, from_participant);
    /// ```
    pub fn new(name: &str) -> Self {
        let lowered = name.to_lowercase().replace('&', " and ");

        let tokens: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || c == '.')
            .filter(|token| !token.is_empty())
            .collect();

        let significant: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|token| !NOISE_TOKENS.contains(token))
            .collect();

        // A name made only of noise tokens keeps them rather than collapsing to "".
        if significant.is_empty() {
            Self(tokens.join(" "))
        } else {
            Self(significant.join(" "))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
