use crate::{
    core::scoring::ScoringWindow,
    error::{BotError, BotResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// Every registered user is ranked.
    Open,
    /// Only users explicitly added by an admin are ranked.
    Closed,
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Membership::Open => write!(f, "open"),
            Membership::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LeaderboardConfig {
    pub start: i64,
    pub end: i64,
    pub membership: Membership,
    #[serde(default)]
    pub bounties: Vec<String>,
}

impl LeaderboardConfig {
    pub fn scoring_window(&self) -> ScoringWindow {
        ScoringWindow::new(self.start, self.end, self.bounties.iter().cloned().collect())
    }

    pub fn is_closed(&self) -> bool {
        self.membership == Membership::Closed
    }
}

/// Configured leaderboards and the aliases pointing to them. Names are stored
/// lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Leaderboards {
    boards: BTreeMap<String, LeaderboardConfig>,
    aliases: BTreeMap<String, String>,
}

impl Leaderboards {
    /// Fails if two names collide once lowercased, or if an alias targets a
    /// leaderboard that does not exist.
    pub fn new(
        boards: BTreeMap<String, LeaderboardConfig>,
        aliases: BTreeMap<String, String>,
    ) -> BotResult<Leaderboards> {
        let mut normalized_boards = BTreeMap::new();
        for (name, config) in boards {
            let key = name.to_lowercase();
            if config.start > config.end {
                warn!("Leaderboard '{key}' ends before it starts, nobody will score on it.");
            }
            if normalized_boards.insert(key.clone(), config).is_some() {
                return Err(BotError::Config(format!(
                    "leaderboard '{key}' is defined more than once"
                )));
            }
        }

        let mut normalized_aliases = BTreeMap::new();
        for (alias, target) in aliases {
            let (alias, target) = (alias.to_lowercase(), target.to_lowercase());
            if !normalized_boards.contains_key(&target) {
                return Err(BotError::Config(format!(
                    "alias '{alias}' points to unknown leaderboard '{target}'"
                )));
            }
            if normalized_aliases.insert(alias.clone(), target).is_some() {
                return Err(BotError::Config(format!(
                    "alias '{alias}' is defined more than once"
                )));
            }
        }

        Ok(Leaderboards {
            boards: normalized_boards,
            aliases: normalized_aliases,
        })
    }

    /// Canonical name of a leaderboard. Aliases win over canonical names.
    pub fn resolve(&self, name: &str) -> BotResult<String> {
        let name = name.trim().to_lowercase();
        let name = self.aliases.get(&name).cloned().unwrap_or(name);
        match self.boards.contains_key(&name) {
            true => Ok(name),
            false => Err(BotError::UnknownLeaderboard(name)),
        }
    }

    pub fn get(&self, canonical: &str) -> BotResult<&LeaderboardConfig> {
        self.boards
            .get(canonical)
            .ok_or_else(|| BotError::UnknownLeaderboard(canonical.to_string()))
    }

    /// Every name a user may type: aliases first, then canonical names.
    pub fn all_options(&self) -> Vec<&str> {
        self.aliases
            .keys()
            .chain(self.boards.keys())
            .map(|name| name.as_str())
            .collect()
    }

    /// Names of leaderboards requiring explicit membership, aliases included.
    pub fn closed_options(&self) -> Vec<&str> {
        let aliases = self
            .aliases
            .iter()
            .filter(|(_, target)| self.boards[target.as_str()].is_closed())
            .map(|(alias, _)| alias.as_str());
        let literals = self
            .boards
            .iter()
            .filter(|(_, config)| config.is_closed())
            .map(|(name, _)| name.as_str());
        aliases.chain(literals).collect()
    }

    /// (canonical name, config, aliases of that leaderboard)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LeaderboardConfig, Vec<&str>)> {
        self.boards.iter().map(|(name, config)| {
            let aliases = self
                .aliases
                .iter()
                .filter(|(_, target)| *target == name)
                .map(|(alias, _)| alias.as_str())
                .collect();
            (name.as_str(), config, aliases)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(membership: Membership) -> LeaderboardConfig {
        LeaderboardConfig {
            start: 0,
            end: 1000,
            membership,
            bounties: vec!["1A".to_string()],
        }
    }

    fn leaderboards() -> Leaderboards {
        let boards = BTreeMap::from([
            ("foo".to_string(), config(Membership::Open)),
            ("Fall2024".to_string(), config(Membership::Closed)),
        ]);
        let aliases = BTreeMap::from([
            ("bar".to_string(), "foo".to_string()),
            ("Fall".to_string(), "fall2024".to_string()),
        ]);
        Leaderboards::new(boards, aliases).unwrap()
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let lbs = leaderboards();

        assert_eq!(lbs.resolve("foo").unwrap(), "foo");
        assert_eq!(lbs.resolve("FOO").unwrap(), "foo");
        assert_eq!(lbs.resolve("bar").unwrap(), "foo");
        assert_eq!(lbs.resolve("BaR").unwrap(), "foo");
        assert_eq!(lbs.resolve("FALL2024").unwrap(), "fall2024");
        assert_eq!(lbs.resolve("fall").unwrap(), "fall2024");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let lbs = leaderboards();
        let once = lbs.resolve("bar").unwrap();
        assert_eq!(lbs.resolve(&once).unwrap(), once);
    }

    #[test]
    fn test_resolve_unknown() {
        let lbs = leaderboards();
        assert!(matches!(
            lbs.resolve("nonexistent"),
            Err(BotError::UnknownLeaderboard(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn test_dangling_alias_is_rejected() {
        let boards = BTreeMap::from([("foo".to_string(), config(Membership::Open))]);
        let aliases = BTreeMap::from([("baz".to_string(), "nope".to_string())]);

        assert!(matches!(
            Leaderboards::new(boards, aliases),
            Err(BotError::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let boards = BTreeMap::from([
            ("foo".to_string(), config(Membership::Open)),
            ("FOO".to_string(), config(Membership::Closed)),
        ]);
        assert!(Leaderboards::new(boards, BTreeMap::new()).is_err());
    }

    #[test]
    fn test_options() {
        let lbs = leaderboards();

        assert_eq!(lbs.all_options(), vec!["bar", "fall", "fall2024", "foo"]);
        assert_eq!(lbs.closed_options(), vec!["fall", "fall2024"]);
    }

    #[test]
    fn test_scoring_window_from_config() {
        let lbs = leaderboards();
        let window = lbs.get("foo").unwrap().scoring_window();

        assert_eq!((window.start, window.end), (0, 1000));
        assert!(window.bounties.contains("1A"));
    }

    #[test]
    fn test_iter_lists_aliases() {
        let lbs = leaderboards();
        let listed = lbs
            .iter()
            .map(|(name, _, aliases)| (name.to_string(), aliases.join(",")))
            .collect::<Vec<_>>();

        assert_eq!(
            listed,
            vec![
                ("fall2024".to_string(), "fall".to_string()),
                ("foo".to_string(), "bar".to_string()),
            ]
        );
    }
}
