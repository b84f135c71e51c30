use crate::error::{BotError, BotResult};

use once_cell::sync::Lazy;
use regex::Regex;

const COMMANDS: [&'static str; 7] = [
    "!help",
    "!leaderboards",
    "!view",
    "!register",
    "!add",
    "!remove",
    "!find",
];
// Whitespace separated words, double quotes group words together
static REGEX_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Leaderboards,
    View {
        leaderboard: String,
        page: Option<usize>,
    },
    Register {
        target: String,
        id: String,
    },
    Add {
        target: String,
        leaderboard: String,
    },
    Remove {
        target: String,
        leaderboard: String,
    },
    Find(String),
}

fn words(input: &str) -> impl Iterator<Item = &str> {
    REGEX_WORDS.captures_iter(input).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|mat| mat.as_str())
    })
}

fn required<'a>(input: &mut impl Iterator<Item = &'a str>, what: &str) -> BotResult<String> {
    input
        .next()
        .map(|word| word.to_string())
        .ok_or_else(|| BotError::InvalidCommand(format!("missing {what}")))
}

impl Command {
    pub fn is_command(input: &str) -> bool {
        words(input)
            .next()
            .map(|start_with| COMMANDS.contains(&start_with.to_lowercase().as_str()))
            .unwrap_or_default()
    }

    /// Admin-only commands change or reveal membership data.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Register { .. }
                | Command::Add { .. }
                | Command::Remove { .. }
                | Command::Find(_)
        )
    }

    // Only called on strings for which `is_command` holds.
    pub fn build_from(input: &str) -> BotResult<Command> {
        let mut input = words(input);
        let start_with = input
            .next()
            .map(|word| word.to_lowercase())
            .unwrap_or_default();

        let command = match start_with.as_str() {
            cmd if cmd == COMMANDS[0] => Command::Help,
            cmd if cmd == COMMANDS[1] => Command::Leaderboards,
            cmd if cmd == COMMANDS[2] => {
                // !view <leaderboard> [page]
                let leaderboard = required(&mut input, "leaderboard")?;
                let page = match input.next() {
                    None => None,
                    Some(p) => match p.parse::<usize>() {
                        Ok(page) if page >= 1 => Some(page),
                        _ => {
                            return Err(BotError::InvalidCommand(format!(
                                "page should be a number starting at 1, got '{p}'"
                            )))
                        }
                    },
                };
                Command::View { leaderboard, page }
            }
            cmd if cmd == COMMANDS[3] => Command::Register {
                target: required(&mut input, "target")?,
                id: required(&mut input, "id")?,
            },
            cmd if cmd == COMMANDS[4] => Command::Add {
                target: required(&mut input, "target")?,
                leaderboard: required(&mut input, "leaderboard")?,
            },
            cmd if cmd == COMMANDS[5] => Command::Remove {
                target: required(&mut input, "target")?,
                leaderboard: required(&mut input, "leaderboard")?,
            },
            cmd if cmd == COMMANDS[6] => {
                let query = input.collect::<Vec<&str>>().join(" ");
                if query.is_empty() {
                    return Err(BotError::InvalidCommand("missing query".to_string()));
                }
                Command::Find(query)
            }
            other => return Err(BotError::InvalidCommand(format!("unknown command '{other}'"))),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_command() {
        assert!(Command::is_command("!help"));
        assert!(Command::is_command("  !VIEW fall 2"));
        assert!(!Command::is_command("hello !help"));
        assert!(!Command::is_command("!unknown"));
        assert!(!Command::is_command(""));
    }

    #[test]
    fn test_build_view() {
        assert_eq!(
            Command::build_from("!view fall").unwrap(),
            Command::View {
                leaderboard: "fall".to_string(),
                page: None
            }
        );
        assert_eq!(
            Command::build_from("!view Fall-2024 3").unwrap(),
            Command::View {
                leaderboard: "Fall-2024".to_string(),
                page: Some(3)
            }
        );
    }

    #[test]
    fn test_build_view_rejects_bad_page() {
        assert!(matches!(
            Command::build_from("!view fall 0"),
            Err(BotError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::build_from("!view fall two"),
            Err(BotError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::build_from("!view"),
            Err(BotError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_build_membership_commands() {
        assert_eq!(
            Command::build_from("!register 42 cpc-abc").unwrap(),
            Command::Register {
                target: "42".to_string(),
                id: "cpc-abc".to_string()
            }
        );
        assert_eq!(
            Command::build_from("!add 42 fall").unwrap(),
            Command::Add {
                target: "42".to_string(),
                leaderboard: "fall".to_string()
            }
        );
        assert_eq!(
            Command::build_from("!remove 42 fall").unwrap(),
            Command::Remove {
                target: "42".to_string(),
                leaderboard: "fall".to_string()
            }
        );
        assert!(Command::build_from("!add 42").is_err());
    }

    #[test]
    fn test_build_find_with_quotes() {
        assert_eq!(
            Command::build_from(r#"!find "Jane Doe""#).unwrap(),
            Command::Find("Jane Doe".to_string())
        );
        assert_eq!(
            Command::build_from("!find jane doe").unwrap(),
            Command::Find("jane doe".to_string())
        );
        assert!(Command::build_from("!find").is_err());
    }

    #[test]
    fn test_requires_admin() {
        assert!(!Command::Help.requires_admin());
        assert!(!Command::build_from("!view x").unwrap().requires_admin());
        assert!(Command::Find("x".to_string()).requires_admin());
    }
}
