use crate::error::{BotError, BotResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt,
    ops::{Deref, DerefMut},
};

/// How a Codeforces problem was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Virtual,
    Contestant,
    Practice,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubmissionType::Virtual => write!(f, "virtual"),
            SubmissionType::Contestant => write!(f, "contestant"),
            SubmissionType::Practice => write!(f, "practice"),
            SubmissionType::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub problem_id: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeforcesSubmission {
    pub problem_id: String,
    pub time: i64,
    pub kind: SubmissionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestParticipation {
    pub contest_id: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub kattis_username: Option<String>,
    pub codeforces_username: Option<String>,
    pub affiliation: String,
    pub last_checked: Option<DateTime<Utc>>,
    pub codeforces_submissions: Vec<CodeforcesSubmission>,
    pub kattis_submissions: Vec<Submission>,
    pub contests: Vec<ContestParticipation>,
}

impl UserRecord {
    pub fn new(id: &str, display_name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            display_name: display_name.to_string(),
            kattis_username: None,
            codeforces_username: None,
            affiliation: String::new(),
            last_checked: None,
            codeforces_submissions: vec![],
            kattis_submissions: vec![],
            contests: vec![],
        }
    }

    /// Logs are kept in chronological order. Sorting is stable so entries sharing
    /// a timestamp keep the order the backend sent them in.
    pub fn sort_logs(&mut self) {
        self.codeforces_submissions.sort_by_key(|s| s.time);
        self.kattis_submissions.sort_by_key(|s| s.time);
        self.contests.sort_by_key(|c| c.time);
    }

    /// Case-insensitive substring match on display name and platform usernames.
    /// `query` is expected lowercased.
    pub fn matches(&self, query: &str) -> bool {
        [
            Some(&self.display_name),
            self.kattis_username.as_ref(),
            self.codeforces_username.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|s| s.to_lowercase().contains(query))
    }
}

type Users = HashMap<String, UserRecord>;

/// Registered users keyed by their backend id.
#[derive(Debug, Default, Clone)]
pub struct UserRegistry(Users);

impl UserRegistry {
    pub fn new() -> UserRegistry {
        UserRegistry(Users::new())
    }

    pub fn from_records(records: Vec<UserRecord>) -> UserRegistry {
        let mut registry = UserRegistry::new();
        for record in records {
            registry.insert(record.id.clone(), record);
        }
        registry
    }

    pub fn get_user(&self, id: &str) -> BotResult<&UserRecord> {
        self.get(id)
            .ok_or_else(|| BotError::NoSuchUser(id.to_string()))
    }

    /// Users whose names contain the query, sorted by display name.
    pub fn search(&self, query: &str) -> Vec<&UserRecord> {
        let query = query.to_lowercase();
        let mut found = self
            .values()
            .filter(|user| user.matches(&query))
            .collect::<Vec<&UserRecord>>();
        found.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        found
    }
}

impl Deref for UserRegistry {
    type Target = Users;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for UserRegistry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
