use crate::{
    client::DataSource,
    config::Settings,
    core::{
        problem::{Platform, Problem, ProblemCatalog},
        user::{
            CodeforcesSubmission, ContestParticipation, Submission, SubmissionType, UserRecord,
            UserRegistry,
        },
    },
    error::{BotError, BotResult},
    utils::floor_timestamp,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::{collections::HashMap, fmt, time::Duration};
use tracing::{debug, warn};

// Key of the Codeforces submissions mapping that holds contests, not a problem.
const CONTESTS_KEY: &str = "contests";

enum Endpoint {
    Users,
    Problems,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::Users => write!(f, "/get_users"),
            Endpoint::Problems => write!(f, "/get_all_problems"),
        }
    }
}

/// Client of the CPC backend, which tracks users' solves on both platforms.
pub struct Cpc {
    http_client: Client,
    base_url: String,
}

impl Cpc {
    pub fn new(base_url: String, timeout: Duration) -> BotResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> BotResult<Self> {
        Cpc::new(
            settings.backend_base_url.clone(),
            Duration::from_secs(settings.backend_api_timeout_sec),
        )
    }

    async fn get(&self, endpoint: &Endpoint) -> BotResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {url}");

        let response = self.http_client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            status => Err(BotError::Http(format!("{status} from {url}"))),
        }
    }

    pub(crate) fn parse_users(users: &str) -> BotResult<UserRegistry> {
        // Response of the users endpoint.
        // Structs defined here as they are only used by this function.
        #[derive(Debug, Deserialize)]
        struct CpcUser {
            id: String,
            #[serde(default)]
            display_name: Option<String>,
            kattis_username: Option<String>,
            codeforces_username: Option<String>,
            #[serde(default)]
            affiliation: Option<String>,
            last_checked: Option<f64>,
            /// problem id => { time, type }, plus the reserved contests key
            codeforces_submissions: Option<HashMap<String, Value>>,
            /// problem id => solve time
            kattis_submissions: Option<HashMap<String, Value>>,
        }

        #[derive(Debug, Deserialize)]
        struct CpcCodeforcesSolve {
            time: f64,
            #[serde(rename = "type")]
            kind: SubmissionType,
        }

        let parsed = serde_json::from_str::<Vec<CpcUser>>(users)?;
        let mut records = Vec::with_capacity(parsed.len());

        for user in parsed {
            let mut codeforces_submissions = vec![];
            let mut contests = vec![];

            for (key, value) in user.codeforces_submissions.unwrap_or_default() {
                if key == CONTESTS_KEY {
                    contests = Cpc::parse_contests(&user.id, value);
                    continue;
                }
                let solve = match serde_json::from_value::<CpcCodeforcesSolve>(value) {
                    Ok(solve) => solve,
                    Err(e) => {
                        warn!(
                            "Ignoring unreadable codeforces submission {key} of user {}: {e}",
                            user.id
                        );
                        continue;
                    }
                };
                codeforces_submissions.push(CodeforcesSubmission {
                    problem_id: key,
                    time: floor_timestamp(solve.time),
                    kind: solve.kind,
                });
            }

            let kattis_submissions = user
                .kattis_submissions
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(problem_id, time)| match time.as_f64() {
                    Some(time) => Some(Submission {
                        problem_id,
                        time: floor_timestamp(time),
                    }),
                    None => {
                        warn!(
                            "Ignoring unreadable kattis submission {problem_id} of user {}: {time}",
                            user.id
                        );
                        None
                    }
                })
                .collect();

            let mut record = UserRecord {
                display_name: user.display_name.unwrap_or_else(|| user.id.clone()),
                kattis_username: user.kattis_username,
                codeforces_username: user.codeforces_username,
                affiliation: user.affiliation.unwrap_or_default(),
                last_checked: user
                    .last_checked
                    .and_then(|ts| Utc.timestamp_opt(floor_timestamp(ts), 0).single()),
                id: user.id,
                codeforces_submissions,
                kattis_submissions,
                contests,
            };
            record.sort_logs();
            records.push(record);
        }

        Ok(UserRegistry::from_records(records))
    }

    /// Contests are owned by the backend; anything but `id => time` or
    /// `id => { time }` is skipped.
    fn parse_contests(user_id: &str, value: Value) -> Vec<ContestParticipation> {
        #[derive(Debug, Deserialize)]
        #[serde(untagged)]
        enum CpcContestTime {
            Bare(f64),
            Tagged { time: f64 },
        }

        match serde_json::from_value::<HashMap<String, CpcContestTime>>(value) {
            Ok(contests) => contests
                .into_iter()
                .map(|(contest_id, time)| ContestParticipation {
                    contest_id,
                    time: match time {
                        CpcContestTime::Bare(t) | CpcContestTime::Tagged { time: t } => {
                            floor_timestamp(t)
                        }
                    },
                })
                .collect(),
            Err(e) => {
                warn!("Ignoring unreadable contests of user {user_id}: {e}");
                vec![]
            }
        }
    }

    pub(crate) fn parse_problems(problems: &str) -> BotResult<ProblemCatalog> {
        #[derive(Debug, Deserialize)]
        struct CpcProblems {
            #[serde(default)]
            codeforces: HashMap<String, CpcProblem>,
            #[serde(default)]
            kattis: HashMap<String, CpcProblem>,
        }

        #[derive(Debug, Deserialize)]
        struct CpcProblem {
            #[serde(default)]
            name: Option<String>,
            #[serde(default)]
            rating: Option<f64>,
        }

        let parsed = serde_json::from_str::<CpcProblems>(problems)?;

        let collect = |problems: HashMap<String, CpcProblem>, platform: Platform| {
            problems
                .into_iter()
                .map(|(id, problem)| Problem {
                    name: problem.name.unwrap_or_else(|| id.clone()),
                    id,
                    rating: problem.rating,
                    platform,
                })
                .collect::<Vec<Problem>>()
        };

        Ok(ProblemCatalog::merge(vec![
            collect(parsed.codeforces, Platform::Codeforces),
            collect(parsed.kattis, Platform::Kattis),
        ]))
    }
}

#[async_trait]
impl DataSource for Cpc {
    async fn users(&self) -> BotResult<UserRegistry> {
        let response = self.get(&Endpoint::Users).await?;
        Cpc::parse_users(&response)
    }

    async fn problems(&self) -> BotResult<ProblemCatalog> {
        let response = self.get(&Endpoint::Problems).await?;
        Cpc::parse_problems(&response)
    }
}
