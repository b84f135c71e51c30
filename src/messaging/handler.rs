use crate::{
    core::{
        commands::Command,
        leaderboard::Leaderboards,
        standings::{display_window, rank, Row, View},
        templates::MessageTemplate,
    },
    error::{BotError, BotResult},
    membership::MembershipStore,
    storage::MemoryCache,
    utils::format_timestamp,
};
use minijinja::context;
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct LeaderboardSummary<'a> {
    name: &'a str,
    aliases: Vec<&'a str>,
    membership: String,
    start: String,
    end: String,
    bounties: &'a [String],
}

#[derive(Debug, Serialize)]
struct FoundUser<'a> {
    display_name: &'a str,
    kattis_username: Option<&'a str>,
    codeforces_username: Option<&'a str>,
    id: &'a str,
}

/// Runs commands against the cached datasets and the membership store, and
/// renders the reply.
#[derive(Clone)]
pub struct CommandHandler {
    leaderboards: Arc<Leaderboards>,
    admins: Arc<HashSet<String>>,
    cache: MemoryCache,
    store: MembershipStore,
}

impl CommandHandler {
    pub fn new(
        leaderboards: Leaderboards,
        admins: Vec<String>,
        cache: MemoryCache,
        store: MembershipStore,
    ) -> Self {
        CommandHandler {
            leaderboards: Arc::new(leaderboards),
            admins: Arc::new(admins.into_iter().collect()),
            cache,
            store,
        }
    }

    /// Reply to a message, or None when the message is not a command.
    pub async fn handle(&self, requester: &str, input: &str) -> Option<String> {
        if !Command::is_command(input) {
            return None;
        }
        info!("Received command from {requester}: {input}");

        let reply = match Command::build_from(input) {
            Ok(command) => self.execute(requester, command).await,
            Err(e) => Err(e),
        };
        Some(reply.unwrap_or_else(|e| self.render_error(requester, e)))
    }

    pub async fn execute(&self, requester: &str, command: Command) -> BotResult<String> {
        if command.requires_admin() && !self.admins.contains(requester) {
            warn!("{requester} is not allowed to run {command:?}");
            return MessageTemplate::NoPermission.render(context! {});
        }

        match command {
            Command::Help => MessageTemplate::Help.render(context! {}),
            Command::Leaderboards => self.list_leaderboards(),
            Command::View { leaderboard, page } => {
                let (leaderboard, rows) = self.view(requester, &leaderboard, page).await?;
                MessageTemplate::LeaderboardView.render(context! { leaderboard, rows })
            }
            Command::Register { target, id } => {
                self.store.update(&target, |entry| entry.id = Some(id)).await?;
                MessageTemplate::Done.render(context! {})
            }
            Command::Add {
                target,
                leaderboard,
            } => {
                let leaderboard = self.leaderboards.resolve(&leaderboard)?;
                if !self.leaderboards.get(&leaderboard)?.is_closed() {
                    return Err(BotError::InvalidCommand(format!(
                        "leaderboard '{leaderboard}' is open to everyone, \
                        members can only be added to: {}",
                        self.leaderboards.closed_options().join(", ")
                    )));
                }
                self.store
                    .update(&target, |entry| entry.join(&leaderboard))
                    .await?;
                MessageTemplate::Done.render(context! {})
            }
            Command::Remove {
                target,
                leaderboard,
            } => {
                let leaderboard = self.leaderboards.resolve(&leaderboard)?;
                self.store
                    .update(&target, |entry| entry.leave(&leaderboard))
                    .await?;
                MessageTemplate::Done.render(context! {})
            }
            Command::Find(query) => {
                let users = self.cache.users.load();
                let found = users
                    .data
                    .search(&query)
                    .into_iter()
                    .map(|user| FoundUser {
                        display_name: &user.display_name,
                        kattis_username: user.kattis_username.as_deref(),
                        codeforces_username: user.codeforces_username.as_deref(),
                        id: &user.id,
                    })
                    .collect::<Vec<_>>();
                MessageTemplate::FindResults.render(context! { users => found })
            }
        }
    }

    /// Canonical leaderboard name and the rows to display for the requester.
    pub async fn view(
        &self,
        requester: &str,
        leaderboard: &str,
        page: Option<usize>,
    ) -> BotResult<(String, Vec<Row>)> {
        let leaderboard = self.leaderboards.resolve(leaderboard)?;
        let config = self.leaderboards.get(&leaderboard)?;

        let members = self.store.entries().await;
        let users = self.cache.users.load();
        let problems = self.cache.problems.load();
        debug!(
            "Ranking {leaderboard} with users #{} ({}) and problems #{} ({})",
            users.version, users.refreshed_at, problems.version, problems.refreshed_at
        );

        let standings = rank(&leaderboard, config, &members, &users.data, &problems.data);
        let view = match page {
            Some(page) => View::Page(page),
            None => View::Around(
                members
                    .iter()
                    .find(|(key, _)| key == requester)
                    .and_then(|(_, entry)| entry.id.clone()),
            ),
        };

        Ok((leaderboard, display_window(&standings, &view)))
    }

    fn list_leaderboards(&self) -> BotResult<String> {
        let leaderboards = self
            .leaderboards
            .iter()
            .map(|(name, config, aliases)| LeaderboardSummary {
                name,
                aliases,
                membership: config.membership.to_string(),
                start: format_timestamp(config.start),
                end: format_timestamp(config.end),
                bounties: &config.bounties,
            })
            .collect::<Vec<_>>();
        MessageTemplate::LeaderboardList.render(context! { leaderboards })
    }

    fn render_error(&self, requester: &str, e: BotError) -> String {
        let rendered = match e {
            BotError::UnknownLeaderboard(name) => MessageTemplate::Rejected.render(context! {
                reason => format!(
                    "Unknown leaderboard '{name}'. Try one of: {}",
                    self.leaderboards.all_options().join(", ")
                )
            }),
            BotError::InvalidCommand(reason) => MessageTemplate::Rejected.render(context! {
                reason => format!("{reason}. See !help.")
            }),
            e => {
                error!("Command from {requester} failed. {e}");
                MessageTemplate::Failure.render(context! {})
            }
        };
        rendered.unwrap_or_else(|e| {
            error!("{e}");
            MessageTemplate::Failure.template().to_string()
        })
    }
}
