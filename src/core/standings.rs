use crate::{
    core::{
        leaderboard::LeaderboardConfig,
        problem::ProblemCatalog,
        scoring::{score_for, ScoringWindow},
        user::UserRegistry,
    },
    membership::MembershipEntry,
    utils::format_score,
};
use itertools::Itertools;
use serde::Serialize;

pub const PAGE_SIZE: usize = 10;
// Row (0-based) the requester lands on when the view is centered on them.
const REQUESTER_ROW: usize = 5;

/// Which slice of the ranking to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// 1-based page number.
    Page(usize),
    /// Centered on the given backend id, first page when absent or unranked.
    Around(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub rank: usize,
    pub name: String,
    pub score: String,
}

/// Backend ids of the members ranked on a leaderboard, in store order.
pub fn eligible_members<'a>(
    leaderboard: &str,
    config: &LeaderboardConfig,
    members: &'a [(String, MembershipEntry)],
    users: &UserRegistry,
) -> Vec<&'a str> {
    members
        .iter()
        .map(|(_, entry)| entry)
        .filter(|entry| !config.is_closed() || entry.is_member_of(leaderboard))
        .filter_map(|entry| entry.id.as_deref())
        .filter(|id| users.contains_key(*id))
        .collect()
}

/// Every eligible member with their score, best first. Ties keep store order.
pub fn rank(
    leaderboard: &str,
    config: &LeaderboardConfig,
    members: &[(String, MembershipEntry)],
    users: &UserRegistry,
    problems: &ProblemCatalog,
) -> Vec<Standing> {
    let window: ScoringWindow = config.scoring_window();
    eligible_members(leaderboard, config, members, users)
        .into_iter()
        .map(|id| Standing {
            id: id.to_string(),
            name: users
                .get(id)
                .map_or_else(|| id.to_string(), |u| u.display_name.clone()),
            score: score_for(id, users, problems, &window),
        })
        // stable, so equal scores keep their order
        .sorted_by(|a, b| b.score.total_cmp(&a.score))
        .collect()
}

/// Index of the first row to display.
pub fn window_offset(standings: &[Standing], view: &View) -> usize {
    match view {
        View::Page(page) => page.saturating_sub(1).saturating_mul(PAGE_SIZE),
        View::Around(Some(id)) => standings
            .iter()
            .position(|s| &s.id == id)
            .map_or(0, |index| index.saturating_sub(REQUESTER_ROW)),
        View::Around(None) => 0,
    }
}

/// Up to `PAGE_SIZE` rows starting at the offset chosen by the view.
pub fn display_window(standings: &[Standing], view: &View) -> Vec<Row> {
    let offset = window_offset(standings, view);
    standings
        .iter()
        .enumerate()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(|(index, standing)| Row {
            rank: index + 1,
            name: standing.name.clone(),
            score: format_score(standing.score),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        leaderboard::Membership,
        user::{ContestParticipation, UserRecord},
    };

    fn config(membership: Membership) -> LeaderboardConfig {
        LeaderboardConfig {
            start: 0,
            end: 1_000,
            membership,
            bounties: vec![],
        }
    }

    /// `n` users, user `i` having attended `i` contests (score 100 * i).
    fn fixture(n: usize) -> (UserRegistry, Vec<(String, MembershipEntry)>) {
        let records = (1..=n)
            .map(|i| {
                let mut user = UserRecord::new(&format!("cpc-{i}"), &format!("User {i}"));
                user.contests = (0..i)
                    .map(|c| ContestParticipation {
                        contest_id: c.to_string(),
                        time: 10,
                    })
                    .collect();
                user
            })
            .collect();
        let members = (1..=n)
            .map(|i| {
                (
                    format!("discord-{i}"),
                    MembershipEntry {
                        id: Some(format!("cpc-{i}")),
                        leaderboards: if i % 2 == 0 {
                            vec!["fall".to_string()]
                        } else {
                            vec![]
                        },
                    },
                )
            })
            .collect();
        (UserRegistry::from_records(records), members)
    }

    fn ranked(n: usize, membership: Membership) -> Vec<Standing> {
        let (users, members) = fixture(n);
        rank(
            "fall",
            &config(membership),
            &members,
            &users,
            &ProblemCatalog::new(),
        )
    }

    fn ranks(rows: &[Row]) -> Vec<usize> {
        rows.iter().map(|r| r.rank).collect()
    }

    #[test]
    fn test_open_leaderboard_ranks_everyone_descending() {
        let standings = ranked(25, Membership::Open);

        assert_eq!(standings.len(), 25);
        assert_eq!(standings[0].id, "cpc-25");
        assert!(standings.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_closed_leaderboard_only_ranks_members() {
        let standings = ranked(10, Membership::Closed);

        let ids = standings.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["cpc-10", "cpc-8", "cpc-6", "cpc-4", "cpc-2"]);
    }

    #[test]
    fn test_unregistered_and_unknown_ids_are_skipped() {
        let (users, mut members) = fixture(3);
        members.push(("discord-x".to_string(), MembershipEntry::default()));
        members.push((
            "discord-y".to_string(),
            MembershipEntry {
                id: Some("not-in-backend".to_string()),
                leaderboards: vec![],
            },
        ));

        let eligible = eligible_members("fall", &config(Membership::Open), &members, &users);
        assert_eq!(eligible, vec!["cpc-1", "cpc-2", "cpc-3"]);
    }

    #[test]
    fn test_ties_keep_store_order() {
        let users = UserRegistry::from_records(vec![
            UserRecord::new("b", "Bee"),
            UserRecord::new("a", "Ay"),
        ]);
        let members = vec![
            (
                "1".to_string(),
                MembershipEntry {
                    id: Some("b".into()),
                    leaderboards: vec![],
                },
            ),
            (
                "2".to_string(),
                MembershipEntry {
                    id: Some("a".into()),
                    leaderboards: vec![],
                },
            ),
        ];

        let standings = rank(
            "x",
            &config(Membership::Open),
            &members,
            &users,
            &ProblemCatalog::new(),
        );
        let ids = standings.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_page_two_shows_rows_eleven_to_twenty() {
        let standings = ranked(25, Membership::Open);

        let rows = display_window(&standings, &View::Page(2));
        assert_eq!(ranks(&rows), (11..=20).collect::<Vec<_>>());
        assert_eq!(rows[0].name, "User 15");
        assert_eq!(rows[0].score, "1500.0");

        let last = display_window(&standings, &View::Page(3));
        assert_eq!(ranks(&last), (21..=25).collect::<Vec<_>>());
        assert!(display_window(&standings, &View::Page(4)).is_empty());
    }

    #[test]
    fn test_view_centered_on_requester() {
        let standings = ranked(40, Membership::Open);
        // index 30 holds cpc-10 (scores go 40, 39, ..., 1)
        assert_eq!(standings[30].id, "cpc-10");

        let rows = display_window(&standings, &View::Around(Some("cpc-10".to_string())));
        assert_eq!(ranks(&rows), (26..=35).collect::<Vec<_>>());
        assert_eq!(rows[5].name, "User 10");
    }

    #[test]
    fn test_view_centered_clamps_at_top() {
        let standings = ranked(25, Membership::Open);

        let rows = display_window(&standings, &View::Around(Some("cpc-23".to_string())));
        assert_eq!(ranks(&rows), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_view_without_requester_starts_at_top() {
        let standings = ranked(25, Membership::Open);

        assert_eq!(window_offset(&standings, &View::Around(None)), 0);
        let ghost = View::Around(Some("ghost".to_string()));
        assert_eq!(window_offset(&standings, &ghost), 0);
    }

    #[test]
    fn test_huge_page_is_empty() {
        let standings = ranked(25, Membership::Open);

        assert_eq!(window_offset(&standings, &View::Page(usize::MAX)), usize::MAX);
        assert!(display_window(&standings, &View::Page(usize::MAX)).is_empty());
        let wrapping = usize::MAX / PAGE_SIZE + 2;
        assert!(display_window(&standings, &View::Page(wrapping)).is_empty());
    }
}
