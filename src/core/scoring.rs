use crate::core::{
    problem::ProblemCatalog,
    user::{SubmissionType, UserRecord, UserRegistry},
};
use std::collections::HashSet;

// Difficulty curve shared by both platforms.
const EXPONENT: f64 = 5.0 / 4.0;
const KATTIS_DEFAULT_RATING: f64 = 1.0;
const CODEFORCES_DEFAULT_RATING: f64 = 800.0;
const CONTEST_POINTS: f64 = 100.0;

/// Time window (inclusive on both ends) and bounty problems of a leaderboard.
#[derive(Debug, Clone, Default)]
pub struct ScoringWindow {
    pub start: i64,
    pub end: i64,
    pub bounties: HashSet<String>,
}

impl ScoringWindow {
    pub fn new(start: i64, end: i64, bounties: HashSet<String>) -> Self {
        ScoringWindow {
            start,
            end,
            bounties,
        }
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && time <= self.end
    }

    fn bounty_multiplier(&self, problem_id: &str) -> f64 {
        match self.bounties.contains(problem_id) {
            true => 2.0,
            false => 1.0,
        }
    }
}

/// Kattis ratings are already on the scoring scale.
pub fn kattis_value(rating: f64) -> f64 {
    rating.max(0.0).powf(EXPONENT)
}

/// Codeforces ratings (800..3500) are normalized before the curve is applied.
/// Ratings under 425 give a negative base, clamped to zero.
pub fn codeforces_value(rating: f64) -> f64 {
    ((rating / 25.0 - 17.0) / 10.0).max(0.0).powf(EXPONENT)
}

pub fn score(user: &UserRecord, problems: &ProblemCatalog, window: &ScoringWindow) -> f64 {
    let kattis: f64 = user
        .kattis_submissions
        .iter()
        .filter(|s| window.contains(s.time))
        .map(|s| {
            let rating = problems
                .get(&s.problem_id)
                .map_or(KATTIS_DEFAULT_RATING, |p| p.rating_or(KATTIS_DEFAULT_RATING));
            kattis_value(rating) * window.bounty_multiplier(&s.problem_id)
        })
        .sum();

    let codeforces: f64 = user
        .codeforces_submissions
        .iter()
        .filter(|s| window.contains(s.time))
        .map(|s| {
            let rating = problems
                .get(&s.problem_id)
                .map_or(CODEFORCES_DEFAULT_RATING, |p| {
                    p.rating_or(CODEFORCES_DEFAULT_RATING)
                });
            let contestant = match s.kind {
                SubmissionType::Contestant => 2.0,
                _ => 1.0,
            };
            codeforces_value(rating) * contestant * window.bounty_multiplier(&s.problem_id)
        })
        .sum();

    let contests = user
        .contests
        .iter()
        .filter(|c| window.contains(c.time))
        .count() as f64
        * CONTEST_POINTS;

    kattis + codeforces + contests
}

/// Score of a registry member. Users missing from the registry score zero.
pub fn score_for(
    id: &str,
    users: &UserRegistry,
    problems: &ProblemCatalog,
    window: &ScoringWindow,
) -> f64 {
    users
        .get_user(id)
        .map_or(0.0, |user| score(user, problems, window))
}
