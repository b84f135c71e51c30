use serde::Serialize;
use std::{
    collections::HashMap,
    fmt,
    ops::{Deref, DerefMut},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    Codeforces,
    Kattis,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Codeforces => write!(f, "codeforces"),
            Platform::Kattis => write!(f, "kattis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub id: String,
    pub name: String,
    /// Difficulty on the platform's own scale, absent when the backend has none.
    pub rating: Option<f64>,
    pub platform: Platform,
}

impl Problem {
    /// Rating used for scoring. A missing or zero rating falls back to the
    /// given platform default.
    pub fn rating_or(&self, default: f64) -> f64 {
        match self.rating {
            Some(rating) if rating != 0.0 => rating,
            _ => default,
        }
    }
}

type Problems = HashMap<String, Problem>;

/// Every known problem of both platforms, keyed by problem id.
#[derive(Debug, Default, Clone)]
pub struct ProblemCatalog(Problems);

impl ProblemCatalog {
    pub fn new() -> ProblemCatalog {
        ProblemCatalog(Problems::new())
    }

    /// Merge per-platform collections into a single catalog. Ids are namespaced
    /// by platform on the backend, so no collision handling happens here.
    pub fn merge(collections: Vec<Vec<Problem>>) -> ProblemCatalog {
        let mut catalog = ProblemCatalog::new();
        for problem in collections.into_iter().flatten() {
            catalog.insert(problem.id.clone(), problem);
        }
        catalog
    }

    pub fn count_for(&self, platform: Platform) -> usize {
        self.values().filter(|p| p.platform == platform).count()
    }
}

impl Deref for ProblemCatalog {
    type Target = Problems;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ProblemCatalog {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
