pub mod cpc;

use crate::{
    core::{problem::ProblemCatalog, user::UserRegistry},
    error::BotResult,
};
use async_trait::async_trait;

/// Where users and problems are pulled from on every refresh.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn users(&self) -> BotResult<UserRegistry>;
    async fn problems(&self) -> BotResult<ProblemCatalog>;
}
