use crate::error::BotResult;

use minijinja::{Environment, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();

    // Use strum to iterate over the variants of the enum.
    for template in MessageTemplate::iter() {
        env.add_template(template.name(), template.template())
            .expect("built-in templates are valid");
    }

    info!("Templates loaded in templating engine environment.");

    env
});

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum MessageTemplate {
    Help,
    LeaderboardList,
    LeaderboardView,
    FindResults,
    Done,
    NoPermission,
    Rejected,
    Failure,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Help => "help.txt",
            MessageTemplate::LeaderboardList => "leaderboards.txt",
            MessageTemplate::LeaderboardView => "leaderboard.txt",
            MessageTemplate::FindResults => "find.txt",
            MessageTemplate::Done => "done.txt",
            MessageTemplate::NoPermission => "no_permission.txt",
            MessageTemplate::Rejected => "rejected.txt",
            MessageTemplate::Failure => "failure.txt",
        }
    }

    pub fn get(&self) -> BotResult<Template<'_, '_>> {
        Ok(TEMPLATES_ENVIRONMENT.get_template(self.name())?)
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> BotResult<String> {
        Ok(self.get()?.render(ctx)?)
    }

    pub fn template(&self) -> &'static str {
        // \n\ at each code line end creates a line break at the proper position and discards further spaces in this line of code.
        // \x20 (hex; 32 in decimal) is an ASCII space and an indicator for the first space to be preserved in this line of the string.
        match self {
            MessageTemplate::Help => {
                "🗒️ Leaderboard commands:\n\
                \x20 !help                           this message\n\
                \x20 !leaderboards                   configured leaderboards and their aliases\n\
                \x20 !view <leaderboard> [page]      ranking, centered on you when no page is given\n\
                Admins only:\n\
                \x20 !register <target> <id>         link someone to their CPC id\n\
                \x20 !add <target> <leaderboard>     add someone to a closed leaderboard\n\
                \x20 !remove <target> <leaderboard>  remove someone from a leaderboard\n\
                \x20 !find <query>                   look up CPC ids by name"
            }
            MessageTemplate::LeaderboardList => {
                "📋 Leaderboards:\
                {%- for lb in leaderboards %}\n\
                \x20 • {{ lb.name }}{% if lb.aliases %} (aka {{ lb.aliases|join(', ') }}){% endif %}: \
                {{ lb.membership }}, {{ lb.start }} to {{ lb.end }}\
                {%- if lb.bounties %}, bounties: {{ lb.bounties|join(', ') }}{% endif %}\
                {%- endfor %}"
            }
            MessageTemplate::LeaderboardView => {
                "Leaderboard {{ leaderboard }}:\
                {%- for row in rows %}\n\
                {{ row.rank }}. {{ row.name }}   {{ row.score }}\
                {%- else %}\n\
                Nobody to show on this page.\
                {%- endfor %}"
            }
            MessageTemplate::FindResults => {
                "{%- for user in users -%}\
                display: '{{ user.display_name }}' \
                {%- if user.kattis_username %} kattis: '{{ user.kattis_username }}'{% endif %}\
                {%- if user.codeforces_username %} cf: '{{ user.codeforces_username }}'{% endif %} \
                id: '{{ user.id }}'\
                {%- if not loop.last %}\n{% endif %}\
                {%- else -%}\
                No results found\
                {%- endfor -%}"
            }
            MessageTemplate::Done => "Done.",
            MessageTemplate::NoPermission => "You do not have permission to use this command!",
            MessageTemplate::Rejected => "⚠️ {{ reason }}",
            MessageTemplate::Failure => "There was an error while executing this command!",
        }
    }
}
