use crate::{error::BotResult, messaging::handler::CommandHandler};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// Split a console line into requester and message.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (requester, message) = line.trim().split_once(char::is_whitespace)?;
    Some((requester, message.trim()))
}

/// Serve commands typed on stdin as `<requester> <message>` until EOF.
pub async fn serve(handler: CommandHandler) -> BotResult<()> {
    info!("Reading commands from stdin, one '<requester> <command>' per line.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Some((requester, message)) = parse_line(&line) else {
            debug!("Skipping line without requester: {line:?}");
            continue;
        };
        if let Some(reply) = handler.handle(requester, message).await {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    info!("Stdin closed, stopping.");
    Ok(())
}
