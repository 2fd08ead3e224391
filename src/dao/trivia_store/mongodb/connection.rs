use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{info, warn};

use super::error::{MongoDaoError, MongoResult};

const PING_ATTEMPTS: u32 = 10;
const FIRST_PING_DELAY: Duration = Duration::from_millis(250);
const MAX_PING_DELAY: Duration = Duration::from_secs(5);

/// Delays slept between successive failed pings, doubling up to [`MAX_PING_DELAY`].
fn ping_delays() -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(FIRST_PING_DELAY), |delay| {
        Some((*delay * 2).min(MAX_PING_DELAY))
    })
    .take(PING_ATTEMPTS as usize - 1)
}

/// Build a client for `database_name` and wait until the server answers a ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut delays = ping_delays();
    let mut attempts = 0;
    loop {
        attempts += 1;
        let err = match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                info!(database = %database_name, attempts, "MongoDB answered ping");
                return Ok((client, database));
            }
            Err(err) => err,
        };

        let Some(delay) = delays.next() else {
            return Err(MongoDaoError::InitialPing {
                database: database_name.to_owned(),
                attempts,
                source: err,
            });
        };
        warn!(
            database = %database_name,
            attempts,
            wait_ms = delay.as_millis(),
            error = %err,
            "MongoDB ping failed during connection; retrying"
        );
        sleep(delay).await;
    }
}
