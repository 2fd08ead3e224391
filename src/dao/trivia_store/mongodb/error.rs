use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB database `{database}` unreachable after {attempts} ping attempt(s)")]
    InitialPing {
        database: String,
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("duplicate key `{key}`")]
    Duplicate { key: String },
    #[error("failed to read destinations")]
    LoadDestinations {
        #[source]
        source: MongoError,
    },
    #[error("failed to save destination `{city}`")]
    SaveDestination {
        city: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load user `{username}`")]
    LoadUser {
        username: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to save user `{username}`")]
    SaveUser {
        username: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list users")]
    ListUsers {
        #[source]
        source: MongoError,
    },
    #[error("failed to save challenge `{code}`")]
    SaveChallenge {
        code: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load challenge `{code}`")]
    LoadChallenge {
        code: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to purge expired challenges")]
    PurgeChallenges {
        #[source]
        source: MongoError,
    },
}

/// Whether the driver rejected a write because of a unique index.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
