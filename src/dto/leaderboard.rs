use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::leaderboard_service::LeaderboardPage;

/// Paging parameters for `GET /leaderboard`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// 1-based page number (defaults to 1).
    pub page: Option<u32>,
    /// Page size (defaults to the configured size, clamped to the configured maximum).
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

/// One page of the global ranking.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub users: Vec<LeaderboardEntry>,
    pub pagination: PaginationInfo,
}

impl From<LeaderboardPage> for LeaderboardResponse {
    fn from(page: LeaderboardPage) -> Self {
        Self {
            users: page
                .entries
                .into_iter()
                .map(|user| LeaderboardEntry {
                    username: user.username,
                    score: user.score,
                })
                .collect(),
            pagination: PaginationInfo {
                total: page.total,
                page: page.page,
                limit: page.page_size,
                pages: page.total_pages,
            },
        }
    }
}
