//! Global ranking: score descending, username ascending, with clamped paging.

use tracing::debug;

use crate::{config::AppConfig, dao::models::UserEntity, error::ServiceError, state::SharedState};

/// One page of ranked users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardPage {
    pub entries: Vec<UserEntity>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// Resolve requested paging against the configured default and maximum page size.
///
/// `page` is clamped to at least 1 and `limit` to `1..=leaderboard_max_limit`.
pub fn clamp_paging(config: &AppConfig, page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit
        .unwrap_or(config.leaderboard_default_limit)
        .clamp(1, config.leaderboard_max_limit.max(1));
    (page, limit)
}

/// Rank users for the requested page; pages past the end come back empty.
pub async fn rank(
    state: &SharedState,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<LeaderboardPage, ServiceError> {
    let (page, page_size) = clamp_paging(state.config(), page, limit);
    let store = state.require_store().await?;

    let total = store.count_users().await?;
    let total_pages = total.div_ceil(u64::from(page_size));
    let skip = u64::from(page - 1) * u64::from(page_size);

    let entries = if skip < total {
        store.list_users_ranked(skip, u64::from(page_size)).await?
    } else {
        Vec::new()
    };
    debug!(page, page_size, total, returned = entries.len(), "leaderboard page");

    Ok(LeaderboardPage {
        entries,
        total,
        page,
        page_size,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::trivia_store::memory::MemoryStore,
        services::score_service::submit_score,
        state::{AppState, clock::SystemClock},
    };

    async fn ranked_state(scores: &[(&str, u32)]) -> SharedState {
        let state = AppState::with_store(
            AppConfig::default(),
            Arc::new(SystemClock),
            Arc::new(MemoryStore::new()),
        )
        .await;
        for (name, score) in scores {
            submit_score(&state, name, *score).await.unwrap();
        }
        state
    }

    #[tokio::test]
    async fn distinct_scores_come_back_strictly_descending() {
        let state =
            ranked_state(&[("amy", 4), ("ben", 9), ("cal", 1), ("dee", 7), ("eve", 3)]).await;
        let page = rank(&state, Some(1), Some(10)).await.unwrap();

        let scores: Vec<u32> = page.entries.iter().map(|user| user.score).collect();
        assert_eq!(scores, vec![9, 7, 4, 3, 1]);
        assert!(scores.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn ties_are_ordered_by_username_across_pages() {
        let state = ranked_state(&[("zed", 5), ("abe", 5), ("max", 5), ("kim", 8)]).await;

        let first = rank(&state, Some(1), Some(2)).await.unwrap();
        let second = rank(&state, Some(2), Some(2)).await.unwrap();
        let names: Vec<&str> = first
            .entries
            .iter()
            .chain(second.entries.iter())
            .map(|user| user.username.as_str())
            .collect();
        assert_eq!(names, vec!["kim", "abe", "max", "zed"]);
        assert_eq!(first.total_pages, 2);
    }

    #[tokio::test]
    async fn page_beyond_the_end_is_empty_with_totals() {
        let state = ranked_state(&[("amy", 4), ("ben", 9), ("cal", 1)]).await;
        let page = rank(&state, Some(5), Some(2)).await.unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 5);
    }

    #[tokio::test]
    async fn empty_leaderboard_has_zero_pages() {
        let state = ranked_state(&[]).await;
        let page = rank(&state, None, None).await.unwrap();
        assert!(page.entries.is_empty());
        assert_eq!((page.total, page.total_pages), (0, 0));
        assert_eq!((page.page, page.page_size), (1, 10));
    }

    #[test]
    fn paging_is_clamped() {
        let config = AppConfig::default();
        assert_eq!(clamp_paging(&config, Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_paging(&config, None, Some(5_000)), (1, 100));
        assert_eq!(clamp_paging(&config, Some(3), None), (3, 10));
    }
}
