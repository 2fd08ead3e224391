/// Destination catalog access and seeding.
pub mod catalog;
/// Challenge creation and resolution.
pub mod challenge_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Guess evaluation against the catalog.
pub mod guess_service;
/// Health check service.
pub mod health_service;
/// Paginated global ranking.
pub mod leaderboard_service;
/// Multiple-choice question assembly.
pub mod question_service;
/// High score reconciliation and user registration.
pub mod score_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
