pub mod models;
pub mod storage;
pub mod trivia_store;
