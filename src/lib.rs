pub mod api;
pub mod client;
pub mod db;
pub mod schema;
pub mod tables;
pub mod tree;
pub const BASE_URL: &str = "http://localhost:3002";
pub const AUTH_API: &str = "api/auth";
pub const TREE_API: &str = "api/task-tree";
pub const SUMMARY_API: &str = "api/task-summary";
pub const BLUEPRINT_API: &str = "api/task-blueprint";
pub const BLUEPRINT_ROOTS_API: &str = "api/task-blueprint-roots";
pub const BLUEPRINT_TREE_API: &str = "api/task-blueprint-tree";
pub const WORK_TIME_API: &str = "api/task-time";
pub const REST_LIST_API: &str = "api/rest-list";
pub const NOTE_API: &str = "api/note";
