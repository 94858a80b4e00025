use super::{get_connection, ApiError, AppState, StatusResponse};
use crate::tables::{NewTaskSummary, NewTaskTree};
use crate::tree::{default_tree, summarize_roots, RootSummary, TaskNode};
use crate::{SUMMARY_API, TREE_API};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use diesel::dsl::now;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

pub const SUMMARY_PAGE_SIZE: i64 = 10;

#[derive(Serialize, Deserialize)]
pub struct TreeResponse {
    pub success: bool,
    pub nodes: Vec<TaskNode>,
}

#[derive(Serialize, Deserialize)]
pub struct SaveTreeRequest {
    pub nodes: Option<Vec<TaskNode>>,
}

#[derive(Deserialize)]
pub struct SummaryParams {
    pub page: Option<i64>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub has_more: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPageResponse {
    pub success: bool,
    pub summaries_by_date: HashMap<String, Vec<RootSummary>>,
    pub times_by_date: HashMap<String, i64>,
    pub pagination: Pagination,
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            format!("/{TREE_API}/:user_id/:date").as_str(),
            get(get_task_tree).post(save_task_tree),
        )
        .route(
            format!("/{SUMMARY_API}/:user_id").as_str(),
            get(list_task_summaries),
        )
}

async fn get_task_tree(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
) -> Result<Json<TreeResponse>, ApiError> {
    use crate::schema::task_trees;

    info!("GET task-tree user {user} date {date}");
    let mut conn = get_connection(&state)?;

    let stored = task_trees::table
        .filter(
            task_trees::user_id
                .eq(user)
                .and(task_trees::tree_date.eq(&date)),
        )
        .select(task_trees::tree_data)
        .first::<String>(&mut conn)
        .optional()?;

    let nodes = match stored {
        Some(data) => serde_json::from_str::<Vec<TaskNode>>(&data)?,
        None => {
            let nodes = default_tree(&date);
            let data = serde_json::to_string(&nodes)?;
            diesel::insert_into(task_trees::table)
                .values(&NewTaskTree {
                    user_id: user,
                    tree_date: &date,
                    tree_data: &data,
                })
                .execute(&mut conn)?;
            nodes
        }
    };

    Ok(Json(TreeResponse {
        success: true,
        nodes,
    }))
}

async fn save_task_tree(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
    Json(payload): Json<SaveTreeRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::task_trees;

    let nodes = payload
        .nodes
        .ok_or_else(|| ApiError::Validation("nodes are required".to_string()))?;
    info!("POST task-tree user {user} date {date}");

    let data = serde_json::to_string(&nodes)?;
    {
        let mut conn = get_connection(&state)?;
        diesel::insert_into(task_trees::table)
            .values(&NewTaskTree {
                user_id: user,
                tree_date: &date,
                tree_data: &data,
            })
            .on_conflict((task_trees::user_id, task_trees::tree_date))
            .do_update()
            .set((
                task_trees::tree_data.eq(&data),
                task_trees::updated_at.eq(now.nullable()),
            ))
            .execute(&mut conn)?;
    }

    // The summary is a best-effort cache, derived off the request path; a
    // failure here must not fail the save.
    tokio::spawn(async move {
        if let Err(err) = store_summary(&state, user, &date, &nodes) {
            warn!("summary derivation failed for user {user} date {date}: {err}");
        }
    });

    Ok(Json(StatusResponse { success: true }))
}

/// Recompute and upsert the per-day summary row for `(user, date)`. The
/// projection always replaces the prior row in full.
pub(crate) fn store_summary(
    state: &AppState,
    user: i32,
    date: &str,
    nodes: &[TaskNode],
) -> Result<(), ApiError> {
    use crate::schema::task_summaries;

    let summary = summarize_roots(nodes);
    let data = serde_json::to_string(&summary)?;
    let mut conn = get_connection(state)?;

    diesel::insert_into(task_summaries::table)
        .values(&NewTaskSummary {
            user_id: user,
            summary_date: date,
            summary_data: &data,
        })
        .on_conflict((task_summaries::user_id, task_summaries::summary_date))
        .do_update()
        .set((
            task_summaries::summary_data.eq(&data),
            task_summaries::updated_at.eq(now.nullable()),
        ))
        .execute(&mut conn)?;

    Ok(())
}

async fn list_task_summaries(
    State(state): State<AppState>,
    Path(user): Path<i32>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryPageResponse>, ApiError> {
    use crate::schema::{task_summaries, work_times};

    let page = params.page.unwrap_or(1).max(1);
    info!("GET task-summary user {user} page {page}");
    let mut conn = get_connection(&state)?;

    let rows: Vec<(String, String)> = task_summaries::table
        .filter(task_summaries::user_id.eq(user))
        .order(task_summaries::summary_date.desc())
        .limit(SUMMARY_PAGE_SIZE)
        .offset((page - 1) * SUMMARY_PAGE_SIZE)
        .select((task_summaries::summary_date, task_summaries::summary_data))
        .load(&mut conn)?;

    let total: i64 = task_summaries::table
        .filter(task_summaries::user_id.eq(user))
        .count()
        .get_result(&mut conn)?;

    let dates: Vec<&str> = rows.iter().map(|(date, _)| date.as_str()).collect();
    let times_by_date: HashMap<String, i64> = work_times::table
        .filter(
            work_times::user_id
                .eq(user)
                .and(work_times::work_date.eq_any(dates)),
        )
        .select((work_times::work_date, work_times::total_time))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let mut summaries_by_date = HashMap::new();
    for (date, data) in rows {
        let summary: Vec<RootSummary> = serde_json::from_str(&data)?;
        summaries_by_date.insert(date, summary);
    }

    Ok(Json(SummaryPageResponse {
        success: true,
        summaries_by_date,
        times_by_date,
        pagination: Pagination {
            total,
            page,
            page_size: SUMMARY_PAGE_SIZE,
            has_more: total > page * SUMMARY_PAGE_SIZE,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::sync::Arc;

    fn setup_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("trees_test.db");
        let pool = db::build_pool(db_path.to_str().expect("utf-8 path")).expect("build pool");
        {
            let mut conn = pool.get().expect("checkout connection");
            db::init_database(&mut conn).expect("init schema");
        }
        (
            AppState {
                pool: Arc::new(pool),
            },
            dir,
        )
    }

    fn node(id: i64, elapsed: i64, children: Vec<TaskNode>) -> TaskNode {
        TaskNode {
            id,
            parent_id: None,
            text: format!("task {id}"),
            comment: String::new(),
            estimated_time: 0,
            remaining_time: 0,
            elapsed_time: elapsed,
            start_time: 0,
            completed: 0,
            hidden: 0,
            time_stamp: "2024-1-5".to_string(),
            children,
        }
    }

    #[tokio::test]
    async fn test_get_task_tree_creates_default_once() {
        let (state, _dir) = setup_test_state();

        let first = get_task_tree(State(state.clone()), Path((1, "2024-1-5".to_string())))
            .await
            .expect("first get");
        let second = get_task_tree(State(state), Path((1, "2024-1-5".to_string())))
            .await
            .expect("second get");

        assert_eq!(first.0.nodes.len(), 1);
        assert_eq!(first.0.nodes[0].text, "根任务");
        // The second read returns the persisted tree, ids included.
        assert_eq!(first.0.nodes, second.0.nodes);
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips_nested_tree() {
        let (state, _dir) = setup_test_state();

        let deep = node(5, 1, vec![node(6, 2, vec![node(7, 3, vec![])])]);
        let saved = vec![node(1, 0, vec![node(2, 10, vec![node(3, 20, vec![deep])])])];

        save_task_tree(
            State(state.clone()),
            Path((9, "2024-2-1".to_string())),
            Json(SaveTreeRequest {
                nodes: Some(saved.clone()),
            }),
        )
        .await
        .expect("save tree");

        let fetched = get_task_tree(State(state), Path((9, "2024-2-1".to_string())))
            .await
            .expect("get tree");
        assert_eq!(fetched.0.nodes, saved);
    }

    #[tokio::test]
    async fn test_store_summary_filters_hidden_and_totals_time() {
        let (state, _dir) = setup_test_state();

        let mut hidden = node(8, 99, vec![]);
        hidden.hidden = 1;
        let visible = node(1, 0, vec![node(2, 10, vec![]), node(3, 20, vec![node(4, 5, vec![])])]);

        store_summary(&state, 2, "2024-3-1", &[visible, hidden]).expect("store summary");

        let page = list_task_summaries(
            State(state),
            Path(2),
            Query(SummaryParams { page: None }),
        )
        .await
        .expect("list summaries");

        let summary = &page.0.summaries_by_date["2024-3-1"];
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].id, 1);
        assert_eq!(summary[0].total_time, 35);
    }

    #[tokio::test]
    async fn test_summary_pagination_counts() {
        let (state, _dir) = setup_test_state();

        for day in 1..=12 {
            let date = format!("2024-4-{day}");
            store_summary(&state, 3, &date, &[node(day, day, vec![])]).expect("store summary");
        }

        let first = list_task_summaries(
            State(state.clone()),
            Path(3),
            Query(SummaryParams { page: Some(1) }),
        )
        .await
        .expect("first page");
        assert_eq!(first.0.summaries_by_date.len(), 10);
        assert_eq!(first.0.pagination.total, 12);
        assert!(first.0.pagination.has_more);

        let second = list_task_summaries(
            State(state),
            Path(3),
            Query(SummaryParams { page: Some(2) }),
        )
        .await
        .expect("second page");
        assert_eq!(second.0.summaries_by_date.len(), 2);
        assert!(!second.0.pagination.has_more);
    }
}
