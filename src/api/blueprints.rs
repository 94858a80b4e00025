use super::{get_connection, ApiError, AppState, StatusResponse};
use crate::tables::NewTaskBlueprint;
use crate::tree::{default_blueprint_tree, TaskNode};
use crate::{BLUEPRINT_API, BLUEPRINT_ROOTS_API, BLUEPRINT_TREE_API};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use diesel::dsl::now;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::trees::TreeResponse;

#[derive(Serialize, Deserialize)]
pub struct SaveBlueprintRequest {
    pub nodes: Option<Vec<TaskNode>>,
    pub root_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct BlueprintRootsResponse {
    pub success: bool,
    pub roots: Vec<TaskNode>,
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            format!("/{BLUEPRINT_ROOTS_API}/:user_id").as_str(),
            get(list_blueprint_roots),
        )
        .route(
            format!("/{BLUEPRINT_TREE_API}/:user_id/:root_id").as_str(),
            get(get_blueprint_tree),
        )
        .route(
            format!("/{BLUEPRINT_API}/:user_id").as_str(),
            post(save_blueprint),
        )
        .route(
            format!("/{BLUEPRINT_API}/:user_id/:root_id").as_str(),
            delete(delete_blueprint),
        )
}

/// Root-node summaries for every blueprint the user owns, newest first,
/// read from the `blueprint_root` column without touching the full trees.
async fn list_blueprint_roots(
    State(state): State<AppState>,
    Path(user): Path<i32>,
) -> Result<Json<BlueprintRootsResponse>, ApiError> {
    use crate::schema::task_blueprints;

    info!("GET blueprint-roots user {user}");
    let mut conn = get_connection(&state)?;

    let rows: Vec<String> = task_blueprints::table
        .filter(task_blueprints::user_id.eq(user))
        .order((
            task_blueprints::created_at.desc(),
            task_blueprints::id.desc(),
        ))
        .select(task_blueprints::blueprint_root)
        .load(&mut conn)?;

    let roots = rows
        .iter()
        .map(|data| serde_json::from_str::<TaskNode>(data))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(BlueprintRootsResponse {
        success: true,
        roots,
    }))
}

async fn get_blueprint_tree(
    State(state): State<AppState>,
    Path((user, root)): Path<(i32, String)>,
) -> Result<Json<TreeResponse>, ApiError> {
    use crate::schema::task_blueprints;

    info!("GET blueprint-tree user {user} root {root}");
    let mut conn = get_connection(&state)?;

    let stored = task_blueprints::table
        .filter(
            task_blueprints::user_id
                .eq(user)
                .and(task_blueprints::root_id.eq(&root)),
        )
        .select(task_blueprints::blueprint_tree)
        .first::<String>(&mut conn)
        .optional()?;

    let nodes = match stored {
        Some(data) => serde_json::from_str::<Vec<TaskNode>>(&data)?,
        None => {
            let nodes = default_blueprint_tree(root.parse::<i64>().ok());
            let root_data = serde_json::to_string(&nodes[0].without_children())?;
            let tree_data = serde_json::to_string(&nodes)?;
            diesel::insert_into(task_blueprints::table)
                .values(&NewTaskBlueprint {
                    user_id: user,
                    root_id: &root,
                    blueprint_root: &root_data,
                    blueprint_tree: &tree_data,
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

async fn save_blueprint(
    State(state): State<AppState>,
    Path(user): Path<i32>,
    Json(payload): Json<SaveBlueprintRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::task_blueprints;

    let root_id = payload
        .root_id
        .ok_or_else(|| ApiError::Validation("root_id is required".to_string()))?
        .to_string();
    let nodes = payload
        .nodes
        .filter(|nodes| !nodes.is_empty())
        .ok_or_else(|| ApiError::Validation("nodes must not be empty".to_string()))?;
    info!("POST blueprint user {user} root {root_id}");

    // The root's own fields are stored apart from the full tree so listing
    // stays cheap.
    let root_data = serde_json::to_string(&nodes[0].without_children())?;
    let tree_data = serde_json::to_string(&nodes)?;

    let mut conn = get_connection(&state)?;
    diesel::insert_into(task_blueprints::table)
        .values(&NewTaskBlueprint {
            user_id: user,
            root_id: &root_id,
            blueprint_root: &root_data,
            blueprint_tree: &tree_data,
        })
        .on_conflict((task_blueprints::user_id, task_blueprints::root_id))
        .do_update()
        .set((
            task_blueprints::blueprint_root.eq(&root_data),
            task_blueprints::blueprint_tree.eq(&tree_data),
            task_blueprints::updated_at.eq(now.nullable()),
        ))
        .execute(&mut conn)?;

    Ok(Json(StatusResponse { success: true }))
}

async fn delete_blueprint(
    State(state): State<AppState>,
    Path((user, root)): Path<(i32, String)>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::task_blueprints;

    info!("DELETE blueprint user {user} root {root}");
    let mut conn = get_connection(&state)?;

    // The affected-row count is the only NotFound signal here; the delete
    // itself succeeds either way.
    let affected = diesel::delete(
        task_blueprints::table.filter(
            task_blueprints::user_id
                .eq(user)
                .and(task_blueprints::root_id.eq(&root)),
        ),
    )
    .execute(&mut conn)?;

    if affected == 0 {
        return Err(ApiError::NotFound("no blueprint for that root"));
    }

    Ok(Json(StatusResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::tree::TaskNode;
    use std::sync::Arc;

    fn setup_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("blueprints_test.db");
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

    fn blueprint_nodes(root_id: i64) -> Vec<TaskNode> {
        vec![TaskNode {
            id: root_id,
            parent_id: None,
            text: "morning routine".to_string(),
            comment: String::new(),
            estimated_time: 30,
            remaining_time: 1800,
            elapsed_time: 0,
            start_time: 0,
            completed: 0,
            hidden: 0,
            time_stamp: String::new(),
            children: vec![TaskNode {
                id: root_id + 1,
                parent_id: Some(root_id),
                text: "stretch".to_string(),
                comment: String::new(),
                estimated_time: 10,
                remaining_time: 600,
                elapsed_time: 0,
                start_time: 0,
                completed: 0,
                hidden: 0,
                time_stamp: String::new(),
                children: Vec::new(),
            }],
        }]
    }

    #[tokio::test]
    async fn test_blueprint_roundtrip_and_root_listing() {
        let (state, _dir) = setup_test_state();
        let nodes = blueprint_nodes(100);

        save_blueprint(
            State(state.clone()),
            Path(1),
            Json(SaveBlueprintRequest {
                nodes: Some(nodes.clone()),
                root_id: Some(100),
            }),
        )
        .await
        .expect("save blueprint");

        let tree = get_blueprint_tree(State(state.clone()), Path((1, "100".to_string())))
            .await
            .expect("get blueprint tree");
        assert_eq!(tree.0.nodes, nodes);

        let roots = list_blueprint_roots(State(state), Path(1))
            .await
            .expect("list roots");
        assert_eq!(roots.0.roots.len(), 1);
        assert_eq!(roots.0.roots[0].id, 100);
        // Stored roots carry no subtree.
        assert!(roots.0.roots[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_blueprint_is_not_found() {
        let (state, _dir) = setup_test_state();

        let result = delete_blueprint(State(state), Path((1, "12345".to_string()))).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_blueprint_seeds_placeholder_once() {
        let (state, _dir) = setup_test_state();

        let first = get_blueprint_tree(State(state.clone()), Path((4, "555".to_string())))
            .await
            .expect("first get");
        assert_eq!(first.0.nodes.len(), 1);
        assert_eq!(first.0.nodes[0].id, 555);

        let second = get_blueprint_tree(State(state.clone()), Path((4, "555".to_string())))
            .await
            .expect("second get");
        assert_eq!(first.0.nodes, second.0.nodes);

        // The seeded placeholder is a real row: deletable exactly once.
        delete_blueprint(State(state.clone()), Path((4, "555".to_string())))
            .await
            .expect("delete seeded blueprint");
        let gone = delete_blueprint(State(state), Path((4, "555".to_string()))).await;
        assert!(matches!(gone, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_blueprint_requires_root_id_and_nodes() {
        let (state, _dir) = setup_test_state();

        let missing_root = save_blueprint(
            State(state.clone()),
            Path(1),
            Json(SaveBlueprintRequest {
                nodes: Some(blueprint_nodes(7)),
                root_id: None,
            }),
        )
        .await;
        assert!(matches!(missing_root, Err(ApiError::Validation(_))));

        let empty_nodes = save_blueprint(
            State(state),
            Path(1),
            Json(SaveBlueprintRequest {
                nodes: Some(Vec::new()),
                root_id: Some(7),
            }),
        )
        .await;
        assert!(matches!(empty_nodes, Err(ApiError::Validation(_))));
    }
}
