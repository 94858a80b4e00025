use super::{get_connection, ApiError, AppState, StatusResponse};
use crate::tables::{NewNote, NewRestList, NewWorkTime};
use crate::tree::{default_rest_list, RestItem};
use crate::{NOTE_API, REST_LIST_API, WORK_TIME_API};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use diesel::dsl::now;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTimeResponse {
    pub success: bool,
    pub total_time: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWorkTimeRequest {
    pub total_time: Option<i64>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestListResponse {
    pub success: bool,
    pub rest_list: Vec<RestItem>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRestListRequest {
    pub rest_list: Option<Vec<RestItem>>,
}

#[derive(Serialize, Deserialize)]
pub struct NoteResponse {
    pub success: bool,
    pub note: String,
}

#[derive(Serialize, Deserialize)]
pub struct SaveNoteRequest {
    pub note: Option<String>,
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            format!("/{WORK_TIME_API}/:user_id/:date").as_str(),
            get(get_work_time).post(save_work_time),
        )
        .route(
            format!("/{REST_LIST_API}/:user_id/:date").as_str(),
            get(get_rest_list).post(save_rest_list),
        )
        .route(
            format!("/{NOTE_API}/:user_id/:date").as_str(),
            get(get_note).post(save_note),
        )
}

// Work times and notes answer a default without inserting; rest lists
// persist their default on first read, like task trees.

async fn get_work_time(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
) -> Result<Json<WorkTimeResponse>, ApiError> {
    use crate::schema::work_times;

    info!("GET work-time user {user} date {date}");
    let mut conn = get_connection(&state)?;

    let total_time = work_times::table
        .filter(
            work_times::user_id
                .eq(user)
                .and(work_times::work_date.eq(&date)),
        )
        .select(work_times::total_time)
        .first::<i64>(&mut conn)
        .optional()?
        .unwrap_or(0);

    Ok(Json(WorkTimeResponse {
        success: true,
        total_time,
    }))
}

async fn save_work_time(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
    Json(payload): Json<SaveWorkTimeRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::work_times;

    let total_time = payload
        .total_time
        .ok_or_else(|| ApiError::Validation("totalTime is required".to_string()))?;
    info!("POST work-time user {user} date {date} time {total_time}");

    let mut conn = get_connection(&state)?;
    diesel::insert_into(work_times::table)
        .values(&NewWorkTime {
            user_id: user,
            work_date: &date,
            total_time,
        })
        .on_conflict((work_times::user_id, work_times::work_date))
        .do_update()
        .set((
            work_times::total_time.eq(total_time),
            work_times::updated_at.eq(now.nullable()),
        ))
        .execute(&mut conn)?;

    Ok(Json(StatusResponse { success: true }))
}

async fn get_rest_list(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
) -> Result<Json<RestListResponse>, ApiError> {
    use crate::schema::rest_lists;

    info!("GET rest-list user {user} date {date}");
    let mut conn = get_connection(&state)?;

    let stored = rest_lists::table
        .filter(
            rest_lists::user_id
                .eq(user)
                .and(rest_lists::rest_date.eq(&date)),
        )
        .select(rest_lists::rest_data)
        .first::<String>(&mut conn)
        .optional()?;

    let rest_list = match stored {
        Some(data) => serde_json::from_str::<Vec<RestItem>>(&data)?,
        None => {
            let rest_list = default_rest_list();
            let data = serde_json::to_string(&rest_list)?;
            diesel::insert_into(rest_lists::table)
                .values(&NewRestList {
                    user_id: user,
                    rest_date: &date,
                    rest_data: &data,
                })
                .execute(&mut conn)?;
            rest_list
        }
    };

    Ok(Json(RestListResponse {
        success: true,
        rest_list,
    }))
}

async fn save_rest_list(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
    Json(payload): Json<SaveRestListRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::rest_lists;

    let rest_list = payload
        .rest_list
        .ok_or_else(|| ApiError::Validation("restList is required".to_string()))?;
    info!("POST rest-list user {user} date {date}");

    let data = serde_json::to_string(&rest_list)?;
    let mut conn = get_connection(&state)?;
    diesel::insert_into(rest_lists::table)
        .values(&NewRestList {
            user_id: user,
            rest_date: &date,
            rest_data: &data,
        })
        .on_conflict((rest_lists::user_id, rest_lists::rest_date))
        .do_update()
        .set((
            rest_lists::rest_data.eq(&data),
            rest_lists::updated_at.eq(now.nullable()),
        ))
        .execute(&mut conn)?;

    Ok(Json(StatusResponse { success: true }))
}

async fn get_note(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
) -> Result<Json<NoteResponse>, ApiError> {
    use crate::schema::notes;

    info!("GET note user {user} date {date}");
    let mut conn = get_connection(&state)?;

    let note = notes::table
        .filter(notes::user_id.eq(user).and(notes::note_date.eq(&date)))
        .select(notes::note_content)
        .first::<String>(&mut conn)
        .optional()?
        .unwrap_or_default();

    Ok(Json(NoteResponse {
        success: true,
        note,
    }))
}

async fn save_note(
    State(state): State<AppState>,
    Path((user, date)): Path<(i32, String)>,
    Json(payload): Json<SaveNoteRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    use crate::schema::notes;

    let note = payload
        .note
        .ok_or_else(|| ApiError::Validation("note is required".to_string()))?;
    info!("POST note user {user} date {date}");

    let mut conn = get_connection(&state)?;
    diesel::insert_into(notes::table)
        .values(&NewNote {
            user_id: user,
            note_date: &date,
            note_content: &note,
        })
        .on_conflict((notes::user_id, notes::note_date))
        .do_update()
        .set((
            notes::note_content.eq(&note),
            notes::updated_at.eq(now.nullable()),
        ))
        .execute(&mut conn)?;

    Ok(Json(StatusResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::sync::Arc;

    fn setup_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("daily_test.db");
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

    #[tokio::test]
    async fn test_work_time_defaults_to_zero_and_round_trips() {
        let (state, _dir) = setup_test_state();

        let empty = get_work_time(State(state.clone()), Path((1, "2024-1-5".to_string())))
            .await
            .expect("get default");
        assert_eq!(empty.0.total_time, 0);

        save_work_time(
            State(state.clone()),
            Path((1, "2024-1-5".to_string())),
            Json(SaveWorkTimeRequest {
                total_time: Some(3600),
            }),
        )
        .await
        .expect("save work time");

        let saved = get_work_time(State(state), Path((1, "2024-1-5".to_string())))
            .await
            .expect("get saved");
        assert_eq!(saved.0.total_time, 3600);
    }

    #[tokio::test]
    async fn test_work_time_requires_total_time() {
        let (state, _dir) = setup_test_state();

        let result = save_work_time(
            State(state),
            Path((1, "2024-1-5".to_string())),
            Json(SaveWorkTimeRequest { total_time: None }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rest_list_seeds_default_on_first_read() {
        let (state, _dir) = setup_test_state();

        let first = get_rest_list(State(state.clone()), Path((1, "2024-1-5".to_string())))
            .await
            .expect("first get");
        assert_eq!(first.0.rest_list.len(), 1);
        assert_eq!(first.0.rest_list[0].text, "休息一下");

        // The default was persisted, not just synthesized.
        let second = get_rest_list(State(state), Path((1, "2024-1-5".to_string())))
            .await
            .expect("second get");
        assert_eq!(first.0.rest_list, second.0.rest_list);
    }

    #[tokio::test]
    async fn test_note_round_trips_without_seeding() {
        let (state, _dir) = setup_test_state();

        let empty = get_note(State(state.clone()), Path((1, "2024-1-5".to_string())))
            .await
            .expect("get empty note");
        assert_eq!(empty.0.note, "");

        save_note(
            State(state.clone()),
            Path((1, "2024-1-5".to_string())),
            Json(SaveNoteRequest {
                note: Some("ship the release".to_string()),
            }),
        )
        .await
        .expect("save note");

        let saved = get_note(State(state), Path((1, "2024-1-5".to_string())))
            .await
            .expect("get saved note");
        assert_eq!(saved.0.note, "ship the release");
    }
}
