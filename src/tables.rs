use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub nickname: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task_trees)]
pub struct TaskTree {
    pub id: i32,
    pub user_id: i32,
    pub tree_date: String,
    pub tree_data: String,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_trees)]
pub struct NewTaskTree<'a> {
    pub user_id: i32,
    pub tree_date: &'a str,
    pub tree_data: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task_summaries)]
pub struct TaskSummary {
    pub id: i32,
    pub user_id: i32,
    pub summary_date: String,
    pub summary_data: String,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_summaries)]
pub struct NewTaskSummary<'a> {
    pub user_id: i32,
    pub summary_date: &'a str,
    pub summary_data: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task_blueprints)]
pub struct TaskBlueprint {
    pub id: i32,
    pub user_id: i32,
    pub root_id: String,
    pub blueprint_root: String,
    pub blueprint_tree: String,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_blueprints)]
pub struct NewTaskBlueprint<'a> {
    pub user_id: i32,
    pub root_id: &'a str,
    pub blueprint_root: &'a str,
    pub blueprint_tree: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::work_times)]
pub struct WorkTime {
    pub id: i32,
    pub user_id: i32,
    pub work_date: String,
    pub total_time: i64,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_times)]
pub struct NewWorkTime<'a> {
    pub user_id: i32,
    pub work_date: &'a str,
    pub total_time: i64,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::rest_lists)]
pub struct RestList {
    pub id: i32,
    pub user_id: i32,
    pub rest_date: String,
    pub rest_data: String,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::rest_lists)]
pub struct NewRestList<'a> {
    pub user_id: i32,
    pub rest_date: &'a str,
    pub rest_data: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notes)]
pub struct Note {
    pub id: i32,
    pub user_id: i32,
    pub note_date: String,
    pub note_content: String,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notes)]
pub struct NewNote<'a> {
    pub user_id: i32,
    pub note_date: &'a str,
    pub note_content: &'a str,
}
