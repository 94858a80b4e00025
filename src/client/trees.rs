use super::{check_status, ClientError};
use crate::api::trees::{SummaryPageResponse, TreeResponse};
use crate::tree::TaskNode;
use crate::{SUMMARY_API, TREE_API};
use serde_json::json;

/// Fetch the day's tree, creating the server-side default if none exists.
pub async fn fetch_task_tree(
    base_url: &str,
    user_id: i32,
    date: &str,
) -> Result<Vec<TaskNode>, ClientError> {
    let url = format!("{base_url}/{TREE_API}/{user_id}/{date}");
    let response = check_status(reqwest::get(url).await?, "task tree")?;
    let tree = response.json::<TreeResponse>().await?;
    Ok(tree.nodes)
}

/// Replace the day's tree wholesale.
pub async fn save_task_tree(
    base_url: &str,
    user_id: i32,
    date: &str,
    nodes: &[TaskNode],
) -> Result<(), ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{base_url}/{TREE_API}/{user_id}/{date}");
    let response = client.post(url).json(&json!({ "nodes": nodes })).send().await?;
    check_status(response, "task tree")?;
    Ok(())
}

/// Fetch one page of the summary history, newest dates first.
pub async fn fetch_summaries(
    base_url: &str,
    user_id: i32,
    page: i64,
) -> Result<SummaryPageResponse, ClientError> {
    let url = format!("{base_url}/{SUMMARY_API}/{user_id}?page={page}");
    let response = check_status(reqwest::get(url).await?, "task summaries")?;
    Ok(response.json::<SummaryPageResponse>().await?)
}
