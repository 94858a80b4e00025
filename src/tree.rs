use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Summary accumulation stops descending past this depth. Trees are built
/// cycle-free by the client, so the bound only protects the stack against a
/// pathological payload.
pub const MAX_TREE_DEPTH: usize = 64;

/// One node of a day's task tree. The client owns the authoritative
/// in-memory structure and round-trips it wholesale; the server stores the
/// whole forest as a JSON text column keyed by `(user_id, tree_date)`.
///
/// Field names follow the wire format of the original clients (`parentId`,
/// `timeStamp`, ...), and stored rows must keep parsing across versions, so
/// every field except `id` and `text` is tolerant of being absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub estimated_time: i64,
    #[serde(default)]
    pub remaining_time: i64,
    #[serde(default)]
    pub elapsed_time: i64,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub completed: i64,
    #[serde(default)]
    pub hidden: i64,
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    /// Own `elapsedTime` plus the post-order sum over all descendants,
    /// bounded by [`MAX_TREE_DEPTH`].
    pub fn total_time(&self) -> i64 {
        fn walk(node: &TaskNode, depth: usize) -> i64 {
            let mut total = node.elapsed_time;
            if depth < MAX_TREE_DEPTH {
                for child in &node.children {
                    total += walk(child, depth + 1);
                }
            }
            total
        }
        walk(self, 0)
    }

    /// The node's own fields with the subtree stripped, as stored in the
    /// `blueprint_root` column so roots can be listed without deserializing
    /// full trees.
    pub fn without_children(&self) -> TaskNode {
        TaskNode {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// Per-root digest persisted to `task_summaries` on every tree save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootSummary {
    pub id: i64,
    pub text: String,
    pub completed: i64,
    pub total_time: i64,
}

/// Project a saved forest into its per-day summary: one entry per root with
/// `hidden == 0`, carrying the recursive elapsed-time total.
pub fn summarize_roots(nodes: &[TaskNode]) -> Vec<RootSummary> {
    nodes
        .iter()
        .filter(|node| node.hidden == 0)
        .map(|node| RootSummary {
            id: node.id,
            text: node.text.clone(),
            completed: node.completed,
            total_time: node.total_time(),
        })
        .collect()
}

/// The single-root tree synthesized on first read of an unseen
/// `(user, date)` key. Defaults match the original clients' expectations.
pub fn default_tree(date: &str) -> Vec<TaskNode> {
    vec![TaskNode {
        id: Utc::now().timestamp_millis(),
        parent_id: None,
        text: "根任务".to_string(),
        comment: "这是根任务".to_string(),
        estimated_time: 90,
        remaining_time: 5400,
        elapsed_time: 0,
        start_time: 0,
        completed: 0,
        hidden: 0,
        time_stamp: date.to_string(),
        children: Vec::new(),
    }]
}

/// The placeholder blueprint seeded on first read of an unseen
/// `(user, root)` key: the default tree with no date binding, re-keyed to
/// the requested root when it parses as a node id.
pub fn default_blueprint_tree(root_id: Option<i64>) -> Vec<TaskNode> {
    let mut nodes = default_tree("");
    if let Some(id) = root_id {
        nodes[0].id = id;
    }
    nodes
}

/// One entry of a day's rest list, a flat record with no tree structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestItem {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub rest_time: i64,
}

pub fn default_rest_list() -> Vec<RestItem> {
    vec![RestItem {
        id: Utc::now().timestamp_millis(),
        text: "休息一下".to_string(),
        rest_time: 0,
    }]
}
