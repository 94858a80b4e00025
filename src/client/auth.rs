use super::{check_status, ClientError};
use crate::api::auth::{AuthResponse, UserResponse};
use crate::AUTH_API;
use serde_json::json;

pub async fn register(
    base_url: &str,
    username: &str,
    password: &str,
    nickname: Option<&str>,
) -> Result<UserResponse, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{base_url}/{AUTH_API}/register");
    let response = client
        .post(url)
        .json(&json!({
            "username": username,
            "password": password,
            "nickname": nickname,
        }))
        .send()
        .await?;
    let response = check_status(response, "register")?;
    Ok(response.json::<AuthResponse>().await?.user)
}

pub async fn login(
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<UserResponse, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{base_url}/{AUTH_API}/login");
    let response = client
        .post(url)
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    let response = check_status(response, "login")?;
    Ok(response.json::<AuthResponse>().await?.user)
}
