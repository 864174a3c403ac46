//! Taskhub Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AccessToken, DeleteResult, Health, MaintenanceResult, NewTask, Profile, ProfileList,
    ProfileUpdate, RegisterRequest, Registration, Stats, Task, TaskList, TaskSummary, TaskUpdate,
    WhoAmI,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Taskhub gateway client
///
/// Protected methods send the stored access token (see [`TaskhubClient::set_token`]).
///
/// # Example
///
/// ```no_run
/// use taskhub_sdk::TaskhubClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TaskhubClient::connect("http://127.0.0.1:9527")?;
/// let health = client.health().await?;
/// println!("daemon {} is {}", health.version, health.status);
/// # Ok(())
/// # }
/// ```
pub struct TaskhubClient {
    client: HttpClient,
    token: Option<String>,
}

/// Named params from a serializable struct or `json!` object
fn object_params(value: impl Serialize) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(value)? {
        Value::Object(map) => {
            for (key, value) in map {
                params.insert(&key, value)?;
            }
        }
        Value::Null => {}
        other => {
            return Err(SdkError::Other(format!(
                "Params must be an object, got {}",
                other
            )))
        }
    }
    Ok(params)
}

/// Merge `access_token` into an object of method fields
fn with_token(token: &str, body: impl Serialize) -> Result<Value> {
    let mut value = serde_json::to_value(body)?;
    match &mut value {
        Value::Object(map) => {
            map.insert("access_token".to_string(), Value::String(token.to_string()));
        }
        Value::Null => value = json!({ "access_token": token }),
        _ => return Err(SdkError::Other("Params must be an object".to_string())),
    }
    Ok(value)
}

impl TaskhubClient {
    /// Connect to the Taskhub daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: impl Serialize) -> Result<R> {
        let params = object_params(params)?;
        Ok(self.client.request(method, params).await?)
    }

    async fn call_authenticated<R: DeserializeOwned>(
        &self,
        method: &str,
        body: impl Serialize,
    ) -> Result<R> {
        let token = self.token.as_deref().ok_or(SdkError::MissingToken)?;
        self.call(method, with_token(token, body)?).await
    }

    /// system.health.v1
    pub async fn health(&self) -> Result<Health> {
        self.call("system.health.v1", json!({})).await
    }

    /// auth.register.v1
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration> {
        self.call("auth.register.v1", request).await
    }

    /// auth.login.v1; the token is returned, not stored
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        self.call(
            "auth.login.v1",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// auth.whoami.v1
    pub async fn whoami(&self) -> Result<WhoAmI> {
        self.call_authenticated("auth.whoami.v1", json!({})).await
    }

    /// profile.get.v1
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.call_authenticated("profile.get.v1", json!({ "user_id": user_id }))
            .await
    }

    /// profile.update.v1
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile> {
        let mut body = serde_json::to_value(update)?;
        if let Value::Object(map) = &mut body {
            map.insert("user_id".to_string(), Value::String(user_id.to_string()));
        }
        self.call_authenticated("profile.update.v1", body).await
    }

    /// profile.delete.v1 (admin)
    pub async fn delete_profile(&self, user_id: &str) -> Result<DeleteResult> {
        self.call_authenticated("profile.delete.v1", json!({ "user_id": user_id }))
            .await
    }

    /// profile.list.v1 (admin)
    pub async fn list_profiles(&self, limit: Option<i64>, offset: Option<i64>) -> Result<ProfileList> {
        self.call_authenticated(
            "profile.list.v1",
            json!({ "limit": limit, "offset": offset }),
        )
        .await
    }

    /// task.create.v1
    pub async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.call_authenticated("task.create.v1", task).await
    }

    /// task.get.v1
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.call_authenticated("task.get.v1", json!({ "task_id": task_id }))
            .await
    }

    /// task.list.v1
    ///
    /// # Arguments
    ///
    /// * `status` - Only tasks in this status (`TODO`, `IN_PROGRESS`, ...)
    pub async fn list_tasks(
        &self,
        status: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<TaskList> {
        self.call_authenticated(
            "task.list.v1",
            json!({ "status": status, "limit": limit, "offset": offset }),
        )
        .await
    }

    /// task.update.v1
    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let mut body = serde_json::to_value(update)?;
        if let Value::Object(map) = &mut body {
            map.insert("task_id".to_string(), Value::String(task_id.to_string()));
        }
        self.call_authenticated("task.update.v1", body).await
    }

    /// task.transition.v1
    ///
    /// # Arguments
    ///
    /// * `action` - `start`, `complete`, `reopen` or `archive`
    pub async fn transition_task(&self, task_id: &str, action: &str) -> Result<Task> {
        self.call_authenticated(
            "task.transition.v1",
            json!({ "task_id": task_id, "action": action }),
        )
        .await
    }

    /// task.delete.v1
    pub async fn delete_task(&self, task_id: &str) -> Result<DeleteResult> {
        self.call_authenticated("task.delete.v1", json!({ "task_id": task_id }))
            .await
    }

    /// task.summary.v1
    pub async fn task_summary(&self) -> Result<TaskSummary> {
        self.call_authenticated("task.summary.v1", json!({})).await
    }

    /// admin.stats.v1 (admin)
    pub async fn stats(&self) -> Result<Stats> {
        self.call_authenticated("admin.stats.v1", json!({})).await
    }

    /// admin.maintenance.v1 (admin)
    pub async fn run_maintenance(&self, force_vacuum: bool) -> Result<MaintenanceResult> {
        self.call_authenticated(
            "admin.maintenance.v1",
            json!({ "force_vacuum": force_vacuum }),
        )
        .await
    }
}
