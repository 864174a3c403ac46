//! Taskhub SDK - Rust Client Library
//!
//! Provides a convenient client for the Taskhub daemon's JSON-RPC gateway.
//!
//! # Example
//!
//! ```no_run
//! use taskhub_sdk::{NewTask, TaskhubClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = TaskhubClient::connect("http://127.0.0.1:9527")?;
//!
//!     let token = client.login("alice", "correct horse battery").await?;
//!     client.set_token(token.token);
//!
//!     let task = client.create_task(NewTask::titled("Write release notes")).await?;
//!     println!("Created {} ({})", task.id, task.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::TaskhubClient;
pub use error::{code, Result, SdkError};
pub use types::{
    AccessToken, DeleteResult, Health, MaintenanceResult, NewTask, Profile, ProfileList,
    ProfileUpdate, RegisterRequest, Registration, Stats, StatusCount, Task, TaskList,
    TaskSummary, TaskUpdate, WhoAmI,
};
