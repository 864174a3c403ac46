//! Simple SDK Example
//!
//! Registers an account, logs in and walks one task through its lifecycle.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    TASKHUB__AUTH__JWT_SECRET=$(openssl rand -hex 32) cargo run --package taskhub-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package taskhub-sdk --example simple
//!    ```

use taskhub_sdk::{code, NewTask, RegisterRequest, TaskhubClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Taskhub SDK - Simple Example");
    println!("============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let mut client = TaskhubClient::connect("http://127.0.0.1:9527")?;
    let health = client.health().await?;
    println!("   ✓ Connected (v{}, up {}s)\n", health.version, health.uptime_seconds);

    // 2. Register (an existing account is fine)
    println!("2. Registering demo account...");
    let registered = client
        .register(RegisterRequest {
            username: "demo".to_string(),
            password: "demo-password".to_string(),
            display_name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
        })
        .await;
    match registered {
        Ok(r) => println!("   ✓ Registered {} ({})\n", r.username, r.account_id),
        Err(e) if e.code() == Some(code::CONFLICT) => println!("   ✓ Already registered\n"),
        Err(e) => return Err(e.into()),
    }

    // 3. Log in
    println!("3. Logging in...");
    let token = client.login("demo", "demo-password").await?;
    client.set_token(token.token);
    println!("   ✓ Token expires at {}\n", token.expires_at);

    // 4. Create and progress a task
    println!("4. Creating a task...");
    let task = client
        .create_task(NewTask {
            title: "Try the Taskhub SDK".to_string(),
            priority: 5,
            ..NewTask::default()
        })
        .await?;
    println!("   ✓ Task {} is {}", task.id, task.status);

    let task = client.transition_task(&task.id, "start").await?;
    println!("   ✓ Task {} is {}", task.id, task.status);
    let task = client.transition_task(&task.id, "complete").await?;
    println!("   ✓ Task {} is {}\n", task.id, task.status);

    // 5. Summary
    println!("5. Task summary:");
    let summary = client.task_summary().await?;
    for entry in &summary.by_status {
        println!("     - {}: {}", entry.status, entry.count);
    }
    println!("     total: {}", summary.total);

    Ok(())
}
