//! `gamegate status`: ask a running server for its health.

use anyhow::Result;

use crate::terminal_output::{note_error, note_success};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/api/health");
    let client = reqwest::Client::new();

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            note_success(&format!("gamegate is running on port {port}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => {
            note_error(&format!("Health check on port {port} returned {}", resp.status()));
        }
        Err(_) => {
            note_error(&format!("gamegate is not running on port {port}"));
        }
    }

    Ok(())
}
