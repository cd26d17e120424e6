use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};

/// Shared HTTP client for one Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    service_role_key: String,
    http: Client,
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Supabase HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request against `/auth/v1/{path}`, authenticated as the user holding
    /// `bearer` (or anonymously).
    pub(crate) fn auth_request(
        &self,
        method: reqwest::Method,
        path: &str,
        bearer: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}/auth/v1/{}", self.base_url, path);
        let req = self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key);
        match bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Request against `/rest/v1/{table}` with service-role privileges.
    pub(crate) fn rest_request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.http
            .request(method, url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }
}
