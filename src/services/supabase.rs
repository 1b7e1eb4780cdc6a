// HTTP implementation of the remote contract against a Supabase-hosted
// PostgREST API: select-with-order-and-range reads, insert-returning writes,
// and an RPC for counter bumps.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{FeedError, Result};
use crate::models::{NewProblem, NewSolution, Problem, Solution};
use crate::services::remote::{CounterField, RemoteStore};

/// Typed client for the hosted backend.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&config.api_key) {
                headers.insert("apikey", value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", config.api_key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn check<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn insert_returning<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        // PostgREST returns the inserted rows as an array.
        let mut rows: Vec<T> = Self::check(response).await?;
        rows.pop().ok_or(FeedError::Backend {
            status: 200,
            message: "insert returned no rows".to_string(),
        })
    }
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn list_problems(&self, offset: u32, limit: u32) -> Result<Vec<Problem>> {
        debug!("fetching problems offset={} limit={}", offset, limit);
        let response = self
            .http
            .get(self.table_url("problems"))
            .query(&[
                ("select", "*"),
                ("order", "created_at.desc"),
                ("offset", &offset.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;
        Self::check(response).await
    }

    async fn list_solutions(&self, problem_id: i64) -> Result<Vec<Solution>> {
        debug!("fetching solutions for problem {}", problem_id);
        let response = self
            .http
            .get(self.table_url("solutions"))
            .query(&[
                ("select", "*"),
                ("problem_id", &format!("eq.{}", problem_id)),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;
        Self::check(response).await
    }

    async fn insert_problem(&self, new: NewProblem) -> Result<Problem> {
        self.insert_returning("problems", &new).await
    }

    async fn insert_solution(&self, new: NewSolution) -> Result<Solution> {
        self.insert_returning("solutions", &new).await
    }

    async fn increment_counter(&self, field: CounterField, id: i64) -> Result<i64> {
        // Server-side function bumps the column and returns the new value,
        // replacing the prototype's fire-and-forget RPC.
        let response = self
            .http
            .post(format!("{}/rest/v1/rpc/increment_counter", self.base_url))
            .json(&serde_json::json!({
                "target_table": field.collection(),
                "target_column": field.column(),
                "row_id": id,
            }))
            .send()
            .await?;
        Self::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let config = AppConfig {
            base_url: "https://example.supabase.co/".to_string(),
            ..AppConfig::default()
        };
        let client = SupabaseClient::new(&config).unwrap();
        assert_eq!(
            client.table_url("problems"),
            "https://example.supabase.co/rest/v1/problems"
        );
    }

    #[test]
    fn counter_fields_map_to_collections() {
        assert_eq!(CounterField::SolutionsCount.collection(), "problems");
        assert_eq!(CounterField::Upvotes.collection(), "solutions");
        assert_eq!(CounterField::Downvotes.column(), "downvotes");
    }
}
