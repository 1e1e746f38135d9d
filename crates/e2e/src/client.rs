//! HTTP client that executes scenario steps against a running mock

use pizzamock_common::FixtureKind;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::spec::ScenarioStep;

/// Result of executing a scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    /// HTTP status of a request step
    pub status: Option<u16>,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> E2eResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Put the mock back to a fresh copy of `fixture`
    pub async fn reset(&self, fixture: FixtureKind) -> E2eResult<()> {
        let resp = self
            .http
            .post(format!("{}/__mock/reset", self.base_url))
            .json(&serde_json::json!({ "fixture": fixture }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(E2eError::StepFailed {
                step: "reset".to_string(),
                reason: format!("reset returned {}", resp.status()),
            });
        }
        Ok(())
    }

    /// Execute a single step. Failed expectations come back as an
    /// unsuccessful `StepResult`; only malformed steps are errors.
    pub async fn execute_step(
        &self,
        step: &ScenarioStep,
        fixture: FixtureKind,
    ) -> E2eResult<StepResult> {
        let start = Instant::now();
        let step_name = step_name(step);

        debug!("Executing step: {}", step_name);

        let mut status = None;
        let result = match step {
            ScenarioStep::Request {
                method,
                path,
                body,
                expect,
            } => {
                let method = parse_method(method)?;
                match self.send(method, path, body.as_ref()).await {
                    Ok((code, text)) => {
                        status = Some(code);
                        expect.check(code, &text).map_err(E2eError::AssertionFailed)
                    }
                    Err(e) => Err(e),
                }
            }
            ScenarioStep::Reset => self.reset(fixture).await,
            ScenarioStep::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
            ScenarioStep::Log { message } => {
                info!("[SCENARIO LOG] {}", message);
                Ok(())
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => Ok(StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
                status,
            }),
            Err(e) => Ok(StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
                status,
            }),
        }
    }

    /// Send one request, returning the status and raw body text
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> E2eResult<(u16, String)> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        debug!("{} -> {} {}", url, status, text);
        Ok((status, text))
    }
}

fn parse_method(method: &str) -> E2eResult<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|_| E2eError::SpecParse(format!("invalid HTTP method {:?}", method)))
}

/// Short label for a step, used in logs and results
pub fn step_name(step: &ScenarioStep) -> String {
    match step {
        ScenarioStep::Request { method, path, .. } => {
            format!("{} {}", method.to_uppercase(), path)
        }
        ScenarioStep::Reset => "reset".to_string(),
        ScenarioStep::Sleep { ms } => format!("sleep:{}ms", ms),
        ScenarioStep::Log { message } => {
            format!("log:{}", message.chars().take(30).collect::<String>())
        }
    }
}
