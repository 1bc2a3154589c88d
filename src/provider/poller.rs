//! Job submission and status polling.
//!
//! One `submit_and_await` call drives one provider job from creation to a
//! terminal state. The poll loop bounds wall-clock wait: a fixed cadence, a
//! fixed attempt budget, and no retry of the submission itself. Transport
//! hiccups while polling burn an attempt but are never treated as a terminal
//! answer - only the provider's own `completed`/`failed`/`error` statuses
//! (or the exhausted budget) end the loop.

use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::GenerationError;

/// Output format accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualFormat {
    #[default]
    Svg,
    Png,
}

impl VisualFormat {
    pub fn extension(self) -> &'static str {
        match self {
            VisualFormat::Svg => "svg",
            VisualFormat::Png => "png",
        }
    }

    /// Fallback mime type when the download response carries none.
    pub fn default_mime(self) -> &'static str {
        match self {
            VisualFormat::Svg => "image/svg+xml",
            VisualFormat::Png => "image/png",
        }
    }
}

/// Provider-side job lifecycle, as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Error,
    /// Any status string the provider may add later; treated as in-flight.
    Other,
}

impl JobState {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => JobState::Pending,
            "processing" => JobState::Processing,
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            "error" => JobState::Error,
            _ => JobState::Other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Error)
    }
}

/// Polling cadence and budget.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 12,
        }
    }
}

impl PollPolicy {
    /// Total wall-clock ceiling the policy imposes.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// What one generation run produced.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// The artifact was downloaded.
    Artifact { bytes: Vec<u8>, mime_type: String },
    /// The provider finished the job but no artifact could be retrieved.
    /// Reported to the caller as explanatory text, not as a failure - the
    /// provider already did the work.
    Incomplete { note: String },
}

/// Drives one external job per call. Stateless between calls.
pub struct JobPoller {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self::with_policy(client, base_url, api_key, PollPolicy::default())
    }

    pub fn with_policy(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        policy: PollPolicy,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            policy,
        }
    }

    /// Submit one generation job and wait for its terminal state.
    pub async fn submit_and_await(
        &self,
        content: &str,
        visual_type: Option<&str>,
        format: VisualFormat,
    ) -> Result<GenerationOutcome, GenerationError> {
        let job_id = self.submit(content, visual_type, format).await?;
        info!("provider accepted job {job_id}, polling for completion");

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let payload = match self.poll_status(&job_id).await {
                Some(payload) => payload,
                None => {
                    warn!("status poll {attempt} for job {job_id} failed, will retry");
                    continue;
                }
            };

            let status = payload
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default();
            debug!("job {job_id} poll {attempt}: status '{status}'");

            match JobState::parse(status) {
                JobState::Completed => {
                    let Some(url) = locate_download_url(&payload) else {
                        return Ok(GenerationOutcome::Incomplete {
                            note: format!(
                                "Generation completed but the provider reported no \
                                 downloadable file. Raw status: {payload}"
                            ),
                        });
                    };
                    return self.download(&url, format).await;
                }
                JobState::Failed | JobState::Error => {
                    let message = payload
                        .get("error")
                        .and_then(Value::as_str)
                        .or_else(|| payload.get("message").and_then(Value::as_str))
                        .unwrap_or("provider reported a failure without details");
                    return Err(GenerationError::Failed(message.to_string()));
                }
                JobState::Pending | JobState::Processing | JobState::Other => continue,
            }
        }

        Err(GenerationError::Timeout(self.policy.budget().as_secs()))
    }

    async fn submit(
        &self,
        content: &str,
        visual_type: Option<&str>,
        format: VisualFormat,
    ) -> Result<String, GenerationError> {
        let mut body = json!({
            "content": content,
            "format": format,
        });
        if let Some(hint) = visual_type {
            body["visual_type"] = json!(hint);
        }

        let response = self
            .client
            .post(format!("{}/visual-request", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Submission {
                status: status.as_u16(),
                body,
            });
        }

        let created: Value = response.json().await?;
        created
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| created.get("request_id").and_then(Value::as_str))
            .map(str::to_owned)
            .ok_or(GenerationError::MissingJobId)
    }

    /// One status query. `None` means a transient transport failure; the
    /// caller keeps polling.
    async fn poll_status(&self, job_id: &str) -> Option<Value> {
        let response = self
            .client
            .get(format!("{}/visual-request/{job_id}/status", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    async fn download(
        &self,
        url: &str,
        format: VisualFormat,
    ) -> Result<GenerationOutcome, GenerationError> {
        let response = match self.client.get(url).bearer_auth(&self.api_key).send().await {
            Ok(response) => response,
            Err(err) => {
                return Ok(GenerationOutcome::Incomplete {
                    note: format!(
                        "Generation completed but downloading the artifact failed: {err} \
                         (url: {url})"
                    ),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(GenerationOutcome::Incomplete {
                note: format!(
                    "Generation completed but the artifact download returned HTTP {} for {url}",
                    status.as_u16()
                ),
            });
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .unwrap_or_else(|| format.default_mime().to_string());

        match response.bytes().await {
            Ok(bytes) => Ok(GenerationOutcome::Artifact {
                bytes: bytes.to_vec(),
                mime_type,
            }),
            Err(err) => Ok(GenerationOutcome::Incomplete {
                note: format!(
                    "Generation completed but reading the artifact body failed: {err} \
                     (url: {url})"
                ),
            }),
        }
    }
}

/// Prefer the first `generated_files` entry; fall back to a top-level `url`.
fn locate_download_url(payload: &Value) -> Option<String> {
    payload
        .get("generated_files")
        .and_then(Value::as_array)
        .and_then(|files| files.first())
        .and_then(|file| file.get("url"))
        .and_then(Value::as_str)
        .or_else(|| payload.get("url").and_then(Value::as_str))
        .map(str::to_owned)
}
