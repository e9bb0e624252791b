//! REST client
//!
//! Implements the engine's platform port over the chat platform's HTTP API.
//! Requests authenticate with the bot token and are retried on 429 using the
//! `retry_after` the platform sends back.

use std::time::Duration;

use async_trait::async_trait;
use reactrole_core::traits::{GatewayClient, PlatformResult};
use reactrole_core::{Emote, MessageRef, Snowflake};
use reqwest::{header, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::error::GatewayError;
use crate::events::MemberPayload;

/// Request timeout for every REST call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How many times a rate-limited request is retried
const MAX_RATE_LIMIT_RETRIES: u32 = 2;

/// Body of a 429 response
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    /// Seconds to wait
    retry_after: f64,
}

/// HTTP client for the chat platform's REST API
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_base: Url,
    token: String,
}

impl RestClient {
    /// Create a client for `api_base` (e.g. `https://discord.com/api/v10`)
    pub fn new(api_base: &str, token: impl Into<String>) -> Result<Self, GatewayError> {
        let api_base =
            Url::parse(api_base).map_err(|e| GatewayError::InvalidUrl(format!("{api_base}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(api_base.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "DiscordBot (",
                env!("CARGO_PKG_NAME"),
                ", ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            http,
            api_base,
            token: token.into(),
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, retrying while rate limited; non-2xx becomes an error
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response, GatewayError> {
        let mut attempt = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(header::AUTHORIZATION, format!("Bot {}", self.token));
            if let Some(body) = body {
                request = request.json(body);
            }

            let started = tokio::time::Instant::now();
            let response = request.send().await?;
            let status = response.status();
            debug!(
                method = %method,
                path = url.path(),
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "REST call"
            );

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .json::<RateLimitBody>()
                    .await
                    .map(|b| Duration::from_secs_f64(b.retry_after.max(0.0)))
                    .unwrap_or(Duration::from_secs(1));

                if attempt < MAX_RATE_LIMIT_RETRIES {
                    attempt += 1;
                    warn!(
                        path = url.path(),
                        retry_after_ms = retry_after.as_millis() as u64,
                        attempt,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(retry_after).await;
                    continue;
                }

                return Err(GatewayError::RateLimited {
                    path: url.path().to_string(),
                    retry_after_ms: retry_after.as_millis() as u64,
                });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                method: method.to_string(),
                path: url.path().to_string(),
                status: status.as_u16(),
                body,
            });
        }
    }

    async fn member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Option<Vec<Snowflake>>, GatewayError> {
        let url = self.endpoint(&["guilds", &guild_id.to_string(), "members", &user_id.to_string()])?;

        match self.send(Method::GET, url, None).await {
            Ok(response) => {
                let member: MemberPayload = response
                    .json()
                    .await
                    .map_err(|e| GatewayError::Decode(e.to_string()))?;
                Ok(Some(member.roles))
            }
            // No longer a member of the guild
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn role_url(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> Result<Url, GatewayError> {
        self.endpoint(&[
            "guilds",
            &guild_id.to_string(),
            "members",
            &user_id.to_string(),
            "roles",
            &role_id.to_string(),
        ])
    }

    fn reactions_url(&self, message: MessageRef, emote: &Emote, own: bool) -> Result<Url, GatewayError> {
        let channel = message.channel_id.to_string();
        let message = message.message_id.to_string();
        let emoji = emote.api_name();

        let mut segments = vec![
            "channels",
            channel.as_str(),
            "messages",
            message.as_str(),
            "reactions",
            emoji.as_str(),
        ];
        if own {
            segments.push("@me");
        }
        self.endpoint(&segments)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("api_base", &self.api_base.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl GatewayClient for RestClient {
    #[instrument(skip(self))]
    async fn grant_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        let url = self.role_url(guild_id, user_id, role_id)?;
        self.send(Method::PUT, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()> {
        let url = self.role_url(guild_id, user_id, role_id)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn user_has_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<bool> {
        let roles = self.member_roles(guild_id, user_id).await?;
        Ok(roles.is_some_and(|roles| roles.contains(&role_id)))
    }

    #[instrument(skip(self, emote), fields(emote = %emote))]
    async fn add_reaction(&self, message: MessageRef, emote: &Emote) -> PlatformResult<()> {
        let url = self.reactions_url(message, emote, true)?;
        self.send(Method::PUT, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, emote), fields(emote = %emote))]
    async fn remove_all_reactions_for_emote(
        &self,
        message: MessageRef,
        emote: &Emote,
    ) -> PlatformResult<()> {
        let url = self.reactions_url(message, emote, false)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, message: MessageRef) -> PlatformResult<()> {
        let url = self.endpoint(&[
            "channels",
            &message.channel_id.to_string(),
            "messages",
            &message.message_id.to_string(),
        ])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, content))]
    async fn reply(&self, message: MessageRef, content: &str) -> PlatformResult<()> {
        let url = self.endpoint(&["channels", &message.channel_id.to_string(), "messages"])?;
        let body = json!({
            "content": content,
            "message_reference": { "message_id": message.message_id },
            "allowed_mentions": { "parse": [] },
        });
        self.send(Method::POST, url, Some(&body)).await?;
        Ok(())
    }
}
