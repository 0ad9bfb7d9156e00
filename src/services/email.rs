//! Email configuration, template rendering and delivery.
//!
//! Templates live in the `email_configs` table keyed by module name.
//! Delivery goes through the `Mailer` trait: an HTTP relay implementation
//! with HMAC-signed requests, or a logging no-op when no relay is
//! configured. Delivery is best-effort and never fails the request that
//! triggered it.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{db::DbPool, entities::email_config, errors::ServiceError};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder regex"));

/// Replaces `{{name}}` placeholders from `vars` in a single pass.
/// Placeholders with no matching variable are left untouched.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            vars.get(key)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// A rendered, ready-to-send message.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub body_html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError>;
}

/// Signs relay requests the same way outbound webhooks are signed:
/// HMAC-SHA256 over `{timestamp}.{body}`, hex-encoded.
struct RelaySigner {
    secret: String,
}

impl RelaySigner {
    fn sign(&self, timestamp: &str, body: &str) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        let signed_payload = format!("{}.{}", timestamp, body);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Posts messages to an HTTP mail relay.
pub struct HttpRelayMailer {
    client: reqwest::Client,
    relay_url: String,
    signer: Option<RelaySigner>,
}

impl HttpRelayMailer {
    pub fn new(relay_url: String, secret: Option<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("mailer client build failed: {e}")))?;
        Ok(Self {
            client,
            relay_url,
            signer: secret.map(|secret| RelaySigner { secret }),
        })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
        let timestamp = Utc::now().to_rfc3339();

        let mut request = self
            .client
            .post(&self.relay_url)
            .header("content-type", "application/json")
            .header("x-relay-timestamp", &timestamp);
        if let Some(signer) = &self.signer {
            request = request.header("x-relay-signature", signer.sign(&timestamp, &body));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamError(format!("mail relay request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::UpstreamError(format!(
                "mail relay returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Used when no relay is configured: logs and drops the message.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        info!(to = %message.to, subject = %message.subject, "mail relay not configured, dropping email");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertEmailConfigRequest {
    #[validate(length(min = 1, max = 80))]
    pub module: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 120))]
    pub from_name: String,
    #[validate(email)]
    pub from_email: String,
    #[validate(length(min = 1))]
    pub body_html: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone)]
pub struct EmailService {
    db_pool: Arc<DbPool>,
    mailer: Arc<dyn Mailer>,
}

impl EmailService {
    pub fn new(db_pool: Arc<DbPool>, mailer: Arc<dyn Mailer>) -> Self {
        Self { db_pool, mailer }
    }

    #[instrument(skip(self))]
    pub async fn list_configs(&self) -> Result<Vec<email_config::Model>, ServiceError> {
        Ok(email_config::Entity::find()
            .order_by_asc(email_config::Column::Module)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_config(&self, module: &str) -> Result<email_config::Model, ServiceError> {
        email_config::Entity::find()
            .filter(email_config::Column::Module.eq(module))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Email config '{module}' not found")))
    }

    /// Creates or replaces the config for a module.
    #[instrument(skip(self, request), fields(module = %request.module))]
    pub async fn upsert_config(
        &self,
        request: UpsertEmailConfigRequest,
    ) -> Result<email_config::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let existing = email_config::Entity::find()
            .filter(email_config::Column::Module.eq(request.module.clone()))
            .one(db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: email_config::ActiveModel = model.into();
                active.subject = Set(request.subject);
                active.from_name = Set(request.from_name);
                active.from_email = Set(request.from_email);
                active.body_html = Set(request.body_html);
                active.is_active = Set(request.is_active);
                active.updated_at = Set(Some(now));
                active.update(db).await?
            }
            None => {
                email_config::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    module: Set(request.module),
                    subject: Set(request.subject),
                    from_name: Set(request.from_name),
                    from_email: Set(request.from_email),
                    body_html: Set(request.body_html),
                    is_active: Set(request.is_active),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                }
                .insert(db)
                .await?
            }
        };

        info!(module = %model.module, "email config saved");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete_config(&self, module: &str) -> Result<(), ServiceError> {
        let model = self.get_config(module).await?;
        model.delete(&*self.db_pool).await?;
        Ok(())
    }

    /// Renders and submits the module's template. Best-effort: a missing or
    /// inactive config and relay failures are logged, never surfaced.
    /// Returns whether a message was handed to the mailer.
    #[instrument(skip(self, vars))]
    pub async fn send_module_email(
        &self,
        module: &str,
        to: &str,
        vars: &HashMap<String, String>,
    ) -> Result<bool, ServiceError> {
        let config = match self.get_config(module).await {
            Ok(config) if config.is_active => config,
            Ok(_) => {
                info!(module, "email config inactive, skipping send");
                return Ok(false);
            }
            Err(ServiceError::NotFound(_)) => {
                info!(module, "no email config, skipping send");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        let message = EmailMessage {
            to: to.to_string(),
            from_name: config.from_name,
            from_email: config.from_email,
            subject: render_template(&config.subject, vars),
            body_html: render_template(&config.body_html, vars),
        };

        if let Err(err) = self.mailer.send(&message).await {
            warn!(module, error = %err, "email delivery failed");
            return Ok(false);
        }
        Ok(true)
    }

    /// Admin test hook: renders the module's template with sample variables
    /// and submits it.
    #[instrument(skip(self))]
    pub async fn test_send(&self, module: &str, to: &str) -> Result<bool, ServiceError> {
        let vars = HashMap::from([
            ("name".to_string(), "Test User".to_string()),
            ("order_number".to_string(), "SO-00000000-TEST".to_string()),
            ("status".to_string(), "shipped".to_string()),
        ]);
        self.send_module_email(module, to, &vars).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = render_template(
            "Hi {{name}}, order {{ order_number }} is {{status}}.",
            &vars(&[
                ("name", "Asha"),
                ("order_number", "SO-1"),
                ("status", "shipped"),
            ]),
        );
        assert_eq!(out, "Hi Asha, order SO-1 is shipped.");
    }

    #[test]
    fn keeps_unknown_placeholders_intact() {
        let out = render_template("Hi {{name}}, code {{coupon}}", &vars(&[("name", "Asha")]));
        assert_eq!(out, "Hi Asha, code {{coupon}}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        let template = "No placeholders here {single brace} {{{weird}}";
        let out = render_template(template, &vars(&[("weird", "x")]));
        // "{{{weird}}" contains a valid "{{weird}}" tail after the first brace.
        assert_eq!(out, "No placeholders here {single brace} {x");
    }

    #[test]
    fn signature_is_stable_for_same_input() {
        let signer = RelaySigner {
            secret: "s3cret".to_string(),
        };
        let a = signer.sign("2024-03-01T00:00:00Z", "{\"a\":1}");
        let b = signer.sign("2024-03-01T00:00:00Z", "{\"a\":1}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let c = signer.sign("2024-03-01T00:00:01Z", "{\"a\":1}");
        assert_ne!(a, c);
    }
}
