//! Incoming-webhook delivery with a Block Kit attachment payload.
//!
//! ```text
//! { "attachments": [ { "color": "#ff4d4d", "fallback": "...",
//!     "blocks": [ header(title), section(body), context(🕒 timestamp) ] } ] }
//! ```

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use vigil_http::HttpClient;

use crate::Notifier;
use crate::alert::Alert;
use crate::error::NotifyError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Serialize)]
struct Payload {
    attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
struct Attachment {
    color: &'static str,
    fallback: String,
    blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Header { text: Text },
    Section { text: Text },
    Context { elements: Vec<Text> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

/// Posts alerts to a chat incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: HttpClient,
    offset: FixedOffset,
}

impl WebhookNotifier {
    /// Timestamps are rendered at `offset_minutes` from UTC.
    pub fn new(client: HttpClient, offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            warn!(offset_minutes, "timezone offset out of range, using UTC");
            Utc.fix()
        });
        Self { client, offset }
    }

    /// The JSON payload posted for an alert.
    pub fn payload(&self, alert: &Alert) -> Result<serde_json::Value, NotifyError> {
        Ok(serde_json::to_value(self.build(alert))?)
    }

    fn build(&self, alert: &Alert) -> Payload {
        let timestamp = alert
            .raised_at
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        Payload {
            attachments: vec![Attachment {
                color: alert.severity.color(),
                fallback: format!("{}\n{}", alert.title, alert.body),
                blocks: vec![
                    Block::Header {
                        text: Text::PlainText {
                            text: alert.title.clone(),
                            emoji: true,
                        },
                    },
                    Block::Section {
                        text: Text::Mrkdwn {
                            text: alert.body.clone(),
                        },
                    },
                    Block::Context {
                        elements: vec![Text::Mrkdwn {
                            text: format!("🕒 {timestamp}"),
                        }],
                    },
                ],
            }],
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn deliver(&self, destination: &str, alert: &Alert) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&self.build(alert))?;
        let response = self.client.post_json(destination, body).await?;

        if !response.status.is_success() {
            let text = String::from_utf8_lossy(&response.body);
            return Err(NotifyError::Status {
                status: response.status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        debug!(title = %alert.title, status = %response.status, "webhook accepted alert");
        Ok(())
    }
}
