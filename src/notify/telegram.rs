use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{NotifyError, Notifier};

#[derive(Debug, Serialize)]
struct SendMessageReq<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct PinChatMessageReq<'a> {
    chat_id: &'a str,
    message_id: i64,
    disable_notification: bool,
}

/// Bot API envelope: `{"ok": true, "result": ...}` or `{"ok": false, "description": ...}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_url: &str, bot_token: &str, chat_id: &str) -> eyre::Result<Self> {
        let api_url = Url::parse(api_url)?;
        let api_base = format!("{}/bot{}/", api_url.as_str().trim_end_matches('/'), bot_token);
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            api_base,
            chat_id: chat_id.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}", self.api_base, method)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, NotifyError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(redact_url)?;

        // Telegram reports failures in the body with a non-2xx status.
        let envelope: ApiResponse<T> = resp.json().await.map_err(redact_url)?;
        unwrap_envelope(method, envelope)
    }
}

// Request URLs embed the bot token.
fn redact_url(err: reqwest::Error) -> NotifyError {
    NotifyError::Http(err.without_url())
}

fn unwrap_envelope<T>(method: &'static str, envelope: ApiResponse<T>) -> Result<T, NotifyError> {
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(NotifyError::Api {
            method,
            description: description.unwrap_or_else(|| "no description".to_string()),
        }),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<i64, NotifyError> {
        let body = SendMessageReq {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let sent: SentMessage = self.call("sendMessage", &body).await?;
        Ok(sent.message_id)
    }

    async fn pin_message(&self, message_id: i64) -> Result<(), NotifyError> {
        let body = PinChatMessageReq {
            chat_id: &self.chat_id,
            message_id,
            disable_notification: false,
        };
        let _: bool = self.call("pinChatMessage", &body).await?;
        Ok(())
    }
}
