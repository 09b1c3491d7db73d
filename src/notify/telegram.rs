use crate::common::config::TelegramConfig;
use crate::common::error::BotError;
use crate::common::ts::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API 通知
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_ids: config
                .chat_ids
                .iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn destinations(&self) -> Vec<String> {
        self.chat_ids.clone()
    }

    async fn send(&self, destination: &str, text: &str) -> Result<(), BotError> {
        let payload = SendMessageRequest {
            chat_id: destination,
            text,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::NotificationFailure {
                destination: destination.to_string(),
                // 去掉 URL，避免 token 进入日志
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BotError::NotificationFailure {
                destination: destination.to_string(),
                reason: format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
            })
        }
    }
}
