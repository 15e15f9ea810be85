//! Telegram Bot API: `tgram://BotToken/ChatID[/ChatID...]`.
//!
//! The bot token has the form `123456789:AAH...`, optionally prefixed with
//! `bot`. Each chat receives its own `sendMessage` call.

use super::{post_json, Segments, Service};
use crate::core::Destination;
use crate::dispatcher::NotifierError;
use anyhow::Context;
use reqwest::blocking::Client;
use serde::Serialize;

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramBot {
    client: Client,
    api_base: String,
    token: String,
    chat_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

impl TelegramBot {
    pub fn parse(destination: &Destination, client: Client) -> Result<Self, NotifierError> {
        let segments = Segments::of(destination);
        let Some((token, chat_ids)) = segments.parts.split_first() else {
            return Err(NotifierError::invalid(destination, "missing bot token"));
        };

        let token = token.strip_prefix("bot").unwrap_or(*token);
        let valid_token = token.split_once(':').is_some_and(|(id, key)| {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && !key.is_empty()
        });
        if !valid_token {
            return Err(NotifierError::invalid(
                destination,
                "bot token must look like 123456:ABC-DEF",
            ));
        }
        if chat_ids.is_empty() {
            return Err(NotifierError::invalid(destination, "at least one chat id is required"));
        }

        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
            token: token.to_string(),
            chat_ids: chat_ids.iter().map(|id| id.to_string()).collect(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl Service for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let text = if title.is_empty() {
            escape_html(body)
        } else {
            format!("<b>{}</b>\r\n{}", escape_html(title), escape_html(body))
        };
        let endpoint = self.endpoint();

        for chat_id in &self.chat_ids {
            let message = SendMessage {
                chat_id,
                text: &text,
                parse_mode: "HTML",
            };
            post_json(&self.client, &endpoint, &message, "Telegram")
                .with_context(|| format!("chat {chat_id}"))?;
        }
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
