use std::io::Write;

use super::Payload;
use crate::{
    config::NotificationConfig,
    error::{Error, Result},
};

/// 投递方式
#[derive(Debug)]
enum Delivery {
    /// POST 到 webhook
    Http(reqwest::blocking::Client),
    /// 调试模式：只打印 URL 与 payload
    Print,
}

/// 把 [`Payload`] 发送到配置的 webhook。
///
/// 只尝试一次，不重试；响应内容被忽略，只有传输层错误会返回 [`Err`]。
#[derive(Debug)]
pub struct Dispatcher {
    url: String,
    delivery: Delivery,
}

impl Dispatcher {
    /// 创建发送器。
    ///
    /// 未配置 `webhook-url` 时返回 [`Error::MissingWebhookUrl`]，调试模式同样要求配置。
    pub fn new(config: &NotificationConfig, debug: bool) -> Result<Self> {
        let url = config
            .webhook_url
            .clone()
            .ok_or(Error::MissingWebhookUrl)?;

        let delivery = if debug {
            Delivery::Print
        } else {
            let client = reqwest::blocking::Client::builder()
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .timeout(config.timeout)
                .build()?;
            Delivery::Http(client)
        };

        Ok(Self { url, delivery })
    }

    /// 是否为调试模式。
    pub fn is_debug(&self) -> bool {
        matches!(self.delivery, Delivery::Print)
    }

    /// 发送 payload，调试模式下把 URL 与 payload 写入 `out`。
    ///
    /// HTTP 请求体由 reqwest 序列化，并带上 `Content-Type: application/json`。
    pub fn send(&self, payload: &Payload, out: &mut impl Write) -> Result<()> {
        match &self.delivery {
            Delivery::Print => {
                writeln!(out, "{}", self.url)?;
                writeln!(out, "{}", payload.to_json()?)?;
                Ok(())
            }
            Delivery::Http(client) => {
                let resp = client.post(&self.url).json(payload).send()?;

                let status = resp.status();
                if status.is_success() {
                    tracing::debug!(%status, "notification delivered");
                } else {
                    tracing::warn!(%status, url = %self.url, "webhook returned non-success status");
                }
                Ok(())
            }
        }
    }
}
