use serde::{Deserialize, Serialize};

use super::{CommitSummary, Message};
use crate::{config::NotificationConfig, error::Result};

/// 单个 commit 对应的 attachment。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub author_name: String,
    /// 缩写 commit ID
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    pub text: String,
}

impl From<&CommitSummary> for Attachment {
    fn from(commit: &CommitSummary) -> Self {
        Self {
            author_name: commit.author_name.clone(),
            title: commit.short_hash.clone(),
            title_link: commit.link.clone(),
            text: commit.text(),
        }
    }
}

/// 发送给 webhook 的 JSON 对象。
///
/// 字段按声明顺序序列化：`text`、`attachments`、`channel`、`username`、
/// `icon_url` / `icon_emoji`。未设置的字段与空的 attachments 不输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

impl Payload {
    /// 由 [`Message`] 与配置构建 payload，`icon_url` 优先于 `icon_emoji`。
    pub fn build(message: &Message, config: &NotificationConfig) -> Self {
        let icon_emoji = match config.icon_url {
            Some(_) => None,
            None => config.icon_emoji.clone(),
        };

        Self {
            text: message.header.clone(),
            attachments: message.commits.iter().map(Attachment::from).collect(),
            channel: config.channel.clone(),
            username: config.username.clone(),
            icon_url: config.icon_url.clone(),
            icon_emoji,
        }
    }

    /// 序列化为 JSON 字符串。
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::config::{ConfigResolver, keys, tests as config_tests};

    fn config(pairs: &[(&str, &str)]) -> NotificationConfig {
        let store = config_tests::store(pairs);
        let env = config_tests::env();
        ConfigResolver::new(&store, &env).resolve().unwrap()
    }

    fn summary(subject: &str) -> CommitSummary {
        CommitSummary {
            author_name: "alice".to_string(),
            short_hash: "a1b2c3d".to_string(),
            link: None,
            subject: subject.to_string(),
            body: None,
        }
    }

    #[test]
    fn test_minimal_payload() {
        let message = Message {
            header: "Branch topic has been deleted from project".to_string(),
            commits: vec![],
        };

        let json = Payload::build(&message, &config(&[])).to_json().unwrap();
        assert_eq!(json, r#"{"text":"Branch topic has been deleted from project"}"#);
    }

    #[test]
    fn test_key_order() {
        let message = Message {
            header: "hello".to_string(),
            commits: vec![summary("first")],
        };
        let config = config(&[
            (keys::ICON_EMOJI, ":git:"),
            (keys::USERNAME, "git"),
            (keys::CHANNEL, "#dev"),
        ]);

        let json = Payload::build(&message, &config).to_json().unwrap();
        assert_eq!(
            json,
            r##"{"text":"hello","attachments":[{"author_name":"alice","title":"a1b2c3d","text":"first"}],"channel":"#dev","username":"git","icon_emoji":":git:"}"##
        );
    }

    #[test]
    fn test_icon_url_takes_precedence() {
        let message = Message {
            header: "hello".to_string(),
            commits: vec![],
        };
        let config = config(&[
            (keys::ICON_URL, "https://example.com/git.png"),
            (keys::ICON_EMOJI, ":git:"),
        ]);

        let payload = Payload::build(&message, &config);
        assert_eq!(payload.icon_url.as_deref(), Some("https://example.com/git.png"));
        assert_eq!(payload.icon_emoji, None);
    }

    #[test]
    fn test_special_characters_escaped() {
        let mut commit = summary(r#"fix "bug" in a\path"#);
        commit.link = Some("https://example.com/c/a1b2c3d".to_string());
        commit.body = Some("tab\there\nnewline and ünïcode".to_string());
        let message = Message {
            header: r#"A new commit has been pushed to "main""#.to_string(),
            commits: vec![commit],
        };

        let json = Payload::build(&message, &config(&[])).to_json().unwrap();
        assert!(json.contains(r#"fix \"bug\" in a\\path"#));

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "A new commit has been pushed to \"main\"",
                "attachments": [{
                    "author_name": "alice",
                    "title": "a1b2c3d",
                    "title_link": "https://example.com/c/a1b2c3d",
                    "text": "fix \"bug\" in a\\path\n\ntab\there\nnewline and ünïcode",
                }],
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let message = Message {
            header: "3 new commits pushed to main in project".to_string(),
            commits: vec![summary("c3"), summary("c2"), summary("c1")],
        };
        let payload = Payload::build(&message, &config(&[(keys::CHANNEL, "#dev")]));

        let parsed: Payload = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(parsed, payload);
        assert_eq!(parsed.text, message.header);
        let texts: Vec<_> = parsed.attachments.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, ["c3", "c2", "c1"]);
    }
}
