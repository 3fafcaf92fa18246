use std::io;

pub type Result<T> = core::result::Result<T, Error>;

/// hook 运行过程中的统一错误类型。
///
/// 被跳过的 ref（tracking branch、未知类型、分支过滤）不属于错误，
/// 它们以 [`crate::notify::Notification::Skipped`] 的形式返回。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 未配置 `hooks.rocketchat.webhook-url`
    #[error("hooks.rocketchat.webhook-url is not set")]
    MissingWebhookUrl,

    /// 不在 git hook 环境中运行
    #[error("GIT_DIR is not set")]
    GitDirNotSet,

    /// 命令行参数既不是空，也不是 `<ref-name> <old-id> <new-id>`
    #[error("unexpected arguments: {0}")]
    InvalidArguments(String),

    /// 输入行无法解析为 `<old-id> <new-id> <ref-name>`
    #[error("malformed ref update line: {0:?}")]
    MalformedInput(String),

    #[error(transparent)]
    Repository(#[from] git2::Error),

    #[error("invalid hooks.rocketchat.branch-regexp: {0}")]
    BranchRegexp(#[from] regex::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
