use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use git2::Commit;

/// git 对象类型，对应 `git cat-file -t` 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// commit 对象
    Commit,
    /// 附注标签（annotated tag）对象
    Tag,
    /// 不存在或其他类型（tree、blob）
    Unknown,
}

impl From<Option<git2::ObjectType>> for ObjectKind {
    fn from(kind: Option<git2::ObjectType>) -> Self {
        match kind {
            Some(git2::ObjectType::Commit) => ObjectKind::Commit,
            Some(git2::ObjectType::Tag) => ObjectKind::Tag,
            _ => ObjectKind::Unknown,
        }
    }
}

/// 一条 commit 日志记录。
///
/// 由 [`super::VersionControl::log`] 产生，按 `git log` 的顺序（新的在前）排列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub(crate) id: String,
    pub(crate) short_id: String,
    pub(crate) committer: String,
    pub(crate) message: String,
    pub(crate) timestamp: DateTime<Local>,
}

impl CommitRecord {
    pub fn new(
        id: impl Into<String>,
        short_id: impl Into<String>,
        committer: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            id: id.into(),
            short_id: short_id.into(),
            committer: committer.into(),
            message: message.into(),
            timestamp,
        }
    }

    /// 完整 commit ID。
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 缩写 commit ID。
    pub fn short_id(&self) -> &str {
        &self.short_id
    }

    /// 提交者名称。
    pub fn committer(&self) -> &str {
        &self.committer
    }

    /// 提交信息的第一行。
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim_end()
    }

    /// 第一行之后的内容，去掉首尾空行；没有正文时返回 [`None`]。
    pub fn body(&self) -> Option<&str> {
        let (_, rest) = self.message.split_once('\n')?;
        let rest = rest.trim_matches(|c: char| c == '\n' || c == '\r').trim_end();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

impl<'repo> TryFrom<&Commit<'repo>> for CommitRecord {
    type Error = git2::Error;

    fn try_from(commit: &Commit<'repo>) -> Result<Self, Self::Error> {
        let short_id = commit.as_object().short_id()?;
        let committer = commit.committer();
        let timestamp = Local
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        Ok(Self {
            id: commit.id().to_string(),
            short_id: short_id.as_str().unwrap_or_default().to_string(),
            committer: String::from_utf8_lossy(committer.name_bytes()).into_owned(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            timestamp,
        })
    }
}

impl fmt::Display for CommitRecord {
    /// 格式示例：
    /// ```text
    /// a1b2c3d alice @ 2024-08-22 12:30: fix login redirect
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {}: {}",
            self.short_id,
            self.committer,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.subject()
        )
    }
}
