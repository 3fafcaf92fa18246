use crate::{
    config::NotificationConfig,
    error::Result,
    git::{CommitRecord, VersionControl},
};

/// 单个 commit 的摘要，对应 payload 中的一个 attachment。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub author_name: String,
    pub short_hash: String,
    /// changeset 链接，未配置模板时为 [`None`]
    pub link: Option<String>,
    pub subject: String,
    /// 完整提交信息模式下的正文
    pub body: Option<String>,
}

impl CommitSummary {
    /// attachment 中展示的文本：标题，有正文时空一行后接正文。
    pub fn text(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.subject, body),
            None => self.subject.clone(),
        }
    }
}

/// 把 `start..end` 范围内的 commit 格式化为 [`CommitSummary`] 列表。
///
/// 输出顺序与 `git log` 一致，新的在前。
pub struct CommitRangeFormatter<'a> {
    config: &'a NotificationConfig,
    only_last: bool,
    full_commit: bool,
}

impl<'a> CommitRangeFormatter<'a> {
    pub fn new(config: &'a NotificationConfig) -> Self {
        Self {
            config,
            only_last: config.show_only_last,
            full_commit: config.show_full_commit,
        }
    }

    /// 列出 `start..end` 的 commit。
    ///
    /// - `start` 为 [`None`] 时列出 `end` 可达的全部 commit
    /// - `only_last` 开启时最多返回 1 条
    pub fn format(
        &self,
        vcs: &impl VersionControl,
        start: Option<&str>,
        end: &str,
    ) -> Result<Vec<CommitSummary>> {
        let limit = self.only_last.then_some(1);
        let records = vcs.log(start, end, limit)?;
        Ok(records.iter().map(|r| self.summarize(r)).collect())
    }

    fn summarize(&self, record: &CommitRecord) -> CommitSummary {
        tracing::debug!(id = record.id(), %record, "formatting commit");

        CommitSummary {
            author_name: record.committer().to_string(),
            short_hash: record.short_id().to_string(),
            link: self.config.changeset_url(record.short_id()),
            subject: record.subject().to_string(),
            body: self
                .full_commit
                .then(|| record.body().map(str::to_string))
                .flatten(),
        }
    }
}
