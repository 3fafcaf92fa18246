use super::{CommitRangeFormatter, CommitSummary};
use crate::{
    config::NotificationConfig,
    error::Result,
    git::VersionControl,
    hook::{ChangeType, Classification, RefKind},
};

/// 组装完成的通知内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// 标题文本，可能包含 `<url|text>` 形式的链接
    pub header: String,
    /// commit 摘要，只有分支的创建与更新才有
    pub commits: Vec<CommitSummary>,
}

/// 根据分类结果生成通知标题与 commit 列表。
pub struct MessageComposer<'a, V: VersionControl> {
    vcs: &'a V,
    config: &'a NotificationConfig,
}

impl<'a, V: VersionControl> MessageComposer<'a, V> {
    pub fn new(vcs: &'a V, config: &'a NotificationConfig) -> Self {
        Self { vcs, config }
    }

    /// 生成 [`Message`]。
    ///
    /// 标题格式：
    /// - Create：`New branch main has been created in project`
    /// - Delete：`Branch main has been deleted from project`
    /// - Update：`3 new commits pushed to main in project`，
    ///   只有一个 commit 时为 `A new commit has been pushed to main in project`
    pub fn compose(&self, c: &Classification) -> Result<Message> {
        let name = &self.config.repo_display_name;
        let kind = c.ref_kind.label();
        let short = &c.short_ref;

        let (mut header, last_suffix) = match c.change_type {
            ChangeType::Create => (
                format!("New {kind} {short} has been created in {name}"),
                "commit",
            ),
            ChangeType::Delete => (
                format!("{} {short} has been deleted from {name}", capitalize(kind)),
                "commit",
            ),
            ChangeType::Update => {
                let count = self.vcs.log(Some(c.old_id.as_str()), &c.new_id, None)?.len();
                let phrase = self.link_commit_count(c, count);
                if count > 1 {
                    (format!("{phrase} pushed to {short} in {name}"), "one")
                } else {
                    (format!("{phrase} has been pushed to {short} in {name}"), "commit")
                }
            }
        };

        if self.config.show_only_last && c.change_type != ChangeType::Delete {
            header.push_str(&format!(", showing last {last_suffix}:"));
        }

        Ok(Message {
            header,
            commits: self.commits(c)?,
        })
    }

    /// `3 new commits` / `A new commit`，配置了比较链接时包装为链接。
    fn link_commit_count(&self, c: &Classification, count: usize) -> String {
        let phrase = if count > 1 {
            format!("{count} new commits")
        } else {
            "A new commit".to_string()
        };

        if c.ref_kind != RefKind::Branch {
            return phrase;
        }
        match self.config.compare_url(&c.old_id, &c.new_id) {
            Some(url) => format!("<{url}|{phrase}>"),
            None => phrase,
        }
    }

    /// 只有分支的创建与更新才列出 commit。
    ///
    /// 新建分支从 `HEAD` 开始计算。以下情况列出新 commit 可达的全部历史：
    /// - `HEAD` 指向的正是这个分支（默认分支的第一次推送，此时 `HEAD` 已等于新值）
    /// - `HEAD` 无法解析
    fn commits(&self, c: &Classification) -> Result<Vec<CommitSummary>> {
        if c.ref_kind != RefKind::Branch {
            return Ok(vec![]);
        }

        let start = match c.change_type {
            ChangeType::Delete => return Ok(vec![]),
            ChangeType::Update => Some(c.old_id.clone()),
            ChangeType::Create => match self.vcs.head_target() {
                Some(target) if target == c.ref_name => None,
                _ => self.vcs.rev_parse("HEAD"),
            },
        };

        CommitRangeFormatter::new(self.config).format(self.vcs, start.as_deref(), &c.new_id)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
