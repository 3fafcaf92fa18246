//! 测试用的内存仓库，只支持线性历史。

use std::collections::HashMap;

use chrono::{Local, TimeZone};

use super::{CommitRecord, ObjectKind, VersionControl};
use crate::error::Error;

#[derive(Debug, Default)]
pub struct MemoryRepository {
    /// 从旧到新
    commits: Vec<CommitRecord>,
    refs: HashMap<String, String>,
    /// 附注标签对象 ID -> 指向的 commit ID
    tags: HashMap<String, String>,
    /// 符号引用 `HEAD` 的目标
    head: Option<String>,
}

impl MemoryRepository {
    /// 创建包含 `n` 个 commit 的线性历史，提交信息为 `commit 1` ~ `commit n`。
    pub fn with_history(n: usize) -> Self {
        let mut repo = Self::default();
        for i in 1..=n {
            repo.commit(&format!("commit {i}"));
        }
        repo
    }

    /// 追加一个 commit 并返回其 ID。
    pub fn commit(&mut self, message: &str) -> String {
        let n = self.commits.len() + 1;
        let short_id = format!("{:07x}", 0xabc0000 + n);
        let id = format!("{short_id}{}", "0".repeat(33));
        let timestamp = Local
            .timestamp_opt(1_700_000_000 + n as i64 * 60, 0)
            .unwrap();
        self.commits.push(CommitRecord::new(
            &id,
            short_id,
            format!("dev{n}"),
            message,
            timestamp,
        ));
        id
    }

    /// 第 `n` 个 commit 的 ID（从 1 开始）。
    pub fn id(&self, n: usize) -> String {
        self.commits[n - 1].id().to_string()
    }

    pub fn set_ref(&mut self, name: &str, id: &str) {
        self.refs.insert(name.to_string(), id.to_string());
    }

    /// 让 `HEAD` 成为指向 `ref_name` 的符号引用。
    pub fn set_head(&mut self, ref_name: &str) {
        self.head = Some(ref_name.to_string());
    }

    /// 创建指向 `target` 的附注标签对象并返回其 ID。
    pub fn annotated_tag(&mut self, target: &str) -> String {
        let id = format!("{:040x}", 0xfeed0000 + self.tags.len());
        self.tags.insert(id.clone(), target.to_string());
        id
    }

    fn position(&self, rev: &str) -> Option<usize> {
        let id = self.rev_parse(rev)?;
        let id = self.tags.get(&id).cloned().unwrap_or(id);
        self.commits.iter().position(|c| c.id() == id)
    }
}

impl VersionControl for MemoryRepository {
    fn rev_parse(&self, rev: &str) -> Option<String> {
        if let (Some(target), "HEAD") = (&self.head, rev) {
            return self.refs.get(target).cloned();
        }
        if let Some(id) = self.refs.get(rev) {
            return Some(id.clone());
        }
        let known = self.commits.iter().any(|c| c.id() == rev) || self.tags.contains_key(rev);
        known.then(|| rev.to_string())
    }

    fn object_kind(&self, rev: &str) -> ObjectKind {
        match self.rev_parse(rev) {
            Some(id) if self.tags.contains_key(&id) => ObjectKind::Tag,
            Some(_) => ObjectKind::Commit,
            None => ObjectKind::Unknown,
        }
    }

    fn head_target(&self) -> Option<String> {
        self.head.clone()
    }

    fn log(
        &self,
        start: Option<&str>,
        end: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CommitRecord>, Error> {
        let not_found = || git2::Error::from_str("object not found");
        let end = self.position(end).ok_or_else(not_found)?;
        let from = match start {
            Some(start) => self.position(start).ok_or_else(not_found)? + 1,
            None => 0,
        };
        if from > end {
            return Ok(vec![]);
        }

        Ok(self.commits[from..=end]
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
