use git2::{Repository, Sort};

use super::{CommitRecord, ObjectKind};
use crate::error::Error;

/// 推送通知所需的仓库查询接口。
///
/// 对应 `git rev-parse`、`git cat-file -t` 与 `git log` 三类查询。
/// 生产环境下由 [`git2::Repository`] 实现，测试中使用内存实现。
pub trait VersionControl {
    /// 把引用名或对象 ID 解析为完整的对象 ID，无法解析时返回 [`None`]。
    fn rev_parse(&self, rev: &str) -> Option<String>;

    /// 查询对象类型，对象不存在时返回 [`ObjectKind::Unknown`]。
    fn object_kind(&self, rev: &str) -> ObjectKind;

    /// `HEAD` 指向的 ref 名称，如 `refs/heads/main`；分离 HEAD 时返回 [`None`]。
    fn head_target(&self) -> Option<String>;

    /// 列出 `start..end` 范围内的 commit，新的在前。
    ///
    /// - `start` 为 [`None`] 时列出 `end` 可达的全部 commit
    /// - `limit` 限制返回的最大条数
    fn log(
        &self,
        start: Option<&str>,
        end: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CommitRecord>, Error>;
}

impl VersionControl for Repository {
    fn rev_parse(&self, rev: &str) -> Option<String> {
        match self.revparse_single(rev) {
            Ok(object) => Some(object.id().to_string()),
            Err(e) => {
                tracing::debug!(%rev, %e, "rev-parse failed");
                None
            }
        }
    }

    fn object_kind(&self, rev: &str) -> ObjectKind {
        self.revparse_single(rev)
            .map(|object| ObjectKind::from(object.kind()))
            .unwrap_or(ObjectKind::Unknown)
    }

    fn head_target(&self) -> Option<String> {
        self.find_reference("HEAD")
            .ok()?
            .symbolic_target()
            .map(str::to_string)
    }

    /// 使用 revwalk 遍历，排序方式与 `git log` 默认输出一致。
    ///
    /// `end` 指向附注标签时会先剥离到对应的 commit。
    fn log(
        &self,
        start: Option<&str>,
        end: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CommitRecord>, Error> {
        let mut revwalk = self.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(self.revparse_single(end)?.peel_to_commit()?.id())?;
        if let Some(start) = start {
            revwalk.hide(self.revparse_single(start)?.peel_to_commit()?.id())?;
        }

        revwalk
            .take(limit.unwrap_or(usize::MAX))
            .map(|oid| -> Result<CommitRecord, Error> {
                let commit = self.find_commit(oid?)?;
                Ok(CommitRecord::try_from(&commit)?)
            })
            .collect()
    }
}
