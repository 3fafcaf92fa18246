mod entry;
mod git_operate;
#[cfg(test)]
pub(crate) mod memory;

use std::path::Path;

use git2::Repository;

pub use self::{
    entry::{CommitRecord, ObjectKind},
    git_operate::VersionControl,
};

use crate::error::Result;

/// 全零对象 ID，表示 ref 被创建（旧值）或删除（新值）。
pub const ZERO_OID: &str = "0000000000000000000000000000000000000000";

/// 打开 `GIT_DIR` 指向的仓库，裸仓库与普通仓库均可。
pub fn open_repository(git_dir: impl AsRef<Path>) -> Result<Repository> {
    let git_dir = git_dir.as_ref();
    tracing::debug!(git_dir = %git_dir.display(), "opening repository");
    Ok(Repository::open(git_dir)?)
}
