use std::fmt;

use crate::error::{Error, Result};

/// ref 的变更类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// `0000 -> 1234`
    Create,
    /// `1234 -> 2345`
    Update,
    /// `2345 -> 0000`
    Delete,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
        })
    }
}

/// post-receive hook 的一行输入：`<old-id> <new-id> <ref-name>`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// 更新前的对象 ID
    pub old_id: String,
    /// 更新后的对象 ID
    pub new_id: String,
    /// 完整 ref 名称，如 `refs/heads/main`
    pub ref_name: String,
}

impl RefUpdate {
    pub fn new(
        old_id: impl Into<String>,
        new_id: impl Into<String>,
        ref_name: impl Into<String>,
    ) -> Self {
        Self {
            old_id: old_id.into(),
            new_id: new_id.into(),
            ref_name: ref_name.into(),
        }
    }

    /// 解析一行 hook 输入，字段之间以任意空白分隔。
    ///
    /// ```
    /// # use rocketchat_hook::hook::RefUpdate;
    /// let update = RefUpdate::parse("1111111 2222222 refs/heads/main").unwrap();
    /// assert_eq!(update.ref_name, "refs/heads/main");
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [old_id, new_id, ref_name] => Ok(Self::new(*old_id, *new_id, *ref_name)),
            _ => Err(Error::MalformedInput(line.to_string())),
        }
    }

    /// 根据新旧 ID 是否为全零推断变更类型。
    ///
    /// 旧 ID 为全零时是 [`ChangeType::Create`]，新 ID 为全零时是
    /// [`ChangeType::Delete`]，其余为 [`ChangeType::Update`]。
    pub fn change_type(&self) -> ChangeType {
        if is_zero_id(&self.old_id) {
            ChangeType::Create
        } else if is_zero_id(&self.new_id) {
            ChangeType::Delete
        } else {
            ChangeType::Update
        }
    }
}

/// SHA-1 与 SHA-256 仓库的零值长度不同，这里只检查字符。
pub fn is_zero_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b == b'0')
}
