use std::fmt;

use super::{ChangeType, RefUpdate, ref_update::is_zero_id};
use crate::{
    config::NotificationConfig,
    git::{ObjectKind, VersionControl},
};

/// Git 引用类型
///
/// 由 ref 的命名空间与对象类型共同决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `refs/heads/*` 指向 commit
    Branch,
    /// `refs/tags/*` 直接指向 commit（轻量标签）
    Tag,
    /// `refs/tags/*` 指向 tag 对象
    AnnotatedTag,
    /// `refs/remotes/*` 指向 commit，不发送通知
    TrackingBranch,
    /// 其他情况，不发送通知
    Unrecognized,
}

impl RefKind {
    /// 解析 ref 名称与对象类型，返回 [`RefKind`] 与去掉命名空间前缀的短名称。
    ///
    /// | ref 前缀        | 对象类型 | 结果                          |
    /// |-----------------|----------|-------------------------------|
    /// | `refs/tags/`    | commit   | [`RefKind::Tag`]              |
    /// | `refs/tags/`    | tag      | [`RefKind::AnnotatedTag`]     |
    /// | `refs/heads/`   | commit   | [`RefKind::Branch`]           |
    /// | `refs/remotes/` | commit   | [`RefKind::TrackingBranch`]   |
    /// | 其他            | 任意     | [`RefKind::Unrecognized`]     |
    ///
    /// ```
    /// # use rocketchat_hook::{git::ObjectKind, hook::RefKind};
    /// let (kind, short) = RefKind::parse_ref_kind("refs/heads/main", ObjectKind::Commit);
    /// assert_eq!(kind, RefKind::Branch);
    /// assert_eq!(short, "main");
    /// ```
    pub fn parse_ref_kind(ref_name: &str, object_kind: ObjectKind) -> (Self, &str) {
        let namespaces = [
            ("refs/tags/", ObjectKind::Commit, RefKind::Tag),
            ("refs/tags/", ObjectKind::Tag, RefKind::AnnotatedTag),
            ("refs/heads/", ObjectKind::Commit, RefKind::Branch),
            ("refs/remotes/", ObjectKind::Commit, RefKind::TrackingBranch),
        ];

        namespaces
            .into_iter()
            .find_map(|(prefix, object, kind)| {
                let short = ref_name.strip_prefix(prefix)?;
                (object == object_kind).then_some((kind, short))
            })
            .unwrap_or((RefKind::Unrecognized, ref_name))
    }

    /// 通知文本中使用的名称，如 `annotated tag`。
    pub fn label(&self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
            RefKind::AnnotatedTag => "annotated tag",
            RefKind::TrackingBranch => "tracking branch",
            RefKind::Unrecognized => "ref",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一次 ref 更新的分类结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub change_type: ChangeType,
    pub ref_kind: RefKind,
    /// 查询到的对象类型（Create/Update 取新值，Delete 取旧值）
    pub object_kind: ObjectKind,
    /// 完整 ref 名称
    pub ref_name: String,
    pub short_ref: String,
    /// 解析后的旧 ID，全零时保持原值
    pub old_id: String,
    /// 解析后的新 ID，全零时保持原值
    pub new_id: String,
    /// 通知接收人，附注标签会切换到 `hooks.announcelist`
    pub recipients: Option<String>,
}

impl Classification {
    /// 是否需要发送通知。
    pub fn is_notifiable(&self) -> bool {
        !matches!(
            self.ref_kind,
            RefKind::TrackingBranch | RefKind::Unrecognized
        )
    }
}

/// 对 [`RefUpdate`] 分类。
///
/// 对象不存在时类型为 [`ObjectKind::Unknown`]，结果为 [`RefKind::Unrecognized`]。
pub fn classify(
    update: &RefUpdate,
    vcs: &impl VersionControl,
    config: &NotificationConfig,
) -> Classification {
    let resolve = |id: &str| {
        if is_zero_id(id) {
            id.to_string()
        } else {
            vcs.rev_parse(id).unwrap_or_else(|| id.to_string())
        }
    };
    let old_id = resolve(&update.old_id);
    let new_id = resolve(&update.new_id);

    let change_type = update.change_type();
    let rev = match change_type {
        ChangeType::Create | ChangeType::Update => &new_id,
        ChangeType::Delete => &old_id,
    };
    let object_kind = vcs.object_kind(rev);

    let (ref_kind, short_ref) = RefKind::parse_ref_kind(&update.ref_name, object_kind);

    let recipients = match ref_kind {
        RefKind::AnnotatedTag => config
            .announce_recipients
            .clone()
            .or_else(|| config.recipients.clone()),
        _ => config.recipients.clone(),
    };

    Classification {
        change_type,
        ref_kind,
        object_kind,
        ref_name: update.ref_name.clone(),
        short_ref: short_ref.to_string(),
        old_id,
        new_id,
        recipients,
    }
}
