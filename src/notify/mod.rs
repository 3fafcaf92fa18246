mod commits;
mod dispatch;
mod message;
mod payload;

use std::fmt;

pub use self::{
    commits::{CommitRangeFormatter, CommitSummary},
    dispatch::Dispatcher,
    message::{Message, MessageComposer},
    payload::{Attachment, Payload},
};

use crate::{
    config::NotificationConfig,
    error::Result,
    git::{ObjectKind, VersionControl},
    hook::{Classification, RefKind, RefUpdate, classify},
};

/// 不发送通知的原因，这些情况不是错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `refs/remotes/*` 的更新
    TrackingBranch { ref_name: String },
    /// 未知类型的 ref 或对象不存在
    Unrecognized {
        ref_name: String,
        object_kind: ObjectKind,
    },
    /// 分支名不匹配 `branch-regexp`
    BranchFiltered { short_ref: String },
}

impl fmt::Display for SkipReason {
    /// 推送者在 `git push` 输出中看到的提示。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TrackingBranch { ref_name } => {
                writeln!(f, "*** Push-update of tracking branch, {ref_name}")?;
            }
            SkipReason::Unrecognized {
                ref_name,
                object_kind,
            } => {
                let kind = match object_kind {
                    ObjectKind::Commit => "commit",
                    ObjectKind::Tag => "tag",
                    ObjectKind::Unknown => "unknown",
                };
                writeln!(f, "*** Unknown type of update to {ref_name} ({kind})")?;
            }
            SkipReason::BranchFiltered { short_ref } => {
                writeln!(
                    f,
                    "*** Branch {short_ref} does not match hooks.rocketchat.branch-regexp"
                )?;
            }
        }
        write!(f, "***  - no notification generated.")
    }
}

/// 一次 ref 更新的处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Ready {
        classification: Classification,
        payload: Payload,
    },
    Skipped(SkipReason),
}

/// 分类、过滤、格式化并构建 payload，不做发送。
pub fn prepare(
    update: &RefUpdate,
    vcs: &impl VersionControl,
    config: &NotificationConfig,
) -> Result<Notification> {
    let classification = classify(update, vcs, config);

    if !classification.is_notifiable() {
        let reason = match classification.ref_kind {
            RefKind::TrackingBranch => SkipReason::TrackingBranch {
                ref_name: classification.ref_name,
            },
            _ => SkipReason::Unrecognized {
                ref_name: classification.ref_name,
                object_kind: classification.object_kind,
            },
        };
        return Ok(Notification::Skipped(reason));
    }

    if !config.branch_allowed(&classification.short_ref) {
        return Ok(Notification::Skipped(SkipReason::BranchFiltered {
            short_ref: classification.short_ref,
        }));
    }

    let message = MessageComposer::new(vcs, config).compose(&classification)?;
    let payload = Payload::build(&message, config);

    Ok(Notification::Ready {
        classification,
        payload,
    })
}
