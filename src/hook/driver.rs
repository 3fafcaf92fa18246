use std::io::{BufRead, Write};

use super::RefUpdate;
use crate::{
    config::NotificationConfig,
    error::Result,
    git::VersionControl,
    notify::{self, Dispatcher, Notification},
};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// post-receive hook 驱动。
///
/// 逐行读取 `<old-id> <new-id> <ref-name>`，每一行完整处理
/// （分类、过滤、格式化、发送）之后再读取下一行。
///
/// 退出码取**最后一行**的处理结果，而不是所有行的汇总：
/// 前面某一行发送失败、最后一行成功时，整体仍然返回成功。
pub struct HookDriver<'a, V: VersionControl> {
    vcs: &'a V,
    config: &'a NotificationConfig,
    dispatcher: Dispatcher,
}

impl<'a, V: VersionControl> HookDriver<'a, V> {
    /// 创建驱动，未配置 webhook 时返回错误，此时不会读取任何输入。
    pub fn new(vcs: &'a V, config: &'a NotificationConfig, debug: bool) -> Result<Self> {
        Ok(Self {
            vcs,
            config,
            dispatcher: Dispatcher::new(config, debug)?,
        })
    }

    /// 处理全部输入直到 EOF，返回最后一行的退出码；没有输入时返回成功。
    ///
    /// 空行被忽略，不影响退出码。ref 名称中非 UTF-8 的字节按替换字符处理。
    pub fn run(
        &self,
        mut input: impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<i32> {
        let mut status = EXIT_SUCCESS;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if line.trim().is_empty() {
                continue;
            }

            status = match RefUpdate::parse(&line) {
                Ok(update) => self.process(&update, out, err),
                Err(e) => {
                    writeln!(err, "*** {e}")?;
                    EXIT_FAILURE
                }
            };
        }

        Ok(status)
    }

    /// 处理单个 ref 更新并返回退出码。
    ///
    /// 发送失败只影响当前这一行，通知不会重试。
    pub fn process(&self, update: &RefUpdate, out: &mut impl Write, err: &mut impl Write) -> i32 {
        let notification = match notify::prepare(update, self.vcs, self.config) {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(ref_name = %update.ref_name, %e, "failed to build notification");
                writeln!(err, "*** Failed to build notification for {}: {e}", update.ref_name).ok();
                return EXIT_FAILURE;
            }
        };

        match notification {
            Notification::Skipped(reason) => {
                tracing::info!(ref_name = %update.ref_name, ?reason, "skipped");
                writeln!(err, "{reason}").ok();
                EXIT_SUCCESS
            }
            Notification::Ready {
                classification,
                payload,
            } => {
                tracing::info!(
                    ref_name = %update.ref_name,
                    change = %classification.change_type,
                    kind = %classification.ref_kind,
                    pusher = ?self.config.pusher,
                    recipients = ?classification.recipients,
                    debug = self.dispatcher.is_debug(),
                    "sending notification"
                );

                match self.dispatcher.send(&payload, out) {
                    Ok(()) => EXIT_SUCCESS,
                    Err(e) => {
                        tracing::error!(ref_name = %update.ref_name, %e, "failed to send notification");
                        writeln!(err, "*** Failed to send notification for {}: {e}", update.ref_name)
                            .ok();
                        EXIT_FAILURE
                    }
                }
            }
        }
    }
}
