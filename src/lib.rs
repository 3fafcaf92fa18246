pub mod config;
pub mod env;
pub mod error;
pub mod git;
pub mod hook;
pub mod notify;

use std::io::{self, BufRead, Write};

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::ConfigResolver;
use env::Environment;
use error::{Error, Result};
use hook::{EXIT_FAILURE, HookDriver, RefUpdate};

/// 控制日志级别的环境变量
pub const LOG_ENV: &str = "ROCKETCHAT_HOOK_LOG";

pub const USAGE: &str = "\
Usage: rocketchat-hook
       rocketchat-hook <ref-name> <old-id> <new-id>

Install as the post-receive hook of a repository. Without arguments it reads
\"<old-id> <new-id> <ref-name>\" lines from stdin, as git provides them.

Required configuration:
  git config hooks.rocketchat.webhook-url \"https://chat.example.com/hooks/...\"

Optional configuration (hooks.rocketchat.*):
  channel, username, icon-url, icon-emoji,
  show-only-last-commit, show-full-commit,
  repo-nice-name, repos-root,
  changeset-url-pattern (%repo_path% %rev_hash% %repo_prefix%),
  compare-url-pattern (%repo_path% %old_rev_hash% %new_rev_hash% %repo_prefix%),
  branch-regexp, timeout

Set ROCKETCHAT_HOOK_DEBUG=1 to print payloads instead of sending them.";

/// 初始化日志，输出到 stderr，级别由 [`LOG_ENV`] 控制。
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(io::stderr)
        .init();
}

/// 以当前进程的参数、环境变量与标准输入输出运行 hook，返回退出码。
pub fn run_from_process() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let env = Environment::from_process();

    run(
        &args,
        &env,
        io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr(),
    )
}

/// 运行 hook 并返回退出码。
///
/// 配置错误（未设置 `GIT_DIR` 或 webhook）会输出用法说明并在读取任何输入之前失败。
pub fn run(
    args: &[String],
    env: &Environment,
    input: impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
) -> i32 {
    match try_run(args, env, input, out, err) {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(%e, "hook aborted");
            match e {
                Error::MissingWebhookUrl | Error::GitDirNotSet | Error::InvalidArguments(_) => {
                    writeln!(err, "fatal: {e}\n\n{USAGE}").ok();
                }
                _ => {
                    writeln!(err, "fatal: {e}").ok();
                }
            }
            EXIT_FAILURE
        }
    }
}

fn try_run(
    args: &[String],
    env: &Environment,
    input: impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let git_dir = env.git_dir.as_ref().ok_or(Error::GitDirNotSet)?;

    // update hook 风格：<ref-name> <old-id> <new-id>
    let single = match args {
        [] => None,
        [ref_name, old_id, new_id] => Some(RefUpdate::new(old_id, new_id, ref_name)),
        _ => return Err(Error::InvalidArguments(args.join(" "))),
    };

    let repo = git::open_repository(git_dir)?;
    let snapshot = repo.config()?.snapshot()?;
    let config = ConfigResolver::new(&snapshot, env).resolve()?;
    let driver = HookDriver::new(&repo, &config, env.debug)?;

    match single {
        Some(update) => Ok(driver.process(&update, out, err)),
        None => driver.run(input, out, err),
    }
}
