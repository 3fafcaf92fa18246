use std::{
    env,
    path::{Path, PathBuf},
};

/// 开启调试模式的环境变量，开启后只打印 payload，不发送请求。
pub const DEBUG_VAR: &str = "ROCKETCHAT_HOOK_DEBUG";

/// hook 运行时的进程环境。
///
/// 所有环境变量只在 [`Environment::from_process`] 中读取一次，
/// 之后显式传递给配置解析和 hook 驱动，测试中可以直接构造。
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `GIT_DIR`，post-receive hook 由 git 设置
    pub git_dir: Option<PathBuf>,
    /// gitolite 提供的仓库名
    pub gl_repo: Option<String>,
    /// gitolite 提供的推送用户
    pub gl_user: Option<String>,
    /// 系统用户 `USER`
    pub user: Option<String>,
    /// 当前工作目录
    pub pwd: PathBuf,
    /// 调试模式
    pub debug: bool,
}

impl Environment {
    /// 从当前进程的环境变量构造 [`Environment`]。
    pub fn from_process() -> Self {
        Self {
            git_dir: non_empty_var("GIT_DIR").map(PathBuf::from),
            gl_repo: non_empty_var("GL_REPO"),
            gl_user: non_empty_var("GL_USER"),
            user: non_empty_var("USER"),
            pwd: env::current_dir()
                .ok()
                .or_else(|| non_empty_var("PWD").map(PathBuf::from))
                .unwrap_or_default(),
            debug: non_empty_var(DEBUG_VAR).is_some_and(|v| is_enabled(&v)),
        }
    }

    /// 推送者身份：优先 `GL_USER`，否则 `USER`。
    pub fn pusher(&self) -> Option<&str> {
        self.gl_user.as_deref().or(self.user.as_deref())
    }

    /// 仓库名称。
    ///
    /// gitolite 环境下直接使用 `GL_REPO`；否则取工作目录名，
    /// 工作目录为 `.git` 时取其父目录名，并去掉 `.git` 后缀。
    pub fn repo_name(&self) -> String {
        if let Some(repo) = &self.gl_repo {
            return repo.clone();
        }

        let dir = match file_name(&self.pwd) {
            Some(".git") => self.pwd.parent().and_then(file_name),
            other => other,
        }
        .unwrap_or_default();

        dir.strip_suffix(".git").unwrap_or(dir).to_string()
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn is_enabled(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
