use std::{collections::HashMap, path::Path, time::Duration};

use regex::Regex;

use crate::{env::Environment, error::Result};

/// 配置键名
pub mod keys {
    pub const WEBHOOK_URL: &str = "hooks.rocketchat.webhook-url";
    pub const CHANNEL: &str = "hooks.rocketchat.channel";
    pub const USERNAME: &str = "hooks.rocketchat.username";
    pub const ICON_URL: &str = "hooks.rocketchat.icon-url";
    pub const ICON_EMOJI: &str = "hooks.rocketchat.icon-emoji";
    pub const SHOW_ONLY_LAST_COMMIT: &str = "hooks.rocketchat.show-only-last-commit";
    pub const SHOW_FULL_COMMIT: &str = "hooks.rocketchat.show-full-commit";
    pub const REPO_NICE_NAME: &str = "hooks.rocketchat.repo-nice-name";
    pub const REPOS_ROOT: &str = "hooks.rocketchat.repos-root";
    pub const CHANGESET_URL_PATTERN: &str = "hooks.rocketchat.changeset-url-pattern";
    pub const COMPARE_URL_PATTERN: &str = "hooks.rocketchat.compare-url-pattern";
    pub const BRANCH_REGEXP: &str = "hooks.rocketchat.branch-regexp";
    pub const TIMEOUT: &str = "hooks.rocketchat.timeout";

    pub const IRC_PREFIX: &str = "hooks.irc.prefix";
    pub const EMAIL_PREFIX: &str = "hooks.emailprefix";
    pub const MAILING_LIST: &str = "hooks.mailinglist";
    pub const ANNOUNCE_LIST: &str = "hooks.announcelist";
}

/// 仓库显示名称的候选配置，按顺序取第一个存在的值。
const DISPLAY_NAME_KEYS: [&str; 3] = [keys::REPO_NICE_NAME, keys::IRC_PREFIX, keys::EMAIL_PREFIX];

/// 请求超时的默认秒数
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// 键值配置来源。
///
/// 生产环境下是仓库的 git 配置，测试中使用 [`HashMap`]。
/// 空字符串视为未设置。
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigStore for git2::Config {
    /// 需要在 snapshot 上调用，见 [`git2::Config::snapshot`]。
    fn get(&self, key: &str) -> Option<String> {
        self.get_string(key).ok().filter(|v| !v.is_empty())
    }
}

impl ConfigStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

/// 一次 hook 运行所用的通知配置，解析后不再变化。
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub icon_url: Option<String>,
    pub icon_emoji: Option<String>,
    pub show_only_last: bool,
    pub show_full_commit: bool,
    /// 消息中展示的仓库名称
    pub repo_display_name: String,
    /// 链接模板中的 `%repo_path%`
    pub repo_path: String,
    pub changeset_url_pattern: Option<String>,
    pub compare_url_pattern: Option<String>,
    pub branch_regexp: Option<Regex>,
    pub timeout: Duration,
    pub recipients: Option<String>,
    pub announce_recipients: Option<String>,
    /// 推送者，`GL_USER` 或 `USER`
    pub pusher: Option<String>,
}

impl NotificationConfig {
    /// 分支名是否通过 `branch-regexp` 过滤，未配置时全部通过。
    pub fn branch_allowed(&self, short_ref: &str) -> bool {
        self.branch_regexp
            .as_ref()
            .is_none_or(|re| re.is_match(short_ref))
    }

    /// 渲染单个 commit 的链接，未配置模板时返回 [`None`]。
    pub fn changeset_url(&self, rev_hash: &str) -> Option<String> {
        let pattern = self.changeset_url_pattern.as_deref()?;
        Some(render_template(
            pattern,
            &[
                ("%repo_path%", self.repo_path.as_str()),
                ("%rev_hash%", rev_hash),
                ("%repo_prefix%", self.repo_display_name.as_str()),
            ],
        ))
    }

    /// 渲染比较链接，未配置模板时返回 [`None`]。
    pub fn compare_url(&self, old_rev: &str, new_rev: &str) -> Option<String> {
        let pattern = self.compare_url_pattern.as_deref()?;
        Some(render_template(
            pattern,
            &[
                ("%repo_path%", self.repo_path.as_str()),
                ("%old_rev_hash%", old_rev),
                ("%new_rev_hash%", new_rev),
                ("%repo_prefix%", self.repo_display_name.as_str()),
            ],
        ))
    }
}

fn render_template(pattern: &str, vars: &[(&str, &str)]) -> String {
    vars.iter()
        .fold(pattern.to_string(), |acc, (name, value)| acc.replace(name, value))
}

/// 从 [`ConfigStore`] 与 [`Environment`] 解析出 [`NotificationConfig`]。
///
/// 只做空值判断，`webhook-url` 是否存在在发送前检查。
pub struct ConfigResolver<'a> {
    store: &'a dyn ConfigStore,
    env: &'a Environment,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(store: &'a dyn ConfigStore, env: &'a Environment) -> Self {
        Self { store, env }
    }

    /// 解析全部配置。
    ///
    /// `branch-regexp` 在这里编译，表达式无效时返回错误。
    pub fn resolve(&self) -> Result<NotificationConfig> {
        let branch_regexp = self
            .get(keys::BRANCH_REGEXP)
            .map(|pattern| Regex::new(&pattern))
            .transpose()?;

        Ok(NotificationConfig {
            webhook_url: self.get(keys::WEBHOOK_URL),
            channel: self.get(keys::CHANNEL),
            username: self.get(keys::USERNAME),
            icon_url: self.get(keys::ICON_URL),
            icon_emoji: self.get(keys::ICON_EMOJI),
            show_only_last: self.get_bool(keys::SHOW_ONLY_LAST_COMMIT),
            show_full_commit: self.get_bool(keys::SHOW_FULL_COMMIT),
            repo_display_name: self.repo_display_name(),
            repo_path: self.repo_path(),
            changeset_url_pattern: self.get(keys::CHANGESET_URL_PATTERN),
            compare_url_pattern: self.get(keys::COMPARE_URL_PATTERN),
            branch_regexp,
            timeout: self.timeout(),
            recipients: self.get(keys::MAILING_LIST),
            announce_recipients: self.get(keys::ANNOUNCE_LIST),
            pusher: self.env.pusher().map(str::to_string),
        })
    }

    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| parse_bool(&v))
    }

    fn repo_display_name(&self) -> String {
        DISPLAY_NAME_KEYS
            .iter()
            .find_map(|key| self.get(key))
            .unwrap_or_else(|| self.env.repo_name())
    }

    /// 工作目录去掉 `repos-root` 前缀后的相对路径。
    fn repo_path(&self) -> String {
        let pwd = &self.env.pwd;
        self.get(keys::REPOS_ROOT)
            .and_then(|root| {
                pwd.strip_prefix(Path::new(&root))
                    .ok()
                    .map(|p| p.display().to_string())
            })
            .unwrap_or_else(|| pwd.display().to_string())
    }

    /// 请求超时，必须是正整数秒，否则使用默认值。
    fn timeout(&self) -> Duration {
        let secs = match self.get(keys::TIMEOUT) {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .unwrap_or_else(|| {
                    tracing::warn!(value = %v, "invalid {}, using default", keys::TIMEOUT);
                    DEFAULT_TIMEOUT_SECS
                }),
            None => DEFAULT_TIMEOUT_SECS,
        };
        Duration::from_secs(secs)
    }
}

/// git 风格的布尔值。
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;

    pub(crate) fn store(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub(crate) fn env() -> Environment {
        Environment {
            git_dir: Some(PathBuf::from(".")),
            pwd: PathBuf::from("/srv/git/team/project.git"),
            user: Some("git".to_string()),
            ..Default::default()
        }
    }

    fn resolve(pairs: &[(&str, &str)]) -> NotificationConfig {
        let store = store(pairs);
        let env = env();
        ConfigResolver::new(&store, &env).resolve().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[]);
        assert_eq!(config.webhook_url, None);
        assert!(!config.show_only_last);
        assert!(!config.show_full_commit);
        assert_eq!(config.repo_display_name, "project");
        assert_eq!(config.repo_path, "/srv/git/team/project.git");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.pusher.as_deref(), Some("git"));
        assert!(config.branch_allowed("anything"));
    }

    #[test]
    fn test_display_name_precedence() {
        let config = resolve(&[
            (keys::EMAIL_PREFIX, "[email]"),
            (keys::IRC_PREFIX, "irc"),
            (keys::REPO_NICE_NAME, "Nice"),
        ]);
        assert_eq!(config.repo_display_name, "Nice");

        let config = resolve(&[(keys::EMAIL_PREFIX, "[email]"), (keys::IRC_PREFIX, "irc")]);
        assert_eq!(config.repo_display_name, "irc");

        let config = resolve(&[(keys::EMAIL_PREFIX, "[email]")]);
        assert_eq!(config.repo_display_name, "[email]");

        // 空值视为未设置
        let config = resolve(&[(keys::REPO_NICE_NAME, "")]);
        assert_eq!(config.repo_display_name, "project");
    }

    #[test]
    fn test_bool_values() {
        for value in ["true", "TRUE", "yes", "on", "1"] {
            assert!(resolve(&[(keys::SHOW_ONLY_LAST_COMMIT, value)]).show_only_last);
        }
        for value in ["false", "no", "0", "maybe"] {
            assert!(!resolve(&[(keys::SHOW_FULL_COMMIT, value)]).show_full_commit);
        }
    }

    #[test]
    fn test_repo_path_relative_to_root() {
        let config = resolve(&[(keys::REPOS_ROOT, "/srv/git/")]);
        assert_eq!(config.repo_path, "team/project.git");

        let config = resolve(&[(keys::REPOS_ROOT, "/elsewhere")]);
        assert_eq!(config.repo_path, "/srv/git/team/project.git");
    }

    #[test]
    fn test_link_templates() {
        let config = resolve(&[
            (keys::REPOS_ROOT, "/srv/git"),
            (keys::REPO_NICE_NAME, "Project"),
            (
                keys::CHANGESET_URL_PATTERN,
                "https://git.example.com/%repo_path%/commit/%rev_hash%?p=%repo_prefix%",
            ),
            (
                keys::COMPARE_URL_PATTERN,
                "https://git.example.com/%repo_path%/compare/%old_rev_hash%...%new_rev_hash%",
            ),
        ]);

        assert_eq!(
            config.changeset_url("abc1234").as_deref(),
            Some("https://git.example.com/team/project.git/commit/abc1234?p=Project")
        );
        assert_eq!(
            config.compare_url("aaa", "bbb").as_deref(),
            Some("https://git.example.com/team/project.git/compare/aaa...bbb")
        );
    }

    #[test]
    fn test_no_templates() {
        let config = resolve(&[]);
        assert_eq!(config.changeset_url("abc1234"), None);
        assert_eq!(config.compare_url("aaa", "bbb"), None);
    }

    #[test]
    fn test_branch_regexp() {
        let config = resolve(&[(keys::BRANCH_REGEXP, "^release-")]);
        assert!(config.branch_allowed("release-9"));
        assert!(!config.branch_allowed("main"));
    }

    #[test]
    fn test_invalid_branch_regexp() {
        let store = store(&[(keys::BRANCH_REGEXP, "release-(")]);
        let env = env();
        let err = ConfigResolver::new(&store, &env).resolve().unwrap_err();
        assert!(matches!(err, crate::error::Error::BranchRegexp(_)));
    }

    #[test]
    fn test_timeout() {
        let config = resolve(&[(keys::TIMEOUT, "12")]);
        assert_eq!(config.timeout, Duration::from_secs(12));

        for invalid in ["soon", "0", "-3"] {
            let config = resolve(&[(keys::TIMEOUT, invalid)]);
            assert_eq!(
                config.timeout,
                Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                "timeout {invalid:?}"
            );
        }
    }
}
