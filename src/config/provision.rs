//! 配置向导 - 加载已有配置，或交互式创建新配置
//!
//! 提问逻辑通过 [`Prompter`] 注入：终端下使用 dialoguer，测试中使用
//! [`ScriptedPrompter`] 预设答案。默认值规则和持久化与提问方式无关。

use super::record::{
    resolve, Config, RawConfig, DEFAULT_BODY, DEFAULT_PORT, DEFAULT_SERVER, DEFAULT_TITLE,
    DEFAULT_TOPIC,
};
use super::{store, ConfigError};
use dialoguer::{Confirm, Input, Password};
use std::collections::VecDeque;
use std::path::Path;
use tracing::info;

/// 交互式提问接口
pub trait Prompter {
    /// 文本输入；`default` 会在用户直接回车时返回
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError>;

    /// 隐藏输入（密码），允许为空
    fn password(&mut self, prompt: &str) -> Result<String, ConfigError>;

    /// 是/否确认
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigError>;

    /// 向操作者输出一行提示信息
    fn message(&mut self, text: &str);
}

fn prompt_error(e: dialoguer::Error) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}

/// 基于 dialoguer 的终端提问
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn password(&mut self, prompt: &str) -> Result<String, ConfigError> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn message(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// 按顺序使用预设答案回答提示
///
/// 空答案等同于直接回车（取默认值）。确认题接受 `y`/`yes`（不区分大小写）。
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// 已经问过的问题
    pub asked: Vec<String>,
    /// 输出过的提示信息
    pub messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String, ConfigError> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ConfigError::Prompt(format!("no scripted answer for '{}'", prompt)))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError> {
        let answer = self.next(prompt)?;
        match default {
            Some(default) if answer.trim().is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn password(&mut self, prompt: &str) -> Result<String, ConfigError> {
        self.next(prompt)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigError> {
        let answer = self.next(prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

/// 逐项收集配置（不做持久化）
pub fn collect_answers(prompter: &mut dyn Prompter) -> Result<RawConfig, ConfigError> {
    prompter.message("Enter MQTT Configuration:");

    let server = prompter.input("Server", Some(DEFAULT_SERVER))?;
    let port = prompter.input("Port", Some(DEFAULT_PORT))?;
    let topic = prompter.input("Topic", Some(DEFAULT_TOPIC))?;
    let username = prompter.input("MQTT Username (press Enter for no username)", None)?;
    let password = prompter.password("MQTT Password (press Enter for no password)")?;

    let mut raw = RawConfig {
        server: Some(server),
        port: Some(port),
        topic: Some(topic),
        username: Some(username),
        password: Some(password),
        ..Default::default()
    };

    if prompter.confirm("Do you want to configure notification settings?", false)? {
        raw.title = Some(prompter.input("Notification title", None)?);
        raw.text = Some(prompter.input("Notification text", None)?);
        raw.mode = Some(prompter.input("Notification type (static/dynamic/json)", Some("static"))?);
    } else {
        raw.title = Some(DEFAULT_TITLE.to_string());
        raw.text = Some(DEFAULT_BODY.to_string());
        raw.mode = Some("static".to_string());
    }

    Ok(raw)
}

/// 交互式创建配置并写入 `path`，覆盖已有文件
pub fn create_config(path: &Path, prompter: &mut dyn Prompter) -> Result<Config, ConfigError> {
    let raw = collect_answers(prompter)?;
    let config = resolve(&raw);
    store::save(path, &config)?;

    prompter.message(&format!("Config file created successfully at {}", path.display()));
    Ok(config)
}

/// 文件存在则加载（不回写），否则交互式创建
pub fn provision(path: &Path, prompter: &mut dyn Prompter) -> Result<Config, ConfigError> {
    if path.exists() {
        info!(path = %path.display(), "Using existing config");
        return store::load(path);
    }
    create_config(path, prompter)
}

/// 启动时使用：文件不存在时先确认（默认是），拒绝则返回 [`ConfigError::Declined`]
pub fn ensure_config(path: &Path, prompter: &mut dyn Prompter) -> Result<Config, ConfigError> {
    if !path.exists() {
        prompter.message(&format!("No config file found at {}", path.display()));
        if !prompter.confirm("Do you want to create a new config file?", true)? {
            return Err(ConfigError::Declined {
                path: path.to_path_buf(),
            });
        }
    }
    provision(path, prompter)
}
