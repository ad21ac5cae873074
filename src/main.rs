//! mqtt-desktop-notify CLI
//!
//! 订阅 MQTT topic 并把消息显示为桌面通知

use clap::{Parser, Subcommand};
use mqtt_desktop_notify::cli::{handle_createconfig, handle_run, print_version, RunOptions};
use mqtt_desktop_notify::config::default_config_path;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mqtt-desktop-notify")]
#[command(about = "Turn MQTT messages into desktop notifications")]
#[command(disable_version_flag = true)]
struct Cli {
    /// 配置文件路径（默认: ~/.config/mqttpushnotify.ini）
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// 显示版本和许可证信息
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// 只把渲染结果输出到 stdout，不弹窗
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 交互式创建配置文件后退出
    #[command(name = "createconfig")]
    CreateConfig,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Some(Commands::CreateConfig) => handle_createconfig(&config_path),
        None => {
            handle_run(
                &config_path,
                RunOptions {
                    dry_run: cli.dry_run,
                },
            )
            .await
        }
    }
}

/// 退出前打印的唯一一行错误
fn fatal_line(e: &anyhow::Error) -> String {
    format!("Error: {:#}", e)
}

#[tokio::main]
async fn main() {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug mqtt-desktop-notify
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mqtt_desktop_notify=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    if cli.version {
        print_version();
        return;
    }

    if let Err(e) = run(cli).await {
        // 不经过 tracing：RUST_LOG 关掉日志时也要看到这一行
        eprintln!("{}", fatal_line(&e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_createconfig_with_path() {
        let cli = Cli::try_parse_from(["mqtt-desktop-notify", "-c", "/tmp/x.ini", "createconfig"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CreateConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.ini")));
    }

    #[test]
    fn test_parse_version_flag() {
        let cli = Cli::try_parse_from(["mqtt-desktop-notify", "-v"]).unwrap();
        assert!(cli.version);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_default_run() {
        let cli = Cli::try_parse_from(["mqtt-desktop-notify", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_fatal_line_is_single_line_with_causes() {
        let err = anyhow::anyhow!("connection refused").context("connecting to MQTT broker");
        let line = fatal_line(&err);
        assert_eq!(line, "Error: connecting to MQTT broker: connection refused");
        assert!(!line.contains('\n'));
    }
}
