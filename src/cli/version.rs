//! 版本与许可证信息

pub const PROJECT_URL: &str = "https://github.com/td00/mqtt-desktop-notify";

/// `-v` 输出的文本
pub fn version_text() -> String {
    format!(
        "mqtt-desktop-notify is running in version {}\n\n\
         mqtt-desktop-notify is licensed under AGPLv3.\n\n\
         Find out more: {}",
        env!("CARGO_PKG_VERSION"),
        PROJECT_URL
    )
}

pub fn print_version() {
    println!("{}", version_text());
}
