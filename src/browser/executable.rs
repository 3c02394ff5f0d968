//! 浏览器可执行文件解析
//!
//! 优先级：
//! 1. 显式指定的路径
//! 2. serverless 环境下的打包浏览器（同时关闭 GPU）
//! 3. Windows 上的常见安装路径（不检查是否存在）
//! 4. 便携浏览器提供者（PATH 查找等）

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{Config, EXECUTABLE_OVERRIDE_VAR};
use crate::error::{Result, ScrapeError};

/// Windows 上的常见安装路径，按顺序取第一个
pub const WINDOWS_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// serverless 打包浏览器的解压位置
pub const SERVERLESS_BUNDLE_PATHS: &[&str] = &[
    "/opt/chromium/chromium",
    "/opt/chrome/chrome",
    "/tmp/chromium",
];

/// serverless 环境下关闭 GPU / 图形相关能力
pub const SERVERLESS_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--single-process",
    "--no-zygote",
];

/// 操作系统类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else {
            OsFamily::Other
        }
    }
}

/// 启动时的部署环境信号
#[derive(Debug, Clone)]
pub struct LaunchEnvironment {
    pub executable_override: Option<PathBuf>,
    pub serverless: bool,
    pub os: OsFamily,
}

impl LaunchEnvironment {
    pub fn from_config(config: &Config) -> Self {
        Self {
            executable_override: config.chrome_executable.clone(),
            serverless: config.serverless,
            os: OsFamily::current(),
        }
    }
}

/// 可执行文件的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableSource {
    Override,
    ServerlessBundle,
    KnownInstallPath,
    Portable,
}

/// 解析结果
#[derive(Debug, Clone)]
pub struct ResolvedExecutable {
    pub path: PathBuf,
    pub source: ExecutableSource,
    /// 该来源需要额外追加的启动参数
    pub extra_args: Vec<String>,
}

impl ResolvedExecutable {
    /// 启动失败时给出的修复建议
    pub fn remediation_hint(&self) -> Option<String> {
        match self.source {
            ExecutableSource::KnownInstallPath => Some(format!(
                "未在默认位置找到浏览器，请设置环境变量 {}，例如: {}=\"{}\"",
                EXECUTABLE_OVERRIDE_VAR, EXECUTABLE_OVERRIDE_VAR, WINDOWS_INSTALL_PATHS[0]
            )),
            ExecutableSource::Override => Some(format!(
                "请确认 {} 指向一个可执行的 Chrome/Chromium",
                EXECUTABLE_OVERRIDE_VAR
            )),
            _ => None,
        }
    }
}

/// 浏览器二进制提供者
pub trait BrowserBinaryProvider: Send + Sync {
    /// 提供者名称（用于日志）
    fn name(&self) -> &'static str;
    /// 定位可执行文件，找不到返回 None
    fn locate(&self) -> Option<PathBuf>;
}

/// serverless 环境中随函数一起打包的浏览器
pub struct BundledChromium;

impl BrowserBinaryProvider for BundledChromium {
    fn name(&self) -> &'static str {
        "bundled-chromium"
    }

    fn locate(&self) -> Option<PathBuf> {
        SERVERLESS_BUNDLE_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}

/// 从 PATH 和常见应用目录查找浏览器
pub struct SystemChromium;

impl SystemChromium {
    const BINARIES: [&'static str; 5] = [
        "chromium",
        "chromium-browser",
        "google-chrome",
        "google-chrome-stable",
        "chrome",
    ];
}

impl BrowserBinaryProvider for SystemChromium {
    fn name(&self) -> &'static str {
        "system-chromium"
    }

    fn locate(&self) -> Option<PathBuf> {
        for binary in Self::BINARIES {
            if let Ok(path) = which::which(binary) {
                return Some(path);
            }
        }

        if cfg!(target_os = "macos") {
            let app = Path::new("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
            if app.exists() {
                return Some(app.to_path_buf());
            }
        }

        None
    }
}

/// 可执行文件解析器
pub struct ExecutableResolver {
    env: LaunchEnvironment,
    serverless_provider: Box<dyn BrowserBinaryProvider>,
    portable_provider: Box<dyn BrowserBinaryProvider>,
}

impl ExecutableResolver {
    /// 使用默认提供者
    pub fn new(env: LaunchEnvironment) -> Self {
        Self::with_providers(env, Box::new(BundledChromium), Box::new(SystemChromium))
    }

    pub fn with_providers(
        env: LaunchEnvironment,
        serverless_provider: Box<dyn BrowserBinaryProvider>,
        portable_provider: Box<dyn BrowserBinaryProvider>,
    ) -> Self {
        Self {
            env,
            serverless_provider,
            portable_provider,
        }
    }

    pub fn environment(&self) -> &LaunchEnvironment {
        &self.env
    }

    /// 按优先级解析浏览器可执行文件
    pub fn resolve(&self) -> Result<ResolvedExecutable> {
        if let Some(path) = &self.env.executable_override {
            info!("使用显式指定的浏览器: {}", path.display());
            return Ok(ResolvedExecutable {
                path: path.clone(),
                source: ExecutableSource::Override,
                extra_args: Vec::new(),
            });
        }

        if self.env.serverless {
            debug!("serverless 环境，使用 {}", self.serverless_provider.name());
            let path = self.serverless_provider.locate().ok_or_else(|| {
                ScrapeError::ExecutableNotResolved {
                    reason: format!(
                        "serverless 环境中未找到打包的浏览器 (提供者: {})，可通过 {} 指定",
                        self.serverless_provider.name(),
                        EXECUTABLE_OVERRIDE_VAR
                    ),
                }
            })?;
            return Ok(ResolvedExecutable {
                path,
                source: ExecutableSource::ServerlessBundle,
                extra_args: SERVERLESS_ARGS.iter().map(|s| s.to_string()).collect(),
            });
        }

        if self.env.os == OsFamily::Windows {
            let path = PathBuf::from(WINDOWS_INSTALL_PATHS[0]);
            debug!("Windows 环境，使用默认安装路径: {}", path.display());
            return Ok(ResolvedExecutable {
                path,
                source: ExecutableSource::KnownInstallPath,
                extra_args: Vec::new(),
            });
        }

        let path = self.portable_provider.locate().ok_or_else(|| {
            ScrapeError::ExecutableNotResolved {
                reason: format!(
                    "提供者 {} 未找到 Chrome/Chromium，请安装浏览器或设置 {}",
                    self.portable_provider.name(),
                    EXECUTABLE_OVERRIDE_VAR
                ),
            }
        })?;
        debug!(
            "通过 {} 找到浏览器: {}",
            self.portable_provider.name(),
            path.display()
        );
        Ok(ResolvedExecutable {
            path,
            source: ExecutableSource::Portable,
            extra_args: Vec::new(),
        })
    }
}
