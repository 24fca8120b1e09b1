//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file given
//! with `--config`, then the remaining command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::Deserialize;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_ROOT: &str = "./public";
pub const DEFAULT_INDEX: &str = "index.html";
pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
}

/// Listening socket and connection behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// When false every response carries `Connection: close`.
    pub keep_alive: bool,
    /// Zero disables the idle and write timeouts.
    pub idle_timeout_secs: u64,
}

/// Document root and file transfer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub root: PathBuf,
    pub index: String,
    pub chunk_size: usize,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Serve(Config),
    Help,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            keep_alive: true,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            index: DEFAULT_INDEX.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            // bare IPv6 literal
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments.
    pub fn load() -> anyhow::Result<Invocation> {
        Self::from_args(std::env::args().skip(1))
    }

    /// Parses a YAML document; missing keys keep their defaults.
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(source).context("invalid configuration file")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&source)
    }

    /// Parses command-line flags (without the program name).
    ///
    /// `--config` is applied first wherever it appears, so flags always
    /// override values from the file.
    pub fn from_args<I>(args: I) -> anyhow::Result<Invocation>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let mut cfg = match config_file_arg(&args)? {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };

        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-c" | "--config" => {
                    // already applied
                    args.next();
                }
                "-a" | "--addr" => {
                    cfg.server.address = args.next().context("missing ip after --addr")?.clone();
                }
                "-p" | "--port" => {
                    let number = args.next().context("missing number after --port")?;
                    cfg.server.port = number
                        .parse()
                        .with_context(|| format!("port number {number} is invalid"))?;
                }
                "-r" | "--root" => {
                    let dir = args.next().context("missing directory after --root")?;
                    cfg.static_files.root = PathBuf::from(dir);
                }
                "--index" => {
                    cfg.static_files.index =
                        args.next().context("missing filename after --index")?.clone();
                }
                "--chunk-size" => {
                    let number = args.next().context("missing number after --chunk-size")?;
                    cfg.static_files.chunk_size = number
                        .parse()
                        .with_context(|| format!("chunk size {number} is invalid"))?;
                }
                "--timeout" => {
                    let number = args.next().context("missing number after --timeout")?;
                    cfg.server.idle_timeout_secs = number
                        .parse()
                        .with_context(|| format!("timeout {number} is invalid"))?;
                }
                "--no-keepalive" => cfg.server.keep_alive = false,
                other => return Err(anyhow!("unknown argument `{other}'")),
            }
        }

        cfg.validate()?;
        Ok(Invocation::Serve(cfg))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.static_files.chunk_size == 0 {
            return Err(anyhow!("chunk size must be greater than zero"));
        }
        if self.static_files.index.is_empty() || self.static_files.index.contains('/') {
            return Err(anyhow!(
                "index name `{}' must be a plain file name",
                self.static_files.index
            ));
        }
        Ok(())
    }
}

fn config_file_arg(args: &[String]) -> anyhow::Result<Option<&str>> {
    match args.iter().position(|a| a == "-c" || a == "--config") {
        Some(i) => args
            .get(i + 1)
            .map(|p| Some(p.as_str()))
            .context("missing filename after --config"),
        None => Ok(None),
    }
}

pub fn usage(argv0: &str) -> String {
    format!(
        "usage:\t{argv0} [flags]\n\n\
        flags:\t-a, --addr ip (default: {DEFAULT_ADDRESS})\n\
        \t\tAddress to bind the listening socket to.\n\n\
        \t-p, --port number (default: {DEFAULT_PORT})\n\
        \t\tPort to listen on. Pass 0 to let the system choose.\n\n\
        \t-r, --root dir (default: {DEFAULT_ROOT})\n\
        \t\tDocument root that request paths are mapped onto.\n\n\
        \t--index filename (default: {DEFAULT_INDEX})\n\
        \t\tFile served when a path ending in / is requested.\n\n\
        \t--chunk-size bytes (default: {DEFAULT_CHUNK_SIZE})\n\
        \t\tSize of each file read sent to the client.\n\n\
        \t--timeout secs (default: {DEFAULT_IDLE_TIMEOUT_SECS})\n\
        \t\tIdle and write timeout. 0 disables it.\n\n\
        \t--no-keepalive\n\
        \t\tClose the connection after every response.\n\n\
        \t-c, --config file\n\
        \t\tYAML file with server/static_files settings; flags override it.\n\n\
        \t-h, --help\n\
        \t\tPrint this message.\n"
    )
}
