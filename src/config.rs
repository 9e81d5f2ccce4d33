// Runtime configuration from the command line and environment

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const PORT_ENV: &str = "DOCKER_MANAGER_PORT";
pub const HOST_ENV: &str = "DOCKER_MANAGER_HOST";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::load_from(&args, |key| std::env::var(key).ok())
    }

    /// Port precedence: `-port`/`--port` flag, then `DOCKER_MANAGER_PORT`, then 8080.
    pub fn load_from(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let port = match parse_port_flag(args)? {
            Some(p) => p,
            None => match env(PORT_ENV).filter(|v| !v.trim().is_empty()) {
                Some(v) => parse_port_value(&v)
                    .map_err(|e| anyhow::anyhow!("{}: {}", PORT_ENV, e))?,
                None => DEFAULT_PORT,
            },
        };
        let host = env(HOST_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let config = AppConfig {
            server: ServerConfig { port, host },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "host must be non-empty");
        Ok(())
    }
}

/// Finds `-port N`, `--port N`, `-port=N` or `--port=N`. The last occurrence wins.
/// Unrelated arguments are ignored.
pub fn parse_port_flag(args: &[String]) -> anyhow::Result<Option<u16>> {
    let mut port = None;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            continue;
        };
        if flag == "port" {
            let value = it
                .next()
                .ok_or_else(|| anyhow::anyhow!("{} requires a value", arg))?;
            port = Some(parse_port_value(value)?);
        } else if let Some(value) = flag.strip_prefix("port=") {
            port = Some(parse_port_value(value)?);
        }
    }
    Ok(port)
}

fn parse_port_value(raw: &str) -> anyhow::Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| anyhow::anyhow!("invalid port {:?}: {}", raw, e))
}
