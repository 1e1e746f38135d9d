//! Server management - starting and health checking the mock API

use pizzamock_common::FixtureKind;
use pizzamock_web::{MockConfig, MockServer};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running mock server
pub struct ServerHandle {
    process: ServerProcess,
    pub base_url: String,
    pub port: u16,
}

enum ServerProcess {
    Child(Child),
    Task(JoinHandle<()>),
    Stopped,
}

impl ServerHandle {
    /// Start the server the way the config asks for
    pub async fn start(config: ServerConfig) -> E2eResult<Self> {
        if config.in_process {
            Self::in_process(config).await
        } else {
            Self::spawn(config).await
        }
    }

    /// Spawn the pizzamock-web binary
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning mock server on port {}", port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.env("PIZZAMOCK_LISTEN", format!("127.0.0.1:{}", port))
            .env("PIZZAMOCK_FIXTURE", config.fixture.to_string())
            .env("PIZZAMOCK_UPSTREAM", config.upstream.as_deref().unwrap_or(""));

        cmd.stdout(Stdio::null()).stderr(Stdio::inherit());

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = ServerHandle {
            process: ServerProcess::Child(child),
            base_url: base_url.clone(),
            port,
        };

        handle.wait_for_healthy(config.startup_timeout).await?;

        info!("Server is healthy at {}", base_url);
        Ok(handle)
    }

    /// Host the mock router on a task of the current runtime
    pub async fn in_process(config: ServerConfig) -> E2eResult<Self> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port.unwrap_or(0))).await?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let mock_config = MockConfig {
            listen: format!("127.0.0.1:{}", port),
            fixture: config.fixture,
            upstream: config.upstream.clone(),
            ..Default::default()
        };
        let server = MockServer::new(&mock_config)
            .map_err(|e| E2eError::ServerStartup(e.to_string()))?;

        info!("Starting in-process mock server on port {}", port);
        let task = tokio::spawn(async move {
            if let Err(e) = server.serve_listener(listener).await {
                warn!("in-process server stopped: {}", e);
            }
        });

        let handle = ServerHandle {
            process: ServerProcess::Task(task),
            base_url,
            port,
        };

        handle.wait_for_healthy(config.startup_timeout).await?;
        Ok(handle)
    }

    /// Wait for the server to respond to health checks
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}/health", self.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Connection refused is expected while server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the server
    pub fn stop(&mut self) -> E2eResult<()> {
        match std::mem::replace(&mut self.process, ServerProcess::Stopped) {
            ServerProcess::Child(mut child) => {
                info!("Stopping server (pid: {})", child.id());

                // Try graceful shutdown first
                #[cfg(unix)]
                {
                    use nix::sys::signal::{kill, Signal};
                    use nix::unistd::Pid;

                    let pid = Pid::from_raw(child.id() as i32);
                    if kill(pid, Signal::SIGTERM).is_ok() {
                        std::thread::sleep(Duration::from_millis(500));
                    }
                }

                // Force kill if still running
                let _ = child.kill();
                let _ = child.wait();
            }
            ServerProcess::Task(task) => {
                info!("Stopping in-process server on port {}", self.port);
                task.abort();
            }
            ServerProcess::Stopped => {}
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for starting a server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the pizzamock-web binary
    pub binary_path: PathBuf,

    /// Seed data the server starts from
    pub fixture: FixtureKind,

    /// Where unmocked requests go
    pub upstream: Option<String>,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Run the router inside this process instead of spawning the binary
    pub in_process: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/debug/pizzamock-web"),
            fixture: FixtureKind::Storefront,
            upstream: None,
            port: None,
            startup_timeout: Duration::from_secs(30),
            in_process: true,
        }
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
