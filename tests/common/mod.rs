// Shared test helpers

#![allow(dead_code)]

use docker_manager::docker_repo::DockerRepo;
use docker_manager::host_repo::HostRepo;
use docker_manager::systemd_repo::{CommandOutput, CommandRunner, SystemdRepo};
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

type Handler = dyn Fn(&str, &[String]) -> std::io::Result<CommandOutput> + Send + Sync;

/// Canned subprocess results, with every invocation recorded as "program arg arg ...".
pub struct FakeRunner {
    handler: Box<Handler>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(
        handler: impl Fn(&str, &[String]) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, std::io::Result<CommandOutput>> {
        let mut line = program.to_string();
        for a in args {
            line.push(' ');
            line.push_str(a);
        }
        self.calls.lock().unwrap().push(line);
        let result = (self.handler)(program, args);
        Box::pin(async move { result })
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

pub fn exit(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

pub const LIST_UNITS: &str = "\
  b.service   loaded active exited  Bravo oneshot
● a.service   loaded active running Alpha daemon
  c.service   loaded active exited  Charlie oneshot
";

pub const NGINX_STATUS: &str = "\
● nginx.service - A high performance web server
     Loaded: loaded (/lib/systemd/system/nginx.service; enabled; vendor preset: enabled)
     Active: active (running) since Mon 2024-01-01 10:00:00 UTC; 2h ago
   Main PID: 1234 (nginx)
";

pub const NGINX_SHOW: &str = "\
Id=nginx.service
Description=A high performance web server
Type=forking
MemoryCurrent=5242880
TasksCurrent=3
ExecStart={ path=/usr/sbin/nginx ; argv[]=/usr/sbin/nginx -g daemon on; }
";

pub const NGINX_JOURNAL: &str = "\
Jan 01 10:00:00 host systemd[1]: Starting nginx...

Jan 01 10:00:01 host systemd[1]: Started nginx.
";

/// Answers like a host with one healthy nginx unit; `systemctl start broken` fails.
pub fn systemd_host() -> Arc<FakeRunner> {
    FakeRunner::new(|program, args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Ok(match (program, args.as_slice()) {
            ("systemctl", ["list-units", ..]) => ok(LIST_UNITS),
            ("systemctl", ["status", "nginx", ..]) => ok(NGINX_STATUS),
            ("systemctl", ["status", ..]) => exit(4, "", "Unit missing.service could not be found."),
            ("systemctl", ["show", "nginx", ..]) => ok(NGINX_SHOW),
            ("systemctl", [_, "broken"]) => exit(5, "", "Unit broken.service not found."),
            ("systemctl", [_, _]) => ok(""),
            ("journalctl", _) => ok(NGINX_JOURNAL),
            _ => exit(1, "", "unexpected command"),
        })
    })
}

pub fn systemd_repo(runner: Arc<FakeRunner>) -> Arc<SystemdRepo> {
    Arc::new(SystemdRepo::with_runner(runner))
}

/// A client pointed at a plain file instead of a daemon socket, so every Docker call fails
/// fast with a connection error. Keep the returned dir alive for the test's duration.
pub fn dead_docker() -> (tempfile::TempDir, Arc<DockerRepo>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docker.sock");
    std::fs::write(&path, b"").unwrap();
    let repo = DockerRepo::connect_with_socket(path.to_str().unwrap()).unwrap();
    (dir, Arc::new(repo))
}

/// A daemon on a unix socket that answers every request with a chunked 200 and then sends
/// nothing, like an idle `/events` subscription. Must be called inside a runtime.
pub fn silent_event_daemon() -> (tempfile::TempDir, Arc<DockerRepo>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docker.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        while let Ok((mut conn, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = conn.read(&mut buf).await;
                let _ = conn
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          Content-Type: application/json\r\n\
                          Transfer-Encoding: chunked\r\n\r\n",
                    )
                    .await;
                // Held open until the client hangs up.
                while matches!(conn.read(&mut buf).await, Ok(n) if n > 0) {}
            });
        }
    });
    let repo = DockerRepo::connect_with_socket(path.to_str().unwrap()).unwrap();
    (dir, Arc::new(repo))
}

/// Writes a fake /proc tree. Files given as `None` are left out.
pub fn fake_proc(
    uptime: Option<&str>,
    loadavg: Option<&str>,
    meminfo: Option<&str>,
    tcp: Option<&str>,
) -> (tempfile::TempDir, HostRepo) {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, content: Option<&str>| {
        if let Some(c) = content {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, c).unwrap();
        }
    };
    write("uptime", uptime);
    write("loadavg", loadavg);
    write("meminfo", meminfo);
    write("net/tcp", tcp);
    let repo = HostRepo::with_proc_root(dir.path());
    (dir, repo)
}
