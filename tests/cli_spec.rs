use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use speculate2::speculate;

fn spawn_daemon(dir: &std::path::Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_pjsync"))
        .arg("--dir")
        .arg(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn pjsync")
}

fn wait_for_exit(child: &mut Child, timeout: Duration) -> std::process::ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().expect("Failed to poll child") {
            return status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("pjsync did not exit within {:?}", timeout);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
    }

    describe "process lifecycle" {
        it "exits with code 0 when stdin reaches EOF" {
            let mut child = spawn_daemon(dir.path());
            // Give the daemon time to register its watches, then close stdin.
            std::thread::sleep(Duration::from_millis(500));
            drop(child.stdin.take());

            let status = wait_for_exit(&mut child, Duration::from_secs(10));
            assert_eq!(status.code(), Some(0));
        }

        it "exits with code 0 on console input" {
            let mut child = spawn_daemon(dir.path());
            std::thread::sleep(Duration::from_millis(500));
            child
                .stdin
                .as_mut()
                .expect("No stdin handle")
                .write_all(b"q")
                .expect("Write failed");

            let status = wait_for_exit(&mut child, Duration::from_secs(10));
            assert_eq!(status.code(), Some(0));
        }

        it "treats the first interrupt as a graceful shutdown request" {
            let mut child = spawn_daemon(dir.path());
            std::thread::sleep(Duration::from_secs(1));

            let killed = Command::new("kill")
                .arg("-INT")
                .arg(child.id().to_string())
                .status()
                .expect("Failed to run kill");
            assert!(killed.success());

            let status = wait_for_exit(&mut child, Duration::from_secs(10));
            assert_eq!(status.code(), Some(0));

            let mut stdout = String::new();
            child
                .stdout
                .take()
                .expect("No stdout handle")
                .read_to_string(&mut stdout)
                .expect("Read failed");
            assert!(
                stdout.contains("shutdown requested"),
                "stdout was: {stdout}"
            );
        }
    }
}
