//! # Command Execution Module / 命令执行模块
//!
//! Subprocess primitives shared by every stage. The working directory is
//! always an explicit argument; nothing here touches the process-wide current
//! directory.
//!
//! 所有阶段共享的子进程原语。工作目录始终是显式参数；
//! 这里不会修改进程级别的当前目录。

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

/// What a finished (or abandoned) subprocess left behind.
/// 已完成（或被放弃）的子进程留下的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the process was killed by a signal or timed out.
    /// 退出码；如果进程被信号终止或超时，则为 `None`。
    pub return_code: Option<i32>,
    /// Combined stdout and stderr.
    /// 合并的 stdout 和 stderr。
    pub output: String,
    /// Wall-clock time between spawn and exit.
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.return_code == Some(0)
    }
}

/// Runs `argv` with `working_dir` as its working directory and waits for it.
///
/// # Arguments
/// * `argv` - Program followed by its arguments
/// * `working_dir` - Directory the child runs in
/// * `timeout` - Optional limit; the child is killed when it is exceeded
///
/// # Returns
/// The outcome of the process. A nonzero exit is a normal outcome, not an
/// error; errors are reserved for an empty `argv` or a failed spawn.
///
/// 以 `working_dir` 作为工作目录运行 `argv` 并等待其结束。
/// 非零退出是正常结果而不是错误；错误仅用于空 `argv` 或派生失败。
pub async fn execute_cmd(
    argv: &[String],
    working_dir: &Path,
    timeout: Option<Duration>,
) -> Result<CommandOutcome> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("Cannot execute an empty command"))?;

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).current_dir(working_dir).kill_on_drop(true);

    let start = Instant::now();
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));
    let capture = capture_into(cmd, Arc::clone(&output));

    let (status_res, timed_out) = match timeout {
        Some(limit) => match tokio::time::timeout(limit, capture).await {
            Ok(status) => (status, false),
            // dropping the capture future drops the child, which kills it
            Err(_) => (Ok(None), true),
        },
        None => (capture.await, false),
    };
    let duration = start.elapsed();

    let mut output = output.lock().await.clone();
    if let Some(limit) = timeout.filter(|_| timed_out) {
        output.push_str(&format!(
            "process exceeded the timeout of {:.1}s and was killed\n",
            limit.as_secs_f64()
        ));
    }

    let return_code = status_res.with_context(|| {
        format!("Failed to execute `{}` in {}", display_command(argv), working_dir.display())
    })?;

    Ok(CommandOutcome {
        return_code,
        output,
        duration,
        timed_out,
    })
}

/// Spawns a command and captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Returns
/// A tuple containing:
/// - The exit code of the process (`None` when killed by a signal), wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    cmd: tokio::process::Command,
) -> (std::io::Result<Option<i32>>, String) {
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));
    let status = capture_into(cmd, Arc::clone(&output)).await;
    let captured = output.lock().await.clone();
    (status, captured)
}

/// Spawns `cmd` and appends its output, line by line, to `output`.
/// Lines already appended stay there if the returned future is dropped early.
///
/// 派生 `cmd` 并将其输出逐行追加到 `output`。如果返回的 future 被提前丢弃，
/// 已追加的行仍会保留。
async fn capture_into(
    mut cmd: tokio::process::Command,
    output: Arc<tokio::sync::Mutex<String>>,
) -> std::io::Result<Option<i32>> {
    let mut child = cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(std::io::Error::other("failed to capture child output"));
    };

    // 使用 Arc<Mutex<String>> 来允许多个任务（stdout 和 stderr）并发写入。
    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    // 等待 stdout 和 stderr 读取任务完成，以确保所有输出都被捕获。
    let _ = stdout_handle.await;
    let _ = stderr_handle.await;

    status.map(|s| s.code())
}

/// Shell-quoted rendering of a command line, for logs and reports.
/// 命令行的 shell 引用形式，用于日志和报告。
pub fn display_command(argv: &[String]) -> String {
    shlex::try_join(argv.iter().map(String::as_str)).unwrap_or_else(|_| argv.join(" "))
}
