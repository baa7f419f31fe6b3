//! ProcessRunner - 1 ジョブ分のサブプロセス実行と出力キャプチャ
//!
//! # フロー
//! 1. argv をそのまま渡して spawn（shell は通さない、stdin は null）
//! 2. queued → running
//! 3. stdout / stderr は同じ pipe の書き込み端を共有する（OS レベルで合流、
//!    書き込み順のまま）。その読み取り端から 1 行ずつ output に追記
//! 4. exit code 0 → completed、それ以外 → failed
//!
//! spawn に失敗した場合は running を経由せずに failed にする。
//! 起動後に読み取りで失敗した場合は子プロセスを kill して wait してから failed。

use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};

use crate::domain::{Job, TaskId, TaskRecord, TaskStatus, VolleyError};
use crate::ports::{Clock, TaskStore};

pub struct ProcessRunner {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        working_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            clock,
            working_dir,
        }
    }

    /// Run `job` to completion and return the terminal status it was given.
    ///
    /// Execution failures are recorded on the task and are not errors here.
    /// `Err` means the task record itself could not be updated (unknown id,
    /// or a record that already left `queued`).
    pub async fn run(&self, job: &Job) -> Result<TaskStatus, VolleyError> {
        let id = job.task_id;
        tracing::info!(task_id = %id, handler = %job.handler, argv = ?job.argv, "running command");

        let (mut child, output) = match self.spawn(job) {
            Ok(spawned) => spawned,
            Err(source) => {
                let err = VolleyError::ProcessLaunch {
                    program: job.program().to_string(),
                    source,
                };
                tracing::warn!(task_id = %id, error = %err, "launch failed");
                self.fail(id, &err).await?;
                return Ok(TaskStatus::Failed);
            }
        };

        let now = self.clock.now();
        if let Err(err) = self
            .store
            .update(id, Box::new(move |r: &mut TaskRecord| r.mark_running(now)))
            .await
        {
            terminate(&mut child).await;
            return Err(err);
        }

        let exit = match self.capture(job, output).await {
            Ok(()) => child.wait().await.map_err(VolleyError::Streaming),
            Err(err) => Err(err),
        };

        match exit {
            Ok(status) if status.success() => {
                let now = self.clock.now();
                self.store
                    .update(id, Box::new(move |r: &mut TaskRecord| r.mark_completed(now)))
                    .await?;
                tracing::info!(task_id = %id, "task completed");
                Ok(TaskStatus::Completed)
            }
            Ok(status) => {
                let err = VolleyError::ProcessExecution {
                    code: status.code(),
                };
                tracing::warn!(task_id = %id, exit_code = ?status.code(), "task failed");
                self.fail(id, &err).await?;
                Ok(TaskStatus::Failed)
            }
            Err(err) => {
                tracing::error!(task_id = %id, error = %err, "killing child after fault");
                terminate(&mut child).await;
                self.fail(id, &err).await?;
                Ok(TaskStatus::Failed)
            }
        }
    }

    /// Spawn the child with stdout and stderr both pointing at one pipe.
    fn spawn(&self, job: &Job) -> std::io::Result<(Child, pipe::Receiver)> {
        let (reader, writer) = std::io::pipe()?;

        let mut command = Command::new(job.program());
        command
            .args(job.args())
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        let child = command.spawn()?;
        // the parent's write ends live in `command`; EOF needs them closed
        drop(command);

        let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
        Ok((child, output))
    }

    /// Append every line of the merged output, in write order.
    async fn capture(&self, job: &Job, output: pipe::Receiver) -> Result<(), VolleyError> {
        let mut reader = BufReader::new(output);
        let mut buf = Vec::new();

        while let Some(line) = next_line(&mut reader, &mut buf)
            .await
            .map_err(VolleyError::Streaming)?
        {
            self.append(job, line).await?;
        }
        Ok(())
    }

    async fn append(&self, job: &Job, line: String) -> Result<(), VolleyError> {
        tracing::debug!(task_id = %job.task_id, handler = %job.handler, "{line}");
        let now = self.clock.now();
        self.store
            .update(
                job.task_id,
                Box::new(move |r: &mut TaskRecord| r.append_output(&line, now)),
            )
            .await?;
        Ok(())
    }

    async fn fail(&self, id: TaskId, err: &VolleyError) -> Result<(), VolleyError> {
        fail_task(self.store.as_ref(), self.clock.as_ref(), id, err.to_string()).await
    }

    pub(crate) fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

pub(crate) async fn fail_task(
    store: &dyn TaskStore,
    clock: &dyn Clock,
    id: TaskId,
    reason: String,
) -> Result<(), VolleyError> {
    let now = clock.now();
    store
        .update(id, Box::new(move |r: &mut TaskRecord| r.mark_failed(reason, now)))
        .await?;
    Ok(())
}

/// Next line without its terminator, or `None` at end of stream.
/// A final line without a trailing newline is still returned.
async fn next_line<R>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    reader.read_until(b'\n', buf).await?;
    if buf.is_empty() {
        return Ok(None);
    }

    let mut end = buf.len();
    if buf[..end].ends_with(b"\n") {
        end -= 1;
    }
    if buf[..end].ends_with(b"\r") {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    Ok(Some(line))
}

/// Kill and reap. Errors are ignored: the child may already be gone.
async fn terminate(child: &mut Child) {
    if let Err(err) = child.kill().await {
        tracing::debug!(error = %err, "kill after fault failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::status::StatusCounts;
    use crate::domain::HandlerKind;
    use crate::impls::InMemoryTaskStore;
    use crate::ports::{Mutator, SystemClock, UlidGenerator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// In-memory store whose `nth` update (1-based) fails without applying.
    struct FaultyStore {
        inner: InMemoryTaskStore,
        updates: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl TaskStore for FaultyStore {
        async fn create(&self, handler: HandlerKind, command: Vec<String>) -> TaskId {
            self.inner.create(handler, command).await
        }

        async fn get(&self, id: TaskId) -> Option<TaskRecord> {
            self.inner.get(id).await
        }

        async fn update(&self, id: TaskId, mutator: Mutator) -> Result<TaskRecord, VolleyError> {
            if self.updates.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(VolleyError::Streaming(std::io::Error::other(
                    "store unavailable",
                )));
            }
            self.inner.update(id, mutator).await
        }

        async fn counts_by_status(&self) -> StatusCounts {
            self.inner.counts_by_status().await
        }

        async fn len(&self) -> usize {
            self.inner.len().await
        }
    }

    fn runner() -> ProcessRunner {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new(
            Arc::new(UlidGenerator::new(clock.clone())),
            clock.clone(),
        ));
        ProcessRunner::new(store, clock, None)
    }

    async fn job(runner: &ProcessRunner, argv: &[&str]) -> Job {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let id = runner.store().create(HandlerKind::F403, argv.clone()).await;
        Job::new(id, HandlerKind::F403, argv)
    }

    #[tokio::test]
    async fn zero_exit_completes_with_captured_lines() {
        let runner = runner();
        let job = job(&runner, &["sh", "-c", "echo one; echo two"]).await;

        let status = runner.run(&job).await.unwrap();

        let record = runner.store().get(job.task_id).await.unwrap();
        assert_eq!(status, TaskStatus::Completed);
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.output, "one\ntwo\n");
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn stderr_is_merged_in_write_order() {
        let runner = runner();
        let script = "echo 1; echo 2 >&2; echo 3; echo 4 >&2; echo 5";

        for _ in 0..20 {
            let job = job(&runner, &["sh", "-c", script]).await;
            runner.run(&job).await.unwrap();

            let record = runner.store().get(job.task_id).await.unwrap();
            assert_eq!(record.output, "1\n2\n3\n4\n5\n");
        }
    }

    #[tokio::test]
    async fn unterminated_last_line_is_kept() {
        let runner = runner();
        let job = job(&runner, &["printf", "a\\nb"]).await;

        runner.run(&job).await.unwrap();

        let record = runner.store().get(job.task_id).await.unwrap();
        assert_eq!(record.output, "a\nb\n");
    }

    #[tokio::test]
    async fn non_zero_exit_fails_with_the_code() {
        let runner = runner();
        let job = job(&runner, &["sh", "-c", "echo partial; exit 3"]).await;

        let status = runner.run(&job).await.unwrap();

        let record = runner.store().get(job.task_id).await.unwrap();
        assert_eq!(status, TaskStatus::Failed);
        assert_eq!(record.output, "partial\n");
        assert_eq!(record.error.as_deref(), Some("process exited with code 3"));
    }

    #[tokio::test]
    async fn missing_binary_fails_without_running() {
        let runner = runner();
        let job = job(&runner, &["/nonexistent/volley-test-binary", "-u", "x"]).await;

        let status = runner.run(&job).await.unwrap();

        let record = runner.store().get(job.task_id).await.unwrap();
        assert_eq!(status, TaskStatus::Failed);
        assert!(record.output.is_empty());
        let error = record.error.unwrap();
        assert!(error.contains("failed to launch '/nonexistent/volley-test-binary'"));
    }

    #[tokio::test]
    async fn output_is_visible_while_running() {
        let runner = Arc::new(runner());
        let job = job(&runner, &["sh", "-c", "echo first; sleep 1; echo second"]).await;
        let id = job.task_id;

        let handle = tokio::spawn({
            let runner = Arc::clone(&runner);
            async move { runner.run(&job).await }
        });

        let mut seen_partial = false;
        for _ in 0..80 {
            let record = runner.store().get(id).await.unwrap();
            if record.status == TaskStatus::Running && record.output == "first\n" {
                seen_partial = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen_partial, "partial output was never observed");

        assert_eq!(handle.await.unwrap().unwrap(), TaskStatus::Completed);
        assert_eq!(runner.store().get(id).await.unwrap().output, "first\nsecond\n");
    }

    #[tokio::test]
    async fn unknown_task_is_an_error_and_the_child_is_reaped() {
        let runner = runner();
        let orphan = Job::new(
            TaskId::from_ulid(ulid::Ulid::new()),
            HandlerKind::F403,
            vec!["sleep".into(), "5".into()],
        );

        let started = Instant::now();
        let err = runner.run(&orphan).await.unwrap_err();

        assert!(matches!(err, VolleyError::TaskNotFound(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn append_fault_kills_the_child_and_fails_the_task() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        // update 1 is mark_running, update 2 is the first appended line
        let store: Arc<dyn TaskStore> = Arc::new(FaultyStore {
            inner: InMemoryTaskStore::new(
                Arc::new(UlidGenerator::new(clock.clone())),
                clock.clone(),
            ),
            updates: AtomicUsize::new(0),
            fail_on: 2,
        });
        let runner = ProcessRunner::new(store, clock, None);
        let job = job(&runner, &["sh", "-c", "echo x; sleep 30"]).await;

        let started = Instant::now();
        let status = runner.run(&job).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(status, TaskStatus::Failed);
        let record = runner.store().get(job.task_id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.output.is_empty());
        let error = record.error.unwrap();
        assert!(error.contains("store unavailable"), "{error}");
    }
}
