//! Engine process session
//!
//! Spawns a UCI engine as a subprocess and talks to it over stdin/stdout.
//! A single driver task owns both pipes. Callers submit queries through a
//! channel; each query is tagged with a [`QueryId`] and parked in an ordered
//! table until the engine is free. The driver runs one query at a time and
//! hands every terminal line (`bestmove`, an evaluation) to the query that is
//! currently active, so concurrent callers never see each other's answers.

use std::collections::BTreeMap;
use std::fmt;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command as ProcessCommand};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, error, info, trace, warn};

use super::analysis::BestMove;
use super::protocol::{Command, EngineLine, PositionSpec};
use crate::error::{Error, Result};

/// How `evaluate` obtains a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// The `eval` command; the score is from white's side
    Static,
    /// A fixed-depth search; the last reported `score` is used, which is
    /// relative to the side to move
    Search { depth: u8 },
}

impl EvalMode {
    /// Whether scores come from the side to move's point of view
    pub fn is_relative(self) -> bool {
        matches!(self, EvalMode::Search { .. })
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine binary, or a bare name looked up in `PATH`
    pub path: String,
    /// Depth for best-move searches
    pub search_depth: u8,
    pub eval_mode: EvalMode,
    /// Upper bound for the handshake and for each query; `None` waits forever
    pub query_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Settings used by the relay server: depth 15 and static `eval`
    pub fn relay() -> Self {
        Self {
            path: "stockfish".to_string(),
            search_depth: 15,
            eval_mode: EvalMode::Static,
            query_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Settings used by the board client: depth 10 for moves and scores
    pub fn client() -> Self {
        Self {
            path: "stockfish".to_string(),
            search_depth: 10,
            eval_mode: EvalMode::Search { depth: 10 },
            query_timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_search_depth(mut self, depth: u8) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.query_timeout = limit;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::relay()
    }
}

/// Tag attached to every query sent through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryId(u64);

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum Query {
    BestMove { position: PositionSpec, depth: u8 },
    Evaluate { position: PositionSpec, mode: EvalMode },
}

#[derive(Debug)]
enum Reply {
    BestMove(BestMove),
    Evaluation(f32),
}

enum Message {
    Query {
        id: QueryId,
        query: Query,
        reply: oneshot::Sender<Result<Reply>>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running engine.
///
/// Dropping the handle stops the driver, which sends `quit` and reaps the
/// process; [`EngineSession::shutdown`] does the same and waits for it.
pub struct EngineSession {
    config: EngineConfig,
    requests: mpsc::Sender<Message>,
    next_id: AtomicU64,
    driver: JoinHandle<()>,
}

impl EngineSession {
    /// Starts the engine binary named in `config` and completes the
    /// `uci`/`isready` handshake.
    pub async fn spawn(config: EngineConfig) -> Result<Self> {
        let mut child = ProcessCommand::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::EngineUnavailable(format!("failed to start {}: {}", config.path, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::EngineUnavailable("failed to open engine stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::EngineUnavailable("failed to open engine stdout".into()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        info!(path = %config.path, pid = ?child.id(), "engine process started");
        Self::start(stdout, stdin, Some(child), config).await
    }

    /// Runs a session over arbitrary pipes instead of a child process
    pub async fn from_io<R, W>(reader: R, writer: W, config: EngineConfig) -> Result<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start(reader, writer, None, config).await
    }

    async fn start<R, W>(reader: R, mut writer: W, child: Option<Child>, config: EngineConfig) -> Result<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = BufReader::new(reader).lines();

        match config.query_timeout {
            Some(limit) => timeout(limit, handshake(&mut lines, &mut writer))
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => handshake(&mut lines, &mut writer).await?,
        }
        info!("engine ready");

        let (requests, inbox) = mpsc::channel(32);
        let driver = Driver {
            lines,
            writer,
            child,
            inbox,
            pending: BTreeMap::new(),
            active: None,
            query_timeout: config.query_timeout,
        };

        Ok(Self {
            config,
            requests,
            next_id: AtomicU64::new(1),
            driver: tokio::spawn(driver.run()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Best move for a position, searched to the configured depth.
    ///
    /// An engine answer of `bestmove (none)` is reported as
    /// [`Error::NoValidMove`].
    pub async fn best_move(&self, position: &PositionSpec) -> Result<BestMove> {
        let query = Query::BestMove {
            position: position.clone(),
            depth: self.config.search_depth,
        };
        match self.request(query).await? {
            Reply::BestMove(best) => Ok(best),
            other => Err(Error::Protocol(format!("expected a move, got {:?}", other))),
        }
    }

    /// Evaluation of a position in pawn units, obtained per the configured
    /// [`EvalMode`]
    pub async fn evaluate(&self, position: &PositionSpec) -> Result<f32> {
        let query = Query::Evaluate {
            position: position.clone(),
            mode: self.config.eval_mode,
        };
        match self.request(query).await? {
            Reply::Evaluation(score) => Ok(score),
            other => Err(Error::Protocol(format!("expected an evaluation, got {:?}", other))),
        }
    }

    async fn request(&self, query: Query) -> Result<Reply> {
        let id = QueryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply, answer) = oneshot::channel();

        self.requests
            .send(Message::Query { id, query, reply })
            .await
            .map_err(|_| Error::EngineUnavailable("engine session has stopped".into()))?;

        let answer = match self.config.query_timeout {
            Some(limit) => timeout(limit, answer).await.map_err(|_| {
                warn!(%id, ?limit, "engine query timed out");
                Error::Timeout(limit)
            })?,
            None => answer.await,
        };

        answer.map_err(|_| Error::EngineUnavailable("engine session dropped the query".into()))?
    }

    /// Sends `quit`, waits for the engine to exit and stops the driver
    pub async fn shutdown(self) {
        let (done, finished) = oneshot::channel();
        if self.requests.send(Message::Shutdown(done)).await.is_ok() {
            let _ = finished.await;
        }
        let _ = self.driver.await;
    }
}

async fn handshake<R, W>(lines: &mut Lines<BufReader<R>>, writer: &mut W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send(writer, Command::Uci).await?;
    send(writer, Command::IsReady).await?;

    loop {
        let Some(line) = lines.next_line().await? else {
            return Err(Error::EngineUnavailable("engine closed its output during handshake".into()));
        };
        match EngineLine::parse(&line) {
            EngineLine::ReadyOk => return Ok(()),
            other => trace!(?other, "handshake output"),
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, command: Command<'_>) -> Result<()> {
    debug!(%command, "to engine");
    writer.write_all(format!("{}\n", command).as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(target: "engine_stderr", "{}", line);
    }
}

/// Terminal line the active query is waiting for
#[derive(Debug, Clone, Copy)]
enum Expect {
    BestMove,
    StaticEval,
    SearchEval,
}

struct Pending {
    query: Query,
    reply: oneshot::Sender<Result<Reply>>,
}

struct Active {
    id: QueryId,
    expect: Expect,
    deadline: Option<Instant>,
    /// Latest score seen for an evaluation, in pawns
    score: Option<f32>,
    stop_sent: bool,
}

struct Driver<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
    child: Option<Child>,
    inbox: mpsc::Receiver<Message>,
    /// Correlation table, ordered by submission
    pending: BTreeMap<QueryId, Pending>,
    active: Option<Active>,
    query_timeout: Option<Duration>,
}

impl<R, W> Driver<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn run(mut self) {
        loop {
            let deadline = self.active.as_ref().and_then(|a| a.deadline);

            let step = tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(Message::Query { id, query, reply }) => {
                        debug!(%id, ?query, "engine query queued");
                        self.prune_abandoned();
                        self.pending.insert(id, Pending { query, reply });
                        self.start_next().await
                    }
                    Some(Message::Shutdown(done)) => {
                        self.quit().await;
                        let _ = done.send(());
                        return;
                    }
                    None => {
                        self.quit().await;
                        return;
                    }
                },
                line = self.lines.next_line() => match line {
                    Ok(Some(line)) => self.handle_line(&line).await,
                    Ok(None) => {
                        self.engine_stopped("engine closed its output").await;
                        return;
                    }
                    Err(e) => {
                        self.engine_stopped(&format!("failed to read engine output: {}", e)).await;
                        return;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.prune_abandoned();
                    self.deadline_passed().await
                }
            };

            if let Err(e) = step {
                self.engine_stopped(&format!("failed to write to engine: {}", e)).await;
                return;
            }
        }
    }

    /// Starts the oldest queued query if the engine is idle
    async fn start_next(&mut self) -> Result<()> {
        while self.active.is_none() {
            let Some((&id, pending)) = self.pending.iter().next() else {
                return Ok(());
            };

            if pending.reply.is_closed() {
                debug!(%id, "skipping query abandoned before it started");
                self.pending.remove(&id);
                continue;
            }

            let (position, compute, expect) = match &pending.query {
                Query::BestMove { position, depth } => (position, Command::GoDepth(*depth), Expect::BestMove),
                Query::Evaluate {
                    position,
                    mode: EvalMode::Static,
                } => (position, Command::Eval, Expect::StaticEval),
                Query::Evaluate {
                    position,
                    mode: EvalMode::Search { depth },
                } => (position, Command::GoDepth(*depth), Expect::SearchEval),
            };

            send(&mut self.writer, Command::Position(position)).await?;
            send(&mut self.writer, compute).await?;
            // `eval` has no terminal line of its own; `readyok` marks the end
            // of its output whether or not an evaluation was printed
            if matches!(expect, Expect::StaticEval) {
                send(&mut self.writer, Command::IsReady).await?;
            }

            self.active = Some(Active {
                id,
                expect,
                deadline: self.query_timeout.map(|limit| Instant::now() + limit),
                score: None,
                stop_sent: false,
            });
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<()> {
        let parsed = EngineLine::parse(line);

        let Some(active) = self.active.as_mut() else {
            trace!(line, "engine output with no query in flight");
            return Ok(());
        };

        let outcome = match (active.expect, parsed) {
            (Expect::BestMove, line @ EngineLine::BestMove { .. }) => Some(
                line.into_best_move()
                    .map(Reply::BestMove)
                    .ok_or_else(|| Error::NoValidMove("engine answered (none)".into())),
            ),
            (Expect::StaticEval, EngineLine::Evaluation(score)) => {
                active.score = Some(score);
                None
            }
            (Expect::StaticEval, EngineLine::ReadyOk) => Some(
                active
                    .score
                    .map(Reply::Evaluation)
                    .ok_or_else(|| Error::Protocol("engine printed no evaluation for this position".into())),
            ),
            (Expect::SearchEval, EngineLine::Info(info)) => {
                if let Some(score) = info.score {
                    active.score = Some(score.as_pawns());
                }
                None
            }
            (Expect::SearchEval, EngineLine::BestMove { .. }) => Some(
                active
                    .score
                    .map(Reply::Evaluation)
                    .ok_or_else(|| Error::Protocol("search finished without a score".into())),
            ),
            (_, EngineLine::Info(info)) => {
                trace!(id = %active.id, depth = ?info.depth, score = ?info.score, "search progress");
                None
            }
            (_, other) => {
                trace!(id = %active.id, ?other, "ignoring engine output");
                None
            }
        };

        if let Some(result) = outcome {
            self.finish(result);
            self.start_next().await?;
        }
        Ok(())
    }

    fn finish(&mut self, result: Result<Reply>) {
        let Some(active) = self.active.take() else {
            return;
        };
        if let Some(pending) = self.pending.remove(&active.id) {
            if pending.reply.send(result).is_err() {
                debug!(id = %active.id, "answer arrived after the caller gave up");
            } else {
                debug!(id = %active.id, "engine query answered");
            }
        }
    }

    /// The active query ran past its limit. A running search is told to stop
    /// so the engine emits its `bestmove`; a static evaluation already ends
    /// with the `readyok` queued behind it. Either way the query stays active
    /// until that line arrives so it cannot be handed to the next caller.
    async fn deadline_passed(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        active.deadline = None;
        warn!(id = %active.id, "engine query exceeded its time limit");

        if matches!(active.expect, Expect::BestMove | Expect::SearchEval) && !active.stop_sent {
            active.stop_sent = true;
            send(&mut self.writer, Command::Stop).await?;
        }
        Ok(())
    }

    async fn engine_stopped(&mut self, reason: &str) {
        error!(reason, "engine stopped responding");
        if let Some(mut child) = self.child.take() {
            match timeout(Duration::from_secs(1), child.wait()).await {
                Ok(Ok(status)) => info!(%status, "engine process exited"),
                Ok(Err(e)) => warn!(error = %e, "could not read engine exit status"),
                Err(_) => {
                    warn!("engine process still running, killing it");
                    let _ = child.kill().await;
                }
            }
        }
        self.fail_all(reason);
    }

    async fn quit(&mut self) {
        let _ = send(&mut self.writer, Command::Quit).await;
        self.fail_all("engine session shut down");

        if let Some(mut child) = self.child.take() {
            match timeout(Duration::from_millis(500), child.wait()).await {
                Ok(Ok(status)) => info!(%status, "engine process exited"),
                _ => {
                    warn!("engine did not exit after quit, killing it");
                    let _ = child.kill().await;
                }
            }
        }
    }

    /// Drops queued queries whose callers gave up. The active query is kept
    /// so its late output is still consumed.
    fn prune_abandoned(&mut self) {
        let active = self.active.as_ref().map(|a| a.id);
        let before = self.pending.len();
        self.pending
            .retain(|id, pending| Some(*id) == active || !pending.reply.is_closed());

        let dropped = before - self.pending.len();
        if dropped > 0 {
            debug!(dropped, "dropped abandoned engine queries");
        }
    }

    fn fail_all(&mut self, reason: &str) {
        self.active = None;
        for (id, pending) in std::mem::take(&mut self.pending) {
            debug!(%id, reason, "failing pending engine query");
            let _ = pending.reply.send(Err(Error::EngineUnavailable(reason.to_string())));
        }
    }
}
