//! Scan engine - concurrent probe orchestration.
//!
//! Spawns one probe task per port, optionally gated by a concurrency
//! bound, and delivers results over a single-consumer channel in
//! completion order. The channel closing only after every probe task has
//! finished and released its socket is the scan's join barrier.

use crate::error::{ScanError, ScanResult};
use crate::probe::{create_prober, ProbeResult, Prober};
use crate::types::ResolvedTarget;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Results buffered between probe tasks and the consumer.
const RESULT_BUFFER: usize = 1024;

/// Tuning knobs for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Per-probe connect timeout.
    pub timeout: Duration,
    /// Maximum probes holding sockets at once; `None` means unbounded
    /// fan-out, one task per port with no gate.
    pub max_concurrency: Option<usize>,
    /// Optional whole-scan deadline; on expiry the remaining probes
    /// report inconclusive rather than closed.
    pub deadline: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrency: None,
            deadline: None,
        }
    }
}

/// A scan in flight: the results stream plus its join barrier.
///
/// Results arrive in completion order, exactly one per port in the
/// scanned range. Receiving `None` means every probe has finished.
/// Sessions are not restartable. Also usable as a [`Stream`] for
/// combinator-based consumers.
pub struct ScanSession {
    results: mpsc::Receiver<ProbeResult>,
    supervisor: tokio::task::JoinHandle<ScanResult<()>>,
    cancel: CancellationToken,
}

impl ScanSession {
    /// Receive the next completed probe result.
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.results.recv().await
    }

    /// Abort outstanding probes. Pending and in-flight ports resolve to
    /// inconclusive within one probe timeout; their sockets are dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for every probe task to finish.
    ///
    /// Surfaces the single fatal error if the scan was invalidated as a
    /// whole (resource exhaustion). Unconsumed results are discarded.
    pub async fn join(mut self) -> ScanResult<()> {
        self.results.close();
        while self.results.recv().await.is_some() {}
        self.supervisor
            .await
            .map_err(|e| ScanError::Io(std::io::Error::other(e)))?
    }
}

impl Stream for ScanSession {
    type Item = ProbeResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().results.poll_recv(cx)
    }
}

/// Orchestrates concurrent probes against one resolved target.
pub struct ScanEngine {
    options: ScanOptions,
}

impl ScanEngine {
    /// Create an engine with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Start scanning every port in the target's range.
    ///
    /// All probe tasks are spawned up front; the optional concurrency
    /// bound gates how many hold sockets at a time. Cancelling `cancel`
    /// (or hitting the deadline) resolves the remaining ports to
    /// inconclusive while keeping the join barrier intact.
    pub fn scan(&self, target: &ResolvedTarget, cancel: CancellationToken) -> ScanSession {
        let prober = create_prober(target.transport, target.ip, self.options.timeout);
        self.scan_with(prober, target, cancel)
    }

    /// As [`scan`](Self::scan), with a caller-supplied prober.
    pub fn scan_with(
        &self,
        prober: Arc<dyn Prober>,
        target: &ResolvedTarget,
        cancel: CancellationToken,
    ) -> ScanSession {
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let scan_cancel = cancel.child_token();
        let semaphore = self
            .options
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        let ports = target.ports;
        let transport = target.transport;

        info!(
            scan = %target, ports = ports.len(),
            concurrency = ?self.options.max_concurrency, "starting scan"
        );

        if let Some(deadline) = self.options.deadline {
            let timer_cancel = scan_cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(deadline) => {
                        warn!(?deadline, "scan deadline reached, cancelling remaining probes");
                        timer_cancel.cancel();
                    }
                    _ = timer_cancel.cancelled() => {}
                }
            });
        }

        let supervisor_cancel = scan_cancel.clone();
        let supervisor = tokio::spawn(async move {
            let started = Instant::now();
            let mut tasks = JoinSet::new();

            for port in ports.iter() {
                let prober = Arc::clone(&prober);
                let tx = tx.clone();
                let semaphore = semaphore.clone();
                let cancel = supervisor_cancel.clone();

                tasks.spawn(async move {
                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            Ok(ProbeResult::inconclusive(port, transport))
                        }
                        r = async {
                            // Held for the duration of the probe
                            let _permit = match semaphore.as_deref() {
                                Some(s) => Some(s.acquire().await.unwrap()),
                                None => None,
                            };
                            prober.probe(port).await
                        } => r,
                    };

                    let result = outcome?;
                    tracing::trace!(port = %result.port, state = %result.state, "probe finished");
                    let _ = tx.send(result).await;
                    Ok::<(), ScanError>(())
                });
            }
            drop(tx);
            debug!(tasks = ports.len(), "probe fan-out complete");

            let mut fatal: Option<ScanError> = None;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        // First fatal error wins; cancel the rest once
                        if fatal.is_none() {
                            warn!(error = %e, "aborting scan");
                            supervisor_cancel.cancel();
                            fatal = Some(e);
                        }
                    }
                    Err(e) if e.is_panic() => {
                        if fatal.is_none() {
                            supervisor_cancel.cancel();
                            fatal = Some(ScanError::Io(std::io::Error::other(format!(
                                "probe task panicked: {e}"
                            ))));
                        }
                    }
                    Err(_) => {}
                }
            }

            // Reap the deadline timer, if any
            supervisor_cancel.cancel();

            match fatal {
                Some(e) => Err(e),
                None => {
                    info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "scan complete"
                    );
                    Ok(())
                }
            }
        });

        ScanSession {
            results: rx,
            supervisor,
            cancel: scan_cancel,
        }
    }

    /// Run a scan to completion, collecting every result.
    pub async fn scan_collect(
        &self,
        target: &ResolvedTarget,
        cancel: CancellationToken,
    ) -> ScanResult<Vec<ProbeResult>> {
        let mut session = self.scan(target, cancel);
        let mut results = Vec::with_capacity(target.ports.len());
        while let Some(result) = session.recv().await {
            results.push(result);
        }
        session.join().await?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{PortState, Prober};
    use crate::types::{Port, PortRange, Target, Transport};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::IpAddr;
    use tokio::net::TcpListener;

    async fn resolved(host: &str, transport: Transport, ports: PortRange) -> ResolvedTarget {
        Target::new(host, transport, ports)
            .unwrap()
            .resolve()
            .await
            .unwrap()
    }

    fn range(start: u16, end: u16) -> PortRange {
        PortRange::new(Port::new(start).unwrap(), Port::new(end).unwrap()).unwrap()
    }

    fn engine(options: ScanOptions) -> ScanEngine {
        ScanEngine::new(options)
    }

    fn quick_options() -> ScanOptions {
        ScanOptions {
            timeout: Duration::from_millis(500),
            ..ScanOptions::default()
        }
    }

    /// A prober that never finishes within a test's patience.
    struct StallProber {
        target: IpAddr,
    }

    #[async_trait]
    impl Prober for StallProber {
        fn transport(&self) -> Transport {
            Transport::Tcp
        }

        fn target(&self) -> IpAddr {
            self.target
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(10)
        }

        async fn probe(&self, port: Port) -> ScanResult<ProbeResult> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ProbeResult::open(port, Transport::Tcp))
        }
    }

    #[tokio::test]
    async fn test_one_result_per_port() {
        // Closed ports answer immediately on loopback, so a wide range is cheap
        let target = resolved("127.0.0.1", Transport::Tcp, range(40200, 40263)).await;
        let results = engine(quick_options())
            .scan_collect(&target, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 64);
        let unique: HashSet<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(unique.len(), 64, "no duplicate ports");
    }

    #[tokio::test]
    async fn test_listener_is_reported_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let target = resolved("127.0.0.1", Transport::Tcp, range(port, port)).await;
        let results = engine(quick_options())
            .scan_collect(&target, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, PortState::Open);
    }

    #[tokio::test]
    async fn test_bounded_and_unbounded_agree() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let ports = range(port.saturating_sub(4), port.saturating_add(4));
        let target = resolved("127.0.0.1", Transport::Tcp, ports).await;

        let unbounded = engine(quick_options())
            .scan_collect(&target, CancellationToken::new())
            .await
            .unwrap();
        let bounded = engine(ScanOptions {
            max_concurrency: Some(1),
            ..quick_options()
        })
        .scan_collect(&target, CancellationToken::new())
        .await
        .unwrap();

        let open_set = |rs: &[ProbeResult]| -> HashSet<u16> {
            rs.iter()
                .filter(|r| r.is_open())
                .map(|r| r.port.as_u16())
                .collect()
        };
        assert!(open_set(&unbounded).contains(&port));
        assert_eq!(open_set(&unbounded), open_set(&bounded));
        assert_eq!(bounded.len(), unbounded.len());
    }

    #[tokio::test]
    async fn test_cancellation_unblocks_join() {
        let target = resolved("127.0.0.1", Transport::Tcp, range(41000, 41099)).await;
        let cancel = CancellationToken::new();
        let prober = Arc::new(StallProber {
            target: target.ip,
        });

        let mut session =
            engine(ScanOptions::default()).scan_with(prober, &target, cancel.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let mut results = Vec::new();
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            while let Some(r) = session.recv().await {
                results.push(r);
            }
        })
        .await
        .expect("cancelled scan must unblock promptly");
        session.join().await.unwrap();

        assert_eq!(results.len(), 100);
        assert!(results.iter().all(|r| r.state == PortState::Inconclusive));
    }

    #[tokio::test]
    async fn test_deadline_marks_remaining_inconclusive() {
        let target = resolved("127.0.0.1", Transport::Tcp, range(41200, 41209)).await;
        let prober = Arc::new(StallProber {
            target: target.ip,
        });
        let options = ScanOptions {
            deadline: Some(Duration::from_millis(100)),
            ..ScanOptions::default()
        };

        let mut session =
            engine(options).scan_with(prober, &target, CancellationToken::new());

        let mut results = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(r) = session.recv().await {
                results.push(r);
            }
        })
        .await
        .expect("deadline must cut the scan short");
        session.join().await.unwrap();

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.state == PortState::Inconclusive));
    }

    #[tokio::test]
    async fn test_session_streams_results() {
        use futures::StreamExt;

        let target = resolved("127.0.0.1", Transport::Tcp, range(40100, 40115)).await;
        let session = engine(quick_options()).scan(&target, CancellationToken::new());

        // Stream exhaustion doubles as the join barrier
        let results: Vec<ProbeResult> = session.collect().await;
        assert_eq!(results.len(), 16);
    }

    #[tokio::test]
    async fn test_completion_order_not_required_to_be_port_order() {
        // Sanity check on the collection path rather than ordering itself:
        // sorting the unordered results yields the full range
        let target = resolved("127.0.0.1", Transport::Tcp, range(42000, 42031)).await;
        let mut results = engine(quick_options())
            .scan_collect(&target, CancellationToken::new())
            .await
            .unwrap();

        results.sort_by_key(|r| r.port);
        let ports: Vec<u16> = results.iter().map(|r| r.port.as_u16()).collect();
        let expected: Vec<u16> = (42000..=42031).collect();
        assert_eq!(ports, expected);
    }
}
