//! Certificate bootstrap client implementation.

use std::sync::Arc;
use std::time::Duration;

use certboot_core::{Address, BootstrapError, Result, TrustedCertificate};
use tracing::{debug, info};

use crate::config::{DialOptions, RetryPolicy};
use crate::context::Context;
use crate::fetcher::{CertificateFetcher, RustlsFetcher};
use crate::handle::ConnectionHandle;
use crate::observer::{BootstrapObserver, ConnectState, TracingObserver};
use crate::transport::{RustlsTransport, Transport};

/// Connects to servers whose certificate is learned on first contact.
///
/// Each [`connect`](Self::connect) call fetches the server's leaf
/// certificate (retrying while the server is not yet listening), trusts
/// only that certificate and dials the server again with it. Calls share
/// no mutable state, so one client can serve many concurrent connects.
pub struct BootstrapClient<F = RustlsFetcher, T = RustlsTransport> {
    inner: Arc<ClientInner<F, T>>,
}

struct ClientInner<F, T> {
    fetcher: F,
    transport: T,
    policy: RetryPolicy,
    observer: Arc<dyn BootstrapObserver>,
}

impl<F, T> Clone for BootstrapClient<F, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F, T> std::fmt::Debug for BootstrapClient<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapClient")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

impl BootstrapClient {
    /// Create a client with the rustls fetcher and transport and the
    /// default retry policy
    #[must_use]
    pub fn new() -> Self {
        BootstrapClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> BootstrapClientBuilder {
        BootstrapClientBuilder::new()
    }
}

impl Default for BootstrapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, T> BootstrapClient<F, T>
where
    F: CertificateFetcher,
    T: Transport,
{
    /// The retry policy applied to the fetch phase
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    /// Bootstrap trust from `host:port` and open an authenticated connection.
    ///
    /// Fails with [`BootstrapError::InvalidArgument`] before any I/O when
    /// `host` or `port` is empty, with [`BootstrapError::FetchExhausted`]
    /// when no certificate could be fetched, and with
    /// [`BootstrapError::Dial`] when the authenticated dial fails. Only the
    /// fetch phase is retried.
    pub async fn connect(
        &self,
        ctx: &Context,
        host: &str,
        port: &str,
        options: DialOptions,
    ) -> Result<ConnectionHandle<T::Connection, T::Trust>> {
        let address = Address::new(host, port)?;
        self.validate_policy()?;

        let certificate = self.fetch_certificate(ctx, &address).await?;

        self.notify(&address, ConnectState::Dialing);
        match self.dial(ctx, &address, &certificate, &options).await {
            Ok((connection, trust)) => {
                self.notify(&address, ConnectState::Connected);
                info!(
                    address = %address,
                    fingerprint = %certificate.fingerprint(),
                    "connected with bootstrapped certificate"
                );
                Ok(ConnectionHandle::new(connection, address, certificate, trust))
            }
            Err(err) => {
                self.notify(&address, terminal_state(&err, ConnectState::DialFailed));
                Err(err)
            }
        }
    }

    /// Run only the fetch phase: retry until `address` presents a
    /// certificate or the policy gives up.
    pub async fn fetch_certificate(
        &self,
        ctx: &Context,
        address: &Address,
    ) -> Result<TrustedCertificate> {
        self.validate_policy()?;

        self.notify(address, ConnectState::FetchingCertificate);
        let result = self.fetch_with_retry(ctx, address).await;
        let state = match &result {
            Ok(_) => ConnectState::CertificateFetched,
            Err(err) => terminal_state(err, ConnectState::CertificateFetchFailed),
        };
        self.notify(address, state);
        result
    }

    async fn fetch_with_retry(&self, ctx: &Context, address: &Address) -> Result<TrustedCertificate> {
        let policy = &self.inner.policy;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(address = %address, attempt, "fetching certificate");

            let err = match ctx.run(self.inner.fetcher.fetch(address)).await? {
                Ok(certificate) => {
                    self.inner
                        .observer
                        .on_certificate(address, attempt, &certificate);
                    return Ok(certificate);
                }
                Err(err) => err,
            };

            self.inner
                .observer
                .on_fetch_failed(address, attempt, policy.max_attempts, &err);

            let retry = match &err {
                BootstrapError::NoCertificate { .. } => policy.retry_on_missing_certificate,
                other => !other.is_context_error(),
            };
            if !retry {
                return Err(err);
            }
            if attempt >= policy.max_attempts {
                return Err(BootstrapError::FetchExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            ctx.sleep(policy.interval).await?;
        }
    }

    async fn dial(
        &self,
        ctx: &Context,
        address: &Address,
        certificate: &TrustedCertificate,
        options: &DialOptions,
    ) -> Result<(T::Connection, T::Trust)> {
        let transport = &self.inner.transport;
        let trust = transport.build_trust(certificate)?;
        let connection = ctx
            .run(transport.dial(address, &trust, options))
            .await?
            .map_err(|e| BootstrapError::dial(address.to_string(), e))?;
        Ok((connection, trust))
    }

    fn validate_policy(&self) -> Result<()> {
        if self.inner.policy.max_attempts == 0 {
            return Err(BootstrapError::InvalidArgument(
                "retry policy must allow at least one attempt".into(),
            ));
        }
        Ok(())
    }

    fn notify(&self, address: &Address, state: ConnectState) {
        self.inner.observer.on_state(address, state);
    }
}

fn terminal_state(err: &BootstrapError, failed: ConnectState) -> ConnectState {
    if err.is_context_error() {
        ConnectState::Cancelled
    } else {
        failed
    }
}

/// Builder for configuring a [`BootstrapClient`]
pub struct BootstrapClientBuilder<F = RustlsFetcher, T = RustlsTransport> {
    fetcher: F,
    transport: T,
    policy: RetryPolicy,
    observer: Arc<dyn BootstrapObserver>,
}

impl BootstrapClientBuilder {
    /// Create a builder with the rustls fetcher and transport
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetcher: RustlsFetcher::new(),
            transport: RustlsTransport::new(),
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl Default for BootstrapClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, T> BootstrapClientBuilder<F, T> {
    /// Replace the certificate fetcher
    #[must_use]
    pub fn fetcher<F2: CertificateFetcher>(self, fetcher: F2) -> BootstrapClientBuilder<F2, T> {
        BootstrapClientBuilder {
            fetcher,
            transport: self.transport,
            policy: self.policy,
            observer: self.observer,
        }
    }

    /// Replace the authenticated transport
    #[must_use]
    pub fn transport<T2: Transport>(self, transport: T2) -> BootstrapClientBuilder<F, T2> {
        BootstrapClientBuilder {
            fetcher: self.fetcher,
            transport,
            policy: self.policy,
            observer: self.observer,
        }
    }

    /// Set the retry policy
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the maximum number of fetch attempts
    #[must_use]
    pub const fn max_attempts(mut self, max: u32) -> Self {
        self.policy.max_attempts = max;
        self
    }

    /// Set the pause between fetch attempts
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.policy.interval = interval;
        self
    }

    /// Set the observer receiving progress events
    #[must_use]
    pub fn observer(mut self, observer: impl BootstrapObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> BootstrapClient<F, T> {
        BootstrapClient {
            inner: Arc::new(ClientInner {
                fetcher: self.fetcher,
                transport: self.transport,
                policy: self.policy,
                observer: self.observer,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Connection;
    use async_trait::async_trait;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Clone, Copy)]
    enum Failure {
        Refused,
        NoCertificate,
    }

    /// Fails `fail_first` times, then returns a certificate.
    #[derive(Clone)]
    struct ScriptedFetcher {
        fail_first: u32,
        failure: Failure,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    impl ScriptedFetcher {
        fn new(fail_first: u32, failure: Failure) -> Self {
            Self {
                fail_first,
                failure,
                calls: Arc::default(),
            }
        }

        fn attempts(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CertificateFetcher for ScriptedFetcher {
        async fn fetch(&self, address: &Address) -> Result<TrustedCertificate> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len()
            };
            if attempt as u32 <= self.fail_first {
                return Err(match self.failure {
                    Failure::Refused => BootstrapError::transport(
                        address.to_string(),
                        io::Error::new(io::ErrorKind::ConnectionRefused, format!("attempt {attempt}")),
                    ),
                    Failure::NoCertificate => BootstrapError::NoCertificate {
                        address: address.to_string(),
                    },
                });
            }
            Ok(TrustedCertificate::from_der(vec![0x30, 0x00]))
        }
    }

    #[derive(Debug)]
    struct FakeConnection {
        open: Arc<AtomicBool>,
        closes: Arc<AtomicU32>,
        fail_close: bool,
    }

    #[async_trait]
    impl Connection for FakeConnection {
        fn is_alive(&mut self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        async fn close(&mut self) -> io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.open.store(false, Ordering::SeqCst);
            if self.fail_close {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        refuse: bool,
        hang: bool,
        fail_close: bool,
        dials: Arc<AtomicU32>,
        closes: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        type Trust = String;
        type Connection = FakeConnection;

        fn build_trust(&self, certificate: &TrustedCertificate) -> Result<String> {
            Ok(certificate.fingerprint())
        }

        async fn dial(
            &self,
            _address: &Address,
            _trust: &String,
            _options: &DialOptions,
        ) -> io::Result<FakeConnection> {
            self.dials.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.refuse {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "bad certificate"));
            }
            Ok(FakeConnection {
                open: Arc::new(AtomicBool::new(true)),
                closes: self.closes.clone(),
                fail_close: self.fail_close,
            })
        }
    }

    /// Counts attempts; the handshake never completes.
    #[derive(Clone, Default)]
    struct StalledFetcher {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CertificateFetcher for StalledFetcher {
        async fn fetch(&self, _address: &Address) -> Result<TrustedCertificate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[derive(Clone, Default)]
    struct RecordingObserver {
        states: Arc<Mutex<Vec<ConnectState>>>,
        failed_attempts: Arc<Mutex<Vec<u32>>>,
    }

    impl BootstrapObserver for RecordingObserver {
        fn on_state(&self, _address: &Address, state: ConnectState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_fetch_failed(&self, _: &Address, attempt: u32, _: u32, _: &BootstrapError) {
            self.failed_attempts.lock().unwrap().push(attempt);
        }
    }

    fn client(
        fetcher: &ScriptedFetcher,
        transport: &FakeTransport,
        policy: RetryPolicy,
        observer: &RecordingObserver,
    ) -> BootstrapClient<ScriptedFetcher, FakeTransport> {
        BootstrapClient::builder()
            .fetcher(fetcher.clone())
            .transport(transport.clone())
            .retry(policy)
            .observer(observer.clone())
            .build()
    }

    fn fast_policy(max: u32) -> RetryPolicy {
        RetryPolicy::new().max_attempts(max).interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_empty_host_or_port_does_no_io() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, RetryPolicy::default(), &observer);

        for (host, port) in [("", "443"), ("svc.internal", ""), ("  ", "443")] {
            let err = client
                .connect(&Context::background(), host, port, DialOptions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, BootstrapError::InvalidArgument(_)));
        }

        assert_eq!(fetcher.attempts(), 0);
        assert_eq!(transport.dials.load(Ordering::SeqCst), 0);
        assert!(observer.states.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_ready_on_fourth_attempt() {
        let fetcher = ScriptedFetcher::new(3, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, RetryPolicy::default(), &observer);

        let mut handle = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap();

        assert_eq!(fetcher.attempts(), 4);
        assert_eq!(transport.dials.load(Ordering::SeqCst), 1);
        assert!(handle.is_alive());
        assert_eq!(handle.address().to_string(), "svc.internal:443");
        assert_eq!(handle.trust_config(), &handle.certificate().fingerprint());
        assert_eq!(*observer.failed_attempts.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(
            *observer.states.lock().unwrap(),
            vec![
                ConnectState::FetchingCertificate,
                ConnectState::CertificateFetched,
                ConnectState::Dialing,
                ConnectState::Connected,
            ]
        );
    }

    #[tokio::test]
    async fn test_attempts_are_spaced_by_interval() {
        let fetcher = ScriptedFetcher::new(3, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let policy = RetryPolicy::new().interval(Duration::from_millis(10));
        let client = client(&fetcher, &transport, policy, &observer);

        client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap();

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(10));
        }
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_error() {
        let fetcher = ScriptedFetcher::new(u32::MAX, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, RetryPolicy::default(), &observer);

        let err = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap_err();

        assert_eq!(fetcher.attempts(), 20);
        assert_eq!(transport.dials.load(Ordering::SeqCst), 0);
        match err {
            BootstrapError::FetchExhausted { attempts, last } => {
                assert_eq!(attempts, 20);
                match *last {
                    BootstrapError::Transport { source, .. } => {
                        assert_eq!(source.to_string(), "attempt 20");
                    }
                    other => panic!("unexpected last error: {other:?}"),
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            observer.states.lock().unwrap().last(),
            Some(&ConnectState::CertificateFetchFailed)
        );
    }

    #[tokio::test]
    async fn test_missing_certificate_is_retried() {
        let fetcher = ScriptedFetcher::new(2, Failure::NoCertificate);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(5), &observer);

        let mut handle = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap();
        assert!(handle.is_alive());
        assert_eq!(fetcher.attempts(), 3);
    }

    #[tokio::test]
    async fn test_missing_certificate_fatal_when_configured() {
        let fetcher = ScriptedFetcher::new(u32::MAX, Failure::NoCertificate);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let policy = fast_policy(5).retry_on_missing_certificate(false);
        let client = client(&fetcher, &transport, policy, &observer);

        let err = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::NoCertificate { .. }));
        assert_eq!(fetcher.attempts(), 1);
    }

    #[tokio::test]
    async fn test_dial_failure_not_retried() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport {
            refuse: true,
            ..FakeTransport::default()
        };
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(5), &observer);

        let err = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::Dial { .. }));
        assert_eq!(fetcher.attempts(), 1);
        assert_eq!(transport.dials.load(Ordering::SeqCst), 1);
        assert_eq!(
            observer.states.lock().unwrap().last(),
            Some(&ConnectState::DialFailed)
        );
    }

    #[tokio::test]
    async fn test_close_once() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(1), &observer);

        let mut handle = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap();

        assert_eq!(handle.close().await.unwrap(), "connection closed");
        assert!(!handle.is_alive());
        assert!(matches!(handle.close().await, Err(BootstrapError::NotConnected)));
        assert!(matches!(handle.connection(), Err(BootstrapError::NotConnected)));
        assert!(!handle.is_alive());
        assert_eq!(transport.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_error_is_surfaced() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport {
            fail_close: true,
            ..FakeTransport::default()
        };
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(1), &observer);

        let mut handle = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap();

        assert!(matches!(handle.close().await, Err(BootstrapError::Close(_))));
        assert!(matches!(handle.close().await, Err(BootstrapError::NotConnected)));
        assert_eq!(transport.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_wait_aborts_promptly() {
        let fetcher = ScriptedFetcher::new(u32::MAX, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let policy = RetryPolicy::new().interval(Duration::from_secs(30));
        let client = client(&fetcher, &transport, policy, &observer);

        let (ctx, cancel) = Context::with_cancel();
        let task = tokio::spawn({
            let client = client.clone();
            async move {
                client
                    .connect(&ctx, "svc.internal", "443", DialOptions::new())
                    .await
                    .map(|_| ())
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BootstrapError::Cancelled)));
        assert!(cancelled_at.elapsed() < Duration::from_secs(1));
        assert_eq!(fetcher.attempts(), 1);
        assert_eq!(
            observer.states.lock().unwrap().last(),
            Some(&ConnectState::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_cancel_during_handshake() {
        let fetcher = StalledFetcher::default();
        let observer = RecordingObserver::default();
        let client = BootstrapClient::builder()
            .fetcher(fetcher.clone())
            .transport(FakeTransport::default())
            .observer(observer.clone())
            .build();

        let (ctx, cancel) = Context::with_cancel();
        let task = tokio::spawn(async move {
            client
                .connect(&ctx, "svc.internal", "443", DialOptions::new())
                .await
                .map(|_| ())
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BootstrapError::Cancelled)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            observer.states.lock().unwrap().last(),
            Some(&ConnectState::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_cancel_during_dial() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport {
            hang: true,
            ..FakeTransport::default()
        };
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(3), &observer);

        let (ctx, cancel) = Context::with_cancel();
        let task = tokio::spawn(async move {
            client
                .connect(&ctx, "svc.internal", "443", DialOptions::new())
                .await
                .map(|_| ())
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(BootstrapError::Cancelled)));
        assert_eq!(fetcher.attempts(), 1);
        assert_eq!(transport.dials.load(Ordering::SeqCst), 1);
        assert_eq!(
            *observer.states.lock().unwrap(),
            vec![
                ConnectState::FetchingCertificate,
                ConnectState::CertificateFetched,
                ConnectState::Dialing,
                ConnectState::Cancelled,
            ]
        );
    }

    #[tokio::test]
    async fn test_deadline_stops_retry_loop() {
        let fetcher = ScriptedFetcher::new(u32::MAX, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let policy = RetryPolicy::new().interval(Duration::from_secs(30));
        let client = client(&fetcher, &transport, policy, &observer);

        let ctx = Context::background().with_timeout(Duration::from_millis(30));
        let err = client
            .connect(&ctx, "svc.internal", "443", DialOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::DeadlineExceeded));
        assert_eq!(fetcher.attempts(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(0), &observer);

        let err = client
            .connect(&Context::background(), "svc.internal", "443", DialOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidArgument(_)));
        assert_eq!(fetcher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_connects_are_independent() {
        let fetcher = ScriptedFetcher::new(0, Failure::Refused);
        let transport = FakeTransport::default();
        let observer = RecordingObserver::default();
        let client = client(&fetcher, &transport, fast_policy(3), &observer);
        let ctx = Context::background();

        let (a, b) = tokio::join!(
            client.connect(&ctx, "a.internal", "443", DialOptions::new()),
            client.connect(&ctx, "b.internal", "8443", DialOptions::new()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.address().to_string(), "a.internal:443");
        assert_eq!(b.address().to_string(), "b.internal:8443");
        assert_eq!(transport.dials.load(Ordering::SeqCst), 2);
    }
}
