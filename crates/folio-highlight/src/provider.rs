//! Lazily initialized, shared access to a tokenizing engine.

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use tokio::sync::OnceCell;

use crate::config::{HighlightConfig, Theme};
use crate::engine::{HighlightError, HighlightResult, Highlighter, InitError};
use crate::language::Language;
use crate::syntect_engine::SyntectHighlighter;

type Loader<H> = Arc<dyn Fn() -> Result<H, InitError> + Send + Sync>;

static SHARED: LazyLock<HighlighterProvider<SyntectHighlighter>> =
    LazyLock::new(HighlighterProvider::syntect);

/// Process-wide syntect provider, loaded on first use and kept until exit.
pub fn shared() -> &'static HighlighterProvider<SyntectHighlighter> {
    &SHARED
}

/// Read-only handle to an initialized engine. Cheap to clone.
pub struct HighlighterHandle<H> {
    engine: Arc<H>,
}

impl<H> Clone for HighlighterHandle<H> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<H: Highlighter> HighlighterHandle<H> {
    /// Wrap an already constructed engine.
    pub fn new(engine: H) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Tokenize `source` for one theme.
    pub fn highlight(
        &self,
        source: &str,
        language: Language,
        theme: Theme,
    ) -> Result<HighlightResult, HighlightError> {
        self.engine.highlight(source, language, theme)
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &H {
        &self.engine
    }
}

/// Provides a [`HighlighterHandle`], constructing the engine at most once.
///
/// The loader runs on the blocking pool the first time [`handle`](Self::handle)
/// is awaited. Concurrent callers wait for that single initialization and
/// all observe its outcome. A failed initialization is kept as well: every
/// later caller gets the same error instead of retrying.
pub struct HighlighterProvider<H> {
    loader: Loader<H>,
    cell: OnceCell<Result<HighlighterHandle<H>, InitError>>,
}

impl HighlighterProvider<SyntectHighlighter> {
    /// Provider for the bundled syntect engine with the default configuration.
    pub fn syntect() -> Self {
        Self::new(|| SyntectHighlighter::load(&HighlightConfig::DEFAULT))
    }
}

impl<H: Highlighter + 'static> HighlighterProvider<H> {
    /// Create a provider that builds its engine with `loader`.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<H, InitError> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// Get the engine handle, initializing it on first use.
    pub async fn handle(&self) -> Result<HighlighterHandle<H>, InitError> {
        self.cell
            .get_or_init(|| self.initialize())
            .await
            .clone()
    }

    /// Whether initialization has completed (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn initialize(&self) -> Result<HighlighterHandle<H>, InitError> {
        let start = Instant::now();
        let loader = Arc::clone(&self.loader);

        let result = match tokio::task::spawn_blocking(move || loader()).await {
            Ok(result) => result,
            Err(e) => Err(InitError::Aborted(e.to_string())),
        };

        match result {
            Ok(engine) => {
                tracing::info!(
                    "Initialized {} highlighter in {}ms",
                    engine.name(),
                    start.elapsed().as_millis()
                );
                Ok(HighlighterHandle::new(engine))
            }
            Err(e) => {
                tracing::error!("Failed to initialize highlighter: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::engine::Token;

    struct EchoHighlighter;

    impl Highlighter for EchoHighlighter {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn highlight(
            &self,
            source: &str,
            _language: Language,
            _theme: Theme,
        ) -> Result<HighlightResult, HighlightError> {
            Ok(HighlightResult {
                tokens: vec![vec![Token::new(source, "#000000")]],
                ..Default::default()
            })
        }
    }

    fn counting_provider(calls: Arc<AtomicUsize>) -> HighlighterProvider<EchoHighlighter> {
        HighlighterProvider::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(EchoHighlighter)
        })
    }

    #[tokio::test]
    async fn initializes_lazily() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = counting_provider(calls.clone());

        assert!(!provider.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let handle = provider.handle().await.unwrap();
        let result = handle.highlight("x", Language::Rust, Theme::Dark).unwrap();

        assert!(provider.is_initialized());
        assert_eq!(result.tokens[0][0].text, "x");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_initialization() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(counting_provider(calls.clone()));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let provider = Arc::clone(&provider);
            tasks.push(tokio::spawn(async move { provider.handle().await.is_ok() }));
        }
        for task in tasks {
            assert!(task.await.unwrap());
        }

        provider.handle().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handles_point_at_the_same_engine() {
        let provider = counting_provider(Arc::new(AtomicUsize::new(0)));

        let a = provider.handle().await.unwrap();
        let b = provider.handle().await.unwrap();

        assert!(std::ptr::eq(a.engine(), b.engine()));
    }

    #[tokio::test]
    async fn initialization_failure_is_reported_and_kept() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider: HighlighterProvider<EchoHighlighter> = HighlighterProvider::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(InitError::Load("grammar bundle missing".to_string()))
        });

        assert!(matches!(provider.handle().await, Err(InitError::Load(_))));
        assert!(matches!(provider.handle().await, Err(InitError::Load(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_loader_is_an_init_error() {
        let provider: HighlighterProvider<EchoHighlighter> =
            HighlighterProvider::new(|| panic!("boom"));

        assert!(matches!(provider.handle().await, Err(InitError::Aborted(_))));
    }
}
