//! Wires a small processor chain: a shared locator, a per-field cache
//! factory, an inherited base and a decorated payload.
//!
//! Run with `RUST_LOG=fieldwire=trace cargo run --example wiring`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fieldwire::{Context, Injectable, InjectionError, Injector, InjectorConfig, Registry};

trait Locator: Send + Sync {
    fn locate(&self, uri: &str) -> String;
}

struct ClasspathLocator;

impl Locator for ClasspathLocator {
    fn locate(&self, uri: &str) -> String {
        format!("classpath:{}", uri)
    }
}

#[derive(Debug)]
struct Cache {
    generation: usize,
}

trait Processor: Injectable {
    fn process(&self, uri: &str) -> String;
}

#[derive(Injectable)]
struct BaseProcessor {
    #[inject]
    locator: Option<Arc<dyn Locator>>,
}

#[derive(Injectable)]
struct CssMinifier {
    #[inject(parent)]
    base: BaseProcessor,
    #[inject]
    cache: Option<Arc<Cache>>,
}

impl Processor for CssMinifier {
    fn process(&self, uri: &str) -> String {
        let located = self
            .base
            .locator
            .as_ref()
            .map(|l| l.locate(uri))
            .unwrap_or_default();
        let generation = self.cache.as_ref().map(|c| c.generation).unwrap_or_default();
        format!("minified({}) [cache #{}]", located, generation)
    }
}

#[derive(Injectable)]
#[injectable(decorates = inner)]
struct Timed {
    #[inject]
    cache: Option<Arc<Cache>>,
    inner: Box<dyn Processor>,
}

fn main() -> Result<(), InjectionError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let generations = AtomicUsize::new(0);
    let registry = Registry::builder()
        .instance(Arc::new(ClasspathLocator))
        .assignable_to(|l| l as Arc<dyn Locator>)
        .factory(move || {
            Arc::new(Cache {
                generation: generations.fetch_add(1, Ordering::SeqCst),
            })
        })
        .build()?;

    let injector = Injector::builder()
        .registry(registry)
        .config(InjectorConfig::load()?)
        .build()?;

    let mut chain = Timed {
        cache: None,
        inner: Box::new(CssMinifier {
            base: BaseProcessor { locator: None },
            cache: None,
        }),
    };
    injector.inject(&mut chain, &Context::active("demo"))?;

    println!("{}", chain.inner.process("/static/site.css"));
    println!("decorator cache: {:?}", chain.cache);
    Ok(())
}
