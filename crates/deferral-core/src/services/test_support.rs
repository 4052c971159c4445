//! Shared fixtures and a log-capturing subscriber for service tests

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::domain::{Category, CategoryId, Product, ProductId, ProductKind};

#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedLogs {
    pub fn count(&self, level: Level) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct CaptureLayer(CapturedLogs);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        let CapturedLogs(entries) = &self.0;
        entries
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

/// Run `f` with a thread-local subscriber recording every event.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(logs.clone()));
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs)
}

pub fn category(id: CategoryId, slug: &str) -> Category {
    Category {
        id,
        slug: slug.to_string(),
    }
}

pub fn simple_product(id: ProductId, categories: Vec<Category>) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        kind: ProductKind::Simple,
        parent_id: None,
        categories,
        deferred_revenue_required: false,
        gl_code: None,
        deferral_start: None,
        deferral_end: None,
    }
}

pub fn membership_product(id: ProductId) -> Product {
    Product {
        deferred_revenue_required: true,
        ..simple_product(id, vec![category(5, "membership")])
    }
}

pub fn variation_of(id: ProductId, parent_id: ProductId) -> Product {
    Product {
        kind: ProductKind::Variation,
        parent_id: Some(parent_id),
        ..simple_product(id, vec![])
    }
}
