use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

use super::sink::EventSink;

/// Fans each normalized event out to every registered sink in order.
/// A failing sink is logged and does not stop the ones after it.
#[derive(Clone, Default)]
pub struct EventRecorder {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub async fn record(&self, event: &Map<String, Value>) {
        match serde_json::to_string_pretty(event) {
            Ok(pretty) => debug!("Telemetry event: {}", pretty),
            Err(e) => debug!("Telemetry event (unprintable): {}", e),
        }

        for sink in &self.sinks {
            if let Err(e) = sink.write(event).await {
                error!("Failed to write event to {} sink: {:#}", sink.name(), e);
            }
        }
    }
}
