use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// One JSON object per line: `timestamp`, `level`, `resource`, `target`,
/// `message`, plus the event's own fields under `attributes`.
pub struct JsonLogFormatter {
    resource: Value,
}

impl JsonLogFormatter {
    pub fn new(service: String, version: String, env: String, node: String) -> Self {
        Self {
            resource: serde_json::json!({
                "service.name": service,
                "service.version": version,
                "service.env": env,
                "host.name": node,
            }),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonLogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let message = visitor.fields.remove("message").unwrap_or(Value::String(String::new()));

        let mut line = Map::new();
        line.insert("timestamp".into(), Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into());
        line.insert("level".into(), meta.level().as_str().into());
        line.insert("resource".into(), self.resource.clone());
        line.insert("target".into(), meta.target().into());
        line.insert("message".into(), message);
        line.insert("attributes".into(), Value::Object(visitor.fields));

        let rendered = serde_json::to_string(&Value::Object(line)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", rendered)
    }
}

#[derive(Default)]
struct JsonVisitor {
    fields: Map<String, Value>,
}

impl Visit for JsonVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().into(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().into(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().into(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().into(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().into(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields.insert(field.name().into(), format!("{:?}", value).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_event_is_rendered_as_one_json_line() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .event_format(JsonLogFormatter::new("svc".into(), "1.0.0".into(), "test".into(), "NODE-1".into()))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(event = "SERVICE_UPDATED", to = 3, autoscaling = true, service = %"web", "Desired count updated");
        });

        let raw = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(raw.lines().count(), 1);

        let line: Value = serde_json::from_str(raw.trim()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["message"], "Desired count updated");
        assert_eq!(line["resource"]["host.name"], "NODE-1");
        assert_eq!(line["attributes"]["event"], "SERVICE_UPDATED");
        assert_eq!(line["attributes"]["to"], 3);
        assert_eq!(line["attributes"]["autoscaling"], true);
        assert_eq!(line["attributes"]["service"], "web");
    }
}
