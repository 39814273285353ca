use std::fs::File;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use biometrics::{Collector, Counter, Moments, PlainTextEmitter};

use crate::error::{Error, Result};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("parley.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("parley.client.request_errors");
pub(crate) static CLIENT_TRANSPORT_ERRORS: Counter =
    Counter::new("parley.client.transport_errors");
pub(crate) static CLIENT_PROTOCOL_ERRORS: Counter = Counter::new("parley.client.protocol_errors");
pub(crate) static CLIENT_REJECTIONS: Counter = Counter::new("parley.client.rejections");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("parley.client.request_duration_seconds");

pub(crate) static CHAT_SKIPPED_ENTRIES: Counter = Counter::new("parley.chat.skipped_entries");

pub(crate) static SESSION_POLLS: Counter = Counter::new("parley.session.polls");
pub(crate) static SESSION_POLL_FAILURES: Counter = Counter::new("parley.session.poll_failures");
pub(crate) static SESSION_SENDS: Counter = Counter::new("parley.session.sends");
pub(crate) static SESSION_SEND_FAILURES: Counter = Counter::new("parley.session.send_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: &Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_TRANSPORT_ERRORS);
    collector.register_counter(&CLIENT_PROTOCOL_ERRORS);
    collector.register_counter(&CLIENT_REJECTIONS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_SKIPPED_ENTRIES);

    collector.register_counter(&SESSION_POLLS);
    collector.register_counter(&SESSION_POLL_FAILURES);
    collector.register_counter(&SESSION_SENDS);
    collector.register_counter(&SESSION_SEND_FAILURES);
}

/// Write every sensor registered with `collector` to `path`, one reading per
/// line.
pub fn emit_biometrics(collector: &Collector, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|err| Error::io(format!("cannot create {}", path.display()), err))?;
    let mut emitter = PlainTextEmitter::new(file);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);
    collector
        .emit(&mut emitter, now)
        .map_err(|err| Error::io(format!("cannot write {}", path.display()), err))
}
