//! Trading-session label for the current tick.

use crate::domain::{Session, Tick};

use super::{Metric, Snapshot};

#[derive(Debug, Clone)]
pub struct SessionMetric {
    name: String,
    session: Session,
    key_label: String,
}

impl SessionMetric {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key_label: format!("{name}.session_label"),
            session: Session::Other,
            name,
        }
    }
}

impl Metric for SessionMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        self.session = Session::at(tick.hour, tick.minute);
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_label(&self.key_label, self.session.label());
    }
}
