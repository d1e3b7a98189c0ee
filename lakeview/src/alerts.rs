use std::collections::VecDeque;

/// Messages waiting to be shown to the user, oldest first.
#[derive(Debug, Default, Clone)]
pub struct Alerts {
    pending: VecDeque<String>,
}

impl Alerts {
    pub fn push(&mut self, message: impl Into<String>) {
        self.pending.push_back(message.into());
    }

    /// Alert which should be displayed right now.
    pub fn current(&self) -> Option<&str> {
        self.pending.front().map(String::as_str)
    }

    /// User acknowledged the current alert.
    pub fn dismiss(&mut self) {
        self.pending.pop_front();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_are_shown_in_order() {
        let mut alerts = Alerts::default();
        assert_eq!(None, alerts.current());

        alerts.push("first");
        alerts.push(String::from("second"));
        assert_eq!(2, alerts.len());
        assert_eq!(Some("first"), alerts.current());

        alerts.dismiss();
        assert_eq!(Some("second"), alerts.current());

        alerts.dismiss();
        assert!(alerts.is_empty());

        // Nothing to dismiss, nothing happens.
        alerts.dismiss();
        assert!(alerts.is_empty());
    }
}
