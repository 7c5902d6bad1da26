use chrono::NaiveDate;
use std::collections::HashSet;

/// Users already alerted on the current local date.
///
/// Lives for the process only. `advance_to` forgets everything once the
/// date moves on.
#[derive(Debug, Default)]
pub struct AlertLedger {
    date: Option<NaiveDate>,
    sent: HashSet<String>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the date changed and history was cleared.
    pub fn advance_to(&mut self, date: NaiveDate) -> bool {
        let rolled = matches!(self.date, Some(current) if current != date);
        if rolled {
            self.sent.clear();
        }
        self.date = Some(date);
        rolled
    }

    pub fn contains(&self, user_id: &str, date: NaiveDate) -> bool {
        self.sent.contains(&Self::key(user_id, date))
    }

    pub fn mark(&mut self, user_id: &str, date: NaiveDate) {
        self.sent.insert(Self::key(user_id, date));
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    fn key(user_id: &str, date: NaiveDate) -> String {
        format!("{}:{}", user_id, date.format("%Y%m%d"))
    }
}
