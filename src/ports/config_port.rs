//! Configuration access port trait.

use chrono::NaiveDate;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value. `None` when the key is absent, `Some(Err(raw))` when it
    /// does not parse.
    fn get_int(&self, section: &str, key: &str) -> Option<Result<i64, String>> {
        self.get_string(section, key).map(|raw| {
            let trimmed = raw.trim();
            trimmed.parse().map_err(|_| trimmed.to_string())
        })
    }

    /// `YYYY-MM-DD` value. `None` when the key is absent, `Some(Err(raw))` when
    /// it does not parse.
    fn get_date(&self, section: &str, key: &str) -> Option<Result<NaiveDate, String>> {
        self.get_string(section, key).map(|raw| {
            let trimmed = raw.trim();
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| trimmed.to_string())
        })
    }
}
