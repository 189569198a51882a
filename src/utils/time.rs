use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in daybetter. Matches the
/// `yyyy-MM-dd` keys used inside the stored blob.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
