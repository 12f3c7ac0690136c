use std::{env::var, path::PathBuf, sync::Arc};

use chrono::FixedOffset;
use dotenv::dotenv;
use eyre::{eyre, Context, Error};

const DEFAULT_CREDENTIALS: &str = "sheets-credentials.json";
const DEFAULT_SCHEDULE: &str = "every 5 minutes";
const DEFAULT_UTC_OFFSET: i32 = 3;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    tg_token: String,
    chat_id: i64,
    spreadsheet_id: String,
    sheet_name: String,
    google_credentials: PathBuf,
    unban_schedule: String,
    sheet_offset: FixedOffset,
}

impl Env {
    pub fn tg_token(&self) -> &str {
        &self.0.tg_token
    }

    pub fn chat_id(&self) -> i64 {
        self.0.chat_id
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.0.spreadsheet_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.0.sheet_name
    }

    pub fn google_credentials(&self) -> &PathBuf {
        &self.0.google_credentials
    }

    pub fn unban_schedule(&self) -> &str {
        &self.0.unban_schedule
    }

    /// Offset the sheet's dates are recorded in.
    pub fn sheet_offset(&self) -> FixedOffset {
        self.0.sheet_offset
    }

    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            log::debug!("No .env file loaded: {}", err);
        }
        Env::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Env, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, Error> {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| eyre!("{} is not set", key))
        };

        let chat_id = required("CHAT_ID")?
            .trim()
            .parse::<i64>()
            .context("CHAT_ID is not a number")?;

        let offset_hours = match lookup("SHEET_UTC_OFFSET") {
            Some(value) => value
                .trim()
                .parse::<i32>()
                .context("SHEET_UTC_OFFSET is not a number of hours")?,
            None => DEFAULT_UTC_OFFSET,
        };
        let sheet_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| eyre!("SHEET_UTC_OFFSET is out of range: {}", offset_hours))?;

        Ok(Env(Arc::new(EnvInner {
            tg_token: required("TG_TOKEN")?,
            chat_id,
            spreadsheet_id: required("SPREADSHEET_ID")?,
            sheet_name: required("SHEET_NAME")?,
            google_credentials: lookup("GOOGLE_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS.to_owned())
                .into(),
            unban_schedule: lookup("UNBAN_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_SCHEDULE.to_owned()),
            sheet_offset,
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Env, Error> {
        let vars = vars(pairs);
        Env::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("TG_TOKEN", "123:abc"),
        ("CHAT_ID", "-1001234567890"),
        ("SPREADSHEET_ID", "sheet-id"),
        ("SHEET_NAME", "Подписки"),
    ];

    #[test]
    fn test_load_with_defaults() {
        let env = load(&REQUIRED).unwrap();
        assert_eq!(env.tg_token(), "123:abc");
        assert_eq!(env.chat_id(), -1001234567890);
        assert_eq!(env.spreadsheet_id(), "sheet-id");
        assert_eq!(env.sheet_name(), "Подписки");
        assert_eq!(env.google_credentials(), &PathBuf::from(DEFAULT_CREDENTIALS));
        assert_eq!(env.unban_schedule(), DEFAULT_SCHEDULE);
        assert_eq!(env.sheet_offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SHEET_UTC_OFFSET", "-5"));
        pairs.push(("UNBAN_SCHEDULE", "every 5 seconds"));
        pairs.push(("GOOGLE_CREDENTIALS", "/run/secrets/google.json"));
        let env = load(&pairs).unwrap();
        assert_eq!(env.sheet_offset().local_minus_utc(), -5 * 3600);
        assert_eq!(env.unban_schedule(), "every 5 seconds");
        assert_eq!(
            env.google_credentials(),
            &PathBuf::from("/run/secrets/google.json")
        );
    }

    #[test]
    fn test_missing_required_is_fatal() {
        for (missing, _) in REQUIRED {
            let pairs = REQUIRED
                .iter()
                .filter(|(key, _)| *key != missing)
                .copied()
                .collect::<Vec<_>>();
            let err = load(&pairs).err().unwrap();
            assert!(err.to_string().contains(missing), "{}", err);
        }
    }

    #[test]
    fn test_bad_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("CHAT_ID", "general");
        assert!(load(&pairs).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SHEET_UTC_OFFSET", "99"));
        assert!(load(&pairs).is_err());

        for hours in ["1000000", "-1000000", "2147483647"] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("SHEET_UTC_OFFSET", hours));
            let err = load(&pairs).err().unwrap();
            assert!(err.to_string().contains("out of range"), "{}", err);
        }
    }
}
