use std::collections::HashMap;
use std::sync::LazyLock;

use rivulet_error::{DbError, ErrorKind, Result};

use crate::transaction::TransactionKind;
use crate::value::Value;

/// Configuration for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub transaction_mode: TransactionKind,
    pub verbose_explain: bool,
    pub max_insert_rows: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            transaction_mode: TransactionKind::Logged,
            verbose_explain: false,
            max_insert_rows: DEFAULT_MAX_INSERT_ROWS,
        }
    }
}

impl SessionConfig {
    pub fn set_from_value(&mut self, name: &str, value: &Value) -> Result<()> {
        let func = get_setting(name)?;
        (func.set)(value, self)
    }

    pub fn get_as_value(&self, name: &str) -> Result<Value> {
        let func = get_setting(name)?;
        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();
        let func = get_setting(name)?;

        let value = (func.get)(&def_conf);
        (func.set)(&value, self)
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Names and descriptions of all settings, sorted by name.
    pub fn describe_settings() -> Vec<(&'static str, &'static str)> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, funcs)| (*name, funcs.description))
            .collect();
        settings.sort_unstable();
        settings
    }
}

fn get_setting(name: &str) -> Result<&'static SettingFunctions> {
    GET_SET_FUNCTIONS.get(name).ok_or_else(|| {
        DbError::with_kind(ErrorKind::InvalidArgument, format!("Missing setting for '{name}'"))
    })
}

struct SettingFunctions {
    set: fn(value: &Value, conf: &mut SessionConfig) -> Result<()>,
    get: fn(conf: &SessionConfig) -> Value,
    description: &'static str,
}

impl SettingFunctions {
    const fn new<S: SessionSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_value as _,
            get: S::get_as_value as _,
            description: S::DESCRIPTION,
        }
    }
}

fn insert_setting<S: SessionSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<TransactionMode>(&mut map);
    insert_setting::<VerboseExplain>(&mut map);
    insert_setting::<MaxInsertRows>(&mut map);

    map
});

pub trait SessionSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_value(value: &Value, conf: &mut SessionConfig) -> Result<()>;
    fn get_as_value(conf: &SessionConfig) -> Value;
}

pub struct TransactionMode;

impl SessionSetting for TransactionMode {
    const NAME: &'static str = "transaction_mode";
    const DESCRIPTION: &'static str =
        "Kind of transaction each statement runs in ('logged' or 'vacuous')";

    fn set_from_value(value: &Value, conf: &mut SessionConfig) -> Result<()> {
        conf.transaction_mode = value.try_as_str()?.parse()?;
        Ok(())
    }

    fn get_as_value(conf: &SessionConfig) -> Value {
        conf.transaction_mode.as_str().into()
    }
}

pub struct VerboseExplain;

impl SessionSetting for VerboseExplain {
    const NAME: &'static str = "verbose_explain";
    const DESCRIPTION: &'static str = "Include layout details in explain output";

    fn set_from_value(value: &Value, conf: &mut SessionConfig) -> Result<()> {
        let val = match value {
            Value::Integer(0) => false,
            Value::Integer(1) => true,
            Value::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "on" => true,
                "false" | "off" => false,
                _ => return Err(invalid_setting(Self::NAME, value)),
            },
            _ => return Err(invalid_setting(Self::NAME, value)),
        };
        conf.verbose_explain = val;
        Ok(())
    }

    fn get_as_value(conf: &SessionConfig) -> Value {
        Value::Integer(conf.verbose_explain.into())
    }
}

pub const DEFAULT_MAX_INSERT_ROWS: u64 = 4096;

const MIN_MAX_INSERT_ROWS: i64 = 1;
const MAX_MAX_INSERT_ROWS: i64 = 1 << 20;

pub struct MaxInsertRows;

impl SessionSetting for MaxInsertRows {
    const NAME: &'static str = "max_insert_rows";
    const DESCRIPTION: &'static str = "Maximum number of rows a single insert may contain";

    fn set_from_value(value: &Value, conf: &mut SessionConfig) -> Result<()> {
        let val = value.try_as_i64()?;
        if !(MIN_MAX_INSERT_ROWS..=MAX_MAX_INSERT_ROWS).contains(&val) {
            return Err(DbError::with_kind(
                ErrorKind::InvalidArgument,
                format!(
                    "Max insert rows must be between {MIN_MAX_INSERT_ROWS} and {MAX_MAX_INSERT_ROWS}"
                ),
            )
            .with_field("value", val));
        }
        conf.max_insert_rows = val as u64;
        Ok(())
    }

    fn get_as_value(conf: &SessionConfig) -> Value {
        Value::Integer(conf.max_insert_rows as i64)
    }
}

fn invalid_setting(name: &str, value: &Value) -> DbError {
    DbError::with_kind(ErrorKind::InvalidArgument, "Invalid value for setting")
        .with_field("setting", name)
        .with_field("value", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut conf = SessionConfig::default();

        conf.set_from_value("transaction_mode", &Value::from("vacuous"))
            .unwrap();
        assert_eq!(TransactionKind::Vacuous, conf.transaction_mode);
        assert_eq!(
            Value::from("vacuous"),
            conf.get_as_value("transaction_mode").unwrap()
        );

        conf.set_from_value("verbose_explain", &Value::from("on"))
            .unwrap();
        assert!(conf.verbose_explain);
        assert_eq!(Value::from(1), conf.get_as_value("verbose_explain").unwrap());

        conf.set_from_value("max_insert_rows", &Value::from(10))
            .unwrap();
        assert_eq!(10, conf.max_insert_rows);
    }

    #[test]
    fn invalid_values() {
        let mut conf = SessionConfig::default();

        conf.set_from_value("transaction_mode", &Value::from("mvcc"))
            .unwrap_err();
        conf.set_from_value("verbose_explain", &Value::from(2))
            .unwrap_err();
        conf.set_from_value("max_insert_rows", &Value::from(0))
            .unwrap_err();
        conf.set_from_value("max_insert_rows", &Value::from("ten"))
            .unwrap_err();

        assert_eq!(SessionConfig::default(), conf);
    }

    #[test]
    fn missing_setting() {
        let mut conf = SessionConfig::default();
        let err = conf.get_as_value("partitions").unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
        conf.reset("partitions").unwrap_err();
    }

    #[test]
    fn reset() {
        let mut conf = SessionConfig::default();
        conf.set_from_value("verbose_explain", &Value::from(1))
            .unwrap();
        conf.set_from_value("max_insert_rows", &Value::from(5))
            .unwrap();

        conf.reset("verbose_explain").unwrap();
        assert!(!conf.verbose_explain);
        assert_eq!(5, conf.max_insert_rows);

        conf.reset_all();
        assert_eq!(SessionConfig::default(), conf);
    }

    #[test]
    fn describe() {
        let names: Vec<_> = SessionConfig::describe_settings()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            vec!["max_insert_rows", "transaction_mode", "verbose_explain"],
            names
        );
    }
}
