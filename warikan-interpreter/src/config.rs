use std::{env, path::PathBuf};
use warikan_application::SettlementMode;
use warikan_domain::Currency;

pub const TARGET_CURRENCY_VAR: &str = "WARIKAN_TARGET_CURRENCY";
pub const RATES_VAR: &str = "WARIKAN_RATES";
pub const OUTPUT_VAR: &str = "WARIKAN_OUTPUT";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Interpreter settings taken from the environment (and `.env`, if present).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: SettlementMode,
    pub rates_path: Option<PathBuf>,
    pub output: OutputFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mode = match non_empty(TARGET_CURRENCY_VAR) {
            Some(code) => SettlementMode::Unified {
                target: Currency::new(code.trim())
                    .map_err(|err| format!("{TARGET_CURRENCY_VAR}: {err}"))?,
            },
            None => SettlementMode::PerCurrency,
        };

        let output = match non_empty(OUTPUT_VAR).as_deref().map(str::trim) {
            None | Some("text") => OutputFormat::Text,
            Some("json") => OutputFormat::Json,
            Some(other) => {
                return Err(format!("{OUTPUT_VAR}: expected `text` or `json`, got `{other}`"));
            }
        };

        Ok(Self {
            mode,
            rates_path: non_empty(RATES_VAR).map(PathBuf::from),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_per_currency_text() {
        let config = config(&[]).expect("config");

        assert_eq!(config.mode, SettlementMode::PerCurrency);
        assert_eq!(config.rates_path, None);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn target_currency_enables_unified_mode() {
        let config = config(&[(TARGET_CURRENCY_VAR, " usd "), (RATES_VAR, "rates.json")])
            .expect("config");

        assert_eq!(
            config.mode,
            SettlementMode::Unified {
                target: Currency::new("USD").expect("currency"),
            }
        );
        assert_eq!(config.rates_path, Some(PathBuf::from("rates.json")));
    }

    #[rstest]
    #[case::blank_target(&[(TARGET_CURRENCY_VAR, "  ")], true)]
    #[case::json_output(&[(OUTPUT_VAR, "json")], true)]
    #[case::bad_target(&[(TARGET_CURRENCY_VAR, "US DOLLAR")], false)]
    #[case::bad_output(&[(OUTPUT_VAR, "yaml")], false)]
    fn validates_variables(#[case] vars: &[(&str, &str)], #[case] accepted: bool) {
        assert_eq!(config(vars).is_ok(), accepted);
    }
}
