use figment::{Figment, providers::Env};

pub trait ContextProvider<Config> {
    fn new(config: Config) -> impl Future<Output = Self>;
}

/// Install the JSON log formatter. The log level comes from `RUST_LOG`.
///
/// Calling this more than once is harmless; only the first call installs a
/// subscriber.
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .json()
        // allow log level to be overridden by RUST_LOG env var
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // ANSI codes are noise in collected JSON logs.
        .with_ansi(false)
        // remove the name of the function from every log entry
        .with_target(false)
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// The configuration sources: process environment variables, with names
/// lowercased to match struct fields (`MAX_SESSIONS` → `max_sessions`).
pub fn config_figment() -> Figment {
    Figment::new().merge(Env::raw())
}

/// Initialize the application context with configuration from environment
/// variables. The configuration is extracted using figment.
///
/// # Returns
/// The application context built by `A::new` from the extracted
/// configuration.
///
/// # Errors
/// If the configuration cannot be extracted from the environment variables.
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
{
    init_tracing();

    let config: Config = config_figment().extract()?;

    let context = A::new(config).await;

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        name: String,
        #[serde(default)]
        retries: u32,
    }

    struct TestContext {
        config: TestConfig,
    }

    impl ContextProvider<TestConfig> for TestContext {
        async fn new(config: TestConfig) -> Self {
            Self { config }
        }
    }

    #[test]
    fn test_extract_with_defaults() {
        let figment = Figment::from(Serialized::defaults(
            serde_json::json!({ "name": "widgets" }),
        ));
        let config: TestConfig = figment.extract().unwrap();

        assert_eq!(config.name, "widgets");
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let figment = Figment::from(Serialized::defaults(
            serde_json::json!({ "retries": 3 }),
        ));
        assert!(figment.extract::<TestConfig>().is_err());
    }

    #[test]
    fn test_context_provider_builds_context() {
        let config = TestConfig {
            name: "ctx".to_string(),
            retries: 1,
        };
        let context = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(TestContext::new(config));
        assert_eq!(context.config.name, "ctx");
        assert_eq!(context.config.retries, 1);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
