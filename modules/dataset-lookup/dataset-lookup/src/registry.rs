//! Name-based dispatch of spreadsheet functions.
//!
//! Hosts call functions by name with positional string arguments. Names are
//! case-insensitive; argument counts are checked before anything runs.

use std::sync::Arc;

use dataset_lookup_sdk::{CellValue, DatasetLookupApi, FunctionName, LookupError};

#[derive(Clone)]
pub struct FunctionRegistry {
    api: Arc<dyn DatasetLookupApi>,
}

impl FunctionRegistry {
    #[must_use]
    pub fn new(api: Arc<dyn DatasetLookupApi>) -> Self {
        Self { api }
    }

    /// Registered function names.
    #[must_use]
    pub fn functions() -> &'static [FunctionName] {
        &FunctionName::ALL
    }

    /// Evaluate the function called `name`.
    ///
    /// # Errors
    /// Returns [`LookupError::UnknownFunction`] or [`LookupError::Arity`] for
    /// bad invocations, and the lookup's own error for rejected `GET` cells.
    pub async fn invoke(&self, name: &str, args: &[String]) -> Result<CellValue, LookupError> {
        let function: FunctionName = name.parse()?;
        self.call(function, args).await
    }

    /// Evaluate `function` with positional arguments.
    ///
    /// # Errors
    /// Same as [`FunctionRegistry::invoke`], minus unknown names.
    pub async fn call(
        &self,
        function: FunctionName,
        args: &[String],
    ) -> Result<CellValue, LookupError> {
        match (function, args) {
            (FunctionName::Get, [name, indicator, module]) => {
                self.api.get(name, indicator, module).await
            }
            (FunctionName::Info, [name, info]) => Ok(self.api.info(name, info).await),
            (FunctionName::Life, [name]) => Ok(self.api.life(name).await),
            (FunctionName::Data, [name]) => Ok(self.api.data(name).await),
            (function, args) => Err(LookupError::arity(function, args.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DatasetLookupApi for RecordingApi {
        async fn get(
            &self,
            name: &str,
            indicator: &str,
            module: &str,
        ) -> Result<CellValue, LookupError> {
            self.calls.lock().push(format!("get {name} {indicator} {module}"));
            if indicator == "bad" {
                return Err(LookupError::service("unknown indicator"));
            }
            Ok(CellValue::Number(1.5))
        }

        async fn info(&self, name: &str, info: &str) -> CellValue {
            self.calls.lock().push(format!("info {name} {info}"));
            CellValue::text("info")
        }

        async fn life(&self, name: &str) -> CellValue {
            self.calls.lock().push(format!("life {name}"));
            CellValue::Number(50.0)
        }

        async fn data(&self, name: &str) -> CellValue {
            self.calls.lock().push(format!("data {name}"));
            CellValue::text("match")
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[tokio::test]
    async fn dispatches_by_case_insensitive_name() {
        let api = Arc::new(RecordingApi::default());
        let registry = FunctionRegistry::new(api.clone());

        assert_eq!(
            registry.invoke("GET", &args(&["A", "gwp", "A1-A3"])).await,
            Ok(CellValue::Number(1.5))
        );
        assert_eq!(
            registry.invoke("Info", &args(&["A", "unit"])).await,
            Ok(CellValue::text("info"))
        );
        assert_eq!(
            registry.invoke("life", &args(&["A"])).await,
            Ok(CellValue::Number(50.0))
        );
        assert_eq!(
            registry.invoke("DATA", &args(&["steel"])).await,
            Ok(CellValue::text("match"))
        );

        assert_eq!(
            *api.calls.lock(),
            vec!["get A gwp A1-A3", "info A unit", "life A", "data steel"]
        );
    }

    #[tokio::test]
    async fn wrong_arity_is_rejected_before_dispatch() {
        let api = Arc::new(RecordingApi::default());
        let registry = FunctionRegistry::new(api.clone());

        let err = registry.invoke("get", &args(&["A", "gwp"])).await.unwrap_err();

        assert_eq!(
            err,
            LookupError::Arity {
                function: FunctionName::Get,
                expected: 3,
                actual: 2
            }
        );
        assert!(api.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_function_is_rejected() {
        let registry = FunctionRegistry::new(Arc::new(RecordingApi::default()));

        let err = registry.invoke("sum", &args(&["1"])).await.unwrap_err();

        assert_eq!(err, LookupError::unknown_function("sum"));
    }

    #[tokio::test]
    async fn get_errors_pass_through() {
        let registry = FunctionRegistry::new(Arc::new(RecordingApi::default()));

        let err = registry
            .invoke("get", &args(&["A", "bad", "A1"]))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "unknown indicator");
    }

    #[test]
    fn lists_all_functions() {
        assert_eq!(FunctionRegistry::functions().len(), 4);
    }
}
