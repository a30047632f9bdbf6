use crate::error::{MonikerError, Result};
use tracing::warn;

type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Состояние одного незавершённого асинхронного запроса.
///
/// Callback вызывается ровно один раз: через `complete` или из `Drop`
/// с ошибкой "abandoned", если до завершения дело не дошло.
pub struct AsyncResolutionContext<T> {
    name: String,
    callback: Option<Callback<T>>,
}

impl<T> AsyncResolutionContext<T> {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        Self {
            name: name.into(),
            callback: Some(Box::new(callback)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn complete(mut self, result: Result<T>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T> Drop for AsyncResolutionContext<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("Запрос для '{}' освобождён до завершения", self.name);
            callback(Err(MonikerError::GeneralResolution(format!(
                "запрос для '{}' брошен (abandoned)",
                self.name
            ))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn complete_fires_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let ctx = AsyncResolutionContext::new("file:/a", move |result: Result<u32>| {
            assert_eq!(result.unwrap(), 7);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        ctx.complete(Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_without_completion_reports_abandonment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let ctx = AsyncResolutionContext::new("file:/a", move |result: Result<u32>| {
            assert!(matches!(result, Err(MonikerError::GeneralResolution(_))));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ctx.name(), "file:/a");
        drop(ctx);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
