//! Supplier bundle.
//!
//! Suppliers are the caller's fetch functions. The orchestrator only decides
//! when to call them and what to do with their results.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::page::PageState;

/// Boxed future returned by every supplier.
pub type SupplierFuture<T, E> = Pin<Box<dyn Future<Output = Result<PageState<T>, E>> + Send>>;

type FetchFn<U, T, E> = Arc<dyn Fn(U) -> SupplierFuture<T, E> + Send + Sync>;
type FetchPageFn<U, T, E> = Arc<dyn Fn(U, u32) -> SupplierFuture<T, E> + Send + Sync>;

/// The three fetch functions an orchestrator drives.
///
/// - `get` performs the initial load.
/// - `refresh` reloads from scratch; its result has the same shape as `get`.
/// - `load_more` is told which page to fetch next.
pub struct Suppliers<U, T, E> {
    get: FetchFn<U, T, E>,
    refresh: FetchFn<U, T, E>,
    load_more: FetchPageFn<U, T, E>,
}

impl<U, T, E> Suppliers<U, T, E>
where
    U: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Build a bundle from suppliers that take the trigger payload.
    pub fn new<G, GF, R, RF, M, MF>(get: G, refresh: R, load_more: M) -> Self
    where
        G: Fn(U) -> GF + Send + Sync + 'static,
        GF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
        R: Fn(U) -> RF + Send + Sync + 'static,
        RF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
        M: Fn(U, u32) -> MF + Send + Sync + 'static,
        MF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
    {
        Self {
            get: Arc::new(move |arg| -> SupplierFuture<T, E> { Box::pin(get(arg)) }),
            refresh: Arc::new(move |arg| -> SupplierFuture<T, E> { Box::pin(refresh(arg)) }),
            load_more: Arc::new(move |arg, page| -> SupplierFuture<T, E> {
                Box::pin(load_more(arg, page))
            }),
        }
    }

    pub(crate) fn get(&self, arg: U) -> SupplierFuture<T, E> {
        (self.get)(arg)
    }

    pub(crate) fn refresh(&self, arg: U) -> SupplierFuture<T, E> {
        (self.refresh)(arg)
    }

    pub(crate) fn load_more(&self, arg: U, page: u32) -> SupplierFuture<T, E> {
        (self.load_more)(arg, page)
    }
}

impl<T, E> Suppliers<(), T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Build a bundle from suppliers that take no payload.
    ///
    /// Triggers for the resulting orchestrator carry `()`.
    pub fn unit<G, GF, R, RF, M, MF>(get: G, refresh: R, load_more: M) -> Self
    where
        G: Fn() -> GF + Send + Sync + 'static,
        GF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
        R: Fn() -> RF + Send + Sync + 'static,
        RF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
        M: Fn(u32) -> MF + Send + Sync + 'static,
        MF: Future<Output = Result<PageState<T>, E>> + Send + 'static,
    {
        Self::new(
            move |()| get(),
            move |()| refresh(),
            move |(), page| load_more(page),
        )
    }
}

impl<U, T, E> Clone for Suppliers<U, T, E> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            refresh: Arc::clone(&self.refresh),
            load_more: Arc::clone(&self.load_more),
        }
    }
}

impl<U, T, E> std::fmt::Debug for Suppliers<U, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suppliers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unit_suppliers_ignore_payload() {
        let suppliers = Suppliers::<(), u32, String>::unit(
            || async { Ok(PageState::new(1, vec![1])) },
            || async { Ok(PageState::new(1, vec![2])) },
            |page| async move { Ok(PageState::new(page, vec![page])) },
        );

        assert_eq!(suppliers.get(()).await.unwrap().items(), &[1]);
        assert_eq!(suppliers.refresh(()).await.unwrap().items(), &[2]);
        assert_eq!(suppliers.load_more((), 5).await.unwrap(), PageState::new(5, vec![5]));
    }

    #[tokio::test]
    async fn payload_reaches_supplier() {
        let suppliers = Suppliers::<&'static str, String, ()>::new(
            |query| async move { Ok(PageState::new(1, vec![format!("get:{query}")])) },
            |query| async move { Ok(PageState::new(1, vec![format!("refresh:{query}")])) },
            |query, page| async move { Ok(PageState::new(page, vec![format!("{query}@{page}")])) },
        );

        assert_eq!(suppliers.get("rust").await.unwrap().items(), &["get:rust".to_string()]);
        assert_eq!(
            suppliers.load_more("rust", 2).await.unwrap().items(),
            &["rust@2".to_string()]
        );
    }
}
