//! Utility macros for reducing boilerplate

/// Implement `FromRef<AppState>` for a state field so handlers can extract
/// it directly.
///
/// ```ignore
/// impl_from_ref!(Arc<CatalogServices>, services);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for Arc<CatalogServices> {
///     fn from_ref(state: &AppState) -> Self {
///         state.services.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}
