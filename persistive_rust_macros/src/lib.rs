mod record;

use proc_macro::TokenStream;

/// Derive macro for implementing the `Record` trait.
///
/// # Usage
///
/// ```ignore
/// use persistive_rust::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Serialize, Deserialize, Record)]
/// #[record(store_id = "todos")]
/// pub struct Todo {
///     #[record(id)]
///     pub key: String,
///     pub title: String,
///     pub done: bool,
/// }
/// ```
///
/// - `#[record(store_id = "...")]` sets the default namespace used when the
///   collection options don't name one. If omitted, there is no default.
/// - `#[record(id)]` marks the field used as the unique identifier.
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
