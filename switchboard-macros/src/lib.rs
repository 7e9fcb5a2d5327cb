//! Procedural macros for Switchboard.
//!
//! - `#[capabilities]` - Derives `Capabilities` from an inherent `impl` block

use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

mod capabilities;

/// Derives `switchboard::Capabilities` from an inherent `impl` block.
///
/// Every method taking `&self` and at most one `Option<&Payload>` argument
/// becomes an action named after the method. Methods without a receiver,
/// and methods named `new` or `init`, are left out.
///
/// # Attributes
///
/// - `events = ["a", "b"]` on the block declares the events the plugin
///   may publish.
/// - `#[action(skip)]` on a method leaves it out.
/// - `#[action(rename = "name")]` on a method changes its action name.
///
/// # Example
///
/// ```rust,ignore
/// struct Clock;
///
/// #[switchboard::capabilities(events = ["tick"])]
/// impl Clock {
///     fn reset(&self, payload: Option<&Payload>) -> Result<(), BoxError> { ... }
///
///     #[action(skip)]
///     fn internal(&self) {}
/// }
/// ```
#[proc_macro_attribute]
pub fn capabilities(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as capabilities::CapabilitiesArgs);
    let mut input = parse_macro_input!(item as ItemImpl);

    match capabilities::expand(args, &mut input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}
