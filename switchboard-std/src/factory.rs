//! Callback factories.
//!
//! A custom action is persisted as the name of the factory that built its
//! callback plus the arguments it was built with. Rebuilding never
//! evaluates stored code: an unknown factory name simply fails.

use std::{collections::HashMap, fmt, sync::Arc};
use switchboard_core::{BoxError, Callback, Payload, ReconstructionError};

type FactoryFn = dyn Fn(Option<&Payload>) -> Result<Callback, BoxError> + Send + Sync;

/// Builds a callback from persisted arguments.
#[derive(Clone)]
pub struct CallbackFactory(Arc<FactoryFn>);

impl CallbackFactory {
    /// Wrap a factory function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Payload>) -> Result<Callback, BoxError> + Send + Sync + 'static,
    {
        let inner: Arc<FactoryFn> = Arc::new(f);
        Self(inner)
    }

    /// Build a callback.
    pub fn build(&self, args: Option<&Payload>) -> Result<Callback, BoxError> {
        (self.0)(args)
    }
}

impl fmt::Debug for CallbackFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackFactory(..)")
    }
}

/// A factory registered at compile time with `submit_factory!`.
#[cfg(feature = "inventory")]
pub struct StaticFactory {
    /// Factory name.
    pub name: &'static str,
    /// Factory function.
    pub build: fn(Option<&Payload>) -> Result<Callback, BoxError>,
}

#[cfg(feature = "inventory")]
inventory::collect!(StaticFactory);

/// Register a callback factory for every broker in the program.
///
/// # Example
///
/// ```rust,ignore
/// fn log_factory(args: Option<&Payload>) -> Result<Callback, BoxError> { ... }
///
/// switchboard::submit_factory!("log", log_factory);
/// ```
#[cfg(feature = "inventory")]
#[macro_export]
macro_rules! submit_factory {
    ($name:expr, $build:expr) => {
        $crate::inventory::submit! {
            $crate::factory::StaticFactory { name: $name, build: $build }
        }
    };
}

/// Named callback factories.
///
/// Lookups check factories registered on this instance first, then (with
/// the `inventory` feature) factories submitted with `submit_factory!`.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, CallbackFactory>,
}

impl FactoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, returning the one it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: CallbackFactory,
    ) -> Option<CallbackFactory> {
        self.factories.insert(name.into(), factory)
    }

    /// Look up a factory by name.
    pub fn get(&self, name: &str) -> Option<CallbackFactory> {
        if let Some(factory) = self.factories.get(name) {
            return Some(factory.clone());
        }
        #[cfg(feature = "inventory")]
        {
            if let Some(registered) = inventory::iter::<StaticFactory>
                .into_iter()
                .find(|registered| registered.name == name)
            {
                return Some(CallbackFactory::new(registered.build));
            }
        }
        None
    }

    /// Returns `true` if a factory with this name is available.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Build a callback with the named factory.
    pub fn build(&self, name: &str, args: Option<&Payload>) -> Result<Callback, ReconstructionError> {
        let factory = self
            .get(name)
            .ok_or_else(|| ReconstructionError::UnknownFactory(name.to_string()))?;
        factory
            .build(args)
            .map_err(|source| ReconstructionError::Factory {
                factory: name.to_string(),
                source,
            })
    }

    /// Number of factories registered on this instance.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no factory is registered on this instance.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
