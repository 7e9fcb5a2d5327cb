//! The host plugin platform, seen from the broker.

use std::collections::HashSet;

/// The declared type of a loaded plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// A foundational, always-resident component.
    Core,
    /// Any other plugin type, keyed by its declared type string.
    Extension(String),
}

impl PluginKind {
    /// Maps a declared type string onto a kind. Only `"core"` is core.
    pub fn parse(declared: &str) -> Self {
        match declared {
            "core" => PluginKind::Core,
            other => PluginKind::Extension(other.to_string()),
        }
    }

    /// Returns `true` for core plugins.
    pub fn is_core(&self) -> bool {
        matches!(self, PluginKind::Core)
    }
}

/// The platform that creates plugin instances and assigns their ids.
pub trait PluginHost {
    /// Ids of every currently loaded plugin.
    fn plugin_ids(&self) -> Vec<String>;

    /// The declared kind of a plugin, or `None` if the id is unknown.
    fn plugin_kind(&self, id: &str) -> Option<PluginKind>;

    /// Ids of the loaded plugins whose kind is [`PluginKind::Core`].
    fn core_plugins(&self) -> HashSet<String> {
        self.plugin_ids()
            .into_iter()
            .filter(|id| self.plugin_kind(id).is_some_and(|kind| kind.is_core()))
            .collect()
    }
}
