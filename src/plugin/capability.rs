//! Capability declarations
//!
//! A declaration is type-level metadata: the registry reads it to build
//! feature lists, decide eligibility and build the routing table without
//! creating any plugin instance.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::key::PluginKey;

/// Platform level every plugin supports unless it declares otherwise
pub const BASE_PLATFORM_VERSION: u32 = 1;

/// Static description of what a plugin type consumes, produces and needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDeclaration {
    pub display_name: String,
    pub description: String,
    /// Label of the plugin's main action; defaults to the display name
    pub action_name: String,
    /// Icon resource reference, resolved by the presentation layer
    pub icon: Option<String>,
    pub enabled_by_default: bool,
    pub min_platform_version: u32,
    /// Checked in declaration order
    pub required_permissions: Vec<String>,
    /// Checked in declaration order
    pub optional_permissions: Vec<String>,
    pub incoming_types: BTreeSet<String>,
    pub outgoing_types: BTreeSet<String>,
    /// Plugin wants messages from peers that are not yet trusted
    pub accepts_unbound_peer_messages: bool,
    pub has_settings: bool,
    pub has_main_action: bool,
    pub display_in_context_menu: bool,
}

impl CapabilityDeclaration {
    pub fn builder(display_name: impl Into<String>) -> CapabilityBuilder {
        CapabilityBuilder::new(display_name.into())
    }

    /// Whether `packet_type` is in the incoming set
    pub fn accepts(&self, packet_type: &str) -> bool {
        self.incoming_types.contains(packet_type)
    }

    pub fn can_send(&self, packet_type: &str) -> bool {
        self.outgoing_types.contains(packet_type)
    }

    pub fn is_supported_on(&self, platform_version: u32) -> bool {
        platform_version >= self.min_platform_version
    }

    /// Check the declaration invariants for the plugin registered as `key`
    pub fn validate(&self, key: PluginKey) -> PluginResult<()> {
        let invalid = |cause: String| PluginError::InvalidDeclaration {
            key: key.to_string(),
            cause,
        };

        if self.display_name.trim().is_empty() {
            return Err(invalid("display name is empty".to_string()));
        }
        if let Some(overlap) = self
            .required_permissions
            .iter()
            .find(|p| self.optional_permissions.contains(p))
        {
            return Err(invalid(format!(
                "permission '{}' is both required and optional",
                overlap
            )));
        }
        if self
            .incoming_types
            .iter()
            .chain(self.outgoing_types.iter())
            .any(|t| t.trim().is_empty())
        {
            return Err(invalid("message type tags must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`CapabilityDeclaration`]
#[derive(Debug, Clone)]
pub struct CapabilityBuilder {
    declaration: CapabilityDeclaration,
    action_name: Option<String>,
}

impl CapabilityBuilder {
    fn new(display_name: String) -> Self {
        Self {
            declaration: CapabilityDeclaration {
                display_name,
                description: String::new(),
                action_name: String::new(),
                icon: None,
                enabled_by_default: true,
                min_platform_version: BASE_PLATFORM_VERSION,
                required_permissions: Vec::new(),
                optional_permissions: Vec::new(),
                incoming_types: BTreeSet::new(),
                outgoing_types: BTreeSet::new(),
                accepts_unbound_peer_messages: false,
                has_settings: false,
                has_main_action: false,
                display_in_context_menu: false,
            },
            action_name: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.declaration.description = description.into();
        self
    }

    pub fn action_name(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.declaration.icon = Some(icon.into());
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.declaration.enabled_by_default = enabled;
        self
    }

    pub fn min_platform_version(mut self, version: u32) -> Self {
        self.declaration.min_platform_version = version;
        self
    }

    pub fn incoming<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration
            .incoming_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn outgoing<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration
            .outgoing_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn required_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.declaration.required_permissions, permissions);
        self
    }

    pub fn optional_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.declaration.optional_permissions, permissions);
        self
    }

    pub fn accepts_unbound_peer_messages(mut self, accepts: bool) -> Self {
        self.declaration.accepts_unbound_peer_messages = accepts;
        self
    }

    pub fn has_settings(mut self, has_settings: bool) -> Self {
        self.declaration.has_settings = has_settings;
        self
    }

    pub fn has_main_action(mut self, has_main_action: bool) -> Self {
        self.declaration.has_main_action = has_main_action;
        self
    }

    pub fn display_in_context_menu(mut self, in_menu: bool) -> Self {
        self.declaration.display_in_context_menu = in_menu;
        self
    }

    pub fn build(self) -> CapabilityDeclaration {
        let mut declaration = self.declaration;
        declaration.action_name = self
            .action_name
            .unwrap_or_else(|| declaration.display_name.clone());
        declaration
    }
}

// keeps first-seen order, which is the evaluation order for permission checks
fn push_unique<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for item in items {
        let item = item.into();
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
