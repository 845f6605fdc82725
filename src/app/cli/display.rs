//! CLI display utilities for formatting output

use prettytable::{format, Cell, Row, Table};

use crate::core::styles::StyleRole;
use crate::plugin::api::{
    ActivationFailure, CapabilityDeclaration, DispatchReport, LifecycleState,
    OptionalPermissionGap, PermissionPrompt, PluginEntry, PluginKey,
};

const NONE: &str = "-";

fn cell(text: &str, role: StyleRole) -> Cell {
    let cell = Cell::new(text);
    match role.table_spec() {
        Some(spec) => cell.style_spec(spec),
        None => cell,
    }
}

fn title_row(titles: &[&str]) -> Row {
    Row::new(
        titles
            .iter()
            .map(|t| Cell::new(t).style_spec("bFy"))
            .collect(),
    )
}

fn joined<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if items.is_empty() {
        NONE.to_string()
    } else {
        items.join("\n")
    }
}

fn state_role(state: LifecycleState) -> StyleRole {
    match state {
        LifecycleState::Active => StyleRole::Active,
        LifecycleState::Bound => StyleRole::Pending,
        LifecycleState::Failed => StyleRole::Failed,
        LifecycleState::Destroyed => StyleRole::Dim,
    }
}

/// One row per registered plugin
pub fn plugin_table<'a>(entries: impl IntoIterator<Item = &'a PluginEntry>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(title_row(&[
        "Key",
        "Name",
        "Default",
        "Min platform",
        "Incoming",
        "Required permissions",
    ]));

    for entry in entries {
        let declaration = entry.declaration();
        table.add_row(Row::new(vec![
            cell(entry.key().as_str(), StyleRole::Key),
            Cell::new(&declaration.display_name),
            cell(
                if declaration.enabled_by_default { "on" } else { "off" },
                if declaration.enabled_by_default {
                    StyleRole::Active
                } else {
                    StyleRole::Dim
                },
            ),
            Cell::new(&declaration.min_platform_version.to_string()),
            Cell::new(&joined(&declaration.incoming_types)),
            Cell::new(&joined(&declaration.required_permissions)),
        ]));
    }
    table
}

/// Human-readable capability declaration
pub fn describe_text(key: PluginKey, declaration: &CapabilityDeclaration, use_color: bool) -> String {
    let flag = |value: bool| if value { "yes" } else { "no" };
    let list = |items: Vec<&String>| {
        if items.is_empty() {
            NONE.to_string()
        } else {
            items
                .into_iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    };

    let fields: Vec<(&str, String)> = vec![
        ("Key", key.to_string()),
        ("Name", declaration.display_name.clone()),
        ("Description", declaration.description.clone()),
        ("Action", declaration.action_name.clone()),
        (
            "Icon",
            declaration.icon.clone().unwrap_or_else(|| NONE.to_string()),
        ),
        ("Enabled by default", flag(declaration.enabled_by_default).to_string()),
        ("Min platform", declaration.min_platform_version.to_string()),
        ("Required", list(declaration.required_permissions.iter().collect())),
        ("Optional", list(declaration.optional_permissions.iter().collect())),
        ("Incoming", list(declaration.incoming_types.iter().collect())),
        ("Outgoing", list(declaration.outgoing_types.iter().collect())),
        (
            "Unbound messages",
            flag(declaration.accepts_unbound_peer_messages).to_string(),
        ),
        ("Settings", flag(declaration.has_settings).to_string()),
        ("Main action", flag(declaration.has_main_action).to_string()),
        ("Context menu", flag(declaration.display_in_context_menu).to_string()),
    ];

    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    fields
        .into_iter()
        .map(|(name, value)| {
            format!(
                "{} {}",
                StyleRole::Key.paint(&format!("{:<width$}", name, width = width), use_color),
                value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lifecycle state of every loaded plugin
pub fn state_table(states: &[(PluginKey, LifecycleState)]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(title_row(&["Plugin", "State"]));
    for (key, state) in states {
        table.add_row(Row::new(vec![
            cell(key.as_str(), StyleRole::Key),
            cell(&state.to_string(), state_role(*state)),
        ]));
    }
    table
}

fn prompt_lines(prompt: &PermissionPrompt) -> Vec<String> {
    vec![
        format!("  {} [{}] #{}", prompt.title, prompt.kind, prompt.request_code),
        format!("  {}", prompt.message),
        format!("  permissions: {}", prompt.permissions.join(", ")),
    ]
}

/// Failed activations and optional permission gaps, one block each
pub fn activation_report(
    failures: &[ActivationFailure],
    gaps: &[OptionalPermissionGap],
    use_color: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    for failure in failures {
        lines.push(format!(
            "{} {}: {}",
            StyleRole::Failed.paint("failed", use_color),
            failure.key,
            failure.message
        ));
        if let Some(prompt) = &failure.prompt {
            lines.extend(prompt_lines(prompt));
        }
    }
    for gap in gaps {
        lines.push(format!(
            "{} {}: missing optional permissions",
            StyleRole::Pending.paint("limited", use_color),
            gap.key
        ));
        lines.extend(prompt_lines(&gap.prompt));
    }
    lines
}

pub fn dispatch_line(report: &DispatchReport, use_color: bool) -> String {
    if report.delivered.is_empty() {
        return format!(
            "{} -> {}",
            report.packet_type,
            StyleRole::Dim.paint("no plugin", use_color)
        );
    }

    let targets: Vec<String> = report
        .delivered
        .iter()
        .map(|key| {
            if report.handled.contains(key) {
                StyleRole::Active.paint(key.as_str(), use_color)
            } else {
                format!("{} (ignored)", key)
            }
        })
        .collect();
    format!("{} -> {}", report.packet_type, targets.join(", "))
}
