use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque conversation identifier (a peer or group address, e.g. `sip:alice@example.org`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        ConversationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name derived from the address itself.
    ///
    /// `"Alice" <sip:alice@host>` yields `Alice`, `sip:alice@host` yields `alice`.
    /// Anything that doesn't look like an address is returned as-is.
    pub fn fallback_display_name(&self) -> String {
        let raw = self.0.trim();

        if let Some(lt) = raw.find('<') {
            let name = raw[..lt].trim().trim_matches('"').trim();
            if !name.is_empty() {
                return name.to_string();
            }
            let inner = raw[lt + 1..].trim_end_matches('>');
            return user_part(inner).to_string();
        }

        user_part(raw).to_string()
    }
}

fn user_part(addr: &str) -> &str {
    let without_scheme = ["sips:", "sip:", "tel:"]
        .iter()
        .find_map(|scheme| addr.strip_prefix(scheme))
        .unwrap_or(addr);
    let user = without_scheme.split('@').next().unwrap_or(without_scheme);
    if user.is_empty() {
        addr
    } else {
        user
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        ConversationId(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        ConversationId(s)
    }
}

/// What the list shows under the conversation name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text")]
pub enum LastMessagePreview {
    #[serde(rename = "text")]
    Text(String),
    /// Last message carried a file transfer or external body.
    #[serde(rename = "attachment")]
    Attachment,
    #[serde(rename = "none")]
    Empty,
}

impl LastMessagePreview {
    /// Truncate text previews to `max_chars`, appending an ellipsis.
    pub fn truncated(&self, max_chars: usize) -> LastMessagePreview {
        match self {
            LastMessagePreview::Text(text) if text.chars().count() > max_chars => {
                let keep = max_chars.saturating_sub(1);
                let mut out: String = text.chars().take(keep).collect();
                out.push('…');
                LastMessagePreview::Text(out)
            }
            other => other.clone(),
        }
    }
}

/// Per-conversation data resolved from the messaging core (not persisted here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub display_name: String,
    pub last_message_preview: LastMessagePreview,
    pub last_message_timestamp: i64,
    pub unread_count: u32,
    pub participant_count: u32,
}

impl ConversationSummary {
    pub fn is_group(&self) -> bool {
        self.participant_count > 1
    }

    /// Resolved display name, or one derived from the address when empty.
    pub fn effective_display_name(&self) -> String {
        if self.display_name.trim().is_empty() {
            self.id.fallback_display_name()
        } else {
            self.display_name.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Derived display state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadBadge {
    pub count: u32,
    pub label: String,
    /// Render with reduced text size (count above the configured cap).
    pub compact: bool,
}

impl UnreadBadge {
    pub fn new(count: u32, cap: u32) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(UnreadBadge {
            count,
            label: count.to_string(),
            compact: count > cap,
        })
    }
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationRow {
    pub id: ConversationId,
    pub display_name: String,
    pub preview: LastMessagePreview,
    pub timestamp: i64,
    /// Hidden while in edit mode.
    pub unread_badge: Option<UnreadBadge>,
    /// Bold name when there are unread messages.
    pub emphasized: bool,
    pub is_group: bool,
    /// `Some` only in edit mode, where the checkbox is shown.
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditToolbar {
    pub select_all_visible: bool,
    pub deselect_all_visible: bool,
    pub delete_enabled: bool,
}

/// Everything a declarative renderer needs for one frame of the list screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListDisplay {
    pub empty: bool,
    pub edit_mode: bool,
    pub edit_enabled: bool,
    pub rows: Vec<ConversationRow>,
    /// `None` outside edit mode.
    pub toolbar: Option<EditToolbar>,
}
