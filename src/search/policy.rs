//! Visibility policy / 可见性策略
//!
//! Rules, in order:
//! 1. category hidden platform-wide -> suppress, whatever the hit says
//! 2. visible hit -> show
//! 3. hidden hit -> dimmed for elevated callers, suppressed otherwise

use super::schema::{Permission, PolicyDecision, RenderStyle, Visibility};

/// Decide how a hit is presented / 决定命中的呈现方式
pub fn decide(hit: Visibility, permission: Permission, category_visible: bool) -> PolicyDecision {
    if !category_visible {
        return PolicyDecision::Suppress;
    }
    match (hit, permission) {
        (Visibility::Visible, _) => PolicyDecision::Show,
        (Visibility::Hidden, Permission::Elevated) => PolicyDecision::ShowDimmed,
        (Visibility::Hidden, Permission::Standard) => PolicyDecision::Suppress,
    }
}

impl PolicyDecision {
    /// Render style for kept hits, `None` when suppressed / 对应的渲染样式
    pub fn style(self) -> Option<RenderStyle> {
        match self {
            PolicyDecision::Show => Some(RenderStyle::Normal),
            PolicyDecision::ShowDimmed => Some(RenderStyle::Dimmed),
            PolicyDecision::Suppress => None,
        }
    }
}
