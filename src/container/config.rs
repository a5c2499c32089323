//! Container configuration.

use serde::{Deserialize, Serialize};

use crate::types::{Align, FlexDirection, FlexWrap, JustifyContent};

/// Container-level flex properties, applied to the root layout node.
///
/// Missing fields deserialize to their defaults, so a host preset only needs
/// to name what it changes:
///
/// ```
/// use flexbox_container::{ContainerConfig, FlexDirection, FlexWrap};
///
/// let config: ContainerConfig = serde_json::from_str(r#"{ "flex_wrap": "wrap" }"#).unwrap();
/// assert_eq!(config.direction, FlexDirection::Row);
/// assert_eq!(config.flex_wrap, FlexWrap::Wrap);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub direction: FlexDirection,
    pub justify_content: JustifyContent,
    pub align_items: Align,
    pub align_content: Align,
    pub flex_wrap: FlexWrap,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            direction: FlexDirection::Row,
            justify_content: JustifyContent::FlexStart,
            align_items: Align::FlexStart,
            align_content: Align::FlexStart,
            flex_wrap: FlexWrap::NoWrap,
        }
    }
}
