//! Next-page control inspection.

use jobtrawl_browser::{ElementHandle, Result};

/// Attributes of a next-page control that can mark it disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextPageAttrs {
    /// `class` attribute
    pub class: Option<String>,
    /// `aria-disabled` attribute
    pub aria_disabled: Option<String>,
    /// Boolean `disabled` attribute; present means set
    pub disabled: Option<String>,
}

impl NextPageAttrs {
    /// Read the relevant attributes from a live element.
    pub async fn read<E: ElementHandle>(element: &E) -> Result<Self> {
        Ok(Self {
            class: element.attribute("class").await?,
            aria_disabled: element.attribute("aria-disabled").await?,
            disabled: element.attribute("disabled").await?,
        })
    }

    /// Whether the control signals there is no further page.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        let class_disabled = self
            .class
            .as_deref()
            .is_some_and(|class| class.contains("disabled"));
        let aria_disabled = self
            .aria_disabled
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        class_disabled || aria_disabled || self.disabled.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(class: Option<&str>, aria: Option<&str>, disabled: Option<&str>) -> NextPageAttrs {
        NextPageAttrs {
            class: class.map(str::to_string),
            aria_disabled: aria.map(str::to_string),
            disabled: disabled.map(str::to_string),
        }
    }

    #[test]
    fn test_enabled_control() {
        assert!(!attrs(Some("ui-icon-arrow-right"), None, None).is_disabled());
        assert!(!attrs(None, Some("false"), None).is_disabled());
        assert!(!NextPageAttrs::default().is_disabled());
    }

    #[test]
    fn test_disabled_by_class() {
        assert!(attrs(Some("next disabled"), None, None).is_disabled());
    }

    #[test]
    fn test_disabled_by_aria() {
        assert!(attrs(Some("next"), Some("true"), None).is_disabled());
    }

    #[test]
    fn test_disabled_attribute_without_value() {
        assert!(attrs(Some("next"), None, Some("")).is_disabled());
    }
}
