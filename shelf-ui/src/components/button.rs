//! Buttons

use dioxus::prelude::*;

/// Unstyled button carrying the accessibility attributes.
///
/// Used by [`Button`] and directly where a plain icon button is needed.
#[component]
pub fn ChromelessButton(
    #[props(default)] disabled: bool,
    #[props(default)] class: Option<String>,
    #[props(default)] r#type: Option<&'static str>,
    #[props(default)] title: Option<String>,
    #[props(default)] aria_label: Option<String>,
    onclick: EventHandler<MouseEvent>,
    children: Element,
) -> Element {
    rsx! {
        button {
            class: class.as_deref(),
            r#type: r#type.unwrap_or("button"),
            disabled,
            title: title.as_deref(),
            aria_label: aria_label.as_deref(),
            aria_disabled: if disabled { Some("true") } else { None },
            onclick: move |e| {
                if !disabled {
                    onclick.call(e);
                }
            },
            {children}
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ButtonVariant {
    /// Confirming actions: save, search
    Primary,
    /// Cancel and close
    Secondary,
    /// Delete
    Danger,
}

impl ButtonVariant {
    fn class(self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary",
            Self::Secondary => "btn btn-secondary",
            Self::Danger => "btn btn-danger",
        }
    }
}

#[component]
pub fn Button(
    variant: ButtonVariant,
    #[props(default)] disabled: bool,
    /// Shows a spinner and blocks clicks while an action is in flight
    #[props(default)]
    loading: bool,
    #[props(default)] r#type: Option<&'static str>,
    #[props(default)] class: Option<String>,
    onclick: EventHandler<MouseEvent>,
    children: Element,
) -> Element {
    let class = match &class {
        Some(extra) => format!("{} {extra}", variant.class()),
        None => variant.class().to_string(),
    };

    rsx! {
        ChromelessButton {
            disabled: disabled || loading,
            class: Some(class),
            r#type,
            onclick,
            if loading {
                i { class: "fa-solid fa-spinner fa-spin" }
            }
            {children}
        }
    }
}
