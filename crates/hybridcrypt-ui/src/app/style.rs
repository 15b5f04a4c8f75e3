//! HybridCrypt deck palette and widget styles.

use hybridcrypt_core::AlertKind;
use iced::border::{Border, Radius};
use iced::widget::button::{Status as ButtonStatus, Style as ButtonStyle};
use iced::widget::container;
use iced::widget::text_input::{self, Status as InputStatus};
use iced::{Background, Color, Shadow, Theme};

const INK: Color = Color {
    r: 0.027,
    g: 0.055,
    b: 0.078,
    a: 1.0,
};
const DEPTH: Color = Color {
    r: 0.047,
    g: 0.09,
    b: 0.122,
    a: 1.0,
};
const WELL: Color = Color {
    r: 0.035,
    g: 0.071,
    b: 0.098,
    a: 1.0,
};
const RIM: Color = Color {
    r: 0.169,
    g: 0.239,
    b: 0.298,
    a: 1.0,
};
const VIOLET: Color = Color {
    r: 0.655,
    g: 0.545,
    b: 0.98,
    a: 1.0,
};
const SLATE: Color = Color {
    r: 0.141,
    g: 0.188,
    b: 0.267,
    a: 1.0,
};
pub(super) const TEAL: Color = Color {
    r: 0.176,
    g: 0.831,
    b: 0.749,
    a: 1.0,
};
pub(super) const GREEN: Color = Color {
    r: 0.29,
    g: 0.871,
    b: 0.502,
    a: 1.0,
};
pub(super) const RED: Color = Color {
    r: 0.957,
    g: 0.247,
    b: 0.369,
    a: 1.0,
};
pub(super) const AMBER: Color = Color {
    r: 0.984,
    g: 0.749,
    b: 0.141,
    a: 1.0,
};
pub(super) const MUTED: Color = Color {
    r: 0.486,
    g: 0.541,
    b: 0.647,
    a: 1.0,
};
pub(super) const TEXT_LIGHT: Color = Color {
    r: 0.902,
    g: 0.957,
    b: 0.945,
    a: 1.0,
};
pub(super) const TEXT_DARK: Color = Color {
    r: 0.016,
    g: 0.102,
    b: 0.09,
    a: 1.0,
};

fn faded(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}

/// Rounded container with a solid fill and an outline.
fn surface(fill: Color, edge: Color, width: f32, radius: f32) -> container::Style {
    container::Style {
        background: Some(Background::Color(fill)),
        border: Border {
            radius: Radius::from(radius),
            width,
            color: edge,
        },
        ..Default::default()
    }
}

fn glowing(style: container::Style, tint: Color, blur_radius: f32) -> container::Style {
    container::Style {
        shadow: Shadow {
            color: faded(tint, 0.2),
            blur_radius,
            ..Default::default()
        },
        ..style
    }
}

fn pill(fill: Color, edge: Color, width: f32, text_color: Color) -> ButtonStyle {
    ButtonStyle {
        background: Some(Background::Color(fill)),
        border: Border {
            radius: Radius::from(6.0),
            width,
            color: edge,
        },
        text_color,
        ..ButtonStyle::default()
    }
}

pub(super) fn background() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| container::Style {
        background: Some(Background::Color(INK)),
        ..Default::default()
    }
}

pub(super) fn header_card() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| glowing(surface(DEPTH, TEAL, 1.5, 12.0), TEAL, 18.0)
}

pub(super) fn panel_card() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| surface(DEPTH, faded(TEAL, 0.35), 1.0, 10.0)
}

/// Result area under a step action; red outline once the action failed.
pub(super) fn result_surface(failed: bool) -> impl Fn(&Theme) -> container::Style + Copy {
    let edge = faded(if failed { RED } else { GREEN }, 0.5);
    move |_| surface(WELL, edge, 1.0, 8.0)
}

pub(super) fn key_box() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| surface(WELL, RIM, 1.0, 6.0)
}

pub(super) fn stat_card(tint: Color) -> impl Fn(&Theme) -> container::Style + Copy {
    move |_| glowing(surface(faded(tint, 0.08), faded(tint, 0.5), 1.0, 10.0), tint, 8.0)
}

pub(super) fn table_row(even: bool) -> impl Fn(&Theme) -> container::Style + Copy {
    let fill = if even { DEPTH } else { WELL };
    move |_| surface(fill, Color::TRANSPARENT, 0.0, 4.0)
}

pub(super) fn alert_card(kind: AlertKind) -> impl Fn(&Theme) -> container::Style + Copy {
    let tint = alert_tint(kind);
    move |_| glowing(surface(faded(INK, 0.95), tint, 1.0, 8.0), tint, 10.0)
}

pub(super) fn alert_tint(kind: AlertKind) -> Color {
    match kind {
        AlertKind::Info => TEAL,
        AlertKind::Success => GREEN,
        AlertKind::Warning => AMBER,
        AlertKind::Error => RED,
    }
}

/// Stepper bubble. Violet marks the open step, teal the unlocked ones.
pub(super) fn step_bubble(
    active: bool,
    current: bool,
    reachable: bool,
) -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| {
        let edge = match (current, active, reachable) {
            (true, _, _) => VIOLET,
            (_, true, _) => TEAL,
            (_, _, true) => faded(TEAL, 0.55),
            _ => SLATE,
        };
        let fill = match status {
            ButtonStatus::Hovered | ButtonStatus::Pressed if reachable => faded(edge, 0.14),
            _ if current => faded(VIOLET, 0.1),
            _ => WELL,
        };
        let label = if active || reachable { TEXT_LIGHT } else { MUTED };
        let mut style = pill(fill, edge, if current { 2.0 } else { 1.0 }, label);
        style.border.radius = Radius::from(24.0);
        style
    }
}

pub(super) fn tab_button(active: bool) -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, _status| {
        if active {
            pill(faded(TEAL, 0.16), TEAL, 1.0, TEAL)
        } else {
            pill(Color::TRANSPARENT, Color::TRANSPARENT, 0.0, MUTED)
        }
    }
}

pub(super) fn action_button(enabled: bool) -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| match (enabled, status) {
        (false, _) => pill(SLATE, SLATE, 0.0, MUTED),
        (true, ButtonStatus::Pressed) => pill(faded(TEAL, 0.75), TEAL, 0.0, TEXT_DARK),
        (true, _) => pill(TEAL, TEAL, 0.0, TEXT_DARK),
    }
}

pub(super) fn danger_button() -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| {
        let fill = if matches!(status, ButtonStatus::Pressed) {
            faded(RED, 0.7)
        } else {
            RED
        };
        pill(fill, RED, 0.0, TEXT_LIGHT)
    }
}

pub(super) fn ghost_button() -> impl Fn(&Theme, ButtonStatus) -> ButtonStyle + Copy {
    move |_theme, status| {
        let fill = match status {
            ButtonStatus::Hovered | ButtonStatus::Pressed => faded(TEAL, 0.1),
            _ => Color::TRANSPARENT,
        };
        pill(fill, faded(TEAL, 0.45), 1.0, TEAL)
    }
}

pub(super) fn text_input() -> impl Fn(&Theme, InputStatus) -> text_input::Style + Copy {
    move |_theme, status| text_input::Style {
        background: Background::Color(WELL),
        border: Border {
            radius: Radius::from(6.0),
            width: 1.0,
            color: if matches!(status, InputStatus::Focused) {
                TEAL
            } else {
                RIM
            },
        },
        icon: MUTED,
        placeholder: MUTED,
        value: TEXT_LIGHT,
        selection: faded(TEAL, 0.4),
    }
}

pub(super) fn overlay_backdrop() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| container::Style {
        background: Some(Background::Color(faded(INK, 0.7))),
        ..Default::default()
    }
}

/// Reset confirmation dialog.
pub(super) fn modal_panel() -> impl Fn(&Theme) -> container::Style + Copy {
    |_| glowing(surface(DEPTH, RED, 1.0, 12.0), RED, 16.0)
}
