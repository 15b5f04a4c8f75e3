//! Renders the Control Deck UI tree using Iced widgets.

use super::{selection_hint, style, HybridDeck, Message, Party, PerformancePane, Tab};
use hybridcrypt_contract::EncryptionMode;
use hybridcrypt_core::perf::{PerformanceReport, TableRow};
use hybridcrypt_core::workflow::{
    ArtifactKind, DecryptionSummary, EncryptionSummary, Panel, RESET_CONFIRMATION,
};
use hybridcrypt_core::{Action, Alert, Step, StepIndicator};
use iced::alignment::Vertical;
use iced::widget::{
    button, column, container, pick_list, row, scrollable, text, text_input, Column, Row, Space,
    Stack,
};
use iced::{Alignment, Color, Element, Font, Length, Theme};

const PAD_ROOT: u16 = 12;
const PAD_CARD_Y: u16 = 12;
const PAD_CARD_X: u16 = 20;
const GAP_SECTION: u16 = 12;
const GAP_GROUP: u16 = 8;
const FONT_BODY: u16 = 14;
const FONT_MICRO: u16 = 11;
const HEADER_HEIGHT: f32 = 96.0;
const ALERT_WIDTH: f32 = 360.0;

pub(super) fn render(ui: &HybridDeck) -> Element<'_, Message> {
    // Root renderer: header, tab strip, then whichever tab is open.
    let body = match ui.tab {
        Tab::Process => render_process_tab(ui),
        Tab::Analysis => render_analysis_tab(ui),
    };

    let column = Column::new()
        .spacing(GAP_SECTION)
        .width(Length::Fill)
        .push(render_header(ui))
        .push(render_tabs(ui))
        .push(scrollable(body).height(Length::Fill));

    let base: Element<'_, Message> = container(column)
        .padding(PAD_ROOT)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(style::background())
        .into();

    let mut stack = Stack::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(base);

    if !ui.alerts.alerts().is_empty() {
        stack = stack.push(render_alert_stack(ui.alerts.alerts()));
    }
    if ui.reset_open {
        stack = stack.push(render_reset_overlay());
    }

    stack.into()
}

fn render_header(ui: &HybridDeck) -> Element<'_, Message> {
    let copy = column![
        text("HYBRIDCRYPT")
            .size(22)
            .font(Font::MONOSPACE)
            .style(text_color(style::TEAL)),
        text("ECDH key exchange · AES-192 file encryption")
            .size(FONT_BODY)
            .style(text_color(style::MUTED)),
    ]
    .spacing(4);

    let service = text(format!("service: {}", ui.service_label()))
        .size(FONT_MICRO)
        .font(Font::MONOSPACE)
        .style(text_color(if ui.gateway.is_ok() {
            style::GREEN
        } else {
            style::RED
        }));

    let reset_control = ui.coordinator.control(Action::Reset);
    let reset = button(
        text(reset_control.caption())
            .size(FONT_BODY)
            .style(text_color(style::TEXT_LIGHT)),
    )
    .padding([8, 18])
    .style(style::danger_button())
    .on_press_maybe(reset_control.enabled.then_some(Message::ResetPressed));

    let layout = Row::with_children(vec![
        copy.into(),
        Space::with_width(Length::Fill).into(),
        service.into(),
        reset.into(),
    ])
    .spacing(GAP_SECTION)
    .align_y(Vertical::Center)
    .height(Length::Fill);

    container(layout)
        .padding([PAD_CARD_Y, PAD_CARD_X])
        .height(Length::Fixed(HEADER_HEIGHT))
        .align_y(Vertical::Center)
        .style(style::header_card())
        .into()
}

fn render_tabs(ui: &HybridDeck) -> Element<'_, Message> {
    let tab = |label: &'static str, target: Tab| {
        button(text(label).size(FONT_BODY))
            .padding([6, 16])
            .style(style::tab_button(ui.tab == target))
            .on_press(Message::TabSelected(target))
    };
    row![
        tab("Proses Kriptografi", Tab::Process),
        tab("Analisis Performa", Tab::Analysis),
    ]
    .spacing(GAP_GROUP)
    .into()
}

fn render_process_tab(ui: &HybridDeck) -> Element<'_, Message> {
    let stepper = Row::with_children(
        ui.coordinator
            .indicators()
            .into_iter()
            .map(render_step_bubble)
            .collect::<Vec<_>>(),
    )
    .spacing(GAP_GROUP)
    .width(Length::Fill);

    let panel = match ui.coordinator.current_step() {
        Step::Generate => render_generate_step(ui),
        Step::Exchange => render_exchange_step(ui),
        Step::Encrypt => render_encrypt_step(ui),
        Step::Decrypt => render_decrypt_step(ui),
    };

    column![
        stepper,
        container(panel)
            .padding([PAD_CARD_Y, PAD_CARD_X])
            .width(Length::Fill)
            .style(style::panel_card()),
    ]
    .spacing(GAP_SECTION)
    .into()
}

fn render_step_bubble(indicator: StepIndicator) -> Element<'static, Message> {
    let label = column![
        text(format!("{}", indicator.step.number()))
            .size(18)
            .font(Font::MONOSPACE),
        text(indicator.step.title()).size(FONT_MICRO),
    ]
    .spacing(2)
    .align_x(Alignment::Center);

    // Locked steps stay inert; the coordinator refuses them anyway.
    button(container(label).center_x(Length::Fill))
        .padding([8, 10])
        .width(Length::FillPortion(1))
        .style(style::step_bubble(
            indicator.active,
            indicator.current,
            indicator.reachable,
        ))
        .on_press_maybe(
            indicator
                .reachable
                .then_some(Message::StepClicked(indicator.step)),
        )
        .into()
}

fn render_generate_step(ui: &HybridDeck) -> Element<'_, Message> {
    let mut body = Column::new()
        .spacing(GAP_SECTION)
        .push(step_heading(Step::Generate))
        .push(
            text("Buat pasangan kunci ECDH untuk Alice dan Bob.")
                .size(FONT_BODY)
                .style(text_color(style::MUTED)),
        )
        .push(render_action(ui, Action::GenerateKeys, Message::GeneratePressed));

    if let Some(result) = render_panel(&ui.coordinator.panels().keys, |keys| keys.lines()) {
        body = body.push(result);
    }
    body.into()
}

fn render_exchange_step(ui: &HybridDeck) -> Element<'_, Message> {
    let (alice, bob) = ui.coordinator.panels().public_keys();
    let have_keys = ui.coordinator.panels().key_pair().is_some();
    let keys = row![
        render_key_box("Kunci Publik Alice", alice, have_keys.then_some(Party::Alice)),
        render_key_box("Kunci Publik Bob", bob, have_keys.then_some(Party::Bob)),
    ]
    .spacing(GAP_SECTION);

    let mut body = Column::new()
        .spacing(GAP_SECTION)
        .push(step_heading(Step::Exchange))
        .push(keys)
        .push(render_action(ui, Action::ExchangeKeys, Message::ExchangePressed));

    if let Some(result) = render_panel(&ui.coordinator.panels().exchange, |ex| ex.lines()) {
        body = body.push(result);
    }
    body.into()
}

fn render_key_box<'a>(title: &'a str, pem: &'a str, copy: Option<Party>) -> Element<'a, Message> {
    let copy_button = button(text("Salin").size(FONT_MICRO))
        .padding([4, 10])
        .style(style::ghost_button())
        .on_press_maybe(copy.map(Message::CopyKey));

    let header = row![
        text(title).size(FONT_BODY).style(text_color(style::TEAL)),
        Space::with_width(Length::Fill),
        copy_button,
    ]
    .align_y(Vertical::Center);

    container(
        column![
            header,
            text(pem)
                .size(FONT_MICRO)
                .font(Font::MONOSPACE)
                .style(text_color(style::TEXT_LIGHT)),
        ]
        .spacing(GAP_GROUP),
    )
    .padding(10)
    .width(Length::FillPortion(1))
    .style(style::key_box())
    .into()
}

fn render_encrypt_step(ui: &HybridDeck) -> Element<'_, Message> {
    let mode = pick_list(
        EncryptionMode::ALL,
        Some(ui.coordinator.encryption_mode()),
        Message::ModeSelected,
    )
    .text_size(FONT_BODY)
    .padding([6, 10]);

    let mut body = Column::new()
        .spacing(GAP_SECTION)
        .push(step_heading(Step::Encrypt))
        .push(render_file_input(
            "Path file yang akan dienkripsi",
            &ui.encrypt_input,
            selection_hint(ui.coordinator.encrypt_selection(), &ui.encrypt_input),
            Message::EncryptPathChanged,
        ))
        .push(
            row![
                text("Mode").size(FONT_BODY).style(text_color(style::MUTED)),
                mode,
            ]
            .spacing(GAP_GROUP)
            .align_y(Vertical::Center),
        )
        .push(render_action(ui, Action::EncryptFile, Message::EncryptPressed));

    if let Some(result) = render_panel(&ui.coordinator.panels().encryption, |enc| enc.lines()) {
        body = body.push(result);
    }
    if ui.coordinator.artifact(ArtifactKind::Encrypted).is_some() {
        body = body.push(render_download(
            ui,
            ArtifactKind::Encrypted,
            EncryptionSummary::DOWNLOAD_LABEL,
        ));
    }
    body.into()
}

fn render_decrypt_step(ui: &HybridDeck) -> Element<'_, Message> {
    let mut body = Column::new()
        .spacing(GAP_SECTION)
        .push(step_heading(Step::Decrypt))
        .push(render_file_input(
            "Path file .enc yang akan didekripsi",
            &ui.decrypt_input,
            selection_hint(ui.coordinator.decrypt_selection(), &ui.decrypt_input),
            Message::DecryptPathChanged,
        ))
        .push(render_action(ui, Action::DecryptFile, Message::DecryptPressed));

    if let Some(result) = render_panel(&ui.coordinator.panels().decryption, |dec| dec.lines()) {
        body = body.push(result);
    }
    if ui.coordinator.artifact(ArtifactKind::Decrypted).is_some() {
        body = body.push(render_download(
            ui,
            ArtifactKind::Decrypted,
            DecryptionSummary::DOWNLOAD_LABEL,
        ));
    }
    body.into()
}

fn step_heading(step: Step) -> Element<'static, Message> {
    text(step.to_string())
        .size(20)
        .style(text_color(style::TEAL))
        .into()
}

fn render_action(ui: &HybridDeck, action: Action, message: Message) -> Element<'_, Message> {
    let control = ui.coordinator.control(action);
    button(
        text(control.caption())
            .size(FONT_BODY)
            .style(text_color(if control.enabled {
                style::TEXT_DARK
            } else {
                style::MUTED
            })),
    )
    .padding([8, 18])
    .style(style::action_button(control.enabled))
    .on_press_maybe(control.enabled.then_some(message))
    .into()
}

fn render_file_input<'a>(
    placeholder: &'a str,
    value: &'a str,
    hint: String,
    on_input: fn(String) -> Message,
) -> Element<'a, Message> {
    column![
        text_input(placeholder, value)
            .on_input(on_input)
            .padding(10)
            .size(FONT_BODY)
            .style(style::text_input()),
        text(hint).size(FONT_MICRO).style(text_color(style::MUTED)),
    ]
    .spacing(4)
    .into()
}

fn render_download<'a>(
    ui: &'a HybridDeck,
    kind: ArtifactKind,
    label: &'static str,
) -> Element<'a, Message> {
    let caption = if ui.downloading == Some(kind) {
        "Mengunduh..."
    } else {
        label
    };
    button(text(caption).size(FONT_BODY))
        .padding([6, 14])
        .style(style::ghost_button())
        .on_press_maybe(
            ui.downloading
                .is_none()
                .then_some(Message::DownloadPressed(kind)),
        )
        .into()
}

fn render_panel<'a, T>(
    panel: &'a Panel<T>,
    lines: impl Fn(&T) -> Vec<String>,
) -> Option<Element<'a, Message>> {
    let (content, failed) = match panel {
        Panel::Empty => return None,
        Panel::Ready(summary) => (lines(summary), false),
        Panel::Failed(message) => (vec![message.clone()], true),
    };
    let color = if failed { style::RED } else { style::TEXT_LIGHT };
    let lines = Column::with_children(
        content
            .into_iter()
            .map(|line| text(line).size(FONT_BODY).style(text_color(color)).into())
            .collect::<Vec<_>>(),
    )
    .spacing(4);

    Some(
        container(lines)
            .padding(12)
            .width(Length::Fill)
            .style(style::result_surface(failed))
            .into(),
    )
}

fn render_analysis_tab(ui: &HybridDeck) -> Element<'_, Message> {
    let loaded = matches!(ui.performance, PerformancePane::Loaded(_));
    let toolbar = row![
        text("Performance Analysis")
            .size(20)
            .style(text_color(style::TEAL)),
        Space::with_width(Length::Fill),
        button(text("Refresh").size(FONT_BODY))
            .padding([6, 14])
            .style(style::ghost_button())
            .on_press_maybe(
                (!matches!(ui.performance, PerformancePane::Loading))
                    .then_some(Message::RefreshPerformance),
            ),
        button(text(if ui.exporting { "Exporting..." } else { "Export" }).size(FONT_BODY))
            .padding([6, 14])
            .style(style::ghost_button())
            .on_press_maybe((loaded && !ui.exporting).then_some(Message::ExportPerformance)),
    ]
    .spacing(GAP_GROUP)
    .align_y(Vertical::Center);

    let content: Element<'_, Message> = match &ui.performance {
        PerformancePane::Idle => text("Open this tab to load performance data.")
            .size(FONT_BODY)
            .style(text_color(style::MUTED))
            .into(),
        PerformancePane::Loading => text("Loading performance data...")
            .size(FONT_BODY)
            .style(text_color(style::MUTED))
            .into(),
        PerformancePane::Failed(message) => text(message.as_str())
            .size(FONT_BODY)
            .style(text_color(style::RED))
            .into(),
        PerformancePane::Loaded(report) => render_report(report),
    };

    container(column![toolbar, content].spacing(GAP_SECTION))
        .padding([PAD_CARD_Y, PAD_CARD_X])
        .width(Length::Fill)
        .style(style::panel_card())
        .into()
}

fn render_report(report: &PerformanceReport) -> Element<'_, Message> {
    let tints = [style::TEAL, style::GREEN, style::AMBER, style::RED];
    let cards = Row::with_children(
        report
            .view
            .cards
            .iter()
            .zip(tints)
            .map(|(card, tint)| {
                container(
                    column![
                        text(card.value.to_string())
                            .size(26)
                            .font(Font::MONOSPACE)
                            .style(text_color(tint)),
                        text(card.title)
                            .size(FONT_MICRO)
                            .style(text_color(style::TEXT_LIGHT)),
                    ]
                    .spacing(4),
                )
                .padding(12)
                .width(Length::FillPortion(1))
                .style(style::stat_card(tint))
                .into()
            })
            .collect::<Vec<_>>(),
    )
    .spacing(GAP_SECTION);

    let header = table_line(
        ["Operation", "Timing", "Details", "Timestamp"],
        style::TEAL,
    );
    let mut table = Column::new().spacing(2).push(header);
    for (index, entry) in report.view.rows.iter().enumerate() {
        let line: Element<'_, Message> = match entry {
            TableRow::Entry(row) => table_line(
                [
                    row.operation.as_str(),
                    row.timing.as_str(),
                    row.details.as_str(),
                    row.timestamp.as_str(),
                ],
                style::TEXT_LIGHT,
            ),
            TableRow::Placeholder(label) => text(*label)
                .size(FONT_BODY)
                .style(text_color(style::MUTED))
                .into(),
        };
        table = table.push(
            container(line)
                .padding([6, 10])
                .width(Length::Fill)
                .style(style::table_row(index % 2 == 0)),
        );
    }

    column![cards, table].spacing(GAP_SECTION).into()
}

fn table_line<'a>(cells: [&'a str; 4], color: Color) -> Element<'a, Message> {
    let portions = [2, 3, 3, 2];
    Row::with_children(
        cells
            .into_iter()
            .zip(portions)
            .map(|(cell, portion)| {
                text(cell)
                    .size(FONT_MICRO)
                    .style(text_color(color))
                    .width(Length::FillPortion(portion))
                    .into()
            })
            .collect::<Vec<_>>(),
    )
    .spacing(GAP_GROUP)
    .into()
}

fn render_alert_stack(alerts: &[Alert]) -> Element<'_, Message> {
    // Newest notifications stack below older ones in the top-right corner.
    let cards = Column::with_children(
        alerts
            .iter()
            .map(|alert| {
                let dismiss = button(text("×").size(FONT_BODY))
                    .padding([0, 8])
                    .style(style::ghost_button())
                    .on_press(Message::DismissAlert(alert.id));
                container(
                    row![
                        text(alert.kind.tag())
                            .size(FONT_MICRO)
                            .font(Font::MONOSPACE)
                            .style(text_color(style::alert_tint(alert.kind))),
                        text(alert.message.as_str())
                            .size(FONT_BODY)
                            .style(text_color(style::TEXT_LIGHT))
                            .width(Length::Fill),
                        dismiss,
                    ]
                    .spacing(GAP_GROUP)
                    .align_y(Vertical::Center),
                )
                .padding(10)
                .width(Length::Fixed(ALERT_WIDTH))
                .style(style::alert_card(alert.kind))
                .into()
            })
            .collect::<Vec<_>>(),
    )
    .spacing(GAP_GROUP);

    container(cards)
        .padding([HEADER_HEIGHT as u16 + 24, 24])
        .width(Length::Fill)
        .align_x(Alignment::End)
        .into()
}

fn render_reset_overlay() -> Element<'static, Message> {
    // Confirmation modal for the destructive reset.
    let warning = column![
        text("RESET SYSTEM")
            .size(22)
            .style(text_color(style::RED)),
        text(RESET_CONFIRMATION)
            .size(FONT_BODY)
            .style(text_color(style::TEXT_LIGHT)),
    ]
    .spacing(GAP_GROUP);

    let buttons = row![
        button(text("Batal").size(14).style(text_color(style::TEXT_DARK)))
            .padding([8, 18])
            .style(style::action_button(true))
            .on_press(Message::ResetCancel),
        button(
            text("Reset")
                .size(14)
                .style(text_color(style::TEXT_LIGHT))
        )
        .padding([8, 18])
        .style(style::danger_button())
        .on_press(Message::ResetConfirm),
    ]
    .spacing(GAP_SECTION);

    let panel = container(column![warning, buttons].spacing(GAP_SECTION))
        .padding(18)
        .width(Length::Fixed(520.0))
        .style(style::modal_panel());

    container(panel)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(style::overlay_backdrop())
        .into()
}

fn text_color(color: Color) -> impl Fn(&Theme) -> iced::widget::text::Style + Copy {
    move |_| iced::widget::text::Style { color: Some(color) }
}
