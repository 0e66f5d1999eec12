//! egui front end over [`UploadController`].

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use client_core::{
    config::{normalize_server_url, Settings},
    controller::{NotificationKind, Section, StatusSeverity},
    resolve_link, UploadController,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Layout, NotificationId, PaperFormat, Selection, VectorFormat},
    i18n::{text, Locale, MessageKey},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    orchestration::dispatch_backend_command,
    reducer::{apply_ui_event, BackendStatus},
};
use crate::PersistedGuiSettings;

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);
const DROP_ZONE_HEIGHT: f32 = 96.0;

pub struct AcademicPlotApp {
    controller: UploadController,
    backend: BackendStatus,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    download_dir: PathBuf,
    server_url_input: String,
    download_dir_input: String,
    settings_open: bool,
}

impl AcademicPlotApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, settings: &Settings) -> Self {
        Self {
            controller: UploadController::new(settings.locale),
            backend: BackendStatus::default(),
            cmd_tx,
            ui_rx,
            server_url: settings.server_url.clone(),
            download_dir: settings.download_dir.clone(),
            server_url_input: settings.server_url.clone(),
            download_dir_input: settings.download_dir.display().to_string(),
            settings_open: false,
        }
    }

    pub fn persisted_settings(&self) -> PersistedGuiSettings {
        PersistedGuiSettings {
            locale: self.controller.locale(),
            server_url: self.server_url.clone(),
            download_dir: self.download_dir.clone(),
        }
    }

    fn t(&self, key: MessageKey) -> &'static str {
        text(self.controller.locale(), key)
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.controller, &mut self.backend, event);
        }
        self.controller.notifications_mut().expire(Instant::now());
    }

    fn select_path(&mut self, path: &Path) {
        match Selection::from_path(path) {
            Ok(selection) => {
                if let Err(err) = self.controller.select_file(Some(selection)) {
                    tracing::warn!(path = %path.display(), "rejected selection: {err}");
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read selection: {err}");
                self.controller
                    .report_error(None, format!("{}: {err}", path.display()));
            }
        }
    }

    fn pick_file(&mut self) {
        if self.controller.is_processing() {
            return;
        }
        let picked = rfd::FileDialog::new()
            .add_filter("Python", &["py"])
            .pick_file();
        match picked {
            Some(path) => self.select_path(&path),
            None => {
                let _ = self.controller.select_file(None);
            }
        }
    }

    fn start_processing(&mut self) {
        if let Some(request) = self.controller.start_processing() {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::StartRun(request),
                &mut self.controller,
            );
        }
    }

    fn download_result(&mut self) {
        let Some(result) = self.controller.result() else {
            return;
        };
        let cmd = BackendCommand::Download {
            download_url: result.download_url.clone(),
            dest_dir: self.download_dir.clone(),
        };
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.controller);
    }

    fn apply_settings(&mut self) {
        let server_url = normalize_server_url(&self.server_url_input);
        if let Err(err) = resolve_link(&server_url, "/") {
            tracing::warn!(%server_url, "rejected server url: {}", err.message);
            self.controller.report_error(None, err.message);
        } else {
            if server_url != self.server_url {
                self.server_url = server_url.clone();
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SetServerUrl { server_url },
                    &mut self.controller,
                );
            }
            self.server_url_input = self.server_url.clone();
        }

        let download_dir = self.download_dir_input.trim();
        if !download_dir.is_empty() {
            self.download_dir = PathBuf::from(download_dir);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (browse, start) = ctx.input_mut(|input| {
            (
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::U),
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter),
            )
        });
        if browse {
            self.pick_file();
        }
        if start {
            self.start_processing();
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| first_dropped_path(&input.raw.dropped_files));
        if let Some(path) = dropped {
            self.select_path(&path);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.t(MessageKey::AppTitle));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(self.t(MessageKey::Settings)).clicked() {
                        self.settings_open = true;
                    }
                    if ui.button(self.t(MessageKey::UserGuide)).clicked() {
                        self.controller.show_guide();
                    }

                    let mut locale = self.controller.locale();
                    egui::ComboBox::from_id_salt("locale")
                        .selected_text(locale.native_name())
                        .show_ui(ui, |ui| {
                            for candidate in Locale::ALL {
                                ui.selectable_value(&mut locale, candidate, candidate.native_name());
                            }
                        });
                    if locale != self.controller.locale() {
                        self.controller.set_locale(locale);
                    }
                    ui.label(self.t(MessageKey::Language));
                });
            });
        });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(message) = &self.backend.message {
                    let color = if self.backend.failed {
                        ui.visuals().error_fg_color
                    } else {
                        ui.visuals().weak_text_color()
                    };
                    ui.colored_label(color, message);
                }
                if let Some(path) = &self.backend.last_download {
                    ui.separator();
                    ui.small(path.display().to_string());
                }
            });
        });
    }

    fn show_sections(&mut self, ui: &mut egui::Ui) {
        let sections = self.controller.accordion().sections().to_vec();
        for (index, section) in sections.into_iter().enumerate() {
            let open = self.controller.accordion().is_open(index);
            let header = ui.selectable_label(open, self.t(section.title()));
            if header.clicked() {
                self.controller.accordion_mut().click(index);
            }
            if self.controller.accordion().is_open(index) {
                ui.indent(("section", index), |ui| match section {
                    Section::Upload => self.show_upload_section(ui),
                    Section::Style => self.show_style_section(ui),
                    Section::Academic => self.show_academic_section(ui),
                });
            }
            ui.add_space(6.0);
        }
    }

    fn show_upload_section(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|input| !input.raw.hovered_files.is_empty());
        let stroke_color = if hovering {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        let drop_zone = egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(if hovering { 2.0 } else { 1.0 }, stroke_color))
            .show(ui, |ui| {
                ui.set_min_height(DROP_ZONE_HEIGHT);
                ui.centered_and_justified(|ui| {
                    ui.label(self.t(MessageKey::DropHint));
                });
            })
            .response
            .interact(egui::Sense::click());
        if drop_zone.clicked() {
            self.pick_file();
        }

        let selected = self
            .controller
            .selection()
            .map(|selection| (selection.name.clone(), selection.formatted_size()));
        if let Some((name, size)) = selected {
            ui.horizontal(|ui| {
                ui.strong(name);
                ui.label(size);
                let remove = ui.add_enabled(
                    !self.controller.is_processing(),
                    egui::Button::new(self.t(MessageKey::RemoveFile)),
                );
                if remove.clicked() {
                    self.controller.clear_selection();
                }
            });
        }
    }

    fn show_style_section(&mut self, ui: &mut egui::Ui) {
        let label = self.t(MessageKey::BeautifyToggle);
        let options = self.controller.options_mut();
        let mut beautify = options.beautify();
        if ui.checkbox(&mut beautify, label).changed() {
            options.set_beautify(beautify);
        }
    }

    fn show_academic_section(&mut self, ui: &mut egui::Ui) {
        let locale = self.controller.locale();
        let t = move |key| text(locale, key);
        let options = self.controller.options_mut();

        let mut academic = options.academic_mode();
        if ui.checkbox(&mut academic, t(MessageKey::AcademicToggle)).changed() {
            options.set_academic_mode(academic);
        }
        if !options.academic_options_visible() {
            return;
        }

        egui::Grid::new("academic_options")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label(t(MessageKey::PaperFormatLabel));
                egui::ComboBox::from_id_salt("paper_format")
                    .selected_text(options.paper_format.display_name())
                    .show_ui(ui, |ui| {
                        for format in PaperFormat::ALL.iter().copied() {
                            ui.selectable_value(&mut options.paper_format, format, format.display_name());
                        }
                    });
                ui.end_row();

                ui.label(t(MessageKey::LayoutLabel));
                ui.horizontal(|ui| {
                    for layout in Layout::ALL.iter().copied() {
                        ui.radio_value(&mut options.layout, layout, t(layout_label(layout)));
                    }
                });
                ui.end_row();

                ui.label(t(MessageKey::VectorFormatLabel));
                egui::ComboBox::from_id_salt("vector_format")
                    .selected_text(vector_format_label(options.vector_format, locale))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut options.vector_format,
                            None,
                            t(MessageKey::VectorFormatNone),
                        );
                        for format in VectorFormat::ALL.iter().copied() {
                            ui.selectable_value(
                                &mut options.vector_format,
                                Some(format),
                                format.as_str().to_ascii_uppercase(),
                            );
                        }
                    });
                ui.end_row();

                ui.label(t(MessageKey::DpiLabel));
                ui.add(egui::Slider::new(&mut options.dpi, 72..=1200).suffix(" DPI"));
                ui.end_row();
            });

        let mut custom = options.custom_mode();
        if ui.checkbox(&mut custom, t(MessageKey::CustomToggle)).changed() {
            options.set_custom_mode(custom);
        }
        if !options.custom_options_visible() {
            return;
        }

        egui::Grid::new("custom_options")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label(t(MessageKey::FontSizeLabel));
                ui.add(egui::Slider::new(&mut options.custom.font_size, 6..=24).suffix(" pt"));
                ui.end_row();

                ui.label(t(MessageKey::TitleSizeLabel));
                ui.add(egui::Slider::new(&mut options.custom.title_size, 8..=32).suffix(" pt"));
                ui.end_row();

                ui.label(t(MessageKey::FigWidthLabel));
                ui.add(egui::Slider::new(&mut options.custom.fig_width, 1.0..=12.0).step_by(0.1));
                ui.end_row();

                ui.label(t(MessageKey::FigHeightLabel));
                ui.add(egui::Slider::new(&mut options.custom.fig_height, 1.0..=10.0).step_by(0.1));
                ui.end_row();

                ui.label(t(MessageKey::CustomDpiLabel));
                ui.add(egui::Slider::new(&mut options.custom.custom_dpi, 72..=1200).suffix(" DPI"));
                ui.end_row();
            });
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let start = ui.add_enabled(
                self.controller.can_start_processing(),
                egui::Button::new(self.t(MessageKey::StartProcessing)),
            );
            if start.clicked() {
                self.start_processing();
            }
            if ui.button(self.t(MessageKey::ResetAll)).clicked() {
                self.controller.reset_all();
            }
            if self.controller.is_processing() {
                ui.spinner();
            }
        });

        let status = self.controller.status();
        let color = match status.severity {
            StatusSeverity::Success => egui::Color32::from_rgb(0x2e, 0x9e, 0x5b),
            StatusSeverity::Warning => ui.visuals().warn_fg_color,
            StatusSeverity::Error => ui.visuals().error_fg_color,
        };
        ui.colored_label(color, status.render(self.controller.locale()));
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            let Some(result) = self.controller.result().cloned() else {
                ui.weak(self.t(MessageKey::ResultPlaceholder));
                return;
            };

            if let Some(message) = &result.message {
                ui.label(message);
            }
            ui.horizontal(|ui| {
                match resolve_link(&self.server_url, &result.download_url) {
                    Ok(link) => {
                        ui.hyperlink_to(self.t(MessageKey::DownloadResult), link.to_string());
                    }
                    Err(err) => {
                        ui.colored_label(ui.visuals().error_fg_color, err.message);
                    }
                }
                if ui.button(self.t(MessageKey::SaveResult)).clicked() {
                    self.download_result();
                }
            });
        });
    }

    fn show_notifications(&mut self, ctx: &egui::Context) {
        if self.controller.notifications().is_empty() {
            return;
        }
        let locale = self.controller.locale();
        let mut dismissed: Vec<NotificationId> = Vec::new();

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 48.0])
            .show(ctx, |ui| {
                for toast in self.controller.notifications().iter() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            let color = match toast.kind {
                                NotificationKind::Error => ui.visuals().error_fg_color,
                                NotificationKind::Info => ui.visuals().text_color(),
                            };
                            ui.colored_label(color, toast.render(locale));
                            if ui.small_button("x").clicked() {
                                dismissed.push(toast.id);
                            }
                        });
                    });
                }
            });

        for id in dismissed {
            self.controller.notifications_mut().dismiss(id);
        }
    }

    fn show_guide(&mut self, ctx: &egui::Context) {
        if !self.controller.guide_visible() {
            return;
        }
        let title = self.t(MessageKey::UserGuide);
        let body = self.t(MessageKey::UserGuideBody);
        let close = self.t(MessageKey::Close);
        let mut open = true;
        let mut close_clicked = false;

        egui::Window::new(title)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(body);
                ui.add_space(8.0);
                if ui.button(close).clicked() {
                    close_clicked = true;
                }
            });

        if !open || close_clicked {
            self.controller.hide_guide();
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }
        let locale = self.controller.locale();
        let mut open = true;
        let mut apply = false;

        egui::Window::new(text(locale, MessageKey::Settings))
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(text(locale, MessageKey::ServerUrlLabel));
                ui.text_edit_singleline(&mut self.server_url_input);
                ui.label(text(locale, MessageKey::DownloadDirLabel));
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.download_dir_input);
                    if ui.button("...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.download_dir_input = dir.display().to_string();
                        }
                    }
                });
                ui.separator();
                if ui.button(text(locale, MessageKey::Apply)).clicked() {
                    apply = true;
                }
            });

        if apply {
            self.apply_settings();
        }
        self.settings_open = open && !apply;
    }
}

impl eframe::App for AcademicPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        self.show_header(ctx);
        self.show_footer(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.show_sections(ui);
                ui.separator();
                self.show_actions(ui);
                ui.add_space(8.0);
                self.show_result(ui);
            });
        });
        self.show_notifications(ctx);
        self.show_guide(ctx);
        self.show_settings_window(ctx);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.persisted_settings()) {
            storage.set_string(crate::SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

fn first_dropped_path(dropped: &[egui::DroppedFile]) -> Option<PathBuf> {
    dropped.iter().find_map(|file| file.path.clone())
}

fn layout_label(layout: Layout) -> MessageKey {
    match layout {
        Layout::Single => MessageKey::LayoutSingle,
        Layout::Double => MessageKey::LayoutDouble,
    }
}

fn vector_format_label(format: Option<VectorFormat>, locale: Locale) -> String {
    match format {
        Some(format) => format.as_str().to_ascii_uppercase(),
        None => text(locale, MessageKey::VectorFormatNone).to_string(),
    }
}
