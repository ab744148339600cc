//! App shell: top navigation, the catalog, manager, form and login screens,
//! and the delete confirmation dialog.

use std::time::{Duration, Instant};

use client_core::{
    BookFormController, CatalogError, CatalogView, DeleteConfirmation, FormField, FormMode,
    FormPhase, ManagerList, ManagerSession, Route, SessionStore, SortKey, SubmitRejected,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{BookId, CATEGORIES};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 40, 40);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(30, 140, 60);

pub struct StartupConfig {
    pub redirect_delay: Duration,
    pub sessions: SessionStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Catalog,
    BookDetail(BookId),
    Manager,
    Form,
    Login,
}

pub struct BookstoreApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    startup: StartupConfig,
    session: ManagerSession,
    screen: Screen,
    catalog: CatalogView,
    search_input: String,
    manager: Option<ManagerList>,
    form: Option<BookFormController>,
    pending_delete: Option<DeleteConfirmation>,
    login_username: String,
    after_login: Route,
    status: String,
    status_is_error: bool,
}

impl BookstoreApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            startup,
            session: ManagerSession::anonymous(),
            screen: Screen::Catalog,
            catalog: CatalogView::new(),
            search_input: String::new(),
            manager: None,
            form: None,
            pending_delete: None,
            login_username: String::new(),
            after_login: Route::ManagerList,
            status: "Ready".to_string(),
            status_is_error: false,
        };
        app.reload_session();
        app.navigate(Route::Catalog);
        app
    }

    fn reload_session(&mut self) {
        match self.startup.sessions.load() {
            Ok(session) => self.session = session,
            Err(err) => {
                self.session = ManagerSession::anonymous();
                self.report(UiError::from_message(UiErrorContext::Session, err.to_string()));
            }
        }
    }

    fn report(&mut self, err: UiError) {
        tracing::warn!(context = ?err.context(), "{}", err.message());
        self.status = err.headline();
        self.status_is_error = true;
        if err.requires_sign_in() && err.context() != UiErrorContext::Session {
            self.after_login = Route::ManagerList;
            self.screen = Screen::Login;
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        let queued = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        if !queued {
            self.status_is_error = true;
        }
        queued
    }

    /// Manager screens re-read the persisted session on entry.
    fn require_manager(&mut self, route: Route) -> bool {
        self.reload_session();
        if self.session.require_manager().is_ok() {
            return true;
        }
        self.after_login = route;
        self.set_status("Store manager sign-in required");
        self.screen = Screen::Login;
        false
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.pending_delete = None;
        match route {
            Route::Catalog => {
                self.screen = Screen::Catalog;
                self.catalog.begin_load();
                self.dispatch(BackendCommand::LoadCatalog);
            }
            Route::BookDetail(id) => self.screen = Screen::BookDetail(id),
            Route::Login => self.screen = Screen::Login,
            Route::ManagerList => {
                if self.require_manager(route) {
                    self.open_manager_list();
                }
            }
            Route::AddBook => {
                if self.require_manager(route) {
                    self.open_form(FormMode::Add);
                }
            }
            Route::EditBook(id) => {
                if self.require_manager(route) {
                    self.open_form(FormMode::Edit(id));
                }
            }
        }
    }

    fn open_manager_list(&mut self) {
        match ManagerList::new(&self.session) {
            Ok(mut list) => {
                list.begin_load();
                self.manager = Some(list);
                self.form = None;
                self.screen = Screen::Manager;
                self.dispatch(BackendCommand::LoadManagerList);
            }
            Err(err) => {
                self.report(UiError::from_message(UiErrorContext::Session, err.to_string()));
                self.screen = Screen::Login;
            }
        }
    }

    fn open_form(&mut self, mode: FormMode) {
        self.form = Some(
            BookFormController::new(mode).with_redirect_delay(self.startup.redirect_delay),
        );
        self.screen = Screen::Form;
        if let FormMode::Edit(id) = mode {
            self.dispatch(BackendCommand::LoadBook { id });
        }
    }

    fn sign_out(&mut self) {
        if let Err(err) = self.startup.sessions.clear() {
            self.report(UiError::from_message(UiErrorContext::Session, err.to_string()));
        }
        self.session = ManagerSession::anonymous();
        self.manager = None;
        self.form = None;
        self.navigate(Route::Login);
    }

    fn sign_in(&mut self) -> Option<Route> {
        match ManagerSession::sign_in(&self.login_username) {
            Ok(session) => {
                if let Err(err) = self.startup.sessions.save(&session) {
                    self.report(UiError::from_message(UiErrorContext::Session, err.to_string()));
                    return None;
                }
                self.session = session;
                self.set_status(format!("Signed in as {}", self.login_username.trim()));
                Some(self.after_login)
            }
            Err(err) => {
                self.report(UiError::from_message(UiErrorContext::Session, err.to_string()));
                None
            }
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::CatalogLoaded(result) => {
                    if let Err(err) = &result {
                        self.report(UiError::from_catalog(UiErrorContext::Fetch, err));
                    } else {
                        self.set_status("Catalog loaded");
                    }
                    self.catalog.apply_load(result);
                    self.search_input.clear();
                }
                UiEvent::ManagerListLoaded(result) => {
                    if let Err(err) = &result {
                        self.report(UiError::from_catalog(UiErrorContext::Fetch, err));
                    }
                    if let Some(list) = self.manager.as_mut() {
                        list.apply_load(result);
                    }
                }
                UiEvent::BookLoaded { id, result } => match self.form.as_mut() {
                    Some(form) if form.mode() == FormMode::Edit(id) => form.apply_loaded(result),
                    _ => tracing::debug!(book_id = id.0, "dropping book load for a closed form"),
                },
                UiEvent::SubmitFinished { ticket, result } => {
                    let Some(form) = self.form.as_mut().filter(|form| form.owns(ticket)) else {
                        tracing::debug!(?ticket, "dropping submit result for a closed form");
                        continue;
                    };
                    let failure = result
                        .as_ref()
                        .err()
                        .map(|err| UiError::from_catalog(UiErrorContext::Submit, err));
                    form.finish_submit(ticket, result, Instant::now());
                    if let Some(err) = failure {
                        self.report(err);
                    }
                }
                UiEvent::DeleteFinished { id, result } => {
                    if let Err(err) = &result {
                        self.report(UiError::from_catalog(UiErrorContext::Delete, err));
                    }
                    if let Some(list) = self.manager.as_mut() {
                        list.apply_delete(id, result);
                    }
                }
                UiEvent::Error(err) => self.report(err),
            }
        }
    }

    fn poll_deferred_navigation(&mut self) {
        let due = self
            .form
            .as_ref()
            .and_then(|form| form.poll_navigation(Instant::now()));
        if let Some(route) = due {
            self.form = None;
            self.navigate(route);
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context, next_route: &mut Option<Route>) {
        let mut sign_out = false;
        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("BookStore");
                ui.separator();
                let browsing = matches!(self.screen, Screen::Catalog | Screen::BookDetail(_));
                if ui.selectable_label(browsing, "All books").clicked() {
                    *next_route = Some(Route::Catalog);
                }
                let managing = matches!(self.screen, Screen::Manager | Screen::Form);
                if ui.selectable_label(managing, "Manage books").clicked() {
                    *next_route = Some(Route::ManagerList);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.session.is_authenticated() {
                        if ui.button("Sign out").clicked() {
                            sign_out = true;
                        }
                        ui.label(format!(
                            "Signed in as {}",
                            self.session.username().unwrap_or("manager")
                        ));
                    } else if ui.button("Sign in").clicked() {
                        *next_route = Some(Route::Login);
                    }
                });
            });
        });
        if sign_out {
            self.sign_out();
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if self.status_is_error {
                ui.colored_label(ERROR_COLOR, self.status.as_str());
            } else {
                ui.label(self.status.as_str());
            }
        });
    }

    fn show_catalog(&mut self, ui: &mut egui::Ui, next_route: &mut Option<Route>) {
        ui.heading("All books");
        ui.label("Discover your next favourite book from our collection.");
        ui.add_space(8.0);

        if self.catalog.is_loading() {
            ui.spinner();
            return;
        }
        if let Some(err) = self.catalog.error() {
            ui.colored_label(ERROR_COLOR, format!("Failed to load books: {err}"));
            if ui.button("Retry").clicked() {
                *next_route = Some(Route::Catalog);
            }
            return;
        }

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search title or author"),
            );
            if response.changed() {
                self.catalog.search(&self.search_input);
            }

            let current_category = self.catalog.category().as_str().to_string();
            let mut chosen_category = None;
            egui::ComboBox::from_id_salt("category_filter")
                .selected_text(current_category.as_str())
                .show_ui(ui, |ui| {
                    for category in CATEGORIES {
                        let selected = current_category.eq_ignore_ascii_case(category);
                        if ui.selectable_label(selected, *category).clicked() {
                            chosen_category = Some(*category);
                        }
                    }
                });
            if let Some(category) = chosen_category {
                self.catalog.filter_by_category(category);
                self.search_input = self.catalog.search_term().to_string();
            }

            let current_sort = self.catalog.active_sort().unwrap_or_default();
            let mut chosen_sort = None;
            egui::ComboBox::from_id_salt("sort_key")
                .selected_text(current_sort.label())
                .show_ui(ui, |ui| {
                    for key in SortKey::ALL {
                        if ui.selectable_label(key == current_sort, key.label()).clicked() {
                            chosen_sort = Some(key);
                        }
                    }
                });
            if let Some(key) = chosen_sort {
                self.catalog.sort(key);
            }
        });
        ui.separator();

        let mut open_detail = None;
        let page = self.catalog.current_slice();
        if page.is_empty() {
            ui.label("No books match your filters.");
        }
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                for book in &page {
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.strong(book.title.as_str());
                                ui.label(format!("by {}", book.author));
                                if let Some(category) = &book.category {
                                    ui.small(category.as_str());
                                }
                            });
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("Details").clicked() {
                                        open_detail = Some(book.id);
                                    }
                                    ui.label(format!("{:.2}", book.price));
                                },
                            );
                        });
                    });
                }
            });
        if let Some(id) = open_detail {
            *next_route = Some(Route::BookDetail(id));
        }

        let current = self.catalog.current_page();
        let mut target = None;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.catalog.has_previous_page(), egui::Button::new("Previous"))
                .clicked()
            {
                target = Some(current - 1);
            }
            for n in self.catalog.page_numbers() {
                if ui.selectable_label(n == current, n.to_string()).clicked() {
                    target = Some(n);
                }
            }
            if ui
                .add_enabled(self.catalog.has_next_page(), egui::Button::new("Next"))
                .clicked()
            {
                target = Some(current + 1);
            }
        });
        if let Some(n) = target {
            self.catalog.go_to_page(n);
        }
    }

    fn show_detail(&mut self, ui: &mut egui::Ui, id: BookId) {
        if ui.button("Back to all books").clicked() {
            self.screen = Screen::Catalog;
            return;
        }
        let Some(book) = self.catalog.books().iter().find(|book| book.id == id) else {
            ui.colored_label(ERROR_COLOR, format!("Book {id} is not in the catalog"));
            return;
        };
        ui.heading(book.title.as_str());
        ui.label(format!("by {}", book.author));
        ui.add_space(8.0);
        egui::Grid::new("book_detail").num_columns(2).show(ui, |ui| {
            ui.label("ISBN");
            ui.label(book.isbn.as_str());
            ui.end_row();
            ui.label("Year");
            ui.label(book.year.to_string());
            ui.end_row();
            ui.label("Price");
            ui.label(format!("{:.2}", book.price));
            ui.end_row();
            if let Some(category) = &book.category {
                ui.label("Category");
                ui.label(category.as_str());
                ui.end_row();
            }
            if let Some(rating) = book.rating {
                ui.label("Rating");
                ui.label(format!("{rating:.1} ({} reviews)", book.popularity()));
                ui.end_row();
            }
            if let Some(publisher) = &book.publisher {
                ui.label("Publisher");
                ui.label(publisher.as_str());
                ui.end_row();
            }
        });
        if let Some(description) = &book.description {
            ui.add_space(8.0);
            ui.label(description.as_str());
        }
    }

    fn show_manager(&mut self, ui: &mut egui::Ui, next_route: &mut Option<Route>) {
        let Some(list) = self.manager.as_mut() else {
            ui.label("Manager list unavailable");
            return;
        };

        ui.horizontal(|ui| {
            ui.heading("Manage all books (back office)");
            if ui.button("Add book").clicked() {
                *next_route = Some(list.add_route());
            }
        });

        if list.is_loading() {
            ui.spinner();
            return;
        }
        if let Some(err) = list.error() {
            ui.colored_label(ERROR_COLOR, format!("Error: {err}"));
        }

        let mut dismiss = false;
        if let Some(notice) = list.notice() {
            ui.horizontal(|ui| {
                let color = if notice.is_error() {
                    ERROR_COLOR
                } else {
                    SUCCESS_COLOR
                };
                ui.colored_label(color, notice.text());
                if ui.small_button("Dismiss").clicked() {
                    dismiss = true;
                }
            });
        }
        if dismiss {
            list.take_notice();
        }

        ui.label(format!("Found {} books", list.count()));

        let mut edit = None;
        let mut delete = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("manager_books")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    for header in ["ID", "Title", "Author", "Year", "Price", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for book in list.books() {
                        ui.label(book.id.to_string());
                        ui.label(book.title.as_str());
                        ui.label(book.author.as_str());
                        ui.label(book.year.to_string());
                        ui.label(format!("{:.2}", book.price));
                        ui.horizontal(|ui| {
                            if ui.button("Edit").clicked() {
                                edit = Some(book.id);
                            }
                            let deletable = !list.is_deleting(book.id);
                            if ui
                                .add_enabled(deletable, egui::Button::new("Delete"))
                                .clicked()
                            {
                                delete = Some(book.id);
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        if let Some(id) = edit {
            *next_route = Some(list.edit_route(id));
        }
        if let Some(id) = delete {
            self.pending_delete = Some(list.request_delete(id));
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(confirmation) = self.pending_delete.clone() else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(confirmation.prompt());
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.pending_delete = None;
                self.confirm_delete(confirmation);
            }
            Some(false) => self.pending_delete = None,
            None => {}
        }
    }

    fn confirm_delete(&mut self, confirmation: DeleteConfirmation) {
        let Some(list) = self.manager.as_mut() else {
            return;
        };
        let Some(id) = list.begin_delete(confirmation) else {
            return;
        };
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::DeleteBook { id },
            &mut self.status,
        );
        if !queued {
            list.apply_delete(
                id,
                Err(CatalogError::Transport("backend worker unavailable".into())),
            );
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui, next_route: &mut Option<Route>) {
        let Some(form) = self.form.as_mut() else {
            ui.label("No book selected");
            return;
        };

        let heading = match form.mode() {
            FormMode::Add => "Add a new book".to_string(),
            FormMode::Edit(id) => format!("Edit book #{id}"),
        };
        ui.heading(heading);
        ui.add_space(8.0);

        match form.phase() {
            FormPhase::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading book data...");
                });
                return;
            }
            FormPhase::LoadFailed(message) => {
                ui.colored_label(ERROR_COLOR, format!("Error loading book: {message}"));
                if ui.link("Go back to manager list").clicked() {
                    *next_route = Some(Route::ManagerList);
                }
                return;
            }
            _ => {}
        }

        let editable = form.phase() == &FormPhase::Ready;
        egui::Grid::new("book_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                for field in FormField::ALL {
                    ui.label(field.label());
                    ui.vertical(|ui| {
                        let mut buffer = form.values().get(field).to_string();
                        let response =
                            ui.add_enabled(editable, egui::TextEdit::singleline(&mut buffer));
                        if response.changed() {
                            form.update_field(field, buffer);
                        }
                        if let Some(err) = form.field_error(field) {
                            ui.colored_label(ERROR_COLOR, err);
                        }
                    });
                    ui.end_row();
                }
            });

        if let Some(err) = form.submit_error() {
            ui.colored_label(ERROR_COLOR, err);
        }
        if let Some(message) = form.message() {
            ui.colored_label(SUCCESS_COLOR, message);
            if let Some(nav) = form.pending_navigation() {
                ui.label(format!(
                    "Returning to the manager list in {:.1}s",
                    nav.remaining(Instant::now()).as_secs_f32()
                ));
            }
        }

        let mut submit = false;
        let mut cancel = false;
        ui.horizontal(|ui| {
            let label = if form.is_submitting() { "Saving..." } else { "Save" };
            if ui.add_enabled(editable, egui::Button::new(label)).clicked() {
                submit = true;
            }
            if ui
                .add_enabled(!form.is_submitting(), egui::Button::new("Cancel"))
                .clicked()
            {
                cancel = true;
            }
        });

        if submit {
            match form.begin_submit() {
                Ok(request) => {
                    let ticket = request.ticket;
                    let queued = dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::SubmitBook { request },
                        &mut self.status,
                    );
                    if !queued {
                        form.finish_submit(
                            ticket,
                            Err(CatalogError::Transport("backend worker unavailable".into())),
                            Instant::now(),
                        );
                    }
                }
                Err(SubmitRejected::Invalid(count)) => {
                    self.status = format!("Please correct {count} field(s)");
                    self.status_is_error = true;
                }
                Err(other) => tracing::debug!("submit ignored: {other}"),
            }
        }
        if cancel {
            form.cancel_navigation();
            *next_route = Some(Route::ManagerList);
        }
    }

    fn show_login(&mut self, ui: &mut egui::Ui, next_route: &mut Option<Route>) {
        ui.heading("Store manager sign-in");
        ui.add_space(8.0);
        let mut submitted = false;
        ui.horizontal(|ui| {
            ui.label("Username");
            let response = ui.text_edit_singleline(&mut self.login_username);
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = true;
            }
        });
        if ui.button("Sign in").clicked() {
            submitted = true;
        }
        if submitted {
            if let Some(route) = self.sign_in() {
                *next_route = Some(route);
            }
        }
    }
}

impl eframe::App for BookstoreApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.poll_deferred_navigation();

        let mut next_route = None;
        self.show_top_bar(ctx, &mut next_route);
        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Catalog => self.show_catalog(ui, &mut next_route),
            Screen::BookDetail(id) => self.show_detail(ui, id),
            Screen::Manager => self.show_manager(ui, &mut next_route),
            Screen::Form => self.show_form(ui, &mut next_route),
            Screen::Login => self.show_login(ui, &mut next_route),
        });
        self.show_delete_confirmation(ctx);

        if let Some(route) = next_route {
            self.navigate(route);
        }

        let waiting = self
            .form
            .as_ref()
            .is_some_and(|form| form.pending_navigation().is_some() || form.is_submitting());
        let interval = if waiting { 50 } else { 250 };
        ctx.request_repaint_after(Duration::from_millis(interval));
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
