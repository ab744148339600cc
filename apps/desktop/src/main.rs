use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    load_settings, BookFormController, CatalogApi, CatalogView, ClientSettings, FormField,
    FormMode, FormPhase, HttpCatalogClient, ManagerList, ManagerSession, Notice, Route,
    SessionError, SessionStore, SortKey, SubmitRejected,
};
use shared::domain::{Book, BookId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bookstore", about = "Browse and manage the bookstore catalog")]
struct Args {
    /// Books collection endpoint; overrides bookstore.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print books as JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalog, optionally filtered, searched and sorted.
    Browse {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// newest, price-low, price-high or popular
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one book.
    Show { id: BookId },
    /// List browse categories.
    Categories,
    /// Sign in as store manager.
    Login { username: String },
    /// Sign out.
    Logout,
    /// Store-manager back office.
    Manage {
        #[command(subcommand)]
        action: ManageCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ManageCommand {
    List,
    Add(BookFields),
    Edit {
        id: BookId,
        #[command(flatten)]
        fields: BookFields,
    },
    Delete {
        id: BookId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    price: Option<String>,
}

impl BookFields {
    fn entries(self) -> Vec<(FormField, String)> {
        [
            (FormField::Title, self.title),
            (FormField::Author, self.author),
            (FormField::Isbn, self.isbn),
            (FormField::Year, self.year),
            (FormField::Price, self.price),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

struct Ctx {
    settings: ClientSettings,
    api: HttpCatalogClient,
    sessions: SessionStore,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    let api = HttpCatalogClient::new(&settings.api_base_url)
        .with_context(|| format!("invalid api url {}", settings.api_base_url))?;
    let ctx = Ctx {
        sessions: SessionStore::new(settings.session_file.clone()),
        settings,
        api,
        json: args.json,
    };

    match args.command {
        Command::Browse {
            search,
            category,
            sort,
            page,
        } => browse(&ctx, search, category, sort, page).await,
        Command::Show { id } => show(&ctx, id).await,
        Command::Categories => categories(&ctx).await,
        Command::Login { username } => {
            let session = ManagerSession::sign_in(&username)?;
            ctx.sessions.save(&session)?;
            println!("Signed in as {}", session.require_manager()?);
            Ok(())
        }
        Command::Logout => {
            ctx.sessions.clear()?;
            println!("Signed out");
            Ok(())
        }
        Command::Manage { action } => {
            let session = manager_session(&ctx)?;
            match action {
                ManageCommand::List => manage_list(&ctx, &session).await,
                ManageCommand::Add(fields) => save_book(&ctx, &session, FormMode::Add, fields).await,
                ManageCommand::Edit { id, fields } => {
                    save_book(&ctx, &session, FormMode::Edit(id), fields).await
                }
                ManageCommand::Delete { id, yes } => delete_book(&ctx, &session, id, yes).await,
            }
        }
    }
}

fn manager_session(ctx: &Ctx) -> Result<ManagerSession> {
    let session = ctx.sessions.load()?;
    if let Err(err) = session.require_manager() {
        if matches!(err, SessionError::NotAuthenticated) {
            bail!("store manager sign-in required; run `bookstore login <USERNAME>` first");
        }
        return Err(err.into());
    }
    Ok(session)
}

async fn browse(
    ctx: &Ctx,
    search: Option<String>,
    category: Option<String>,
    sort: Option<String>,
    page: usize,
) -> Result<()> {
    let mut view = CatalogView::new();
    view.load(&ctx.api).await;
    if let Some(err) = view.error() {
        bail!("failed to fetch books: {err}");
    }

    if let Some(category) = category {
        view.filter_by_category(&category);
    }
    if let Some(term) = search {
        view.search(&term);
    }
    if let Some(sort) = sort {
        view.sort(SortKey::parse(&sort));
    }
    view.go_to_page(page);

    let books = view.current_slice();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }
    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }
    print_table(&books);
    println!(
        "Page {} of {} ({} books)",
        view.current_page(),
        view.total_pages(),
        view.visible_len()
    );
    Ok(())
}

async fn show(ctx: &Ctx, id: BookId) -> Result<()> {
    let book = ctx
        .api
        .get_book(id)
        .await
        .with_context(|| format!("failed to fetch book {id}"))?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&book)?);
        return Ok(());
    }
    println!("{}", book.title);
    println!("  by {}", book.author);
    println!("  ISBN      {}", book.isbn);
    println!("  Year      {}", book.year);
    println!("  Price     {:.2}", book.price);
    if let Some(category) = &book.category {
        println!("  Category  {category}");
    }
    if let Some(rating) = book.rating {
        println!("  Rating    {rating:.1} ({} reviews)", book.popularity());
    }
    if let Some(publisher) = &book.publisher {
        println!("  Publisher {publisher}");
    }
    if let Some(description) = &book.description {
        println!();
        println!("{description}");
    }
    Ok(())
}

async fn categories(ctx: &Ctx) -> Result<()> {
    let view = CatalogView::new();
    for category in view.categories() {
        println!("{category}");
    }
    match ctx.api.list_categories().await {
        Ok(remote) => {
            let extra: Vec<_> = remote
                .into_iter()
                .filter(|name| {
                    !view
                        .categories()
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(name))
                })
                .collect();
            for name in extra {
                println!("{name}");
            }
        }
        Err(err) => tracing::warn!("could not fetch backend categories: {err}"),
    }
    Ok(())
}

async fn manage_list(ctx: &Ctx, session: &ManagerSession) -> Result<()> {
    let mut list = ManagerList::new(session)?;
    list.load(&ctx.api).await;
    if let Some(err) = list.error() {
        bail!("failed to fetch books: {err}");
    }
    let books: Vec<&Book> = list.books().iter().collect();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }
    println!("Found {} books", list.count());
    print_table(&books);
    Ok(())
}

async fn save_book(
    ctx: &Ctx,
    session: &ManagerSession,
    mode: FormMode,
    fields: BookFields,
) -> Result<()> {
    let mut form = BookFormController::initialize(mode, &ctx.api)
        .await
        .with_redirect_delay(ctx.settings.redirect_delay());
    if let Some(err) = form.load_error() {
        bail!("error loading book: {err}");
    }
    for (field, value) in fields.entries() {
        form.update_field(field, value);
    }

    match form.submit(&ctx.api).await {
        Ok(()) => {}
        Err(SubmitRejected::Invalid(_)) => {
            for field in FormField::ALL {
                if let Some(message) = form.field_error(field) {
                    eprintln!("{:<18} {message}", field.label());
                }
            }
            bail!("book was not saved");
        }
        Err(err) => return Err(err.into()),
    }
    if let Some(err) = form.submit_error() {
        bail!("{err}");
    }
    if let Some(message) = form.message() {
        println!("{message}");
    }

    if let Some(nav) = form.pending_navigation() {
        tokio::time::sleep(nav.remaining(Instant::now())).await;
    }
    if form.phase() == &FormPhase::Succeeded
        && form.poll_navigation(Instant::now()) == Some(Route::ManagerList)
    {
        manage_list(ctx, session).await?;
    }
    Ok(())
}

async fn delete_book(ctx: &Ctx, session: &ManagerSession, id: BookId, yes: bool) -> Result<()> {
    let mut list = ManagerList::new(session)?;
    list.load(&ctx.api).await;
    if let Some(err) = list.error() {
        bail!("failed to fetch books: {err}");
    }

    let confirmation = list.request_delete(id);
    if !yes && !confirm(&confirmation.prompt()).await? {
        println!("Cancelled");
        return Ok(());
    }
    list.confirm_delete(confirmation, &ctx.api).await;
    match list.take_notice() {
        Some(Notice::Error(message)) => bail!("{message}"),
        Some(Notice::Success(message)) => {
            println!("{message}");
            println!("{} books remain", list.count());
            Ok(())
        }
        None => Ok(()),
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    println!("{prompt} [y/N]");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read confirmation")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_table(books: &[&Book]) {
    println!(
        "{:>5}  {:<36}  {:<24}  {:<16}  {:>4}  {:>10}",
        "ID", "Title", "Author", "ISBN", "Year", "Price"
    );
    for book in books {
        println!(
            "{:>5}  {:<36}  {:<24}  {:<16}  {:>4}  {:>10.2}",
            book.id,
            truncate(&book.title, 36),
            truncate(&book.author, 24),
            truncate(&book.isbn, 16),
            book.year,
            book.price
        );
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_cells_on_char_boundaries() {
        assert_eq!(truncate("Dune", 10), "Dune");
        assert_eq!(truncate("ความสุขของกะทิ", 5), "ความ…");
    }

    #[test]
    fn only_given_fields_are_applied() {
        let fields = BookFields {
            price: Some("19.99".into()),
            ..BookFields::default()
        };
        assert_eq!(fields.entries(), vec![(FormField::Price, "19.99".to_string())]);
    }

    #[test]
    fn parses_manage_edit_arguments() {
        let args = Args::try_parse_from([
            "bookstore",
            "--api-url",
            "http://localhost:9000/books",
            "manage",
            "edit",
            "7",
            "--title",
            "New Title",
        ])
        .expect("parse");
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:9000/books"));
        let Command::Manage {
            action: ManageCommand::Edit { id, fields },
        } = args.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(id, BookId(7));
        assert_eq!(fields.title.as_deref(), Some("New Title"));
    }
}
