use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::admin::{AdminStats, CardManager, StatisticsReport, UserEditor, UserManager};
use crate::api::ApiError;
use crate::auth::claims::Role;
use crate::auth::dto::UpdateProfileRequest;
use crate::auth::{logout, ChangePasswordForm, LoginForm, RegisterForm};
use crate::cards::dto::VisitCard;
use crate::cards::{repo as card_repo, CardDetailView, CardForm, CardRoute, Dashboard, Directory};
use crate::routes::{Redirect, Route};
use crate::state::AppState;
use crate::view::Confirm;

#[derive(Parser, Debug)]
#[command(name = "visitcards")]
#[command(about = "Browse and manage company visit cards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        company: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Update your display name and company
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
    },
    /// Delete your account and sign out
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
    ChangePassword {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Page through the public directory
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Open a card page by path, e.g. /company/42 or /v/acme
    Show { path: String },
    /// Your profile and cards
    Dashboard,
    Create(CardArgs),
    Edit {
        id: u64,
        #[command(flatten)]
        fields: CardEditArgs,
    },
    /// Delete the stored logo of a card
    RemoveLogo {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
    Delete {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
    /// View and bot-interaction counters of one card
    Stats { id: u64 },
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
pub struct CardArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub domain: String,
    #[arg(long, default_value = "")]
    pub bot_token: String,
    /// PNG, JPEG, GIF, WEBP or SVG, at most 5MB
    #[arg(long)]
    pub logo: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CardEditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub bot_token: Option<String>,
    #[arg(long)]
    pub logo: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Totals across all users and cards
    Dashboard,
    Users {
        #[arg(long, default_value = "")]
        search: String,
    },
    EditUser {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    DeleteUser {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
    Cards {
        #[arg(long, default_value = "")]
        search: String,
    },
    EditCard {
        id: u64,
        #[command(flatten)]
        fields: CardEditArgs,
    },
    DeleteCard {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
    Statistics,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role {raw:?}, expected user or admin"))
}

/// Asks on the terminal unless `--yes` was given.
#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    Assume(bool),
    Stdin,
}

impl Prompt {
    pub fn from_flag(yes: bool) -> Self {
        if yes {
            Prompt::Assume(true)
        } else {
            Prompt::Stdin
        }
    }
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        match self {
            Prompt::Assume(answer) => *answer,
            Prompt::Stdin => {
                print!("{prompt} [y/N] ");
                if io::stdout().flush().is_err() {
                    return false;
                }
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
                    Err(_) => false,
                }
            }
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let st = AppState::init().context("initialize client state")?;
    tracing::debug!(api = %st.config.api_base_url, "client ready");
    execute(&st, cli.command).await
}

pub async fn execute(st: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let mut form = LoginForm {
                email,
                password,
                ..Default::default()
            };
            let redirect = form.submit(st).await?;
            println!("Signed in as {}", role_label(st));
            follow(redirect).await;
        }
        Command::Register {
            email,
            password,
            name,
            company,
        } => {
            let mut form = RegisterForm {
                email,
                password,
                name,
                company_name: company,
                ..Default::default()
            };
            let redirect = form.submit(st).await?;
            println!("Account created");
            follow(redirect).await;
        }
        Command::Logout => {
            follow(logout(st)?).await;
        }
        Command::Whoami => whoami(st).await?,
        Command::Profile { name, company } => {
            let req = UpdateProfileRequest {
                name: name.trim().to_string(),
                company_name: company.trim().to_string(),
            };
            let user = crate::auth::repo::update_profile(&st.api, &req).await?;
            println!("Profile updated: {} ({})", user.name, user.company_name);
        }
        Command::DeleteAccount { yes } => {
            let prompt = "Are you sure you want to delete your account? This action cannot be undone.";
            if Prompt::from_flag(yes).confirm(prompt) {
                crate::auth::repo::delete_account(&st.api).await?;
                println!("Account deleted");
                follow(logout(st)?).await;
            }
        }
        Command::ChangePassword { old, new, confirm } => {
            let mut form = ChangePasswordForm {
                old_password: old,
                new_password: new,
                confirm_password: confirm,
                ..Default::default()
            };
            let redirect = form.submit(st).await?;
            print_success(form.status.success());
            follow(redirect).await;
        }
        Command::List { page, search } => list(st, page, &search).await?,
        Command::Show { path } => show(st, &path).await?,
        Command::Dashboard => dashboard(st).await?,
        Command::Create(args) => {
            let mut form = CardForm::create();
            form.title = args.title;
            form.description = args.description;
            form.domain = args.domain;
            form.bot_token = args.bot_token;
            if let Some(path) = args.logo {
                form.select_logo_file(&path).await?;
            }
            let redirect = form.submit(st).await?;
            print_success(form.status.success());
            follow(redirect).await;
        }
        Command::Edit { id, fields } => edit_card(st, id, fields).await?,
        Command::RemoveLogo { id, yes } => {
            let mut form = CardForm::edit(id);
            form.load(st).await?;
            if form.current_logo.is_none() {
                println!("Card {id} has no logo");
            } else if form.remove_logo(st, &Prompt::from_flag(yes)).await? {
                print_success(form.status.success());
            }
        }
        Command::Delete { id, yes } => {
            let mut dash = Dashboard::default();
            if dash.delete_card(st, id, &Prompt::from_flag(yes)).await? {
                println!("Visit card {id} deleted");
            }
        }
        Command::Stats { id } => {
            let stats = card_repo::stats(&st.api, id).await?;
            println!("views: {}", stats.view_count);
            println!("bot interactions: {}", stats.bot_view_count);
        }
        Command::Admin(cmd) => admin(st, cmd).await?,
    }
    Ok(())
}

async fn follow(redirect: Redirect) {
    if !redirect.after.is_zero() {
        tokio::time::sleep(redirect.after).await;
    }
    tracing::debug!(to = %redirect.to, "navigate");
    println!("-> {}", redirect.to);
}

fn print_success(message: Option<&str>) {
    if let Some(message) = message {
        println!("{message}");
    }
}

fn role_label(st: &AppState) -> &'static str {
    st.session.role().map(Role::as_str).unwrap_or("unknown role")
}

async fn whoami(st: &AppState) -> anyhow::Result<()> {
    if !st.session.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    match crate::auth::repo::profile(&st.api).await {
        Ok(user) => {
            println!("{} <{}> ({})", user.name, user.email, user.role);
            if !user.company_name.is_empty() {
                println!("company: {}", user.company_name);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "profile unavailable");
            println!("Signed in ({}), profile unavailable: {e}", role_label(st));
        }
    }
    Ok(())
}

async fn list(st: &AppState, page: u32, search: &str) -> anyhow::Result<()> {
    let mut dir = Directory::new(st.config.page_size);
    dir.identify_viewer(st).await;
    dir.set_search(search);
    dir.refresh(st).await?;
    if page != 1 {
        if !dir.go_to_page(page) {
            anyhow::bail!("page {page} is out of range (1-{})", dir.total_pages().max(1));
        }
        dir.refresh(st).await?;
    }

    if dir.cards.is_empty() {
        println!("No companies found");
        return Ok(());
    }
    let (first, last, total) = dir.showing();
    let noun = if total == 1 { "company" } else { "companies" };
    print!("Showing {first}-{last} of {total} {noun}");
    if !dir.search().is_empty() {
        print!(" (matching {:?})", dir.search());
    }
    println!();

    for card in &dir.cards {
        let links: Vec<String> = dir
            .links(card)
            .into_iter()
            .map(|l| format!("{} {}", l.label, l.route))
            .collect();
        println!("  {}  [{}]", card_heading(card), links.join(" | "));
    }
    let window: Vec<String> = dir
        .window()
        .into_iter()
        .map(|p| {
            if p == dir.page() {
                format!("[{p}]")
            } else {
                p.to_string()
            }
        })
        .collect();
    println!("pages: {}", window.join(" "));
    Ok(())
}

fn card_heading(card: &VisitCard) -> String {
    match card.owner_company() {
        Some(company) => format!("#{} {} ({company})", card.id, card.title),
        None => format!("#{} {}", card.id, card.title),
    }
}

async fn show(st: &AppState, path: &str) -> anyhow::Result<()> {
    let route: Route = path.parse()?;
    let card_route = CardRoute::from_route(&route)
        .with_context(|| format!("{route} is not a card page"))?;
    let mut view = CardDetailView::new(card_route);
    view.load(st).await?;
    let Some(card) = view.card.as_ref() else {
        return Ok(());
    };

    println!("{}", card.title);
    if let Some(domain) = &card.domain {
        println!("domain: {domain}");
    }
    if let Some(logo) = &card.logo_url {
        println!("logo: {}", st.api.endpoint(logo));
    }
    if view.shows_stats() {
        println!(
            "views: {}  bot interactions: {}",
            card.view_count.unwrap_or_default(),
            card.bot_view_count.unwrap_or_default()
        );
    }
    if let Some(problem) = card.token_problem() {
        println!("bot token problem: {problem}");
    }
    if !card.description.is_empty() {
        println!();
        println!("{}", card.description);
    }
    Ok(())
}

async fn dashboard(st: &AppState) -> anyhow::Result<()> {
    let mut dash = Dashboard::default();
    if let Some(redirect) = dash.load(st).await {
        if let Some(message) = dash.status.error() {
            eprintln!("Error: {message}");
        }
        follow(redirect).await;
        return Ok(());
    }
    if let Some(user) = &dash.user {
        println!("Welcome, {}", if user.name.is_empty() { &user.email } else { &user.name });
    }
    if dash.cards.is_empty() {
        println!("You have no visit cards yet");
    }
    for card in &dash.cards {
        println!(
            "  {}  views {}  bot {}",
            card_heading(card),
            card.view_count.unwrap_or_default(),
            card.bot_view_count.unwrap_or_default()
        );
    }
    Ok(())
}

async fn edit_card(st: &AppState, id: u64, fields: CardEditArgs) -> anyhow::Result<()> {
    let mut form = CardForm::edit(id);
    form.load(st).await?;
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(domain) = fields.domain {
        form.domain = domain;
    }
    if let Some(token) = fields.bot_token {
        form.bot_token = token;
    }
    if let Some(path) = fields.logo {
        form.select_logo_file(&path).await?;
    }
    let redirect = form.submit(st).await?;
    print_success(form.status.success());
    follow(redirect).await;
    Ok(())
}

async fn admin(st: &AppState, cmd: AdminCommand) -> anyhow::Result<()> {
    if !st.session.is_authenticated() {
        return Err(ApiError::MissingToken.into());
    }
    match cmd {
        AdminCommand::Dashboard => {
            let stats = AdminStats::fetch(st)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load admin statistics")))?;
            println!("users: {}", stats.total_users);
            println!("visit cards: {}", stats.total_cards);
            println!("views: {}", stats.total_views);
            println!("bot interactions: {}", stats.total_bot_interactions);
        }
        AdminCommand::Users { search } => {
            let mut manager = UserManager::default();
            manager.load(st).await?;
            manager.search = search;
            for user in manager.filtered() {
                println!(
                    "  #{} {} <{}> {} [{}]",
                    user.id, user.name, user.email, user.company_name, user.role
                );
            }
        }
        AdminCommand::EditUser {
            id,
            name,
            email,
            company,
            role,
        } => {
            let mut editor = UserEditor::new(id);
            editor.load(st).await?;
            if let Some(name) = name {
                editor.name = name;
            }
            if let Some(email) = email {
                editor.email = email;
            }
            if let Some(company) = company {
                editor.company_name = company;
            }
            if let Some(role) = role {
                editor.role = role;
            }
            let redirect = editor.submit(st).await?;
            print_success(editor.status.success());
            follow(redirect).await;
        }
        AdminCommand::DeleteUser { id, yes } => {
            let mut manager = UserManager::default();
            if manager.delete(st, id, &Prompt::from_flag(yes)).await? {
                println!("User {id} deleted");
            }
        }
        AdminCommand::Cards { search } => {
            let mut manager = CardManager::default();
            manager.load(st).await?;
            manager.search = search;
            for card in manager.filtered() {
                println!(
                    "  {}  views {}  bot {}",
                    card_heading(card),
                    card.view_count.unwrap_or_default(),
                    card.bot_view_count.unwrap_or_default()
                );
            }
        }
        AdminCommand::EditCard { id, fields } => edit_card(st, id, fields).await?,
        AdminCommand::DeleteCard { id, yes } => {
            let mut manager = CardManager::default();
            if manager.delete(st, id, &Prompt::from_flag(yes)).await? {
                println!("Visit card {id} deleted");
            }
        }
        AdminCommand::Statistics => {
            let mut report = StatisticsReport::default();
            report.load(st).await?;
            for row in &report.rows {
                let owner = row
                    .user
                    .as_ref()
                    .and_then(|u| u.company_name.as_deref().or(u.name.as_deref()))
                    .unwrap_or("-");
                println!(
                    "  #{} {} ({owner})  views {}  bot {}",
                    row.id, row.title, row.view_count, row.bot_view_count
                );
            }
            println!("cards: {}", report.total_cards());
            println!("views: {}", report.total_views());
            println!("bot interactions: {}", report.total_bot_interactions());
            println!("average views per card: {}", report.average_views());
        }
    }
    Ok(())
}
