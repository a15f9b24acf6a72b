use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use bazaar_core::config::default_base_dir;
use bazaar_core::screen::{
    CreatePluginScreen, ForumIndexScreen, HomeScreen, NavbarState, NewTopicScreen, PluginBrowser,
    PluginDetailScreen, ProfileScreen, ReviewsScreen, SettingsScreen, TopicScreen,
};
use bazaar_core::session::{LOGIN_FAILED, REGISTRATION_FAILED};
use bazaar_core::{
    AppContext, BazaarError, Config, FileTokenStore, HttpApi, Navigator, NoticeLevel, Notifier,
    PluginFilters, Registration, Result, SessionHolder, Upload,
};

mod args;
mod logging;
mod render;

use args::{
    Cli, Commands, ConfigAction, ForumsAction, MeAction, PluginsAction, ReviewsAction, Shell,
    UserAction,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        Cli::command().print_help().ok();
        return ExitCode::SUCCESS;
    };

    let base_dir = match resolve_base_dir(cli.base_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let notifier = Notifier::new();
    let result = run(command, &base_dir, cli.api_url.as_deref(), &notifier).await;

    let notices = notifier.drain();
    let already_reported = notices.iter().any(|n| n.level == NoticeLevel::Error);
    render::notices(notices, cli.quiet);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !already_reported && !e.is_cancelled() {
                eprintln!("{} {}", "[ERROR]".red().bold(), e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> Result<PathBuf> {
    match cli_base {
        Some(base) => Ok(base),
        None => default_base_dir(),
    }
}

async fn run(
    command: Commands,
    base_dir: &Path,
    api_url: Option<&str>,
    notifier: &Notifier,
) -> Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, base_dir),
        Commands::Completions { shell } => {
            handle_completions(shell);
            Ok(())
        }
        command => {
            let ctx = connect(base_dir, api_url, notifier)?;
            match command {
                Commands::Plugins { action } => handle_plugins(action, &ctx, base_dir).await,
                Commands::Reviews { action } => handle_reviews(action, &ctx).await,
                Commands::Forums { action } => handle_forums(action, &ctx).await,
                Commands::User { action } => handle_user(action, &ctx).await,
                Commands::Me { action } => handle_me(action, &ctx).await,
                Commands::Login { email } => handle_login(&ctx, &email).await,
                Commands::Register { username, email } => {
                    handle_register(&ctx, username, email).await
                }
                Commands::Logout => handle_logout(&ctx),
                Commands::Whoami => handle_whoami(&ctx).await,
                Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
            }
        }
    }
}

/// Build the shared context: API client, persisted session, notices
fn connect(base_dir: &Path, api_url: Option<&str>, notifier: &Notifier) -> Result<AppContext> {
    let config = Config::load(base_dir)?;
    let base_url = config.api_base_url(api_url);
    tracing::debug!(%base_url, base_dir = %base_dir.display(), "connecting");

    let api = Arc::new(HttpApi::new(&base_url, config.api.timeout_secs)?);
    let session = SessionHolder::new(api.clone(), FileTokenStore::new(base_dir))?;
    Ok(AppContext::new(
        api,
        session,
        notifier.clone(),
        Navigator::new(),
    ))
}

/// Turn a screen's load banner into an error notice
fn banner(ctx: &AppContext, message: Option<&str>, err: BazaarError) -> BazaarError {
    if let Some(message) = message {
        ctx.notifier.error(message);
    }
    err
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "bazaar", &mut io::stdout());
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(BazaarError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

async fn handle_plugins(action: PluginsAction, ctx: &AppContext, base_dir: &Path) -> Result<()> {
    match action {
        PluginsAction::List {
            search,
            category,
            minecraft_version,
            price,
            sort,
        } => {
            let filters = PluginFilters {
                search: search.unwrap_or_default(),
                category,
                minecraft_version,
                price: price.parse()?,
                sort: sort.parse()?,
            };
            let mut browser = PluginBrowser::with_filters(ctx.clone(), filters);
            if let Err(e) = browser.mount().await {
                return Err(banner(ctx, browser.plugins.error(), e));
            }
            if let Some(plugins) = browser.plugins.value() {
                render::plugin_list("Plugins", plugins);
            }
        }
        PluginsAction::Featured => {
            let mut home = HomeScreen::new(ctx.clone());
            if let Err(e) = home.mount().await {
                return Err(banner(ctx, home.featured.error(), e));
            }
            if let Some(plugins) = home.featured.value() {
                render::plugin_list("Featured plugins", plugins);
            }
        }
        PluginsAction::Show { id } => {
            let mut detail = PluginDetailScreen::new(ctx.clone(), id);
            if let Err(e) = detail.mount().await {
                return Err(banner(ctx, detail.plugin.error(), e));
            }
            if let Some(plugin) = detail.plugin.value() {
                render::plugin_detail(plugin, &detail.related);
            }
        }
        PluginsAction::Download { id, dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => Config::load(base_dir)?.download_dir(),
            };
            let mut detail = PluginDetailScreen::new(ctx.clone(), id);
            if detail.is_authenticated() {
                if let Err(e) = detail.mount().await {
                    return Err(banner(ctx, detail.plugin.error(), e));
                }
            }
            let jar = detail.download(&dir).await?;
            println!();
            println!("{} {}", "Saved:".green(), jar.path.display());
            println!("  Size: {} bytes", jar.size);
            println!("  SHA-256: {}", jar.sha256);
            println!();
        }
        PluginsAction::Purchase { id } => {
            let mut detail = PluginDetailScreen::new(ctx.clone(), id);
            detail.purchase().await?;
        }
        PluginsAction::Create {
            name,
            description,
            price,
            jar,
            thumbnail,
            tags,
            versions,
            contributors,
            version_number,
            changelog,
        } => {
            let mut screen = CreatePluginScreen::new(ctx.clone());
            screen.mount()?;

            screen.form.name = name;
            screen.form.description = description;
            screen.form.price = price;
            screen.form.version_number = version_number;
            screen.form.version_changelog = changelog;
            for tag in &tags {
                screen.add_tag(tag);
            }
            for version in &versions {
                screen.toggle_version(version);
            }
            for username in &contributors {
                screen.search_contributors(username).await?;
                let found = screen
                    .contributor_results
                    .iter()
                    .find(|u| u.username.eq_ignore_ascii_case(username))
                    .cloned();
                match found {
                    Some(user) => {
                        screen.add_contributor(user);
                    }
                    None => {
                        return Err(BazaarError::validation(format!(
                            "No user named '{}'",
                            username
                        )))
                    }
                }
            }
            screen.set_jar(Upload::from_path(&jar).await?)?;
            if let Some(path) = thumbnail {
                screen.set_thumbnail(Some(Upload::from_path(&path).await?));
            }

            let plugin = screen.submit().await?;
            println!();
            println!("{} {} ({})", "Created:".green(), plugin.name.cyan(), plugin.id);
            println!("  View it with: bazaar plugins show {}", plugin.id);
            println!();
        }
    }

    Ok(())
}

async fn handle_reviews(action: ReviewsAction, ctx: &AppContext) -> Result<()> {
    match action {
        ReviewsAction::List { plugin } => {
            let mut screen = ReviewsScreen::new(ctx.clone(), plugin);
            if let Err(e) = screen.mount().await {
                return Err(banner(ctx, screen.reviews.error(), e));
            }
            if let Some(reviews) = screen.reviews.value() {
                render::reviews(reviews, screen.user_review.as_ref());
            }
        }
        ReviewsAction::Post {
            plugin,
            rating,
            content,
        } => {
            let mut screen = ReviewsScreen::new(ctx.clone(), plugin);
            // Loaded first so an existing review is replaced, not duplicated
            if ctx.session.is_authenticated() {
                if let Err(e) = screen.mount().await {
                    return Err(banner(ctx, screen.reviews.error(), e));
                }
            }
            screen.submit_review(&content, rating).await?;
        }
        ReviewsAction::Like { plugin, review } => {
            let mut screen = ReviewsScreen::new(ctx.clone(), plugin);
            if ctx.session.is_authenticated() {
                if let Err(e) = screen.mount().await {
                    return Err(banner(ctx, screen.reviews.error(), e));
                }
            }
            if screen.like_review(&review).await? {
                println!("{} review {}", "Liked".green(), review);
            } else {
                println!("You already liked review {}", review);
            }
        }
    }

    Ok(())
}

async fn handle_forums(action: ForumsAction, ctx: &AppContext) -> Result<()> {
    match action {
        ForumsAction::Index => {
            let mut screen = ForumIndexScreen::new(ctx.clone());
            if let Err(e) = screen.mount().await {
                return Err(banner(ctx, screen.index.error(), e));
            }
            if let Some(index) = screen.index.value() {
                render::forum_index(index);
            }
        }
        ForumsAction::Topic { id } => {
            let mut screen = TopicScreen::new(ctx.clone(), id);
            if let Err(e) = screen.mount().await {
                return Err(banner(ctx, screen.view.error(), e));
            }
            if let Some(view) = screen.view.value() {
                render::topic(view);
            }
        }
        ForumsAction::New {
            title,
            content,
            category,
        } => {
            let mut screen = NewTopicScreen::new(ctx.clone());
            screen.mount().await?;
            screen.form.title = title;
            screen.form.content = content;
            if let Some(category) = category {
                screen.form.category_id = category;
            }
            let topic = screen.submit().await?;
            println!("  View it with: bazaar forums topic {}", topic.id);
        }
        ForumsAction::Reply { topic, content } => {
            let mut screen = TopicScreen::new(ctx.clone(), topic);
            let reply = screen.post_reply(&content).await?;
            render::reply_row(&reply);
            println!();
        }
        ForumsAction::Like { topic, reply } => {
            let mut screen = TopicScreen::new(ctx.clone(), topic);
            if ctx.session.is_authenticated() {
                if let Err(e) = screen.mount().await {
                    return Err(banner(ctx, screen.view.error(), e));
                }
            }
            if screen.like_reply(&reply).await? {
                println!("{} reply {}", "Liked".green(), reply);
            } else {
                println!("You already liked reply {}", reply);
            }
        }
    }

    Ok(())
}

async fn handle_user(action: UserAction, ctx: &AppContext) -> Result<()> {
    match action {
        UserAction::Show { id } => {
            let mut screen = ProfileScreen::new(ctx.clone(), id);
            if let Err(e) = screen.mount().await {
                return Err(banner(ctx, screen.view.error(), e));
            }
            if let Some(view) = screen.view.value() {
                render::profile(view);
            }
        }
    }

    Ok(())
}

async fn handle_me(action: MeAction, ctx: &AppContext) -> Result<()> {
    let mut screen = SettingsScreen::new(ctx.clone());
    screen.mount().await?;

    match action {
        MeAction::Show => {
            if let Some(user) = screen.user.value() {
                render::user(user);
                println!();
            }
        }
        MeAction::Update {
            username,
            email,
            bio,
            location,
            website,
            title,
            avatar,
        } => {
            let form = &mut screen.profile_form;
            let edits = [
                (&mut form.username, username),
                (&mut form.email, email),
                (&mut form.bio, bio),
                (&mut form.location, location),
                (&mut form.website, website),
                (&mut form.title, title),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    *field = value;
                }
            }

            let avatar = match avatar {
                Some(path) => Some(Upload::from_path(&path).await?),
                None => None,
            };
            let user = screen.update_profile(avatar).await?;
            render::user(&user);
            println!();
        }
        MeAction::Password => {
            screen.password_form.current_password = prompt_secret("Current password: ")?;
            screen.password_form.new_password = prompt_secret("New password: ")?;
            screen.password_form.confirm_password = prompt_secret("Confirm new password: ")?;
            screen.change_password().await?;
        }
    }

    Ok(())
}

async fn handle_login(ctx: &AppContext, email: &str) -> Result<()> {
    let password = prompt_secret("Password: ")?;

    match ctx.session.login(email, &password).await {
        Ok(user) => {
            println!("{} {}", "Logged in as".green(), user.username.cyan().bold());
            Ok(())
        }
        Err(e) => {
            ctx.notifier.error(e.user_message(LOGIN_FAILED));
            Err(e)
        }
    }
}

async fn handle_register(ctx: &AppContext, username: String, email: String) -> Result<()> {
    let password = prompt_secret("Password: ")?;
    let registration = Registration {
        username,
        email,
        password,
    };

    match ctx.session.register(&registration).await {
        Ok(()) => {
            println!("{} {}", "Registered:".green(), registration.username.cyan());
            println!("  Sign in with: bazaar login --email {}", registration.email);
            Ok(())
        }
        Err(e) => {
            ctx.notifier.error(e.user_message(REGISTRATION_FAILED));
            Err(e)
        }
    }
}

fn handle_logout(ctx: &AppContext) -> Result<()> {
    let was_signed_in = ctx.session.is_authenticated();
    NavbarState::new(ctx.clone()).logout()?;
    if was_signed_in {
        println!("{}", "Logged out.".green());
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

async fn handle_whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.restore().await? {
        Some(user) => {
            println!("{}", user.username.cyan().bold());
            if let Some(email) = &user.email {
                println!("  {}", email);
            }
            println!("  id: {}", user.id);
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Read a secret from the terminal without echo
fn prompt_secret(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(label)?)
}
