use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use reelshelf_core::config::TokenBackend;
use reelshelf_core::models::{Favorite, MovieSummary, Registration};
use reelshelf_core::utils::{format_date, format_rating, poster_url, truncate_string};
use reelshelf_core::views::{
    FavoritesController, LoginController, RegisterController, SearchController,
    SharedListController,
};
use reelshelf_core::{AppContext, Navigation};

/// Titles wider than this are cut in listings
const TITLE_WIDTH: usize = 48;

const LOGIN_HINT: &str = "You are not logged in. Run `reelshelf login` first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Logout,
    Register { username: String, email: String },
    Status,
    Search { query: String },
    Favorites,
    Toggle { tmdb_id: i64, query: String },
    Remove { tmdb_id: i64 },
    Share,
    Shared { input: String },
    Help,
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    let arg = arg.ok_or_else(|| anyhow!("missing movie id"))?;
    arg.parse()
        .with_context(|| format!("'{}' is not a valid movie id", arg))
}

fn join_query(words: &[String]) -> Result<String> {
    let query = words.join(" ");
    if query.trim().is_empty() {
        bail!("missing search query");
    }
    Ok(query)
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        let command = match name.as_str() {
            "login" => Command::Login {
                username: rest.first().cloned(),
            },
            "logout" => Command::Logout,
            "register" => match rest {
                [username, email, ..] => Command::Register {
                    username: username.clone(),
                    email: email.clone(),
                },
                _ => bail!("usage: reelshelf register <username> <email>"),
            },
            "status" => Command::Status,
            "search" => Command::Search {
                query: join_query(rest)?,
            },
            "favorites" | "favs" => Command::Favorites,
            "toggle" => Command::Toggle {
                tmdb_id: parse_id(rest.first())?,
                query: join_query(rest.get(1..).unwrap_or_default())?,
            },
            "remove" => Command::Remove {
                tmdb_id: parse_id(rest.first())?,
            },
            "share" => Command::Share,
            "shared" => Command::Shared {
                input: rest
                    .first()
                    .cloned()
                    .ok_or_else(|| anyhow!("missing share code or link"))?,
            },
            "help" | "-h" | "--help" => Command::Help,
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Register { .. } => "register",
            Command::Status => "status",
            Command::Search { .. } => "search",
            Command::Favorites => "favorites",
            Command::Toggle { .. } => "toggle",
            Command::Remove { .. } => "remove",
            Command::Share => "share",
            Command::Shared { .. } => "shared",
            Command::Help => "help",
        }
    }
}

pub fn print_usage() {
    eprintln!(
        "Usage: reelshelf <command> [args]

Commands:
  login [username]          Log in (password is prompted)
  logout                    Forget the stored session
  register <username> <email>
                            Create an account (password is prompted)
  status                    Show server and session details
  search <query...>         Search the movie catalog
  favorites                 List your favorites
  toggle <id> <query...>    Add or remove a movie found by <query>
  remove <id>               Remove a movie from your favorites
  share                     Create a public link to your favorites
  shared <code|link>        Show someone's shared list
  help                      Show this message

Environment:
  REELSHELF_API_URL         API base URL
  REELSHELF_SHARE_URL       Base URL used in share links
  REELSHELF_TOKEN_BACKEND   file | keyring
  RUST_LOG                  Log filter (default: warn)"
    );
}

/// Print whatever the notifier currently shows
pub fn report_notification(ctx: &AppContext) {
    if let Some(notification) = ctx.notifier.current() {
        eprintln!("[{}] {}", notification.severity.label(), notification.text);
    }
}

fn require_session(navigation: Navigation) -> Result<()> {
    if navigation == Navigation::ToLogin {
        bail!(LOGIN_HINT);
    }
    Ok(())
}

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn print_movie(movie: &MovieSummary, favorite: bool) {
    let marker = if favorite { '*' } else { ' ' };
    println!(
        "{} {:>8}  {:<width$}  {:>4}  {:>4}",
        marker,
        movie.id,
        truncate_string(&movie.title, TITLE_WIDTH),
        movie.year().unwrap_or("----"),
        format_rating(Some(movie.vote_average)),
        width = TITLE_WIDTH,
    );
}

fn print_favorite(favorite: &Favorite) {
    let released = favorite
        .release_date
        .map(|d| d.format("%Y").to_string())
        .unwrap_or_else(|| "----".to_string());
    println!(
        "{:>8}  {:<width$}  {:>4}  {:>4}  added {}",
        favorite.tmdb_id,
        truncate_string(&favorite.title, TITLE_WIDTH),
        released,
        format_rating(favorite.rating),
        format_date(&favorite.added_at),
        width = TITLE_WIDTH,
    );
    if let Some(url) = poster_url(favorite.poster_path.as_deref()) {
        tracing::debug!(tmdb_id = favorite.tmdb_id, poster = %url, "Poster");
    }
}

pub async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => login(ctx, username).await,
        Command::Logout => {
            ctx.session.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Register { username, email } => register(ctx, username, email).await,
        Command::Status => {
            status(ctx);
            Ok(())
        }
        Command::Search { query } => search(ctx, &query).await,
        Command::Favorites => favorites(ctx).await,
        Command::Toggle { tmdb_id, query } => toggle(ctx, tmdb_id, &query).await,
        Command::Remove { tmdb_id } => {
            let mut favorites = FavoritesController::new(ctx);
            require_session(favorites.mount().await)?;
            require_session(favorites.remove(tmdb_id).await)
        }
        Command::Share => share(ctx).await,
        Command::Shared { input } => shared(ctx, &input).await,
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

async fn login(ctx: &AppContext, username: Option<String>) -> Result<()> {
    let mut controller = LoginController::new(ctx);
    if controller.on_mount() == Navigation::ToFavorites {
        println!("Already logged in. Run `reelshelf logout` to switch accounts.");
        return Ok(());
    }

    let username = match username.or_else(|| ctx.config.last_username.clone()) {
        Some(name) => name,
        None => prompt_line("Username: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", username))
        .context("Failed to read password")?;

    match controller.submit(&username, &password).await {
        Navigation::ToFavorites => {
            let mut config = ctx.config.clone();
            config.last_username = Some(username.trim().to_string());
            if let Err(e) = config.save() {
                tracing::warn!(error = %e, "Could not remember username");
            }
            println!("Logged in as {}.", username.trim());
            Ok(())
        }
        _ => Err(anyhow!(controller
            .error
            .unwrap_or_else(|| "Login failed.".to_string()))),
    }
}

async fn register(ctx: &AppContext, username: String, email: String) -> Result<()> {
    let password = rpassword::prompt_password("Choose a password: ")
        .context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Repeat password: ").context("Failed to read password")?;
    if password != confirm {
        bail!("Passwords do not match.");
    }

    let registration = Registration {
        username,
        email,
        password,
    };
    let mut controller = RegisterController::new(ctx);
    match controller.submit(&registration).await {
        Navigation::ToLogin => {
            println!("Run `reelshelf login {}` to sign in.", registration.username);
            Ok(())
        }
        _ => Err(anyhow!(controller
            .error
            .unwrap_or_else(|| "Registration failed.".to_string()))),
    }
}

fn status(ctx: &AppContext) {
    let backend = match ctx.config.token_backend {
        TokenBackend::File => "file",
        TokenBackend::Keyring => "keyring",
    };
    println!("API:           {}", ctx.api.base_url());
    println!("Share links:   {}", ctx.config.share_base_url);
    println!("Token storage: {}", backend);
    println!(
        "Session:       {}",
        if ctx.session.is_authenticated() {
            "logged in"
        } else {
            "logged out"
        }
    );
    if let Some(name) = &ctx.config.last_username {
        println!("Last user:     {}", name);
    }
}

async fn search(ctx: &AppContext, query: &str) -> Result<()> {
    let controller = SearchController::new(ctx);
    let (mounted, searched) = futures::join!(controller.mount(), controller.search(query));
    require_session(mounted)?;
    require_session(searched)?;

    let state = controller.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }
    if state.movies.is_empty() {
        println!("No movies found for '{}'.", state.query);
        return Ok(());
    }
    for movie in &state.movies {
        print_movie(movie, state.favorite_ids.contains(&movie.id));
    }
    Ok(())
}

async fn toggle(ctx: &AppContext, tmdb_id: i64, query: &str) -> Result<()> {
    // Nothing is cached between runs: find the movie again
    let controller = SearchController::new(ctx);
    let (mounted, searched) = futures::join!(controller.mount(), controller.search(query));
    require_session(mounted)?;
    require_session(searched)?;

    let state = controller.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }
    let movie = state
        .movies
        .iter()
        .find(|m| m.id == tmdb_id)
        .ok_or_else(|| anyhow!("Movie {} is not in the results for '{}'.", tmdb_id, query))?;

    require_session(controller.toggle_favorite(movie).await)?;
    print_movie(movie, controller.is_favorite(movie.id));
    Ok(())
}

async fn favorites(ctx: &AppContext) -> Result<()> {
    let mut controller = FavoritesController::new(ctx);
    require_session(controller.mount().await)?;
    if let Some(error) = controller.error {
        bail!(error);
    }
    if controller.favorites.is_empty() {
        println!("Your favorites list is empty. Try `reelshelf search <title>`.");
        return Ok(());
    }
    for favorite in &controller.favorites {
        print_favorite(favorite);
    }
    Ok(())
}

async fn share(ctx: &AppContext) -> Result<()> {
    let mut controller = FavoritesController::new(ctx);
    require_session(controller.mount().await)?;
    if let Some(error) = controller.error.take() {
        bail!(error);
    }
    require_session(controller.generate_share_link().await)?;
    if let Some(e) = controller.share_error {
        return Err(e.into());
    }
    let url = controller
        .share_link
        .ok_or_else(|| anyhow!("No share link was generated."))?;
    println!("{}", url);
    Ok(())
}

async fn shared(ctx: &AppContext, input: &str) -> Result<()> {
    let mut controller = SharedListController::new(ctx);
    controller.load(input).await;
    if let Some(error) = controller.error {
        bail!(error);
    }
    let Some(list) = controller.shared else {
        bail!("Nothing to show.");
    };

    println!("Shared on {}", format_date(&list.created_at));
    if list.is_empty() {
        println!("This list is empty.");
    }
    for favorite in &list.favorites {
        print_favorite(favorite);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
        assert_eq!(
            Command::parse(&args("login bob")).unwrap(),
            Command::Login {
                username: Some("bob".into())
            }
        );
        assert_eq!(
            Command::parse(&args("search the matrix")).unwrap(),
            Command::Search {
                query: "the matrix".into()
            }
        );
        assert_eq!(
            Command::parse(&args("toggle 603 the matrix")).unwrap(),
            Command::Toggle {
                tmdb_id: 603,
                query: "the matrix".into()
            }
        );
        assert_eq!(
            Command::parse(&args("remove 603")).unwrap(),
            Command::Remove { tmdb_id: 603 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse(&args("search")).is_err());
        assert!(Command::parse(&args("remove abc")).is_err());
        assert!(Command::parse(&args("toggle 603")).is_err());
        assert!(Command::parse(&args("register bob")).is_err());
        assert!(Command::parse(&args("shared")).is_err());
        assert!(Command::parse(&args("frobnicate")).is_err());
    }
}
