//! Command parsing and execution.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use sitekeep_core::models::{Comment, Media, NewComment};
use sitekeep_core::{Collection, Config, ContentStore, PortfolioOutcome, ReadSource, StoreError};

pub const USAGE: &str = "\
Usage: sitekeep <command> [args]

Commands:
  seed                                   Write default data to empty collections
  show <collection>                      Print a collection as JSON
  status                                 Connection, last sync and collection sizes
  sync                                   Re-read every collection from the remote store
  testimonials                           List approved comments
  comment <user> <rating> <text>         Submit a comment (stored as pending)
  approve <id>                           Approve a pending comment
  delete <collection> <id> [--yes]       Delete a record
  categories                             List portfolio categories
  add-category <label>                   Add a portfolio category
  rename-category <value> <label>        Rename a portfolio category
  delete-category <value> [--yes]        Delete a portfolio category
  add-media <title> <category> <url> [--video] [--cover <url>]
                                         Add a portfolio project or gallery entry
  remove-media <id> <index> [--yes]      Remove one gallery entry from a project
  clear-cache [--yes]                    Drop the local cache
  connect <url> [--api-key <key>]        Save the remote store in the config file
  disconnect                             Remove the remote store from the config file
  help                                   Show this message

Collections: services, portfolio, comments, pricing, process, content, categories";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Seed,
    Show(Collection),
    Status,
    Sync,
    Testimonials,
    Comment { user: String, rating: u8, text: String },
    Approve(i64),
    Delete { collection: Collection, id: i64, yes: bool },
    Categories,
    AddCategory(String),
    RenameCategory { value: String, label: String },
    DeleteCategory { value: String, yes: bool },
    AddMedia { title: String, category: String, media: Media },
    RemoveMedia { id: i64, index: usize, yes: bool },
    ClearCache { yes: bool },
    Connect { url: String, api_key: Option<String> },
    Disconnect,
    Help,
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{}>", name))
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>().with_context(|| format!("invalid id: {}", raw))
}

/// Split `--yes`/`-y` out of the argument list.
fn take_yes(args: &[String]) -> (Vec<String>, bool) {
    let yes = args.iter().any(|a| a == "--yes" || a == "-y");
    let rest = args
        .iter()
        .filter(|a| *a != "--yes" && *a != "-y")
        .cloned()
        .collect();
    (rest, yes)
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let (name, rest) = match args.split_first() {
            Some((name, rest)) => (name.as_str(), rest),
            None => return Ok(Command::Help),
        };
        let (rest, yes) = take_yes(rest);

        let command = match name {
            "seed" => Command::Seed,
            "show" => Command::Show(arg(&rest, 0, "collection")?.parse()?),
            "status" => Command::Status,
            "sync" => Command::Sync,
            "testimonials" => Command::Testimonials,
            "comment" => {
                let user = arg(&rest, 0, "user")?.to_string();
                let raw = arg(&rest, 1, "rating")?;
                let rating = raw
                    .parse::<u8>()
                    .with_context(|| format!("invalid rating: {}", raw))?;
                if rest.len() < 3 {
                    bail!("missing <text>");
                }
                Command::Comment {
                    user,
                    rating,
                    text: rest[2..].join(" "),
                }
            }
            "approve" => Command::Approve(parse_id(arg(&rest, 0, "id")?)?),
            "delete" => Command::Delete {
                collection: arg(&rest, 0, "collection")?.parse()?,
                id: parse_id(arg(&rest, 1, "id")?)?,
                yes,
            },
            "categories" => Command::Categories,
            "add-category" => {
                if rest.is_empty() {
                    bail!("missing <label>");
                }
                Command::AddCategory(rest.join(" "))
            }
            "rename-category" => {
                let value = arg(&rest, 0, "value")?.to_string();
                if rest.len() < 2 {
                    bail!("missing <label>");
                }
                Command::RenameCategory {
                    value,
                    label: rest[1..].join(" "),
                }
            }
            "delete-category" => Command::DeleteCategory {
                value: arg(&rest, 0, "value")?.to_string(),
                yes,
            },
            "add-media" => Self::parse_add_media(&rest)?,
            "remove-media" => {
                let raw = arg(&rest, 1, "index")?;
                Command::RemoveMedia {
                    id: parse_id(arg(&rest, 0, "id")?)?,
                    index: raw
                        .parse::<usize>()
                        .with_context(|| format!("invalid index: {}", raw))?,
                    yes,
                }
            }
            "clear-cache" => Command::ClearCache { yes },
            "connect" => Self::parse_connect(&rest)?,
            "disconnect" => Command::Disconnect,
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("unknown command: {}", other),
        };
        Ok(command)
    }

    fn parse_connect(args: &[String]) -> Result<Self> {
        let mut url = None;
        let mut api_key = None;

        let mut iter = args.iter();
        while let Some(a) = iter.next() {
            match a.as_str() {
                "--api-key" => {
                    let key = iter.next().ok_or_else(|| anyhow!("--api-key needs a value"))?;
                    api_key = Some(key.clone());
                }
                _ if url.is_none() => url = Some(a.clone()),
                other => bail!("unexpected argument: {}", other),
            }
        }

        Ok(Command::Connect {
            url: url.ok_or_else(|| anyhow!("missing <url>"))?,
            api_key,
        })
    }

    /// Whether default data must be in place before the command runs.
    pub fn seeds_on_start(&self) -> bool {
        !matches!(
            self,
            Command::Seed
                | Command::ClearCache { .. }
                | Command::Connect { .. }
                | Command::Disconnect
                | Command::Help
        )
    }

    /// Apply a configuration command. Returns the message to print, or
    /// `None` when the command works on the store instead.
    pub fn apply_to_config(&self, config: &mut Config) -> Option<String> {
        match self {
            Command::Connect { url, api_key } => {
                config.set_remote(url, api_key.clone());
                Some(format!("Remote store set to {}.", url))
            }
            Command::Disconnect => {
                config.clear_remote();
                Some("Remote store removed; running on the local cache only.".to_string())
            }
            _ => None,
        }
    }

    fn parse_add_media(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut is_video = false;
        let mut cover = None;

        let mut iter = args.iter();
        while let Some(a) = iter.next() {
            match a.as_str() {
                "--video" => is_video = true,
                "--cover" => {
                    let url = iter.next().ok_or_else(|| anyhow!("--cover needs a url"))?;
                    cover = Some(url.clone());
                }
                _ => positional.push(a.clone()),
            }
        }

        let title = arg(&positional, 0, "title")?.to_string();
        let category = arg(&positional, 1, "category")?.to_string();
        let url = arg(&positional, 2, "url")?.to_string();
        let media = if is_video {
            Media::video(url, cover)
        } else {
            Media {
                cover_url: cover,
                ..Media::image(url)
            }
        };
        Ok(Command::AddMedia {
            title,
            category,
            media,
        })
    }

    pub async fn run(self, store: &ContentStore) -> Result<()> {
        match self {
            Command::Seed => {
                let seeded = store.ensure_seeded().await.map_err(not_saved)?;
                if seeded.is_empty() {
                    println!("All collections already hold data.");
                }
                for collection in seeded {
                    println!("Seeded {}", collection);
                }
            }
            Command::Show(collection) => {
                let loaded = store.load_collection(collection).await;
                if let Some(notice) = loaded.notice {
                    eprintln!("Warning: {}", notice);
                }
                println!("{}", serde_json::to_string_pretty(&loaded.value)?);
            }
            Command::Status => status(store).await,
            Command::Sync => match store.force_sync().await {
                Ok(at) => println!("Synced at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                Err(StoreError::Offline) => bail!("No remote store configured; nothing to sync."),
                Err(e) => return Err(e.into()),
            },
            Command::Testimonials => {
                for comment in store.approved_testimonials().await? {
                    print_comment(&comment);
                }
            }
            Command::Comment { user, rating, text } => {
                let comment = store
                    .submit_public_comment(NewComment::new(user, text, Some(rating)))
                    .await
                    .map_err(not_saved)?;
                println!("Comment {} submitted for review.", comment.id);
            }
            Command::Approve(id) => match store.approve_comment(id).await.map_err(not_saved)? {
                Some(comment) => print_comment(&comment),
                None => println!("No comment with id {}.", id),
            },
            Command::Delete { collection, id, yes } => {
                if !confirm(&format!("Delete {} {}?", collection, id), yes)? {
                    return Ok(());
                }
                if store.delete_record(collection, id).await.map_err(not_saved)? {
                    println!("Deleted {} {}.", collection, id);
                } else {
                    println!("Nothing to delete.");
                }
            }
            Command::Categories => {
                for category in store.categories().await? {
                    println!("{:<12} {}", category.value, category.label);
                }
            }
            Command::AddCategory(label) => {
                let category = store.add_category(&label).await.map_err(not_saved)?;
                println!("Added {} ({}).", category.label, category.value);
            }
            Command::RenameCategory { value, label } => {
                match store.rename_category(&value, &label).await.map_err(not_saved)? {
                    Some(category) => println!("Renamed {} to {} ({}).", value, category.label, category.value),
                    None => println!("No category {}.", value),
                }
            }
            Command::DeleteCategory { value, yes } => {
                if !confirm(&format!("Delete category {}?", value), yes)? {
                    return Ok(());
                }
                if store.delete_category(&value).await.map_err(not_saved)? {
                    println!("Deleted category {}.", value);
                } else {
                    println!("No category {}.", value);
                }
            }
            Command::AddMedia {
                title,
                category,
                media,
            } => {
                let outcome = store
                    .add_portfolio_media(&title, &category, media)
                    .await
                    .map_err(not_saved)?;
                let item = outcome.item();
                match outcome {
                    PortfolioOutcome::Created(_) => println!("Created project {} ({}).", item.title, item.id),
                    PortfolioOutcome::AddedToGallery(_) => println!(
                        "Added to existing project {} ({} items).",
                        item.title,
                        item.gallery_len()
                    ),
                }
            }
            Command::RemoveMedia { id, index, yes } => {
                if !confirm(&format!("Remove item {} from project {}?", index, id), yes)? {
                    return Ok(());
                }
                if store.delete_gallery_item(id, index).await.map_err(not_saved)? {
                    println!("Removed.");
                } else {
                    println!("No project with id {}.", id);
                }
            }
            Command::ClearCache { yes } => {
                if !confirm("Clear the local cache?", yes)? {
                    return Ok(());
                }
                store.clear_local()?;
                println!("Local cache cleared.");
            }
            Command::Connect { .. } | Command::Disconnect => {
                bail!("configuration commands do not run against the store")
            }
            Command::Help => println!("{}", USAGE),
        }
        Ok(())
    }
}

async fn status(store: &ContentStore) {
    let mode = if store.is_connected() { "remote" } else { "offline" };
    println!("Mode:        {}", mode);
    println!("Last synced: {}", store.sync_status().age_display());

    for collection in Collection::ALL {
        let loaded = store.load_collection(collection).await;
        let size = match &loaded.value {
            Value::Array(items) => format!("{} items", items.len()),
            Value::Object(_) => "set".to_string(),
            _ => "empty".to_string(),
        };
        let source = match loaded.source {
            ReadSource::Cache => "cache",
            ReadSource::Remote => "remote",
            ReadSource::Empty => "-",
        };
        println!("  {:<22} {:<10} {}", collection.name(), size, source);
        if let Some(notice) = loaded.notice {
            eprintln!("Warning: {}", notice);
        }
    }
}

fn print_comment(comment: &Comment) {
    println!(
        "[{}] {} ({}/5, {:?}): {}",
        comment.id, comment.user, comment.rating, comment.status, comment.text
    );
}

/// A failed remote write means nothing was saved anywhere.
fn not_saved(e: StoreError) -> anyhow::Error {
    match e {
        StoreError::RemoteWrite { .. } => {
            anyhow::Error::new(e).context("Changes were NOT saved. Check the connection and try again")
        }
        other => other.into(),
    }
}

fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let confirmed = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    if !confirmed {
        println!("Cancelled.");
    }
    Ok(confirmed)
}
