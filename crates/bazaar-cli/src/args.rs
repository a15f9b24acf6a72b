use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(about = "Terminal client for the Minecraft plugin bazaar")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.plugin-bazaar)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// API origin (overrides config and BAZAAR_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse, download and publish plugins
    Plugins {
        #[command(subcommand)]
        action: PluginsAction,
    },

    /// Read, post and like plugin reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },

    /// Community forums
    Forums {
        #[command(subcommand)]
        action: ForumsAction,
    },

    /// Public user profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Your own account settings
    Me {
        #[command(subcommand)]
        action: MeAction,
    },

    /// Sign in and remember the session
    Login {
        /// Account email; the password is prompted without echo
        #[arg(short, long)]
        email: String,
    },

    /// Create an account (does not sign in)
    Register {
        #[arg(short, long)]
        username: String,

        /// Account email; the password is prompted without echo
        #[arg(short, long)]
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PluginsAction {
    /// List plugins (filtered and sorted by the server)
    List {
        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Category (e.g., Economy, "Admin Tools")
        #[arg(short, long)]
        category: Option<String>,

        /// Minecraft version (e.g., 1.20)
        #[arg(long = "mc-version", value_name = "VERSION")]
        minecraft_version: Option<String>,

        /// Price bucket: all, free, paid
        #[arg(long, default_value = "all")]
        price: String,

        /// Sort: newest, popular, price-low, price-high, rating
        #[arg(long, default_value = "newest")]
        sort: String,
    },

    /// Featured plugins from the home page
    Featured,

    /// Plugin details, related plugins and version history
    Show {
        /// Plugin id
        id: String,
    },

    /// Download the plugin jar
    Download {
        /// Plugin id
        id: String,

        /// Target directory (default: download.dir from config, else current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Purchase a paid plugin
    Purchase {
        /// Plugin id
        id: String,
    },

    /// Publish a new plugin
    Create {
        /// Plugin name
        #[arg(short, long)]
        name: String,

        /// Description (HTML allowed)
        #[arg(short, long)]
        description: String,

        /// Price in USD (0 for free)
        #[arg(long, default_value = "0")]
        price: f64,

        /// Jar file to upload
        #[arg(long)]
        jar: PathBuf,

        /// Thumbnail image
        #[arg(long)]
        thumbnail: Option<PathBuf>,

        /// Tag (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Supported Minecraft version (repeatable, e.g., --mc-version 1.20)
        #[arg(long = "mc-version", value_name = "VERSION")]
        versions: Vec<String>,

        /// Contributor username (repeatable; must match exactly one user)
        #[arg(long = "contributor", value_name = "USERNAME")]
        contributors: Vec<String>,

        /// Initial version number
        #[arg(long, default_value = "1.0.0")]
        version_number: String,

        /// Changelog for the initial version
        #[arg(long, default_value = "")]
        changelog: String,
    },
}

#[derive(Subcommand)]
pub enum ReviewsAction {
    /// List reviews of a plugin
    List {
        /// Plugin id
        plugin: String,
    },

    /// Post or replace your review
    Post {
        /// Plugin id
        plugin: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text
        #[arg(short, long, default_value = "")]
        content: String,
    },

    /// Like a review
    Like {
        /// Plugin id
        plugin: String,

        /// Review id
        review: String,
    },
}

#[derive(Subcommand)]
pub enum ForumsAction {
    /// Categories and recent topics
    Index,

    /// Show a topic with its replies
    Topic {
        /// Topic id
        id: String,
    },

    /// Start a new topic
    New {
        #[arg(short, long)]
        title: String,

        /// Content (HTML allowed)
        #[arg(short, long)]
        content: String,

        /// Category id (default: first category)
        #[arg(long)]
        category: Option<String>,
    },

    /// Reply to a topic
    Reply {
        /// Topic id
        topic: String,

        /// Reply content
        content: String,
    },

    /// Like a reply
    Like {
        /// Topic id
        topic: String,

        /// Reply id
        reply: String,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Show a user's profile and plugins
    Show {
        /// User id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum MeAction {
    /// Show your profile
    Show,

    /// Update profile fields (omitted fields keep their value)
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// New avatar image
        #[arg(long)]
        avatar: Option<PathBuf>,
    },

    /// Change your password (prompts for the values)
    Password,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., api.base_url)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., api.timeout_secs)
        key: String,

        /// Value to set (e.g., "https://bazaar.example.com" or "60")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
