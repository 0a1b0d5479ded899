//! Command-line surface of `fleva`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "fleva",
    version,
    about = "FLEVA campus posts from the command line",
    long_about = None
)]
pub struct Cli {
    /// API base URL, e.g. <http://localhost:8080>
    #[arg(long, env = "FLEVA_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Identifier sent with write requests
    #[arg(long, env = "FLEVA_ACTOR_ID", global = true)]
    pub actor: Option<String>,

    /// Local mirror file used while the API is unreachable
    #[arg(long, env = "FLEVA_MIRROR_PATH", global = true)]
    pub mirror: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List posts
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Server)]
        sort: SortArg,
    },
    /// Show a single post
    Show { id: String },
    /// Submit a new post
    Create {
        #[command(flatten)]
        fields: PostArgs,
        /// Image to attach after the post is created
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Replace the editable fields of a post
    Update {
        id: String,
        #[command(flatten)]
        fields: PostArgs,
    },
    /// Delete a post
    Delete { id: String },
    /// Print the URL of a post's image
    ImageUrl { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct PostArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub body: String,

    /// Category label; pass an empty string for none
    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long)]
    pub community: Option<String>,

    /// Show your identity on the post (posts are anonymous by default)
    #[arg(long)]
    pub public: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Keep the order returned by the API
    Server,
    /// Newest first
    Recent,
    /// Highest score first
    Score,
}
