// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};

use crate::params::LaunchParams;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-showcase")]
#[command(about = "Interactive glTF model viewer with a newsletter sign-up", long_about = None)]
pub struct Cli {
    /// Hide the newsletter form; the title and load status stay visible
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Model to show (path or http(s) URL to a .glb/.gltf)
    #[arg(long)]
    pub model: Option<String>,

    /// Same as --model; --model wins when both are given
    #[arg(long)]
    pub asset: Option<String>,

    /// Overlay heading
    #[arg(long)]
    pub title: Option<String>,

    /// Overlay sub-heading
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Launch parameters as a query string, e.g. "title=Lemon&model=lemon.glb"
    #[arg(long)]
    pub query: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit an e-mail address to the newsletter endpoint and exit
    Subscribe { email: String },
}

impl Cli {
    /// Parameters from `--query`, overridden by explicit flags
    pub fn launch_params(&self) -> LaunchParams {
        let from_query = self
            .query
            .as_deref()
            .map(LaunchParams::from_query)
            .unwrap_or_default();

        from_query.merge(LaunchParams {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            model: self.model.clone(),
            asset: self.asset.clone(),
        })
    }
}
