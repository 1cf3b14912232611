use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::bindings::Bindings;
use crate::error::AppError;
use crate::state::response::Response;
use crate::storage::library::default_config_path;

#[derive(Parser, Debug)]
#[command(name = "httplab", version, about = "An interactive web server")]
pub struct Args {
    /// Auto-updates response when fields change.
    #[arg(short = 'a', long, action = ArgAction::Set, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub auto_update: bool,

    /// Specifies the initial response body.
    #[arg(short, long, default_value = "Hello, World")]
    pub body: String,

    /// Specifies custom config path.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable CORS.
    #[arg(long, default_value_t = false)]
    pub cors: bool,

    /// Display CORS requests.
    #[arg(long, action = ArgAction::Set, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub cors_display: bool,

    /// Specifies the initial response delay in ms.
    #[arg(short, long, default_value_t = 0)]
    pub delay: u64,

    /// Specifies the initial response headers.
    #[arg(short = 'H', long, value_delimiter = ',', default_value = "X-Server:HTTPLab")]
    pub headers: Vec<String>,

    /// Specifies the port where HTTPLab will bind to.
    #[arg(short, long, default_value_t = 10080)]
    pub port: u16,

    /// Specifies the initial response status.
    #[arg(short, long, default_value = "200")]
    pub status: String,

    /// Where to write the debug log.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Parses the process arguments. `--help` ends with the key bindings.
pub fn parse() -> Args {
    let matches = Args::command()
        .after_help(format!("Bindings:\n{}", Bindings::DEFAULT.help()))
        .get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

impl Args {
    pub fn initial_response(&self) -> Result<Response, AppError> {
        let mut resp = Response::parse(&self.status, &self.headers.join("\n"), &self.body)?;
        resp.delay = Duration::from_millis(self.delay);
        Ok(resp)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("httplab").join("httplab.log")))
    }
}
