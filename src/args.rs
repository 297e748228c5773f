//! These structs provide the CLI interface for the gofinances CLI.

use crate::model::Locale;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// gofinances: Sign in and look at where your money went.
///
/// Transactions are kept per signed-in user in a local storage file. The dashboard shows how much
/// came in, how much went out and the balance, followed by the list of transactions.
///
/// Signing in with Google needs an OAuth client id, which you pass to `gofinances init`. The
/// sign-in prints a URL to open in your browser and waits for Google to redirect back.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Create an OAuth client of type "Desktop app" in
    /// the Google Cloud console and pass its id as --client-id. Desktop clients also come with a
    /// secret, pass it as --client-secret.
    Init(InitArgs),
    /// Sign in with Google or Apple and remember who you are.
    SignIn(SignInArgs),
    /// Forget the signed-in user.
    SignOut,
    /// Show the signed-in user.
    Whoami,
    /// Show the highlight cards and the transaction list of the signed-in user.
    Dashboard,
    /// Append transactions from a JSON or CSV file to the signed-in user's list.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where gofinances data and configuration is held. Defaults to ~/gofinances
    #[arg(long, env = "GOFINANCES_HOME", default_value_t = default_gofinances_home())]
    gofinances_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, gofinances_home: PathBuf) -> Self {
        Self {
            log_level,
            gofinances_home: gofinances_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn gofinances_home(&self) -> &DisplayPath {
        &self.gofinances_home
    }
}

/// (Not shown): Args for the `gofinances init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The Google OAuth client id, ending in .apps.googleusercontent.com
    #[arg(long, env = "GOFINANCES_CLIENT_ID")]
    client_id: String,

    /// The Google OAuth client secret, if your client has one.
    #[arg(long, env = "GOFINANCES_CLIENT_SECRET")]
    client_secret: Option<String>,

    /// How amounts, dates and labels are displayed: pt-BR or en-US
    #[arg(long, default_value_t = Locale::PtBr)]
    locale: Locale,
}

impl InitArgs {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        locale: Locale,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            locale,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// The identity providers that can be used to sign in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    Apple,
}

serde_plain::derive_display_from_serialize!(Provider);
serde_plain::derive_fromstr_from_deserialize!(Provider);

/// (Not shown): Args for the `gofinances sign-in` command.
#[derive(Debug, Parser, Clone)]
pub struct SignInArgs {
    /// The identity provider: "google" or "apple"
    #[arg(value_enum)]
    provider: Provider,
}

impl SignInArgs {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

/// (Not shown): Args for the `gofinances import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The file to read. Files ending in .csv need a header row with the columns name, amount,
    /// type, category and date, and optionally id. Any other file is read as a JSON array of
    /// objects with the same fields.
    #[clap(long = "file", short = 'f')]
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

fn default_gofinances_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("gofinances"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --gofinances-home or GOFINANCES_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("gofinances")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
