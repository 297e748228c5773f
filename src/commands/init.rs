use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Locale;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/gofinances`
/// - `client_id` - The Google OAuth client id
/// - `client_secret` - The Google OAuth client secret, if the client type needs one
/// - `locale` - How amounts, dates and labels are displayed
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    home: &Path,
    client_id: &str,
    client_secret: Option<&str>,
    locale: Locale,
) -> Result<Out<()>> {
    let config = Config::create(home, client_id, client_secret, locale)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the gofinances directory at {}",
        config.root().display()
    )
    .into())
}
