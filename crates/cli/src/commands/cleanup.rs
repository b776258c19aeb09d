//! Test-data cleanup against the LMS backend

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use qarelay_common::FrameworkConfig;
use qarelay_integrations::lms::LmsClient;

use crate::output::{print_success, print_warning};

#[derive(Subcommand)]
pub enum CleanupCommands {
    /// Delete a test user by email
    User(UserArgs),

    /// Delete a test group by id
    Group(GroupArgs),
}

#[derive(Args)]
pub struct UserArgs {
    /// Email address of the user to remove
    pub email: String,
}

#[derive(Args)]
pub struct GroupArgs {
    /// Numeric id of the group to remove
    pub id: u64,
}

pub async fn execute(cmd: CleanupCommands, config_path: &Path) -> Result<()> {
    let config = FrameworkConfig::load(config_path)?;
    let lms = config
        .lms
        .as_ref()
        .context("LMS is not configured; add an [lms] section to the configuration file")?;
    let client = LmsClient::connect(lms).await?;

    match cmd {
        CleanupCommands::User(args) => {
            if client.delete_user_by_email(&args.email).await? {
                print_success(&format!("Deleted user {}", args.email));
            } else {
                print_warning(&format!("No user found for {}", args.email));
            }
        }
        CleanupCommands::Group(args) => {
            client.delete_group(args.id).await?;
            print_success(&format!("Deleted group {}", args.id));
        }
    }

    Ok(())
}
