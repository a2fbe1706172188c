// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use idsync::GitHubConfig;
use idsync::InviteTarget;
use idsync::OneLoginConfig;
use idsync_cli::Deprovisioner;
use idsync_cli::Inviter;
use idsync_cli::Provisioner;
use slog::Drain;
use slog::o;

#[derive(Debug, Parser)]
#[clap(about = "Synchronize OneLogin identities with GitHub memberships")]
struct Args {
    /// Log HTTP-level diagnostics
    #[clap(long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Delete provisioned SCIM users listed in a roster CSV
    Deprovision(DeprovisionArgs),

    /// Invite roster emails to a GitHub organization
    Invite(InviteArgs),

    /// Create SCIM user records on GitHub from OneLogin profiles
    Provision(ProvisionArgs),
}

#[derive(Debug, clap::Args)]
struct OneLoginOpts {
    /// OAuth2 client id for the OneLogin API
    #[clap(long, env = "ONELOGIN_CLIENT_ID")]
    onelogin_client_id: String,

    #[clap(long, env = "ONELOGIN_CLIENT_SECRET", hide_env_values = true)]
    onelogin_client_secret: String,

    /// Regional OneLogin API host, e.g. https://api.us.onelogin.com
    #[clap(long, env = "ONELOGIN_BASE_URL")]
    onelogin_base_url: String,
}

impl OneLoginOpts {
    fn to_config(&self) -> OneLoginConfig {
        OneLoginConfig {
            client_id: self.onelogin_client_id.clone(),
            client_secret: self.onelogin_client_secret.clone(),
            base_url: self.onelogin_base_url.clone(),
        }
    }
}

#[derive(Debug, clap::Args)]
struct DeprovisionArgs {
    /// A personal access token with enterprise admin scope
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Enterprise slug the SCIM endpoints are scoped to
    #[clap(long, env = "GITHUB_ENTERPRISE")]
    enterprise: String,

    #[clap(long, env = "GITHUB_API_URL",
        default_value = idsync::DEFAULT_GITHUB_API_URL)]
    api_url: String,

    /// Roster CSV with an `email` column
    #[clap(long, env = "CSV_FILE",
        default_value = "users_to_deprovision.csv")]
    csv_file: PathBuf,
}

#[derive(Debug, clap::Args)]
struct InviteArgs {
    #[clap(flatten)]
    onelogin: OneLoginOpts,

    /// A personal access token with admin:org scope
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Organization to invite into; takes precedence over --enterprise
    #[clap(long, env = "GITHUB_ORG")]
    org: Option<String>,

    /// Enterprise slug; the enterprise-level invitation path is reported
    /// as unsupported
    #[clap(long, env = "GITHUB_ENTERPRISE")]
    enterprise: Option<String>,

    #[clap(long, env = "GITHUB_API_URL",
        default_value = idsync::DEFAULT_GITHUB_API_URL)]
    api_url: String,

    /// Membership role granted by the invitation
    #[clap(long, env = "GITHUB_ROLE", default_value = "direct_member")]
    role: String,

    /// Roster CSV with an `email` column
    #[clap(long, env = "CSV_FILE", default_value = "user_emails.csv")]
    csv_file: PathBuf,

    /// Directory the timestamped audit CSV is written to
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Debug, clap::Args)]
struct ProvisionArgs {
    #[clap(flatten)]
    onelogin: OneLoginOpts,

    /// A personal access token with enterprise admin scope
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Enterprise slug the SCIM endpoints are scoped to
    #[clap(long, env = "GITHUB_ENTERPRISE")]
    enterprise: String,

    #[clap(long, env = "GITHUB_API_URL",
        default_value = idsync::DEFAULT_GITHUB_API_URL)]
    api_url: String,

    /// Role carried in the SCIM payload's roles attribute
    #[clap(long, env = "GITHUB_ROLE", default_value = "member")]
    role: String,

    /// Roster CSV with an `email` column
    #[clap(long, env = "CSV_FILE", default_value = "user_emails.csv")]
    csv_file: PathBuf,

    /// Directory the timestamped audit CSV is written to
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,
}

fn create_logger(verbose: bool) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let level =
        if verbose { slog::Level::Debug } else { slog::Level::Info };
    let drain = drain.filter_level(level).fuse();

    slog::Logger::root(drain, o!())
}

fn main() -> anyhow::Result<()> {
    let args: Args = Args::try_parse()?;
    let log = create_logger(args.verbose);

    match args.command {
        Command::Deprovision(cmd) => {
            let github = GitHubConfig {
                token: cmd.github_token,
                enterprise: cmd.enterprise,
                api_url: cmd.api_url,
            };

            Deprovisioner::new(&github, cmd.csv_file, &log).run()?;
        }

        Command::Invite(cmd) => {
            let target = match (&cmd.org, &cmd.enterprise) {
                (Some(org), _) => InviteTarget::Organization(org.clone()),
                (None, Some(slug)) => InviteTarget::Enterprise(slug.clone()),
                (None, None) => bail!(
                    "set --org (GITHUB_ORG) for organization invitations, \
                     or --enterprise (GITHUB_ENTERPRISE)"
                ),
            };

            let github = GitHubConfig {
                token: cmd.github_token,
                enterprise: cmd.enterprise.unwrap_or_default(),
                api_url: cmd.api_url,
            };

            Inviter::new(
                cmd.onelogin.to_config(),
                &github,
                target,
                cmd.role,
                cmd.csv_file,
                cmd.output_dir,
                &log,
            )
            .run()?;
        }

        Command::Provision(cmd) => {
            let github = GitHubConfig {
                token: cmd.github_token,
                enterprise: cmd.enterprise,
                api_url: cmd.api_url,
            };

            Provisioner::new(
                cmd.onelogin.to_config(),
                &github,
                cmd.role,
                cmd.csv_file,
                cmd.output_dir,
                &log,
            )
            .run()?;
        }
    }

    Ok(())
}
