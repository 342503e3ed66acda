use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use careerprep::api::{
    ApiClient, ApiError, Difficulty, InterviewFeedback, QuestionCategory, QuestionFilter, ResourceFilter,
};
use careerprep::config::{ClientConfig, ConfigError};
use careerprep::devserver::{self, DevState};
use careerprep::gateway::Registration;
use careerprep::{
    AuthError, AuthGateway, CredentialStore, FileStorage, Navigation, ProfileCache, Role, SocialProvider, navigate,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("api: {0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("dev server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "careerprep", about = "Career-prep session, routing and API CLI")]
struct Cli {
    /// Overrides `CAREERPREP_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `CAREERPREP_STORAGE_PATH`.
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAREERPREP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAREERPREP_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "CAREERPREP_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    Social {
        provider: SocialProvider,
        #[arg(long)]
        token: String,
    },
    Logout,
    /// Show the stored session and load the profile for it.
    Status,
    /// Show what navigating to `path` would render.
    Route {
        path: String,
    },
    Questions {
        #[arg(long)]
        category: Option<QuestionCategory>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    Interviews,
    Feedback {
        interview_id: String,
        #[arg(long, help = "JSON object with rating, comments, strengths, improvements")]
        data: String,
    },
    Resources {
        #[arg(long, conflicts_with_all = ["subject", "difficulty"])]
        search: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Run the local fake auth backend.
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
}

struct CliContext {
    config: ClientConfig,
    credentials: CredentialStore,
}

impl CliContext {
    fn gateway(&self) -> Result<AuthGateway, CliError> {
        Ok(AuthGateway::new(self.config.clone(), self.credentials.clone(), ProfileCache::new())?)
    }

    fn api(&self) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(self.config.clone(), self.credentials.clone())?)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    let credentials = CredentialStore::load(Arc::new(FileStorage::new(&config.storage_path)));
    let ctx = CliContext { config, credentials };

    run(&ctx, cli.command).await
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let auth = ctx.gateway()?.login(&email, &password).await?;
            println!("signed in as {} ({})", auth.user.display_name(), auth.role);
        }
        Command::Register { first_name, last_name, email, password, role } => {
            let registration = Registration { first_name, last_name, email, password, role };
            let auth = ctx.gateway()?.register(&registration).await?;
            println!("registered {} ({})", auth.user.email, auth.role);
        }
        Command::ForgotPassword { email } => {
            ctx.gateway()?.forgot_password(&email).await?;
            println!("reset link sent");
        }
        Command::ResetPassword { token, new_password } => {
            ctx.gateway()?.reset_password(&token, &new_password).await?;
            println!("password updated");
        }
        Command::Social { provider, token } => {
            let auth = ctx.gateway()?.social_login(provider, &token).await?;
            println!("signed in with {provider} as {} ({})", auth.user.display_name(), auth.role);
        }
        Command::Logout => {
            ctx.gateway()?.logout();
            println!("signed out");
        }
        Command::Status => run_status(ctx).await?,
        Command::Route { path } => match navigate(&path, &ctx.credentials) {
            Navigation::Render(page) => println!("render {page:?}"),
            Navigation::Redirect(to) => println!("redirect {to}"),
        },
        Command::Questions { category, difficulty, kind } => {
            let filter = QuestionFilter { category, difficulty, kind };
            let questions = ctx.api()?.questions().list_filtered(&filter).await?;
            print_json(&questions)?;
        }
        Command::Interviews => {
            let interviews = ctx.api()?.interviews().list().await?;
            print_json(&interviews)?;
        }
        Command::Feedback { interview_id, data } => {
            let feedback: InterviewFeedback = serde_json::from_str(&data)?;
            let interview = ctx
                .api()?
                .submit_interview_feedback(&interview_id, &feedback)
                .await?;
            print_json(&interview)?;
        }
        Command::Resources { search, subject, difficulty } => {
            let api = ctx.api()?;
            let resources = match search {
                Some(query) => api.search_resources(&query).await?,
                None => {
                    let filter = ResourceFilter { subject, kind: None, difficulty };
                    api.resources().list_filtered(&filter).await?
                }
            };
            print_json(&resources)?;
        }
        Command::Serve { addr, latency_ms } => {
            let state = DevState::new().with_latency(Duration::from_millis(latency_ms));
            devserver::serve(addr, state).await?;
        }
    }
    Ok(())
}

async fn run_status(ctx: &CliContext) -> Result<(), CliError> {
    let Some(session) = ctx.credentials.session() else {
        println!("signed out");
        return Ok(());
    };
    println!("signed in ({})", session.role);

    let gateway = ctx.gateway()?;
    match gateway.restore_profile().await {
        Ok(profile) => {
            println!("{}", gateway.profile().greeting());
            println!("{} <{}>", profile.display_name(), profile.email);
        }
        Err(e) => tracing::warn!(error = %e, "profile unavailable"),
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
