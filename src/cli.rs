// src/cli.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::context::SessionContext;
use crate::engineers::{EngineerQuery, DEFAULT_PAGE_SIZE};
use crate::forms::{FormErrors, FormMode, ProfileForm, SigninForm, SignupForm};
use crate::navigation::Navigation;
use crate::types::{Engineer, Role, RoleLevel, RoleType};
use crate::utils::normalize_email;

#[derive(Parser)]
#[command(name = "hireboard")]
#[command(about = "Client for the recruiting platform connecting engineers and recruiters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML config file (defaults to ./config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens
    Signin {
        email: String,
        #[arg(long, env = "HIREBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        role: Role,
        #[arg(long, env = "HIREBOARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Clear the stored session
    Signout,
    /// Show the signed-in account
    Whoami,
    /// Show the selected role, or select one
    Role { role: Option<Role> },
    /// Confirm an email address with the emailed code
    Verify { user_id: String, code: String },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Browse engineer profiles
    #[command(subcommand)]
    Engineers(EngineersCommand),
    /// Manage your own engineer profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Upload an avatar image and print its URL
    Upload { path: PathBuf },
    /// Run a route's guards and report where navigation lands
    Navigate { path: String },
}

#[derive(Subcommand)]
pub enum EngineersCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long)]
        role_type: Option<RoleType>,
        #[arg(long)]
        role_level: Option<RoleLevel>,
    },
    Count,
    Show { id: String },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your engineer profile
    Me,
    Create(ProfileArgs),
    Update(ProfileArgs),
}

/// Profile fields; on update, omitted fields keep their current value
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub tag_line: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub search_status: Option<String>,
    #[arg(long = "role-type")]
    pub role_type: Vec<RoleType>,
    #[arg(long = "role-level")]
    pub role_level: Vec<RoleLevel>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub github: Option<String>,
    #[arg(long)]
    pub twitter: Option<String>,
    #[arg(long)]
    pub linked_in: Option<String>,
    #[arg(long)]
    pub stackoverflow: Option<String>,
    /// Hosted avatar URL
    #[arg(long, conflicts_with = "avatar_file")]
    pub avatar: Option<String>,
    /// Local image to upload as the avatar
    #[arg(long)]
    pub avatar_file: Option<PathBuf>,
}

impl ProfileArgs {
    /// Copy supplied values onto the form
    pub fn apply(self, form: &mut ProfileForm) {
        let set = |slot: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *slot = value;
            }
        };

        set(&mut form.first_name, self.first_name);
        set(&mut form.last_name, self.last_name);
        set(&mut form.tag_line, self.tag_line);
        set(&mut form.city, self.city);
        set(&mut form.state, self.state);
        set(&mut form.country, self.country);
        set(&mut form.bio, self.bio);
        set(&mut form.search_status, self.search_status);
        set(&mut form.website, self.website);
        set(&mut form.github, self.github);
        set(&mut form.twitter, self.twitter);
        set(&mut form.linked_in, self.linked_in);
        set(&mut form.stackoverflow, self.stackoverflow);
        set(&mut form.avatar, self.avatar);

        if !self.role_type.is_empty() {
            form.role_type = self.role_type;
        }
        if !self.role_level.is_empty() {
            form.role_level = self.role_level;
        }
    }
}

pub async fn handle_command(command: Command, ctx: &SessionContext) -> Result<()> {
    match command {
        Command::Signin { email, password } => {
            let form = SigninForm { email, password };
            form.validate()?;

            let response = ctx
                .session
                .signin(&normalize_email(&form.email), &form.password)
                .await
                .context("Signin failed")?;
            println!("✅ Signed in as {}", normalize_email(&form.email));
            if let Some(role) = response.role {
                println!("   Role: {}", role);
            }
        }

        Command::Signup {
            email,
            role,
            password,
            confirm_password,
        } => {
            let form = SignupForm {
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                role,
            };
            form.validate()?;

            let response = ctx
                .session
                .signup(form.email.trim(), &form.password, form.role)
                .await
                .context("Signup failed")?;
            println!("✅ Account created for {}", response.user.email);
            if !response.user.is_verified {
                println!("   Check your inbox to verify your email address");
            }
        }

        Command::Signout => {
            let nav = ctx.router.signout().await?;
            println!("✅ Signed out");
            print_navigation(&nav);
        }

        Command::Whoami => match ctx.session.get_my_profile().await? {
            Some(profile) => {
                println!("📧 {}", profile.email);
                println!("   ID: {}", profile.id);
                println!(
                    "   Role: {}",
                    profile
                        .role
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "not set".to_string())
                );
                println!("   Verified: {}", profile.is_verified);
            }
            None => println!("❌ Not signed in"),
        },

        Command::Role { role } => match role {
            Some(role) => {
                ctx.store.set_role(role);
                println!("✅ Role set to {}", role);
            }
            None => match ctx.store.get_role() {
                Some(role) => println!("{}", role),
                None => println!("❌ No role selected"),
            },
        },

        Command::Verify { user_id, code } => {
            ctx.session
                .verify_email(&user_id, &code)
                .await
                .context("Email verification failed")?;
            println!("✅ Email verified, you can now sign in");
        }

        Command::Refresh => {
            ctx.session.refresh_access_token().await?;
            println!("✅ Access token refreshed");
        }

        Command::Engineers(command) => handle_engineers(command, ctx).await?,

        Command::Profile(command) => handle_profile(command, ctx).await?,

        Command::Upload { path } => {
            let uploaded = ctx.media.upload_avatar(&path).await?;
            println!("✅ Uploaded: {}", uploaded.secure_url);
        }

        Command::Navigate { path } => {
            let nav = ctx.router.navigate(&path).await?;
            print_navigation(&nav);
        }
    }

    Ok(())
}

async fn handle_engineers(command: EngineersCommand, ctx: &SessionContext) -> Result<()> {
    match command {
        EngineersCommand::List {
            page,
            limit,
            country,
            role_type,
            role_level,
        } => {
            let query = EngineerQuery {
                page,
                limit,
                country,
                role_type,
                role_level,
            };
            let result = ctx.engineers.list(&query).await?;

            if result.engineers.is_empty() {
                println!("No engineers found");
            }
            for engineer in &result.engineers {
                print_engineer_line(engineer);
            }
            if result.needs_pagination(page, limit) {
                let pages = result.total.div_ceil(u64::from(limit.max(1)));
                println!("\nPage {} of {} ({} engineers)", page, pages, result.total);
            }
        }

        EngineersCommand::Count => {
            println!("{}", ctx.engineers.count().await?);
        }

        EngineersCommand::Show { id } => {
            let engineer = ctx.engineers.get(&id).await?;
            print_engineer(&engineer);
        }
    }
    Ok(())
}

async fn handle_profile(command: ProfileCommand, ctx: &SessionContext) -> Result<()> {
    match command {
        ProfileCommand::Me => {
            let engineer = ctx.engineers.get_mine().await?;
            print_engineer(&engineer);
        }

        ProfileCommand::Create(args) => {
            let mut form = ProfileForm::new(FormMode::Create);
            if let Some(path) = prepare_profile_form(&mut form, args)? {
                form.avatar = upload_avatar_file(&path, ctx).await?;
            }

            let id = ctx.engineers.create(&form.into_submission()?).await?;
            println!("✅ Profile created: {}", id);
        }

        ProfileCommand::Update(args) => {
            let current = ctx.engineers.get_mine().await?;
            let mut form = ProfileForm::from_engineer(&current);
            if let Some(path) = prepare_profile_form(&mut form, args)? {
                form.avatar = upload_avatar_file(&path, ctx).await?;
            }

            let updated = ctx.engineers.update_mine(&form.into_submission()?).await?;
            println!("✅ Profile updated for {}", updated.display_name());
        }
    }
    Ok(())
}

/// Copy `args` onto `form` and validate it before anything is uploaded.
///
/// Returns the local avatar image still waiting for upload, if one was given.
fn prepare_profile_form(
    form: &mut ProfileForm,
    mut args: ProfileArgs,
) -> Result<Option<PathBuf>, FormErrors> {
    let avatar_file = args.avatar_file.take();
    args.apply(form);

    match &avatar_file {
        Some(path) => {
            // The hosted URL only exists after the upload
            let mut pending = form.clone();
            pending.avatar = path.display().to_string();
            pending.validate()?;
        }
        None => form.validate()?,
    }
    Ok(avatar_file)
}

async fn upload_avatar_file(path: &Path, ctx: &SessionContext) -> Result<String> {
    match ctx.media.upload_avatar(path).await {
        Ok(uploaded) => {
            info!("Avatar uploaded for profile form: {}", uploaded.secure_url);
            Ok(uploaded.secure_url)
        }
        Err(e) => {
            error!("Avatar upload failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_navigation(nav: &Navigation) {
    match nav {
        Navigation::Arrived(route) => println!("➡️  {}", route),
        Navigation::Denied { attempted, current } => {
            println!("⛔ Navigation to {} denied, staying on {}", attempted, current)
        }
    }
}

fn print_engineer_line(engineer: &Engineer) {
    println!(
        "{}  {:<28} {}",
        engineer.id,
        engineer.display_name(),
        engineer.tag_line.as_deref().unwrap_or_default()
    );
}

fn print_engineer(engineer: &Engineer) {
    println!("👤 {}", engineer.display_name());
    if let Some(tag_line) = &engineer.tag_line {
        println!("   {}", tag_line);
    }
    let location: Vec<&str> = [&engineer.city, &engineer.state, &engineer.country]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .filter(|v| !v.is_empty())
        .collect();
    if !location.is_empty() {
        println!("   📍 {}", location.join(", "));
    }
    if !engineer.role_type.is_empty() {
        let labels: Vec<&str> = engineer.role_type.iter().map(|t| t.label()).collect();
        println!("   Role type: {}", labels.join(", "));
    }
    if !engineer.role_level.is_empty() {
        let labels: Vec<&str> = engineer.role_level.iter().map(|l| l.label()).collect();
        println!("   Level: {}", labels.join(", "));
    }
    for (label, value) in [
        ("Website", &engineer.website),
        ("GitHub", &engineer.github),
        ("LinkedIn", &engineer.linked_in),
        ("Twitter", &engineer.twitter),
        ("Stack Overflow", &engineer.stackoverflow),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            println!("   {}: {}", label, value);
        }
    }
    if let Some(bio) = &engineer.bio {
        println!("\n{}", bio);
    }
}
