//! Account commands: login, signup, logout and whoami.

use clap::Args;
use std::io::{self, Write};

use gymlog::auth::{AuthError, AuthProvider, SessionContext};

/// Email and password, prompted for when not given as flags
#[derive(Args, Default)]
pub struct CredentialArgs {
    /// Account email
    #[arg(long)]
    pub email: Option<String>,

    /// Account password
    #[arg(long)]
    pub password: Option<String>,
}

impl CredentialArgs {
    fn resolve(&self) -> io::Result<(String, String)> {
        let email = match &self.email {
            Some(e) => e.clone(),
            None => prompt("Email: ")?,
        };
        let password = match &self.password {
            Some(p) => p.clone(),
            None => prompt("Password: ")?,
        };
        Ok((email, password))
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(
    args: &CredentialArgs,
    session: &mut SessionContext,
    provider: &dyn AuthProvider,
) -> Result<(), Box<dyn std::error::Error>> {
    let (email, password) = args.resolve()?;
    let user = session.sign_in(provider, &email, &password).await?;
    println!("Logged in as {}", user.email);
    Ok(())
}

pub async fn signup(
    args: &CredentialArgs,
    session: &mut SessionContext,
    provider: &dyn AuthProvider,
) -> Result<(), Box<dyn std::error::Error>> {
    let (email, password) = args.resolve()?;
    match session.sign_up(provider, &email, &password).await {
        Ok(user) => {
            println!("Account created. Logged in as {}", user.email);
            Ok(())
        }
        // Not a failure: the account exists, it just can't be used yet
        Err(e @ AuthError::ConfirmationRequired { .. }) => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(
    session: &mut SessionContext,
    provider: &dyn AuthProvider,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.user().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    session.sign_out(provider).await?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(session: &SessionContext) -> Result<(), Box<dyn std::error::Error>> {
    let user = session.require_user()?;
    println!("Logged in as {} ({})", user.email, user.id);
    Ok(())
}
