use super::AppContext;
use crate::output::Output;
use animeshelf_models::UserProfile;
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub async fn run_login(token: Option<String>, user_json: Option<String>, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;

    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("API token: ")
            .map_err(|e| eyre!("Failed to read token: {}", e))?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(eyre!("Token must not be empty"));
    }

    let user = match user_json {
        Some(json) => parse_user(&json)?,
        None => UserProfile::default(),
    };

    ctx.credentials.login(token, &user)
        .map_err(|e| eyre!("Failed to store session: {}", e))?;
    ctx.credentials.save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    if user.username.is_empty() {
        output.success("Logged in");
    } else {
        output.success(format!("Logged in as {}", user.username));
    }
    Ok(())
}

pub async fn run_logout(output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;

    if ctx.credentials.get_token().is_none() {
        output.info("Not logged in");
        return Ok(());
    }

    ctx.credentials.logout();
    ctx.credentials.save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
    output.success("Logged out");
    Ok(())
}

fn parse_user(json: &str) -> Result<UserProfile> {
    serde_json::from_str(json).map_err(|e| eyre!("Invalid user JSON: {}", e))
}
